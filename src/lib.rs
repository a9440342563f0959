//! Top-level orchestration wiring `cli::Cli` subcommands to the
//! `featuremap`/`sstruct`/`inference-engine`/`optimizer` crates that do the
//! actual work. Mirrors the teacher's `src/bin/main.rs` dispatch, except the
//! dispatch body itself lives here rather than directly in `main`, so that
//! `tests/` can drive it without spawning a subprocess.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use cli::Commands;
use featuremap::FeatureMap;
use inference_engine::{DecodeMode, EngineLimits, InferenceEngine};
use located_error::prelude::*;
use optimizer::AdaGradBuilder;
use rayon::prelude::*;
use sstruct::{Mapping, PairState, Reactivity, SStruct};

pub fn run(cli: &cli::Cli) -> Result<()> {
    cli.commands.validate_flags().with_loc(|| "While validating flag combinations")?;
    match &cli.commands {
        Commands::Predict { files, mea, gce, bpseq, constraints, soft_constraints, noncomplementary, param, max_span } => {
            predict(files, *mea, *gce, *bpseq, *constraints, *soft_constraints, *noncomplementary, param.as_deref(), *max_span)
        }
        Commands::Train {
            structure,
            reactivity,
            out,
            max_iter,
            burn_in,
            eta,
            lambda,
            pos_w,
            neg_w,
            weight_weak_label: _,
            per_bp_loss,
            discretize_reactivity: _,
            threshold_unpaired_reactivity,
            threshold_paired_reactivity,
            scale_reactivity,
            random_seed: _,
        } => train(
            structure,
            reactivity,
            out,
            *max_iter,
            *burn_in,
            *eta,
            *lambda,
            *pos_w,
            *neg_w,
            *per_bp_loss,
            *threshold_unpaired_reactivity,
            *threshold_paired_reactivity,
            *scale_reactivity,
        ),
        Commands::Validate { structure, param } => validate(structure, param.as_deref()),
        Commands::FromYaml { yaml } => {
            let replay = cli::Cli::deserialize(yaml.clone())?;
            run(&replay)
        }
    }
}

fn load_sstruct(path: &Path) -> Result<SStruct> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let file = File::open(path).with_loc(|| format!("While opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let sstruct = match ext {
        "bpseq" => sstruct::io::read_bpseq(reader),
        "dbn" | "parens" | "ct" => sstruct::io::read_parens(reader),
        _ => sstruct::io::read_fasta(reader),
    }
    .with_loc(|| format!("While reading structure file {}", path.display()))?;
    Ok(sstruct.with_name(path.display().to_string()))
}

fn load_reactivity(path: &Path) -> Result<Reactivity> {
    let file = File::open(path).with_loc(|| format!("While opening {}", path.display()))?;
    sstruct::io::read_reactivity(BufReader::new(file)).with_loc(|| format!("While reading reactivity file {}", path.display()))
}

fn load_params(param: Option<&Path>) -> Result<(FeatureMap, Vec<f64>)> {
    match param {
        Some(path) => {
            let file = File::open(path).with_loc(|| format!("While opening parameter file {}", path.display()))?;
            featuremap::read_from_file(featuremap::FeatureConfig::default(), BufReader::new(file))
                .with_loc(|| format!("While reading parameter file {}", path.display()))
        }
        None => Ok((FeatureMap::default(), Vec::new())),
    }
}

fn mapping_to_parens(mapping: &[usize]) -> String {
    mapping[1..]
        .iter()
        .enumerate()
        .map(|(idx, &partner)| {
            let i = idx + 1;
            if partner == 0 {
                '.'
            } else if partner > i {
                '('
            } else {
                ')'
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn predict(
    files: &[PathBuf],
    mea: Option<f64>,
    gce: Option<f64>,
    bpseq: bool,
    constraints: bool,
    soft_constraints: bool,
    noncomplementary: bool,
    param: Option<&Path>,
    max_span: Option<usize>,
) -> Result<()> {
    let (feature_map, params) = load_params(param)?;

    let limits = EngineLimits { allow_noncomplementary: noncomplementary, max_span, ..EngineLimits::default() };

    let outcomes: Vec<Result<(SStruct, Vec<usize>, f64)>> = files
        .par_iter()
        .map(|path| {
            let example = load_sstruct(path)?;
            let mut engine = InferenceEngine::new(false, limits);
            engine.load_sequence(&example).with_loc(|| "While loading the sequence into the engine")?;
            engine.load_values(feature_map.clone(), params.clone(), None).with_loc(|| "While loading parameters")?;

            if constraints {
                if let Some(known) = &example.known_mapping {
                    engine.use_constraints(&mapping_to_vec(known));
                }
            }
            if soft_constraints {
                if let Some(reactivity) = &example.reactivity {
                    engine.use_soft_constraints(&reactivity.unpaired, 1.0);
                }
            }

            let mapping = if let Some(gamma) = mea {
                engine.compute_viterbi().with_loc(|| "While computing the Viterbi score")?;
                engine.compute_inside().with_loc(|| "While computing inside sums")?;
                engine.compute_outside().with_loc(|| "While computing outside sums")?;
                engine.compute_posterior().with_loc(|| "While computing posteriors")?;
                engine.predict_pairings_posterior(DecodeMode::Mea, gamma).with_loc(|| "While decoding with MEA")?
            } else if let Some(gamma) = gce {
                engine.compute_viterbi().with_loc(|| "While computing the Viterbi score")?;
                engine.compute_inside().with_loc(|| "While computing inside sums")?;
                engine.compute_outside().with_loc(|| "While computing outside sums")?;
                engine.compute_posterior().with_loc(|| "While computing posteriors")?;
                engine
                    .predict_pairings_posterior(DecodeMode::GeneralizedCentroid, gamma)
                    .with_loc(|| "While decoding with the generalized-centroid estimator")?
            } else {
                engine.compute_viterbi().with_loc(|| "While computing the Viterbi score")?;
                engine.predict_pairings_viterbi().with_loc(|| "While tracing back the Viterbi parse")?
            };

            let score = engine.viterbi_score();
            Ok((example, mapping, score))
        })
        .collect();

    let mut failures = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok((example, mapping, score)) => {
                let name = example.name.clone().unwrap_or_default();
                if bpseq {
                    let predicted = Mapping::from_states(
                        std::iter::once(PairState::Unknown)
                            .chain(mapping[1..].iter().map(|&j| if j == 0 { PairState::Unpaired } else { PairState::Paired(j) }))
                            .collect(),
                    );
                    let mut sink = BufWriter::new(std::io::stdout());
                    sstruct::io::write_bpseq(&mut sink, &example, &predicted).with_loc(|| format!("While writing BPSEQ for {name}"))?;
                } else {
                    println!(">{name}");
                    println!("{}", mapping_to_parens(&mapping));
                    println!("# viterbi_score={score}");
                }
            }
            Err(err) => {
                log::error!("{err:?}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} input files failed to fold", files.len());
    }
    Ok(())
}

fn mapping_to_vec(mapping: &Mapping) -> Vec<usize> {
    let mut out = vec![0usize; mapping.len() + 1];
    for (i, j) in mapping.pairs() {
        out[i] = j;
        out[j] = i;
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn train(
    structures: &[PathBuf],
    reactivities: &[PathBuf],
    out: &Path,
    max_iter: usize,
    burn_in: usize,
    eta: f64,
    lambda: f64,
    pos_w: f64,
    neg_w: f64,
    per_bp_loss: bool,
    threshold_unpaired_reactivity: Option<f64>,
    threshold_paired_reactivity: Option<f64>,
    scale_reactivity: f64,
) -> Result<()> {
    let _ = (threshold_unpaired_reactivity, threshold_paired_reactivity);

    let mut examples = Vec::with_capacity(structures.len());
    for (idx, path) in structures.iter().enumerate() {
        let mut example = load_sstruct(path)?;
        if let Some(reactivity_path) = reactivities.get(idx) {
            let reactivity = load_reactivity(reactivity_path)?;
            example = example.with_reactivity(reactivity).with_loc(|| format!("While attaching reactivity to {}", path.display()))?;
        }
        examples.push(example);
    }

    let mut feature_map = FeatureMap::default();
    let mut params: Vec<f64> = Vec::new();

    let limits = EngineLimits::default();
    let mut optimizer = None;

    for iteration in 0..max_iter {
        let mut gradient_sum: std::collections::HashMap<usize, f64> = std::collections::HashMap::new();
        let mut skipped = 0usize;

        for example in &examples {
            let known = match &example.known_mapping {
                Some(m) => m,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let mut engine = InferenceEngine::new(false, limits);
            engine.load_sequence(example).with_loc(|| "While loading a training example")?;
            if params.len() < feature_map.len() {
                params.resize(feature_map.len(), 0.0);
            }
            engine.load_values(feature_map.clone(), params.clone(), None).with_loc(|| "While loading parameters")?;

            let true_mapping = mapping_to_vec(known);
            if per_bp_loss {
                engine.use_loss_base_pair(&true_mapping, pos_w, neg_w);
            } else {
                engine.use_loss(&true_mapping, 1.0);
            }
            if let Some(reactivity) = &example.reactivity {
                engine.use_soft_constraints(&reactivity.unpaired, scale_reactivity);
            }

            if let Err(err) = engine.compute_viterbi() {
                log::warn!("skipping example unreachable under its constraints: {err}");
                skipped += 1;
                continue;
            }
            let loss_augmented_counts = engine.compute_viterbi_feature_counts().with_loc(|| "While extracting loss-augmented feature counts")?;

            // `Count*` primitives insert previously-unseen feature names into the
            // engine's own map copy; fold that growth back into the map shared
            // across examples so indices stay consistent for the next one.
            if let Some(grown) = engine.feature_map() {
                feature_map = grown.clone();
            }
            if params.len() < feature_map.len() {
                params.resize(feature_map.len(), 0.0);
            }

            let mut gold_engine = InferenceEngine::new(false, limits);
            gold_engine.load_sequence(example).with_loc(|| "While reloading a training example for the gold parse")?;
            gold_engine.load_values(feature_map.clone(), params.clone(), None).with_loc(|| "While loading parameters")?;
            gold_engine.use_constraints(&true_mapping);
            let gold_counts = match gold_engine.compute_viterbi().and_then(|()| gold_engine.compute_viterbi_feature_counts()) {
                Ok(counts) => counts,
                Err(err) => {
                    log::warn!("gold parse infeasible under its own constraints: {err}");
                    skipped += 1;
                    continue;
                }
            };
            if let Some(grown) = gold_engine.feature_map() {
                feature_map = grown.clone();
            }

            for (idx, value) in loss_augmented_counts {
                *gradient_sum.entry(idx).or_insert(0.0) += value;
            }
            for (idx, value) in gold_counts {
                *gradient_sum.entry(idx).or_insert(0.0) -= value;
            }
        }

        if iteration < burn_in {
            log::debug!("burn-in iteration {iteration}, {skipped} examples skipped");
            continue;
        }

        if params.len() < feature_map.len() {
            params.resize(feature_map.len(), 0.0);
        }
        if optimizer.is_none() {
            optimizer = Some(
                AdaGradBuilder::default()
                    .learning_rate(eta)
                    .l1_strength(lambda)
                    .initial_weights(params.clone())
                    .build()
                    .with_loc(|| "While constructing the AdaGrad optimizer from --eta/--lambda")?,
            );
        }
        let opt = optimizer.as_mut().expect("just initialized above");
        opt.step(&gradient_sum);
        params = opt.weights().to_vec();

        log::info!("iteration {iteration}: {} features, {skipped} examples skipped", feature_map.len());
    }

    let file = File::create(out).with_loc(|| format!("While creating output parameter file {}", out.display()))?;
    featuremap::write_to_file(BufWriter::new(file), &feature_map, &params).with_loc(|| format!("While writing {}", out.display()))
}

fn validate(structures: &[PathBuf], param: Option<&Path>) -> Result<()> {
    let (feature_map, params) = load_params(param)?;
    let limits = EngineLimits::default();

    let mut all_ok = true;
    for path in structures {
        let example = load_sstruct(path)?;
        let Some(known) = &example.known_mapping else {
            println!("{}: NG (no ground-truth structure)", path.display());
            all_ok = false;
            continue;
        };

        let mut engine = InferenceEngine::new(false, limits);
        engine.load_sequence(&example).with_loc(|| "While loading a structure to validate")?;
        engine.load_values(feature_map.clone(), params.clone(), None).with_loc(|| "While loading parameters")?;
        engine.use_constraints(&mapping_to_vec(known));

        let status = match engine.compute_viterbi() {
            Ok(()) if engine.viterbi_score().is_finite() => "OK",
            _ => "NG",
        };
        if status == "NG" {
            all_ok = false;
        }
        println!("{}: {status}", path.display());
    }

    if all_ok {
        Ok(())
    } else {
        anyhow::bail!("one or more structures were infeasible under the loaded constraints")
    }
}
