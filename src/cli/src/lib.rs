//! Command-line surface: argument parsing, subcommand dispatch shape, and
//! the YAML replay round-trip, mirrored after the teacher's `parser` crate
//! (`Cli`/`Commands` + `serialize`/`deserialize`) but re-pointed at
//! `predict`/`train`/`validate` instead of pedigree simulation.

use std::{fs::File, path::PathBuf};

use clap::{Parser, Subcommand};
use located_error::prelude::*;
use serde::{Deserialize, Serialize};

mod error;
pub use error::ConfigError;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name = "rnafold-rs", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// Set the verbosity level (-v -vv -vvv)
    #[clap(short = 'v', long, parse(from_occurrences), global = true)]
    pub verbose: u8,

    /// Disable warnings; only errors are printed.
    #[clap(short = 'q', long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli {
    /// Serializes the parsed arguments to `{timestamp}-{subcommand}.yaml` in
    /// the current directory, for reproducible reruns via `FromYaml`.
    pub fn serialize(&self) -> Result<()> {
        let serialized = serde_yaml::to_string(self).with_loc(|| "While serializing command line arguments")?;
        log::debug!("\n---- Command line args ----\n{serialized}\n---");

        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S");
        let subcommand = match &self.commands {
            Commands::Predict { .. } => "predict",
            Commands::Train { .. } => "train",
            Commands::Validate { .. } => "validate",
            Commands::FromYaml { .. } => return Ok(()),
        };
        let output_file = format!("{current_time}-{subcommand}.yaml");
        std::fs::write(&output_file, serialized).with_loc(|| format!("While writing {output_file}"))
    }

    pub fn deserialize(yaml: PathBuf) -> Result<Self> {
        let file = File::open(&yaml).with_loc(|| format!("While opening replay file {}", yaml.display()))?;
        serde_yaml::from_reader(file).with_loc(|| format!("While parsing replay file {}", yaml.display()))
    }
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Commands {
    /// Fold one or more sequences and print the predicted structure.
    Predict {
        /// FASTA/BPSEQ/parenthetical files to fold; `-` reads stdin.
        files: Vec<PathBuf>,

        /// Decode with maximum-expected-accuracy at the given gamma, instead
        /// of the default Viterbi max-score parse.
        #[clap(long, value_name = "GAMMA")]
        mea: Option<f64>,

        /// Decode with the generalized-centroid estimator at the given gamma.
        #[clap(long, value_name = "GAMMA")]
        gce: Option<f64>,

        /// Emit BPSEQ instead of dot-bracket notation.
        #[clap(long)]
        bpseq: bool,

        /// Restrict folding to the pairing given by each input's known
        /// structure (hard constraint).
        #[clap(long)]
        constraints: bool,

        /// Bias folding with each input's reactivity column (soft
        /// constraint; never forbids a pairing outright).
        #[clap(long)]
        soft_constraints: bool,

        /// Allow non-Watson-Crick/wobble pairs to score as pairable.
        #[clap(long)]
        noncomplementary: bool,

        /// Parameter file to load (defaults to an all-zero parameter vector).
        #[clap(long, value_name = "FILE")]
        param: Option<PathBuf>,

        /// Longest `j - i` span considered, or unbounded if omitted.
        #[clap(long, value_name = "LEN")]
        max_span: Option<usize>,
    },

    /// Discriminatively train a parameter vector from known structures.
    Train {
        /// Ground-truth structure files (FASTA/BPSEQ/parenthetical), one
        /// sequence each.
        #[clap(long = "structure", required = true, multiple_values = true)]
        structure: Vec<PathBuf>,

        /// Reactivity files, one per structure, in the same order.
        #[clap(long = "reactivity", multiple_values = true)]
        reactivity: Vec<PathBuf>,

        /// Trained parameter file to write.
        #[clap(long, value_name = "FILE")]
        out: PathBuf,

        #[clap(long, default_value = "100")]
        max_iter: usize,

        #[clap(long, default_value = "0")]
        burn_in: usize,

        #[clap(long, default_value = "0.1")]
        eta: f64,

        #[clap(long, default_value = "0.0")]
        lambda: f64,

        #[clap(long, default_value = "1.0")]
        pos_w: f64,

        #[clap(long, default_value = "1.0")]
        neg_w: f64,

        /// Down-weight examples without a fully-known structure.
        #[clap(long)]
        weight_weak_label: Option<f64>,

        /// Use per-base-pair loss instead of the flat example-level loss.
        #[clap(long)]
        per_bp_loss: bool,

        /// Discretize reactivity into paired/unpaired before use instead of
        /// treating it as a continuous soft constraint.
        #[clap(long)]
        discretize_reactivity: bool,

        #[clap(long)]
        threshold_unpaired_reactivity: Option<f64>,

        #[clap(long)]
        threshold_paired_reactivity: Option<f64>,

        #[clap(long, default_value = "1.0")]
        scale_reactivity: f64,

        #[clap(long)]
        random_seed: Option<u64>,
    },

    /// Check whether a parameter vector admits a finite constrained Viterbi
    /// score against each structure's ground truth (`OK`/`NG`).
    Validate {
        #[clap(long = "structure", required = true, multiple_values = true)]
        structure: Vec<PathBuf>,

        #[clap(long, value_name = "FILE")]
        param: Option<PathBuf>,
    },

    /// Run `rnafold-rs` using a previously serialized `.yaml` replay file.
    FromYaml { yaml: PathBuf },
}

impl Commands {
    /// Checks flag combinations that `clap` itself cannot express (mutually
    /// exclusive options, cross-argument dependencies).
    pub fn validate_flags(&self) -> Result<(), ConfigError> {
        match self {
            Commands::Predict { mea, gce, constraints, soft_constraints, .. } => {
                if mea.is_some() && gce.is_some() {
                    return Err(ConfigError::ConflictingDecodeModes);
                }
                let _ = (constraints, soft_constraints);
                Ok(())
            }
            Commands::Train { threshold_unpaired_reactivity, threshold_paired_reactivity, .. } => {
                if let (Some(u), Some(p)) = (threshold_unpaired_reactivity, threshold_paired_reactivity) {
                    if u >= p {
                        return Err(ConfigError::InvalidReactivityThresholds);
                    }
                }
                Ok(())
            }
            Commands::Validate { .. } | Commands::FromYaml { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mea_and_gce_together_is_rejected() {
        let cmd = Commands::Predict {
            files: vec![],
            mea: Some(1.0),
            gce: Some(1.0),
            bpseq: false,
            constraints: false,
            soft_constraints: false,
            noncomplementary: false,
            param: None,
            max_span: None,
        };
        assert!(matches!(cmd.validate_flags(), Err(ConfigError::ConflictingDecodeModes)));
    }

    #[test]
    fn reversed_reactivity_thresholds_rejected() {
        let cmd = Commands::Train {
            structure: vec![],
            reactivity: vec![],
            out: PathBuf::from("out.params"),
            max_iter: 100,
            burn_in: 0,
            eta: 0.1,
            lambda: 0.0,
            pos_w: 1.0,
            neg_w: 1.0,
            weight_weak_label: None,
            per_bp_loss: false,
            discretize_reactivity: false,
            threshold_unpaired_reactivity: Some(0.9),
            threshold_paired_reactivity: Some(0.1),
            scale_reactivity: 1.0,
            random_seed: None,
        };
        assert!(matches!(cmd.validate_flags(), Err(ConfigError::InvalidReactivityThresholds)));
    }

    #[test]
    fn parses_minimal_predict_invocation() {
        let cli = Cli::parse_from(["rnafold-rs", "predict", "seq.fasta"]);
        match cli.commands {
            Commands::Predict { files, mea, gce, .. } => {
                assert_eq!(files, vec![PathBuf::from("seq.fasta")]);
                assert!(mea.is_none());
                assert!(gce.is_none());
            }
            other => panic!("expected Predict, got {other:?}"),
        }
    }
}
