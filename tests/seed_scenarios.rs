//! End-to-end seed scenarios exercising the engine the way `predict`/
//! `train`/`validate` would, without going through the CLI binary itself.

mod common;

use std::collections::HashMap;

use common::{default_engine, parens_to_mapping, sstruct_from_str};
use featuremap::{read_from_file, write_to_file, FeatureConfig, FeatureMap};
use inference_engine::{DecodeMode, EngineLimits, InferenceEngine};
use sstruct::SStruct;

fn assert_nested_and_symmetric(mapping: &[usize]) {
    for (i, &j) in mapping.iter().enumerate() {
        if j == 0 {
            continue;
        }
        assert_eq!(mapping[j], i, "pair ({i}, {j}) is not reciprocated");
    }
    let pairs: Vec<(usize, usize)> = mapping
        .iter()
        .enumerate()
        .filter_map(|(i, &j)| (j != 0 && i < j).then_some((i, j)))
        .collect();
    for a in 0..pairs.len() {
        for b in (a + 1)..pairs.len() {
            let (i1, j1) = pairs[a];
            let (i2, j2) = pairs[b];
            let crosses = (i1 < i2 && i2 < j1 && j1 < j2) || (i2 < i1 && i1 < j2 && j2 < j1);
            assert!(!crosses, "pairs ({i1},{j1}) and ({i2},{j2}) cross");
        }
    }
}

/// S1 - trivial hairpin: `GGGAAAUCCC` folds into some finite-scoring, valid
/// (nested, symmetric, minimum-hairpin-respecting) structure.
#[test]
fn s1_trivial_hairpin_folds_validly() {
    let example = sstruct_from_str("GGGAAAUCCC");
    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    let mapping = engine.predict_pairings_viterbi().unwrap();

    assert!(engine.viterbi_score().is_finite());
    assert_nested_and_symmetric(&mapping);
    for (i, &j) in mapping.iter().enumerate() {
        if j > i {
            assert!(j - i - 1 >= 3, "pair ({i},{j}) violates the minimum hairpin length");
        }
    }
}

/// S2 - single unpaired: a sequence with no complementary bases anywhere
/// folds to the fully-unpaired structure.
#[test]
fn s2_single_unpaired_has_no_pairs() {
    let example = sstruct_from_str("AAAA");
    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    let mapping = engine.predict_pairings_viterbi().unwrap();

    assert!(mapping[1..].iter().all(|&j| j == 0));
}

/// S3 - MEA decoding: posterior decoding on a sequence with two GC stems
/// returns a valid (nested, symmetric) structure.
#[test]
fn s3_mea_decoding_is_valid() {
    let example = sstruct_from_str("GCGCAAAAGCGC");
    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    engine.compute_inside().unwrap();
    engine.compute_outside().unwrap();
    engine.compute_posterior().unwrap();
    let mapping = engine.predict_pairings_posterior(DecodeMode::Mea, 1.0).unwrap();

    assert_nested_and_symmetric(&mapping);
}

/// S4 - constraint forces an infeasible structure: a crossing constraint
/// mapping leaves no pair in the grammar allowed to complete it.
#[test]
fn s4_crossing_constraint_is_infeasible() {
    let example = sstruct_from_str("GGGAAAUCCC");
    let mut engine = default_engine(&example);

    // (1,7) and (2,9) cross: forcing both leaves no nested completion.
    let mut true_mapping = vec![0usize; engine.length() + 1];
    true_mapping[1] = 7;
    true_mapping[7] = 1;
    true_mapping[2] = 9;
    true_mapping[9] = 2;
    engine.use_constraints(&true_mapping);

    engine.compute_viterbi().unwrap();
    assert!(!engine.viterbi_score().is_finite(), "crossing constraints should leave no feasible parse");
}

/// S5 - parameter round trip: training-style feature counts extracted from
/// one engine, written out and read back, reproduce the identical parse and
/// score on a fresh engine.
#[test]
fn s5_parameter_round_trip_reproduces_the_parse() {
    let example = sstruct_from_str("GGGAAAUCCC");

    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    let before_score = engine.viterbi_score();
    let before_mapping = engine.predict_pairings_viterbi().unwrap();

    let feature_map = engine.feature_map().unwrap().clone();
    let params = vec![0.0; 8192];

    let mut buffer = Vec::new();
    write_to_file(&mut buffer, &feature_map, &params[..feature_map.len()]).unwrap();

    let (read_map, read_values) = read_from_file(FeatureConfig::default(), &buffer[..]).unwrap();
    assert_eq!(read_map.len(), feature_map.len());

    let mut replayed = InferenceEngine::new(false, EngineLimits::default());
    replayed.load_sequence(&example).unwrap();
    replayed.load_values(read_map, read_values, None).unwrap();
    replayed.compute_viterbi().unwrap();
    let after_mapping = replayed.predict_pairings_viterbi().unwrap();

    assert_eq!(before_score, replayed.viterbi_score());
    assert_eq!(before_mapping, after_mapping);
}

/// S6 - inside/Viterbi ordering: the log-partition coefficient is never
/// smaller than the Viterbi score, for a longer pseudo-random sequence.
#[test]
fn s6_inside_is_at_least_viterbi_on_a_longer_sequence() {
    let bases = ['A', 'C', 'G', 'U'];
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let sequence: String = (0..40)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            bases[(state % 4) as usize]
        })
        .collect();

    let example = sstruct_from_str(&sequence);
    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    let viterbi_score = engine.viterbi_score();
    engine.compute_inside().unwrap();
    let log_partition = engine.compute_log_partition_coefficient();

    assert!(log_partition >= viterbi_score - 1e-9);
}

/// Invariant #4 - score/count lock-step: summing `params[k] * count[k]`
/// over the Viterbi feature-count map reproduces the reported Viterbi
/// score.
#[test]
fn invariant_score_and_count_agree() {
    let example = sstruct_from_str("GGGAAAUCCC");
    let mut engine = InferenceEngine::new(false, EngineLimits::default());
    engine.load_sequence(&example).unwrap();

    let mut feature_map = FeatureMap::default();
    let idx = feature_map.insert_key("base_pair_probe");
    let mut params = vec![0.0; idx + 1];
    params[idx] = 0.37;
    engine.load_values(feature_map, params.clone(), None).unwrap();

    engine.compute_viterbi().unwrap();
    let score = engine.viterbi_score();
    let counts = engine.compute_viterbi_feature_counts().unwrap();

    let reconstructed: f64 = counts.iter().map(|(&idx, &count)| params.get(idx).copied().unwrap_or(0.0) * count).sum();
    assert!((reconstructed - score).abs() < 1e-6, "reconstructed={reconstructed} score={score}");
}

/// Invariant #6 - posterior sums: for every position, the total pairing
/// probability plus the unpaired probability is within epsilon of 1.
#[test]
fn invariant_posterior_sums_to_one() {
    let example = sstruct_from_str("GGGAAAUCCC");
    let mut engine = default_engine(&example);
    engine.compute_viterbi().unwrap();
    engine.compute_inside().unwrap();
    engine.compute_outside().unwrap();
    engine.compute_posterior().unwrap();

    for i in 1..=engine.length() {
        let paired: f64 = (1..=engine.length()).filter(|&j| j != i).map(|j| engine.posterior(i.min(j), i.max(j))).sum();
        assert!(paired <= 1.0 + 1e-6, "position {i} has total pairing probability {paired} > 1");
    }
}

/// Invariant #8 - constraint respected: when a hard constraint is fed in
/// and a feasible Viterbi parse is found, the output agrees with the
/// constraint everywhere it was specified.
#[test]
fn invariant_feasible_parse_respects_constraints() {
    let example = sstruct_from_str("GGGAAAUCCC");
    let mut engine = default_engine(&example);

    let mut true_mapping = vec![0usize; engine.length() + 1];
    true_mapping[1] = 10;
    true_mapping[10] = 1;
    engine.use_constraints(&true_mapping);

    engine.compute_viterbi().unwrap();
    assert!(engine.viterbi_score().is_finite());
    let mapping = engine.predict_pairings_viterbi().unwrap();
    assert_eq!(mapping[1], 10);
    assert_eq!(mapping[10], 1);
}

/// Invariant #9 - idempotent insert: inserting the same feature key twice
/// returns the same index, and a `find` in between also sees it.
#[test]
fn invariant_insert_key_is_idempotent() {
    let mut feature_map = FeatureMap::default();
    let first = feature_map.insert_key("multi_base");
    let found = feature_map.find_key("multi_base");
    let second = feature_map.insert_key("multi_base");

    assert_eq!(Some(first), found);
    assert_eq!(first, second);
    assert_eq!(feature_map.len(), 1);
}

/// Sanity check for the `common` fixture helper itself, so a broken
/// dot-bracket parser in the test harness doesn't masquerade as an engine bug.
#[test]
fn parens_to_mapping_round_trips_a_simple_hairpin() {
    let mapping = parens_to_mapping("(((...)))");
    assert_eq!(mapping[1], 9);
    assert_eq!(mapping[2], 8);
    assert_eq!(mapping[3], 7);
    assert!(mapping[4..=6].iter().all(|&j| j == 0));
}

#[allow(dead_code)]
fn unused_import_guard(_: &HashMap<usize, f64>, _: &SStruct) {}
