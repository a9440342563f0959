//! The dynamic-programming core: folds a loaded sequence under a
//! `featuremap::FeatureMap`-indexed scoring model, in four flavors that
//! all walk the same `FC`/`FM`/`FM1`/`F5` grammar —
//!
//! - [`InferenceEngine::compute_viterbi`] for the single max-score parse
//! - [`InferenceEngine::compute_inside`]/[`InferenceEngine::compute_outside`]
//!   for the log-space partition function and base-pairing posteriors
//! - [`InferenceEngine::compute_viterbi_feature_counts`]/
//!   [`InferenceEngine::compute_feature_count_expectations`] for the
//!   sparse gradients a trainer consumes
//! - [`InferenceEngine::predict_pairings_posterior`] for MEA/generalized-
//!   centroid decoding off the posterior matrix
//!
//! Every quantity is gated by [`state::EngineState`]: asking for a later
//! stage's output before its prerequisite ran is a programming error,
//! reported as [`error::EngineError::InvalidState`] rather than silently
//! returning a zeroed result.

mod constraints;
mod counting;
mod decode;
mod engine;
mod error;
mod inside_outside;
mod limits;
mod logspace;
mod loss;
mod matrices;
mod scoring;
mod state;
mod traceback;
mod viterbi;

pub use decode::DecodeMode;
pub use engine::InferenceEngine;
pub use error::EngineError;
pub use limits::EngineLimits;
pub use state::EngineState;
