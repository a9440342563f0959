//! Bidirectional name/index registry for the scoring model's features.
//!
//! An [`InferenceEngine`](../inference_engine/index.html) never hard-codes a
//! parameter's position in the weight vector; it asks a [`FeatureMap`] to
//! resolve (or assign) the index for the feature it just observed. Every
//! `Score`/`Count` primitive on the engine side calls a matching
//! `find_X`/`insert_X` pair here, keeping parameter indexing and loop-scoring
//! logic in lock step.

mod config;
mod error;
mod featuremap;
mod limits;
mod io;

mod classes {
    mod base_pair;
    mod helix;
    mod loop_length;
    mod multi_external;
    mod nucleotide_window;
}

pub use config::FeatureConfig;
pub use error::FeatureMapError;
pub use featuremap::FeatureMap;
pub use io::{read_from_file, write_to_file};
pub use limits::INTERNAL_EXPLICIT_MAX_LENGTH;
