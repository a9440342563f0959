use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("--mea and --gce are mutually exclusive")]
    ConflictingDecodeModes,

    #[error("--constraints and --soft-constraints both require a ground-truth structure file")]
    MissingStructureForConstraints,

    #[error("--threshold-unpaired-reactivity must be less than --threshold-paired-reactivity")]
    InvalidReactivityThresholds,
}
