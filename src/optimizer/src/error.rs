use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizerBuilderError {
    #[error("learning_rate must be positive, got {0}")]
    NonPositiveLearningRate(f64),

    #[error("l1_strength must be non-negative, got {0}")]
    NegativeL1Strength(f64),

    #[error("num_features must be set before build()")]
    MissingNumFeatures,
}
