mod adagrad;
mod error;

pub use adagrad::{AdaGradBuilder, AdaGradOptimizer};
pub use error::OptimizerBuilderError;
