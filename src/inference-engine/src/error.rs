use thiserror::Error;

use crate::state::EngineState;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("operation requires state {required:?} but the engine is in state {actual:?}")]
    InvalidState { required: EngineState, actual: EngineState },

    #[error("sequence has length {0}, shorter than the minimum hairpin length")]
    SequenceTooShort(usize),

    #[error("constraint mapping length {0} does not match the loaded sequence length {1}")]
    ConstraintLengthMismatch(usize, usize),

    #[error("reactivity vector length {0} does not match the loaded sequence length {1}")]
    ReactivityLengthMismatch(usize, usize),

    #[error("parameter vector has {0} entries but the feature map has {1} registered features")]
    ParamVectorTooShort(usize, usize),
}
