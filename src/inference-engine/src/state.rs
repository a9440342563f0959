use crate::error::EngineError;

/// The engine's lifecycle. Every computed quantity depends on one that
/// came before it, so callers must walk this chain in order; asking for a
/// posterior before running `compute_inside`/`compute_outside` is a
/// programmer error, not a recoverable one, hence [`EngineError::InvalidState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No sequence loaded yet.
    Fresh,
    /// `load_sequence` and `load_values` have run.
    Loaded,
    /// `compute_viterbi` has filled the Viterbi layer.
    Scored,
    /// `predict_pairings_viterbi` / `compute_viterbi_feature_counts` have
    /// walked the traceback.
    TracedBack,
    /// `compute_inside` has filled the inside layer.
    Inside,
    /// `compute_outside` has filled the outside layer.
    Outside,
    /// `compute_posterior` has filled the posterior layer.
    Posterior,
    /// An MEA/GCE decode has produced a final structure.
    Decoded,
}

impl EngineState {
    pub(crate) fn require_at_least(self, required: EngineState) -> Result<(), EngineError> {
        if (self as u8) >= (required as u8) {
            Ok(())
        } else {
            Err(EngineError::InvalidState { required, actual: self })
        }
    }

    pub(crate) fn require_exactly(self, required: EngineState) -> Result<(), EngineError> {
        if self == required {
            Ok(())
        } else {
            Err(EngineError::InvalidState { required, actual: self })
        }
    }
}
