use std::collections::HashMap;

use featuremap::FeatureMap;
use sstruct::{Nucleotide, SStruct};

use crate::{
    error::EngineError,
    limits::EngineLimits,
    matrices::{compute_row_offsets, DpLayer},
    state::EngineState,
};

/// Couples a sequence, a loaded parameter vector, and the four DP layers
/// (`FC`, `FM`, `FM1`, `F5`) needed to score, decode, and train on a single
/// RNA sequence. One engine instance is reused across the `Fresh -> Loaded
/// -> Scored -> ...` lifecycle for a single example; callers fold over
/// many examples by constructing one engine per sequence (or reloading a
/// sequence into the same engine, which resets state back to `Loaded`).
pub struct InferenceEngine {
    pub(crate) limits: EngineLimits,
    pub(crate) with_turner: bool,
    pub(crate) state: EngineState,

    pub(crate) feature_map: Option<FeatureMap>,
    pub(crate) params: Vec<f64>,
    pub(crate) params_base: Option<Vec<f64>>,
    pub(crate) counts: HashMap<usize, f64>,

    pub(crate) length: usize,
    pub(crate) sequence: Vec<Nucleotide>,
    pub(crate) offset: Vec<usize>,

    pub(crate) allow_unpaired_position: Vec<bool>,
    pub(crate) allow_unpaired: Vec<bool>,
    pub(crate) allow_paired: Vec<bool>,

    pub(crate) loss_unpaired_position: Vec<f64>,
    pub(crate) loss_unpaired: Vec<f64>,
    pub(crate) loss_paired: Vec<f64>,
    pub(crate) loss_const: f64,

    pub(crate) reactivity_unpaired_position: Vec<f32>,
    pub(crate) reactivity_unpaired: Vec<f32>,
    pub(crate) reactivity_paired: Vec<f32>,

    pub(crate) fc: DpLayer,
    pub(crate) fm: DpLayer,
    pub(crate) fm1: DpLayer,
    pub(crate) f5: DpLayer,
}

impl InferenceEngine {
    #[must_use]
    pub fn new(with_turner: bool, limits: EngineLimits) -> Self {
        Self {
            limits,
            with_turner,
            state: EngineState::Fresh,
            feature_map: None,
            params: Vec::new(),
            params_base: None,
            counts: HashMap::new(),
            length: 0,
            sequence: Vec::new(),
            offset: Vec::new(),
            allow_unpaired_position: Vec::new(),
            allow_unpaired: Vec::new(),
            allow_paired: Vec::new(),
            loss_unpaired_position: Vec::new(),
            loss_unpaired: Vec::new(),
            loss_paired: Vec::new(),
            loss_const: 0.0,
            reactivity_unpaired_position: Vec::new(),
            reactivity_unpaired: Vec::new(),
            reactivity_paired: Vec::new(),
            fc: DpLayer::new(0),
            fm: DpLayer::new(0),
            fm1: DpLayer::new(0),
            f5: DpLayer::new(0),
        }
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[inline]
    pub(crate) fn cell(&self, i: usize, j: usize) -> usize {
        crate::matrices::cell(&self.offset, i, j)
    }

    /// Loads a sequence, resetting every DP layer and constraint/loss array
    /// to their default "fully unconstrained" state. Valid from any state;
    /// returns the engine to [`EngineState::Loaded`] once `load_values` has
    /// also been called (or immediately if it already had been).
    pub fn load_sequence(&mut self, sstruct: &SStruct) -> Result<(), EngineError> {
        let length = sstruct.len();
        if length < self.limits.min_hairpin_length {
            return Err(EngineError::SequenceTooShort(length));
        }

        self.length = length;
        self.sequence = std::iter::once(Nucleotide::Other)
            .chain(sstruct.sequence.iter())
            .collect();
        self.offset = compute_row_offsets(length);

        let size = self.offset[length] + length + 1;
        self.fc = DpLayer::new(size);
        self.fm = DpLayer::new(size);
        self.fm1 = DpLayer::new(size);
        self.f5 = DpLayer::new(length + 1);

        self.allow_unpaired_position = vec![true; length + 1];
        self.allow_unpaired = vec![true; size];
        self.allow_paired = vec![true; size];

        self.loss_unpaired_position = vec![0.0; length + 1];
        self.loss_unpaired = vec![0.0; size];
        self.loss_paired = vec![0.0; size];
        self.loss_const = 0.0;

        self.reactivity_unpaired_position = vec![0.0; length + 1];
        self.reactivity_unpaired = vec![0.0; size];
        self.reactivity_paired = vec![0.0; size];

        self.state = EngineState::Loaded;
        Ok(())
    }

    /// Installs the feature map and parameter vector(s) the scoring
    /// primitives will read from. `params_base` is the optional Turner
    /// hybrid term (see [`InferenceEngine::with_turner`]); passing `None`
    /// when `with_turner` was set at construction simply means the hybrid
    /// term contributes zero, not an error.
    pub fn load_values(&mut self, feature_map: FeatureMap, params: Vec<f64>, params_base: Option<Vec<f64>>) -> Result<(), EngineError> {
        if params.len() < feature_map.len() {
            return Err(EngineError::ParamVectorTooShort(params.len(), feature_map.len()));
        }
        self.feature_map = Some(feature_map);
        self.params = params;
        self.params_base = params_base;
        self.state = EngineState::Loaded;
        Ok(())
    }

    #[must_use]
    pub fn feature_map(&self) -> Option<&FeatureMap> {
        self.feature_map.as_ref()
    }

    pub(crate) fn is_complementary(&self, i: usize, j: usize) -> bool {
        self.limits.allow_noncomplementary || self.sequence[i].is_complementary(self.sequence[j])
    }

    /// Clears the sparse gradient accumulator; called before every
    /// `compute_viterbi_feature_counts`/`compute_feature_count_expectations`
    /// pass so counts from a previous example never leak into the next.
    pub(crate) fn clear_counts(&mut self) {
        self.counts.clear();
    }

    /// Resolves a trainable weight, blending in the Turner hybrid term
    /// (`params_base`) at the same index when `with_turner` was set and a
    /// base vector was loaded; a missing index or absent hybrid vector
    /// both contribute zero rather than erroring.
    pub(crate) fn param(&self, index: Option<usize>) -> f64 {
        let Some(idx) = index else { return 0.0 };
        let trained = self.params.get(idx).copied().unwrap_or(0.0);
        let hybrid = if self.with_turner {
            self.params_base.as_ref().and_then(|base| base.get(idx)).copied().unwrap_or(0.0)
        } else {
            0.0
        };
        trained + hybrid
    }

    pub(crate) fn accumulate_count(&mut self, index: usize, value: f64) {
        *self.counts.entry(index).or_insert(0.0) += value;
    }

    /// Drains the sparse gradient map accumulated by the most recent
    /// counting pass.
    #[must_use]
    pub fn take_counts(&mut self) -> HashMap<usize, f64> {
        std::mem::take(&mut self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sstruct::Sequence;

    fn toy_sstruct() -> SStruct {
        let seq = Sequence::new(vec![Nucleotide::G, Nucleotide::G, Nucleotide::A, Nucleotide::A, Nucleotide::A, Nucleotide::C, Nucleotide::C]);
        SStruct::new(seq)
    }

    #[test]
    fn load_sequence_moves_state_to_loaded() {
        let mut engine = InferenceEngine::new(false, EngineLimits::default());
        engine.load_sequence(&toy_sstruct()).unwrap();
        assert_eq!(engine.state(), EngineState::Loaded);
        assert_eq!(engine.length(), 7);
    }

    #[test]
    fn sequence_shorter_than_min_hairpin_is_rejected() {
        let mut engine = InferenceEngine::new(false, EngineLimits { min_hairpin_length: 10, ..EngineLimits::default() });
        assert!(engine.load_sequence(&toy_sstruct()).is_err());
    }
}
