use crate::{error::SStructError, mapping::Mapping, sequence::Sequence};

/// Per-position chemical-probing signal. `paired`, when present, is a second
/// column giving the reactivity conditioned on the position being paired —
/// some probing protocols (e.g. DMS-MaPseq with a paired/unpaired split)
/// report both; most report only `unpaired`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reactivity {
    pub unpaired: Vec<f32>,
    pub paired: Option<Vec<f32>>,
}

impl Reactivity {
    #[must_use]
    pub fn len(&self) -> usize {
        self.unpaired.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unpaired.is_empty()
    }
}

/// Immutable per-example view handed to the `InferenceEngine`: a sequence
/// plus whatever supervision is available for it (a known/partial pairing,
/// and/or reactivities). Either, both, or neither may be present — an
/// unlabelled sequence destined only for `predict` carries neither.
#[derive(Debug, Clone)]
pub struct SStruct {
    pub name: Option<String>,
    pub sequence: Sequence,
    pub known_mapping: Option<Mapping>,
    pub reactivity: Option<Reactivity>,
}

impl SStruct {
    #[must_use]
    pub fn new(sequence: Sequence) -> Self {
        Self { name: None, sequence, known_mapping: None, reactivity: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mapping(mut self, mapping: Mapping) -> Result<Self, SStructError> {
        mapping.validate()?;
        self.known_mapping = Some(mapping);
        Ok(self)
    }

    pub fn with_reactivity(mut self, reactivity: Reactivity) -> Result<Self, SStructError> {
        let seq_len = self.sequence.len();
        if reactivity.len() != seq_len {
            return Err(SStructError::ReactivityLengthMismatch { seq_len, reactivity_len: reactivity.len() });
        }
        self.reactivity = Some(reactivity);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
