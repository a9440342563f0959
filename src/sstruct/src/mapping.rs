use thiserror::Error;

#[derive(Error, Debug)]
pub enum MappingError {
    #[error("position {0} is out of range for a mapping of length {1}")]
    OutOfRange(usize, usize),

    #[error("position {i} maps to {j}, but {j} maps back to {back} instead of {i}")]
    Asymmetric { i: usize, j: usize, back: usize },

    #[error("pairs ({i1},{j1}) and ({i2},{j2}) cross")]
    Crossing { i1: usize, j1: usize, i2: usize, j2: usize },

    #[error("position {0} is paired to itself")]
    SelfPaired(usize),
}

/// The known/predicted pairing state of a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Paired(usize),
    Unpaired,
    Unknown,
}

/// A length-`L+1` pairing of a sequence (index 0 unused), either the ground
/// truth supplied alongside training examples or a predicted structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    states: Vec<PairState>,
}

impl Mapping {
    #[must_use]
    pub fn unknown(length: usize) -> Self {
        Self { states: vec![PairState::Unknown; length + 1] }
    }

    #[must_use]
    pub fn from_states(states: Vec<PairState>) -> Self {
        Self { states }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, i: usize) -> PairState {
        self.states.get(i).copied().unwrap_or(PairState::Unknown)
    }

    pub fn set_pair(&mut self, i: usize, j: usize) {
        self.states[i] = PairState::Paired(j);
        self.states[j] = PairState::Paired(i);
    }

    pub fn set_unpaired(&mut self, i: usize) {
        self.states[i] = PairState::Unpaired;
    }

    /// All `(i, j)` pairs with `i < j`, sorted by `i`.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for i in 1..self.states.len() {
            if let PairState::Paired(j) = self.states[i] {
                if i < j {
                    out.push((i, j));
                }
            }
        }
        out
    }

    /// Checks invariants #1 (nested pairing) and #2 (symmetry) from the
    /// testable-properties list: every `Paired(j)` is reciprocated, and no
    /// two pairs cross.
    pub fn validate(&self) -> Result<(), MappingError> {
        let l = self.len();
        for i in 1..=l {
            if let PairState::Paired(j) = self.states[i] {
                if j == i {
                    return Err(MappingError::SelfPaired(i));
                }
                if j == 0 || j > l {
                    return Err(MappingError::OutOfRange(j, l));
                }
                match self.states[j] {
                    PairState::Paired(back) if back == i => {},
                    other => {
                        let back = match other { PairState::Paired(b) => b, _ => 0 };
                        return Err(MappingError::Asymmetric { i, j, back });
                    }
                }
            }
        }

        let pairs = self.pairs();
        for a in 0..pairs.len() {
            for b in (a + 1)..pairs.len() {
                let (i1, j1) = pairs[a];
                let (i2, j2) = pairs[b];
                if (i1 < i2 && i2 < j1 && j1 < j2) || (i2 < i1 && i1 < j2 && j2 < j1) {
                    return Err(MappingError::Crossing { i1, j1, i2, j2 });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_mapping_validates() {
        let mut m = Mapping::unknown(10);
        m.set_pair(1, 10);
        m.set_pair(2, 9);
        m.set_pair(3, 8);
        for i in 4..=7 { m.set_unpaired(i); }
        assert!(m.validate().is_ok());
        assert_eq!(m.pairs(), vec![(1, 10), (2, 9), (3, 8)]);
    }

    #[test]
    fn crossing_pairs_rejected() {
        let mut m = Mapping::unknown(4);
        m.set_pair(1, 3);
        m.set_pair(2, 4);
        assert!(matches!(m.validate(), Err(MappingError::Crossing { .. })));
    }

    #[test]
    fn asymmetric_mapping_rejected() {
        let mut m = Mapping::unknown(4);
        m.set_pair(1, 4);
        m.set_unpaired(4); // break the back-reference
        assert!(matches!(m.validate(), Err(MappingError::Asymmetric { .. })));
    }
}
