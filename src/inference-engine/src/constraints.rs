//! Hard and soft structural constraints: restricting the search space to
//! structures compatible with a partially-known mapping, or biasing it
//! with chemical-probing reactivity without forbidding anything outright.

use crate::engine::InferenceEngine;

impl InferenceEngine {
    /// Restricts the grammar to structures consistent with `true_mapping`
    /// (`0` = unconstrained/unpaired, otherwise the 1-based partner).
    /// Positions known paired may only pair with their partner; positions
    /// known unpaired may not pair at all.
    pub fn use_constraints(&mut self, true_mapping: &[usize]) {
        for i in 1..=self.length {
            let partner = true_mapping.get(i).copied().unwrap_or(0);
            self.allow_unpaired_position[i] = partner == 0;
        }
        for i in 1..=self.length {
            for j in i..=self.length {
                let cell = self.cell(i, j);
                let i_partner = true_mapping.get(i).copied().unwrap_or(0);
                let j_partner = true_mapping.get(j).copied().unwrap_or(0);
                let allowed = match (i_partner, j_partner) {
                    (0, 0) => true,
                    (p, q) => p == j && q == i,
                };
                self.allow_paired[cell] = allowed;
            }
        }
    }

    /// Scales reactivity into a soft per-position bias rather than a hard
    /// constraint: every position stays reachable, but high reactivity
    /// nudges the score away from pairing it.
    pub fn use_soft_constraints(&mut self, reactivity_pair: &[f32], scale_reactivity: f64) {
        for i in 1..=self.length.min(reactivity_pair.len()) {
            self.reactivity_unpaired_position[i] = reactivity_pair[i - 1];
            self.loss_unpaired_position[i] -= scale_reactivity * f64::from(reactivity_pair[i - 1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::EngineLimits;
    use sstruct::{Nucleotide, Sequence, SStruct};

    fn toy_engine() -> InferenceEngine {
        let mut engine = InferenceEngine::new(false, EngineLimits::default());
        let seq = Sequence::new(vec![Nucleotide::G, Nucleotide::G, Nucleotide::G, Nucleotide::A, Nucleotide::A, Nucleotide::A, Nucleotide::C, Nucleotide::C, Nucleotide::C]);
        engine.load_sequence(&SStruct::new(seq)).unwrap();
        engine
    }

    #[test]
    fn known_unpaired_position_forbids_every_pair_touching_it() {
        let mut engine = toy_engine();
        let mut mapping = vec![0; engine.length() + 1];
        mapping[4] = 0;
        engine.use_constraints(&mapping);
        assert!(!engine.allow_paired[engine.cell(4, 7)]);
    }

    #[test]
    fn known_pair_forbids_every_other_partner() {
        let mut engine = toy_engine();
        let mut mapping = vec![0; engine.length() + 1];
        mapping[1] = 9;
        mapping[9] = 1;
        engine.use_constraints(&mapping);
        assert!(engine.allow_paired[engine.cell(1, 9)]);
        assert!(!engine.allow_paired[engine.cell(1, 8)]);
    }
}
