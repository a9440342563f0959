//! Structured-hinge loss augmentation for training: `UseLoss*` biases the
//! Viterbi recursion away from the gold structure by adding a per-feature
//! penalty, so that `ComputeViterbi` on a loss-augmented engine returns the
//! "loss-augmented" max-score parse needed for a margin update instead of
//! the plain max-score parse.

use crate::engine::InferenceEngine;

impl InferenceEngine {
    /// Adds a flat example-level loss to every structure scored, and a
    /// pairwise disagreement loss against `true_mapping` (`0` = unpaired,
    /// otherwise the 1-based partner position) for every `(i, j)` pair the
    /// predicted structure could form.
    pub fn use_loss(&mut self, true_mapping: &[usize], example_loss: f64) {
        self.loss_const = example_loss;
        for i in 1..=self.length {
            for j in i..=self.length {
                let gold_pair = true_mapping.get(i).copied().unwrap_or(0) == j;
                self.loss_paired[self.cell(i, j)] = if gold_pair { 0.0 } else { 1.0 };
            }
        }
    }

    /// Pairwise loss weighted separately for false positives (`neg_w`) and
    /// false negatives (`pos_w`) against the gold base pairs.
    pub fn use_loss_base_pair(&mut self, true_mapping: &[usize], pos_w: f64, neg_w: f64) {
        for i in 1..=self.length {
            for j in i..=self.length {
                let gold_pair = true_mapping.get(i).copied().unwrap_or(0) == j;
                self.loss_paired[self.cell(i, j)] = if gold_pair { -pos_w } else { neg_w };
            }
        }
    }

    /// Per-position loss for predicting `i` paired/unpaired against the
    /// gold mapping.
    pub fn use_loss_position(&mut self, true_mapping: &[usize], pos_w: f64, neg_w: f64) {
        for i in 1..=self.length {
            let gold_paired = true_mapping.get(i).copied().unwrap_or(0) != 0;
            self.loss_unpaired_position[i] = if gold_paired { neg_w } else { -pos_w };
        }
    }

    /// Treats chemical-probing reactivity as a soft label: high reactivity
    /// at `i` is evidence `i` is unpaired, so predicting it paired incurs
    /// `pos_w * reactivity[i]`, and vice versa.
    pub fn use_loss_reactivity(&mut self, reactivity_pair: &[f32], pos_w: f64, neg_w: f64) {
        for i in 1..=self.length.min(reactivity_pair.len()) {
            let r = f64::from(reactivity_pair[i - 1]);
            self.loss_unpaired_position[i] += neg_w * (1.0 - r) - pos_w * r;
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
    fn gold_pair_incurs_no_base_pair_loss() {
        let mut engine = toy_engine();
        let mut mapping = vec![0; engine.length() + 1];
        mapping[1] = 9;
        mapping[9] = 1;
        engine.use_loss_base_pair(&mapping, 1.0, 1.0);
        assert_eq!(engine.loss_for_pair(1, 9), -1.0);
        assert_eq!(engine.loss_for_pair(1, 2), 1.0);
    }
}
