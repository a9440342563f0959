//! The `Score*` primitives: each one resolves a feature through the loaded
//! `FeatureMap` and multiplies by the matching entry in the parameter
//! vector, folding in whatever loss/reactivity augmentation is active.
//! Every primitive here has a `Count*` twin in `counting.rs` that performs
//! the same feature resolution but accumulates into the sparse gradient
//! map instead of reading a parameter — the two must stay in lock step,
//! since `counting.rs` is how gradients flow back into training.

use crate::engine::InferenceEngine;

impl InferenceEngine {
    pub(crate) fn score_base_pair(&self, i: usize, j: usize) -> f64 {
        let idx = self.feature_map.as_ref().and_then(|fm| fm.find_base_pair(self.sequence[i], self.sequence[j]));
        self.param(idx)
    }

    pub(crate) fn score_helix_closing(&self, i: usize, j: usize) -> f64 {
        let idx = self.feature_map.as_ref().and_then(|fm| fm.find_helix_closing(self.sequence[i], self.sequence[j]));
        self.param(idx)
    }

    pub(crate) fn score_helix_stacking(&self, i: usize, j: usize) -> f64 {
        let idx = self.feature_map.as_ref().and_then(|fm| {
            fm.find_helix_stacking(self.sequence[i], self.sequence[j], self.sequence[i + 1], self.sequence[j - 1])
        });
        self.param(idx)
    }

    /// Junction context seen from outside the loop the pair closes.
    pub(crate) fn score_junction_b(&self, i: usize, j: usize) -> f64 {
        self.score_helix_closing(i, j)
    }

    /// Junction context for the same pair seen from inside the loop it
    /// encloses (the mirrored orientation).
    pub(crate) fn score_junction_a(&self, i: usize, j: usize) -> f64 {
        self.score_helix_closing(j, i)
    }

    pub(crate) fn score_junction_hairpin(&self, i: usize, j: usize) -> f64 {
        self.score_junction_b(i, j)
    }

    pub(crate) fn score_junction_internal(&self, i: usize, j: usize) -> f64 {
        self.score_junction_b(i, j)
    }

    /// 1xN and 2x3 internal loops get distinguished junction terms in the
    /// full Turner model; this grammar variant folds them into the general
    /// internal-loop junction instead of adding dedicated feature classes.
    pub(crate) fn score_junction_internal_1n(&self, i: usize, j: usize) -> f64 {
        self.score_junction_internal(i, j)
    }

    pub(crate) fn score_junction_internal_23(&self, i: usize, j: usize) -> f64 {
        self.score_junction_internal(i, j)
    }

    pub(crate) fn score_junction_multi(&self, i: usize, j: usize) -> f64 {
        self.score_junction_b(i, j)
    }

    pub(crate) fn score_junction_external(&self, i: usize, j: usize) -> f64 {
        self.score_junction_b(i, j)
    }

    pub(crate) fn score_unpaired_position(&self, k: usize) -> f64 {
        let mut value = self.loss_unpaired_position[k];
        value += f64::from(self.reactivity_unpaired_position[k]);
        value
    }

    pub(crate) fn score_unpaired(&self, i: usize, j: usize) -> f64 {
        ((i + 1)..=j).map(|k| self.score_unpaired_position(k)).sum()
    }

    pub(crate) fn score_multi_base(&self) -> f64 {
        self.param(self.feature_map.as_ref().and_then(featuremap::FeatureMap::find_multi_base))
    }

    pub(crate) fn score_multi_paired(&self) -> f64 {
        self.param(self.feature_map.as_ref().and_then(featuremap::FeatureMap::find_multi_paired))
    }

    pub(crate) fn score_multi_unpaired(&self, k: usize) -> f64 {
        self.param(self.feature_map.as_ref().and_then(featuremap::FeatureMap::find_multi_unpaired)) + self.score_unpaired_position(k)
    }

    pub(crate) fn score_external_paired(&self) -> f64 {
        self.param(self.feature_map.as_ref().and_then(featuremap::FeatureMap::find_external_paired))
    }

    pub(crate) fn score_external_unpaired(&self, k: usize) -> f64 {
        self.param(self.feature_map.as_ref().and_then(featuremap::FeatureMap::find_external_unpaired)) + self.score_unpaired_position(k)
    }

    fn window(&self, from: usize, to: usize) -> String {
        (from..=to).map(|k| char::from(self.sequence[k])).collect()
    }

    pub(crate) fn score_hairpin(&self, i: usize, j: usize) -> f64 {
        let loop_len = j - i - 1;
        let mut score = self.score_base_pair(i, j)
            + self.score_junction_hairpin(i, j)
            + self.score_unpaired(i, j)
            + self.param(self.feature_map.as_ref().and_then(|fm| fm.find_hairpin_length_at_least(loop_len)));

        if loop_len <= self.limits.max_hairpin_nucleotides_length && loop_len > 0 {
            let window = self.window(i + 1, j - 1);
            score += self.param(self.feature_map.as_ref().and_then(|fm| fm.find_hairpin_nucleotides(&window)));
        }
        score
    }

    /// The nucleotide-window component of an internal loop/bulge, split out
    /// from [`InferenceEngine::score_single`] so it can be gated separately
    /// by `max_single_nucleotides_length`, mirroring the original
    /// engine's `ScoreSingleNucleotides`/`ScoreSingle` split.
    pub(crate) fn score_single_nucleotides(&self, i: usize, j: usize, p: usize, q: usize) -> f64 {
        let l1 = p - i - 1;
        let l2 = j - q - 1;
        if l1 + l2 == 0 || l1 + l2 > self.limits.max_single_nucleotides_length {
            return 0.0;
        }
        let mut window = String::new();
        if l1 > 0 {
            window.push_str(&self.window(i + 1, p - 1));
        }
        if l2 > 0 {
            window.push_str(&self.window(q + 1, j - 1));
        }
        self.param(self.feature_map.as_ref().and_then(|fm| fm.find_internal_nucleotides(&window)))
    }

    /// Scores the new pair `(i, j)` enclosing the already-scored pair
    /// `(p, q)`. Does not re-score `(p, q)` itself — that contribution is
    /// already folded into `FC[p, q]`.
    pub(crate) fn score_single(&self, i: usize, j: usize, p: usize, q: usize) -> f64 {
        let l1 = p - i - 1;
        let l2 = j - q - 1;

        if l1 == 0 && l2 == 0 {
            return self.score_base_pair(i, j) + self.score_helix_stacking(i, j);
        }

        let mut score = self.score_base_pair(i, j)
            + self.score_junction_internal(i, j)
            + self.score_junction_internal(j, i)
            + self.score_single_nucleotides(i, j, p, q)
            + self.score_unpaired(i, p - 1)
            + self.score_unpaired(q, j - 1);

        let fm = self.feature_map.as_ref();
        if l1 <= featuremap::INTERNAL_EXPLICIT_MAX_LENGTH && l2 <= featuremap::INTERNAL_EXPLICIT_MAX_LENGTH {
            score += self.param(fm.and_then(|fm| fm.find_internal_explicit(l1, l2)));
        } else {
            score += self.param(fm.and_then(|fm| fm.find_internal_length_at_least(l1 + l2)));
            if l1 == 0 || l2 == 0 {
                score += self.param(fm.and_then(|fm| fm.find_bulge_length_at_least(l1.max(l2))));
            } else {
                score += self.param(fm.and_then(|fm| fm.find_internal_symmetric_length_at_least(l1.min(l2))));
                score += self.param(fm.and_then(|fm| fm.find_internal_asymmetry_at_least(l1.abs_diff(l2))));
            }
        }
        score
    }

    pub(crate) fn is_pair_allowed(&self, i: usize, j: usize) -> bool {
        self.allow_paired[self.cell(i, j)] && self.is_complementary(i, j)
    }

    /// Additive loss contribution for scoring `(i, j)` as paired, used by
    /// loss-augmented (structured-hinge) Viterbi decoding.
    pub(crate) fn loss_for_pair(&self, i: usize, j: usize) -> f64 {
        self.loss_paired[self.cell(i, j)]
    }
}
