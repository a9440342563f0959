//! The `Count*` primitives: the gradient-accumulation twin of every
//! `Score*` primitive in `scoring.rs`. Each resolves (inserting if
//! necessary) the same feature index its `Score*` counterpart would have
//! looked up, then adds `value` into the sparse gradient map at that
//! index. Keeping the two files structurally parallel is what keeps the
//! score/count invariant easy to audit by inspection.

use crate::engine::InferenceEngine;

impl InferenceEngine {
    fn count_via(&mut self, index: usize, value: f64) {
        self.accumulate_count(index, value);
    }

    pub(crate) fn count_base_pair(&mut self, i: usize, j: usize, value: f64) {
        let (a, b) = (self.sequence[i], self.sequence[j]);
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_base_pair(a, b);
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_helix_closing(&mut self, i: usize, j: usize, value: f64) {
        let (a, b) = (self.sequence[i], self.sequence[j]);
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_helix_closing(a, b);
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_helix_stacking(&mut self, i: usize, j: usize, value: f64) {
        let (a, b, c, d) = (self.sequence[i], self.sequence[j], self.sequence[i + 1], self.sequence[j - 1]);
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_helix_stacking(a, b, c, d);
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_junction_b(&mut self, i: usize, j: usize, value: f64) {
        self.count_helix_closing(i, j, value);
    }

    pub(crate) fn count_junction_hairpin(&mut self, i: usize, j: usize, value: f64) {
        self.count_junction_b(i, j, value);
    }

    pub(crate) fn count_junction_internal(&mut self, i: usize, j: usize, value: f64) {
        self.count_junction_b(i, j, value);
    }

    pub(crate) fn count_junction_multi(&mut self, i: usize, j: usize, value: f64) {
        self.count_junction_b(i, j, value);
    }

    pub(crate) fn count_junction_external(&mut self, i: usize, j: usize, value: f64) {
        self.count_junction_b(i, j, value);
    }

    pub(crate) fn count_multi_base(&mut self, value: f64) {
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_multi_base();
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_multi_paired(&mut self, value: f64) {
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_multi_paired();
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_multi_unpaired(&mut self, value: f64) {
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_multi_unpaired();
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_external_paired(&mut self, value: f64) {
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_external_paired();
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_external_unpaired(&mut self, value: f64) {
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_external_unpaired();
            self.count_via(idx, value);
        }
    }

    fn window(&self, from: usize, to: usize) -> String {
        (from..=to).map(|k| char::from(self.sequence[k])).collect()
    }

    pub(crate) fn count_hairpin(&mut self, i: usize, j: usize, value: f64) {
        let loop_len = j - i - 1;
        self.count_base_pair(i, j, value);
        self.count_junction_hairpin(i, j, value);

        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_hairpin_length_at_least(loop_len);
            self.count_via(idx, value);
        }
        if loop_len <= self.limits.max_hairpin_nucleotides_length && loop_len > 0 {
            let window = self.window(i + 1, j - 1);
            if let Some(fm) = self.feature_map.as_mut() {
                let idx = fm.insert_hairpin_nucleotides(&window);
                self.count_via(idx, value);
            }
        }
    }

    pub(crate) fn count_single_nucleotides(&mut self, i: usize, j: usize, p: usize, q: usize, value: f64) {
        let l1 = p - i - 1;
        let l2 = j - q - 1;
        if l1 + l2 == 0 || l1 + l2 > self.limits.max_single_nucleotides_length {
            return;
        }
        let mut window = String::new();
        if l1 > 0 {
            window.push_str(&self.window(i + 1, p - 1));
        }
        if l2 > 0 {
            window.push_str(&self.window(q + 1, j - 1));
        }
        if let Some(fm) = self.feature_map.as_mut() {
            let idx = fm.insert_internal_nucleotides(&window);
            self.count_via(idx, value);
        }
    }

    pub(crate) fn count_single(&mut self, i: usize, j: usize, p: usize, q: usize, value: f64) {
        let l1 = p - i - 1;
        let l2 = j - q - 1;

        if l1 == 0 && l2 == 0 {
            self.count_base_pair(i, j, value);
            self.count_helix_stacking(i, j, value);
            return;
        }

        self.count_base_pair(i, j, value);
        self.count_junction_internal(i, j, value);
        self.count_junction_internal(j, i, value);
        self.count_single_nucleotides(i, j, p, q, value);

        if l1 <= featuremap::INTERNAL_EXPLICIT_MAX_LENGTH && l2 <= featuremap::INTERNAL_EXPLICIT_MAX_LENGTH {
            if let Some(fm) = self.feature_map.as_mut() {
                let idx = fm.insert_internal_explicit(l1, l2);
                self.count_via(idx, value);
            }
        } else {
            if let Some(fm) = self.feature_map.as_mut() {
                let idx = fm.insert_internal_length_at_least(l1 + l2);
                self.count_via(idx, value);
            }
            if l1 == 0 || l2 == 0 {
                if let Some(fm) = self.feature_map.as_mut() {
                    let idx = fm.insert_bulge_length_at_least(l1.max(l2));
                    self.count_via(idx, value);
                }
            } else {
                if let Some(fm) = self.feature_map.as_mut() {
                    let idx = fm.insert_internal_symmetric_length_at_least(l1.min(l2));
                    self.count_via(idx, value);
                }
                if let Some(fm) = self.feature_map.as_mut() {
                    let idx = fm.insert_internal_asymmetry_at_least(l1.abs_diff(l2));
                    self.count_via(idx, value);
                }
            }
        }
    }
}
