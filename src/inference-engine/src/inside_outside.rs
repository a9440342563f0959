//! Inside/outside recursion in log-space, mirroring the shape of
//! `viterbi.rs`'s fill order but summing alternatives with
//! [`crate::logspace::log_add`] instead of taking a max, and adding a
//! second, reversed pass to propagate outside scores back down from `F5`.

use std::collections::HashMap;

use crate::{
    engine::InferenceEngine,
    error::EngineError,
    logspace::{log_add, log_sum},
    state::EngineState,
};

impl InferenceEngine {
    /// Fills the inside layer of every matrix. Requires `compute_viterbi`
    /// to have already sized and pair-gated the DP layers (it shares
    /// `allow_paired`/`allow_unpaired_position` with the Viterbi pass).
    pub fn compute_inside(&mut self) -> Result<(), EngineError> {
        self.state.require_at_least(EngineState::Scored)?;
        let l = self.length;

        for span in 0..=l {
            for i in 1..=l.saturating_sub(span) {
                let j = i + span;
                if let Some(max_span) = self.limits.max_span {
                    if span > max_span {
                        continue;
                    }
                }
                self.fill_fc_inside(i, j);
                self.fill_fm1_inside(i, j);
                self.fill_fm_inside(i, j);
            }
        }

        self.f5.inside[0] = 0.0;
        for j in 1..=l {
            self.fill_f5_inside(j);
        }

        self.state = EngineState::Inside;
        Ok(())
    }

    fn fill_fc_inside(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        if j <= i || !self.is_pair_allowed(i, j) {
            return;
        }

        let mut terms = Vec::new();
        let loop_len = j - i - 1;
        if loop_len >= self.limits.min_hairpin_length {
            terms.push(self.score_hairpin(i, j) + self.loss_for_pair(i, j));
        }
        for p in (i + 1)..j {
            for q in (p + 1)..j {
                let l1 = p - i - 1;
                let l2 = j - q - 1;
                if l1 + l2 > self.limits.max_single_length || !self.is_pair_allowed(p, q) {
                    continue;
                }
                let inner = self.fc.inside[self.cell(p, q)];
                if inner.is_finite() {
                    terms.push(inner + self.score_single(i, j, p, q) + self.loss_for_pair(i, j));
                }
            }
        }
        if j >= i + 2 {
            let fm_inner = self.fm.inside[self.cell(i + 1, j - 1)];
            if fm_inner.is_finite() {
                terms.push(
                    fm_inner + self.score_base_pair(i, j) + self.score_junction_multi(i, j) + self.score_multi_base() + self.loss_for_pair(i, j),
                );
            }
        }

        self.fc.inside[cell] = log_sum(terms);
    }

    fn fill_fm1_inside(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let mut terms = Vec::new();

        if self.is_pair_allowed(i, j) {
            let fc = self.fc.inside[cell];
            if fc.is_finite() {
                terms.push(fc + self.score_multi_paired());
            }
        }
        if j > i && self.allow_unpaired_position[j] {
            let prev = self.fm1.inside[self.cell(i, j - 1)];
            if prev.is_finite() {
                terms.push(prev + self.score_multi_unpaired(j));
            }
        }

        self.fm1.inside[cell] = log_sum(terms);
    }

    fn fill_fm_inside(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let mut terms = vec![self.fm1.inside[cell]];

        if j > i && self.allow_unpaired_position[j] {
            let prev = self.fm.inside[self.cell(i, j - 1)];
            if prev.is_finite() {
                terms.push(prev + self.score_multi_unpaired(j));
            }
        }
        for k in i..j {
            let left = self.fm.inside[self.cell(i, k)];
            let right = self.fm1.inside[self.cell(k + 1, j)];
            if left.is_finite() && right.is_finite() {
                terms.push(left + right);
            }
        }

        self.fm.inside[cell] = log_sum(terms);
    }

    fn fill_f5_inside(&mut self, j: usize) {
        let mut terms = Vec::new();

        if self.allow_unpaired_position[j] {
            let prev = self.f5.inside[j - 1];
            if prev.is_finite() {
                terms.push(prev + self.score_external_unpaired(j));
            }
        }
        for k in 0..j {
            if !self.is_pair_allowed(k + 1, j) {
                continue;
            }
            let left = self.f5.inside[k];
            let right = self.fc.inside[self.cell(k + 1, j)];
            if left.is_finite() && right.is_finite() {
                terms.push(left + right + self.score_external_paired() + self.score_junction_external(k + 1, j));
            }
        }

        self.f5.inside[j] = log_sum(terms);
    }

    /// `ln Z`, the log partition coefficient over every structure
    /// compatible with the loaded constraints.
    #[must_use]
    pub fn compute_log_partition_coefficient(&self) -> f64 {
        self.f5.inside[self.length]
    }

    /// Fills the outside layer, propagating `F5[L]`'s outside score of `0`
    /// back down through every production that could have produced each
    /// cell.
    pub fn compute_outside(&mut self) -> Result<(), EngineError> {
        self.state.require_at_least(EngineState::Inside)?;
        let l = self.length;

        self.f5.outside[l] = 0.0;
        for j in (1..=l).rev() {
            self.propagate_f5_outside(j);
        }
        self.f5.outside[0] = log_add(self.f5.outside[0], 0.0);

        for span in (0..=l).rev() {
            for i in 1..=l.saturating_sub(span) {
                let j = i + span;
                self.propagate_fm_outside(i, j);
                self.propagate_fm1_outside(i, j);
                self.propagate_fc_outside(i, j);
            }
        }

        self.state = EngineState::Outside;
        Ok(())
    }

    fn propagate_f5_outside(&mut self, j: usize) {
        let out_j = self.f5.outside[j];
        if out_j.is_infinite() {
            return;
        }
        if self.allow_unpaired_position[j] {
            let edge = out_j + self.score_external_unpaired(j);
            self.f5.outside[j - 1] = log_add(self.f5.outside[j - 1], edge);
        }
        for k in 0..j {
            if !self.is_pair_allowed(k + 1, j) {
                continue;
            }
            let right = self.fc.inside[self.cell(k + 1, j)];
            let left = self.f5.inside[k];
            if !right.is_finite() || !left.is_finite() {
                continue;
            }
            let transition = self.score_external_paired() + self.score_junction_external(k + 1, j);
            self.f5.outside[k] = log_add(self.f5.outside[k], out_j + right + transition);
            let cell = self.cell(k + 1, j);
            self.fc.outside[cell] = log_add(self.fc.outside[cell], out_j + left + transition);
        }
    }

    fn propagate_fc_outside(&mut self, i: usize, j: usize) {
        if j <= i || !self.is_pair_allowed(i, j) {
            return;
        }
        let out = self.fc.outside[self.cell(i, j)];
        if out.is_infinite() {
            return;
        }

        for p in (i + 1)..j {
            for q in (p + 1)..j {
                let l1 = p - i - 1;
                let l2 = j - q - 1;
                if l1 + l2 > self.limits.max_single_length || !self.is_pair_allowed(p, q) {
                    continue;
                }
                let inner = self.fc.inside[self.cell(p, q)];
                if inner.is_finite() {
                    let edge = out + self.score_single(i, j, p, q) + self.loss_for_pair(i, j);
                    let cell = self.cell(p, q);
                    self.fc.outside[cell] = log_add(self.fc.outside[cell], edge);
                }
            }
        }

        if j >= i + 2 {
            let fm_cell = self.cell(i + 1, j - 1);
            let fm_inner = self.fm.inside[fm_cell];
            if fm_inner.is_finite() {
                let edge = out
                    + self.score_base_pair(i, j)
                    + self.score_junction_multi(i, j)
                    + self.score_multi_base()
                    + self.loss_for_pair(i, j);
                self.fm.outside[fm_cell] = log_add(self.fm.outside[fm_cell], edge);
            }
        }
    }

    fn propagate_fm1_outside(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let out = self.fm1.outside[cell];
        if out.is_infinite() {
            return;
        }

        if self.is_pair_allowed(i, j) {
            let fc = self.fc.inside[cell];
            if fc.is_finite() {
                let edge = out + self.score_multi_paired();
                self.fc.outside[cell] = log_add(self.fc.outside[cell], edge);
            }
        }
        if j > i && self.allow_unpaired_position[j] {
            let prev_cell = self.cell(i, j - 1);
            let prev = self.fm1.inside[prev_cell];
            if prev.is_finite() {
                let edge = out + self.score_multi_unpaired(j);
                self.fm1.outside[prev_cell] = log_add(self.fm1.outside[prev_cell], edge);
            }
        }
    }

    fn propagate_fm_outside(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let out = self.fm.outside[cell];
        if out.is_infinite() {
            return;
        }

        self.fm1.outside[cell] = log_add(self.fm1.outside[cell], out);

        if j > i && self.allow_unpaired_position[j] {
            let prev_cell = self.cell(i, j - 1);
            let prev = self.fm.inside[prev_cell];
            if prev.is_finite() {
                let edge = out + self.score_multi_unpaired(j);
                self.fm.outside[prev_cell] = log_add(self.fm.outside[prev_cell], edge);
            }
        }
        for k in i..j {
            let left_cell = self.cell(i, k);
            let right_cell = self.cell(k + 1, j);
            let left = self.fm.inside[left_cell];
            let right = self.fm1.inside[right_cell];
            if left.is_finite() && right.is_finite() {
                self.fm.outside[left_cell] = log_add(self.fm.outside[left_cell], out + right);
                self.fm1.outside[right_cell] = log_add(self.fm1.outside[right_cell], out + left);
            }
        }
    }

    /// Fills `fc.posterior[i, j]` with the marginal base-pairing
    /// probability `P(i pairs j)`.
    pub fn compute_posterior(&mut self) -> Result<(), EngineError> {
        self.state.require_at_least(EngineState::Outside)?;
        let z = self.compute_log_partition_coefficient();
        let l = self.length;
        for i in 1..=l {
            for j in (i + 1)..=l {
                let cell = self.cell(i, j);
                let log_p = self.fc.inside[cell] + self.fc.outside[cell] - z;
                self.fc.posterior[cell] = log_p.exp().clamp(0.0, 1.0);
            }
        }
        self.state = EngineState::Posterior;
        Ok(())
    }

    /// Returns `P(i pairs j)` for `i < j`, or `0.0` if the pair was never
    /// reachable under the loaded constraints.
    #[must_use]
    pub fn posterior(&self, i: usize, j: usize) -> f64 {
        self.fc.posterior[self.cell(i.min(j), i.max(j))]
    }

    /// The expected feature counts under the posterior distribution —
    /// `E[count(feature) | sequence]` — computed by weighting each
    /// production's edge probability (`exp(left + right + transition +
    /// parent_outside - Z)`) and feeding it through the same `Count*`
    /// primitives the Viterbi pass uses for a single parse.
    pub fn compute_feature_count_expectations(&mut self) -> Result<HashMap<usize, f64>, EngineError> {
        self.state.require_at_least(EngineState::Outside)?;
        self.clear_counts();
        let z = self.compute_log_partition_coefficient();
        let l = self.length;

        for j in 1..=l {
            let out = self.f5.outside[j];
            if out.is_finite() && self.allow_unpaired_position[j] {
                let prev = self.f5.inside[j - 1];
                if prev.is_finite() {
                    let p = (prev + self.score_external_unpaired(j) + out - z).exp();
                    self.count_external_unpaired(p);
                }
            }
            for k in 0..j {
                if !self.is_pair_allowed(k + 1, j) {
                    continue;
                }
                let left = self.f5.inside[k];
                let right = self.fc.inside[self.cell(k + 1, j)];
                let out = self.f5.outside[j];
                if left.is_finite() && right.is_finite() && out.is_finite() {
                    let transition = self.score_external_paired() + self.score_junction_external(k + 1, j);
                    let p = (left + right + transition + out - z).exp();
                    self.count_external_paired(p);
                    self.count_junction_external(k + 1, j, p);
                }
            }
        }

        for i in 1..=l {
            for j in (i + 1)..=l {
                if !self.is_pair_allowed(i, j) {
                    continue;
                }
                let out = self.fc.outside[self.cell(i, j)];
                if out.is_infinite() {
                    continue;
                }

                let loop_len = j - i - 1;
                if loop_len >= self.limits.min_hairpin_length {
                    let p = (self.score_hairpin(i, j) + self.loss_for_pair(i, j) + out - z).exp();
                    self.count_hairpin(i, j, p);
                }

                for p_idx in (i + 1)..j {
                    for q in (p_idx + 1)..j {
                        let l1 = p_idx - i - 1;
                        let l2 = j - q - 1;
                        if l1 + l2 > self.limits.max_single_length || !self.is_pair_allowed(p_idx, q) {
                            continue;
                        }
                        let inner = self.fc.inside[self.cell(p_idx, q)];
                        if inner.is_finite() {
                            let prob = (inner + self.score_single(i, j, p_idx, q) + self.loss_for_pair(i, j) + out - z).exp();
                            self.count_single(i, j, p_idx, q, prob);
                        }
                    }
                }

                if j >= i + 2 {
                    let fm_inner = self.fm.inside[self.cell(i + 1, j - 1)];
                    if fm_inner.is_finite() {
                        let prob = (fm_inner
                            + self.score_base_pair(i, j)
                            + self.score_junction_multi(i, j)
                            + self.score_multi_base()
                            + self.loss_for_pair(i, j)
                            + out
                            - z)
                            .exp();
                        self.count_base_pair(i, j, prob);
                        self.count_junction_multi(i, j, prob);
                        self.count_multi_base(prob);
                    }
                }
            }
        }

        for i in 1..=l {
            for j in i..=l {
                let cell = self.cell(i, j);
                let out = self.fm1.outside[cell];
                if out.is_infinite() {
                    continue;
                }
                if self.is_pair_allowed(i, j) {
                    let fc = self.fc.inside[cell];
                    if fc.is_finite() {
                        let p = (fc + self.score_multi_paired() + out - z).exp();
                        self.count_multi_paired(p);
                    }
                }
                if j > i && self.allow_unpaired_position[j] {
                    let prev = self.fm1.inside[self.cell(i, j - 1)];
                    if prev.is_finite() {
                        let p = (prev + self.score_multi_unpaired(j) + out - z).exp();
                        self.count_multi_unpaired(p);
                    }
                }
            }
        }

        for i in 1..=l {
            for j in i..=l {
                let cell = self.cell(i, j);
                let out = self.fm.outside[cell];
                if out.is_infinite() {
                    continue;
                }
                if j > i && self.allow_unpaired_position[j] {
                    let prev = self.fm.inside[self.cell(i, j - 1)];
                    if prev.is_finite() {
                        let p = (prev + self.score_multi_unpaired(j) + out - z).exp();
                        self.count_multi_unpaired(p);
                    }
                }
            }
        }

        Ok(self.take_counts())
    }
}
