//! Max-score (Viterbi) parsing: fills `FC`/`FM`/`FM1`/`F5` bottom-up by
//! increasing span, then walks the packed traceback to recover either the
//! optimal pairing or its sparse feature counts.

use std::collections::VecDeque;

use crate::{
    engine::InferenceEngine,
    error::EngineError,
    state::EngineState,
    traceback::{decode_traceback, encode_traceback, TracebackRule, UNREACHABLE},
};

impl InferenceEngine {
    /// Fills every DP layer's Viterbi score and packed traceback. `O(L^3)`
    /// in the bifurcation/single-loop terms, `O(L)` worst case per cell.
    pub fn compute_viterbi(&mut self) -> Result<(), EngineError> {
        self.state.require_at_least(EngineState::Loaded)?;
        let l = self.length;

        for span in 0..=l {
            for i in 1..=l.saturating_sub(span) {
                let j = i + span;
                if let Some(max_span) = self.limits.max_span {
                    if span > max_span {
                        continue;
                    }
                }
                self.fill_fc_cell(i, j);
                self.fill_fm1_cell(i, j);
                self.fill_fm_cell(i, j);
            }
        }

        self.f5.viterbi[0] = 0.0;
        self.f5.traceback[0] = encode_traceback(TracebackRule::F5Zero, 0);
        for j in 1..=l {
            self.fill_f5_cell(j);
        }

        self.state = EngineState::Scored;
        Ok(())
    }

    fn fill_fc_cell(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        if j <= i || !self.is_pair_allowed(i, j) {
            return;
        }

        let mut best = f64::NEG_INFINITY;
        let mut best_tb = UNREACHABLE;

        let loop_len = j - i - 1;
        if loop_len >= self.limits.min_hairpin_length {
            let score = self.score_hairpin(i, j) + self.loss_for_pair(i, j);
            if score > best {
                best = score;
                best_tb = encode_traceback(TracebackRule::FcHairpin, 0);
            }
        }

        for p in (i + 1)..j {
            for q in (p + 1)..j {
                let l1 = p - i - 1;
                let l2 = j - q - 1;
                if l1 + l2 > self.limits.max_single_length {
                    continue;
                }
                if !self.is_pair_allowed(p, q) {
                    continue;
                }
                let inner = self.fc.viterbi[self.cell(p, q)];
                if inner.is_infinite() {
                    continue;
                }
                let score = inner + self.score_single(i, j, p, q) + self.loss_for_pair(i, j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::FcSingle, self.pack_pq(p, q));
                }
            }
        }

        if j >= i + 2 {
            let fm_inner = self.fm.viterbi[self.cell(i + 1, j - 1)];
            if fm_inner.is_finite() {
                let score = fm_inner
                    + self.score_base_pair(i, j)
                    + self.score_junction_multi(i, j)
                    + self.score_multi_base()
                    + self.loss_for_pair(i, j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::FcBifurcation, 0);
                }
            }
        }

        self.fc.viterbi[cell] = best;
        self.fc.traceback[cell] = best_tb;
    }

    fn fill_fm1_cell(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let mut best = f64::NEG_INFINITY;
        let mut best_tb = UNREACHABLE;

        if self.is_pair_allowed(i, j) {
            let fc = self.fc.viterbi[cell];
            if fc.is_finite() {
                let score = fc + self.score_multi_paired();
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::Fm1Paired, 0);
                }
            }
        }
        if j > i && self.allow_unpaired_position[j] {
            let prev = self.fm1.viterbi[self.cell(i, j - 1)];
            if prev.is_finite() {
                let score = prev + self.score_multi_unpaired(j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::Fm1Unpaired, 0);
                }
            }
        }

        self.fm1.viterbi[cell] = best;
        self.fm1.traceback[cell] = best_tb;
    }

    fn fill_fm_cell(&mut self, i: usize, j: usize) {
        let cell = self.cell(i, j);
        let mut best = self.fm1.viterbi[cell];
        let mut best_tb = encode_traceback(TracebackRule::FmFm1, 0);

        if j > i && self.allow_unpaired_position[j] {
            let prev = self.fm.viterbi[self.cell(i, j - 1)];
            if prev.is_finite() {
                let score = prev + self.score_multi_unpaired(j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::FmUnpaired, 0);
                }
            }
        }

        for k in i..j {
            let left = self.fm.viterbi[self.cell(i, k)];
            let right = self.fm1.viterbi[self.cell(k + 1, j)];
            if left.is_finite() && right.is_finite() {
                let score = left + right;
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::FmBifurcation, k);
                }
            }
        }

        self.fm.viterbi[cell] = best;
        self.fm.traceback[cell] = best_tb;
    }

    fn fill_f5_cell(&mut self, j: usize) {
        let mut best = f64::NEG_INFINITY;
        let mut best_tb = UNREACHABLE;

        if self.allow_unpaired_position[j] {
            let prev = self.f5.viterbi[j - 1];
            if prev.is_finite() {
                let score = prev + self.score_external_unpaired(j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::F5Unpaired, 0);
                }
            }
        }

        for k in 0..j {
            if !self.is_pair_allowed(k + 1, j) {
                continue;
            }
            let left = self.f5.viterbi[k];
            let right = self.fc.viterbi[self.cell(k + 1, j)];
            if left.is_finite() && right.is_finite() {
                let score = left + right + self.score_external_paired() + self.score_junction_external(k + 1, j);
                if score > best {
                    best = score;
                    best_tb = encode_traceback(TracebackRule::F5Bifurcation, k);
                }
            }
        }

        self.f5.viterbi[j] = best;
        self.f5.traceback[j] = best_tb;
    }

    #[must_use]
    pub fn viterbi_score(&self) -> f64 {
        self.f5.viterbi[self.length]
    }

    fn pack_pq(&self, p: usize, q: usize) -> usize {
        p * (self.length + 1) + q
    }

    fn unpack_pq(&self, packed: usize) -> (usize, usize) {
        (packed / (self.length + 1), packed % (self.length + 1))
    }

    /// Walks the traceback from `F5[L]` and returns a 1-based mapping
    /// (`0` = unpaired, otherwise the partner position), the same shape
    /// `sstruct::Mapping` expects.
    pub fn predict_pairings_viterbi(&mut self) -> Result<Vec<usize>, EngineError> {
        self.state.require_at_least(EngineState::Scored)?;
        let mut mapping = vec![0; self.length + 1];

        let mut queue: VecDeque<(&'static str, usize, usize)> = VecDeque::new();
        queue.push_back(("F5", 0, self.length));

        while let Some((matrix, i, j)) = queue.pop_front() {
            match matrix {
                "F5" => {
                    if j == 0 {
                        continue;
                    }
                    let (rule, split) = decode_traceback(self.f5.traceback[j]);
                    match rule {
                        TracebackRule::F5Zero => {}
                        TracebackRule::F5Unpaired => queue.push_back(("F5", 0, j - 1)),
                        TracebackRule::F5Bifurcation => {
                            queue.push_back(("F5", 0, split));
                            queue.push_back(("FC", split + 1, j));
                        }
                        _ => unreachable!("F5 traceback produced a non-F5 rule"),
                    }
                }
                "FC" => {
                    mapping[i] = j;
                    mapping[j] = i;
                    let (rule, split) = decode_traceback(self.fc.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::FcHairpin => {}
                        TracebackRule::FcSingle => {
                            let (p, q) = self.unpack_pq(split);
                            queue.push_back(("FC", p, q));
                        }
                        TracebackRule::FcBifurcation => queue.push_back(("FM", i + 1, j - 1)),
                        _ => unreachable!("FC traceback produced a non-FC rule"),
                    }
                }
                "FM" => {
                    let (rule, split) = decode_traceback(self.fm.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::FmFm1 => queue.push_back(("FM1", i, j)),
                        TracebackRule::FmUnpaired => queue.push_back(("FM", i, j - 1)),
                        TracebackRule::FmBifurcation => {
                            queue.push_back(("FM", i, split));
                            queue.push_back(("FM1", split + 1, j));
                        }
                        _ => unreachable!("FM traceback produced a non-FM rule"),
                    }
                }
                "FM1" => {
                    let (rule, _split) = decode_traceback(self.fm1.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::Fm1Paired => queue.push_back(("FC", i, j)),
                        TracebackRule::Fm1Unpaired => queue.push_back(("FM1", i, j - 1)),
                        _ => unreachable!("FM1 traceback produced a non-FM1 rule"),
                    }
                }
                _ => unreachable!(),
            }
        }

        self.state = EngineState::TracedBack;
        Ok(mapping)
    }

    /// Re-walks the same traceback as [`InferenceEngine::predict_pairings_viterbi`],
    /// but accumulates `Count*` contributions instead of recovering pairs.
    /// Used to compute the feature-count vector for the single best parse,
    /// the gradient term structured-perceptron/hinge training needs.
    pub fn compute_viterbi_feature_counts(&mut self) -> Result<std::collections::HashMap<usize, f64>, EngineError> {
        self.state.require_at_least(EngineState::Scored)?;
        self.clear_counts();

        let mut queue: VecDeque<(&'static str, usize, usize)> = VecDeque::new();
        queue.push_back(("F5", 0, self.length));

        while let Some((matrix, i, j)) = queue.pop_front() {
            match matrix {
                "F5" => {
                    if j == 0 {
                        continue;
                    }
                    let (rule, split) = decode_traceback(self.f5.traceback[j]);
                    match rule {
                        TracebackRule::F5Zero => {}
                        TracebackRule::F5Unpaired => {
                            self.count_external_unpaired(1.0);
                            queue.push_back(("F5", 0, j - 1));
                        }
                        TracebackRule::F5Bifurcation => {
                            self.count_external_paired(1.0);
                            self.count_junction_external(split + 1, j, 1.0);
                            queue.push_back(("F5", 0, split));
                            queue.push_back(("FC", split + 1, j));
                        }
                        _ => unreachable!(),
                    }
                }
                "FC" => {
                    let (rule, split) = decode_traceback(self.fc.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::FcHairpin => self.count_hairpin(i, j, 1.0),
                        TracebackRule::FcSingle => {
                            let (p, q) = self.unpack_pq(split);
                            self.count_single(i, j, p, q, 1.0);
                            queue.push_back(("FC", p, q));
                        }
                        TracebackRule::FcBifurcation => {
                            self.count_base_pair(i, j, 1.0);
                            self.count_junction_multi(i, j, 1.0);
                            self.count_multi_base(1.0);
                            queue.push_back(("FM", i + 1, j - 1));
                        }
                        _ => unreachable!(),
                    }
                }
                "FM" => {
                    let (rule, split) = decode_traceback(self.fm.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::FmFm1 => queue.push_back(("FM1", i, j)),
                        TracebackRule::FmUnpaired => {
                            self.count_multi_unpaired(1.0);
                            queue.push_back(("FM", i, j - 1));
                        }
                        TracebackRule::FmBifurcation => {
                            queue.push_back(("FM", i, split));
                            queue.push_back(("FM1", split + 1, j));
                        }
                        _ => unreachable!(),
                    }
                }
                "FM1" => {
                    let (rule, _split) = decode_traceback(self.fm1.traceback[self.cell(i, j)]);
                    match rule {
                        TracebackRule::Fm1Paired => {
                            self.count_multi_paired(1.0);
                            queue.push_back(("FC", i, j));
                        }
                        TracebackRule::Fm1Unpaired => {
                            self.count_multi_unpaired(1.0);
                            queue.push_back(("FM1", i, j - 1));
                        }
                        _ => unreachable!(),
                    }
                }
                _ => unreachable!(),
            }
        }

        Ok(self.take_counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::EngineLimits;
    use featuremap::FeatureMap;
    use sstruct::{Nucleotide, Sequence, SStruct};

    fn toy_engine() -> InferenceEngine {
        let mut engine = InferenceEngine::new(false, EngineLimits::default());
        let seq = Sequence::new(vec![
            Nucleotide::G, Nucleotide::G, Nucleotide::G,
            Nucleotide::A, Nucleotide::A, Nucleotide::A,
            Nucleotide::C, Nucleotide::C, Nucleotide::C,
        ]);
        engine.load_sequence(&SStruct::new(seq)).unwrap();
        let fm = FeatureMap::default();
        let params = vec![0.0; 4096];
        engine.load_values(fm, params, None).unwrap();
        engine
    }

    #[test]
    fn viterbi_folds_the_toy_hairpin() {
        let mut engine = toy_engine();
        engine.compute_viterbi().unwrap();
        let mapping = engine.predict_pairings_viterbi().unwrap();
        assert_eq!(mapping[1], 9);
        assert_eq!(mapping[9], 1);
        assert_eq!(mapping[4], 0);
    }

    #[test]
    fn viterbi_score_is_finite_for_a_foldable_sequence() {
        let mut engine = toy_engine();
        engine.compute_viterbi().unwrap();
        assert!(engine.viterbi_score().is_finite());
    }
}
