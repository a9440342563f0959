use crate::traceback::UNREACHABLE;

/// One `FC`/`FM`/`FM1` DP layer: four parallel score arrays (Viterbi,
/// inside, outside, posterior) plus a packed traceback array, all indexed
/// by the same `(i, j)` offset table. `F5` reuses this type with a single
/// row (see [`crate::engine::InferenceEngine::f5_index`]).
#[derive(Debug, Clone)]
pub struct DpLayer {
    pub viterbi: Vec<f64>,
    pub inside: Vec<f64>,
    pub outside: Vec<f64>,
    pub posterior: Vec<f64>,
    pub traceback: Vec<i64>,
}

impl DpLayer {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            viterbi: vec![f64::NEG_INFINITY; size],
            inside: vec![f64::NEG_INFINITY; size],
            outside: vec![f64::NEG_INFINITY; size],
            posterior: vec![0.0; size],
            traceback: vec![UNREACHABLE; size],
        }
    }

    pub fn clear(&mut self) {
        self.viterbi.fill(f64::NEG_INFINITY);
        self.inside.fill(f64::NEG_INFINITY);
        self.outside.fill(f64::NEG_INFINITY);
        self.posterior.fill(0.0);
        self.traceback.fill(UNREACHABLE);
    }
}

/// Row offsets for flattening a square `(L+1) x (L+1)` index space into a
/// single `Vec`. Kept as its own table (mirroring the original engine's
/// `offset` field) rather than recomputing `i * (n + 1)` inline at every
/// call site.
#[must_use]
pub fn compute_row_offsets(length: usize) -> Vec<usize> {
    (0..=length).map(|i| i * (length + 1)).collect()
}

#[inline]
#[must_use]
pub fn cell(offset: &[usize], i: usize, j: usize) -> usize {
    offset[i] + j
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_give_distinct_cells_for_every_pair() {
        let offset = compute_row_offsets(4);
        let mut seen = std::collections::HashSet::new();
        for i in 0..=4 {
            for j in 0..=4 {
                assert!(seen.insert(cell(&offset, i, j)));
            }
        }
    }

    #[test]
    fn fresh_layer_is_all_unreachable() {
        let layer = DpLayer::new(9);
        assert!(layer.viterbi.iter().all(|v| v.is_infinite() && v.is_sign_negative()));
        assert!(layer.traceback.iter().all(|&t| t == UNREACHABLE));
    }
}
