use sstruct::Nucleotide;

use crate::{featuremap::{lookup, FeatureMap}, limits::clamp};

impl FeatureMap {
    /// `find_base_pair(i, j) → index | None`. Keyed on the ordered pair of
    /// nucleotide codes that close a helix, e.g. `base_pair_AU`.
    #[must_use]
    pub fn find_base_pair(&self, i: Nucleotide, j: Nucleotide) -> Option<usize> {
        lookup(self.cache_base_pair[i.code()][j.code()])
    }

    pub fn insert_base_pair(&mut self, i: Nucleotide, j: Nucleotide) -> usize {
        if let Some(idx) = self.find_base_pair(i, j) {
            return idx;
        }
        let idx = self.insert_key(format!("base_pair_{i}{j}"));
        self.cache_base_pair[i.code()][j.code()] = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_base_pair_dist_at_least(&self, l: usize) -> Option<usize> {
        let l = clamp(l, crate::limits::BP_DIST_LAST_THRESHOLD);
        lookup(self.cache_base_pair_dist_at_least[l])
    }

    pub fn insert_base_pair_dist_at_least(&mut self, l: usize) -> usize {
        let l = clamp(l, crate::limits::BP_DIST_LAST_THRESHOLD);
        if let Some(idx) = lookup(self.cache_base_pair_dist_at_least[l]) {
            return idx;
        }
        let idx = self.insert_key(format!("base_pair_dist_at_least_{l}"));
        self.cache_base_pair_dist_at_least[l] = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_isolated_base_pair(&self) -> Option<usize> {
        lookup(self.cache_isolated_base_pair)
    }

    pub fn insert_isolated_base_pair(&mut self) -> usize {
        if let Some(idx) = self.find_isolated_base_pair() {
            return idx;
        }
        let idx = self.insert_key("isolated_base_pair");
        self.cache_isolated_base_pair = idx as i64;
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sstruct::Nucleotide::{A, C, G, U};

    #[test]
    fn insert_then_find_base_pair() {
        let mut fm = FeatureMap::default();
        assert_eq!(fm.find_base_pair(A, U), None);
        let idx = fm.insert_base_pair(A, U);
        assert_eq!(fm.find_base_pair(A, U), Some(idx));
        assert_eq!(fm.name_of(idx), Some("base_pair_AU"));
    }

    #[test]
    fn distinct_pairs_get_distinct_indices() {
        let mut fm = FeatureMap::default();
        let au = fm.insert_base_pair(A, U);
        let gc = fm.insert_base_pair(G, C);
        assert_ne!(au, gc);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut fm = FeatureMap::default();
        let a = fm.insert_base_pair(A, U);
        let b = fm.insert_base_pair(A, U);
        assert_eq!(a, b);
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn base_pair_dist_clamps_to_threshold() {
        let mut fm = FeatureMap::default();
        let far = fm.insert_base_pair_dist_at_least(10_000);
        let at_threshold = fm.insert_base_pair_dist_at_least(crate::limits::BP_DIST_LAST_THRESHOLD);
        assert_eq!(far, at_threshold);
    }
}
