use sstruct::Nucleotide;

use crate::featuremap::{lookup, FeatureMap};

impl FeatureMap {
    /// The four nucleotides flanking a closing base pair: `(i, j)` pair plus
    /// the unpaired neighbours `i+1` and `j-1`.
    #[must_use]
    pub fn find_terminal_mismatch(&self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide, jm1: Nucleotide) -> Option<usize> {
        lookup(self.cache_terminal_mismatch[i.code()][j.code()][ip1.code()][jm1.code()])
    }

    pub fn insert_terminal_mismatch(&mut self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide, jm1: Nucleotide) -> usize {
        if let Some(idx) = self.find_terminal_mismatch(i, j, ip1, jm1) {
            return idx;
        }
        let idx = self.insert_key(format!("terminal_mismatch_{i}{j}{ip1}{jm1}"));
        self.cache_terminal_mismatch[i.code()][j.code()][ip1.code()][jm1.code()] = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_dangle_left(&self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide) -> Option<usize> {
        lookup(self.cache_dangle_left[i.code()][j.code()][ip1.code()])
    }

    pub fn insert_dangle_left(&mut self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide) -> usize {
        if let Some(idx) = self.find_dangle_left(i, j, ip1) {
            return idx;
        }
        let idx = self.insert_key(format!("dangle_left_{i}{j}{ip1}"));
        self.cache_dangle_left[i.code()][j.code()][ip1.code()] = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_dangle_right(&self, i: Nucleotide, j: Nucleotide, jm1: Nucleotide) -> Option<usize> {
        lookup(self.cache_dangle_right[i.code()][j.code()][jm1.code()])
    }

    pub fn insert_dangle_right(&mut self, i: Nucleotide, j: Nucleotide, jm1: Nucleotide) -> usize {
        if let Some(idx) = self.find_dangle_right(i, j, jm1) {
            return idx;
        }
        let idx = self.insert_key(format!("dangle_right_{i}{j}{jm1}"));
        self.cache_dangle_right[i.code()][j.code()][jm1.code()] = idx as i64;
        idx
    }

    /// Hairpin loop interior sequence, unconditionally hashed rather than
    /// cached in a flat array since its key space (a variable-length window
    /// of nucleotides) has no fixed bound.
    #[must_use]
    pub fn find_hairpin_nucleotides(&self, window: &str) -> Option<usize> {
        self.cache_hairpin_nucleotides.get(window).copied()
    }

    pub fn insert_hairpin_nucleotides(&mut self, window: &str) -> usize {
        if let Some(&idx) = self.cache_hairpin_nucleotides.get(window) {
            return idx;
        }
        let idx = self.insert_key(format!("hairpin_nucleotides_{window}"));
        self.cache_hairpin_nucleotides.insert(window.to_string(), idx);
        idx
    }

    #[must_use]
    pub fn find_internal_nucleotides(&self, window: &str) -> Option<usize> {
        self.cache_internal_nucleotides.get(window).copied()
    }

    pub fn insert_internal_nucleotides(&mut self, window: &str) -> usize {
        if let Some(&idx) = self.cache_internal_nucleotides.get(window) {
            return idx;
        }
        let idx = self.insert_key(format!("internal_nucleotides_{window}"));
        self.cache_internal_nucleotides.insert(window.to_string(), idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sstruct::Nucleotide::{A, C, G, U};

    #[test]
    fn terminal_mismatch_insert_then_find() {
        let mut fm = FeatureMap::default();
        let idx = fm.insert_terminal_mismatch(A, U, G, C);
        assert_eq!(fm.find_terminal_mismatch(A, U, G, C), Some(idx));
    }

    #[test]
    fn dangle_left_and_right_do_not_collide() {
        let mut fm = FeatureMap::default();
        let left = fm.insert_dangle_left(A, U, G);
        let right = fm.insert_dangle_right(A, U, G);
        assert_ne!(left, right);
    }

    #[test]
    fn hairpin_nucleotides_hashes_by_window_content() {
        let mut fm = FeatureMap::default();
        let a = fm.insert_hairpin_nucleotides("GAAA");
        let b = fm.insert_hairpin_nucleotides("GAAA");
        let c = fm.insert_hairpin_nucleotides("GCAA");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hairpin_and_internal_nucleotide_windows_are_distinct_classes() {
        let mut fm = FeatureMap::default();
        let hairpin = fm.insert_hairpin_nucleotides("GAAA");
        let internal = fm.insert_internal_nucleotides("GAAA");
        assert_ne!(hairpin, internal);
    }
}
