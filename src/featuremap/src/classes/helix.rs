use sstruct::Nucleotide;

use crate::featuremap::{lookup, FeatureMap};

impl FeatureMap {
    /// Stacking energy between two consecutive base pairs in a helix,
    /// keyed on all four flanking nucleotides.
    #[must_use]
    pub fn find_helix_stacking(&self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide, jm1: Nucleotide) -> Option<usize> {
        lookup(self.cache_helix_stacking[i.code()][j.code()][ip1.code()][jm1.code()])
    }

    pub fn insert_helix_stacking(&mut self, i: Nucleotide, j: Nucleotide, ip1: Nucleotide, jm1: Nucleotide) -> usize {
        if let Some(idx) = self.find_helix_stacking(i, j, ip1, jm1) {
            return idx;
        }
        let idx = self.insert_key(format!("helix_stacking_{i}{j}{ip1}{jm1}"));
        self.cache_helix_stacking[i.code()][j.code()][ip1.code()][jm1.code()] = idx as i64;
        idx
    }

    /// Identity of the pair closing a helix (hairpin, internal loop, or
    /// multi-loop boundary), keyed on the ordered pair only.
    #[must_use]
    pub fn find_helix_closing(&self, i: Nucleotide, j: Nucleotide) -> Option<usize> {
        lookup(self.cache_helix_closing[i.code()][j.code()])
    }

    pub fn insert_helix_closing(&mut self, i: Nucleotide, j: Nucleotide) -> usize {
        if let Some(idx) = self.find_helix_closing(i, j) {
            return idx;
        }
        let idx = self.insert_key(format!("helix_closing_{i}{j}"));
        self.cache_helix_closing[i.code()][j.code()] = idx as i64;
        idx
    }

    /// Explicit internal loop feature for small side lengths `(l1, l2)`,
    /// both clamped to `INTERNAL_EXPLICIT_MAX_LENGTH`; longer loops fall
    /// back to the length-bucket classes instead of this one.
    #[must_use]
    pub fn find_internal_explicit(&self, l1: usize, l2: usize) -> Option<usize> {
        let (l1, l2) = clamp_explicit(l1, l2);
        lookup(self.cache_internal_explicit[l1][l2])
    }

    pub fn insert_internal_explicit(&mut self, l1: usize, l2: usize) -> usize {
        let (l1, l2) = clamp_explicit(l1, l2);
        if let Some(idx) = lookup(self.cache_internal_explicit[l1][l2]) {
            return idx;
        }
        let idx = self.insert_key(format!("internal_explicit_{l1}_{l2}"));
        self.cache_internal_explicit[l1][l2] = idx as i64;
        idx
    }
}

fn clamp_explicit(l1: usize, l2: usize) -> (usize, usize) {
    let max = crate::limits::INTERNAL_EXPLICIT_MAX_LENGTH;
    (l1.min(max), l2.min(max))
}
