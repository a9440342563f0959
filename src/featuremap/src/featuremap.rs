use std::collections::HashMap;

use crate::{config::FeatureConfig, limits::NUM_NUCLEOTIDE_CODES};

/// Sentinel stored in a cache cell meaning "no feature inserted for this key yet".
pub(crate) const NOT_FOUND: i64 = -1;

#[inline]
pub(crate) fn lookup(cache_cell: i64) -> Option<usize> {
    (cache_cell >= 0).then_some(cache_cell as usize)
}

/// Bidirectional registry between human-readable feature names and dense
/// integer indices, with per-class caches for the hot lookup path.
///
/// `FeatureMap` owns no numeric values: the parameter vector (`Vec<f64>`)
/// that the inference engine reads is owned separately by the caller, and
/// `FeatureMap` only ever hands back the index into it.
#[derive(Debug, Clone)]
pub struct FeatureMap {
    pub(crate) config: FeatureConfig,
    pub(crate) hash: HashMap<String, usize>,
    pub(crate) keys: Vec<String>,

    pub(crate) cache_base_pair: Vec<Vec<i64>>,
    pub(crate) cache_base_pair_dist_at_least: Vec<i64>,
    pub(crate) cache_terminal_mismatch: Vec<Vec<Vec<Vec<i64>>>>,
    pub(crate) cache_hairpin_length_at_least: Vec<i64>,
    pub(crate) cache_hairpin_nucleotides: HashMap<String, usize>,
    pub(crate) cache_helix_length_at_least: Vec<i64>,
    pub(crate) cache_isolated_base_pair: i64,
    pub(crate) cache_internal_explicit: Vec<Vec<i64>>,
    pub(crate) cache_bulge_length_at_least: Vec<i64>,
    pub(crate) cache_internal_length_at_least: Vec<i64>,
    pub(crate) cache_internal_symmetric_length_at_least: Vec<i64>,
    pub(crate) cache_internal_asymmetry_at_least: Vec<i64>,
    pub(crate) cache_internal_nucleotides: HashMap<String, usize>,
    pub(crate) cache_helix_stacking: Vec<Vec<Vec<Vec<i64>>>>,
    pub(crate) cache_helix_closing: Vec<Vec<i64>>,
    pub(crate) cache_multi_base: i64,
    pub(crate) cache_multi_unpaired: i64,
    pub(crate) cache_multi_paired: i64,
    pub(crate) cache_dangle_left: Vec<Vec<Vec<i64>>>,
    pub(crate) cache_dangle_right: Vec<Vec<Vec<i64>>>,
    pub(crate) cache_external_unpaired: i64,
    pub(crate) cache_external_paired: i64,
}

impl FeatureMap {
    #[must_use]
    pub fn new(config: FeatureConfig) -> Self {
        let n = NUM_NUCLEOTIDE_CODES;
        Self {
            config,
            hash: HashMap::new(),
            keys: Vec::new(),

            cache_base_pair: vec![vec![NOT_FOUND; n]; n],
            cache_base_pair_dist_at_least: vec![NOT_FOUND; crate::limits::BP_DIST_LAST_THRESHOLD + 1],
            cache_terminal_mismatch: vec![vec![vec![vec![NOT_FOUND; n]; n]; n]; n],
            cache_hairpin_length_at_least: vec![NOT_FOUND; crate::limits::HAIRPIN_LENGTH_LAST_THRESHOLD + 1],
            cache_hairpin_nucleotides: HashMap::new(),
            cache_helix_length_at_least: vec![NOT_FOUND; crate::limits::HELIX_LENGTH_LAST_THRESHOLD + 1],
            cache_isolated_base_pair: NOT_FOUND,
            cache_internal_explicit: vec![vec![NOT_FOUND; crate::limits::INTERNAL_EXPLICIT_MAX_LENGTH + 1]; crate::limits::INTERNAL_EXPLICIT_MAX_LENGTH + 1],
            cache_bulge_length_at_least: vec![NOT_FOUND; crate::limits::BULGE_LENGTH_LAST_THRESHOLD + 1],
            cache_internal_length_at_least: vec![NOT_FOUND; crate::limits::INTERNAL_LENGTH_LAST_THRESHOLD + 1],
            cache_internal_symmetric_length_at_least: vec![NOT_FOUND; crate::limits::INTERNAL_SYMMETRIC_LENGTH_LAST_THRESHOLD + 1],
            cache_internal_asymmetry_at_least: vec![NOT_FOUND; crate::limits::INTERNAL_ASYMMETRY_LAST_THRESHOLD + 1],
            cache_internal_nucleotides: HashMap::new(),
            cache_helix_stacking: vec![vec![vec![vec![NOT_FOUND; n]; n]; n]; n],
            cache_helix_closing: vec![vec![NOT_FOUND; n]; n],
            cache_multi_base: NOT_FOUND,
            cache_multi_unpaired: NOT_FOUND,
            cache_multi_paired: NOT_FOUND,
            cache_dangle_left: vec![vec![vec![NOT_FOUND; n]; n]; n],
            cache_dangle_right: vec![vec![vec![NOT_FOUND; n]; n]; n],
            cache_external_unpaired: NOT_FOUND,
            cache_external_paired: NOT_FOUND,
        }
    }

    #[must_use]
    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Read-only name lookup; does not mutate the map.
    #[must_use]
    pub fn find_key(&self, key: &str) -> Option<usize> {
        self.hash.get(key).copied()
    }

    /// Inserts `key` if absent and returns its index either way.
    pub fn insert_key(&mut self, key: impl Into<String>) -> usize {
        let key = key.into();
        if let Some(&idx) = self.hash.get(&key) {
            return idx;
        }
        let idx = self.keys.len();
        self.hash.insert(key.clone(), idx);
        self.keys.push(key);
        idx
    }

    #[must_use]
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.keys.iter().enumerate().map(|(i, k)| (i, k.as_str()))
    }

    /// A short diagnostic summary: number of inserted features per class,
    /// used by the `validate` subcommand and by debug logging.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} total features (base_pair cache populated: {}, helix_stacking cache populated: {})",
            self.len(),
            self.cache_base_pair.iter().flatten().filter(|&&v| v >= 0).count(),
            self.cache_helix_stacking.iter().flatten().flatten().flatten().filter(|&&v| v >= 0).count(),
        )
    }
}

impl Default for FeatureMap {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_key_is_idempotent() {
        let mut fm = FeatureMap::default();
        let a = fm.insert_key("base_pair_AU");
        let b = fm.insert_key("base_pair_AU");
        assert_eq!(a, b);
        assert_eq!(fm.len(), 1);
    }

    #[test]
    fn find_key_does_not_mutate() {
        let fm = FeatureMap::default();
        assert_eq!(fm.find_key("nonexistent"), None);
        assert_eq!(fm.len(), 0);
    }

    #[test]
    fn indices_are_dense_and_contiguous() {
        let mut fm = FeatureMap::default();
        let names = ["a", "b", "c"];
        let indices: Vec<usize> = names.iter().map(|n| fm.insert_key(*n)).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for (i, n) in names.iter().enumerate() {
            assert_eq!(fm.name_of(i), Some(*n));
        }
    }
}
