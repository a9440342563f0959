use crate::featuremap::{lookup, FeatureMap};

impl FeatureMap {
    #[must_use]
    pub fn find_multi_base(&self) -> Option<usize> {
        lookup(self.cache_multi_base)
    }

    pub fn insert_multi_base(&mut self) -> usize {
        if let Some(idx) = self.find_multi_base() {
            return idx;
        }
        let idx = self.insert_key("multi_base");
        self.cache_multi_base = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_multi_unpaired(&self) -> Option<usize> {
        lookup(self.cache_multi_unpaired)
    }

    pub fn insert_multi_unpaired(&mut self) -> usize {
        if let Some(idx) = self.find_multi_unpaired() {
            return idx;
        }
        let idx = self.insert_key("multi_unpaired");
        self.cache_multi_unpaired = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_multi_paired(&self) -> Option<usize> {
        lookup(self.cache_multi_paired)
    }

    pub fn insert_multi_paired(&mut self) -> usize {
        if let Some(idx) = self.find_multi_paired() {
            return idx;
        }
        let idx = self.insert_key("multi_paired");
        self.cache_multi_paired = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_external_unpaired(&self) -> Option<usize> {
        lookup(self.cache_external_unpaired)
    }

    pub fn insert_external_unpaired(&mut self) -> usize {
        if let Some(idx) = self.find_external_unpaired() {
            return idx;
        }
        let idx = self.insert_key("external_unpaired");
        self.cache_external_unpaired = idx as i64;
        idx
    }

    #[must_use]
    pub fn find_external_paired(&self) -> Option<usize> {
        lookup(self.cache_external_paired)
    }

    pub fn insert_external_paired(&mut self) -> usize {
        if let Some(idx) = self.find_external_paired() {
            return idx;
        }
        let idx = self.insert_key("external_paired");
        self.cache_external_paired = idx as i64;
        idx
    }
}
