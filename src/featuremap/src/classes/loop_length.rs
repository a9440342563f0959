use crate::{featuremap::{lookup, FeatureMap}, limits::clamp};

macro_rules! length_bucket_class {
    ($find:ident, $insert:ident, $cache:ident, $threshold:expr, $name:expr) => {
        impl FeatureMap {
            #[must_use]
            pub fn $find(&self, l: usize) -> Option<usize> {
                let l = clamp(l, $threshold);
                lookup(self.$cache[l])
            }

            pub fn $insert(&mut self, l: usize) -> usize {
                let l = clamp(l, $threshold);
                if let Some(idx) = lookup(self.$cache[l]) {
                    return idx;
                }
                let idx = self.insert_key(format!(concat!($name, "_{}"), l));
                self.$cache[l] = idx as i64;
                idx
            }
        }
    };
}

length_bucket_class!(
    find_hairpin_length_at_least, insert_hairpin_length_at_least,
    cache_hairpin_length_at_least, crate::limits::HAIRPIN_LENGTH_LAST_THRESHOLD,
    "hairpin_length_at_least"
);

length_bucket_class!(
    find_helix_length_at_least, insert_helix_length_at_least,
    cache_helix_length_at_least, crate::limits::HELIX_LENGTH_LAST_THRESHOLD,
    "helix_length_at_least"
);

length_bucket_class!(
    find_bulge_length_at_least, insert_bulge_length_at_least,
    cache_bulge_length_at_least, crate::limits::BULGE_LENGTH_LAST_THRESHOLD,
    "bulge_length_at_least"
);

length_bucket_class!(
    find_internal_length_at_least, insert_internal_length_at_least,
    cache_internal_length_at_least, crate::limits::INTERNAL_LENGTH_LAST_THRESHOLD,
    "internal_length_at_least"
);

length_bucket_class!(
    find_internal_symmetric_length_at_least, insert_internal_symmetric_length_at_least,
    cache_internal_symmetric_length_at_least, crate::limits::INTERNAL_SYMMETRIC_LENGTH_LAST_THRESHOLD,
    "internal_symmetric_length_at_least"
);

length_bucket_class!(
    find_internal_asymmetry_at_least, insert_internal_asymmetry_at_least,
    cache_internal_asymmetry_at_least, crate::limits::INTERNAL_ASYMMETRY_LAST_THRESHOLD,
    "internal_asymmetry_at_least"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hairpin_length_insert_then_find() {
        let mut fm = FeatureMap::default();
        let idx = fm.insert_hairpin_length_at_least(5);
        assert_eq!(fm.find_hairpin_length_at_least(5), Some(idx));
        assert_eq!(fm.name_of(idx), Some("hairpin_length_at_least_5"));
    }

    #[test]
    fn lengths_beyond_threshold_collapse_to_the_same_feature() {
        let mut fm = FeatureMap::default();
        let at_threshold = fm.insert_internal_length_at_least(crate::limits::INTERNAL_LENGTH_LAST_THRESHOLD);
        let way_beyond = fm.insert_internal_length_at_least(crate::limits::INTERNAL_LENGTH_LAST_THRESHOLD + 500);
        assert_eq!(at_threshold, way_beyond);
    }

    #[test]
    fn distinct_classes_do_not_collide() {
        let mut fm = FeatureMap::default();
        let hairpin = fm.insert_hairpin_length_at_least(5);
        let helix = fm.insert_helix_length_at_least(5);
        assert_ne!(hairpin, helix);
    }
}
