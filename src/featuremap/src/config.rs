/// Which optional feature classes are active for a given `FeatureMap`.
///
/// The original source gates each class behind a `PARAMS_*` preprocessor
/// flag, which multiplies into a combinatorial build matrix. Design Note §9
/// of the specification replaces that with a single runtime record that
/// `Score`/`Count` dispatch on the `InferenceEngine` side consults — this is
/// that record. `hairpin_nucleotides`, `internal_nucleotides`,
/// `multi_paired`/`multi_unpaired`, and `external_unpaired`/`external_paired`
/// are never gated (the source leaves them unconditional), so they have no
/// corresponding flag here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    pub base_pair: bool,
    pub base_pair_dist: bool,
    pub terminal_mismatch: bool,
    pub hairpin_length: bool,
    pub helix_length: bool,
    pub isolated_base_pair: bool,
    pub internal_explicit: bool,
    pub bulge_length: bool,
    pub internal_length: bool,
    pub internal_symmetry: bool,
    pub internal_asymmetry: bool,
    pub helix_stacking: bool,
    pub helix_closing: bool,
    pub multi_base: bool,
    pub dangle: bool,
    pub external_length: bool,
}

impl Default for FeatureConfig {
    /// The grammar variant chosen in DESIGN.md: no `FE`/`FN` helix-length or
    /// isolated-pair matrices, explicit internal loops up to length 4 with a
    /// length-bucket fallback beyond that, and no Vienna-style base-pair
    /// distance or terminal-mismatch features.
    fn default() -> Self {
        Self {
            base_pair: true,
            base_pair_dist: false,
            terminal_mismatch: false,
            hairpin_length: true,
            helix_length: false,
            isolated_base_pair: false,
            internal_explicit: true,
            bulge_length: true,
            internal_length: true,
            internal_symmetry: true,
            internal_asymmetry: true,
            helix_stacking: true,
            helix_closing: true,
            multi_base: true,
            dangle: true,
            external_length: true,
        }
    }
}
