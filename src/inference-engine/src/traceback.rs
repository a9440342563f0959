//! Packed traceback encoding: a production rule tag plus the split point
//! that rule used, packed into a single `i64` cell so each DP matrix needs
//! only one extra parallel array instead of two.
//!
//! The grammar variant this engine implements has no `FE`/`FN` helix-length
//! or isolated-base-pair matrices (see `DESIGN.md`), so `TracebackRule` only
//! carries the `FC`/`FM`/`FM1`/`F5` productions.

const RULE_SHIFT: i64 = 24;
const SPLIT_MASK: i64 = (1 << RULE_SHIFT) - 1;

/// Sentinel for a DP cell that has not been computed (forbidden by span or
/// loop-length limits).
pub const UNREACHABLE: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracebackRule {
    FcHairpin,
    FcSingle,
    FcBifurcation,
    Fm1Paired,
    Fm1Unpaired,
    FmBifurcation,
    FmUnpaired,
    FmFm1,
    F5Zero,
    F5Unpaired,
    F5Bifurcation,
}

impl TracebackRule {
    const ALL: [TracebackRule; 11] = [
        TracebackRule::FcHairpin,
        TracebackRule::FcSingle,
        TracebackRule::FcBifurcation,
        TracebackRule::Fm1Paired,
        TracebackRule::Fm1Unpaired,
        TracebackRule::FmBifurcation,
        TracebackRule::FmUnpaired,
        TracebackRule::FmFm1,
        TracebackRule::F5Zero,
        TracebackRule::F5Unpaired,
        TracebackRule::F5Bifurcation,
    ];

    fn tag(self) -> i64 {
        Self::ALL.iter().position(|&r| r == self).expect("exhaustive ALL") as i64
    }

    fn from_tag(tag: i64) -> Self {
        Self::ALL[tag as usize]
    }
}

/// Packs a rule and its split point (the bifurcation point `k`, or `0` for
/// rules with no split) into one cell. `split` must fit in 24 bits, which
/// comfortably covers any sequence this engine is practical on.
#[must_use]
pub fn encode_traceback(rule: TracebackRule, split: usize) -> i64 {
    debug_assert!((split as i64) <= SPLIT_MASK, "split point overflowed the traceback packing");
    (rule.tag() << RULE_SHIFT) | (split as i64 & SPLIT_MASK)
}

/// Inverse of [`encode_traceback`]. Panics if `cell` is [`UNREACHABLE`];
/// callers must check that first.
#[must_use]
pub fn decode_traceback(cell: i64) -> (TracebackRule, usize) {
    debug_assert!(cell >= 0, "decoded an unreachable traceback cell");
    let tag = cell >> RULE_SHIFT;
    let split = (cell & SPLIT_MASK) as usize;
    (TracebackRule::from_tag(tag), split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_rule() {
        for &rule in TracebackRule::ALL.iter() {
            let encoded = encode_traceback(rule, 17);
            let (decoded_rule, decoded_split) = decode_traceback(encoded);
            assert_eq!(decoded_rule, rule);
            assert_eq!(decoded_split, 17);
        }
    }

    #[test]
    fn split_zero_round_trips() {
        let encoded = encode_traceback(TracebackRule::F5Zero, 0);
        assert_eq!(decode_traceback(encoded), (TracebackRule::F5Zero, 0));
    }
}
