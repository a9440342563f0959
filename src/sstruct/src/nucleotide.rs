use std::{borrow::Borrow, fmt::{self, Display}, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug)]
#[error("'{0}' is not a valid nucleotide character")]
pub struct ParseNucleotideError(pub char);

/// A single RNA residue.
///
/// `Other` covers any symbol outside the canonical alphabet (e.g. an ambiguity
/// code coming out of a FASTA file); the engine treats it as never pairing and
/// never satisfying a canonical base-pair feature lookup.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Nucleotide { A, C, G, U, Other }

impl Nucleotide {
    /// Dense 0-based code used to index `FeatureMap`'s per-class caches.
    ///
    /// `Other` is deliberately placed last so that canonical-pair caches can
    /// be sized `[[T; 4]; 4]` and only fall back to the larger `[[T; 5]; 5]`
    /// layout when a class needs to key on it.
    #[must_use]
    pub fn code(self) -> usize {
        match self {
            Self::A => 0,
            Self::C => 1,
            Self::G => 2,
            Self::U => 3,
            Self::Other => 4,
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Other)
    }

    /// Whether `(self, other)` forms a canonical Watson-Crick or wobble pair:
    /// A-U, G-C, G-U (and their reverses).
    #[must_use]
    pub fn is_complementary(self, other: Self) -> bool {
        use Nucleotide::{A, C, G, U};
        matches!(
            (self, other),
            (A, U) | (U, A) | (G, C) | (C, G) | (G, U) | (U, G)
        )
    }
}

impl From<Nucleotide> for char {
    fn from(value: Nucleotide) -> Self {
        match value {
            Nucleotide::A     => 'A',
            Nucleotide::C     => 'C',
            Nucleotide::G     => 'G',
            Nucleotide::U     => 'U',
            Nucleotide::Other => 'N',
        }
    }
}

impl TryFrom<char> for Nucleotide {
    type Error = ParseNucleotideError;

    /// Parses a FASTA-style residue character. `T` folds to `U` (DNA input
    /// tolerated at the file boundary); any other unrecognized letter is
    /// accepted as `Other` rather than rejected, matching how pileup-style
    /// parsers in this codebase treat unknown bases as a sentinel instead of
    /// a hard parse failure.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'C' => Ok(Self::C),
            'G' => Ok(Self::G),
            'U' | 'T' => Ok(Self::U),
            c if c.is_ascii_alphabetic() => Ok(Self::Other),
            _ => Err(ParseNucleotideError(value)),
        }
    }
}

impl FromStr for Nucleotide {
    type Err = ParseNucleotideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let c = chars.next().ok_or(ParseNucleotideError('\0'))?;
        if chars.next().is_some() {
            return Err(ParseNucleotideError(c));
        }
        Self::try_from(c)
    }
}

impl Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&char::from(*self), f)
    }
}

impl Borrow<char> for Nucleotide {
    fn borrow(&self) -> &char {
        match self {
            Self::A => &'A',
            Self::C => &'C',
            Self::G => &'G',
            Self::U => &'U',
            Self::Other => &'N',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_from_char_canonical() {
        assert_eq!(Nucleotide::try_from('A').unwrap(), Nucleotide::A);
        assert_eq!(Nucleotide::try_from('c').unwrap(), Nucleotide::C);
        assert_eq!(Nucleotide::try_from('G').unwrap(), Nucleotide::G);
        assert_eq!(Nucleotide::try_from('U').unwrap(), Nucleotide::U);
    }

    #[test]
    fn dna_t_folds_to_u() {
        assert_eq!(Nucleotide::try_from('T').unwrap(), Nucleotide::U);
        assert_eq!(Nucleotide::try_from('t').unwrap(), Nucleotide::U);
    }

    #[test]
    fn unknown_letter_is_other() {
        assert_eq!(Nucleotide::try_from('N').unwrap(), Nucleotide::Other);
        assert_eq!(Nucleotide::try_from('x').unwrap(), Nucleotide::Other);
    }

    #[test]
    fn non_letter_is_error() {
        assert!(Nucleotide::try_from('1').is_err());
    }

    #[test]
    fn display_roundtrip() {
        for n in [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::U] {
            let rendered = format!("{n}");
            assert_eq!(Nucleotide::try_from(rendered.chars().next().unwrap()).unwrap(), n);
        }
    }

    #[test]
    fn complementary_pairs() {
        use Nucleotide::{A, C, G, U};
        for (a, b) in [(A, U), (U, A), (G, C), (C, G), (G, U), (U, G)] {
            assert!(a.is_complementary(b));
        }
        assert!(!A.is_complementary(C));
        assert!(!A.is_complementary(G));
    }

    #[test]
    fn codes_are_dense_and_distinct() {
        let codes: Vec<usize> = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::U, Nucleotide::Other]
            .iter().map(|n| n.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
        assert!(codes.iter().all(|&c| c < 5));
    }
}
