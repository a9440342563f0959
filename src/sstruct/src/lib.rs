//! `sstruct`: the immutable per-example view handed to the inference engine.
//!
//! Owns the base data model — [`Nucleotide`], [`Sequence`], pairing
//! [`Mapping`] — plus file-format readers/writers for FASTA, dot-bracket,
//! BPSEQ, and reactivity files.

mod nucleotide;
pub use nucleotide::{Nucleotide, ParseNucleotideError};

mod sequence;
pub use sequence::Sequence;

mod mapping;
pub use mapping::{Mapping, MappingError, PairState};

mod sstruct;
pub use crate::sstruct::{Reactivity, SStruct};

pub mod error;
pub use error::SStructError;

pub mod io;
