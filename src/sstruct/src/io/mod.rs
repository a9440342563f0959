//! Readers and writers for the sequence/structure file formats SStruct is
//! built from: FASTA, dot-bracket parenthetical notation, BPSEQ, and
//! whitespace-separated reactivity files.

mod fasta;
mod parens;
mod bpseq;
mod reactivity;

pub use fasta::read_fasta;
pub use parens::{read_parens, write_parens};
pub use bpseq::{read_bpseq, write_bpseq};
pub use reactivity::read_reactivity;
