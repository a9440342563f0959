use std::io::BufRead;

use located_error::prelude::*;

use crate::{error::ParseError, nucleotide::Nucleotide, sequence::Sequence, sstruct::SStruct};

/// Parses a single-record FASTA file: `>name` header followed by sequence
/// lines over `{A,C,G,U,T,N}`. `T` is folded to `U` at this boundary by
/// [`Nucleotide::try_from`]; the engine never sees `T`.
///
/// Only the first record is read — multi-FASTA batches are handled by the
/// caller iterating records, mirroring how `grups-io`'s readers hand back one
/// parsed unit per call rather than an internal loop.
pub fn read_fasta(source: impl BufRead) -> Result<SStruct> {
    let context = || "While parsing a FASTA record";

    let mut name = None;
    let mut residues = Vec::new();
    for (lineno, line) in source.lines().enumerate() {
        let line = line.with_loc(context)?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if name.is_some() {
                break; // stop at the next record
            }
            name = Some(header.trim().to_string());
            continue;
        }
        for c in line.chars() {
            let nuc = Nucleotide::try_from(c)
                .map_err(|_| ParseError::InvalidNucleotide(c))
                .with_loc(|| format!("While parsing FASTA sequence line {}", lineno + 1))?;
            residues.push(nuc);
        }
    }

    if residues.is_empty() {
        return Err(ParseError::EmptySequence).with_loc(context);
    }

    let mut sstruct = SStruct::new(Sequence::new(residues));
    if let Some(name) = name {
        sstruct = sstruct.with_name(name);
    }
    Ok(sstruct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_sequence() {
        let fasta = ">example\nGGGAAAUCCC\n";
        let sstruct = read_fasta(fasta.as_bytes()).unwrap();
        assert_eq!(sstruct.name.as_deref(), Some("example"));
        assert_eq!(sstruct.sequence.to_string(), "GGGAAAUCCC");
    }

    #[test]
    fn folds_dna_t_to_u() {
        let fasta = ">d\nGGGAAATCCC\n";
        let sstruct = read_fasta(fasta.as_bytes()).unwrap();
        assert_eq!(sstruct.sequence.to_string(), "GGGAAAUCCC");
    }

    #[test]
    fn multiline_sequence_is_concatenated() {
        let fasta = ">multi\nGGGA\nAAUC\nCC\n";
        let sstruct = read_fasta(fasta.as_bytes()).unwrap();
        assert_eq!(sstruct.sequence.to_string(), "GGGAAAUCCC");
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(read_fasta("".as_bytes()).is_err());
    }

    #[test]
    fn only_the_first_record_is_read() {
        let fasta = ">first\nGGGG\n>second\nCCCC\n";
        let sstruct = read_fasta(fasta.as_bytes()).unwrap();
        assert_eq!(sstruct.sequence.to_string(), "GGGG");
    }
}
