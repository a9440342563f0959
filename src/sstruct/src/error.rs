use thiserror::Error;

#[derive(Error, Debug)]
pub enum SStructError {
    #[error("sequence and reactivity vector have mismatched lengths ({seq_len} vs {reactivity_len})")]
    ReactivityLengthMismatch { seq_len: usize, reactivity_len: usize },

    #[error(transparent)]
    InvalidMapping(#[from] crate::mapping::MappingError),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("empty input: no sequence found")]
    EmptySequence,

    #[error("'{0}' is not a recognized nucleotide character")]
    InvalidNucleotide(char),

    #[error("dot-bracket line has length {brackets}, expected {expected} to match the sequence")]
    BracketLengthMismatch { brackets: usize, expected: usize },

    #[error("unbalanced dot-bracket notation: unmatched '{0}' at position {1}")]
    UnbalancedBrackets(char, usize),

    #[error("BPSEQ line {0} is malformed: expected '<pos> <nucleotide> <partner>'")]
    MalformedBpseqLine(usize),

    #[error("BPSEQ line references position {0}, but the sequence has length {1}")]
    BpseqOutOfRange(usize, usize),

    #[error("reactivity line {0} does not parse as one or two floats")]
    MalformedReactivityLine(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
