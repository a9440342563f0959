use std::io::{BufRead, Write};

use located_error::prelude::*;

use crate::{
    error::ParseError,
    mapping::Mapping,
    nucleotide::Nucleotide,
    sequence::Sequence,
    sstruct::SStruct,
};

/// Parses the two-line dot-bracket format: sequence, then a same-length
/// `.()` pairing line, matched by a stack (standard nesting, no pseudoknot
/// bracket alphabets).
pub fn read_parens(source: impl BufRead) -> Result<SStruct> {
    let context = || "While parsing parenthetical (dot-bracket) notation";
    let mut lines = source.lines();

    let seq_line = lines.next().ok_or(ParseError::EmptySequence).with_loc(context)??;
    let residues: Vec<Nucleotide> = seq_line.trim().chars()
        .map(|c| Nucleotide::try_from(c).map_err(|_| ParseError::InvalidNucleotide(c)))
        .collect::<Result<_, _>>()
        .with_loc(context)?;
    if residues.is_empty() {
        return Err(ParseError::EmptySequence).with_loc(context);
    }

    let bracket_line = lines.next()
        .ok_or_else(|| ParseError::BracketLengthMismatch { brackets: 0, expected: residues.len() })
        .with_loc(context)??;
    let bracket_line = bracket_line.trim();
    if bracket_line.len() != residues.len() {
        return Err(ParseError::BracketLengthMismatch { brackets: bracket_line.chars().count(), expected: residues.len() })
            .with_loc(context);
    }

    let mut mapping = Mapping::unknown(residues.len());
    let mut stack: Vec<usize> = Vec::new();
    for (idx, c) in bracket_line.chars().enumerate() {
        let pos = idx + 1;
        match c {
            '.' => mapping.set_unpaired(pos),
            '(' => stack.push(pos),
            ')' => {
                let open = stack.pop()
                    .ok_or(ParseError::UnbalancedBrackets(')', pos))
                    .with_loc(context)?;
                mapping.set_pair(open, pos);
            }
            other => return Err(ParseError::InvalidNucleotide(other)).with_loc(context),
        }
    }
    if let Some(unmatched) = stack.pop() {
        return Err(ParseError::UnbalancedBrackets('(', unmatched)).with_loc(context);
    }

    let sstruct = SStruct::new(Sequence::new(residues)).with_mapping(mapping)?;
    Ok(sstruct)
}

/// Writes a predicted pairing back out in dot-bracket notation.
pub fn write_parens(mut sink: impl Write, sstruct: &SStruct, mapping: &Mapping) -> Result<()> {
    writeln!(sink, "{}", sstruct.sequence)?;
    let mut line = String::with_capacity(sstruct.len());
    for i in 1..=sstruct.len() {
        line.push(match mapping.get(i) {
            crate::mapping::PairState::Paired(j) if j > i => '(',
            crate::mapping::PairState::Paired(_) => ')',
            _ => '.',
        });
    }
    writeln!(sink, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_structure() {
        let input = "GGGAAAUCCC\n(((...)))\n";
        let sstruct = read_parens(input.as_bytes()).unwrap();
        let pairs = sstruct.known_mapping.unwrap().pairs();
        assert_eq!(pairs, vec![(1, 10), (2, 9), (3, 8)]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let input = "GGGAAAUCCC\n(((...))\n";
        assert!(read_parens(input.as_bytes()).is_err());
    }

    #[test]
    fn unbalanced_bracket_is_rejected() {
        let input = "GGGG\n(.).\n"; // the ')' has no matching '(' at that depth... actually balanced; use a real imbalance
        let _ = read_parens(input.as_bytes());
        let unbalanced = "GGGG\n((..\n";
        assert!(read_parens(unbalanced.as_bytes()).is_err());
    }

    #[test]
    fn write_then_read_round_trips_pairs() {
        let input = "GGGAAAUCCC\n(((...)))\n";
        let sstruct = read_parens(input.as_bytes()).unwrap();
        let mapping = sstruct.known_mapping.clone().unwrap();
        let mut buf = Vec::new();
        write_parens(&mut buf, &sstruct, &mapping).unwrap();
        let reparsed = read_parens(&buf[..]).unwrap();
        assert_eq!(reparsed.known_mapping.unwrap().pairs(), mapping.pairs());
    }
}
