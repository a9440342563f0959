use std::io::{BufRead, Write};

use located_error::prelude::*;

use crate::{
    error::ParseError,
    mapping::Mapping,
    nucleotide::Nucleotide,
    sequence::Sequence,
    sstruct::SStruct,
};

/// Parses BPSEQ: one `<i> <nucleotide> <j>` line per position, `j=0` meaning
/// unpaired. Lines starting with `#` are comments, per the format's common
/// convention.
pub fn read_bpseq(source: impl BufRead) -> Result<SStruct> {
    let context = || "While parsing a BPSEQ file";

    let mut residues = Vec::new();
    let mut partners = Vec::new();
    for (lineno, line) in source.lines().enumerate() {
        let line = line.with_loc(context)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ParseError::MalformedBpseqLine(lineno + 1)).with_loc(context);
        }
        let pos: usize = fields[0].parse().map_err(|_| ParseError::MalformedBpseqLine(lineno + 1)).with_loc(context)?;
        let nuc = fields[1].chars().next()
            .and_then(|c| Nucleotide::try_from(c).ok())
            .ok_or(ParseError::MalformedBpseqLine(lineno + 1))
            .with_loc(context)?;
        let partner: usize = fields[2].parse().map_err(|_| ParseError::MalformedBpseqLine(lineno + 1)).with_loc(context)?;

        if pos != residues.len() + 1 {
            return Err(ParseError::MalformedBpseqLine(lineno + 1)).with_loc(context);
        }
        residues.push(nuc);
        partners.push(partner);
    }

    if residues.is_empty() {
        return Err(ParseError::EmptySequence).with_loc(context);
    }

    let l = residues.len();
    let mut mapping = Mapping::unknown(l);
    for (i, &partner) in partners.iter().enumerate() {
        let i = i + 1;
        if partner == 0 {
            mapping.set_unpaired(i);
        } else {
            if partner > l {
                return Err(ParseError::BpseqOutOfRange(partner, l)).with_loc(context);
            }
            if partner > i {
                mapping.set_pair(i, partner);
            }
        }
    }

    let sstruct = SStruct::new(Sequence::new(residues)).with_mapping(mapping)?;
    Ok(sstruct)
}

/// Writes a structure out in BPSEQ format.
pub fn write_bpseq(mut sink: impl Write, sstruct: &SStruct, mapping: &Mapping) -> Result<()> {
    for i in 1..=sstruct.len() {
        let partner = match mapping.get(i) {
            crate::mapping::PairState::Paired(j) => j,
            _ => 0,
        };
        writeln!(sink, "{i} {} {partner}", sstruct.sequence[i])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_hairpin() {
        let input = "\
1 G 10
2 G 9
3 G 8
4 A 0
5 A 0
6 A 0
7 U 0
8 C 3
9 C 2
10 C 1
";
        let sstruct = read_bpseq(input.as_bytes()).unwrap();
        assert_eq!(sstruct.sequence.to_string(), "GGGAAAUCCC");
        assert_eq!(sstruct.known_mapping.unwrap().pairs(), vec![(1, 10), (2, 9), (3, 8)]);
    }

    #[test]
    fn out_of_range_partner_is_rejected() {
        let input = "1 G 99\n";
        assert!(read_bpseq(input.as_bytes()).is_err());
    }

    #[test]
    fn write_then_read_round_trips() {
        let input = "1 G 4\n2 G 3\n3 C 2\n4 C 1\n";
        let sstruct = read_bpseq(input.as_bytes()).unwrap();
        let mapping = sstruct.known_mapping.clone().unwrap();
        let mut buf = Vec::new();
        write_bpseq(&mut buf, &sstruct, &mapping).unwrap();
        let reparsed = read_bpseq(&buf[..]).unwrap();
        assert_eq!(reparsed.known_mapping.unwrap().pairs(), mapping.pairs());
    }
}
