use std::io::BufRead;

use located_error::prelude::*;

use crate::{error::ParseError, sstruct::Reactivity};

/// Parses a whitespace-separated reactivity file: one or two float columns
/// per line (unpaired[, paired]). Blank lines are skipped.
pub fn read_reactivity(source: impl BufRead) -> Result<Reactivity> {
    let context = || "While parsing a reactivity file";

    let mut unpaired = Vec::new();
    let mut paired: Option<Vec<f32>> = None;
    for (lineno, line) in source.lines().enumerate() {
        let line = line.with_loc(context)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed: Result<Vec<f32>, _> = fields.iter().map(|f| f.parse::<f32>()).collect();
        let parsed = parsed.map_err(|_| ParseError::MalformedReactivityLine(lineno + 1)).with_loc(context)?;

        match parsed.len() {
            1 => unpaired.push(parsed[0]),
            2 => {
                unpaired.push(parsed[0]);
                paired.get_or_insert_with(Vec::new).push(parsed[1]);
            }
            _ => return Err(ParseError::MalformedReactivityLine(lineno + 1)).with_loc(context),
        }
    }

    Ok(Reactivity { unpaired, paired })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_column_reactivity() {
        let input = "0.1\n0.2\n-999\n0.4\n";
        let r = read_reactivity(input.as_bytes()).unwrap();
        assert_eq!(r.unpaired, vec![0.1, 0.2, -999.0, 0.4]);
        assert!(r.paired.is_none());
    }

    #[test]
    fn two_column_reactivity() {
        let input = "0.1 0.9\n0.2 0.8\n";
        let r = read_reactivity(input.as_bytes()).unwrap();
        assert_eq!(r.unpaired, vec![0.1, 0.2]);
        assert_eq!(r.paired, Some(vec![0.9, 0.8]));
    }

    #[test]
    fn malformed_line_is_rejected() {
        let input = "0.1 0.2 0.3\n";
        assert!(read_reactivity(input.as_bytes()).is_err());
    }
}
