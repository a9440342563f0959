//! Parameter file persistence: one `<name> <value>` line per feature,
//! mirroring the names `FeatureMap` assigns on insertion. Round-tripping a
//! map through `write_to_file` then `read_from_file` must reproduce the same
//! name-to-index assignment, since training resumes and cross-run comparison
//! both depend on it.

use std::io::{BufRead, Write};

use located_error::prelude::*;
use sstruct::Nucleotide;

use crate::{error::FeatureMapError, featuremap::FeatureMap};

/// Reads a parameter file back into a fresh `FeatureMap` plus its parallel
/// value vector. Insertion order in the file becomes insertion order in the
/// map, so indices line up with `values[i]`.
pub fn read_from_file(config: crate::config::FeatureConfig, source: impl BufRead) -> Result<(FeatureMap, Vec<f64>)> {
    let context = || "While reading a feature parameter file";

    let mut map = FeatureMap::new(config);
    let mut values = Vec::new();
    for (lineno, line) in source.lines().enumerate() {
        let line = line.with_loc(context)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let name = fields.next().ok_or(FeatureMapError::MalformedLine(lineno + 1)).with_loc(context)?;
        let value_str = fields.next().ok_or(FeatureMapError::MalformedLine(lineno + 1)).with_loc(context)?;
        if fields.next().is_some() {
            return Err(FeatureMapError::MalformedLine(lineno + 1)).with_loc(context);
        }
        let value: f64 = value_str.parse()
            .map_err(|_| FeatureMapError::InvalidValue(lineno + 1, value_str.to_string()))
            .with_loc(context)?;

        let idx = insert_by_name(&mut map, name);
        if idx == values.len() {
            values.push(value);
        } else {
            values[idx] = value;
        }
    }
    Ok((map, values))
}

/// Routes a feature name read back from a parameter file through the
/// `insert_*` method matching its class, so the per-class fast-path caches
/// (`find_base_pair`, `find_helix_closing`, ...) come back populated instead
/// of only the generic name/index map. Falls back to the untyped
/// `insert_key` for a name that matches no known class, so a hand-edited or
/// forward-compatible file still round-trips its name and value even though
/// no cache gets to key on it.
fn insert_by_name(map: &mut FeatureMap, name: &str) -> usize {
    try_insert_by_name(map, name).unwrap_or_else(|| map.insert_key(name))
}

fn try_insert_by_name(map: &mut FeatureMap, name: &str) -> Option<usize> {
    fn nucleotides(s: &str) -> Option<Vec<Nucleotide>> {
        s.chars().map(Nucleotide::try_from).collect::<Result<Vec<_>, _>>().ok()
    }

    match name {
        "isolated_base_pair" => return Some(map.insert_isolated_base_pair()),
        "multi_base" => return Some(map.insert_multi_base()),
        "multi_unpaired" => return Some(map.insert_multi_unpaired()),
        "multi_paired" => return Some(map.insert_multi_paired()),
        "external_unpaired" => return Some(map.insert_external_unpaired()),
        "external_paired" => return Some(map.insert_external_paired()),
        _ => {}
    }

    if let Some(rest) = name.strip_prefix("internal_symmetric_length_at_least_") {
        return rest.parse().ok().map(|l| map.insert_internal_symmetric_length_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("internal_asymmetry_at_least_") {
        return rest.parse().ok().map(|l| map.insert_internal_asymmetry_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("internal_length_at_least_") {
        return rest.parse().ok().map(|l| map.insert_internal_length_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("internal_explicit_") {
        let mut parts = rest.splitn(2, '_');
        let l1 = parts.next()?.parse().ok()?;
        let l2 = parts.next()?.parse().ok()?;
        return Some(map.insert_internal_explicit(l1, l2));
    }
    if let Some(window) = name.strip_prefix("internal_nucleotides_") {
        return Some(map.insert_internal_nucleotides(window));
    }
    if let Some(window) = name.strip_prefix("hairpin_nucleotides_") {
        return Some(map.insert_hairpin_nucleotides(window));
    }
    if let Some(rest) = name.strip_prefix("hairpin_length_at_least_") {
        return rest.parse().ok().map(|l| map.insert_hairpin_length_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("helix_length_at_least_") {
        return rest.parse().ok().map(|l| map.insert_helix_length_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("helix_stacking_") {
        let n = nucleotides(rest)?;
        return (n.len() == 4).then(|| map.insert_helix_stacking(n[0], n[1], n[2], n[3]));
    }
    if let Some(rest) = name.strip_prefix("helix_closing_") {
        let n = nucleotides(rest)?;
        return (n.len() == 2).then(|| map.insert_helix_closing(n[0], n[1]));
    }
    if let Some(rest) = name.strip_prefix("base_pair_dist_at_least_") {
        return rest.parse().ok().map(|l| map.insert_base_pair_dist_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("base_pair_") {
        let n = nucleotides(rest)?;
        return (n.len() == 2).then(|| map.insert_base_pair(n[0], n[1]));
    }
    if let Some(rest) = name.strip_prefix("bulge_length_at_least_") {
        return rest.parse().ok().map(|l| map.insert_bulge_length_at_least(l));
    }
    if let Some(rest) = name.strip_prefix("terminal_mismatch_") {
        let n = nucleotides(rest)?;
        return (n.len() == 4).then(|| map.insert_terminal_mismatch(n[0], n[1], n[2], n[3]));
    }
    if let Some(rest) = name.strip_prefix("dangle_left_") {
        let n = nucleotides(rest)?;
        return (n.len() == 3).then(|| map.insert_dangle_left(n[0], n[1], n[2]));
    }
    if let Some(rest) = name.strip_prefix("dangle_right_") {
        let n = nucleotides(rest)?;
        return (n.len() == 3).then(|| map.insert_dangle_right(n[0], n[1], n[2]));
    }

    None
}

/// Writes every named feature in index order, one per line.
pub fn write_to_file(mut sink: impl Write, map: &FeatureMap, values: &[f64]) -> Result<()> {
    for (idx, name) in map.iter() {
        let value = values.get(idx).copied().unwrap_or(0.0);
        writeln!(sink, "{name} {value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sstruct::Nucleotide::{A, U};

    #[test]
    fn write_then_read_round_trips_names_and_values() {
        let mut map = FeatureMap::default();
        let au = map.insert_base_pair(A, U);
        let hp = map.insert_hairpin_length_at_least(5);
        let mut values = vec![0.0; map.len()];
        values[au] = 1.5;
        values[hp] = -0.25;

        let mut buf = Vec::new();
        write_to_file(&mut buf, &map, &values).unwrap();

        let (reparsed, reparsed_values) = read_from_file(map.config(), &buf[..]).unwrap();
        assert_eq!(reparsed.find_base_pair(A, U), Some(au));
        assert_eq!(reparsed_values[au], 1.5);
        assert_eq!(reparsed_values[hp], -0.25);
    }

    #[test]
    fn malformed_line_is_rejected() {
        let input = "base_pair_AU\n";
        assert!(read_from_file(crate::config::FeatureConfig::default(), input.as_bytes()).is_err());
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let input = "base_pair_AU not_a_number\n";
        assert!(read_from_file(crate::config::FeatureConfig::default(), input.as_bytes()).is_err());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let input = "# header\n\nbase_pair_AU 1.0\n";
        let (map, values) = read_from_file(crate::config::FeatureConfig::default(), input.as_bytes()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(values[0], 1.0);
    }

    /// A name read back from a file must repopulate the per-class cache,
    /// not just the generic name/index map, or every `find_*` lookup a
    /// loaded parameter file relies on returns `None`.
    #[test]
    fn read_from_file_repopulates_class_caches() {
        let mut map = FeatureMap::default();
        let au = map.insert_base_pair(A, U);
        let stack = map.insert_helix_stacking(A, U, sstruct::Nucleotide::G, sstruct::Nucleotide::C);
        let closing = map.insert_helix_closing(A, U);
        let hairpin = map.insert_hairpin_nucleotides("GAAA");
        let mut values = vec![0.0; map.len()];
        values[au] = 1.0;
        values[stack] = 2.0;
        values[closing] = 3.0;
        values[hairpin] = 4.0;

        let mut buf = Vec::new();
        write_to_file(&mut buf, &map, &values).unwrap();
        let (reparsed, _) = read_from_file(map.config(), &buf[..]).unwrap();

        assert_eq!(reparsed.find_base_pair(A, U), Some(au));
        assert_eq!(reparsed.find_helix_stacking(A, U, sstruct::Nucleotide::G, sstruct::Nucleotide::C), Some(stack));
        assert_eq!(reparsed.find_helix_closing(A, U), Some(closing));
        assert_eq!(reparsed.find_hairpin_nucleotides("GAAA"), Some(hairpin));
    }
}
