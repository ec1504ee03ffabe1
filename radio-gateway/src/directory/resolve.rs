//! Station name resolution.

use super::client::Station;

/// Find the first station whose name matches `query`, ignoring case.
///
/// Duplicate names are allowed in the directory; the earliest entry wins.
pub fn resolve_by_name<'a>(stations: &'a [Station], query: &str) -> Option<&'a Station> {
    stations.iter().find(|s| names_match(&s.name, query))
}

/// Case-insensitive name equality under simple case folding.
///
/// Characters are compared one at a time, so mappings that expand to
/// several characters (`ß` to `SS`) never match.
fn names_match(name: &str, query: &str) -> bool {
    if name.is_ascii() && query.is_ascii() {
        return name.eq_ignore_ascii_case(query);
    }

    let mut query = query.chars();
    name.chars()
        .all(|a| query.next().is_some_and(|b| chars_fold_equal(a, b)))
        && query.next().is_none()
}

fn chars_fold_equal(a: char, b: char) -> bool {
    a == b
        || simple_mapping(a.to_lowercase(), a) == simple_mapping(b.to_lowercase(), b)
        || simple_mapping(a.to_uppercase(), a) == simple_mapping(b.to_uppercase(), b)
}

/// The single-character case mapping of `c`, or `c` itself when the
/// mapping expands.
fn simple_mapping(mut mapped: impl Iterator<Item = char>, c: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(single), None) => single,
        _ => c,
    }
}
