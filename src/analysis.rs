//! Set operations over protein/gene identifier lists

use std::collections::BTreeSet;

fn normalize(ids: &[String]) -> BTreeSet<String> {
    ids.iter().map(|id| id.trim().to_lowercase()).collect()
}

/// Proteins present in both lists.
///
/// Identifiers are compared trimmed and lowercased; the result is sorted and
/// holds each identifier once, in its normalized form.
pub fn common_proteins(list_1: &[String], list_2: &[String]) -> Vec<String> {
    let first = normalize(list_1);
    let second = normalize(list_2);
    first.intersection(&second).cloned().collect()
}
