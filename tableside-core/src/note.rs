//! Kitchen note text derived from a line's exclusions.

use std::collections::BTreeSet;

const WITHOUT_PREFIX: &str = "without ";
const NOTE_SEPARATOR: &str = ", ";

/// Render exclusions as "without Cheese, without Pickles".
///
/// Names come out in sorted order. Returns `None` when nothing is excluded,
/// which the submission payload sends as `null`.
pub fn note_for(excluded: &BTreeSet<String>) -> Option<String> {
    if excluded.is_empty() {
        return None;
    }
    let parts: Vec<String> = excluded
        .iter()
        .map(|name| format!("{WITHOUT_PREFIX}{name}"))
        .collect();
    Some(parts.join(NOTE_SEPARATOR))
}
