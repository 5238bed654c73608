//! Display-name and folder derivation.

use crate::types::PersonInfo;

pub const UNKNOWN_NAME: &str = "Unknown";

/// Longest suffix after the final `.` still treated as a file extension.
const MAX_EXTENSION_LEN: usize = 5;

/// Derive a human-readable label for a match.
///
/// Structured metadata wins when it carries a non-empty name. Otherwise a
/// colon-delimited identifier (`PNG:Momase:Madang:John_Doe.jpg`) yields its
/// last segment without the extension and with underscores as spaces; any
/// other identifier is used with dashes as spaces.
pub fn display_name(external_id: Option<&str>, person_info: Option<&PersonInfo>) -> String {
    let named = person_info
        .and_then(|info| info.name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let derived = match (named, external_id) {
        (Some(name), _) => name.to_string(),
        (None, Some(id)) if id.contains(':') => {
            let last = id.rsplit(':').next().unwrap_or_default();
            strip_extension(last).replace('_', " ")
        }
        (None, Some(id)) => id.replace('-', " "),
        (None, None) => String::new(),
    };

    let trimmed = derived.trim();
    if trimmed.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=MAX_EXTENSION_LEN).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => segment,
    }
}

/// The key's path without its final segment, or `None` for a top-level key.
pub fn parent_folder(key: &str) -> Option<&str> {
    key.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}
