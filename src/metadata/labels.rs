//! Display label selection.

use super::models::LocalizedLabel;

/// Persian (fa-IR)
pub const FARSI: i32 = 1065;
/// English (en-US)
pub const ENGLISH: i32 = 1033;

/// Language codes tried in order before falling back to the first label
pub const LANGUAGE_PRIORITY: [i32; 2] = [FARSI, ENGLISH];

/// Pick the Farsi label, else the English one, else the first label.
///
/// Returns `None` only when `labels` is empty.
pub fn select_label(labels: &[LocalizedLabel]) -> Option<&str> {
    LANGUAGE_PRIORITY
        .iter()
        .find_map(|code| labels.iter().find(|l| l.language_code == *code))
        .or_else(|| labels.first())
        .map(|l| l.label.as_str())
}
