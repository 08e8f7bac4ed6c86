//! Save-file naming scheme.
//!
//! Save files are named `save_YYYYMMDD_HHMMSS<ext>`. The timestamp always sits
//! in the 15-byte window right after the prefix, so lexical and chronological
//! order agree for four-digit years regardless of the extension.

use chrono::NaiveDateTime;

pub const SAVE_PREFIX: &str = "save_";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const TIMESTAMP_OFFSET: usize = SAVE_PREFIX.len();
pub const TIMESTAMP_LEN: usize = 15;
pub const MIN_NAME_LEN: usize = TIMESTAMP_OFFSET + TIMESTAMP_LEN;

/// Build the file name for a save taken at `timestamp`.
pub fn format_name(timestamp: NaiveDateTime, extension: &str) -> String {
    format!(
        "{}{}{}",
        SAVE_PREFIX,
        timestamp.format(TIMESTAMP_FORMAT),
        extension
    )
}

/// Extract the timestamp embedded in `name`.
///
/// Returns `None` for anything that is not a save file name: names shorter
/// than [`MIN_NAME_LEN`] bytes, or whose timestamp window is not exactly
/// `YYYYMMDD_HHMMSS` describing a real date and time.
pub fn parse_timestamp(name: &str) -> Option<NaiveDateTime> {
    if name.len() < MIN_NAME_LEN {
        return None;
    }
    let window = name.get(TIMESTAMP_OFFSET..MIN_NAME_LEN)?;
    if !has_timestamp_shape(window) {
        return None;
    }
    NaiveDateTime::parse_from_str(window, TIMESTAMP_FORMAT).ok()
}

// chrono accepts signs and short fields; the scheme is strictly fixed width.
fn has_timestamp_shape(window: &str) -> bool {
    window.bytes().enumerate().all(|(i, b)| match i {
        8 => b == b'_',
        _ => b.is_ascii_digit(),
    })
}
