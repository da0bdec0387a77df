//! Document-store index names derived from YANG paths

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};

/// Hard limit on index name length, in bytes
pub const MAX_INDEX_BYTES: usize = 255;

/// Marker placed between the path portion and the date
const INDEX_SUFFIX: &str = "gnmi";

/// Derive the index name for `full_path` as of `date`
///
/// The path is lower-cased, `/`, `:` and `[` become `-`, and `]` and `"`
/// are dropped. The result is `<path>-gnmi-YYYY.MM.DD`. When that exceeds
/// [`MAX_INDEX_BYTES`], trailing hyphen-separated tokens of the path
/// portion are removed until it fits.
pub fn derive_index(full_path: &str, date: NaiveDate) -> Result<String> {
    let suffix = format!("-{INDEX_SUFFIX}-{}", date.format("%Y.%m.%d"));
    let mut index = sanitize(full_path);

    while index.len() + suffix.len() > MAX_INDEX_BYTES {
        match index.rfind('-') {
            Some(pos) => index.truncate(pos),
            None => index.clear(),
        }
    }

    if index.is_empty() {
        return Err(Error::IndexDerivationOverflow(full_path.to_string()));
    }

    Ok(format!("{index}{suffix}"))
}

/// Derive the index name for `full_path` using today's local date
pub fn derive_index_today(full_path: &str) -> Result<String> {
    derive_index(full_path, Local::now().date_naive())
}

fn sanitize(path: &str) -> String {
    path.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            '/' | ':' | '[' => Some('-'),
            ']' | '"' => None,
            other => Some(other),
        })
        .collect()
}
