//! Minimal comma-separated reader for the user table.
//!
//! No quoting or escaping: a comma inside a field splits it.

use std::collections::HashMap;

use ::csv::{ReaderBuilder, Trim};

/// One data line keyed by header name. Every value is text.
pub type Row = HashMap<String, String>;

/// Parse `text` into rows keyed by the first line's headers.
///
/// A leading byte-order mark is ignored. Blank lines are skipped, values are
/// trimmed, missing trailing fields map to an empty string and surplus fields
/// are ignored.
pub fn parse_csv(text: &str) -> Vec<Row> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) if headers.iter().any(|h| !h.is_empty()) => {
            headers.iter().map(str::to_string).collect()
        }
        _ => return Vec::new(),
    };

    reader
        .records()
        .filter_map(Result::ok)
        .filter(|record| record.iter().any(|value| !value.is_empty()))
        .map(|record| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = record.get(i).unwrap_or("");
                    (header.clone(), value.to_string())
                })
                .collect()
        })
        .collect()
}
