//! Spread Model - records and lookups shared by every dashboard crate
//!
//! Defines the raw and converted post records, users, topic paths and the
//! derived post events, together with the code-to-label category mapper and
//! the minimal CSV reader used for the user table.

pub mod csv;
pub mod mapping;
pub mod types;

pub use self::csv::{parse_csv, Row};
pub use mapping::{convert_post, map_label, map_labels, qualitative_summary, Dimension};
pub use types::*;
