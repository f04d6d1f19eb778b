//! Shared utilities.
//!
//! Includes:
//! - Text helpers (HTML stripping, whitespace collapse, match normalization)
//! - Date/time helpers (flexible timestamp parsing across source formats)
//! - Title similarity (token-set overlap for fuzzy deduplication)

pub mod datetime;
pub mod similarity;
pub mod text;

pub use datetime::{format_duration, parse_duration_hms, parse_flexible_datetime};
pub use similarity::token_set_overlap;
pub use text::{clean_text, normalize_for_matching, normalize_whitespace, truncate_at_word};
