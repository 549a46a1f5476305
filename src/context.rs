//! Per-record language context.
//!
//! Cleaning is parameterized by the record's language. The code is taken
//! from the explicit language field when present (041$a), otherwise from
//! the fixed-field byte positions 35-37 of the 008 control field.
//!
//! The two lookups fail differently on purpose: a record without an 041 is
//! perfectly normal and falls through silently, but a bibliographic record
//! without an 008 is structurally broken, so that absence surfaces as an
//! input-access error instead of being papered over. A present-but-short
//! 008 yields the empty code, which the cleaning functions pass through
//! unchanged.

use crate::error::{CleanError, Result};
use crate::record::Record;

/// Language/script context derived from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordContext {
    /// ISO 639-style 3-letter language code; may be empty for malformed
    /// fixed fields.
    pub language_code: String,
}

/// Derive the cleaning context for a record.
///
/// # Errors
///
/// Returns `InputAccess` when neither an 041$a nor an 008 control field
/// exists.
pub fn extract_context(record: &Record) -> Result<RecordContext> {
    if let Some(code) = record
        .first_field("041")
        .and_then(|field| field.subfield('a'))
        .filter(|code| !code.is_empty())
    {
        return Ok(RecordContext {
            language_code: code.to_string(),
        });
    }

    let fixed = record.control_field("008").ok_or_else(|| {
        CleanError::InputAccess(format!(
            "Record {} has no 008 control field",
            record.control_number().unwrap_or("<no 001>")
        ))
    })?;

    let language_code = fixed.get(35..38).unwrap_or("").to_string();
    Ok(RecordContext { language_code })
}
