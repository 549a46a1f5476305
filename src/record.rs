//! MARC bibliographic record structures.
//!
//! This module provides the core record types:
//! - [`Record`] — a leader plus ordered control and data fields
//! - [`Field`] — a variable data field (tags 010+) with indicators
//! - [`Subfield`] — a (code, value) data element within a field
//!
//! Control fields (001-009) and data fields (010+) are kept in separate
//! sequences, each preserving exact input order — including interleaved
//! fields that share a tag. Cleaning replaces subfield values by index;
//! it never reorders fields or subfields.

use crate::leader::Leader;
use smallvec::SmallVec;

/// A MARC bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record leader (24 bytes).
    pub leader: Leader,
    /// Control fields (001-009) as (tag, value), in input order.
    pub control_fields: Vec<(String, String)>,
    /// Data fields (010+), in input order.
    pub fields: Vec<Field>,
}

/// A data field in a MARC record (tags 010 and higher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field tag (3 digits).
    pub tag: String,
    /// First indicator.
    pub indicator1: char,
    /// Second indicator.
    pub indicator2: char,
    /// Subfields; most fields carry four or fewer.
    pub subfields: SmallVec<[Subfield; 4]>,
}

/// A subfield within a data field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (single character).
    pub code: char,
    /// Subfield value.
    pub value: String,
}

impl Record {
    /// Create a new record with the given leader and no fields.
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            control_fields: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append a control field (001-009).
    pub fn add_control_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.control_fields.push((tag.into(), value.into()));
    }

    /// Get the first control field value for a tag.
    #[must_use]
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.control_fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// The record's primary identifier (001 control number), if present.
    #[must_use]
    pub fn control_number(&self) -> Option<&str> {
        self.control_field("001")
    }

    /// Append a data field.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Iterate over data fields with a given tag, in input order.
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.tag == tag)
    }

    /// Get the first data field with a given tag.
    #[must_use]
    pub fn first_field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }
}

impl Field {
    /// Create a new data field with the given tag and indicators.
    #[must_use]
    pub fn new(tag: impl Into<String>, indicator1: char, indicator2: char) -> Self {
        Field {
            tag: tag.into(),
            indicator1,
            indicator2,
            subfields: SmallVec::new(),
        }
    }

    /// Append a subfield.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield {
            code,
            value: value.into(),
        });
    }

    /// Get the first subfield value with a given code.
    #[must_use]
    pub fn subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.value.as_str())
    }
}

impl Subfield {
    /// Create a new subfield.
    #[must_use]
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Subfield {
            code,
            value: value.into(),
        }
    }
}
