#![warn(missing_docs)]

//! # marcnorm
//!
//! Repair and normalise internationalisation defects in MARC21
//! bibliographic records whose text fields mix romanized and native-script
//! representations.
//!
//! A run resolves an effective cleaning configuration from a JSON document
//! plus command-line overrides, derives each record's language context,
//! applies supplementary-plane script repair and Unicode normalization to
//! the configured fields, and re-emits the cleaned collection in one or
//! more output formats.
//!
//! ## Quick Start
//!
//! ```no_run
//! use marcnorm::{config, emit, pipeline};
//! use std::path::Path;
//!
//! # fn main() -> marcnorm::Result<()> {
//! let base = config::BaseConfig::from_json(config::DEFAULT_CONFIG)?;
//! let settings = config::resolve(&base, &config::Overrides::default())?;
//!
//! let input = Path::new("records.mrc");
//! let records = pipeline::process_file(input, &settings, false)?;
//! emit::emit_all(&records, &["mrc".to_string()], input)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — effective-configuration resolution (defaults + overrides)
//! - [`context`] — per-record language context extraction
//! - [`transform`] — the field transformation engine
//! - [`emit`] — multi-format output emission
//! - [`pipeline`] — the sequential read/transform loop
//! - [`record`] — core MARC structures (`Record`, `Field`, `Subfield`)
//! - [`leader`] — the 24-byte record leader
//! - [`reader`] / [`writer`] — ISO 2709 binary input/output
//! - [`text`] — mnemonic (mrk) text rendering
//! - [`marcxml`] — MARCXML collection serialization
//! - [`bibframe`] — the MARCXML-to-BIBFRAME structural transform
//! - [`encoding`] — MARC-8/UTF-8 detection and decoding
//! - [`normalize`] / [`script_repair`] — the cleaning functions
//! - [`error`] — error types and result alias

pub mod bibframe;
pub mod config;
pub mod context;
pub mod emit;
pub mod encoding;
pub mod error;
pub mod leader;
pub mod marcxml;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod record;
pub mod script_repair;
pub mod text;
pub mod transform;
pub mod writer;

pub use config::{resolve, BaseConfig, EffectiveConfig, Overrides};
pub use context::{extract_context, RecordContext};
pub use emit::OutputFormat;
pub use encoding::MarcEncoding;
pub use error::{CleanError, Result};
pub use leader::Leader;
pub use normalize::{NormalizationForm, ThaiLaoMode};
pub use reader::MarcReader;
pub use record::{Field, Record, Subfield};
pub use text::TextWriter;
pub use writer::MarcWriter;
