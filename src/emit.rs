//! Multi-format output emission.
//!
//! After the whole input has been transformed, [`emit_all`] writes each
//! requested output format from the same in-memory record collection. The
//! formats are produced in the order requested, but they are independent:
//! none reads another's file, and dropping one from the request changes
//! nothing about the others' bytes.
//!
//! Output paths are derived from the input path: `records.mrc` becomes
//! `records_clean.mrc`, `records_clean.mrk`, `records_clean.xml`, and
//! `records_clean.rdf`. The rdf path stages the MARCXML collection in an
//! in-memory buffer — it is never written to disk — and hands it to the
//! BIBFRAME transform.
//!
//! Unrecognized mode names are ignored rather than failing the run.

use crate::bibframe;
use crate::error::{CleanError, Result};
use crate::marcxml;
use crate::record::Record;
use crate::text::TextWriter;
use crate::writer::MarcWriter;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One of the supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// ISO 2709 binary (`mrc`).
    Binary,
    /// Mnemonic text (`mrk`).
    Text,
    /// MARCXML collection (`marcxml`).
    Xml,
    /// BIBFRAME RDF/XML (`rdf`).
    Rdf,
}

impl OutputFormat {
    /// Map a requested mode name to a format; unknown names yield `None`.
    #[must_use]
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            "mrc" => Some(OutputFormat::Binary),
            "mrk" => Some(OutputFormat::Text),
            "marcxml" => Some(OutputFormat::Xml),
            "rdf" => Some(OutputFormat::Rdf),
            _ => None,
        }
    }

    /// The output path for this format, derived from the input path.
    ///
    /// The binary format keeps the input's extension; the others use their
    /// own.
    #[must_use]
    pub fn output_path(self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().to_string());
        let parent = input.parent().unwrap_or_else(|| Path::new(""));
        match self {
            OutputFormat::Binary => {
                let extension = input
                    .extension()
                    .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));
                parent.join(format!("{stem}_clean{extension}"))
            },
            OutputFormat::Text => parent.join(format!("{stem}_clean.mrk")),
            OutputFormat::Xml => parent.join(format!("{stem}_clean.xml")),
            OutputFormat::Rdf => parent.join(format!("{stem}_clean.rdf")),
        }
    }
}

/// Write every requested format for the transformed collection.
///
/// # Errors
///
/// Returns `OutputWrite` when a destination cannot be created or written;
/// formats already written remain on disk, formats not yet reached are not
/// produced.
pub fn emit_all(records: &[Record], modes: &[String], input: &Path) -> Result<()> {
    for mode in modes {
        let Some(format) = OutputFormat::from_mode(mode) else {
            continue;
        };
        let path = format.output_path(input);
        match format {
            OutputFormat::Binary => write_binary(records, &path)?,
            OutputFormat::Text => write_text(records, &path)?,
            OutputFormat::Xml => write_xml(records, &path)?,
            OutputFormat::Rdf => write_rdf(records, &path)?,
        }
    }
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path)
        .map_err(|e| CleanError::OutputWrite(format!("{}: {e}", path.display())))
}

fn write_binary(records: &[Record], path: &Path) -> Result<()> {
    let file = create(path)?;
    let mut writer = MarcWriter::new(file);
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()
}

fn write_text(records: &[Record], path: &Path) -> Result<()> {
    let file = create(path)?;
    let mut writer = TextWriter::new(file);
    for record in records {
        writer.write_record(record)?;
    }
    writer.finish()
}

fn write_xml(records: &[Record], path: &Path) -> Result<()> {
    let xml = marcxml::records_to_marcxml(records)?;
    let mut file = create(path)?;
    file.write_all(xml.as_bytes())
        .map_err(|e| CleanError::OutputWrite(format!("{}: {e}", path.display())))
}

fn write_rdf(records: &[Record], path: &Path) -> Result<()> {
    // Stage the collection as MARCXML in memory; the structural transform
    // consumes the document, not the records.
    let staged = marcxml::records_to_marcxml(records)?;
    let rdf = bibframe::marcxml_to_bibframe(&staged)?;
    let mut file = create(path)?;
    file.write_all(rdf.as_bytes())
        .map_err(|e| CleanError::OutputWrite(format!("{}: {e}", path.display())))
}
