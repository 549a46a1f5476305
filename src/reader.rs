//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC
//! records from any source implementing [`std::io::Read`]. The record
//! encoding (MARC-8 or UTF-8) is detected from leader position 9 and all
//! field data is decoded to Unicode strings on the way in.
//!
//! # Examples
//!
//! ```no_run
//! use marcnorm::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("control number: {:?}", record.control_number());
//! }
//! # Ok::<(), marcnorm::CleanError>(())
//! ```

use crate::encoding::{decode_bytes, MarcEncoding};
use crate::error::{CleanError, Result};
use crate::leader::Leader;
use crate::record::{Field, Record};
use std::io::Read;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// Reader for ISO 2709 binary MARC format.
///
/// Reads one record at a time; parsing is strict — any structural defect
/// aborts with an error rather than salvaging partial data.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader over any [`std::io::Read`] source.
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
        }
    }

    /// Number of records read so far.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` on success, `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the binary structure is malformed, the record is
    /// truncated, field data cannot be decoded, or an I/O error occurs.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut leader_bytes = [0u8; 24];
        match self.reader.read_exact(&mut leader_bytes) {
            Ok(()) => {},
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(CleanError::Io(e)),
        }

        let leader = Leader::from_bytes(&leader_bytes)?;
        leader.validate_for_reading()?;
        let encoding = MarcEncoding::from_leader_char(leader.character_coding)?;

        let record_length = leader.record_length as usize;
        let base_address = leader.data_base_address as usize;

        let mut body = vec![0u8; record_length - 24];
        self.reader.read_exact(&mut body).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                CleanError::Truncated(
                    "Unexpected end of file while reading record data".to_string(),
                )
            } else {
                CleanError::Io(e)
            }
        })?;

        let directory = &body[..base_address - 24];
        let data = &body[base_address - 24..];

        let mut record = Record::new(leader);

        // Directory entries: tag(3) + field length(4) + start position(5),
        // terminated by 0x1E.
        let mut pos = 0;
        while pos < directory.len() {
            if directory[pos] == FIELD_TERMINATOR {
                break;
            }
            if pos + 12 > directory.len() {
                return Err(CleanError::InvalidRecord(
                    "Incomplete directory entry".to_string(),
                ));
            }

            let entry = &directory[pos..pos + 12];
            let tag = std::str::from_utf8(&entry[0..3])
                .map_err(|_| CleanError::InvalidRecord("Non-ASCII field tag".to_string()))?
                .to_string();
            let field_length = parse_entry_digits(&entry[3..7])?;
            let start = parse_entry_digits(&entry[7..12])?;
            pos += 12;

            let end = start + field_length;
            if end > data.len() {
                return Err(CleanError::InvalidRecord(format!(
                    "Field {tag} exceeds data area"
                )));
            }
            let field_data = &data[start..end];

            if is_control_tag(&tag) {
                // Strip the trailing field terminator before decoding.
                let value_bytes = field_data
                    .strip_suffix(&[FIELD_TERMINATOR])
                    .unwrap_or(field_data);
                let value = decode_bytes(value_bytes, encoding)?;
                record.add_control_field(tag, value);
            } else {
                let field = parse_data_field(field_data, &tag, encoding)?;
                record.add_field(field);
            }
        }

        self.records_read += 1;
        Ok(Some(record))
    }

    /// Read all remaining records into a vector, in input order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; records read before it are
    /// discarded.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Control fields are tags 001-009.
fn is_control_tag(tag: &str) -> bool {
    tag.len() == 3 && tag.starts_with("00") && tag != "000"
}

/// Parse a data field (indicators + delimited subfields) from raw bytes.
fn parse_data_field(data: &[u8], tag: &str, encoding: MarcEncoding) -> Result<Field> {
    if data.len() < 2 {
        return Err(CleanError::InvalidField(format!(
            "Field {tag} too short for indicators"
        )));
    }

    let mut field = Field::new(tag, data[0] as char, data[1] as char);

    let subfield_data = &data[2..];
    let mut pos = 0;
    while pos < subfield_data.len() {
        if subfield_data[pos] == FIELD_TERMINATOR {
            break;
        }
        if subfield_data[pos] != SUBFIELD_DELIMITER {
            return Err(CleanError::InvalidField(format!(
                "Field {tag}: expected subfield delimiter"
            )));
        }
        pos += 1;
        let Some(&code_byte) = subfield_data.get(pos) else {
            break;
        };
        pos += 1;

        let mut end = pos;
        while end < subfield_data.len()
            && subfield_data[end] != SUBFIELD_DELIMITER
            && subfield_data[end] != FIELD_TERMINATOR
        {
            end += 1;
        }

        let value = decode_bytes(&subfield_data[pos..end], encoding)?;
        field.add_subfield(code_byte as char, value);
        pos = end;
    }

    Ok(field)
}

/// Parse a fixed-width ASCII number from a directory entry.
fn parse_entry_digits(bytes: &[u8]) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + (byte - b'0') as usize;
        } else {
            return Err(CleanError::InvalidRecord(format!(
                "Invalid directory number: expected digits, got {:?}",
                byte as char
            )));
        }
    }
    Ok(result)
}
