//! Writing MARC records to ISO 2709 binary format.
//!
//! [`MarcWriter`] serializes [`Record`] instances to the binary interchange
//! format. Output is always UTF-8: leader position 9 is forced to 'a' and
//! the record length and base address are recomputed from the serialized
//! data, so a record read from a MARC-8 source is written back in its
//! decoded Unicode form.

use crate::encoding::MarcEncoding;
use crate::error::Result;
use crate::record::Record;
use std::io::Write;

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const RECORD_TERMINATOR: u8 = 0x1D;

/// Writer for ISO 2709 binary MARC format.
#[derive(Debug)]
pub struct MarcWriter<W: Write> {
    writer: W,
    records_written: usize,
}

impl<W: Write> MarcWriter<W> {
    /// Create a new MARC writer over any [`std::io::Write`] destination.
    pub fn new(writer: W) -> Self {
        MarcWriter {
            writer,
            records_written: 0,
        }
    }

    /// Number of records written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Serialize a single record and write it to the destination.
    ///
    /// Control fields are written first (001-009 convention), then data
    /// fields, each group in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the leader cannot be rendered or an I/O error
    /// occurs.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let mut data_area: Vec<u8> = Vec::new();
        let mut directory: Vec<u8> = Vec::new();
        let mut position = 0usize;

        for (tag, value) in &record.control_fields {
            let mut field_data = value.as_bytes().to_vec();
            field_data.push(FIELD_TERMINATOR);
            push_directory_entry(&mut directory, tag, field_data.len(), position);
            position += field_data.len();
            data_area.extend_from_slice(&field_data);
        }

        for field in &record.fields {
            let mut field_data = Vec::new();
            field_data.push(field.indicator1 as u8);
            field_data.push(field.indicator2 as u8);
            for subfield in &field.subfields {
                field_data.push(SUBFIELD_DELIMITER);
                field_data.push(subfield.code as u8);
                field_data.extend_from_slice(subfield.value.as_bytes());
            }
            field_data.push(FIELD_TERMINATOR);
            push_directory_entry(&mut directory, &field.tag, field_data.len(), position);
            position += field_data.len();
            data_area.extend_from_slice(&field_data);
        }

        directory.push(FIELD_TERMINATOR);

        let base_address = 24 + directory.len();
        let record_length = base_address + data_area.len() + 1;

        let mut leader = record.leader.clone();
        leader.record_length = u32::try_from(record_length).unwrap_or(0);
        leader.data_base_address = u32::try_from(base_address).unwrap_or(0);
        leader.character_coding = MarcEncoding::Utf8.as_leader_char();

        self.writer.write_all(&leader.as_bytes()?)?;
        self.writer.write_all(&directory)?;
        self.writer.write_all(&data_area)?;
        self.writer.write_all(&[RECORD_TERMINATOR])?;

        self.records_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn push_directory_entry(directory: &mut Vec<u8>, tag: &str, length: usize, position: usize) {
    directory.extend_from_slice(tag.as_bytes());
    directory.extend_from_slice(format!("{length:04}").as_bytes());
    directory.extend_from_slice(format!("{position:05}").as_bytes());
}
