//! Line-oriented text (mrk) rendering of MARC records.
//!
//! [`TextWriter`] produces the human-readable mnemonic format: one line per
//! field, records separated by a blank line.
//!
//! ```text
//! =LDR  00123nam a2200049 a 4500
//! =001  12345
//! =245  10$aTitle :$bsubtitle /$can author.
//! ```
//!
//! Blank indicators are rendered as `\` and subfields are introduced with
//! `$` followed by the subfield code.

use crate::error::Result;
use crate::record::Record;
use std::io::Write;

/// Writer for the mnemonic text rendering of MARC records.
#[derive(Debug)]
pub struct TextWriter<W: Write> {
    writer: W,
    records_written: usize,
}

impl<W: Write> TextWriter<W> {
    /// Create a new text writer over any [`std::io::Write`] destination.
    pub fn new(writer: W) -> Self {
        TextWriter {
            writer,
            records_written: 0,
        }
    }

    /// Render a single record as a text block.
    ///
    /// A blank line is written before every record after the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the leader cannot be rendered or writing fails.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if self.records_written > 0 {
            writeln!(self.writer)?;
        }

        let leader_bytes = record.leader.as_bytes()?;
        writeln!(
            self.writer,
            "=LDR  {}",
            String::from_utf8_lossy(&leader_bytes)
        )?;

        for (tag, value) in &record.control_fields {
            writeln!(self.writer, "={tag}  {value}")?;
        }

        for field in &record.fields {
            let mut line = format!(
                "={}  {}{}",
                field.tag,
                render_indicator(field.indicator1),
                render_indicator(field.indicator2)
            );
            for subfield in &field.subfields {
                line.push('$');
                line.push(subfield.code);
                line.push_str(&subfield.value);
            }
            writeln!(self.writer, "{line}")?;
        }

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

fn render_indicator(indicator: char) -> char {
    if indicator == ' ' {
        '\\'
    } else {
        indicator
    }
}
