//! MARC record leader parsing and serialization.
//!
//! The leader is a 24-byte fixed-length header at the start of every MARC
//! record. The positions relevant to this tool:
//!
//! - Positions 0-4: record length (5 digits, recomputed on write)
//! - Position 9: character coding (space = MARC-8, 'a' = UTF-8)
//! - Positions 12-16: base address of data (5 digits, recomputed on write)

use crate::error::{CleanError, Result};

/// MARC leader - 24 bytes at the start of every MARC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    /// Record length (5 digits) - positions 0-4
    pub record_length: u32,
    /// Record status - position 5
    pub record_status: char,
    /// Type of record - position 6
    pub record_type: char,
    /// Bibliographic level - position 7
    pub bibliographic_level: char,
    /// Type of control record - position 8
    pub control_record_type: char,
    /// Character coding scheme - position 9 (space = MARC-8, 'a' = UTF-8)
    pub character_coding: char,
    /// Indicator count - position 10 (usually 2)
    pub indicator_count: u8,
    /// Subfield code count - position 11 (usually 2)
    pub subfield_code_count: u8,
    /// Base address of data (5 digits) - positions 12-16
    pub data_base_address: u32,
    /// Encoding level - position 17
    pub encoding_level: char,
    /// Descriptive cataloging form - position 18
    pub cataloging_form: char,
    /// Multipart resource record level - position 19
    pub multipart_level: char,
    /// Entry map - positions 20-23 (usually "4500")
    pub entry_map: String,
}

impl Leader {
    /// Parse a leader from its 24-byte serialized form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLeader` if fewer than 24 bytes are supplied or a
    /// numeric position does not hold ASCII digits.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 24 {
            return Err(CleanError::InvalidLeader(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        let record_length = parse_leader_digits(&bytes[0..5])?;
        let data_base_address = parse_leader_digits(&bytes[12..17])?;

        let indicator_count = digit_at(bytes, 10)?;
        let subfield_code_count = digit_at(bytes, 11)?;

        Ok(Leader {
            record_length,
            record_status: bytes[5] as char,
            record_type: bytes[6] as char,
            bibliographic_level: bytes[7] as char,
            control_record_type: bytes[8] as char,
            character_coding: bytes[9] as char,
            indicator_count,
            subfield_code_count,
            data_base_address,
            encoding_level: bytes[17] as char,
            cataloging_form: bytes[18] as char,
            multipart_level: bytes[19] as char,
            entry_map: String::from_utf8_lossy(&bytes[20..24]).to_string(),
        })
    }

    /// Serialize the leader to its 24-byte form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLeader` if the record length or base address cannot
    /// be rendered in five digits.
    pub fn as_bytes(&self) -> Result<[u8; 24]> {
        if self.record_length > 99_999 {
            return Err(CleanError::InvalidLeader(format!(
                "Record length {} exceeds five digits",
                self.record_length
            )));
        }
        if self.data_base_address > 99_999 {
            return Err(CleanError::InvalidLeader(format!(
                "Base address {} exceeds five digits",
                self.data_base_address
            )));
        }

        let mut out = [b' '; 24];
        out[0..5].copy_from_slice(format!("{:05}", self.record_length).as_bytes());
        out[5] = self.record_status as u8;
        out[6] = self.record_type as u8;
        out[7] = self.bibliographic_level as u8;
        out[8] = self.control_record_type as u8;
        out[9] = self.character_coding as u8;
        out[10] = b'0' + self.indicator_count;
        out[11] = b'0' + self.subfield_code_count;
        out[12..17].copy_from_slice(format!("{:05}", self.data_base_address).as_bytes());
        out[17] = self.encoding_level as u8;
        out[18] = self.cataloging_form as u8;
        out[19] = self.multipart_level as u8;
        let entry_map = self.entry_map.as_bytes();
        for (i, slot) in out[20..24].iter_mut().enumerate() {
            *slot = entry_map.get(i).copied().unwrap_or(b' ');
        }
        Ok(out)
    }

    /// Sanity checks applied before using a freshly parsed leader.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLeader` when the declared lengths cannot describe a
    /// real record.
    pub fn validate_for_reading(&self) -> Result<()> {
        if self.record_length < 24 {
            return Err(CleanError::InvalidLeader(format!(
                "Record length must be at least 24, got {}",
                self.record_length
            )));
        }
        if self.data_base_address < 24 {
            return Err(CleanError::InvalidLeader(format!(
                "Base address of data must be at least 24, got {}",
                self.data_base_address
            )));
        }
        if self.data_base_address > self.record_length {
            return Err(CleanError::InvalidLeader(format!(
                "Base address {} exceeds record length {}",
                self.data_base_address, self.record_length
            )));
        }
        Ok(())
    }
}

impl Default for Leader {
    fn default() -> Self {
        Leader {
            record_length: 0,
            record_status: 'n',
            record_type: 'a',
            bibliographic_level: 'm',
            control_record_type: ' ',
            character_coding: 'a',
            indicator_count: 2,
            subfield_code_count: 2,
            data_base_address: 0,
            encoding_level: ' ',
            cataloging_form: ' ',
            multipart_level: ' ',
            entry_map: "4500".to_string(),
        }
    }
}

/// Parse a run of ASCII digits from a fixed-width leader slice.
fn parse_leader_digits(bytes: &[u8]) -> Result<u32> {
    let mut result = 0u32;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + u32::from(byte - b'0');
        } else {
            return Err(CleanError::InvalidLeader(format!(
                "Expected digit, got byte 0x{byte:02X}"
            )));
        }
    }
    Ok(result)
}

fn digit_at(bytes: &[u8], position: usize) -> Result<u8> {
    let byte = bytes[position];
    if byte.is_ascii_digit() {
        Ok(byte - b'0')
    } else {
        Err(CleanError::InvalidLeader(format!(
            "Invalid count at position {position}: {}",
            byte as char
        )))
    }
}
