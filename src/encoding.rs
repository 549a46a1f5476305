//! Character encoding support for MARC records.
//!
//! MARC records carry their encoding in leader position 9:
//! - space = MARC-8 (legacy, ISO 2022 escape-driven character sets)
//! - 'a' = UTF-8
//!
//! This module detects the encoding from the leader and decodes field data
//! to Rust strings. The MARC-8 decoder covers the Basic Latin and ANSEL
//! Extended Latin sets — the repertoire this pipeline's romanized source
//! data uses — including the combining half marks that the Cyrillic
//! normalization step folds. Multi-byte sets (EACC) and the non-Latin
//! single-byte sets are rejected with an encoding error.
//!
//! MARC-8 *encoding* is deliberately absent: cleaned records are always
//! written as UTF-8 with leader position 9 set to 'a'.

use crate::error::{CleanError, Result};
use unicode_normalization::UnicodeNormalization;

/// Character encoding for MARC records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarcEncoding {
    /// MARC-8 encoding (legacy, mixed character sets).
    Marc8,
    /// UTF-8 encoding (modern standard).
    Utf8,
}

impl MarcEncoding {
    /// Detect encoding from the leader's character-coding position.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the character is not a valid coding indicator.
    pub fn from_leader_char(c: char) -> Result<Self> {
        match c {
            ' ' => Ok(MarcEncoding::Marc8),
            'a' => Ok(MarcEncoding::Utf8),
            _ => Err(CleanError::Encoding(format!(
                "Unknown character coding in leader: {c:?}"
            ))),
        }
    }

    /// The leader character for this encoding.
    #[must_use]
    pub fn as_leader_char(self) -> char {
        match self {
            MarcEncoding::Marc8 => ' ',
            MarcEncoding::Utf8 => 'a',
        }
    }
}

/// Decode field bytes using the given encoding.
///
/// # Errors
///
/// Returns `Encoding` if the bytes are invalid for the encoding.
pub fn decode_bytes(bytes: &[u8], encoding: MarcEncoding) -> Result<String> {
    match encoding {
        MarcEncoding::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| CleanError::Encoding(format!("Invalid UTF-8: {e}"))),
        MarcEncoding::Marc8 => decode_marc8(bytes),
    }
}

/// Single-byte MARC-8 working sets this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    BasicLatin,
    Ansel,
}

impl Charset {
    /// Map an ISO 2022 designation final character to a supported set.
    fn from_final(byte: u8) -> Option<Charset> {
        match byte {
            b'B' => Some(Charset::BasicLatin),
            b'E' => Some(Charset::Ansel),
            _ => None,
        }
    }
}

/// Decode MARC-8 bytes to a UTF-8 string.
///
/// Handles G0/G1 designation via ISO 2022 escape sequences, buffers ANSEL
/// combining marks (which precede their base character in MARC-8) and
/// re-emits them after the base in Unicode order, then normalizes to NFC.
fn decode_marc8(bytes: &[u8]) -> Result<String> {
    let mut g0 = Charset::BasicLatin;
    let mut g1 = Charset::Ansel;
    let mut result = String::new();
    let mut pending_marks: Vec<char> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        // ESC - character set designation
        if byte == 0x1B {
            let Some(&kind) = bytes.get(i + 1) else {
                return Err(CleanError::Encoding(
                    "Incomplete escape sequence at end of data".to_string(),
                ));
            };
            match kind {
                // ESC ( F - designate G0
                0x28 => {
                    g0 = designated_charset(bytes, i + 2)?;
                    i += 3;
                },
                // ESC ) F - designate G1
                0x29 => {
                    g1 = designated_charset(bytes, i + 2)?;
                    i += 3;
                },
                // ESC s - reset G0 to Basic Latin
                0x73 => {
                    g0 = Charset::BasicLatin;
                    i += 2;
                },
                // ESC $ - multi-byte designation (EACC)
                0x24 => {
                    return Err(CleanError::Encoding(
                        "Multi-byte MARC-8 character sets (EACC) are not supported".to_string(),
                    ));
                },
                other => {
                    return Err(CleanError::Encoding(format!(
                        "Unsupported MARC-8 escape sequence: ESC 0x{other:02X}"
                    )));
                },
            }
            continue;
        }

        // Control characters pass through only as line breaks.
        if byte < 0x20 || byte == 0x7F {
            if byte == 0x0A || byte == 0x0D {
                result.push(byte as char);
            }
            i += 1;
            continue;
        }

        // High bytes use G1, low bytes use G0; ANSEL code points are the
        // high-byte values regardless of which side it is designated on.
        let (charset, value) = if byte >= 0xA0 {
            (g1, byte)
        } else {
            (g0, byte)
        };

        match charset {
            Charset::BasicLatin => {
                result.push(byte as char);
                flush_marks(&mut result, &mut pending_marks);
            },
            Charset::Ansel => {
                let value = if value < 0xA0 { value + 0x80 } else { value };
                match ansel_char(value) {
                    Some((ch, true)) => pending_marks.push(ch),
                    Some((ch, false)) => {
                        result.push(ch);
                        flush_marks(&mut result, &mut pending_marks);
                    },
                    None => {
                        result.push('\u{FFFD}');
                        flush_marks(&mut result, &mut pending_marks);
                    },
                }
            },
        }

        i += 1;
    }

    // Stray marks with no base character keep their decoded form.
    result.extend(pending_marks);

    Ok(result.nfc().collect())
}

fn designated_charset(bytes: &[u8], at: usize) -> Result<Charset> {
    let Some(&final_byte) = bytes.get(at) else {
        return Err(CleanError::Encoding(
            "Incomplete escape sequence at end of data".to_string(),
        ));
    };
    Charset::from_final(final_byte).ok_or_else(|| {
        CleanError::Encoding(format!(
            "Unsupported MARC-8 character set designation: {}",
            final_byte as char
        ))
    })
}

/// In MARC-8 combining marks precede the base character; in Unicode they
/// follow it. Marks buffered while scanning are appended after the base.
fn flush_marks(result: &mut String, pending: &mut Vec<char>) {
    for mark in pending.drain(..) {
        result.push(mark);
    }
}

/// ANSEL Extended Latin table: code point and whether it combines.
#[allow(clippy::too_many_lines)]
fn ansel_char(byte: u8) -> Option<(char, bool)> {
    let (ch, combining) = match byte {
        0xA1 => ('\u{0141}', false), // Ł
        0xA2 => ('\u{00D8}', false), // Ø
        0xA3 => ('\u{0110}', false), // Đ
        0xA4 => ('\u{00DE}', false), // Þ
        0xA5 => ('\u{00C6}', false), // Æ
        0xA6 => ('\u{0152}', false), // Œ
        0xA7 => ('\u{02B9}', false), // prime / soft sign
        0xA8 => ('\u{00B7}', false), // middle dot
        0xA9 => ('\u{266D}', false), // music flat
        0xAA => ('\u{00AE}', false), // ®
        0xAB => ('\u{00B1}', false), // ±
        0xAC => ('\u{01A0}', false), // Ơ
        0xAD => ('\u{01AF}', false), // Ư
        0xAE => ('\u{02BC}', false), // alif
        0xB0 => ('\u{02BB}', false), // ayn
        0xB1 => ('\u{0142}', false), // ł
        0xB2 => ('\u{00F8}', false), // ø
        0xB3 => ('\u{0111}', false), // đ
        0xB4 => ('\u{00FE}', false), // þ
        0xB5 => ('\u{00E6}', false), // æ
        0xB6 => ('\u{0153}', false), // œ
        0xB7 => ('\u{02BA}', false), // double prime / hard sign
        0xB8 => ('\u{0131}', false), // ı
        0xB9 => ('\u{00A3}', false), // £
        0xBA => ('\u{00F0}', false), // ð
        0xBC => ('\u{01A1}', false), // ơ
        0xBD => ('\u{01B0}', false), // ư
        0xC0 => ('\u{00B0}', false), // °
        0xC1 => ('\u{2113}', false), // script l
        0xC2 => ('\u{2117}', false), // ℗
        0xC3 => ('\u{00A9}', false), // ©
        0xC4 => ('\u{266F}', false), // music sharp
        0xC5 => ('\u{00BF}', false), // ¿
        0xC6 => ('\u{00A1}', false), // ¡
        0xC7 => ('\u{00DF}', false), // ß
        0xC8 => ('\u{20AC}', false), // €
        0xE0 => ('\u{0309}', true),  // hook above
        0xE1 => ('\u{0300}', true),  // grave
        0xE2 => ('\u{0301}', true),  // acute
        0xE3 => ('\u{0302}', true),  // circumflex
        0xE4 => ('\u{0303}', true),  // tilde
        0xE5 => ('\u{0304}', true),  // macron
        0xE6 => ('\u{0306}', true),  // breve
        0xE7 => ('\u{0307}', true),  // dot above
        0xE8 => ('\u{0308}', true),  // diaeresis
        0xE9 => ('\u{030C}', true),  // caron
        0xEA => ('\u{030A}', true),  // ring above
        0xEB => ('\u{FE20}', true),  // ligature left half
        0xEC => ('\u{FE21}', true),  // ligature right half
        0xED => ('\u{0315}', true),  // comma above right
        0xEE => ('\u{030B}', true),  // double acute
        0xEF => ('\u{0310}', true),  // candrabindu
        0xF0 => ('\u{0327}', true),  // cedilla
        0xF1 => ('\u{0328}', true),  // ogonek
        0xF2 => ('\u{0323}', true),  // dot below
        0xF3 => ('\u{0324}', true),  // double dot below
        0xF4 => ('\u{0325}', true),  // ring below
        0xF5 => ('\u{0333}', true),  // double low line
        0xF6 => ('\u{0332}', true),  // low line
        0xF7 => ('\u{0326}', true),  // comma below
        0xF8 => ('\u{031C}', true),  // left half ring below
        0xF9 => ('\u{032E}', true),  // breve below
        0xFA => ('\u{FE22}', true),  // double tilde left half
        0xFB => ('\u{FE23}', true),  // double tilde right half
        0xFE => ('\u{0313}', true),  // comma above
        _ => return None,
    };
    Some((ch, combining))
}
