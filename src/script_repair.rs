//! Supplementary-plane script repair.
//!
//! Legacy cataloging systems stored characters outside the basic
//! multilingual plane as XML/HTML numeric character references — usually a
//! UTF-16 surrogate pair escaped as two adjacent references. [`repair_smp`]
//! rejoins such pairs into the real supplementary-plane character, and
//! unescapes direct references, whenever the resulting character falls in
//! the requested script's block. References to other planes or scripts are
//! left untouched, so repairs for several scripts compose.
//!
//! The set of repairable scripts is a fixed allow-list of lowercase
//! ISO 15924 codes for supplementary-plane scripts; requests outside the
//! list are the *caller's* concern (the transformation engine skips them
//! as best-effort requests).

use crate::error::{CleanError, Result};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NCR: Regex = Regex::new(r"&#(?:x([0-9A-Fa-f]{1,6})|([0-9]{1,7}));").unwrap();
}

/// Code-point ranges for a repairable supplementary-plane script.
///
/// Returns `None` for codes outside the allow-list.
#[must_use]
pub fn script_ranges(script: &str) -> Option<&'static [(u32, u32)]> {
    let ranges: &'static [(u32, u32)] = match script {
        "linb" => &[(0x10000, 0x100FF), (0x10100, 0x1013F)],
        "lyci" => &[(0x10280, 0x1029F)],
        "cari" => &[(0x102A0, 0x102DF)],
        "ital" => &[(0x10300, 0x1032F)],
        "goth" => &[(0x10330, 0x1034F)],
        "ugar" => &[(0x10380, 0x1039F)],
        "xpeo" => &[(0x103A0, 0x103DF)],
        "dsrt" => &[(0x10400, 0x1044F)],
        "shaw" => &[(0x10450, 0x1047F)],
        "osma" => &[(0x10480, 0x104AF)],
        "cprt" => &[(0x10800, 0x1083F)],
        "armi" => &[(0x10840, 0x1085F)],
        "phnx" => &[(0x10900, 0x1091F)],
        "lydi" => &[(0x10920, 0x1093F)],
        "khar" => &[(0x10A00, 0x10A5F)],
        "sarb" => &[(0x10A60, 0x10A7F)],
        "avst" => &[(0x10B00, 0x10B3F)],
        "orkh" => &[(0x10C00, 0x10C4F)],
        "brah" => &[(0x11000, 0x1107F)],
        "xsux" => &[(0x12000, 0x123FF), (0x12400, 0x1247F)],
        "egyp" => &[(0x13000, 0x1342F)],
        _ => return None,
    };
    Some(ranges)
}

/// Whether a script code is in the repairable allow-list.
#[must_use]
pub fn is_repairable(script: &str) -> bool {
    script_ranges(script).is_some()
}

/// Repair supplementary-plane references for one script.
///
/// # Errors
///
/// Returns an encoding error for an unpaired surrogate reference or a
/// reference whose value is not a number — both indicate corrupt source
/// data that must not be silently propagated.
pub fn repair_smp(text: &str, script: &str) -> Result<String> {
    let Some(ranges) = script_ranges(script) else {
        // Callers are expected to filter on `is_repairable`; an unknown
        // script reaching this point is a programming error upstream, but
        // the contract is best-effort, so the text passes through.
        return Ok(text.to_string());
    };

    let matches: Vec<(usize, usize, u32)> = NCR
        .captures_iter(text)
        .map(|caps| {
            let m = caps.get(0).expect("whole-match group always present");
            let value = parse_ncr(&caps)?;
            Ok((m.start(), m.end(), value))
        })
        .collect::<Result<_>>()?;

    let in_script = |cp: u32| ranges.iter().any(|&(lo, hi)| cp >= lo && cp <= hi);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut i = 0;
    while i < matches.len() {
        let (start, end, value) = matches[i];
        out.push_str(&text[cursor..start]);

        if is_high_surrogate(value) {
            let Some(&(next_start, next_end, low)) = matches.get(i + 1) else {
                return Err(unpaired(value));
            };
            if next_start != end || !is_low_surrogate(low) {
                return Err(unpaired(value));
            }
            let scalar = 0x10000 + ((value - 0xD800) << 10) + (low - 0xDC00);
            if in_script(scalar) {
                // char::from_u32 cannot fail for a joined surrogate pair.
                out.push(char::from_u32(scalar).expect("valid supplementary scalar"));
            } else {
                out.push_str(&text[start..next_end]);
            }
            cursor = next_end;
            i += 2;
            continue;
        }

        if is_low_surrogate(value) {
            return Err(unpaired(value));
        }

        match char::from_u32(value) {
            Some(c) if in_script(value) => out.push(c),
            _ => out.push_str(&text[start..end]),
        }
        cursor = end;
        i += 1;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

fn parse_ncr(caps: &regex::Captures<'_>) -> Result<u32> {
    let parsed = if let Some(hex) = caps.get(1) {
        u32::from_str_radix(hex.as_str(), 16)
    } else {
        caps[2].parse::<u32>()
    };
    parsed.map_err(|_| {
        CleanError::Encoding(format!(
            "Numeric character reference out of range: {}",
            &caps[0]
        ))
    })
}

fn is_high_surrogate(value: u32) -> bool {
    (0xD800..=0xDBFF).contains(&value)
}

fn is_low_surrogate(value: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&value)
}

fn unpaired(value: u32) -> CleanError {
    CleanError::Encoding(format!(
        "Unpaired surrogate reference &#x{value:04X}; in source data"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(is_repairable("goth"));
        assert!(is_repairable("egyp"));
        assert!(!is_repairable("latn"));
        assert!(!is_repairable("GOTH"));
    }

    #[test]
    fn test_surrogate_pair_joined() {
        // GOTHIC LETTER AHSA (U+10330) as an escaped surrogate pair.
        let repaired = repair_smp("x &#xD800;&#xDF30; y", "goth").unwrap();
        assert_eq!(repaired, "x \u{10330} y");
    }

    #[test]
    fn test_decimal_references() {
        // 0xD800 = 55296, 0xDF30 = 57136
        let repaired = repair_smp("&#55296;&#57136;", "goth").unwrap();
        assert_eq!(repaired, "\u{10330}");
    }

    #[test]
    fn test_direct_reference_in_block() {
        let repaired = repair_smp("&#x10330;", "goth").unwrap();
        assert_eq!(repaired, "\u{10330}");
    }

    #[test]
    fn test_other_scripts_left_alone() {
        // Phoenician pair is untouched by a Gothic repair...
        let text = "&#xD802;&#xDD00;";
        assert_eq!(repair_smp(text, "goth").unwrap(), text);
        // ...and resolved by a Phoenician one (U+10900).
        assert_eq!(repair_smp(text, "phnx").unwrap(), "\u{10900}");
    }

    #[test]
    fn test_bmp_references_untouched() {
        let text = "caf&#xE9; &#169;";
        assert_eq!(repair_smp(text, "goth").unwrap(), text);
    }

    #[test]
    fn test_unpaired_high_surrogate_is_error() {
        assert!(repair_smp("&#xD800; alone", "goth").is_err());
        assert!(repair_smp("&#xD800;&#x0041;", "goth").is_err());
    }

    #[test]
    fn test_stray_low_surrogate_is_error() {
        assert!(repair_smp("&#xDF30;", "goth").is_err());
    }

    #[test]
    fn test_unknown_script_passes_through() {
        let text = "&#xD800;&#xDF30;";
        assert_eq!(repair_smp(text, "zzzz").unwrap(), text);
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(repair_smp("no references here", "goth").unwrap(), "no references here");
    }
}
