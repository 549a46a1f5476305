//! Unicode normalization and romanization cleanup for subfield text.
//!
//! [`clean_subfield`] is the general cleaning function applied to every
//! subfield of a configured target field. It composes, in order:
//!
//! 1. NFC pre-composition, so the language-specific passes see canonical
//!    precomposed input regardless of the source's state;
//! 2. the Thai/Lao romanization interpretation swap, for records in `tha`
//!    or `lao`;
//! 3. Cyrillic half-mark folding (combining half marks to the double
//!    diacritic), for Slavic-language records when enabled;
//! 4. the configured final normalization form.
//!
//! The composition is idempotent: cleaning already-cleaned text with the
//! same settings returns it byte-identical.

use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form applied as the final cleaning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationForm {
    /// Canonical composition.
    Nfc,
    /// Canonical decomposition.
    Nfd,
    /// The MARC21 profile: canonical decomposition for Latin, Greek, and
    /// Cyrillic runs; canonical composition for all other scripts.
    Nfm21,
}

impl FromStr for NormalizationForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFM21" => Ok(NormalizationForm::Nfm21),
            other => Err(format!(
                "Invalid normalisation form {other:?} (expected NFC, NFD, or NFM21)"
            )),
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationForm::Nfc => write!(f, "NFC"),
            NormalizationForm::Nfd => write!(f, "NFD"),
            NormalizationForm::Nfm21 => write!(f, "NFM21"),
        }
    }
}

/// Thai/Lao romanization interpretation: the 1997 or 2011 revision of the
/// transliteration tables, or disabled outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThaiLaoMode {
    /// The 1997 interpretation.
    R1997,
    /// The 2011 interpretation.
    R2011,
    /// Romanization repair turned off.
    Disabled,
}

impl fmt::Display for ThaiLaoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThaiLaoMode::R1997 => write!(f, "1997"),
            ThaiLaoMode::R2011 => write!(f, "2011"),
            ThaiLaoMode::Disabled => write!(f, "None"),
        }
    }
}

/// Languages whose romanized text carries the double-diacritic ligatures.
const CYRILLIC_LANGUAGES: &[&str] = &[
    "rus", "ukr", "bel", "bul", "srp", "mkd", "kaz", "kir", "tgk", "uzb", "mon", "chu",
];

/// Clean one subfield value.
///
/// `language` is the record's language code as extracted from 041$a or
/// 008/35-37; unknown or empty codes simply leave the language-gated
/// passes inactive.
#[must_use]
pub fn clean_subfield(
    text: &str,
    language: &str,
    form: NormalizationForm,
    thai_lao: ThaiLaoMode,
    cyrillic: bool,
) -> String {
    let mut cleaned: String = text.nfc().collect();

    if matches!(language, "tha" | "lao") {
        cleaned = apply_thai_lao(&cleaned, thai_lao);
    }

    if cyrillic && CYRILLIC_LANGUAGES.contains(&language) {
        cleaned = fold_half_marks(&cleaned);
    }

    apply_form(&cleaned, form)
}

/// Apply a normalization form to already-precomposed text.
fn apply_form(text: &str, form: NormalizationForm) -> String {
    match form {
        NormalizationForm::Nfc => text.nfc().collect(),
        NormalizationForm::Nfd => text.nfd().collect(),
        NormalizationForm::Nfm21 => nfm21(text),
    }
}

/// The MARC21 normalization profile: decompose Latin/Greek/Cyrillic runs,
/// compose everything else. Combining marks extend the run of their base.
fn nfm21(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = String::new();
    let mut run_decomposes = true;

    for c in text.chars() {
        match run_class(c) {
            None => run.push(c),
            Some(decomposes) => {
                if decomposes != run_decomposes && !run.is_empty() {
                    flush_run(&mut out, &run, run_decomposes);
                    run.clear();
                }
                run_decomposes = decomposes;
                run.push(c);
            },
        }
    }
    flush_run(&mut out, &run, run_decomposes);
    out
}

fn flush_run(out: &mut String, run: &str, decomposes: bool) {
    if decomposes {
        out.extend(run.nfd());
    } else {
        out.extend(run.nfc());
    }
}

/// Classify a character for NFM21 run segmentation.
///
/// `None` continues the current run (combining marks, punctuation, digits,
/// whitespace); `Some(true)` starts/extends a decomposing run
/// (Latin/Greek/Cyrillic); `Some(false)` a composing run.
fn run_class(c: char) -> Option<bool> {
    let cp = c as u32;
    match cp {
        // Combining marks and half marks ride along with their base.
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F => None,
        // ASCII and general punctuation/digits/space are run-neutral.
        0x0000..=0x0040 | 0x005B..=0x0060 | 0x007B..=0x00BF | 0x2000..=0x206F => None,
        // Latin
        0x0041..=0x024F | 0x1E00..=0x1EFF | 0x2C60..=0x2C7F | 0xA720..=0xA7FF => Some(true),
        // Greek
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Some(true),
        // Cyrillic
        0x0400..=0x052F | 0x2DE0..=0x2DFF | 0xA640..=0xA69F => Some(true),
        _ => Some(false),
    }
}

/// Swap the open-o vowel rendering between the 1997 and 2011
/// interpretations of the Thai/Lao romanization tables.
fn apply_thai_lao(text: &str, mode: ThaiLaoMode) -> String {
    match mode {
        ThaiLaoMode::Disabled => text.to_string(),
        ThaiLaoMode::R1997 => text
            .chars()
            .flat_map(|c| match c {
                '\u{01EB}' => vec!['\u{0153}'],             // ǫ -> œ
                '\u{01EA}' => vec!['\u{0152}'],             // Ǫ -> Œ
                '\u{01ED}' => vec!['\u{0153}', '\u{0304}'], // ǭ -> œ̄
                '\u{01EC}' => vec!['\u{0152}', '\u{0304}'], // Ǭ -> Œ̄
                other => vec![other],
            })
            .collect(),
        ThaiLaoMode::R2011 => text
            .chars()
            .map(|c| match c {
                '\u{0153}' => '\u{01EB}', // œ -> ǫ
                '\u{0152}' => '\u{01EA}', // Œ -> Ǫ
                other => other,
            })
            .collect(),
    }
}

/// Fold combining half marks into the double diacritic: a
/// left-half/right-half pair spanning two base characters becomes the
/// single double-width mark on the first base.
fn fold_half_marks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_drop: Option<char> = None;

    for c in text.chars() {
        if Some(c) == pending_drop {
            pending_drop = None;
            continue;
        }
        match c {
            '\u{FE20}' => {
                out.push('\u{0361}'); // combining double inverted breve
                pending_drop = Some('\u{FE21}');
            },
            '\u{FE22}' => {
                out.push('\u{0360}'); // combining double tilde
                pending_drop = Some('\u{FE23}');
            },
            other => out.push(other),
        }
    }
    out
}
