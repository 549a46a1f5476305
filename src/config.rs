//! Configuration resolution.
//!
//! A run's settings come from two places: a JSON configuration document
//! (the packaged default, or a replacement supplied with `--options`) and
//! command-line overrides. [`resolve`] merges them into one immutable
//! [`EffectiveConfig`] that is threaded explicitly through every later
//! stage — there is no ambient settings state anywhere else.
//!
//! Per-key precedence is strict: a supplied override always wins over the
//! base document. The Thai/Lao setting is an explicit tri-state: `"1997"`,
//! `"2011"`, or disabled, with disabled reachable from the document as
//! `null` or `"None"` and from an override as `"None"`. Any other value is
//! a configuration error.

use crate::error::{CleanError, Result};
use crate::normalize::{NormalizationForm, ThaiLaoMode};
use indexmap::IndexSet;
use serde::Deserialize;

/// The configuration document packaged with the binary.
pub const DEFAULT_CONFIG: &str = include_str!("../config/default_config.json");

/// The persisted configuration document.
///
/// `normalisation`, `cyrillic`, and `thai_lao` are required; the field
/// lists default to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseConfig {
    /// Unicode normalisation form name: NFC, NFD, or NFM21.
    pub normalisation: String,
    /// Whether Cyrillic half-mark folding is enabled. Strictly boolean.
    pub cyrillic: bool,
    /// Thai/Lao romanization interpretation: "1997", "2011", "None", or null.
    pub thai_lao: ThaiLaoSetting,
    /// Field tags to clean.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Field tags carrying native-script strings.
    #[serde(default)]
    pub native_fields: Vec<String>,
}

/// Wrapper for the `thai_lao` key: the key itself is required (a plain
/// `Option` field would make it optional), but its value may be `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThaiLaoSetting(pub Option<String>);

impl BaseConfig {
    /// Parse a configuration document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the document cannot be parsed or a required key
    /// is absent or of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CleanError::Config(format!("Cannot parse configuration document: {e}")))
    }
}

/// Command-line overrides; `None` means "not supplied, use the base value".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--normalisation`
    pub normalisation: Option<String>,
    /// `--cyrillic` ("True"/"False")
    pub cyrillic: Option<String>,
    /// `--thailao` ("1997"/"2011"/"None")
    pub thai_lao: Option<String>,
    /// `--fields`
    pub fields: Option<Vec<String>>,
    /// `--script_fields`
    pub native_fields: Option<Vec<String>>,
    /// `--exlibris_voyager_smp` script codes, in supplied order.
    pub repair_scripts: Vec<String>,
}

/// The resolved, immutable settings for one run.
///
/// Built once by [`resolve`]; every downstream consumer reads definite
/// values — no optional or partial settings survive resolution.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    /// Final Unicode normalization form.
    pub normalization: NormalizationForm,
    /// Cyrillic half-mark folding.
    pub cyrillic: bool,
    /// Thai/Lao romanization interpretation.
    pub thai_lao: ThaiLaoMode,
    /// Field tags to clean, in configuration order.
    pub target_fields: IndexSet<String>,
    /// Field tags carrying native-script strings, in configuration order.
    pub native_fields: IndexSet<String>,
    /// Script codes to attempt repairing, in supplied order.
    pub repair_scripts: Vec<String>,
}

/// Merge a base configuration document with command-line overrides.
///
/// # Errors
///
/// Returns `Config` when an override or base value is outside its
/// enumerated set.
pub fn resolve(base: &BaseConfig, overrides: &Overrides) -> Result<EffectiveConfig> {
    let normalization_name = overrides
        .normalisation
        .as_deref()
        .unwrap_or(&base.normalisation);
    let normalization = normalization_name
        .parse::<NormalizationForm>()
        .map_err(CleanError::Config)?;

    let cyrillic = match overrides.cyrillic.as_deref() {
        None => base.cyrillic,
        Some("True") => true,
        Some("False") => false,
        Some(other) => {
            return Err(CleanError::Config(format!(
                "Invalid cyrillic override {other:?} (expected True or False)"
            )));
        },
    };

    let thai_lao = match &overrides.thai_lao {
        Some(value) => parse_thai_lao(value)?,
        None => match &base.thai_lao.0 {
            None => ThaiLaoMode::Disabled,
            Some(value) => parse_thai_lao(value)?,
        },
    };

    let target_fields: IndexSet<String> = overrides
        .fields
        .clone()
        .unwrap_or_else(|| base.fields.clone())
        .into_iter()
        .collect();
    let native_fields: IndexSet<String> = overrides
        .native_fields
        .clone()
        .unwrap_or_else(|| base.native_fields.clone())
        .into_iter()
        .collect();

    Ok(EffectiveConfig {
        normalization,
        cyrillic,
        thai_lao,
        target_fields,
        native_fields,
        repair_scripts: overrides.repair_scripts.clone(),
    })
}

/// Parse the tri-state Thai/Lao setting. Only "1997" and "2011" are valid
/// non-disabled values; "None" is the disabled sentinel.
fn parse_thai_lao(value: &str) -> Result<ThaiLaoMode> {
    match value {
        "1997" => Ok(ThaiLaoMode::R1997),
        "2011" => Ok(ThaiLaoMode::R2011),
        "None" => Ok(ThaiLaoMode::Disabled),
        other => Err(CleanError::Config(format!(
            "Invalid thai_lao value {other:?} (expected 1997, 2011, or None)"
        ))),
    }
}
