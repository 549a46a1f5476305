//! The field transformation engine.
//!
//! [`transform_record`] applies two phases to a record, in a fixed order:
//!
//! 1. **Script repair** — only when repair scripts were requested. Every
//!    subfield of every field whose tag is in the configured native-script
//!    set is run through [`crate::script_repair::repair_smp`] for each
//!    requested script, cumulatively, in the order the scripts were
//!    supplied. Requested codes outside the repairable allow-list are
//!    skipped: the request list is best-effort, not mandatory.
//! 2. **General cleaning** — unconditional. Every subfield of every field
//!    whose tag is in the configured target set is run through
//!    [`crate::normalize::clean_subfield`] with the record's language
//!    context and the resolved settings.
//!
//! Phase 1 completes before phase 2 reads anything, so repair and cleaning
//! compose rather than race. Fields in neither set pass through untouched.
//! Subfields are replaced by index with a new [`Subfield`] carrying the
//! same code, which keeps field and subfield order exactly as input and
//! avoids any aliasing between the original and cleaned states.

use crate::config::EffectiveConfig;
use crate::context::RecordContext;
use crate::error::Result;
use crate::normalize::clean_subfield;
use crate::record::{Record, Subfield};
use crate::script_repair::{is_repairable, repair_smp};

/// Transform a record in place, replacing targeted subfield values.
///
/// # Errors
///
/// Propagates the first repair failure; the record is then in a partially
/// repaired state and must be discarded by the caller (the pipeline aborts
/// the run).
pub fn transform_record(
    record: &mut Record,
    context: &RecordContext,
    config: &EffectiveConfig,
) -> Result<()> {
    if !config.repair_scripts.is_empty() {
        for field in &mut record.fields {
            if !config.native_fields.contains(&field.tag) {
                continue;
            }
            for i in 0..field.subfields.len() {
                let mut value = field.subfields[i].value.clone();
                for script in &config.repair_scripts {
                    if is_repairable(script) {
                        value = repair_smp(&value, script)?;
                    }
                }
                field.subfields[i] = Subfield::new(field.subfields[i].code, value);
            }
        }
    }

    for field in &mut record.fields {
        if !config.target_fields.contains(&field.tag) {
            continue;
        }
        for i in 0..field.subfields.len() {
            let cleaned = clean_subfield(
                &field.subfields[i].value,
                &context.language_code,
                config.normalization,
                config.thai_lao,
                config.cyrillic,
            );
            field.subfields[i] = Subfield::new(field.subfields[i].code, cleaned);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, BaseConfig, Overrides, ThaiLaoSetting};
    use crate::leader::Leader;
    use crate::record::Field;

    fn config_with(overrides: &Overrides) -> EffectiveConfig {
        let base = BaseConfig {
            normalisation: "NFC".to_string(),
            cyrillic: true,
            thai_lao: ThaiLaoSetting(None),
            fields: vec!["245".to_string()],
            native_fields: vec!["880".to_string()],
        };
        resolve(&base, overrides).unwrap()
    }

    fn rus_context() -> RecordContext {
        RecordContext {
            language_code: "rus".to_string(),
        }
    }

    #[test]
    fn test_cleaning_applies_to_target_fields() {
        let config = config_with(&Overrides::default());
        let mut record = Record::new(Leader::default());
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', "Pu\u{FE20}ts\u{FE21}kin");
        record.add_field(field);

        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(
            record.first_field("245").unwrap().subfield('a'),
            Some("Pu\u{0361}tskin")
        );
    }

    #[test]
    fn test_untargeted_fields_untouched() {
        let config = config_with(&Overrides::default());
        let mut record = Record::new(Leader::default());
        let mut field = Field::new("300", ' ', ' ');
        field.add_subfield('a', "x\u{FE20}y\u{FE21} pages");
        record.add_field(field.clone());

        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(record.first_field("300"), Some(&field));
    }

    #[test]
    fn test_repair_runs_before_cleaning() {
        // An 880 that is both a native-script field and a target field:
        // the NCR pair must be rejoined before cleaning normalizes it.
        let overrides = Overrides {
            fields: Some(vec!["880".to_string()]),
            repair_scripts: vec!["goth".to_string()],
            ..Overrides::default()
        };
        let config = config_with(&overrides);

        let mut record = Record::new(Leader::default());
        let mut field = Field::new("880", '1', '0');
        field.add_subfield('a', "&#xD800;&#xDF30; text");
        record.add_field(field);

        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(
            record.first_field("880").unwrap().subfield('a'),
            Some("\u{10330} text")
        );
    }

    #[test]
    fn test_repair_scripts_apply_cumulatively() {
        let overrides = Overrides {
            repair_scripts: vec!["goth".to_string(), "phnx".to_string()],
            ..Overrides::default()
        };
        let config = config_with(&overrides);

        let mut record = Record::new(Leader::default());
        let mut field = Field::new("880", '0', ' ');
        field.add_subfield('a', "&#xD800;&#xDF30;&#xD802;&#xDD00;");
        record.add_field(field);

        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(
            record.first_field("880").unwrap().subfield('a'),
            Some("\u{10330}\u{10900}")
        );
    }

    #[test]
    fn test_unsupported_scripts_silently_skipped() {
        let overrides = Overrides {
            repair_scripts: vec!["klingon".to_string()],
            ..Overrides::default()
        };
        let config = config_with(&overrides);

        let mut record = Record::new(Leader::default());
        let mut field = Field::new("880", '0', ' ');
        field.add_subfield('a', "&#xD800;&#xDF30;");
        record.add_field(field);

        // The unpaired-surrogate check never runs for a skipped script.
        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(
            record.first_field("880").unwrap().subfield('a'),
            Some("&#xD800;&#xDF30;")
        );
    }

    #[test]
    fn test_repair_failure_propagates() {
        let overrides = Overrides {
            repair_scripts: vec!["goth".to_string()],
            ..Overrides::default()
        };
        let config = config_with(&overrides);

        let mut record = Record::new(Leader::default());
        let mut field = Field::new("880", '0', ' ');
        field.add_subfield('a', "&#xD800; unpaired");
        record.add_field(field);

        assert!(transform_record(&mut record, &rus_context(), &config).is_err());
    }

    #[test]
    fn test_subfield_codes_and_order_preserved() {
        let config = config_with(&Overrides::default());
        let mut record = Record::new(Leader::default());
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', "Title :");
        field.add_subfield('b', "subtitle /");
        field.add_subfield('c', "author.");
        record.add_field(field);

        transform_record(&mut record, &rus_context(), &config).unwrap();
        let codes: Vec<char> = record.first_field("245").unwrap().subfields.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_idempotent_on_cleaned_record() {
        let config = config_with(&Overrides::default());
        let mut record = Record::new(Leader::default());
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', "T\u{FE20}Se\u{FE21}khov, Anton");
        record.add_field(field);

        transform_record(&mut record, &rus_context(), &config).unwrap();
        let once = record.clone();
        transform_record(&mut record, &rus_context(), &config).unwrap();
        assert_eq!(record, once);
    }
}
