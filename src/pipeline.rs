//! The record processing pipeline.
//!
//! [`process_file`] is the sequential core of a run: open the input, read
//! each record, derive its language context, transform it, and accumulate
//! the cleaned collection in memory. Emission happens afterwards, once,
//! from the full collection (see [`crate::emit`]).
//!
//! Every failure is fail-fast: the first configuration, input, or
//! transformation error aborts the run. Transformation failures carry the
//! record's 001 control number when it has one.

use crate::config::EffectiveConfig;
use crate::context::extract_context;
use crate::error::{CleanError, Result};
use crate::reader::MarcReader;
use crate::record::Record;
use crate::transform::transform_record;
use std::fs::File;
use std::path::Path;

/// Read, contextualize, and transform every record in the input file.
///
/// With `verbose` set, each record's control number is printed as it is
/// processed.
///
/// # Errors
///
/// Returns `InputAccess` if the file cannot be opened, a structural or
/// decoding error from the reader, or `Transform` wrapping the failing
/// record's identifier if a repair or cleaning step fails.
pub fn process_file(
    input: &Path,
    config: &EffectiveConfig,
    verbose: bool,
) -> Result<Vec<Record>> {
    let file = File::open(input)
        .map_err(|e| CleanError::InputAccess(format!("{}: {e}", input.display())))?;
    let mut reader = MarcReader::new(file);

    if verbose {
        println!("\nProcessing:");
    }

    let mut records = Vec::new();
    while let Some(mut record) = reader.read_record()? {
        if verbose {
            println!("\t{}", record.control_number().unwrap_or("<no 001>"));
        }

        let record_id = record.control_number().map(str::to_string);
        let context = extract_context(&record)?;
        transform_record(&mut record, &context, config).map_err(|e| CleanError::Transform {
            record_id,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, BaseConfig, Overrides, ThaiLaoSetting};
    use crate::leader::Leader;
    use crate::record::Field;
    use crate::writer::MarcWriter;
    use std::io::Write as _;

    fn config() -> EffectiveConfig {
        let base = BaseConfig {
            normalisation: "NFC".to_string(),
            cyrillic: true,
            thai_lao: ThaiLaoSetting(None),
            fields: vec!["245".to_string()],
            native_fields: vec!["880".to_string()],
        };
        resolve(&base, &Overrides::default()).unwrap()
    }

    fn write_input(records: &[Record], path: &Path) {
        let mut buffer = Vec::new();
        let mut writer = MarcWriter::new(&mut buffer);
        for record in records {
            writer.write_record(record).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(&buffer).unwrap();
    }

    fn russian_record(id: &str, title: &str) -> Record {
        let mut record = Record::new(Leader::default());
        record.add_control_field("001", id);
        record.add_control_field("008", "920219s1990    mau           001 0 rus  ");
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', title);
        record.add_field(field);
        record
    }

    #[test]
    fn test_process_transforms_and_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mrc");
        write_input(
            &[
                russian_record("r1", "Pu\u{FE20}ts\u{FE21}kin"),
                russian_record("r2", "Plain title"),
            ],
            &input,
        );

        let records = process_file(&input, &config(), false).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].control_number(), Some("r1"));
        assert_eq!(
            records[0].first_field("245").unwrap().subfield('a'),
            Some("Pu\u{0361}tskin")
        );
        assert_eq!(records[1].control_number(), Some("r2"));
    }

    #[test]
    fn test_missing_input_is_input_access_error() {
        let result = process_file(Path::new("/no/such/file.mrc"), &config(), false);
        assert!(matches!(result, Err(CleanError::InputAccess(_))));
    }

    #[test]
    fn test_record_without_008_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mrc");
        let mut record = Record::new(Leader::default());
        record.add_control_field("001", "broken");
        write_input(&[record], &input);

        let result = process_file(&input, &config(), false);
        assert!(matches!(result, Err(CleanError::InputAccess(_))));
    }

    #[test]
    fn test_transform_failure_names_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mrc");

        let mut record = russian_record("bad1", "ok");
        let mut native = Field::new("880", '0', ' ');
        native.add_subfield('a', "&#xD800; unpaired");
        record.add_field(native);
        write_input(&[record], &input);

        let base = BaseConfig {
            normalisation: "NFC".to_string(),
            cyrillic: false,
            thai_lao: ThaiLaoSetting(None),
            fields: vec![],
            native_fields: vec!["880".to_string()],
        };
        let overrides = Overrides {
            repair_scripts: vec!["goth".to_string()],
            ..Overrides::default()
        };
        let config = resolve(&base, &overrides).unwrap();

        match process_file(&input, &config, false) {
            Err(CleanError::Transform { record_id, .. }) => {
                assert_eq!(record_id.as_deref(), Some("bad1"));
            },
            other => panic!("expected transform error, got {other:?}"),
        }
    }
}
