//! Shared helpers for integration tests.
#![allow(dead_code)] // each test binary uses a different subset

use marcnorm::config::{resolve, BaseConfig, EffectiveConfig, Overrides};
use marcnorm::{Field, Leader, MarcWriter, Record};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Fixed-field 008 with the language code at positions 35-37.
#[must_use]
pub fn fixed_field(language: &str) -> String {
    format!("920219s1990    mau           001 0 {language}  ")
}

/// A minimal record with a 001, an 008 carrying `language`, and a 245$a.
#[must_use]
pub fn record_with_title(id: &str, language: &str, title: &str) -> Record {
    let mut record = Record::new(Leader::default());
    record.add_control_field("001", id);
    record.add_control_field("008", fixed_field(language));
    let mut field = Field::new("245", '1', '0');
    field.add_subfield('a', title);
    record.add_field(field);
    record
}

/// Serialize records to an ISO 2709 file on disk.
pub fn write_marc_file(records: &[Record], path: &Path) {
    let mut buffer = Vec::new();
    {
        let mut writer = MarcWriter::new(&mut buffer);
        for record in records {
            writer.write_record(record).expect("serialize test record");
        }
    }
    let mut file = File::create(path).expect("create test input");
    file.write_all(&buffer).expect("write test input");
}

/// An effective configuration resolved from a small base document plus
/// the given overrides.
#[must_use]
pub fn test_config(overrides: &Overrides) -> EffectiveConfig {
    let base = BaseConfig::from_json(
        r#"{
            "normalisation": "NFC",
            "cyrillic": true,
            "thai_lao": "1997",
            "fields": ["100", "245", "650"],
            "native_fields": ["880"]
        }"#,
    )
    .expect("test base config parses");
    resolve(&base, overrides).expect("test config resolves")
}
