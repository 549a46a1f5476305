//! Property tests for the engine's structural invariants.

mod common;

use common::test_config;
use marcnorm::config::Overrides;
use marcnorm::normalize::{clean_subfield, NormalizationForm, ThaiLaoMode};
use marcnorm::transform::transform_record;
use marcnorm::{Field, Leader, Record, RecordContext};
use proptest::prelude::*;

fn arbitrary_value() -> impl Strategy<Value = String> {
    // Printable text mixing ASCII with the characters the cleaning passes
    // care about: precomposed Latin, half marks, and the open-o vowels.
    proptest::collection::vec(
        prop_oneof![
            proptest::char::range('a', 'z'),
            proptest::char::range('A', 'Z'),
            Just(' '),
            Just('\u{00E9}'),
            Just('\u{0153}'),
            Just('\u{01EB}'),
            Just('\u{FE20}'),
            Just('\u{FE21}'),
            Just('\u{0301}'),
        ],
        0..24,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    /// Cleaning is idempotent for every form/mode/language combination.
    #[test]
    fn clean_subfield_is_idempotent(
        value in arbitrary_value(),
        form_index in 0usize..3,
        mode_index in 0usize..3,
        language_index in 0usize..4,
        cyrillic in proptest::bool::ANY,
    ) {
        let form = [
            NormalizationForm::Nfc,
            NormalizationForm::Nfd,
            NormalizationForm::Nfm21,
        ][form_index];
        let mode = [ThaiLaoMode::R1997, ThaiLaoMode::R2011, ThaiLaoMode::Disabled][mode_index];
        let language = ["rus", "tha", "lao", "eng"][language_index];

        let once = clean_subfield(&value, language, form, mode, cyrillic);
        let twice = clean_subfield(&once, language, form, mode, cyrillic);
        prop_assert_eq!(once, twice);
    }

    /// Fields outside the configured sets pass through byte-identical, and
    /// field/subfield order survives transformation.
    #[test]
    fn untargeted_fields_are_isolated(
        targeted in arbitrary_value(),
        untargeted_a in arbitrary_value(),
        untargeted_b in arbitrary_value(),
    ) {
        let config = test_config(&Overrides::default());

        let mut record = Record::new(Leader::default());
        let mut f245 = Field::new("245", '1', '0');
        f245.add_subfield('a', targeted.clone());
        record.add_field(f245);
        let mut f300 = Field::new("300", ' ', ' ');
        f300.add_subfield('a', untargeted_a.clone());
        f300.add_subfield('c', untargeted_b.clone());
        record.add_field(f300);
        let mut f500 = Field::new("500", ' ', ' ');
        f500.add_subfield('a', untargeted_b.clone());
        record.add_field(f500);

        let context = RecordContext { language_code: "rus".to_string() };
        transform_record(&mut record, &context, &config).unwrap();

        let tags: Vec<&str> = record.fields.iter().map(|f| f.tag.as_str()).collect();
        prop_assert_eq!(tags, vec!["245", "300", "500"]);

        let f300 = record.first_field("300").unwrap();
        prop_assert_eq!(f300.subfield('a').unwrap(), untargeted_a.as_str());
        prop_assert_eq!(f300.subfield('c').unwrap(), untargeted_b.as_str());
        prop_assert_eq!(
            record.first_field("500").unwrap().subfield('a').unwrap(),
            untargeted_b.as_str()
        );

        // Targeted subfield keeps its code even when its value changes.
        let codes: Vec<char> = record
            .first_field("245").unwrap()
            .subfields.iter().map(|s| s.code).collect();
        prop_assert_eq!(codes, vec!['a']);
    }

    /// Transforming an already-transformed record changes nothing.
    #[test]
    fn transform_is_idempotent(value in arbitrary_value()) {
        let config = test_config(&Overrides::default());
        let context = RecordContext { language_code: "rus".to_string() };

        let mut record = Record::new(Leader::default());
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', value);
        record.add_field(field);

        transform_record(&mut record, &context, &config).unwrap();
        let once = record.clone();
        transform_record(&mut record, &context, &config).unwrap();
        prop_assert_eq!(record, once);
    }
}
