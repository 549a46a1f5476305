//! MARCXML serialization and deserialization.
//!
//! Conversion between MARC records and the Library of Congress MARCXML
//! schema (<https://www.loc.gov/standards/marcxml/>): `tag`, `ind1`,
//! `ind2`, and `code` are XML attributes, and the `<collection>` root
//! carries the `http://www.loc.gov/MARC21/slim` namespace.
//!
//! The cleaned record set is always emitted as one `<collection>` document
//! with every record as a sibling `<record>` element. Deserialization
//! accepts both default-namespace and prefix-namespace forms; it is the
//! input side of the BIBFRAME structural transform, which consumes the
//! in-memory collection document rather than the record collection itself.

use crate::error::{CleanError, Result};
use crate::leader::Leader;
use crate::record::{Field, Record};
use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use quick_xml::se::to_string as xml_to_string;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// MARCXML record representation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "record")]
struct XmlRecord {
    leader: String,
    #[serde(default)]
    controlfield: Vec<XmlControlField>,
    #[serde(default)]
    datafield: Vec<XmlDataField>,
}

/// MARCXML control field.
#[derive(Debug, Serialize, Deserialize)]
struct XmlControlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "$value", default)]
    value: String,
}

/// MARCXML data field.
#[derive(Debug, Serialize, Deserialize)]
struct XmlDataField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(rename = "@ind1")]
    ind1: String,
    #[serde(rename = "@ind2")]
    ind2: String,
    #[serde(default)]
    subfield: Vec<XmlSubfield>,
}

/// MARCXML subfield.
#[derive(Debug, Serialize, Deserialize)]
struct XmlSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(rename = "$value", default)]
    value: String,
}

/// MARCXML collection wrapper.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "collection")]
struct XmlCollection {
    #[serde(default, rename = "record")]
    records: Vec<XmlRecord>,
}

lazy_static! {
    static ref XMLNS_DECLARATION: Regex = Regex::new(r#"\s+xmlns(?::\w+)?="[^"]*""#).unwrap();
    static ref ELEMENT_PREFIX: Regex = Regex::new(r"<(/?)(\w+):").unwrap();
}

/// Strip namespace declarations and element prefixes from MARCXML input,
/// so both `<record xmlns="...">` and `<marc:record>` forms parse.
fn strip_namespaces(xml: &str) -> String {
    let stripped = XMLNS_DECLARATION.replace_all(xml, "");
    ELEMENT_PREFIX.replace_all(&stripped, "<$1").to_string()
}

/// Serialize a record collection to a single MARCXML document.
///
/// # Errors
///
/// Returns an error if a leader cannot be rendered or serialization fails.
pub fn records_to_marcxml(records: &[Record]) -> Result<String> {
    let collection = XmlCollection {
        records: records.iter().map(to_xml_record).collect::<Result<_>>()?,
    };

    let body = xml_to_string(&collection)
        .map_err(|e| CleanError::InvalidRecord(format!("MARCXML serialization failed: {e}")))?;

    // quick-xml collapses an empty collection to a self-closing tag.
    let body = if body.starts_with("<collection/>") {
        format!("<collection xmlns=\"{MARCXML_NS}\"/>")
    } else {
        body.replacen(
            "<collection>",
            &format!("<collection xmlns=\"{MARCXML_NS}\">"),
            1,
        )
    };

    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"))
}

/// Parse a MARCXML `<collection>` document into records, in document order.
///
/// # Errors
///
/// Returns an error if the XML is not well-formed or a record is
/// structurally invalid.
pub fn marcxml_to_records(xml: &str) -> Result<Vec<Record>> {
    let cleaned = strip_namespaces(xml);
    let collection: XmlCollection = xml_from_str(&cleaned)
        .map_err(|e| CleanError::InvalidRecord(format!("MARCXML parse failed: {e}")))?;

    collection.records.into_iter().map(from_xml_record).collect()
}

fn to_xml_record(record: &Record) -> Result<XmlRecord> {
    let leader_bytes = record.leader.as_bytes()?;
    Ok(XmlRecord {
        leader: String::from_utf8_lossy(&leader_bytes).to_string(),
        controlfield: record
            .control_fields
            .iter()
            .map(|(tag, value)| XmlControlField {
                tag: tag.clone(),
                value: value.clone(),
            })
            .collect(),
        datafield: record
            .fields
            .iter()
            .map(|field| XmlDataField {
                tag: field.tag.clone(),
                ind1: field.indicator1.to_string(),
                ind2: field.indicator2.to_string(),
                subfield: field
                    .subfields
                    .iter()
                    .map(|s| XmlSubfield {
                        code: s.code.to_string(),
                        value: s.value.clone(),
                    })
                    .collect(),
            })
            .collect(),
    })
}

fn from_xml_record(xml_record: XmlRecord) -> Result<Record> {
    let leader = Leader::from_bytes(xml_record.leader.as_bytes())?;
    let mut record = Record::new(leader);

    for cf in xml_record.controlfield {
        record.add_control_field(cf.tag, cf.value);
    }

    for df in xml_record.datafield {
        let ind1 = df.ind1.chars().next().unwrap_or(' ');
        let ind2 = df.ind2.chars().next().unwrap_or(' ');
        let mut field = Field::new(df.tag, ind1, ind2);
        for sf in df.subfield {
            let code = sf
                .code
                .chars()
                .next()
                .ok_or_else(|| CleanError::InvalidField("Missing subfield code".to_string()))?;
            field.add_subfield(code, sf.value);
        }
        record.add_field(field);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(id: &str) -> Record {
        let mut record = Record::new(Leader::default());
        record.add_control_field("001", id);
        let mut field = Field::new("245", '1', '0');
        field.add_subfield('a', "Test title");
        record.add_field(field);
        record
    }

    #[test]
    fn test_collection_output_format() {
        let xml = records_to_marcxml(&[sample_record("12345")]).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(&format!("<collection xmlns=\"{MARCXML_NS}\">")));
        assert!(xml.contains("<controlfield tag=\"001\">12345</controlfield>"));
        assert!(xml.contains("<datafield tag=\"245\" ind1=\"1\" ind2=\"0\">"));
        assert!(xml.contains("<subfield code=\"a\">Test title</subfield>"));
        assert!(xml.contains("<leader>"));
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let mut record = sample_record("rt1");
        let mut extra = Field::new("700", '1', ' ');
        extra.add_subfield('a', "Added entry");
        record.add_field(extra);
        let mut variant_title = Field::new("245", '0', '0');
        variant_title.add_subfield('a', "Variant");
        record.add_field(variant_title);

        let xml = records_to_marcxml(&[record.clone()]).unwrap();
        let restored = marcxml_to_records(&xml).unwrap();

        assert_eq!(restored.len(), 1);
        let tags: Vec<&str> = restored[0].fields.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["245", "700", "245"]);
        assert_eq!(restored[0].control_number(), Some("rt1"));
    }

    #[test]
    fn test_parse_prefixed_namespace() {
        let xml = r#"<marc:collection xmlns:marc="http://www.loc.gov/MARC21/slim">
            <marc:record>
                <marc:leader>00123nam a2200049 a 4500</marc:leader>
                <marc:controlfield tag="001">pfx1</marc:controlfield>
                <marc:datafield tag="245" ind1="1" ind2="0">
                    <marc:subfield code="a">Prefixed title</marc:subfield>
                </marc:datafield>
            </marc:record>
        </marc:collection>"#;

        let records = marcxml_to_records(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].control_number(), Some("pfx1"));
        assert_eq!(
            records[0].first_field("245").unwrap().subfield('a'),
            Some("Prefixed title")
        );
    }

    #[test]
    fn test_multiple_records_in_document_order() {
        let xml = records_to_marcxml(&[sample_record("a"), sample_record("b")]).unwrap();
        let restored = marcxml_to_records(&xml).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored[0].control_number(), Some("a"));
        assert_eq!(restored[1].control_number(), Some("b"));
    }

    #[test]
    fn test_empty_collection() {
        let xml = records_to_marcxml(&[]).unwrap();
        let restored = marcxml_to_records(&xml).unwrap();
        assert!(restored.is_empty());
    }
}
