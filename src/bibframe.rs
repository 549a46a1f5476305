//! BIBFRAME RDF output: the packaged XML-to-RDF structural transform.
//!
//! The rdf output format is produced in two stages. The emitter first
//! renders the cleaned record collection as a MARCXML document in memory;
//! [`marcxml_to_bibframe`] then consumes that document — not the record
//! collection — parses it back into records, maps each one onto BIBFRAME
//! 2.0 Work/Instance entities, and serializes the merged graph as
//! pretty-printed RDF/XML.
//!
//! The vocabulary coverage is the common core: Work/Instance typing and
//! linking, titles (245), contributions (100/110/700/710), topical and
//! geographic subjects (650/651), the record language, and ISBNs (020).

use crate::error::{CleanError, Result};
use crate::marcxml;
use crate::record::{Field, Record};
use oxrdf::{BlankNode, Literal, NamedNode, NamedOrBlankNode, Term, Triple};
use oxrdfio::{RdfFormat, RdfSerializer};
use quick_xml::events::Event;
use std::io::Write;

/// BIBFRAME 2.0 namespace URI.
pub const BF: &str = "http://id.loc.gov/ontologies/bibframe/";
/// RDF namespace URI.
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDF Schema namespace URI.
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// LOC languages vocabulary namespace URI.
pub const LANGUAGES: &str = "http://id.loc.gov/vocabulary/languages/";

/// Default base for minted Work/Instance URIs.
const DEFAULT_BASE_URI: &str = "http://example.org/";

/// An RDF node: IRI, blank node, or literal.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RdfNode {
    Uri(String),
    Blank(String),
    Literal(String),
}

impl RdfNode {
    fn bf(local: &str) -> Self {
        RdfNode::Uri(format!("{BF}{local}"))
    }
}

/// A single (subject, predicate, object) statement.
#[derive(Debug, Clone)]
struct RdfStatement {
    subject: RdfNode,
    predicate: String,
    object: RdfNode,
}

/// An RDF graph accumulating the statements for the whole collection.
#[derive(Debug, Default)]
struct RdfGraph {
    statements: Vec<RdfStatement>,
    blank_counter: usize,
}

impl RdfGraph {
    fn add(&mut self, subject: RdfNode, predicate: impl Into<String>, object: RdfNode) {
        self.statements.push(RdfStatement {
            subject,
            predicate: predicate.into(),
            object,
        });
    }

    fn new_blank(&mut self) -> RdfNode {
        self.blank_counter += 1;
        RdfNode::Blank(format!("b{}", self.blank_counter))
    }

    /// Serialize the graph as RDF/XML.
    fn serialize_rdfxml<W: Write>(&self, writer: W) -> Result<()> {
        let mut serializer = RdfSerializer::from_format(RdfFormat::RdfXml).for_writer(writer);
        for statement in &self.statements {
            let triple = to_oxrdf_triple(statement)?;
            serializer
                .serialize_triple(&triple)
                .map_err(|e| CleanError::InvalidRecord(format!("RDF serialization failed: {e}")))?;
        }
        serializer
            .finish()
            .map_err(|e| CleanError::InvalidRecord(format!("RDF serialization failed: {e}")))?;
        Ok(())
    }
}

fn to_oxrdf_triple(statement: &RdfStatement) -> Result<Triple> {
    let bad_uri = |e| CleanError::InvalidRecord(format!("Invalid RDF term: {e}"));

    let subject = match &statement.subject {
        RdfNode::Uri(uri) => NamedOrBlankNode::NamedNode(NamedNode::new(uri).map_err(bad_uri)?),
        RdfNode::Blank(id) => NamedOrBlankNode::BlankNode(
            BlankNode::new(id.clone())
                .map_err(|e| CleanError::InvalidRecord(format!("Invalid blank node: {e}")))?,
        ),
        RdfNode::Literal(_) => {
            return Err(CleanError::InvalidRecord(
                "Literals cannot be triple subjects".to_string(),
            ));
        },
    };

    let predicate = NamedNode::new(&statement.predicate).map_err(bad_uri)?;

    let object = match &statement.object {
        RdfNode::Uri(uri) => Term::NamedNode(NamedNode::new(uri).map_err(bad_uri)?),
        RdfNode::Blank(id) => Term::BlankNode(
            BlankNode::new(id.clone())
                .map_err(|e| CleanError::InvalidRecord(format!("Invalid blank node: {e}")))?,
        ),
        RdfNode::Literal(value) => Term::Literal(Literal::new_simple_literal(value)),
    };

    Ok(Triple::new(subject, predicate, object))
}

/// Transform an in-memory MARCXML collection document into pretty-printed
/// BIBFRAME RDF/XML.
///
/// # Errors
///
/// Returns an error if the XML cannot be parsed as MARCXML or the graph
/// cannot be serialized.
pub fn marcxml_to_bibframe(xml: &str) -> Result<String> {
    let records = marcxml::marcxml_to_records(xml)?;

    let mut graph = RdfGraph::default();
    for (index, record) in records.iter().enumerate() {
        convert_record(record, index, &mut graph);
    }

    let mut buffer = Vec::new();
    graph.serialize_rdfxml(&mut buffer)?;
    let raw = String::from_utf8(buffer)
        .map_err(|e| CleanError::InvalidRecord(format!("RDF output was not UTF-8: {e}")))?;

    pretty_print(&raw)
}

/// Map one record onto BIBFRAME Work/Instance entities.
fn convert_record(record: &Record, index: usize, graph: &mut RdfGraph) {
    let key = record
        .control_number()
        .map_or_else(|| format!("rec{index}"), |id| id.trim().to_string());
    let work = RdfNode::Uri(format!("{DEFAULT_BASE_URI}work/{key}"));
    let instance = RdfNode::Uri(format!("{DEFAULT_BASE_URI}instance/{key}"));

    let rdf_type = format!("{RDF_NS}type");
    graph.add(work.clone(), rdf_type.clone(), RdfNode::bf("Work"));
    graph.add(instance.clone(), rdf_type.clone(), RdfNode::bf("Instance"));
    graph.add(
        instance.clone(),
        format!("{BF}instanceOf"),
        work.clone(),
    );
    graph.add(work.clone(), format!("{BF}hasInstance"), instance.clone());

    if record.leader.record_type == 'a' {
        graph.add(work.clone(), rdf_type.clone(), RdfNode::bf("Text"));
    }

    if let Some(field) = record.first_field("245") {
        add_title(field, &instance, graph);
    }

    for tag in ["100", "110"] {
        for field in record.fields_by_tag(tag) {
            add_contribution(field, &work, true, graph);
        }
    }
    for tag in ["700", "710"] {
        for field in record.fields_by_tag(tag) {
            add_contribution(field, &work, false, graph);
        }
    }

    for field in record.fields_by_tag("650") {
        add_subject(field, &work, "Topic", graph);
    }
    for field in record.fields_by_tag("651") {
        add_subject(field, &work, "Place", graph);
    }

    if let Some(language) = record_language(record) {
        graph.add(
            work.clone(),
            format!("{BF}language"),
            RdfNode::Uri(format!("{LANGUAGES}{language}")),
        );
    }

    for field in record.fields_by_tag("020") {
        if let Some(isbn) = field.subfield('a') {
            let node = graph.new_blank();
            graph.add(instance.clone(), format!("{BF}identifiedBy"), node.clone());
            graph.add(node.clone(), rdf_type.clone(), RdfNode::bf("Isbn"));
            graph.add(
                node,
                format!("{RDF_NS}value"),
                RdfNode::Literal(isbn.to_string()),
            );
        }
    }
}

fn add_title(field: &Field, instance: &RdfNode, graph: &mut RdfGraph) {
    let title = graph.new_blank();
    graph.add(instance.clone(), format!("{BF}title"), title.clone());
    graph.add(
        title.clone(),
        format!("{RDF_NS}type"),
        RdfNode::bf("Title"),
    );
    if let Some(main) = field.subfield('a') {
        graph.add(
            title.clone(),
            format!("{BF}mainTitle"),
            RdfNode::Literal(trim_title_punctuation(main)),
        );
    }
    if let Some(subtitle) = field.subfield('b') {
        graph.add(
            title,
            format!("{BF}subtitle"),
            RdfNode::Literal(trim_title_punctuation(subtitle)),
        );
    }
}

fn add_contribution(field: &Field, work: &RdfNode, primary: bool, graph: &mut RdfGraph) {
    let Some(name) = field.subfield('a') else {
        return;
    };
    let contribution = graph.new_blank();
    let class = if primary {
        "PrimaryContribution"
    } else {
        "Contribution"
    };
    graph.add(
        work.clone(),
        format!("{BF}contribution"),
        contribution.clone(),
    );
    graph.add(
        contribution.clone(),
        format!("{RDF_NS}type"),
        RdfNode::bf(class),
    );

    let agent = graph.new_blank();
    graph.add(contribution, format!("{BF}agent"), agent.clone());
    graph.add(
        agent,
        format!("{RDFS}label"),
        RdfNode::Literal(name.trim_end_matches([',', ' ']).to_string()),
    );
}

fn add_subject(field: &Field, work: &RdfNode, class: &str, graph: &mut RdfGraph) {
    let Some(heading) = field.subfield('a') else {
        return;
    };
    let subject = graph.new_blank();
    graph.add(work.clone(), format!("{BF}subject"), subject.clone());
    graph.add(
        subject.clone(),
        format!("{RDF_NS}type"),
        RdfNode::bf(class),
    );
    graph.add(
        subject,
        format!("{RDFS}label"),
        RdfNode::Literal(heading.trim_end_matches('.').to_string()),
    );
}

/// The record language from 041$a, falling back to 008/35-37.
fn record_language(record: &Record) -> Option<String> {
    if let Some(code) = record
        .first_field("041")
        .and_then(|f| f.subfield('a'))
        .filter(|c| !c.is_empty())
    {
        return Some(code.to_string());
    }
    record
        .control_field("008")
        .and_then(|fixed| fixed.get(35..38))
        .map(str::trim)
        .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .map(str::to_string)
}

/// ISBD punctuation has no place in RDF literals.
fn trim_title_punctuation(text: &str) -> String {
    text.trim_end_matches([' ', '/', ':', ';']).to_string()
}

/// Re-indent an XML document for human consumption.
fn pretty_print(xml: &str) -> Result<String> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.trim_text(true);
    let mut writer = quick_xml::Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| CleanError::InvalidRecord(format!("XML pretty-print failed: {e}")))?,
            Err(e) => {
                return Err(CleanError::InvalidRecord(format!(
                    "XML pretty-print failed: {e}"
                )));
            },
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| CleanError::InvalidRecord(format!("XML output was not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leader::Leader;
    use crate::marcxml::records_to_marcxml;

    fn sample_record() -> Record {
        let mut record = Record::new(Leader::default());
        record.add_control_field("001", "bf123");
        record.add_control_field("008", "920219s1990    mau           001 0 rus  ");
        let mut title = Field::new("245", '1', '0');
        title.add_subfield('a', "Sobranie sochinenii /");
        record.add_field(title);
        let mut author = Field::new("100", '1', ' ');
        author.add_subfield('a', "Pushkin, Aleksandr,");
        record.add_field(author);
        let mut subject = Field::new("650", ' ', '0');
        subject.add_subfield('a', "Russian literature.");
        record.add_field(subject);
        let mut isbn = Field::new("020", ' ', ' ');
        isbn.add_subfield('a', "0262031418");
        record.add_field(isbn);
        record
    }

    #[test]
    fn test_transform_produces_bibframe_entities() {
        let xml = records_to_marcxml(&[sample_record()]).unwrap();
        let rdf = marcxml_to_bibframe(&xml).unwrap();

        assert!(rdf.contains("http://example.org/work/bf123"));
        assert!(rdf.contains("http://example.org/instance/bf123"));
        assert!(rdf.contains("Sobranie sochinenii"));
        assert!(rdf.contains("Pushkin, Aleksandr"));
        assert!(rdf.contains("Russian literature"));
        assert!(rdf.contains(&format!("{LANGUAGES}rus")));
        assert!(rdf.contains("0262031418"));
        // ISBD terminal punctuation stripped from the literal.
        assert!(!rdf.contains("Sobranie sochinenii /"));
    }

    #[test]
    fn test_output_is_well_formed_xml() {
        let xml = records_to_marcxml(&[sample_record()]).unwrap();
        let rdf = marcxml_to_bibframe(&xml).unwrap();

        let mut reader = quick_xml::Reader::from_str(&rdf);
        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(_) => {},
                Err(e) => panic!("output is not well-formed XML: {e}"),
            }
        }
    }

    #[test]
    fn test_records_without_001_get_positional_uris() {
        let mut record = sample_record();
        record.control_fields.retain(|(tag, _)| tag != "001");

        let xml = records_to_marcxml(&[record]).unwrap();
        let rdf = marcxml_to_bibframe(&xml).unwrap();
        assert!(rdf.contains("http://example.org/work/rec0"));
    }

    #[test]
    fn test_transform_consumes_raw_marcxml() {
        // The transform input is the XML document itself, so hand-written
        // MARCXML works without going through this crate's serializer.
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <collection xmlns="http://www.loc.gov/MARC21/slim">
            <record>
                <leader>00123nam a2200049 a 4500</leader>
                <controlfield tag="001">handmade</controlfield>
                <datafield tag="245" ind1="0" ind2="0">
                    <subfield code="a">A handmade title</subfield>
                </datafield>
            </record>
        </collection>"#;

        let rdf = marcxml_to_bibframe(xml).unwrap();
        assert!(rdf.contains("http://example.org/work/handmade"));
        assert!(rdf.contains("A handmade title"));
    }
}
