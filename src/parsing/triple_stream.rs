//! Per-message triple stream over the Oxigraph Turtle parser.
//!
//! Every broker message carries one serialized RDF document (Turtle or
//! N-Triples). The parser for it runs on a blocking task and yields triples
//! one at a time over a channel, terminated by an [`ParserEvent::End`]
//! sentinel that optionally carries the parse error. One stream is created
//! per message and never shared; no triple is valid after an error signal.

use crate::core::Triple;
use oxrdf::{GraphName, Literal, Quad, Subject, Term};
use oxrdf::vocab::xsd;
use oxrdfio::{RdfFormat, RdfParser};
use tokio::sync::mpsc;

/// One event on a per-message triple stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserEvent {
    /// The next triple of the message, in delivery order.
    Triple(Triple),
    /// End of stream. `error` is set when parsing aborted; the triples
    /// delivered before it must then be discarded by the receiver.
    End { error: Option<String> },
}

/// Spawns a parser task for one raw message payload and returns the
/// receiving end of its triple stream.
pub fn spawn_parser(payload: String) -> mpsc::UnboundedReceiver<ParserEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || {
        let parser = RdfParser::from_format(RdfFormat::Turtle);
        let mut error = None;

        for quad in parser.for_reader(payload.as_bytes()) {
            match quad {
                Ok(quad) => {
                    // Receiver gone: the message was abandoned, stop parsing.
                    if tx.send(ParserEvent::Triple(quad_to_triple(&quad))).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error = Some(e.to_string());
                    break;
                }
            }
        }

        let _ = tx.send(ParserEvent::End { error });
    });

    rx
}

/// Converts a typed quad into the text form the data bus has historically
/// used: bare IRIs, `_:id` blank nodes, quoted literal values with a bare
/// `^^datatype` suffix. Downstream suffix matching depends on this exact
/// shape, so the whole mapping lives here.
pub fn quad_to_triple(quad: &Quad) -> Triple {
    Triple {
        subject: subject_text(&quad.subject),
        predicate: quad.predicate.as_str().to_string(),
        object: term_text(&quad.object),
        graph: graph_text(&quad.graph_name),
    }
}

fn subject_text(subject: &Subject) -> String {
    match subject {
        Subject::NamedNode(n) => n.as_str().to_string(),
        Subject::BlankNode(b) => format!("_:{}", b.as_str()),
    }
}

fn term_text(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::BlankNode(b) => format!("_:{}", b.as_str()),
        Term::Literal(l) => literal_text(l),
    }
}

fn literal_text(literal: &Literal) -> String {
    if let Some(language) = literal.language() {
        return format!("\"{}\"@{}", literal.value(), language);
    }
    let datatype = literal.datatype();
    if datatype == xsd::STRING {
        format!("\"{}\"", literal.value())
    } else {
        format!("\"{}\"^^{}", literal.value(), datatype.as_str())
    }
}

fn graph_text(graph: &GraphName) -> String {
    match graph {
        GraphName::NamedNode(n) => n.as_str().to_string(),
        GraphName::BlankNode(b) => format!("_:{}", b.as_str()),
        GraphName::DefaultGraph => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, NamedNode};

    fn named(iri: &str) -> NamedNode {
        NamedNode::new(iri).unwrap()
    }

    #[test]
    fn test_typed_literal_text() {
        let literal = Literal::new_typed_literal("2", named("http://www.w3.org/2001/XMLSchema#long"));
        assert_eq!(
            literal_text(&literal),
            "\"2\"^^http://www.w3.org/2001/XMLSchema#long"
        );
    }

    #[test]
    fn test_plain_literal_text() {
        let literal = Literal::new_simple_literal("USER_testuser");
        assert_eq!(literal_text(&literal), "\"USER_testuser\"");
    }

    #[test]
    fn test_language_literal_text() {
        let literal = Literal::new_language_tagged_literal("kø", "da").unwrap();
        assert_eq!(literal_text(&literal), "\"kø\"@da");
    }

    #[test]
    fn test_quad_to_triple_blank_node_subject() {
        let quad = Quad::new(
            BlankNode::new("b0").unwrap(),
            named("http://www.w3.org/2003/01/geo/wgs84_pos#lat"),
            Literal::new_typed_literal("56.11", named("http://www.w3.org/2001/XMLSchema#double")),
            GraphName::DefaultGraph,
        );
        let triple = quad_to_triple(&quad);
        assert_eq!(triple.subject, "_:b0");
        assert_eq!(triple.predicate, "http://www.w3.org/2003/01/geo/wgs84_pos#lat");
        assert_eq!(triple.object, "\"56.11\"^^http://www.w3.org/2001/XMLSchema#double");
        assert_eq!(triple.graph, "");
    }

    #[tokio::test]
    async fn test_stream_yields_triples_then_end() {
        let payload = concat!(
            "<http://example.org/s> <http://example.org/p> <http://example.org/o> .\n",
            "<http://example.org/s> <http://example.org/q> \"v\" .\n",
        )
        .to_string();

        let mut rx = spawn_parser(payload);
        let mut triples = Vec::new();
        let mut end_error = Some("not yet completed".to_string());

        while let Some(event) = rx.recv().await {
            match event {
                ParserEvent::Triple(triple) => triples.push(triple),
                ParserEvent::End { error } => {
                    end_error = error;
                    break;
                }
            }
        }

        assert_eq!(end_error, None);
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].subject, "http://example.org/s");
        assert_eq!(triples[1].object, "\"v\"");
    }

    #[tokio::test]
    async fn test_stream_reports_parse_error() {
        let mut rx = spawn_parser("this is not turtle <".to_string());
        let mut saw_error = false;

        while let Some(event) = rx.recv().await {
            if let ParserEvent::End { error } = event {
                saw_error = error.is_some();
                break;
            }
        }

        assert!(saw_error);
    }
}
