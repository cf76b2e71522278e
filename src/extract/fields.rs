//! Field extraction from a classified traffic-jam triple set.
//!
//! Predicate-suffix dispatch (splitting on `#` and `^^`) is the historical
//! contract with the CityPulse annotators, not proper IRI/literal parsing.
//! The splitting lives in two small helpers so the fragile part stays in one
//! place.

use crate::core::{TrafficEvent, Triple};

/// Returns the substring after the last `#` of an IRI, or the whole string
/// when no fragment separator is present.
pub fn fragment(iri: &str) -> &str {
    match iri.rfind('#') {
        Some(index) => &iri[index + 1..],
        None => iri,
    }
}

/// Returns the quoted lexical value of a literal in data-bus text form,
/// dropping any `^^datatype` suffix. `None` when the object carries no
/// quoted value (an IRI or blank node).
pub fn literal_value(object: &str) -> Option<&str> {
    let lexical = match object.find("^^") {
        Some(index) => &object[..index],
        None => object,
    };
    let start = lexical.find('"')? + 1;
    let end = lexical[start..].find('"')? + start;
    Some(&lexical[start..end])
}

/// Derives a [`TrafficEvent`] from a finalized triple sequence in a single
/// linear pass.
///
/// The event identity comes from the fragment of the marker triple's
/// subject; every attribute is resolved by exact match on its predicate
/// fragment, in any order. Absent attributes and unparseable numeric
/// literals leave the field unset. Returns `None` when no triple's object
/// equals the marker IRI.
pub fn extract_event(triples: &[Triple], marker_iri: &str) -> Option<TrafficEvent> {
    let mut event_id = None;
    let mut level = None;
    let mut latitude = None;
    let mut longitude = None;
    let mut datetime = None;

    for triple in triples {
        if triple.object == marker_iri {
            event_id = Some(fragment(&triple.subject).to_string());
        } else {
            match fragment(&triple.predicate) {
                "hasLevel" => level = literal_value(&triple.object).map(str::to_string),
                "lat" => {
                    latitude =
                        literal_value(&triple.object).and_then(|value| value.parse::<f64>().ok());
                }
                "lon" => {
                    longitude =
                        literal_value(&triple.object).and_then(|value| value.parse::<f64>().ok());
                }
                "time" => datetime = literal_value(&triple.object).map(str::to_string),
                _ => {}
            }
        }
    }

    let event_id = event_id?;
    let mut event = TrafficEvent::new(&event_id);
    event.level = level;
    event.latitude = latitude;
    event.longitude = longitude;
    event.datetime = datetime;
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TRAFFIC_EVENTS_SOURCE;

    const SUBJECT: &str = "http://purl.oclc.org/NET/UNIS/sao/sao#cc5fe3f9";

    fn traffic_jam_triples() -> Vec<Triple> {
        vec![
            Triple::new(
                SUBJECT,
                "http://www.w3.org/1999/02/22-rdf-syntax-ns#type",
                TRAFFIC_EVENTS_SOURCE,
                "",
            ),
            Triple::new(
                SUBJECT,
                "http://purl.oclc.org/NET/UNIS/sao/sao#hasLevel",
                "\"2\"^^http://www.w3.org/2001/XMLSchema#long",
                "",
            ),
            Triple::new(
                "_:b0",
                "http://www.w3.org/2003/01/geo/wgs84_pos#lat",
                "\"56.11\"^^http://www.w3.org/2001/XMLSchema#double",
                "",
            ),
            Triple::new(
                "_:b0",
                "http://www.w3.org/2003/01/geo/wgs84_pos#lon",
                "\"10.18\"^^http://www.w3.org/2001/XMLSchema#double",
                "",
            ),
            Triple::new(
                SUBJECT,
                "http://purl.org/NET/c4dm/timeline.owl#time",
                "\"2016-10-11T11:13:21.000Z\"^^http://www.w3.org/2001/XMLSchema#dateTime",
                "",
            ),
        ]
    }

    #[test]
    fn test_fragment() {
        assert_eq!(fragment(SUBJECT), "cc5fe3f9");
        assert_eq!(fragment("http://example.org/no-fragment"), "http://example.org/no-fragment");
        assert_eq!(fragment("http://example.org/a#b#c"), "c");
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(
            literal_value("\"2\"^^http://www.w3.org/2001/XMLSchema#long"),
            Some("2")
        );
        assert_eq!(literal_value("\"USER_testuser\""), Some("USER_testuser"));
        assert_eq!(literal_value("http://example.org/iri-object"), None);
        assert_eq!(literal_value("_:b0"), None);
    }

    #[test]
    fn test_full_extraction() {
        let event = extract_event(&traffic_jam_triples(), TRAFFIC_EVENTS_SOURCE).unwrap();
        assert_eq!(event.event_id, "cc5fe3f9");
        assert_eq!(event.event_type, "TrafficJam");
        assert_eq!(event.level.as_deref(), Some("2"));
        assert_eq!(event.latitude, Some(56.11));
        assert_eq!(event.longitude, Some(10.18));
        assert_eq!(event.datetime.as_deref(), Some("2016-10-11T11:13:21.000Z"));
    }

    #[test]
    fn test_extraction_is_order_independent() {
        let mut triples = traffic_jam_triples();
        triples.reverse();
        let event = extract_event(&triples, TRAFFIC_EVENTS_SOURCE).unwrap();
        assert_eq!(event.event_id, "cc5fe3f9");
        assert_eq!(event.latitude, Some(56.11));
        assert_eq!(event.longitude, Some(10.18));
    }

    #[test]
    fn test_missing_attribute_stays_unset() {
        let triples: Vec<Triple> = traffic_jam_triples()
            .into_iter()
            .filter(|t| fragment(&t.predicate) != "hasLevel")
            .collect();
        let event = extract_event(&triples, TRAFFIC_EVENTS_SOURCE).unwrap();
        assert_eq!(event.level, None);
        assert_eq!(event.latitude, Some(56.11));
        assert_eq!(event.datetime.as_deref(), Some("2016-10-11T11:13:21.000Z"));
    }

    #[test]
    fn test_no_marker_yields_no_event() {
        let triples: Vec<Triple> = traffic_jam_triples()
            .into_iter()
            .filter(|t| t.object != TRAFFIC_EVENTS_SOURCE)
            .collect();
        assert_eq!(extract_event(&triples, TRAFFIC_EVENTS_SOURCE), None);
    }

    #[test]
    fn test_unparseable_coordinate_degrades_to_unset() {
        let mut triples = traffic_jam_triples();
        triples[2].object = "\"not-a-number\"^^http://www.w3.org/2001/XMLSchema#double".to_string();
        let event = extract_event(&triples, TRAFFIC_EVENTS_SOURCE).unwrap();
        assert_eq!(event.latitude, None);
        assert_eq!(event.longitude, Some(10.18));
    }

    #[test]
    fn test_unrelated_predicates_are_ignored() {
        let mut triples = traffic_jam_triples();
        triples.push(Triple::new(
            SUBJECT,
            "http://purl.oclc.org/NET/UNIS/sao/ec#hasSource",
            "\"USER_testuser\"",
            "",
        ));
        let event = extract_event(&triples, TRAFFIC_EVENTS_SOURCE).unwrap();
        assert_eq!(event.level.as_deref(), Some("2"));
    }
}
