//! # Extended JSON Codec
//!
//! Reads and writes documents as extended JSON text. Identifiers and dates
//! use the codec's wrapper objects (`{"$oid": ...}`, `{"$date": ...}`), so a
//! file written here reads back into an identical document.
//!
//! Parsing accepts both canonical and relaxed wrappers. Writing emits
//! relaxed extended JSON.

use crate::{BuildEnvError, Document};
use bson::Bson;
use serde::Serialize;

/// Indentation used by pretty output.
const PRETTY_INDENT: &[u8] = b"    ";

/// Decode one extended-JSON object into a document.
///
/// Returns `InvalidDocument` if the text is not JSON or the top level is not
/// an object.
pub fn document_from_extjson(text: &str) -> Result<Document, BuildEnvError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| BuildEnvError::InvalidDocument(e.to_string()))?;

    if !json.is_object() {
        return Err(BuildEnvError::InvalidDocument(
            "top-level value must be a JSON object".to_string(),
        ));
    }

    let bson = Bson::try_from(json).map_err(|e| BuildEnvError::InvalidDocument(e.to_string()))?;
    match bson {
        Bson::Document(doc) => Document::try_from(doc),
        // An object carrying a single `$oid`/`$date` key decodes to a scalar.
        other => Err(BuildEnvError::InvalidDocument(format!(
            "top-level object decodes to {:?}, not a document",
            other.element_type()
        ))),
    }
}

/// Encode a document as relaxed extended JSON.
///
/// With `pretty`, output is indented by four spaces per level.
pub fn document_to_extjson(doc: &Document, pretty: bool) -> Result<String, BuildEnvError> {
    let json = Bson::Document(bson::Document::from(doc.clone())).into_relaxed_extjson();

    if !pretty {
        return serde_json::to_string(&json)
            .map_err(|e| BuildEnvError::InvalidDocument(e.to_string()));
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(PRETTY_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    json.serialize(&mut ser)
        .map_err(|e| BuildEnvError::InvalidDocument(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| BuildEnvError::InvalidDocument(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateTime, ObjectId, Value};

    #[test]
    fn identifier_and_date_round_trip() {
        let mut doc = Document::new();
        doc.insert("_id", ObjectId::new());
        doc.insert("date", DateTime::from_millis(1_700_000_000_456));

        let text = document_to_extjson(&doc, false).expect("encode");
        let back = document_from_extjson(&text).expect("decode");

        assert_eq!(back, doc);
    }

    #[test]
    fn identifier_is_wrapped_not_bare() {
        let oid = ObjectId::parse_str("631dc81d12277d809b0dac77").expect("oid");
        let doc: Document = [("_id", oid)].into_iter().collect();

        let text = document_to_extjson(&doc, false).expect("encode");
        assert_eq!(text, r#"{"_id":{"$oid":"631dc81d12277d809b0dac77"}}"#);
    }

    #[test]
    fn plain_json_string_id_stays_a_string() {
        let doc = document_from_extjson(r#"{"_id": "631dc81d12277d809b0dac77", "n": 3}"#)
            .expect("decode");

        assert_eq!(
            doc.get("_id"),
            Some(&Value::String("631dc81d12277d809b0dac77".to_string()))
        );
        assert_eq!(doc.get("n"), Some(&Value::Int(3)));
    }

    #[test]
    fn canonical_number_long_is_accepted() {
        let doc = document_from_extjson(r#"{"big": {"$numberLong": "9007199254740993"}}"#)
            .expect("decode");
        assert_eq!(doc.get("big"), Some(&Value::Int(9_007_199_254_740_993)));
    }

    #[test]
    fn pretty_output_uses_four_spaces() {
        let doc: Document = [("data", "tests")].into_iter().collect();

        let text = document_to_extjson(&doc, true).expect("encode");
        assert_eq!(text, "{\n    \"data\": \"tests\"\n}");
    }

    #[test]
    fn non_object_is_rejected() {
        let result = document_from_extjson("[1, 2, 3]");
        assert!(matches!(result, Err(BuildEnvError::InvalidDocument(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let result = document_from_extjson("{not json");
        assert!(matches!(result, Err(BuildEnvError::InvalidDocument(_))));
    }
}
