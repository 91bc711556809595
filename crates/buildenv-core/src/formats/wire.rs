//! # Wire Conversions
//!
//! Maps the document model onto `bson` values and back. Store drivers and
//! the extended-JSON codec both go through these conversions so that a
//! document has exactly one wire representation.

use crate::{BuildEnvError, Document, Value};
use bson::Bson;

impl From<Value> for Bson {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Int(i) => Self::Int64(i),
            Value::Float(f) => Self::Double(f),
            Value::String(s) => Self::String(s),
            Value::ObjectId(oid) => Self::ObjectId(oid),
            Value::DateTime(dt) => Self::DateTime(dt),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Document(doc) => Self::Document(bson::Document::from(doc)),
        }
    }
}

impl From<Document> for bson::Document {
    fn from(doc: Document) -> Self {
        doc.into_iter().map(|(k, v)| (k, Bson::from(v))).collect()
    }
}

impl TryFrom<Bson> for Value {
    type Error = BuildEnvError;

    fn try_from(bson: Bson) -> Result<Self, Self::Error> {
        let value = match bson {
            Bson::Null | Bson::Undefined => Self::Null,
            Bson::Boolean(b) => Self::Bool(b),
            Bson::Int32(i) => Self::Int(i64::from(i)),
            Bson::Int64(i) => Self::Int(i),
            Bson::Double(f) => Self::Float(f),
            Bson::String(s) => Self::String(s),
            Bson::ObjectId(oid) => Self::ObjectId(oid),
            Bson::DateTime(dt) => Self::DateTime(dt),
            Bson::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Bson::Document(doc) => Self::Document(Document::try_from(doc)?),
            other => {
                return Err(BuildEnvError::UnsupportedType(format!(
                    "{:?}",
                    other.element_type()
                )));
            }
        };
        Ok(value)
    }
}

impl TryFrom<bson::Document> for Document {
    type Error = BuildEnvError;

    fn try_from(doc: bson::Document) -> Result<Self, Self::Error> {
        let mut out = Self::new();
        for (key, value) in doc {
            out.insert(key, Value::try_from(value)?);
        }
        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================
