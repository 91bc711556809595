//! # Core Type Definitions
//!
//! This module contains the core types for buildenv documents:
//! - Document values (`Value`) and documents (`Document`)
//! - Reserved keys (`ID_KEY`, `SCHEMA_VERSION_KEY`)
//! - Error types (`BuildEnvError`)
//!
//! ## Determinism Guarantees
//!
//! Documents use `BTreeMap` so that key order, and therefore every encoded
//! form of a document, is stable across runs.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use bson::DateTime;
pub use bson::oid::ObjectId;

// =============================================================================
// RESERVED KEYS
// =============================================================================

/// Primary key of a persisted document.
///
/// The store treats this field as immutable once a row exists.
pub const ID_KEY: &str = "_id";

/// Schema version of a persisted document. Always an integer >= 1 after
/// normalization.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

// =============================================================================
// VALUE
// =============================================================================

/// A single value inside a document.
///
/// Covers the JSON scalar types plus the two database-specific scalars the
/// extended-JSON codec must carry losslessly: object identifiers and dates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer. 32-bit store integers are widened on read.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// 12-byte globally unique identifier.
    ObjectId(ObjectId),
    /// UTC timestamp with millisecond precision.
    DateTime(DateTime),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Nested mapping.
    Document(Document),
}

impl Value {
    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::ObjectId(_) => "objectId",
            Self::DateTime(_) => "date",
            Self::Array(_) => "array",
            Self::Document(_) => "document",
        }
    }

    /// Get the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is one.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as an object identifier, if it is one.
    #[must_use]
    pub const fn as_object_id(&self) -> Option<ObjectId> {
        match self {
            Self::ObjectId(oid) => Some(*oid),
            _ => None,
        }
    }

    /// Get the value as a nested document, if it is one.
    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    /// Values above `i64::MAX` saturate; the store has no unsigned type.
    fn from(u: u64) -> Self {
        Self::Int(i64::try_from(u).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Value {
    fn from(u: usize) -> Self {
        Self::from(u as u64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<ObjectId> for Value {
    fn from(oid: ObjectId) -> Self {
        Self::ObjectId(oid)
    }
}

impl From<DateTime> for Value {
    fn from(dt: DateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

// =============================================================================
// DOCUMENT
// =============================================================================

/// A single key-value record to be persisted.
///
/// Key order carries no meaning; `BTreeMap` keeps it deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    /// Create a new empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Check if the document has a key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the document has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `_id` field, if present and already an object identifier.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        self.get(ID_KEY).and_then(Value::as_object_id)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while normalizing or persisting documents.
///
/// Nothing in the core catches these and downgrades them to a log line;
/// the caller decides whether to abort or continue.
#[derive(Debug, Error)]
pub enum BuildEnvError {
    /// `_id` was a string that is not a 24-character hex identifier.
    #[error("Malformed identifier '{value}': {reason}")]
    MalformedIdentifier {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// `schema_version` was a string that is not an integer >= 1.
    #[error("Malformed schema version '{0}'")]
    MalformedSchemaVersion(String),

    /// Insert collided with an existing row.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Replace found no row with the given key.
    #[error("Document not found: no row with _id {0}")]
    DocumentNotFound(String),

    /// Replace was asked to write a document without `_id`.
    #[error("Document has no _id to replace by")]
    MissingIdentifier,

    /// The store could not be reached or the connection broke.
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// Any other store-side failure.
    #[error("Store error: {0}")]
    Store(String),

    /// Input could not be decoded into a document.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A store value has no representation in the document model.
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::ObjectId(oid) => write!(f, "ObjectId(\"{}\")", oid.to_hex()),
            Self::DateTime(dt) => write!(f, "Date({})", dt.timestamp_millis()),
            Self::Array(items) => write!(f, "[{} items]", items.len()),
            Self::Document(doc) => write!(f, "{{{} keys}}", doc.len()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
