//! # Upsert Module
//!
//! Commits a normalized document to a collection using the caller's mode.
//!
//! - `Insert`: create-only, the document keeps its `_id`
//! - `Replace`: `_id` is taken out of the payload and used as the match key
//!
//! The two modes are never conflated: an insert that collides is not
//! retried as a replace, and a replace that misses does not create a row.
//! Exactly one write is attempted per call.

use crate::normalize::normalize;
use crate::store::DocumentStore;
use crate::{BuildEnvError, Document, ID_KEY, ObjectId, Value};
use std::fmt;
use std::str::FromStr;

/// How a document is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Create a new row. Fails if the key exists.
    #[default]
    Insert,
    /// Overwrite the row identified by `_id`. Fails if no row matches.
    Replace,
}

impl WriteMode {
    /// Map a "replace instead of insert" flag to a mode.
    #[must_use]
    pub const fn from_replacement(is_replacement: bool) -> Self {
        if is_replacement {
            Self::Replace
        } else {
            Self::Insert
        }
    }

    /// Lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = BuildEnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "insert" => Ok(Self::Insert),
            "replace" => Ok(Self::Replace),
            other => Err(BuildEnvError::InvalidDocument(format!(
                "Unknown write mode: {}. Use: insert, replace",
                other
            ))),
        }
    }
}

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Mode that was applied.
    pub mode: WriteMode,
    /// Key of the written row.
    pub id: Value,
}

impl WriteOutcome {
    /// The written key as an object identifier, if it is one.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        self.id.as_object_id()
    }
}

/// Write an already normalized document.
///
/// `_id` is not re-validated. A string `_id` reaching replace mode is used
/// verbatim as the key and will not match an object-identifier row.
pub fn apply<S>(
    collection: &S,
    mode: WriteMode,
    document: Document,
) -> Result<WriteOutcome, BuildEnvError>
where
    S: DocumentStore + ?Sized,
{
    match mode {
        WriteMode::Insert => {
            let id = document.get(ID_KEY).cloned().unwrap_or(Value::Null);
            collection.insert_one(document)?;
            Ok(WriteOutcome { mode, id })
        }
        WriteMode::Replace => {
            let mut payload = document;
            let id = payload
                .remove(ID_KEY)
                .ok_or(BuildEnvError::MissingIdentifier)?;
            if !collection.replace_one(&id, payload)? {
                return Err(BuildEnvError::DocumentNotFound(id.to_string()));
            }
            Ok(WriteOutcome { mode, id })
        }
    }
}

/// Normalize a raw document, then write it.
///
/// Normalization errors abort before the store is touched.
pub fn normalize_and_apply<S>(
    collection: &S,
    mode: WriteMode,
    document: &Document,
) -> Result<WriteOutcome, BuildEnvError>
where
    S: DocumentStore + ?Sized,
{
    let normalized = normalize(document)?;
    apply(collection, mode, normalized)
}

// =============================================================================
// TESTS
// =============================================================================
