//! # Normalize Module
//!
//! Coerces a raw document into the shape every persisted row must have:
//!
//! - `_id` is an object identifier (parsed from a hex string, or minted)
//! - `schema_version` is an integer (parsed from a numeric string, or 1)
//!
//! Normalization coerces rather than validates. The only failures are a
//! string that cannot be parsed into the type it must become.
//!
//! The input is never mutated; a new document is returned.

use crate::{BuildEnvError, Document, ID_KEY, ObjectId, SCHEMA_VERSION_KEY, Value};

/// Schema version assigned to documents that do not carry one.
pub const DEFAULT_SCHEMA_VERSION: i64 = 1;

/// Normalize both reserved keys of a document.
///
/// Idempotent once the reserved keys are well typed: a second pass sees an
/// object identifier and an integer and leaves both untouched.
pub fn normalize(document: &Document) -> Result<Document, BuildEnvError> {
    let identified = normalize_identifier(document)?;
    normalize_schema_version(&identified)
}

/// Normalize the `_id` key.
///
/// - String: parsed as 24 hex characters, `MalformedIdentifier` otherwise
/// - Object identifier: unchanged
/// - Absent: a fresh identifier is minted
/// - Any other variant: unchanged
pub fn normalize_identifier(document: &Document) -> Result<Document, BuildEnvError> {
    let mut out = document.clone();
    match document.get(ID_KEY) {
        Some(Value::String(raw)) => {
            let oid = parse_identifier(raw)?;
            out.insert(ID_KEY, oid);
        }
        Some(_) => {}
        None => {
            out.insert(ID_KEY, ObjectId::new());
        }
    }
    Ok(out)
}

/// Normalize the `schema_version` key.
///
/// - String: parsed as an integer >= 1, `MalformedSchemaVersion` otherwise
/// - Float: a whole number >= 1 becomes an integer, `MalformedSchemaVersion`
///   otherwise
/// - Integer: unchanged
/// - Absent or null: set to [`DEFAULT_SCHEMA_VERSION`]
/// - Any other variant: unchanged
pub fn normalize_schema_version(document: &Document) -> Result<Document, BuildEnvError> {
    let mut out = document.clone();
    match document.get(SCHEMA_VERSION_KEY) {
        Some(Value::String(raw)) => {
            let version = parse_schema_version(raw)?;
            out.insert(SCHEMA_VERSION_KEY, version);
        }
        Some(Value::Float(raw)) => {
            let version = float_schema_version(*raw)?;
            out.insert(SCHEMA_VERSION_KEY, version);
        }
        Some(Value::Null) | None => {
            out.insert(SCHEMA_VERSION_KEY, DEFAULT_SCHEMA_VERSION);
        }
        Some(_) => {}
    }
    Ok(out)
}

/// Accept a float only if it holds a whole version number.
fn float_schema_version(raw: f64) -> Result<i64, BuildEnvError> {
    let truncated = raw as i64;
    // Bit equality rejects fractions, NaN, infinities and -0.0.
    if (truncated as f64).to_bits() == raw.to_bits() && truncated >= DEFAULT_SCHEMA_VERSION {
        Ok(truncated)
    } else {
        Err(BuildEnvError::MalformedSchemaVersion(raw.to_string()))
    }
}

/// Parse the hex form of an object identifier.
pub fn parse_identifier(raw: &str) -> Result<ObjectId, BuildEnvError> {
    ObjectId::parse_str(raw).map_err(|e| BuildEnvError::MalformedIdentifier {
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a schema version string. Surrounding whitespace is ignored.
pub fn parse_schema_version(raw: &str) -> Result<i64, BuildEnvError> {
    match raw.trim().parse::<i64>() {
        Ok(version) if version >= DEFAULT_SCHEMA_VERSION => Ok(version),
        _ => Err(BuildEnvError::MalformedSchemaVersion(raw.to_string())),
    }
}

// =============================================================================
// TESTS
// =============================================================================
