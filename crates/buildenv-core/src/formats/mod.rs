//! # Formats Module
//!
//! Encodings of the document model:
//! - `wire`: conversions to and from `bson` values, shared by every store driver
//! - `extjson`: extended-JSON text for files

pub mod extjson;
pub mod wire;

pub use extjson::{document_from_extjson, document_to_extjson};
