//! # buildenv-core
//!
//! Document normalization and insert/replace protocol for buildenv - THE LOGIC.
//!
//! Producers (system collectors, file loaders) hand this crate a generic
//! document. The core:
//! - Normalizes it (`_id` becomes an object identifier, `schema_version` an integer)
//! - Writes it with an explicit insert or replace mode
//! - Scopes the store connection so it is always released
//!
//! ```text
//! producer -> Document -> normalize -> apply(mode) -> DocumentStore
//!                                         ^
//!                          with_connection(connector, uri, db, coll)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous, single write per call, no retries
//! - No network code: store drivers implement `Connector` outside this crate
//! - Never logs; every failure propagates to the caller

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod normalize;
pub mod store;
pub mod types;
pub mod upsert;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{BuildEnvError, DateTime, Document, ID_KEY, ObjectId, SCHEMA_VERSION_KEY, Value};

// =============================================================================
// RE-EXPORTS: Protocol
// =============================================================================

pub use normalize::{DEFAULT_SCHEMA_VERSION, normalize};
pub use store::{
    CollectionOf, Connection, Connector, DocumentStore, MemoryServer, with_connection,
};
pub use upsert::{WriteMode, WriteOutcome, apply, normalize_and_apply};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{document_from_extjson, document_to_extjson};
