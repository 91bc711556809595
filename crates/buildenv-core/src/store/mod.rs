//! # Store Module
//!
//! The seams between the core and a document database.
//!
//! - `DocumentStore`: one collection, single-document writes and lookups
//! - `Connection`: an open client that hands out collection handles
//! - `Connector`: opens connections from a connection string
//!
//! `with_connection` is the only place a connection is opened by the core,
//! and it closes that connection on every exit path.
//!
//! ## Backends
//!
//! - `MemoryServer`: in-process store, shared across connections
//! - The MongoDB driver lives in the application crate

mod memory;

pub use memory::{MemoryCollection, MemoryConnection, MemoryServer};

use crate::{BuildEnvError, Document, Value};

// =============================================================================
// TRAITS
// =============================================================================

/// A single collection of documents keyed by `_id`.
///
/// Each call is one atomic single-document operation on the store side.
/// Implementations perform no retries.
pub trait DocumentStore {
    /// Insert a document, `_id` included.
    ///
    /// Returns `DuplicateKey` if a row with the same `_id` exists.
    fn insert_one(&self, document: Document) -> Result<(), BuildEnvError>;

    /// Replace the row whose `_id` equals `key` with `replacement`.
    ///
    /// `replacement` must not carry `_id`. Returns `Ok(false)` when no row
    /// matched; a miss never creates a row.
    fn replace_one(&self, key: &Value, replacement: Document) -> Result<bool, BuildEnvError>;

    /// Fetch the row whose `_id` equals `key`, `_id` included.
    fn find_one(&self, key: &Value) -> Result<Option<Document>, BuildEnvError>;

    /// Number of rows in the collection.
    fn count(&self) -> Result<u64, BuildEnvError>;
}

/// An open client connection.
pub trait Connection {
    /// Collection handle type.
    type Collection: DocumentStore;

    /// Select a database and a collection within it.
    fn collection(&self, database: &str, collection: &str) -> Self::Collection;

    /// Release the connection.
    fn close(self) -> Result<(), BuildEnvError>;
}

/// Opens connections from a connection string.
pub trait Connector {
    /// Connection type.
    type Connection: Connection;

    /// Open a connection. Unreachable stores fail here with
    /// `ConnectionFailure`.
    fn open(&self, connection_string: &str) -> Result<Self::Connection, BuildEnvError>;
}

/// Collection handle type of a connector.
pub type CollectionOf<K> = <<K as Connector>::Connection as Connection>::Collection;

// =============================================================================
// CONNECTION LIFECYCLE
// =============================================================================

/// Run `f` against one collection on a freshly opened connection.
///
/// The connection is closed whether `f` succeeds or fails. If `f` fails,
/// its error is returned even when closing also fails. If `f` panics, the
/// connection is released by its `Drop` during unwinding.
pub fn with_connection<K, T, F>(
    connector: &K,
    connection_string: &str,
    database: &str,
    collection: &str,
    f: F,
) -> Result<T, BuildEnvError>
where
    K: Connector,
    F: FnOnce(&CollectionOf<K>) -> Result<T, BuildEnvError>,
{
    let connection = connector.open(connection_string)?;
    let handle = connection.collection(database, collection);
    let result = f(&handle);
    drop(handle);
    let closed = connection.close();

    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), _) | (Ok(_), Err(e)) => Err(e),
    }
}

// =============================================================================
// TESTS
// =============================================================================
