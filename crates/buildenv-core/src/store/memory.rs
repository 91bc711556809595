//! # In-Memory Store
//!
//! A process-local document store implementing the store traits.
//!
//! Every `MemoryServer` clone shares the same data, so documents written
//! through one connection are visible to the next. Rows are keyed by the
//! `_id` value itself: a string key never matches an object-identifier key
//! with the same hex text.

use crate::store::{Connection, Connector, DocumentStore};
use crate::{BuildEnvError, Document, ID_KEY, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Rows of one collection, in insertion order.
type Rows = Vec<(Value, Document)>;

#[derive(Debug, Default)]
struct Shared {
    /// (database, collection) -> rows
    collections: Mutex<BTreeMap<(String, String), Rows>>,
    open_connections: AtomicUsize,
    unreachable: AtomicBool,
}

impl Shared {
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<(String, String), Rows>>, BuildEnvError> {
        self.collections
            .lock()
            .map_err(|_| BuildEnvError::Store("memory store lock poisoned".to_string()))
    }
}

// =============================================================================
// SERVER
// =============================================================================

/// In-process document server. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    shared: Arc<Shared>,
}

impl MemoryServer {
    /// Create an empty, reachable server.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `open` calls succeed or fail with `ConnectionFailure`.
    pub fn set_reachable(&self, reachable: bool) {
        self.shared.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Number of connections opened and not yet released.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.shared.open_connections.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryServer {
    type Connection = MemoryConnection;

    fn open(&self, connection_string: &str) -> Result<MemoryConnection, BuildEnvError> {
        if self.shared.unreachable.load(Ordering::SeqCst) {
            return Err(BuildEnvError::ConnectionFailure(format!(
                "memory server at '{}' is unreachable",
                connection_string
            )));
        }
        self.shared.open_connections.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryConnection {
            shared: Arc::clone(&self.shared),
        })
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

/// An open connection to a `MemoryServer`.
///
/// Released on `close` or on drop, whichever comes first.
#[derive(Debug)]
pub struct MemoryConnection {
    shared: Arc<Shared>,
}

impl Connection for MemoryConnection {
    type Collection = MemoryCollection;

    fn collection(&self, database: &str, collection: &str) -> MemoryCollection {
        MemoryCollection {
            shared: Arc::clone(&self.shared),
            key: (database.to_string(), collection.to_string()),
        }
    }

    fn close(self) -> Result<(), BuildEnvError> {
        // Drop does the bookkeeping.
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.shared.open_connections.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// Handle to one collection of a `MemoryServer`.
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    shared: Arc<Shared>,
    key: (String, String),
}

impl DocumentStore for MemoryCollection {
    fn insert_one(&self, document: Document) -> Result<(), BuildEnvError> {
        let id = document.get(ID_KEY).cloned().ok_or(BuildEnvError::MissingIdentifier)?;

        let mut collections = self.shared.lock()?;
        let rows = collections.entry(self.key.clone()).or_default();
        if rows.iter().any(|(key, _)| *key == id) {
            return Err(BuildEnvError::DuplicateKey(format!("_id {} already exists", id)));
        }
        rows.push((id, document));
        Ok(())
    }

    fn replace_one(&self, key: &Value, replacement: Document) -> Result<bool, BuildEnvError> {
        let mut collections = self.shared.lock()?;
        let Some(rows) = collections.get_mut(&self.key) else {
            return Ok(false);
        };
        let Some((_, stored)) = rows.iter_mut().find(|(k, _)| k == key) else {
            return Ok(false);
        };

        // The key is immutable; the stored row keeps it.
        let mut row = replacement;
        row.insert(ID_KEY, key.clone());
        *stored = row;
        Ok(true)
    }

    fn find_one(&self, key: &Value) -> Result<Option<Document>, BuildEnvError> {
        let collections = self.shared.lock()?;
        Ok(collections
            .get(&self.key)
            .and_then(|rows| rows.iter().find(|(k, _)| k == key))
            .map(|(_, doc)| doc.clone()))
    }

    fn count(&self) -> Result<u64, BuildEnvError> {
        let collections = self.shared.lock()?;
        Ok(collections.get(&self.key).map_or(0, |rows| rows.len() as u64))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObjectId;

    fn open_docs(server: &MemoryServer) -> (MemoryConnection, MemoryCollection) {
        let conn = server.open("memory://local").expect("open");
        let coll = conn.collection("test", "docs");
        (conn, coll)
    }

    fn row(oid: ObjectId, field: &str, value: i64) -> Document {
        [(ID_KEY, Value::from(oid)), (field, Value::from(value))]
            .into_iter()
            .collect()
    }

    #[test]
    fn insert_then_find() {
        let server = MemoryServer::new();
        let (_conn, coll) = open_docs(&server);
        let oid = ObjectId::new();

        coll.insert_one(row(oid, "a", 1)).expect("insert");

        let found = coll.find_one(&Value::ObjectId(oid)).expect("find");
        assert_eq!(found, Some(row(oid, "a", 1)));
        assert_eq!(coll.count().expect("count"), 1);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let server = MemoryServer::new();
        let (_conn, coll) = open_docs(&server);
        let oid = ObjectId::new();

        coll.insert_one(row(oid, "a", 1)).expect("first insert");
        let second = coll.insert_one(row(oid, "a", 2));

        assert!(matches!(second, Err(BuildEnvError::DuplicateKey(_))));
        assert_eq!(coll.count().expect("count"), 1);
    }

    #[test]
    fn replace_miss_does_not_create() {
        let server = MemoryServer::new();
        let (_conn, coll) = open_docs(&server);

        let matched = coll
            .replace_one(&Value::ObjectId(ObjectId::new()), Document::new())
            .expect("replace");

        assert!(!matched);
        assert_eq!(coll.count().expect("count"), 0);
    }

    #[test]
    fn string_key_does_not_match_object_id() {
        let server = MemoryServer::new();
        let (_conn, coll) = open_docs(&server);
        let oid = ObjectId::new();
        coll.insert_one(row(oid, "a", 1)).expect("insert");

        let matched = coll
            .replace_one(&Value::String(oid.to_hex()), Document::new())
            .expect("replace");

        assert!(!matched);
    }

    #[test]
    fn collections_are_isolated() {
        let server = MemoryServer::new();
        let conn = server.open("memory://local").expect("open");
        let a = conn.collection("test", "a");
        let b = conn.collection("other", "a");

        a.insert_one(row(ObjectId::new(), "x", 1)).expect("insert");

        assert_eq!(a.count().expect("count"), 1);
        assert_eq!(b.count().expect("count"), 0);
    }

    #[test]
    fn drop_releases_connection() {
        let server = MemoryServer::new();
        {
            let (_conn, _coll) = open_docs(&server);
            assert_eq!(server.open_connections(), 1);
        }
        assert_eq!(server.open_connections(), 0);
    }
}
