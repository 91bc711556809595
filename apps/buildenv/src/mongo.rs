//! # MongoDB Connector
//!
//! Implements the core store traits with the blocking MongoDB driver.
//!
//! - `open` parses the URI and pings the server, so an unreachable store
//!   fails in the connection phase rather than on the first write
//! - `close` shuts the client down and waits for the pool to be released
//! - Replace never sets `upsert`; a miss reports zero matches
//! - Write error 11000 is the duplicate-key error

use buildenv_core::{
    BuildEnvError, Connection, Connector, Document, DocumentStore, ID_KEY, Value,
};
use mongodb::bson::{self, Bson};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::sync::{Client, Collection};

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Database used for the connection-phase ping.
const PING_DATABASE: &str = "admin";

/// Map a driver error to the core taxonomy.
fn map_error(e: MongoError) -> BuildEnvError {
    match e.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            BuildEnvError::DuplicateKey(write_error.message.clone())
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Authentication { .. } => BuildEnvError::ConnectionFailure(e.to_string()),
        _ => BuildEnvError::Store(e.to_string()),
    }
}

/// Filter matching one `_id`.
fn id_filter(key: &Value) -> bson::Document {
    let mut filter = bson::Document::new();
    filter.insert(ID_KEY, Bson::from(key.clone()));
    filter
}

// =============================================================================
// CONNECTOR
// =============================================================================

/// Opens MongoDB connections from `mongodb://` connection strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

impl Connector for MongoConnector {
    type Connection = MongoConnection;

    fn open(&self, connection_string: &str) -> Result<MongoConnection, BuildEnvError> {
        let client = Client::with_uri_str(connection_string)
            .map_err(|e| BuildEnvError::ConnectionFailure(e.to_string()))?;

        let mut ping = bson::Document::new();
        ping.insert("ping", 1);
        client
            .database(PING_DATABASE)
            .run_command(ping)
            .run()
            .map_err(|e| BuildEnvError::ConnectionFailure(e.to_string()))?;

        tracing::debug!("Connected to MongoDB");
        Ok(MongoConnection { client })
    }
}

/// An open MongoDB client.
#[derive(Debug)]
pub struct MongoConnection {
    client: Client,
}

impl Connection for MongoConnection {
    type Collection = MongoCollection;

    fn collection(&self, database: &str, collection: &str) -> MongoCollection {
        MongoCollection {
            inner: self.client.database(database).collection(collection),
        }
    }

    fn close(self) -> Result<(), BuildEnvError> {
        // Blocks until the pool and monitors are gone. Collection handles
        // must already be dropped.
        self.client.shutdown().run();
        tracing::debug!("Closed MongoDB connection");
        Ok(())
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// One MongoDB collection of raw BSON documents.
#[derive(Debug, Clone)]
pub struct MongoCollection {
    inner: Collection<bson::Document>,
}

impl DocumentStore for MongoCollection {
    fn insert_one(&self, document: Document) -> Result<(), BuildEnvError> {
        self.inner
            .insert_one(bson::Document::from(document))
            .run()
            .map_err(map_error)?;
        Ok(())
    }

    fn replace_one(&self, key: &Value, replacement: Document) -> Result<bool, BuildEnvError> {
        let result = self
            .inner
            .replace_one(id_filter(key), bson::Document::from(replacement))
            .run()
            .map_err(map_error)?;
        Ok(result.matched_count > 0)
    }

    fn find_one(&self, key: &Value) -> Result<Option<Document>, BuildEnvError> {
        self.inner
            .find_one(id_filter(key))
            .run()
            .map_err(map_error)?
            .map(Document::try_from)
            .transpose()
    }

    fn count(&self) -> Result<u64, BuildEnvError> {
        self.inner
            .count_documents(bson::Document::new())
            .run()
            .map_err(map_error)
    }
}
