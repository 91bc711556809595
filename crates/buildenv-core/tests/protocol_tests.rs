//! # Protocol Tests
//!
//! Producer -> normalize -> apply -> store, run against the in-memory store
//! through the same `with_connection` entry point the CLI uses.

use buildenv_core::{
    BuildEnvError, Document, DocumentStore, ID_KEY, MemoryServer, ObjectId, SCHEMA_VERSION_KEY,
    Value, WriteMode, apply, normalize, normalize_and_apply, with_connection,
};

const URI: &str = "memory://integration";
const DATABASE: &str = "test";
const COLLECTION: &str = "test_send_data";

fn doc(pairs: &[(&str, Value)]) -> Document {
    pairs.iter().cloned().collect()
}

fn fetch(server: &MemoryServer, oid: ObjectId) -> Option<Document> {
    with_connection(server, URI, DATABASE, COLLECTION, |coll| {
        coll.find_one(&Value::ObjectId(oid))
    })
    .expect("find")
}

// =============================================================================
// END-TO-END
// =============================================================================

#[test]
fn insert_then_replace_keeps_identifier() {
    let server = MemoryServer::new();

    let outcome = with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        normalize_and_apply(coll, WriteMode::Insert, &doc(&[("data", "tests".into())]))
    })
    .expect("insert");
    let oid = outcome.object_id().expect("minted identifier");

    let stored = fetch(&server, oid).expect("row exists");
    assert_eq!(stored.get(SCHEMA_VERSION_KEY), Some(&Value::Int(1)));
    assert_eq!(stored.get("data"), Some(&Value::from("tests")));

    let mut edited = stored;
    edited.insert("more_data", "x");
    with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        normalize_and_apply(coll, WriteMode::Replace, &edited)
    })
    .expect("replace");

    let replaced = fetch(&server, oid).expect("row still exists");
    assert_eq!(replaced.object_id(), Some(oid));
    assert_eq!(replaced.get("data"), Some(&Value::from("tests")));
    assert_eq!(replaced.get("more_data"), Some(&Value::from("x")));
    assert_eq!(server.open_connections(), 0);
}

#[test]
fn shared_string_identifier_across_insert_and_replace() {
    let server = MemoryServer::new();
    let common_id = ObjectId::new().to_hex();

    let first = doc(&[
        (ID_KEY, common_id.clone().into()),
        (SCHEMA_VERSION_KEY, 1i64.into()),
        ("data", "tests".into()),
    ]);
    let second = doc(&[
        (ID_KEY, common_id.clone().into()),
        (SCHEMA_VERSION_KEY, 1i64.into()),
        ("data", "tests".into()),
        ("more_data", "This is more data from the document replacement".into()),
    ]);

    let count = with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        normalize_and_apply(coll, WriteMode::Insert, &first)?;
        normalize_and_apply(coll, WriteMode::Replace, &second)?;
        coll.count()
    })
    .expect("pipeline");
    assert_eq!(count, 1);

    let oid = ObjectId::parse_str(&common_id).expect("oid");
    let stored = fetch(&server, oid).expect("row");
    assert!(stored.contains_key("more_data"));
}

// =============================================================================
// FAILURE MODES
// =============================================================================

#[test]
fn duplicate_insert_surfaces_as_is() {
    let server = MemoryServer::new();
    let normalized = normalize(&doc(&[("data", "tests".into())])).expect("normalize");

    let result = with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        apply(coll, WriteMode::Insert, normalized.clone())?;
        apply(coll, WriteMode::Insert, normalized.clone())
    });

    assert!(matches!(result, Err(BuildEnvError::DuplicateKey(_))));
    assert_eq!(server.open_connections(), 0);
}

#[test]
fn malformed_identifier_aborts_before_write() {
    let server = MemoryServer::new();
    let raw = doc(&[(ID_KEY, "zz".into())]);

    let result = with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        normalize_and_apply(coll, WriteMode::Insert, &raw)
    });

    assert!(matches!(
        result,
        Err(BuildEnvError::MalformedIdentifier { .. })
    ));
    let count = with_connection(&server, URI, DATABASE, COLLECTION, |coll| coll.count())
        .expect("count");
    assert_eq!(count, 0);
}

#[test]
fn unnormalized_string_key_misses_on_replace() {
    let server = MemoryServer::new();
    let normalized = normalize(&Document::new()).expect("normalize");
    let oid = normalized.object_id().expect("oid");

    let result = with_connection(&server, URI, DATABASE, COLLECTION, |coll| {
        apply(coll, WriteMode::Insert, normalized)?;
        // Skipping normalize leaves a string key that matches nothing.
        apply(coll, WriteMode::Replace, doc(&[(ID_KEY, oid.to_hex().into())]))
    });

    assert!(matches!(result, Err(BuildEnvError::DocumentNotFound(_))));
}

#[test]
fn unreachable_store_is_connection_failure() {
    let server = MemoryServer::new();
    server.set_reachable(false);

    let result = with_connection(&server, URI, DATABASE, COLLECTION, |coll| coll.count());

    assert!(matches!(result, Err(BuildEnvError::ConnectionFailure(_))));
}
