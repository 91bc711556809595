//! Integration tests for the buildenv CLI.
//!
//! Commands run through `execute_with` against the in-memory store, so the
//! whole collect -> file -> send path is exercised without a MongoDB server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use buildenv::cli::{Cli, Commands, execute_with, normalized_text};
use buildenv::config::{DEFAULT_COLLECTION, DEFAULT_DATABASE};
use buildenv::files::{load_document, write_document};
use buildenv_core::{
    BuildEnvError, Document, DocumentStore, ID_KEY, MemoryServer, SCHEMA_VERSION_KEY, Value,
    document_from_extjson, with_connection,
};
use clap::Parser;
use std::path::Path;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Parse arguments and run the subcommand against `server`.
fn run(server: &MemoryServer, args: &[&str]) -> Result<(), BuildEnvError> {
    let mut cli = Cli::try_parse_from(args).unwrap();
    let command = cli.command.take().unwrap();
    execute_with(server, &cli, command)
}

fn stored(server: &MemoryServer, id: &Value) -> Option<Document> {
    with_connection(server, "memory://cli", DEFAULT_DATABASE, DEFAULT_COLLECTION, |c| {
        c.find_one(id)
    })
    .unwrap()
}

fn stored_count(server: &MemoryServer) -> u64 {
    with_connection(server, "memory://cli", DEFAULT_DATABASE, DEFAULT_COLLECTION, |c| {
        c.count()
    })
    .unwrap()
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

#[test]
fn no_subcommand_parses_to_none() {
    let cli = Cli::try_parse_from(["buildenv"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn collect_flags() {
    let cli = Cli::try_parse_from([
        "buildenv",
        "-d",
        "collect",
        "--system-information",
        "--json-pretty",
        "-w",
        "/tmp",
        "-f",
        "target",
        "-f",
        ".git",
    ])
    .unwrap();

    assert!(cli.debug);
    match cli.command {
        Some(Commands::Collect {
            system_information,
            workspace_information,
            json_pretty,
            json_filename,
            working_dir,
            filter,
            no_store,
            ..
        }) => {
            assert!(system_information);
            assert!(!workspace_information);
            assert!(json_pretty);
            assert_eq!(json_filename, Path::new("build-env.json"));
            assert_eq!(working_dir, Path::new("/tmp"));
            assert_eq!(filter, vec!["target".to_string(), ".git".to_string()]);
            assert!(!no_store);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn send_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "buildenv",
        "send",
        "-r",
        "--database",
        "ci",
        "--collection-name",
        "snapshots",
    ])
    .unwrap();

    assert_eq!(cli.database.as_deref(), Some("ci"));
    assert_eq!(cli.collection_name.as_deref(), Some("snapshots"));
    assert!(matches!(
        cli.command,
        Some(Commands::Send {
            replacement: true,
            ..
        })
    ));
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["buildenv", "send", "--upsert"]).is_err());
}

// =============================================================================
// COMMANDS
// =============================================================================

#[test]
fn collect_writes_file_and_inserts_same_document() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("src")).unwrap();
    let dir = tmp.path().to_str().unwrap();

    run(
        &server,
        &[
            "buildenv",
            "collect",
            "--workspace-information",
            "--json",
            "-w",
            dir,
        ],
    )
    .unwrap();

    let file = load_document(tmp.path(), Path::new("build-env.json")).unwrap();
    let id = file.get(ID_KEY).cloned().unwrap();
    assert!(id.as_object_id().is_some());
    assert_eq!(file.get(SCHEMA_VERSION_KEY), Some(&Value::Int(1)));

    let row = stored(&server, &id).unwrap();
    assert_eq!(row, file);
    assert_eq!(server.open_connections(), 0);
}

#[test]
fn collect_without_store_leaves_store_untouched() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    run(
        &server,
        &["buildenv", "collect", "--json", "--no-store", "-w", dir],
    )
    .unwrap();

    assert!(tmp.path().join("build-env.json").is_file());
    assert_eq!(stored_count(&server), 0);
}

#[test]
fn send_insert_then_replace_edited_file() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    run(&server, &["buildenv", "collect", "--json", "--no-store", "-w", dir]).unwrap();
    run(
        &server,
        &["buildenv", "send", "--json-filename", "build-env.json", "-w", dir],
    )
    .unwrap();
    assert_eq!(stored_count(&server), 1);

    // Edit the collected file and push it back as a replacement.
    let mut edited = load_document(tmp.path(), Path::new("build-env.json")).unwrap();
    let id = edited.get(ID_KEY).cloned().unwrap();
    edited.insert("more_data", "x");
    write_document(tmp.path(), Path::new("build-env.json"), &edited, true).unwrap();

    run(
        &server,
        &[
            "buildenv",
            "send",
            "--json-filename",
            "build-env.json",
            "-w",
            dir,
            "--replacement",
        ],
    )
    .unwrap();

    let row = stored(&server, &id).unwrap();
    assert_eq!(row.get("more_data"), Some(&Value::from("x")));
    assert_eq!(row.get(ID_KEY), Some(&id));
    assert_eq!(stored_count(&server), 1);
}

#[test]
fn send_twice_is_duplicate_key() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    let mut doc = Document::new();
    doc.insert(ID_KEY, "631dc81d12277d809b0dac77");
    doc.insert("data", "tests");
    write_document(tmp.path(), Path::new("build-env.json"), &doc, false).unwrap();

    run(&server, &["buildenv", "send", "-w", dir]).unwrap();
    let second = run(&server, &["buildenv", "send", "-w", dir]);

    assert!(matches!(second, Err(BuildEnvError::DuplicateKey(_))));
    assert_eq!(server.open_connections(), 0);
}

#[test]
fn replace_without_stored_row_is_not_found() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    let mut doc = Document::new();
    doc.insert("data", "tests");
    write_document(tmp.path(), Path::new("build-env.json"), &doc, false).unwrap();

    let result = run(&server, &["buildenv", "send", "-w", dir, "-r"]);

    assert!(matches!(result, Err(BuildEnvError::DocumentNotFound(_))));
    assert_eq!(stored_count(&server), 0);
}

#[test]
fn malformed_identifier_never_reaches_store() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    let mut doc = Document::new();
    doc.insert(ID_KEY, "not-an-object-id");
    write_document(tmp.path(), Path::new("build-env.json"), &doc, false).unwrap();

    let result = run(&server, &["buildenv", "send", "-w", dir]);

    assert!(matches!(
        result,
        Err(BuildEnvError::MalformedIdentifier { .. })
    ));
    assert_eq!(stored_count(&server), 0);
    assert_eq!(server.open_connections(), 0);
}

#[test]
fn unreachable_store_is_connection_failure() {
    let server = MemoryServer::new();
    server.set_reachable(false);
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    write_document(tmp.path(), Path::new("build-env.json"), &Document::new(), false).unwrap();
    let result = run(&server, &["buildenv", "send", "-w", dir]);

    assert!(matches!(result, Err(BuildEnvError::ConnectionFailure(_))));
}

#[test]
fn config_file_selects_collection() {
    let server = MemoryServer::new();
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    let config_path = tmp.path().join("buildenv.toml");
    std::fs::write(&config_path, "[store]\ncollection = \"from_config\"\n").unwrap();
    write_document(tmp.path(), Path::new("build-env.json"), &Document::new(), false).unwrap();

    run(
        &server,
        &[
            "buildenv",
            "-c",
            config_path.to_str().unwrap(),
            "send",
            "-w",
            dir,
        ],
    )
    .unwrap();

    let count = with_connection(&server, "memory://cli", DEFAULT_DATABASE, "from_config", |c| {
        c.count()
    })
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(stored_count(&server), 0);
}

#[test]
fn normalize_command_does_not_need_store() {
    let server = MemoryServer::new();
    server.set_reachable(false);
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_str().unwrap();

    let mut doc = Document::new();
    doc.insert(SCHEMA_VERSION_KEY, "3");
    write_document(tmp.path(), Path::new("build-env.json"), &doc, false).unwrap();

    run(&server, &["buildenv", "normalize", "-w", dir]).unwrap();

    let text = normalized_text(tmp.path(), Path::new("build-env.json"), false).unwrap();
    let normalized = document_from_extjson(&text).unwrap();
    assert_eq!(normalized.get(SCHEMA_VERSION_KEY), Some(&Value::Int(3)));
    assert!(normalized.object_id().is_some());

    // The file itself is left as written.
    let on_disk = load_document(tmp.path(), Path::new("build-env.json")).unwrap();
    assert_eq!(on_disk, doc);
}
