//! # CLI Command Implementations
//!
//! Every store-touching command is generic over [`Connector`] and opens
//! exactly one connection through [`with_connection`].

use crate::collect::{CollectRequest, WorkspaceWalker, build_environment};
use crate::config::StoreTarget;
use crate::files::{load_document, write_document};
use buildenv_core::{
    BuildEnvError, Connector, WriteMode, WriteOutcome, apply, document_to_extjson, normalize,
    normalize_and_apply, with_connection,
};
use std::path::{Path, PathBuf};

/// Options of the `collect` command.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub system_information: bool,
    pub workspace_information: bool,
    /// Write the document to `working_dir/json_filename`.
    pub write_file: bool,
    pub pretty: bool,
    pub json_filename: PathBuf,
    pub working_dir: PathBuf,
    /// Workspace ignore list. Empty keeps the default filter.
    pub filter: Vec<String>,
    pub depth: usize,
    /// Insert the document into the store.
    pub store: bool,
}

impl CollectOptions {
    fn request(&self) -> CollectRequest {
        let workspace = self.workspace_information.then(|| {
            let walker = WorkspaceWalker::new(&self.working_dir).with_depth(self.depth);
            if self.filter.is_empty() {
                walker
            } else {
                walker.with_filter(self.filter.clone())
            }
        });

        CollectRequest {
            system_information: self.system_information,
            workspace,
        }
    }
}

// =============================================================================
// COLLECT COMMAND
// =============================================================================

/// Collect a build environment document, then write and/or store it.
///
/// The document is normalized once up front, so the file and the stored row
/// share the same `_id`; a later `send --replacement` of the file overwrites
/// that row.
pub fn cmd_collect<K: Connector>(
    connector: &K,
    target: &StoreTarget,
    options: &CollectOptions,
    json_mode: bool,
) -> Result<(), BuildEnvError> {
    let document = normalize(&build_environment(&options.request())?)?;

    if options.write_file {
        let path = write_document(
            &options.working_dir,
            &options.json_filename,
            &document,
            options.pretty,
        )?;
        tracing::info!(path = %path.display(), "Wrote build environment file");
    }

    if options.store {
        let outcome = with_connection(
            connector,
            &target.connection_string,
            &target.database,
            &target.collection,
            |collection| apply(collection, WriteMode::Insert, document),
        )?;
        report(&outcome, target, json_mode);
    } else if !options.write_file {
        println!("{}", document_to_extjson(&document, true)?);
    }

    Ok(())
}

// =============================================================================
// SEND COMMAND
// =============================================================================

/// Load a document file and insert or replace it.
pub fn cmd_send<K: Connector>(
    connector: &K,
    target: &StoreTarget,
    working_dir: &Path,
    json_filename: &Path,
    replacement: bool,
    json_mode: bool,
) -> Result<(), BuildEnvError> {
    let document = load_document(working_dir, json_filename)?;
    let mode = WriteMode::from_replacement(replacement);
    tracing::info!(file = %json_filename.display(), %mode, "Sending document");

    let outcome = with_connection(
        connector,
        &target.connection_string,
        &target.database,
        &target.collection,
        |collection| normalize_and_apply(collection, mode, &document),
    )?;
    report(&outcome, target, json_mode);
    Ok(())
}

// =============================================================================
// NORMALIZE COMMAND
// =============================================================================

/// Print the normalized form of a document file.
pub fn cmd_normalize(
    working_dir: &Path,
    json_filename: &Path,
    pretty: bool,
) -> Result<(), BuildEnvError> {
    println!("{}", normalized_text(working_dir, json_filename, pretty)?);
    Ok(())
}

/// Extended-JSON text of a normalized document file.
pub fn normalized_text(
    working_dir: &Path,
    json_filename: &Path,
    pretty: bool,
) -> Result<String, BuildEnvError> {
    let document = load_document(working_dir, json_filename)?;
    document_to_extjson(&normalize(&document)?, pretty)
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Printable form of a written key: bare hex for object identifiers.
fn display_id(outcome: &WriteOutcome) -> String {
    outcome
        .object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_else(|| outcome.id.to_string())
}

fn report(outcome: &WriteOutcome, target: &StoreTarget, json_mode: bool) {
    let id = display_id(outcome);
    tracing::info!(mode = %outcome.mode, id = %id, "Document written");

    if json_mode {
        let output = serde_json::json!({
            "mode": outcome.mode.as_str(),
            "id": id,
            "database": target.database,
            "collection": target.collection
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        let verb = match outcome.mode {
            WriteMode::Insert => "Inserted",
            WriteMode::Replace => "Replaced",
        };
        println!(
            "{} document {} in {}.{}",
            verb, id, target.database, target.collection
        );
    }
}
