//! # buildenv CLI Module
//!
//! ## Available Commands
//!
//! - `collect` - Gather system and workspace information, optionally write
//!   it to a file, and insert it into the store
//! - `send` - Load an extended-JSON document file and insert or replace it
//! - `normalize` - Load a document file and print its normalized form

mod commands;

use crate::collect::workspace::DEFAULT_DEPTH;
use crate::config::BuildEnvConfig;
use crate::mongo::MongoConnector;
use buildenv_core::{BuildEnvError, Connector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

/// File name used when `--json-filename` is not given.
pub const DEFAULT_JSON_FILENAME: &str = "build-env.json";

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// buildenv - build environment snapshots
///
/// Collects host and workspace information and stores it as documents in
/// MongoDB, or round-trips it through extended-JSON files.
#[derive(Parser, Debug)]
#[command(name = "buildenv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// MongoDB connection string
    #[arg(
        long,
        global = true,
        env = "MONGODB_CONNECTION_STRING",
        hide_env_values = true
    )]
    pub connection_string: Option<String>,

    /// Database name
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Collection name
    #[arg(long, global = true)]
    pub collection_name: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Collect build environment information
    Collect {
        /// Gather host information (CPU, memory, disks, network, environment)
        #[arg(long)]
        system_information: bool,

        /// List the directories of the working directory
        #[arg(long)]
        workspace_information: bool,

        /// Write the collected document to a JSON file
        #[arg(long)]
        json: bool,

        /// Write the JSON file indented (implies --json)
        #[arg(long)]
        json_pretty: bool,

        /// JSON file name, relative to the working directory
        #[arg(long, default_value = DEFAULT_JSON_FILENAME)]
        json_filename: PathBuf,

        /// Working directory
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Directory names skipped by the workspace listing (repeatable)
        #[arg(short, long = "filter")]
        filter: Vec<String>,

        /// Maximum workspace listing depth
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: usize,

        /// Do not write the document to the store
        #[arg(long)]
        no_store: bool,
    },

    /// Send a JSON document file to the store
    Send {
        /// JSON file name, relative to the working directory
        #[arg(long, default_value = DEFAULT_JSON_FILENAME)]
        json_filename: PathBuf,

        /// Working directory
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Replace the stored document with the same _id instead of inserting
        #[arg(short, long)]
        replacement: bool,
    },

    /// Print the normalized form of a JSON document file
    Normalize {
        /// JSON file name, relative to the working directory
        #[arg(long, default_value = DEFAULT_JSON_FILENAME)]
        json_filename: PathBuf,

        /// Working directory
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute a command against MongoDB.
pub fn execute(cli: &Cli, command: Commands) -> Result<(), BuildEnvError> {
    execute_with(&MongoConnector, cli, command)
}

/// Execute a command against any store connector.
pub fn execute_with<K: Connector>(
    connector: &K,
    cli: &Cli,
    command: Commands,
) -> Result<(), BuildEnvError> {
    let config = match &cli.config {
        Some(path) => BuildEnvConfig::load(path)?,
        None => BuildEnvConfig::default(),
    };
    let target = config.resolve(
        cli.connection_string.as_deref(),
        cli.database.as_deref(),
        cli.collection_name.as_deref(),
    );
    tracing::debug!(?target, "resolved store target");

    let json_mode = cli.json_mode;

    match command {
        Commands::Collect {
            system_information,
            workspace_information,
            json,
            json_pretty,
            json_filename,
            working_dir,
            filter,
            depth,
            no_store,
        } => {
            let options = CollectOptions {
                system_information,
                workspace_information,
                write_file: json || json_pretty,
                pretty: json_pretty,
                json_filename,
                working_dir,
                filter,
                depth,
                store: !no_store,
            };
            cmd_collect(connector, &target, &options, json_mode)
        }
        Commands::Send {
            json_filename,
            working_dir,
            replacement,
        } => cmd_send(
            connector,
            &target,
            &working_dir,
            &json_filename,
            replacement,
            json_mode,
        ),
        Commands::Normalize {
            json_filename,
            working_dir,
            pretty,
        } => cmd_normalize(&working_dir, &json_filename, pretty),
    }
}
