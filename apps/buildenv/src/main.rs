//! # buildenv
//!
//! ## Usage
//!
//! ```bash
//! # Collect everything, keep a copy on disk, insert into MongoDB
//! buildenv collect --system-information --workspace-information --json-pretty
//!
//! # Overwrite the stored row with an edited copy of the file
//! buildenv send --json-filename build-env.json --replacement
//! ```

use buildenv::{cli, logging};
use clap::{CommandFactory, Parser};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let mut cli = cli::Cli::parse();

    let Some(command) = cli.command.take() else {
        eprintln!("{}", cli::Cli::command().render_help());
        std::process::exit(1);
    };

    logging::init(logging::level_from_flags(cli.debug, cli.verbose));

    if let Err(e) = cli::execute(&cli, command) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
