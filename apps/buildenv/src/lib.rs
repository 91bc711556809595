//! # buildenv
//!
//! Command-line application around `buildenv-core`.
//!
//! ```text
//! collect (sysinfo, walkdir) ─┐
//!                             ├─> Document ─> buildenv-core ─> MongoConnector
//! files (extended JSON)  ─────┘     normalize + insert/replace
//! ```

pub mod cli;
pub mod collect;
pub mod config;
pub mod files;
pub mod logging;
pub mod mongo;
