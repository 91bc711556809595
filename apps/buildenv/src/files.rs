//! # Document Files
//!
//! Reads and writes single-document extended-JSON files relative to a
//! working directory.

use buildenv_core::{BuildEnvError, Document, document_from_extjson, document_to_extjson};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a document file (100 MB).
pub const MAX_DOCUMENT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), BuildEnvError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| BuildEnvError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(BuildEnvError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input file and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, BuildEnvError> {
    let canonical = path.canonicalize().map_err(|e| {
        BuildEnvError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(BuildEnvError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output file; its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, BuildEnvError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        BuildEnvError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(BuildEnvError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| BuildEnvError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// LOAD / WRITE
// =============================================================================

/// Load one document from `working_directory/filename`.
///
/// An absolute `filename` ignores the working directory.
pub fn load_document(working_directory: &Path, filename: &Path) -> Result<Document, BuildEnvError> {
    let path = validate_file_path(&working_directory.join(filename))?;
    validate_file_size(&path, MAX_DOCUMENT_FILE_SIZE)?;

    let text = std::fs::read_to_string(&path)
        .map_err(|e| BuildEnvError::IoError(format!("Read file: {}", e)))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded document file");
    document_from_extjson(&text)
}

/// Write one document to `working_directory/filename` as extended JSON.
///
/// Returns the path written.
pub fn write_document(
    working_directory: &Path,
    filename: &Path,
    document: &Document,
    pretty: bool,
) -> Result<PathBuf, BuildEnvError> {
    let path = validate_output_path(&working_directory.join(filename))?;
    let text = document_to_extjson(document, pretty)?;

    std::fs::write(&path, text.as_bytes())
        .map_err(|e| BuildEnvError::IoError(format!("Write file: {}", e)))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote document file");
    Ok(path)
}

// =============================================================================
// TESTS
// =============================================================================
