//! Workspace listing.
//!
//! Walks the working directory to a bounded depth and records the
//! directories found, skipping (and not descending into) ignored names.

use buildenv_core::{BuildEnvError, Document};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directory names ignored by default.
pub const DEFAULT_FILTER: &[&str] = &[
    ".git",
    ".idea",
    ".terraform",
    ".pytest_cache",
    ".github",
    ".circleci",
    ".expeditor",
    "packer_cache",
    ".temp",
];

/// Default walk depth: the working directory's children and grandchildren.
pub const DEFAULT_DEPTH: usize = 2;

/// Directory walker over a workspace root.
#[derive(Debug, Clone)]
pub struct WorkspaceWalker {
    root: PathBuf,
    filter: Vec<String>,
    depth: usize,
}

impl WorkspaceWalker {
    /// Walker with the default filter and depth.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            filter: DEFAULT_FILTER.iter().map(|s| (*s).to_string()).collect(),
            depth: DEFAULT_DEPTH,
        }
    }

    /// Replace the ignore filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Set the maximum depth below the root.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    fn is_ignored(&self, entry: &DirEntry) -> bool {
        // The root itself is always walked.
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.filter.iter().any(|f| f == name))
    }

    /// Walk the workspace.
    ///
    /// Unreadable subdirectories are skipped; an unreadable root is an error.
    pub fn walk(&self) -> Result<Document, BuildEnvError> {
        if !self.root.is_dir() {
            return Err(BuildEnvError::IoError(format!(
                "Workspace root '{}' is not a directory",
                self.root.display()
            )));
        }
        tracing::info!(root = %self.root.display(), depth = self.depth, "Collecting workspace information");

        let mut directories = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_type().is_dir() && !self.is_ignored(entry));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let relative = relative_path(&self.root, entry.path());
                    tracing::debug!(directory = %relative, "workspace directory");
                    directories.push(relative);
                }
                Err(e) => tracing::debug!("Skipping unreadable entry: {}", e),
            }
        }

        let mut info = Document::new();
        info.insert("root", self.root.to_string_lossy().into_owned());
        info.insert("depth", self.depth);
        info.insert("filter", self.filter.clone());
        info.insert("directories", directories);
        Ok(info)
    }
}

/// Path of `path` below `root`, with `/` separators.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
