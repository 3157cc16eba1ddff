//! Local tree traversal
//!
//! [`TreeScanner`] walks the watched root depth-first, emitting each directory
//! before its children and siblings in file-name order. Entries whose base
//! name starts with [`HIDDEN_MARKER`] are dropped, and hidden directories are
//! pruned so nothing beneath them is visited.
//!
//! The scan is lazy: file contents are read as the iterator advances, and
//! every call to [`TreeScanner::scan`] re-reads the filesystem.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use difysync_core::domain::TreeEntry;

use crate::ScanError;

/// Leading character that marks a file or directory as hidden
pub const HIDDEN_MARKER: char = '.';

/// Walks a local root and yields [`TreeEntry`] values
#[derive(Debug, Clone)]
pub struct TreeScanner {
    root: PathBuf,
}

impl TreeScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Starts a fresh traversal of the root
    ///
    /// The root itself is never yielded. The first error ends the useful
    /// part of the sequence; callers are expected to stop there.
    pub fn scan(&self) -> impl Iterator<Item = Result<TreeEntry, ScanError>> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            // The root's own name may start with the marker (temp dirs do)
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden_name(entry.file_name()))
            .filter_map(move |result| match result {
                Ok(entry) => self.to_tree_entry(entry).transpose(),
                Err(source) => {
                    let path = source
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
                    Some(Err(ScanError::Walk { path, source }))
                }
            })
    }

    fn to_tree_entry(&self, entry: DirEntry) -> Result<Option<TreeEntry>, ScanError> {
        let relative = entry
            .path()
            .strip_prefix(&self.root)
            .map_err(|_| ScanError::OutsideRoot {
                path: entry.path().to_path_buf(),
            })?
            .to_path_buf();

        let file_type = entry.file_type();
        if file_type.is_dir() {
            return Ok(Some(TreeEntry::directory(relative)));
        }

        if file_type.is_symlink() {
            warn!(path = %entry.path().display(), "Skipping symbolic link, links are not followed");
            return Ok(None);
        }

        if !file_type.is_file() {
            debug!(path = %entry.path().display(), "Skipping non-regular entry");
            return Ok(None);
        }

        let content = std::fs::read(entry.path()).map_err(|source| ScanError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;

        Ok(Some(TreeEntry::file(relative, content)))
    }
}

/// Whether any component of a root-relative path is hidden
pub fn is_hidden(relative_path: &Path) -> bool {
    relative_path.components().any(|component| match component {
        Component::Normal(name) => is_hidden_name(name),
        _ => false,
    })
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with(HIDDEN_MARKER)
}
