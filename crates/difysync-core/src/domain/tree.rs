//! Local tree entries
//!
//! A [`TreeEntry`] is produced for every visible directory and file under the
//! watched root during a scan. Entries are ephemeral: every pass re-reads
//! the filesystem and builds fresh values.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Kind of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A directory or file found under the watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the watched root (never empty)
    pub relative_path: PathBuf,
    /// Directory or file
    pub kind: EntryKind,
    /// File bytes read at scan time (`None` for directories)
    pub content: Option<Vec<u8>>,
}

impl TreeEntry {
    /// Creates a directory entry
    pub fn directory(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::Directory,
            content: None,
        }
    }

    /// Creates a file entry carrying its content
    pub fn file(relative_path: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: EntryKind::File,
            content: Some(content),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Base name of the entry, lossily converted to UTF-8
    pub fn name(&self) -> Cow<'_, str> {
        self.relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Parent directory relative to the root
    ///
    /// Returns `None` when the entry sits directly under the root.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.relative_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// The relative path in the `/`-separated form used for collection names
    pub fn key(&self) -> String {
        slash_path(&self.relative_path)
    }

    /// File content decoded as text; invalid UTF-8 sequences become U+FFFD
    pub fn content_text(&self) -> Cow<'_, str> {
        match &self.content {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => Cow::Borrowed(""),
        }
    }
}

/// Joins the normal components of a relative path with `/`
///
/// Collection names must be identical across platforms, so the native
/// separator is never used.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
