//! Git object model used when building commits through a remote object store.
//!
//! Object identity always comes from the store: an [`ObjectId`] is only ever
//! obtained from a store response, never computed locally.

use std::collections::BTreeMap;
use std::fmt;

/// Opaque content hash assigned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(sha: impl Into<String>) -> Self {
        ObjectId(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for display
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File mode of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileMode {
    Regular,
    Executable,
    Directory,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
            FileMode::Directory => "040000",
        }
    }
}

/// Kind of object a tree entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

/// One path in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: FileMode,
    pub kind: ObjectKind,
    pub id: ObjectId,
}

impl TreeEntry {
    /// A regular, non-executable file entry
    pub fn file(path: impl Into<String>, id: ObjectId) -> Self {
        TreeEntry {
            path: path.into(),
            mode: FileMode::Regular,
            kind: ObjectKind::Blob,
            id,
        }
    }
}

/// An object to be created in the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitObject {
    Blob {
        content: String,
    },
    /// Entries overlay `base` when present; paths missing from `entries` are
    /// inherited from it.
    Tree {
        entries: Vec<TreeEntry>,
        base: Option<ObjectId>,
    },
    Commit {
        message: String,
        tree: ObjectId,
        parents: Vec<ObjectId>,
    },
}

impl GitObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            GitObject::Blob { .. } => ObjectKind::Blob,
            GitObject::Tree { .. } => ObjectKind::Tree,
            GitObject::Commit { .. } => ObjectKind::Commit,
        }
    }
}

/// Repository-relative path to new file content, all written in one commit
pub type FileChangeSet = BTreeMap<String, String>;
