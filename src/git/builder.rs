use std::collections::BTreeMap;

use futures::future::try_join_all;
use tracing::debug;

use crate::domain::{FileChangeSet, GitObject, ObjectId, TreeEntry};
use crate::error::{AutoReleaseError, Result};
use crate::git::GitHost;

/// A branch's current commit and that commit's tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    pub commit: ObjectId,
    pub tree: ObjectId,
}

/// Objects created for one set of file changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommit {
    pub commit: ObjectId,
    pub tree: ObjectId,
    pub parent: ObjectId,
    pub blobs: BTreeMap<String, ObjectId>,
}

/// Builds blob, tree and commit objects on the remote host.
///
/// Nothing built here is referenced by any branch until the commit is
/// published, so a failure part-way leaves only unreachable objects behind.
pub struct ObjectGraphBuilder<'a, H: GitHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: GitHost + ?Sized> ObjectGraphBuilder<'a, H> {
    pub fn new(host: &'a H) -> Self {
        ObjectGraphBuilder { host }
    }

    /// Resolve a branch to its commit and tree.
    ///
    /// Fails with `RefNotFound` if the branch does not exist.
    pub async fn resolve_head(&self, branch: &str) -> Result<Head> {
        let commit = self.host.resolve_ref(branch).await?;
        let info = self.host.read_commit(&commit).await?;
        debug!(branch, commit = %commit, tree = %info.tree, "resolved head");
        Ok(Head {
            commit,
            tree: info.tree,
        })
    }

    /// Create one blob per file. Blobs are written concurrently and all of them
    /// complete before this returns.
    pub async fn write_blobs(&self, changes: &FileChangeSet) -> Result<BTreeMap<String, ObjectId>> {
        let writes = changes.iter().map(|(path, content)| async move {
            let blob = GitObject::Blob {
                content: content.clone(),
            };
            let id = self.host.create_object(&blob).await?;
            debug!(path = %path, blob = %id, "created blob");
            Ok::<_, AutoReleaseError>((path.clone(), id))
        });

        Ok(try_join_all(writes).await?.into_iter().collect())
    }

    /// Create a tree that overlays `blobs` on `parent_tree`.
    ///
    /// With no blobs the parent tree is returned as-is.
    pub async fn compose_tree(
        &self,
        blobs: &BTreeMap<String, ObjectId>,
        parent_tree: &ObjectId,
    ) -> Result<ObjectId> {
        if blobs.is_empty() {
            return Ok(parent_tree.clone());
        }

        let entries = blobs
            .iter()
            .map(|(path, id)| TreeEntry::file(path.clone(), id.clone()))
            .collect();
        let tree = GitObject::Tree {
            entries,
            base: Some(parent_tree.clone()),
        };

        let id = self.host.create_object(&tree).await?;
        debug!(tree = %id, base = %parent_tree, "created tree");
        Ok(id)
    }

    /// Create a single-parent commit.
    pub async fn compose_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parent: &ObjectId,
    ) -> Result<ObjectId> {
        let commit = GitObject::Commit {
            message: message.to_string(),
            tree: tree.clone(),
            parents: vec![parent.clone()],
        };

        let id = self.host.create_object(&commit).await?;
        debug!(commit = %id, parent = %parent, "created commit");
        Ok(id)
    }

    /// Build a commit on top of `branch` containing `changes`.
    ///
    /// The branch itself is not moved.
    pub async fn build(
        &self,
        branch: &str,
        changes: &FileChangeSet,
        message: &str,
    ) -> Result<BuiltCommit> {
        let head = self.resolve_head(branch).await?;
        let blobs = self.write_blobs(changes).await?;
        let tree = self.compose_tree(&blobs, &head.tree).await?;
        let commit = self.compose_commit(message, &tree, &head.commit).await?;

        Ok(BuiltCommit {
            commit,
            tree,
            parent: head.commit,
            blobs,
        })
    }
}
