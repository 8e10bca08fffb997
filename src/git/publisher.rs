use tracing::debug;

use crate::domain::{FileChangeSet, ObjectId};
use crate::error::{AutoReleaseError, Result};
use crate::git::{BuiltCommit, GitHost, ObjectGraphBuilder};

/// Creates branches and moves them to new commits.
///
/// Updates are not checked against the ref's previous value: two runs
/// publishing to the same branch race and the last writer wins.
pub struct BranchPublisher<'a, H: GitHost + ?Sized> {
    host: &'a H,
}

impl<'a, H: GitHost + ?Sized> BranchPublisher<'a, H> {
    pub fn new(host: &'a H) -> Self {
        BranchPublisher { host }
    }

    /// Create `name` pointing at the current commit of `from`.
    ///
    /// Fails with `RefCreation` if `name` exists or `from` cannot be resolved.
    pub async fn create_branch(&self, name: &str, from: &str) -> Result<ObjectId> {
        let base = self.host.resolve_ref(from).await.map_err(|e| {
            AutoReleaseError::ref_creation(format!(
                "cannot create {} from {}: {}",
                name, from, e
            ))
        })?;

        self.host.create_ref(name, &base).await.map_err(|e| match e {
            AutoReleaseError::RefCreation(_) => e,
            other => AutoReleaseError::ref_creation(format!("cannot create {}: {}", name, other)),
        })?;

        debug!(branch = name, from, commit = %base, "created branch");
        Ok(base)
    }

    /// Point `name` at `commit`.
    pub async fn publish(&self, name: &str, commit: &ObjectId) -> Result<()> {
        self.host.update_ref(name, commit).await?;
        debug!(branch = name, commit = %commit, "published commit");
        Ok(())
    }

    /// Commit `changes` on top of `branch` and move the branch to that commit.
    pub async fn push_files(
        &self,
        branch: &str,
        changes: &FileChangeSet,
        message: &str,
    ) -> Result<BuiltCommit> {
        let built = ObjectGraphBuilder::new(self.host)
            .build(branch, changes, message)
            .await?;
        self.publish(branch, &built.commit).await?;
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{MockHost, MockOperation};

    #[tokio::test]
    async fn test_create_branch_from_base() {
        let host = MockHost::with_branch("develop", &[("a.txt", "a")]);
        let publisher = BranchPublisher::new(&host);

        let commit = publisher
            .create_branch("auto-release/1.2.0", "develop")
            .await
            .unwrap();
        assert_eq!(host.branch_head("auto-release/1.2.0"), Some(commit.clone()));
        assert_eq!(host.branch_head("develop"), Some(commit));
    }

    #[tokio::test]
    async fn test_create_existing_branch_fails() {
        let host = MockHost::with_branch("develop", &[]);
        host.seed_branch("auto-release/1.2.0", &[("old.txt", "old")]);
        let existing = host.branch_head("auto-release/1.2.0");
        let publisher = BranchPublisher::new(&host);

        let err = publisher
            .create_branch("auto-release/1.2.0", "develop")
            .await
            .unwrap_err();
        assert!(matches!(err, AutoReleaseError::RefCreation(_)));
        assert_eq!(host.branch_head("auto-release/1.2.0"), existing);
    }

    #[tokio::test]
    async fn test_create_branch_from_missing_base_fails() {
        let host = MockHost::new();
        let publisher = BranchPublisher::new(&host);

        let err = publisher.create_branch("x", "develop").await.unwrap_err();
        assert!(matches!(err, AutoReleaseError::RefCreation(_)));
        assert_eq!(host.branch_head("x"), None);
    }

    #[tokio::test]
    async fn test_push_files_moves_branch() {
        let host = MockHost::with_branch("develop", &[("a.txt", "a")]);
        let publisher = BranchPublisher::new(&host);

        let mut changes = FileChangeSet::new();
        changes.insert("a.txt".to_string(), "A".to_string());
        let built = publisher.push_files("develop", &changes, "update a").await.unwrap();

        assert_eq!(host.branch_head("develop"), Some(built.commit.clone()));
        assert_eq!(host.file_at("develop", "a.txt"), Some("A".to_string()));
        assert_eq!(host.commit_message(&built.commit), Some("update a".to_string()));
    }

    #[tokio::test]
    async fn test_publish_failure_leaves_branch() {
        let host = MockHost::with_branch("develop", &[("a.txt", "a")]);
        host.fail_on(MockOperation::UpdateRef);
        let before = host.branch_head("develop");
        let publisher = BranchPublisher::new(&host);

        let mut changes = FileChangeSet::new();
        changes.insert("a.txt".to_string(), "A".to_string());
        assert!(publisher.push_files("develop", &changes, "m").await.is_err());
        assert_eq!(host.branch_head("develop"), before);
    }

    #[tokio::test]
    async fn test_publish_last_writer_wins() {
        let host = MockHost::with_branch("develop", &[("a.txt", "a")]);
        let publisher = BranchPublisher::new(&host);

        let mut first = FileChangeSet::new();
        first.insert("a.txt".to_string(), "first".to_string());
        let mut second = FileChangeSet::new();
        second.insert("a.txt".to_string(), "second".to_string());

        let builder = ObjectGraphBuilder::new(&host);
        let one = builder.build("develop", &first, "one").await.unwrap();
        let two = builder.build("develop", &second, "two").await.unwrap();

        publisher.publish("develop", &one.commit).await.unwrap();
        publisher.publish("develop", &two.commit).await.unwrap();
        assert_eq!(host.file_at("develop", "a.txt"), Some("second".to_string()));
    }
}
