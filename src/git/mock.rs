use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::{GitObject, ObjectId, ObjectKind, TreeEntry};
use crate::error::{AutoReleaseError, Result};
use crate::git::{CommitInfo, GitHost, PullRequest, PullRequestInfo, Release, ReleaseInfo};

/// Host operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ResolveRef,
    ReadCommit,
    CreateBlob,
    CreateTree,
    CreateCommit,
    CreateRef,
    UpdateRef,
    CreatePullRequest,
    CreateRelease,
}

impl MockOperation {
    fn injected_error(&self) -> AutoReleaseError {
        let msg = format!("injected failure: {:?}", self);
        match self {
            MockOperation::ResolveRef => AutoReleaseError::ref_not_found(msg),
            MockOperation::CreateRef => AutoReleaseError::ref_creation(msg),
            MockOperation::CreatePullRequest | MockOperation::CreateRelease => {
                AutoReleaseError::api(msg)
            }
            _ => AutoReleaseError::remote_object(msg),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredCommit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    message: String,
}

#[derive(Default)]
struct State {
    blobs: HashMap<ObjectId, String>,
    trees: HashMap<ObjectId, BTreeMap<String, TreeEntry>>,
    commits: HashMap<ObjectId, StoredCommit>,
    refs: HashMap<String, ObjectId>,
    created: Vec<GitObject>,
    calls: Vec<MockOperation>,
    failing: HashSet<MockOperation>,
    pull_requests: Vec<PullRequest>,
    releases: Vec<Release>,
}

fn content_id(kind: &str, payload: &str) -> ObjectId {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload.as_bytes());
    ObjectId::new(hex::encode(hasher.finalize()))
}

impl State {
    fn record(&mut self, op: MockOperation) -> Result<()> {
        self.calls.push(op);
        if self.failing.contains(&op) {
            return Err(op.injected_error());
        }
        Ok(())
    }

    fn store_blob(&mut self, content: &str) -> ObjectId {
        let id = content_id("blob", content);
        self.blobs.insert(id.clone(), content.to_string());
        id
    }

    fn store_tree(&mut self, entries: &[TreeEntry], base: Option<&ObjectId>) -> Result<ObjectId> {
        let mut tree = match base {
            Some(base) => self.trees.get(base).cloned().ok_or_else(|| {
                AutoReleaseError::remote_object(format!("base tree {} does not exist", base))
            })?,
            None => BTreeMap::new(),
        };

        let mut seen = HashSet::new();
        for entry in entries {
            if !seen.insert(entry.path.as_str()) {
                return Err(AutoReleaseError::remote_object(format!(
                    "duplicate tree path {}",
                    entry.path
                )));
            }
            if entry.kind == ObjectKind::Blob && !self.blobs.contains_key(&entry.id) {
                return Err(AutoReleaseError::remote_object(format!(
                    "blob {} does not exist",
                    entry.id
                )));
            }
            tree.insert(entry.path.clone(), entry.clone());
        }

        Ok(self.insert_tree(tree))
    }

    fn insert_tree(&mut self, tree: BTreeMap<String, TreeEntry>) -> ObjectId {
        let payload: String = tree
            .values()
            .map(|e| format!("{} {} {}\t{}\n", e.mode.as_str(), e.kind.as_str(), e.id, e.path))
            .collect();
        let id = content_id("tree", &payload);
        self.trees.insert(id.clone(), tree);
        id
    }

    fn store_commit(
        &mut self,
        message: &str,
        tree: &ObjectId,
        parents: &[ObjectId],
    ) -> Result<ObjectId> {
        if !self.trees.contains_key(tree) {
            return Err(AutoReleaseError::remote_object(format!(
                "tree {} does not exist",
                tree
            )));
        }
        if let Some(missing) = parents.iter().find(|p| !self.commits.contains_key(*p)) {
            return Err(AutoReleaseError::remote_object(format!(
                "parent commit {} does not exist",
                missing
            )));
        }

        Ok(self.insert_commit(StoredCommit {
            tree: tree.clone(),
            parents: parents.to_vec(),
            message: message.to_string(),
        }))
    }

    fn insert_commit(&mut self, commit: StoredCommit) -> ObjectId {
        let mut payload = format!("tree {}\n", commit.tree);
        for parent in &commit.parents {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push('\n');
        payload.push_str(&commit.message);

        let id = content_id("commit", &payload);
        self.commits.insert(id.clone(), commit);
        id
    }
}

/// In-memory git host for testing without network access.
///
/// Objects are content-addressed with SHA-256, so identical objects get
/// identical ids. Trees are stored flat (full path to entry).
pub struct MockHost {
    state: Mutex<State>,
}

impl MockHost {
    /// Create a new empty mock host
    pub fn new() -> Self {
        MockHost {
            state: Mutex::new(State::default()),
        }
    }

    /// Create a host with one branch whose root commit holds `files`
    pub fn with_branch(branch: &str, files: &[(&str, &str)]) -> Self {
        let host = MockHost::new();
        host.seed_branch(branch, files);
        host
    }

    /// Add a branch with a root commit holding `files`.
    ///
    /// Seeding is not recorded as object creation and ignores injected failures.
    pub fn seed_branch(&self, branch: &str, files: &[(&str, &str)]) -> ObjectId {
        let mut state = self.state();
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            let blob = state.store_blob(content);
            tree.insert(path.to_string(), TreeEntry::file(*path, blob));
        }

        let tree = state.insert_tree(tree);
        let commit = state.insert_commit(StoredCommit {
            tree,
            parents: Vec::new(),
            message: format!("Initial commit on {}", branch),
        });
        state.refs.insert(branch.to_string(), commit.clone());
        commit
    }

    /// Make every later call of `op` fail
    pub fn fail_on(&self, op: MockOperation) {
        self.state().failing.insert(op);
    }

    pub fn branch_head(&self, branch: &str) -> Option<ObjectId> {
        self.state().refs.get(branch).cloned()
    }

    pub fn commit_tree(&self, commit: &ObjectId) -> Option<ObjectId> {
        self.state().commits.get(commit).map(|c| c.tree.clone())
    }

    pub fn commit_parents(&self, commit: &ObjectId) -> Option<Vec<ObjectId>> {
        self.state().commits.get(commit).map(|c| c.parents.clone())
    }

    pub fn commit_message(&self, commit: &ObjectId) -> Option<String> {
        self.state().commits.get(commit).map(|c| c.message.clone())
    }

    /// Path to content for every blob in a tree
    pub fn tree_files(&self, tree: &ObjectId) -> Option<BTreeMap<String, String>> {
        let state = self.state();
        let entries = state.trees.get(tree)?;
        Some(
            entries
                .values()
                .filter_map(|e| {
                    state
                        .blobs
                        .get(&e.id)
                        .map(|content| (e.path.clone(), content.clone()))
                })
                .collect(),
        )
    }

    /// Content of `path` at the tip of `branch`
    pub fn file_at(&self, branch: &str, path: &str) -> Option<String> {
        let commit = self.branch_head(branch)?;
        let tree = self.commit_tree(&commit)?;
        self.tree_files(&tree)?.remove(path)
    }

    /// Objects created through [GitHost::create_object], in call order
    pub fn created_objects(&self) -> Vec<GitObject> {
        self.state().created.clone()
    }

    pub fn created_count(&self, kind: ObjectKind) -> usize {
        self.state()
            .created
            .iter()
            .filter(|o| o.kind() == kind)
            .count()
    }

    /// Every host call made so far, including failed ones
    pub fn calls(&self) -> Vec<MockOperation> {
        self.state().calls.clone()
    }

    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.state().pull_requests.clone()
    }

    pub fn releases(&self) -> Vec<Release> {
        self.state().releases.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHost for MockHost {
    async fn resolve_ref(&self, branch: &str) -> Result<ObjectId> {
        let mut state = self.state();
        state.record(MockOperation::ResolveRef)?;
        state
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| AutoReleaseError::ref_not_found(format!("heads/{}", branch)))
    }

    async fn read_commit(&self, id: &ObjectId) -> Result<CommitInfo> {
        let mut state = self.state();
        state.record(MockOperation::ReadCommit)?;
        let commit = state
            .commits
            .get(id)
            .ok_or_else(|| AutoReleaseError::remote_object(format!("commit {} not found", id)))?;
        Ok(CommitInfo {
            id: id.clone(),
            tree: commit.tree.clone(),
        })
    }

    async fn create_object(&self, object: &GitObject) -> Result<ObjectId> {
        let mut state = self.state();
        let id = match object {
            GitObject::Blob { content } => {
                state.record(MockOperation::CreateBlob)?;
                state.store_blob(content)
            }
            GitObject::Tree { entries, base } => {
                state.record(MockOperation::CreateTree)?;
                state.store_tree(entries, base.as_ref())?
            }
            GitObject::Commit {
                message,
                tree,
                parents,
            } => {
                state.record(MockOperation::CreateCommit)?;
                state.store_commit(message, tree, parents)?
            }
        };
        state.created.push(object.clone());
        Ok(id)
    }

    async fn create_ref(&self, branch: &str, target: &ObjectId) -> Result<()> {
        let mut state = self.state();
        state.record(MockOperation::CreateRef)?;
        if state.refs.contains_key(branch) {
            return Err(AutoReleaseError::ref_creation(format!(
                "Reference refs/heads/{} already exists",
                branch
            )));
        }
        if !state.commits.contains_key(target) {
            return Err(AutoReleaseError::ref_creation(format!(
                "Object {} does not exist",
                target
            )));
        }
        state.refs.insert(branch.to_string(), target.clone());
        Ok(())
    }

    async fn update_ref(&self, branch: &str, target: &ObjectId) -> Result<()> {
        let mut state = self.state();
        state.record(MockOperation::UpdateRef)?;
        if !state.refs.contains_key(branch) {
            return Err(AutoReleaseError::ref_not_found(format!("heads/{}", branch)));
        }
        if !state.commits.contains_key(target) {
            return Err(AutoReleaseError::remote_object(format!(
                "Object {} does not exist",
                target
            )));
        }
        state.refs.insert(branch.to_string(), target.clone());
        Ok(())
    }

    async fn create_pull_request(&self, request: &PullRequest) -> Result<PullRequestInfo> {
        let mut state = self.state();
        state.record(MockOperation::CreatePullRequest)?;
        for branch in [&request.head, &request.base] {
            if !state.refs.contains_key(branch) {
                return Err(AutoReleaseError::api(format!(
                    "Validation Failed: branch {} does not exist",
                    branch
                )));
            }
        }
        state.pull_requests.push(request.clone());
        let number = state.pull_requests.len() as u64;
        Ok(PullRequestInfo {
            number,
            url: format!("https://example.invalid/pull/{}", number),
        })
    }

    async fn create_release(&self, release: &Release) -> Result<ReleaseInfo> {
        let mut state = self.state();
        state.record(MockOperation::CreateRelease)?;
        if state.releases.iter().any(|r| r.tag == release.tag) {
            return Err(AutoReleaseError::api(format!(
                "Validation Failed: release {} already exists",
                release.tag
            )));
        }
        state.releases.push(release.clone());
        let id = state.releases.len() as u64;
        Ok(ReleaseInfo {
            id,
            url: format!("https://example.invalid/releases/tag/{}", release.tag),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_host_seeded_branch() {
        let host = MockHost::with_branch("main", &[("README.md", "hello\n")]);

        let head = host.resolve_ref("main").await.unwrap();
        assert_eq!(Some(head), host.branch_head("main"));
        assert_eq!(host.file_at("main", "README.md"), Some("hello\n".to_string()));
        assert!(host.created_objects().is_empty());
    }

    #[tokio::test]
    async fn test_mock_host_identical_objects_share_ids() {
        let host = MockHost::new();
        let blob = GitObject::Blob {
            content: "x".to_string(),
        };

        let first = host.create_object(&blob).await.unwrap();
        let second = host.create_object(&blob).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_host_create_ref_twice() {
        let host = MockHost::with_branch("main", &[]);
        let head = host.branch_head("main").unwrap();

        host.create_ref("feature", &head).await.unwrap();
        let err = host.create_ref("feature", &head).await.unwrap_err();
        assert!(matches!(err, AutoReleaseError::RefCreation(_)));
    }

    #[tokio::test]
    async fn test_mock_host_rejects_dangling_objects() {
        let host = MockHost::new();
        let tree = GitObject::Tree {
            entries: vec![TreeEntry::file("a", ObjectId::new("missing"))],
            base: None,
        };
        assert!(host.create_object(&tree).await.is_err());

        let commit = GitObject::Commit {
            message: "m".to_string(),
            tree: ObjectId::new("missing"),
            parents: vec![],
        };
        assert!(host.create_object(&commit).await.is_err());
        assert!(host.created_objects().is_empty());
    }

    #[tokio::test]
    async fn test_mock_host_failure_injection() {
        let host = MockHost::with_branch("main", &[]);
        host.fail_on(MockOperation::CreatePullRequest);

        let request = PullRequest {
            title: "t".to_string(),
            head: "main".to_string(),
            base: "main".to_string(),
            body: String::new(),
        };
        let err = host.create_pull_request(&request).await.unwrap_err();
        assert!(matches!(err, AutoReleaseError::Api(_)));
        assert!(host.pull_requests().is_empty());
        assert_eq!(host.calls(), vec![MockOperation::CreatePullRequest]);
    }

    #[tokio::test]
    async fn test_mock_host_duplicate_release() {
        let host = MockHost::new();
        let release = Release {
            tag: "v1.0.0".to_string(),
            name: "Release v1.0.0".to_string(),
            body: String::new(),
            draft: false,
            prerelease: false,
            target_commitish: "main".to_string(),
        };

        assert_eq!(host.create_release(&release).await.unwrap().id, 1);
        assert!(host.create_release(&release).await.is_err());
    }
}
