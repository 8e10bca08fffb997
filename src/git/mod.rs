//! Remote git host abstraction layer
//!
//! This module provides a trait-based abstraction over the git host's data
//! API, so that commits can be built and branches moved without a local
//! working copy.
//!
//! # Overview
//!
//! The primary abstraction is the [GitHost] trait. The concrete
//! implementations are:
//!
//! - [github::GitHubHost]: the GitHub REST API over `reqwest`
//! - [mock::MockHost]: an in-memory content-addressed store for testing
//!
//! On top of the trait sit [builder::ObjectGraphBuilder], which creates the
//! blob/tree/commit objects for a set of file changes, and
//! [publisher::BranchPublisher], which creates and moves branch refs.
//!
//! # Usage
//!
//! ```rust,no_run
//! # use auto_release::git::{BranchPublisher, GitHost};
//! # use auto_release::domain::FileChangeSet;
//! # async fn example<H: GitHost>(host: &H) -> auto_release::Result<()> {
//! let publisher = BranchPublisher::new(host);
//! publisher.create_branch("auto-release/1.2.0", "develop").await?;
//!
//! let mut changes = FileChangeSet::new();
//! changes.insert("package.json".to_string(), "{}\n".to_string());
//! publisher
//!     .push_files("auto-release/1.2.0", &changes, "Auto-release v1.2.0")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod github;
pub mod mock;
pub mod publisher;

pub use builder::{BuiltCommit, Head, ObjectGraphBuilder};
pub use github::{GitHubContext, GitHubHost};
pub use mock::{MockHost, MockOperation};
pub use publisher::BranchPublisher;

use async_trait::async_trait;

use crate::domain::{GitObject, ObjectId};
use crate::error::Result;

/// Commit metadata needed to build on top of a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// The commit id
    pub id: ObjectId,
    /// The root tree of the commit
    pub tree: ObjectId,
}

/// Pull request to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub title: String,
    /// Branch holding the changes
    pub head: String,
    /// Branch the changes are merged into
    pub base: String,
    pub body: String,
}

/// An opened pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub url: String,
}

/// Release record to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    /// Commit sha or branch the tag is created from
    pub target_commitish: String,
}

/// A published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub id: u64,
    pub url: String,
}

/// Remote git host operations
///
/// All object identities are assigned by the host. Implementations must be
/// content-addressed: creating an identical object twice returns the same id.
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync`; blob creation is issued concurrently.
///
/// ## Error Handling
///
/// Implementations map failures to the matching [crate::error::AutoReleaseError]
/// variant: `RefNotFound` for unknown branches, `RefCreation` for rejected ref
/// creation, `RemoteObject` for rejected object writes and ref updates, `Api`
/// for pull requests and releases.
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Current commit of a branch
    async fn resolve_ref(&self, branch: &str) -> Result<ObjectId>;

    /// Look up a commit's tree
    async fn read_commit(&self, id: &ObjectId) -> Result<CommitInfo>;

    /// Store a blob, tree or commit and return the id the host assigned
    async fn create_object(&self, object: &GitObject) -> Result<ObjectId>;

    /// Create a new branch pointing at `target`; fails if it already exists
    async fn create_ref(&self, branch: &str, target: &ObjectId) -> Result<()>;

    /// Point an existing branch at `target`, even when `target` does not
    /// descend from the current head
    async fn update_ref(&self, branch: &str, target: &ObjectId) -> Result<()>;

    async fn create_pull_request(&self, request: &PullRequest) -> Result<PullRequestInfo>;

    async fn create_release(&self, release: &Release) -> Result<ReleaseInfo>;
}
