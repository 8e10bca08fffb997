//! Domain logic - pure release rules independent of the remote host

pub mod branch;
pub mod changelog;
pub mod object;
pub mod template;
pub mod version;

pub use branch::ReleaseBranch;
pub use changelog::Changelog;
pub use object::{FileChangeSet, FileMode, GitObject, ObjectId, ObjectKind, TreeEntry};
pub use template::VersionTemplate;
pub use version::Version;
