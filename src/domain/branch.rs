use crate::domain::Version;

/// Fully qualified ref name for a branch (`refs/heads/<name>`)
pub fn full_ref(branch: &str) -> String {
    format!("refs/heads/{}", branch)
}

/// Short ref path used by the ref lookup and update endpoints (`heads/<name>`)
pub fn heads_ref(branch: &str) -> String {
    format!("heads/{}", branch)
}

/// The branch a release run creates and commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    pub name: String,
    pub version: Version,
}

impl ReleaseBranch {
    /// Create the release branch for `version` (e.g. "auto-release/" + "1.2.0")
    pub fn new(prefix: &str, version: Version) -> Self {
        ReleaseBranch {
            name: format!("{}{}", prefix, version),
            version,
        }
    }
}
