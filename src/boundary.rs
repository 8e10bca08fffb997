use std::fmt;

/// Non-fatal conditions met while preparing a release.
/// These are reported to the user; the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// The changelog yields no notes for the release description
    EmptyReleaseNotes { version: String },
    /// More than one `# Unpublished` marker; only the first is stamped
    DuplicateUnpublishedMarkers { count: usize },
    /// No triggering commit in the environment; the release targets a branch
    MissingTriggerCommit { fallback_branch: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::EmptyReleaseNotes { version } => {
                write!(
                    f,
                    "Changelog has no notes for v{}; the description will be empty",
                    version
                )
            }
            BoundaryWarning::DuplicateUnpublishedMarkers { count } => {
                write!(
                    f,
                    "Changelog has {} '# Unpublished' markers; only the first is stamped",
                    count
                )
            }
            BoundaryWarning::MissingTriggerCommit { fallback_branch } => {
                write!(
                    f,
                    "GITHUB_SHA is not set; releasing from the tip of '{}'",
                    fallback_branch
                )
            }
        }
    }
}
