//! Deploy workflow: publish the release record for the current version and
//! merge the target branch back into the base branch.

use std::fmt;
use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{at, read_changelog, Outcome, StepFailure};
use crate::config::Config;
use crate::domain::Version;
use crate::error::Result;
use crate::git::{GitHost, PullRequest, PullRequestInfo, Release, ReleaseInfo};
use crate::manifest;
use crate::ui;

/// Stages of a deploy run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    /// Read the released version and its notes
    Planning,
    /// Create the release record
    Releasing,
    /// Open the merge-back pull request
    MergeBack,
    Done,
    Failed,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployStage::Planning => "planning",
            DeployStage::Releasing => "release",
            DeployStage::MergeBack => "merge-back",
            DeployStage::Done => "done",
            DeployStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a successful deploy produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub version: Version,
    pub release: ReleaseInfo,
    pub merge_back: PullRequestInfo,
}

pub type DeployOutcome = Outcome<DeploySummary, DeployStage>;

impl Outcome<DeploySummary, DeployStage> {
    /// `Done` or `Failed`
    pub fn final_stage(&self) -> DeployStage {
        if self.is_done() {
            DeployStage::Done
        } else {
            DeployStage::Failed
        }
    }
}

/// Drives a deploy: release record, then merge-back pull request.
pub struct DeployOrchestrator<'a, H: GitHost + ?Sized> {
    host: &'a H,
    config: &'a Config,
    root: PathBuf,
    trigger_sha: Option<String>,
}

impl<'a, H: GitHost + ?Sized> DeployOrchestrator<'a, H> {
    /// `trigger_sha` is the commit the release tag is created from; without it
    /// the tag is created from the tip of the target branch.
    pub fn new(
        host: &'a H,
        config: &'a Config,
        root: impl Into<PathBuf>,
        trigger_sha: Option<String>,
    ) -> Self {
        DeployOrchestrator {
            host,
            config,
            root: root.into(),
            trigger_sha,
        }
    }

    pub async fn run(&self) -> DeployOutcome {
        Outcome::report(self.run_stages().await)
    }

    async fn run_stages(&self) -> std::result::Result<DeploySummary, StepFailure<DeployStage>> {
        ui::display_status("Reading released version...");
        let (version, notes) = self.read_release().map_err(at(DeployStage::Planning))?;

        let release = self
            .create_release(&version, notes)
            .await
            .map_err(at(DeployStage::Releasing))?;

        let merge_back = self
            .open_merge_back(&version)
            .await
            .map_err(at(DeployStage::MergeBack))?;

        ui::display_success(&format!("Deploy of v{} done", version));
        Ok(DeploySummary {
            version,
            release,
            merge_back,
        })
    }

    fn read_release(&self) -> Result<(Version, String)> {
        let files = &self.config.files;
        let version = manifest::current_version(&files.manifest_path(&self.root))?;
        let notes = read_changelog(&files.changelog_path(&self.root))?.latest_notes();
        Ok((version, notes))
    }

    async fn create_release(&self, version: &Version, notes: String) -> Result<ReleaseInfo> {
        let messages = &self.config.messages;
        let tag = messages.release_tag().render(version);
        ui::display_status(&format!("Creating release {}...", tag));

        if notes.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::EmptyReleaseNotes {
                version: version.to_string(),
            });
        }

        let target_commitish = match &self.trigger_sha {
            Some(sha) => sha.clone(),
            None => {
                let fallback_branch = self.config.branches.target.clone();
                ui::display_boundary_warning(&BoundaryWarning::MissingTriggerCommit {
                    fallback_branch: fallback_branch.clone(),
                });
                fallback_branch
            }
        };

        let release = Release {
            name: messages.release_name().render(version),
            tag,
            body: notes,
            draft: false,
            prerelease: false,
            target_commitish,
        };
        let created = self.host.create_release(&release).await?;
        ui::display_success(&format!("Release {} created: {}", release.tag, created.url));
        Ok(created)
    }

    async fn open_merge_back(&self, version: &Version) -> Result<PullRequestInfo> {
        let branches = &self.config.branches;
        ui::display_status(&format!("Creating merge-back pull request into {}...", branches.base));

        let request = PullRequest {
            title: self.config.messages.merge_back_title().render(version),
            head: branches.target.clone(),
            base: branches.base.clone(),
            body: self.config.messages.merge_back_body().render(version),
        };
        let created = self.host.create_pull_request(&request).await?;
        ui::display_success(&format!("Merge-back pull request #{} created", created.number));
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_stage_display() {
        assert_eq!(DeployStage::MergeBack.to_string(), "merge-back");
        assert_eq!(DeployStage::Releasing.to_string(), "release");
    }
}
