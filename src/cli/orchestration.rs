//! Release workflow orchestration
//!
//! A release run is a strict linear sequence of stages. Each stage returns a
//! `Result`; the first error is wrapped in a [StepFailure] naming the stage
//! and ends the run. Completed stages are not rolled back: a branch created
//! before a failed push stays on the remote.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::domain::{Changelog, FileChangeSet, ObjectId, ReleaseBranch, Version};
use crate::error::{AutoReleaseError, Result};
use crate::git::{BranchPublisher, GitHost, PullRequest, PullRequestInfo};
use crate::manifest;
use crate::ui;

/// Stages of a release run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseStage {
    /// Read the current version and compute the next one
    Planning,
    /// Create the release branch from the base branch
    Branching,
    /// Write the new version into the manifest
    Versioning,
    /// Stamp the changelog's unpublished section
    Changelog,
    /// Commit both files to the release branch
    Publishing,
    /// Open the pull request into the target branch
    PullRequest,
    Done,
    Failed,
}

impl fmt::Display for ReleaseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseStage::Planning => "planning",
            ReleaseStage::Branching => "branching",
            ReleaseStage::Versioning => "versioning",
            ReleaseStage::Changelog => "changelog",
            ReleaseStage::Publishing => "publishing",
            ReleaseStage::PullRequest => "pull request",
            ReleaseStage::Done => "done",
            ReleaseStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The error that stopped a run and the stage it happened in
#[derive(Debug)]
pub struct StepFailure<S> {
    pub stage: S,
    pub error: AutoReleaseError,
}

impl<S: fmt::Display> fmt::Display for StepFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage failed: {}", self.stage, self.error)
    }
}

impl<S: fmt::Debug + fmt::Display> std::error::Error for StepFailure<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Wrap errors of `stage` into a [StepFailure]
pub(crate) fn at<S>(stage: S) -> impl FnOnce(AutoReleaseError) -> StepFailure<S> {
    move |error| StepFailure { stage, error }
}

/// Terminal state of a run
#[derive(Debug)]
pub enum Outcome<T, S> {
    Done(T),
    Failed(StepFailure<S>),
}

impl<T, S> Outcome<T, S> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn failure(&self) -> Option<&StepFailure<S>> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> std::result::Result<T, StepFailure<S>> {
        match self {
            Outcome::Done(value) => Ok(value),
            Outcome::Failed(failure) => Err(failure),
        }
    }
}

impl<T, S: fmt::Display> Outcome<T, S> {
    /// Print the terminal line of the trace
    pub(crate) fn report(result: std::result::Result<T, StepFailure<S>>) -> Self {
        match result {
            Ok(value) => Outcome::Done(value),
            Err(failure) => {
                ui::display_error(&failure.to_string());
                Outcome::Failed(failure)
            }
        }
    }
}

pub type ReleaseOutcome = Outcome<ReleaseSummary, ReleaseStage>;

impl Outcome<ReleaseSummary, ReleaseStage> {
    /// `Done` or `Failed`
    pub fn final_stage(&self) -> ReleaseStage {
        if self.is_done() {
            ReleaseStage::Done
        } else {
            ReleaseStage::Failed
        }
    }
}

/// Versions and branch name of a release, computed before anything changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub current: Version,
    pub next: Version,
    pub branch: ReleaseBranch,
}

/// What a successful release run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub plan: ReleasePlan,
    pub commit: ObjectId,
    pub notes: String,
    pub pull_request: PullRequestInfo,
}

/// Everything a release would do, computed without side effects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunReport {
    pub plan: ReleasePlan,
    pub changelog: String,
    pub notes: String,
    pub steps: Vec<String>,
}

/// Drives a release: branch, version bump, changelog, commit, pull request.
pub struct ReleaseOrchestrator<'a, H: GitHost + ?Sized> {
    host: &'a H,
    config: &'a Config,
    root: PathBuf,
}

impl<'a, H: GitHost + ?Sized> ReleaseOrchestrator<'a, H> {
    /// `root` is the directory holding the manifest and changelog
    pub fn new(host: &'a H, config: &'a Config, root: impl Into<PathBuf>) -> Self {
        ReleaseOrchestrator {
            host,
            config,
            root: root.into(),
        }
    }

    fn manifest_path(&self) -> PathBuf {
        self.config.files.manifest_path(&self.root)
    }

    fn changelog_path(&self) -> PathBuf {
        self.config.files.changelog_path(&self.root)
    }

    /// Read the manifest and work out the release version and branch.
    pub fn plan(&self) -> Result<ReleasePlan> {
        plan(self.config, &self.root)
    }

    /// Run every stage, stopping at the first failure.
    pub async fn run(&self) -> ReleaseOutcome {
        Outcome::report(self.run_stages().await)
    }

    async fn run_stages(&self) -> std::result::Result<ReleaseSummary, StepFailure<ReleaseStage>> {
        ui::display_status("Reading current version...");
        let plan = self.plan().map_err(at(ReleaseStage::Planning))?;
        ui::display_version_change(&plan.current.to_string(), &plan.next.to_string());

        self.create_release_branch(&plan)
            .await
            .map_err(at(ReleaseStage::Branching))?;

        let manifest_text = self
            .bump_manifest(&plan)
            .map_err(at(ReleaseStage::Versioning))?;

        let changelog = self
            .stamp_changelog(&plan)
            .map_err(at(ReleaseStage::Changelog))?;

        let commit = self
            .push_changes(&plan, manifest_text, changelog.render())
            .await
            .map_err(at(ReleaseStage::Publishing))?;

        let notes = changelog.latest_notes();
        let pull_request = self
            .open_pull_request(&plan, &notes)
            .await
            .map_err(at(ReleaseStage::PullRequest))?;

        ui::display_success(&format!("Release v{} prepared", plan.next));
        Ok(ReleaseSummary {
            plan,
            commit,
            notes,
            pull_request,
        })
    }

    async fn create_release_branch(&self, plan: &ReleasePlan) -> Result<()> {
        let base = &self.config.branches.base;
        ui::display_status(&format!(
            "Creating branch {} from {}...",
            plan.branch.name, base
        ));
        BranchPublisher::new(self.host)
            .create_branch(&plan.branch.name, base)
            .await?;
        ui::display_success(&format!("Branch {} created", plan.branch.name));
        Ok(())
    }

    fn bump_manifest(&self, plan: &ReleasePlan) -> Result<String> {
        ui::display_status(&format!(
            "Bumping {} to version {}...",
            self.config.files.manifest, plan.next
        ));
        let text = manifest::write_version(&self.manifest_path(), &plan.next)?;
        ui::display_success("Version bumped");
        Ok(text)
    }

    fn stamp_changelog(&self, plan: &ReleasePlan) -> Result<Changelog> {
        ui::display_status(&format!(
            "Stamping unpublished changes as v{}...",
            plan.next
        ));
        let path = self.changelog_path();
        let changelog = read_changelog(&path)?;

        let markers = changelog.unpublished_marker_count();
        if markers > 1 {
            ui::display_boundary_warning(&BoundaryWarning::DuplicateUnpublishedMarkers {
                count: markers,
            });
        }

        let stamped = changelog.stamp_unpublished(&plan.next)?;
        fs::write(&path, stamped.render())?;
        ui::display_success("Changelog stamped");
        Ok(stamped)
    }

    async fn push_changes(
        &self,
        plan: &ReleasePlan,
        manifest_text: String,
        changelog_text: String,
    ) -> Result<ObjectId> {
        ui::display_status(&format!("Pushing changes to {}...", plan.branch.name));

        let mut changes = FileChangeSet::new();
        changes.insert(self.config.files.manifest.clone(), manifest_text);
        changes.insert(self.config.files.changelog.clone(), changelog_text);

        let message = self.config.messages.commit().render(&plan.next);
        let built = BranchPublisher::new(self.host)
            .push_files(&plan.branch.name, &changes, &message)
            .await?;

        ui::display_success(&format!(
            "Changes pushed to {} ({})",
            plan.branch.name,
            built.commit.short()
        ));
        Ok(built.commit)
    }

    async fn open_pull_request(&self, plan: &ReleasePlan, notes: &str) -> Result<PullRequestInfo> {
        let target = &self.config.branches.target;
        ui::display_status(&format!("Creating pull request into {}...", target));

        if notes.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::EmptyReleaseNotes {
                version: plan.next.to_string(),
            });
        }

        let request = PullRequest {
            title: self.config.messages.pull_request_title().render(&plan.next),
            head: plan.branch.name.clone(),
            base: target.clone(),
            body: notes.to_string(),
        };
        let created = self.host.create_pull_request(&request).await?;
        ui::display_success(&format!(
            "Pull request #{} created: {}",
            created.number, created.url
        ));
        Ok(created)
    }
}

/// Read the manifest under `root` and work out the release version and branch.
pub fn plan(config: &Config, root: &Path) -> Result<ReleasePlan> {
    let current = manifest::current_version(&config.files.manifest_path(root))?;
    let next = manifest::next_version(&current)?;
    Ok(ReleasePlan {
        current,
        next,
        branch: ReleaseBranch::new(&config.branches.release_prefix, next),
    })
}

/// Compute a release without writing files or calling the host.
pub fn dry_run(config: &Config, root: &Path) -> Result<DryRunReport> {
    let plan = plan(config, root)?;
    let changelog =
        read_changelog(&config.files.changelog_path(root))?.stamp_unpublished(&plan.next)?;
    let messages = &config.messages;
    let branches = &config.branches;

    let steps = vec![
        format!("create branch {} from {}", plan.branch.name, branches.base),
        format!(
            "set {} version {} -> {}",
            config.files.manifest, plan.current, plan.next
        ),
        format!("stamp {} with v{}", config.files.changelog, plan.next),
        format!(
            "commit \"{}\" to {}",
            messages.commit().render(&plan.next),
            plan.branch.name
        ),
        format!(
            "open pull request \"{}\" into {}",
            messages.pull_request_title().render(&plan.next),
            branches.target
        ),
    ];

    Ok(DryRunReport {
        notes: changelog.latest_notes(),
        changelog: changelog.render(),
        plan,
        steps,
    })
}

pub(crate) fn read_changelog(path: &Path) -> Result<Changelog> {
    let text = fs::read_to_string(path)?;
    Ok(Changelog::parse(&text))
}
