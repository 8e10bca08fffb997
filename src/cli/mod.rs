//! Workflows run by the command line: `release` and `deploy`.

pub mod deploy;
pub mod orchestration;

pub use deploy::{DeployOrchestrator, DeployOutcome, DeployStage, DeploySummary};
pub use orchestration::{
    dry_run, plan, DryRunReport, Outcome, ReleaseOrchestrator, ReleaseOutcome, ReleasePlan,
    ReleaseStage, ReleaseSummary, StepFailure,
};
