// tests/deploy_workflow_test.rs
use std::fs;

use auto_release::cli::{DeployOrchestrator, DeployStage};
use auto_release::config::Config;
use auto_release::git::{MockHost, MockOperation};
use auto_release::AutoReleaseError;
use tempfile::TempDir;

const CHANGELOG: &str = "# Unpublished\n\n# v1.2.0\n- Added X\n\n# v1.1.0\n- Added W\n";

fn released_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        "{\n  \"name\": \"widgets\",\n  \"version\": \"1.2.0\"\n}\n",
    )
    .unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), CHANGELOG).unwrap();
    dir
}

fn remote() -> MockHost {
    let host = MockHost::with_branch("main", &[("CHANGELOG.md", CHANGELOG)]);
    host.seed_branch("develop", &[]);
    host
}

#[tokio::test]
async fn test_deploy_creates_release_and_merge_back() {
    let dir = released_workspace();
    let host = remote();
    let config = Config::default();

    let outcome = DeployOrchestrator::new(&host, &config, dir.path(), Some("abc123".to_string()))
        .run()
        .await;
    assert_eq!(outcome.final_stage(), DeployStage::Done);
    let summary = outcome.into_result().unwrap();
    assert_eq!(summary.version.to_string(), "1.2.0");

    let releases = host.releases();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].tag, "v1.2.0");
    assert_eq!(releases[0].name, "Release v1.2.0");
    assert_eq!(releases[0].body, "# v1.2.0\n- Added X\n");
    assert_eq!(releases[0].target_commitish, "abc123");
    assert!(!releases[0].draft);
    assert!(!releases[0].prerelease);

    let pulls = host.pull_requests();
    assert_eq!(pulls.len(), 1);
    assert_eq!(pulls[0].title, "Merge back v1.2.0");
    assert_eq!(pulls[0].head, "main");
    assert_eq!(pulls[0].base, "develop");
    assert_eq!(pulls[0].body, "Automatic merge-back");
}

#[tokio::test]
async fn test_deploy_without_trigger_commit_targets_branch() {
    let dir = released_workspace();
    let host = remote();
    let config = Config::default();

    let outcome = DeployOrchestrator::new(&host, &config, dir.path(), None)
        .run()
        .await;
    assert!(outcome.is_done());
    assert_eq!(host.releases()[0].target_commitish, "main");
}

#[tokio::test]
async fn test_deploy_release_failure_skips_merge_back() {
    let dir = released_workspace();
    let host = remote();
    host.fail_on(MockOperation::CreateRelease);
    let config = Config::default();

    let failure = DeployOrchestrator::new(&host, &config, dir.path(), None)
        .run()
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(failure.stage, DeployStage::Releasing);
    assert!(matches!(failure.error, AutoReleaseError::Api(_)));
    assert!(host.pull_requests().is_empty());
}

#[tokio::test]
async fn test_deploy_twice_fails_on_duplicate_tag() {
    let dir = released_workspace();
    let host = remote();
    let config = Config::default();

    let first = DeployOrchestrator::new(&host, &config, dir.path(), None)
        .run()
        .await;
    assert!(first.is_done());

    let second = DeployOrchestrator::new(&host, &config, dir.path(), None)
        .run()
        .await;
    assert_eq!(
        second.failure().map(|f| f.stage),
        Some(DeployStage::Releasing)
    );
    assert_eq!(host.releases().len(), 1);
}

#[tokio::test]
async fn test_deploy_missing_manifest_fails_at_planning() {
    let dir = TempDir::new().unwrap();
    let host = remote();
    let config = Config::default();

    let failure = DeployOrchestrator::new(&host, &config, dir.path(), None)
        .run()
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(failure.stage, DeployStage::Planning);
    assert!(host.calls().is_empty());
}
