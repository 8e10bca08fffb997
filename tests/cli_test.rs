// tests/cli_test.rs
use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_auto-release"))
}

#[test]
fn test_help_lists_subcommands() {
    let output = binary().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("release"));
    assert!(stdout.contains("deploy"));
    assert!(stdout.contains("notes"));
}

#[test]
fn test_notes_prints_latest_section() {
    let dir = TempDir::new().unwrap();
    let changelog = dir.path().join("CHANGELOG.md");
    fs::write(
        &changelog,
        "# Unpublished\n\n# v1.2.0\n- Added X\n\n# v1.1.0\n- Added W\n",
    )
    .unwrap();

    let output = binary()
        .current_dir(dir.path())
        .args(["notes", "--path", changelog.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "# v1.2.0\n- Added X\n");
}

#[test]
fn test_dry_run_leaves_files_untouched() {
    let dir = TempDir::new().unwrap();
    let manifest = "{\n  \"version\": \"3.0.1\"\n}\n";
    fs::write(dir.path().join("package.json"), manifest).unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), "# Unpublished\n- Fixed Z\n").unwrap();

    let output = binary()
        .current_dir(dir.path())
        .args(["release", "--dry-run"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3.1.1"));
    assert_eq!(
        fs::read_to_string(dir.path().join("package.json")).unwrap(),
        manifest
    );
}

#[test]
fn test_release_without_token_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), "{\"version\": \"1.0.0\"}").unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), "# Unpublished\n").unwrap();

    let output = binary()
        .current_dir(dir.path())
        .env_remove("GITHUB_TOKEN")
        .env("GITHUB_REPOSITORY", "acme/widgets")
        .arg("release")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
