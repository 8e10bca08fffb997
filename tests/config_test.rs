// tests/config_test.rs
use auto_release::config::{load_config, Config};
use auto_release::AutoReleaseError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.branches.base, "develop");
    assert_eq!(config.branches.target, "main");
    assert_eq!(config.branches.release_prefix, "auto-release/");
    assert_eq!(config.files.manifest, "package.json");
    assert_eq!(config.files.changelog, "CHANGELOG.md");
    assert_eq!(config.github.api_url, "https://api.github.com");
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[branches]
base = "next"

[messages]
pull_request_title = "Release {version}"
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.branches.base, "next");
    // Unset keys keep their defaults
    assert_eq!(config.branches.target, "main");
    assert_eq!(config.messages.commit, "Auto-release v{version}");
    assert_eq!(config.messages.pull_request_title, "Release {version}");
}

#[test]
fn test_load_fixture() {
    let config = load_config(Some("tests/fixtures/autorelease.toml"))
        .expect("Failed to load test config");
    assert_eq!(config.branches.base, "dev");
    assert_eq!(config.branches.target, "production");
    assert_eq!(config.branches.release_prefix, "release/");
    assert_eq!(
        config.files.manifest_path(Path::new("/repo")),
        Path::new("/repo/web/package.json")
    );
    assert_eq!(config.github.token_env, "RELEASE_TOKEN");
    assert_eq!(
        config.messages.release_tag().render(&"2.1.0".parse().unwrap()),
        "web-v2.1.0"
    );
}

#[test]
fn test_tag_template_without_placeholder_is_rejected() {
    let err = load_config(Some("tests/fixtures/invalid_tag.toml")).unwrap_err();
    assert!(matches!(err, AutoReleaseError::Config(_)));
}

#[test]
fn test_invalid_toml_is_rejected() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[branches\nbase = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, AutoReleaseError::Config(_)));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = load_config(Some("tests/fixtures/does_not_exist.toml")).unwrap_err();
    assert!(matches!(err, AutoReleaseError::Io(_)));
}
