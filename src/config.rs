use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::VersionTemplate;
use crate::error::{AutoReleaseError, Result};

/// Represents the complete configuration for auto-release.
///
/// Contains branch names, tracked file locations, message templates and the
/// host API settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

fn default_base_branch() -> String {
    "develop".to_string()
}

fn default_target_branch() -> String {
    "main".to_string()
}

fn default_release_prefix() -> String {
    "auto-release/".to_string()
}

/// Branches a release moves between.
///
/// A release branch is cut from `base`, reviewed into `target`, and after
/// deploy `target` is merged back into `base`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_base_branch")]
    pub base: String,

    #[serde(default = "default_target_branch")]
    pub target: String,

    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            base: default_base_branch(),
            target: default_target_branch(),
            release_prefix: default_release_prefix(),
        }
    }
}

fn default_manifest() -> String {
    "package.json".to_string()
}

fn default_changelog() -> String {
    "CHANGELOG.md".to_string()
}

/// Repository-relative paths of the files a release rewrites.
///
/// The same paths are used locally, relative to the working directory.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_changelog")]
    pub changelog: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            manifest: default_manifest(),
            changelog: default_changelog(),
        }
    }
}

impl FilesConfig {
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    pub fn changelog_path(&self, root: &Path) -> PathBuf {
        root.join(&self.changelog)
    }
}

fn default_commit_message() -> String {
    "Auto-release v{version}".to_string()
}

fn default_pull_request_title() -> String {
    "Auto-release v{version} [deploy]".to_string()
}

fn default_release_tag() -> String {
    "v{version}".to_string()
}

fn default_release_name() -> String {
    "Release v{version}".to_string()
}

fn default_merge_back_title() -> String {
    "Merge back v{version}".to_string()
}

fn default_merge_back_body() -> String {
    "Automatic merge-back".to_string()
}

/// Templates for generated text. `{version}` is replaced with the release version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MessagesConfig {
    #[serde(default = "default_commit_message")]
    pub commit: String,

    #[serde(default = "default_pull_request_title")]
    pub pull_request_title: String,

    #[serde(default = "default_release_tag")]
    pub release_tag: String,

    #[serde(default = "default_release_name")]
    pub release_name: String,

    #[serde(default = "default_merge_back_title")]
    pub merge_back_title: String,

    #[serde(default = "default_merge_back_body")]
    pub merge_back_body: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        MessagesConfig {
            commit: default_commit_message(),
            pull_request_title: default_pull_request_title(),
            release_tag: default_release_tag(),
            release_name: default_release_name(),
            merge_back_title: default_merge_back_title(),
            merge_back_body: default_merge_back_body(),
        }
    }
}

impl MessagesConfig {
    pub fn commit(&self) -> VersionTemplate {
        VersionTemplate::new(&self.commit)
    }

    pub fn pull_request_title(&self) -> VersionTemplate {
        VersionTemplate::new(&self.pull_request_title)
    }

    pub fn release_tag(&self) -> VersionTemplate {
        VersionTemplate::new(&self.release_tag)
    }

    pub fn release_name(&self) -> VersionTemplate {
        VersionTemplate::new(&self.release_name)
    }

    pub fn merge_back_title(&self) -> VersionTemplate {
        VersionTemplate::new(&self.merge_back_title)
    }

    pub fn merge_back_body(&self) -> VersionTemplate {
        VersionTemplate::new(&self.merge_back_body)
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

/// Settings for the GitHub REST API.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: default_api_url(),
            token_env: default_token_env(),
        }
    }
}

impl Config {
    /// Reject configurations that would produce ambiguous names.
    pub fn validate(&self) -> Result<()> {
        for (what, value) in [
            ("branches.base", &self.branches.base),
            ("branches.target", &self.branches.target),
            ("files.manifest", &self.files.manifest),
            ("files.changelog", &self.files.changelog),
        ] {
            if value.trim().is_empty() {
                return Err(AutoReleaseError::config(format!("{} must not be empty", what)));
            }
        }

        if self.files.manifest == self.files.changelog {
            return Err(AutoReleaseError::config(
                "files.manifest and files.changelog must differ",
            ));
        }

        self.messages.release_tag().require_placeholder("release tag")
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `autorelease.toml` in current directory
/// 3. `.autorelease.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./autorelease.toml").exists() {
        fs::read_to_string("./autorelease.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".autorelease.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| AutoReleaseError::config(format!("invalid configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}
