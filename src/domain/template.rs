use crate::domain::Version;
use crate::error::{AutoReleaseError, Result};

const PLACEHOLDER: &str = "{version}";

/// Text pattern with a `{version}` placeholder
/// (e.g. "v{version}", "Auto-release v{version} [deploy]")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTemplate {
    pub pattern: String,
}

impl VersionTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        VersionTemplate {
            pattern: pattern.into(),
        }
    }

    /// Substitute every placeholder with `version`
    pub fn render(&self, version: &Version) -> String {
        self.pattern.replace(PLACEHOLDER, &version.to_string())
    }

    /// Templates naming refs or tags must mention the version, otherwise every
    /// release would reuse the same name.
    pub fn require_placeholder(&self, what: &str) -> Result<()> {
        if self.pattern.contains(PLACEHOLDER) {
            Ok(())
        } else {
            Err(AutoReleaseError::config(format!(
                "{} pattern '{}' must contain {} placeholder",
                what, self.pattern, PLACEHOLDER
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let template = VersionTemplate::new("Auto-release v{version} [deploy]");
        assert_eq!(
            template.render(&Version::new(1, 2, 0)),
            "Auto-release v1.2.0 [deploy]"
        );
    }

    #[test]
    fn test_render_without_placeholder() {
        let template = VersionTemplate::new("Automatic merge-back");
        assert_eq!(template.render(&Version::new(1, 0, 0)), "Automatic merge-back");
    }

    #[test]
    fn test_require_placeholder() {
        assert!(VersionTemplate::new("v{version}")
            .require_placeholder("tag")
            .is_ok());
        let err = VersionTemplate::new("latest")
            .require_placeholder("tag")
            .unwrap_err();
        assert!(err.to_string().contains("tag pattern 'latest'"));
    }
}
