//! Version field of a `package.json`-style manifest.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::domain::Version;
use crate::error::{AutoReleaseError, Result};

/// Reads the manifest at `path` and parses its `version` field.
///
/// Every failure, including an unreadable file, is reported as
/// [`AutoReleaseError::Parse`].
pub fn current_version(path: &Path) -> Result<Version> {
    let text = fs::read_to_string(path).map_err(|e| {
        AutoReleaseError::parse(format!("cannot read manifest {}: {}", path.display(), e))
    })?;
    parse_manifest_version(&text)
}

/// Parses the `version` field out of manifest text.
pub fn parse_manifest_version(text: &str) -> Result<Version> {
    let manifest: Value = serde_json::from_str(text)
        .map_err(|e| AutoReleaseError::parse(format!("manifest is not valid JSON: {}", e)))?;

    let version = manifest
        .get("version")
        .ok_or_else(|| AutoReleaseError::parse("manifest has no 'version' field"))?
        .as_str()
        .ok_or_else(|| AutoReleaseError::parse("manifest 'version' field is not a string"))?;

    Version::parse(version)
}

/// Next version to release after `version`.
pub fn next_version(version: &Version) -> Result<Version> {
    version.next()
}

/// Returns the manifest text with its `version` field set to `version`.
///
/// Key order is kept; output uses two-space indentation and ends with a newline.
pub fn set_manifest_version(text: &str, version: &Version) -> Result<String> {
    let mut manifest: Value = serde_json::from_str(text)
        .map_err(|e| AutoReleaseError::parse(format!("manifest is not valid JSON: {}", e)))?;

    let object = manifest
        .as_object_mut()
        .ok_or_else(|| AutoReleaseError::parse("manifest is not a JSON object"))?;
    object.insert("version".to_string(), Value::String(version.to_string()));

    let mut rendered = serde_json::to_string_pretty(&manifest)
        .map_err(|e| AutoReleaseError::parse(format!("cannot serialize manifest: {}", e)))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Rewrites the manifest file at `path` with `version`.
pub fn write_version(path: &Path, version: &Version) -> Result<String> {
    let text = fs::read_to_string(path)?;
    let updated = set_manifest_version(&text, version)?;
    fs::write(path, &updated)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_version() {
        let text = r#"{"name": "app", "version": "1.1.0"}"#;
        assert_eq!(parse_manifest_version(text).unwrap(), Version::new(1, 1, 0));
    }

    #[test]
    fn test_parse_manifest_version_errors() {
        for text in [
            "not json",
            r#"{"name": "app"}"#,
            r#"{"version": 110}"#,
            r#"{"version": "1.1"}"#,
        ] {
            let err = parse_manifest_version(text).unwrap_err();
            assert!(
                matches!(err, AutoReleaseError::Parse(_)),
                "expected parse error for {}",
                text
            );
        }
    }

    #[test]
    fn test_next_version() {
        assert_eq!(next_version(&Version::new(1, 1, 0)).unwrap(), Version::new(1, 2, 0));
    }

    #[test]
    fn test_set_manifest_version_keeps_key_order() {
        let text = "{\n  \"name\": \"app\",\n  \"version\": \"1.1.0\",\n  \"private\": true\n}\n";
        let updated = set_manifest_version(text, &Version::new(1, 2, 0)).unwrap();
        assert_eq!(
            updated,
            "{\n  \"name\": \"app\",\n  \"version\": \"1.2.0\",\n  \"private\": true\n}\n"
        );
    }

    #[test]
    fn test_set_manifest_version_rejects_non_object() {
        assert!(set_manifest_version("[1, 2]", &Version::new(1, 0, 0)).is_err());
    }

    #[test]
    fn test_current_version_missing_file() {
        let err = current_version(Path::new("/nonexistent/package.json")).unwrap_err();
        assert!(matches!(err, AutoReleaseError::Parse(_)));
    }
}
