use crate::error::{AutoReleaseError, Result};
use std::fmt;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse version from a string (e.g., "1.2.3" or "v1.2.3" -> Version(1,2,3))
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let clean = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);

        let parts: Vec<&str> = clean.split('.').collect();
        if parts.len() != 3 {
            return Err(AutoReleaseError::parse(format!(
                "Invalid version format: '{}' - expected X.Y.Z",
                raw
            )));
        }

        let component = |name: &str, part: &str| {
            // u64::from_str accepts a leading '+', which is not a version digit
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AutoReleaseError::parse(format!(
                    "Invalid {} version: '{}'",
                    name, part
                )));
            }
            part.parse::<u64>().map_err(|_| {
                AutoReleaseError::parse(format!("Invalid {} version: '{}'", name, part))
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Next release version: minor is incremented, major and patch are kept.
    pub fn next(&self) -> Result<Self> {
        let minor = self.minor.checked_add(1).ok_or_else(|| {
            AutoReleaseError::parse(format!("minor version of {} cannot be incremented", self))
        })?;
        Ok(Version {
            major: self.major,
            minor,
            patch: self.patch,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for Version {
    type Err = AutoReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_with_prefix() {
        assert_eq!(Version::parse("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(Version::parse("V0.1.0").unwrap(), Version::new(0, 1, 0));
    }

    #[test]
    fn test_version_parse_single_prefix_only() {
        assert!(Version::parse("vv1.2.3").is_err());
        assert!(Version::parse("vV1.2.3").is_err());
        assert!(Version::parse(" v1.2.3 ").is_ok());
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1").is_err());
        assert!(Version::parse("").is_err());
        assert!(Version::parse("v1.2.3.4").is_err());
        assert!(Version::parse("1.x.3").is_err());
        assert!(Version::parse("1..3").is_err());
        assert!(Version::parse("1.+2.3").is_err());
        assert!(Version::parse("1.2.3-beta").is_err());
    }

    #[test]
    fn test_version_parse_error_kind() {
        let err = Version::parse("1.2").unwrap_err();
        assert!(matches!(err, AutoReleaseError::Parse(_)));
    }

    #[test]
    fn test_version_next_bumps_minor_only() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.next().unwrap(), Version::new(1, 3, 3));

        let zero = Version::new(0, 0, 0);
        assert_eq!(zero.next().unwrap(), Version::new(0, 1, 0));
    }

    #[test]
    fn test_version_next_overflow_is_an_error() {
        let err = Version::new(1, u64::MAX, 0).next().unwrap_err();
        assert!(matches!(err, AutoReleaseError::Parse(_)));
    }

    #[test]
    fn test_version_round_trip() {
        for v in [
            Version::new(0, 0, 0),
            Version::new(1, 2, 3),
            Version::new(10, 200, 3000),
            Version::new(u64::MAX, 0, 7),
        ] {
            assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
        }
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 2, 3) < Version::new(1, 3, 0));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
        assert!(Version::new(1, 2, 3).next().unwrap() > Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_version_from_str() {
        let v: Version = "4.5.6".parse().unwrap();
        assert_eq!(v, Version::new(4, 5, 6));
    }
}
