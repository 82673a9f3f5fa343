//! Release versioning

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// Size of a version bump, ordered from smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Patch => write!(f, "patch"),
            ReleaseType::Minor => write!(f, "minor"),
            ReleaseType::Major => write!(f, "major"),
        }
    }
}

/// A released (or to-be-released) semantic version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReleaseVersion {
    pub version: Version,
}

impl ReleaseVersion {
    /// Version used when no release tag exists yet
    pub fn initial() -> Self {
        Self { version: Version::new(1, 0, 0) }
    }

    /// Parse `1.2.3` or `v1.2.3`
    pub fn parse(version_str: &str) -> Result<Self, semver::Error> {
        let version_str = version_str.strip_prefix('v').unwrap_or(version_str);
        Ok(Self { version: Version::parse(version_str)? })
    }

    /// Parse a git tag name, accepting only `v<semver>`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let version = tag.strip_prefix('v')?;
        Version::parse(version).ok().map(|version| Self { version })
    }

    /// Get the version string (e.g., "1.2.3")
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    /// Get the tag string (e.g., "v1.2.3")
    pub fn tag_string(&self) -> String {
        format!("v{}", self.version)
    }

    pub fn bump(&self, release: ReleaseType) -> Self {
        match release {
            ReleaseType::Major => self.bump_major(),
            ReleaseType::Minor => self.bump_minor(),
            ReleaseType::Patch => self.bump_patch(),
        }
    }

    pub fn bump_major(&self) -> Self {
        Self { version: Version::new(self.version.major + 1, 0, 0) }
    }

    pub fn bump_minor(&self) -> Self {
        Self { version: Version::new(self.version.major, self.version.minor + 1, 0) }
    }

    pub fn bump_patch(&self) -> Self {
        Self {
            version: Version::new(
                self.version.major,
                self.version.minor,
                self.version.patch + 1,
            ),
        }
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let v = ReleaseVersion::parse("1.2.3").unwrap();
        assert_eq!(v.version_string(), "1.2.3");
        assert_eq!(v.tag_string(), "v1.2.3");
        assert_eq!(ReleaseVersion::parse("v1.2.3").unwrap(), v);
    }

    #[test]
    fn test_from_tag_requires_prefix() {
        assert_eq!(ReleaseVersion::from_tag("v2.0.1").unwrap().version_string(), "2.0.1");
        assert!(ReleaseVersion::from_tag("2.0.1").is_none());
        assert!(ReleaseVersion::from_tag("vnext").is_none());
    }

    #[test]
    fn test_version_bumps() {
        let v = ReleaseVersion::parse("1.2.3").unwrap();
        assert_eq!(v.bump(ReleaseType::Major).version_string(), "2.0.0");
        assert_eq!(v.bump(ReleaseType::Minor).version_string(), "1.3.0");
        assert_eq!(v.bump(ReleaseType::Patch).version_string(), "1.2.4");
    }

    #[test]
    fn test_release_type_ordering() {
        assert!(ReleaseType::Major > ReleaseType::Minor);
        assert!(ReleaseType::Minor > ReleaseType::Patch);
    }
}
