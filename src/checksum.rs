//! Checksums for generated artifacts
//!
//! The exporter records the SHA256 of every document it writes in a
//! `checksums.sha256` file (the `sha256sum` line format), which the validator
//! can later re-check against the files on disk.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Name of the manifest written next to the documents
pub const CHECKSUMS_FILE: &str = "checksums.sha256";

/// SHA256 checksum of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that content matches this checksum
    pub fn verify(&self, content: &[u8]) -> bool {
        Self::from_bytes(content) == *self
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Checksum {
    fn from(s: &str) -> Self {
        Self(s.to_lowercase())
    }
}

/// A file whose content no longer matches its recorded checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub file: String,
    pub expected: Checksum,
    /// `None` when the file is missing
    pub actual: Option<Checksum>,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {}, found {}",
                self.file, self.expected, actual
            ),
            None => write!(f, "{}: missing", self.file),
        }
    }
}

/// File name to checksum, ordered by file name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, Checksum>,
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: impl Into<String>, content: &[u8]) {
        self.entries.insert(file.into(), Checksum::from_bytes(content));
    }

    pub fn get(&self, file: &str) -> Option<&Checksum> {
        self.entries.get(file)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `sha256sum`-compatible text, one `<hex>  <file>` line per entry
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(file, sum)| format!("{}  {}\n", sum, file))
            .collect()
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let Some((sum, file)) = line.split_once("  ") else {
                return Err(Error::Validation {
                    target: CHECKSUMS_FILE.to_string(),
                    errors: vec![format!("line {}: expected '<sha256>  <file>'", number + 1)],
                });
            };
            if sum.len() != 64 || !sum.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::Validation {
                    target: CHECKSUMS_FILE.to_string(),
                    errors: vec![format!("line {}: invalid digest '{}'", number + 1, sum)],
                });
            }
            entries.insert(file.to_string(), Checksum::from(sum));
        }
        Ok(Self { entries })
    }

    /// Load `checksums.sha256` from a docs directory
    pub fn load(dir: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(dir.join(CHECKSUMS_FILE))?;
        Self::parse(&text)
    }

    /// Compare every recorded file under `dir` against its checksum
    pub fn verify_dir(&self, dir: &Path) -> Result<Vec<ChecksumMismatch>> {
        let mut mismatches = Vec::new();
        for (file, expected) in &self.entries {
            let path = dir.join(file);
            if !path.exists() {
                mismatches.push(ChecksumMismatch {
                    file: file.clone(),
                    expected: expected.clone(),
                    actual: None,
                });
                continue;
            }
            let content = std::fs::read(&path)?;
            if !expected.verify(&content) {
                mismatches.push(ChecksumMismatch {
                    file: file.clone(),
                    expected: expected.clone(),
                    actual: Some(Checksum::from_bytes(&content)),
                });
            }
        }
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = br#"{"name": "test", "version": "1.0.0"}"#;
        assert_eq!(Checksum::from_bytes(content), Checksum::from_bytes(content));
        assert_ne!(Checksum::from_bytes(b"a"), Checksum::from_bytes(b"b"));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            Checksum::from_bytes(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_manifest_render_parse() {
        let mut manifest = ChecksumManifest::new();
        manifest.insert("geometry.json", b"{}");
        manifest.insert("display.json", b"[]");
        let text = manifest.render();
        assert!(text.starts_with(&format!("{}  display.json\n", Checksum::from_bytes(b"[]"))));
        assert_eq!(ChecksumManifest::parse(&text).unwrap(), manifest);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ChecksumManifest::parse("not a checksum line").is_err());
        assert!(ChecksumManifest::parse("abc  file.json").is_err());
    }

    #[test]
    fn test_verify_dir_detects_tampering() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("b.json"), b"[]").unwrap();

        let mut manifest = ChecksumManifest::new();
        manifest.insert("a.json", b"{}");
        manifest.insert("b.json", b"[]");
        manifest.insert("c.json", b"");
        assert_eq!(manifest.len(), 3);

        std::fs::write(dir.path().join("b.json"), b"[1]").unwrap();
        let mismatches = manifest.verify_dir(dir.path()).unwrap();
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].file, "b.json");
        assert!(mismatches[0].actual.is_some());
        assert_eq!(mismatches[1].file, "c.json");
        assert!(mismatches[1].actual.is_none());
    }
}
