//! Tool configuration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config files (schemas.toml, .schemas.toml, config/schemas.toml)
//! - The user config directory
//! - An explicit `--config` path
//! - Environment variables (SCHEMAS__*)
//!
//! ## Example config file (schemas.toml):
//! ```toml
//! [docs]
//! output_dir = "docs"
//! title_prefix = "Ladybug"
//!
//! [export]
//! output_format = "pretty"
//! include_checksums = true
//!
//! [release]
//! config_path = ".releaserc.json"
//! repository = "ladybug-tools/ladybug-display-schema"
//! max_publish_attempts = 3
//! ```

use std::path::{Path, PathBuf};

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::document::{Contact, DocumentInfo, License, Logo};
use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub docs: DocsConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub release: ReleaseSettings,
}

/// Documentation output and the metadata stamped into documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Directory receiving JSON documents and HTML pages
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,

    #[serde(default = "default_contact")]
    pub contact: Contact,

    #[serde(default = "default_license")]
    pub license: License,

    #[serde(default = "default_logo")]
    pub logo: Logo,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Write checksums.sha256 next to the documents
    #[serde(default = "default_true")]
    pub include_checksums: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Release pipeline settings that live outside `.releaserc.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
    /// Path of the semantic-release style configuration
    #[serde(default = "default_release_config")]
    pub config_path: PathBuf,

    /// `owner/name` of the repository on the release host
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the host token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Attempts per host call before publishing fails
    #[serde(default = "default_publish_attempts")]
    pub max_publish_attempts: u32,

    /// Delay between host call attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Branch releases are cut from
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_title_prefix() -> String {
    "Ladybug".to_string()
}

fn default_contact() -> Contact {
    DocumentInfo::new("0.0.0").contact
}

fn default_license() -> License {
    DocumentInfo::new("0.0.0").license
}

fn default_logo() -> Logo {
    DocumentInfo::new("0.0.0").logo
}

fn default_true() -> bool {
    true
}

fn default_release_config() -> PathBuf {
    PathBuf::from(".releaserc.json")
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GH_TOKEN".to_string()
}

fn default_publish_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            title_prefix: default_title_prefix(),
            contact: default_contact(),
            license: default_license(),
            logo: default_logo(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            include_checksums: true,
        }
    }
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            config_path: default_release_config(),
            repository: None,
            api_url: default_api_url(),
            token_env: default_token_env(),
            max_publish_attempts: default_publish_attempts(),
            retry_delay_ms: default_retry_delay(),
            branch: default_branch(),
        }
    }
}

impl DocsConfig {
    /// Document metadata for a version label
    pub fn document_info(&self, version: &str) -> DocumentInfo {
        DocumentInfo {
            title_prefix: self.title_prefix.clone(),
            contact: self.contact.clone(),
            license: self.license.clone(),
            logo: self.logo.clone(),
            ..DocumentInfo::new(version)
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["schemas.toml", ".schemas.toml", "config/schemas.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("tools", "ladybug", "display-schemas") {
            let xdg_config = dirs.config_dir().join("schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMAS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        let config: Self = config
            .try_deserialize()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.release.max_publish_attempts == 0 {
            return Err(Error::Configuration(
                "release.max_publish_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(repository) = &self.release.repository {
            if repository.split('/').filter(|part| !part.is_empty()).count() != 2 {
                return Err(Error::Configuration(format!(
                    "release.repository must be 'owner/name', got '{}'",
                    repository
                )));
            }
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Configuration(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Configuration(e.to_string()))
    }
}
