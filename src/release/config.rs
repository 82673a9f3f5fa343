//! Release configuration (`.releaserc.json`)
//!
//! ```json
//! {
//!   "branches": ["master"],
//!   "plugins": [
//!     "@semantic-release/commit-analyzer",
//!     "@semantic-release/release-notes-generator",
//!     ["@semantic-release/github", {
//!       "successComment": false,
//!       "failTitle": false,
//!       "assets": [{"path": "docs/geometry.json", "label": "Geometry Schema"}]
//!     }],
//!     ["@semantic-release/exec", {
//!       "prepareCmd": "schema-docs --version ${nextRelease.version}",
//!       "publishCmd": "bash deploy.sh"
//!     }]
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

const PLUGIN_SCOPE: &str = "@semantic-release/";

const DEFAULT_SUCCESS_COMMENT: &str =
    "This issue has been resolved in version ${nextRelease.version}.";
const DEFAULT_FAIL_TITLE: &str = "The automated release is failing";

/// Tokens a command or comment template may use
pub const TEMPLATE_TOKENS: [&str; 4] = [
    "nextRelease.version",
    "nextRelease.gitTag",
    "lastRelease.version",
    "branch.name",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").unwrap())
}

/// A generated file attached to a published release under a label
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseArtifact {
    pub path: PathBuf,
    pub label: String,
}

impl ReleaseArtifact {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self { path: path.into(), label: label.into() }
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    fn label_name(&self) -> String {
        let mut slug = String::new();
        for c in self.label.trim().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('_') {
                slug.push('_');
            }
        }
        let slug = slug.trim_matches('_');
        let slug = if slug.is_empty() { "asset" } else { slug };
        match self.path.extension() {
            Some(ext) => format!("{}.{}", slug, ext.to_string_lossy()),
            None => slug.to_string(),
        }
    }
}

/// Names the artifacts are uploaded under, one per artifact, all distinct
///
/// An artifact keeps its file name unless an earlier one already took it, in
/// which case the name is derived from its label.
pub fn upload_names(artifacts: &[ReleaseArtifact]) -> Vec<String> {
    let mut taken = HashSet::new();
    let mut names = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let mut name = artifact.file_name();
        if taken.contains(&name) {
            name = artifact.label_name();
        }
        let base = name.clone();
        let mut n = 2;
        while taken.contains(&name) {
            name = match base.rsplit_once('.') {
                Some((stem, ext)) => format!("{}_{}.{}", stem, n, ext),
                None => format!("{}_{}", base, n),
            };
            n += 1;
        }
        taken.insert(name.clone());
        names.push(name);
    }
    names
}

/// Values substituted into templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub next_version: String,
    pub next_tag: String,
    /// Empty on the first release
    pub last_version: String,
    pub branch: String,
}

/// A string with `${token}` placeholders, checked when loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template(String);

impl Template {
    pub fn parse(text: &str) -> Result<Self> {
        let unknown: Vec<&str> = token_pattern()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|token| !TEMPLATE_TOKENS.contains(&token.trim()))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::Configuration(format!(
                "unknown template token(s) {} in '{}'",
                unknown
                    .iter()
                    .map(|t| format!("${{{}}}", t))
                    .collect::<Vec<_>>()
                    .join(", "),
                text
            )));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, context: &TemplateContext) -> String {
        token_pattern()
            .replace_all(&self.0, |caps: &regex::Captures<'_>| {
                match caps.get(1).map(|m| m.as_str().trim()) {
                    Some("nextRelease.version") => context.next_version.clone(),
                    Some("nextRelease.gitTag") => context.next_tag.clone(),
                    Some("lastRelease.version") => context.last_version.clone(),
                    Some("branch.name") => context.branch.clone(),
                    _ => String::new(),
                }
            })
            .into_owned()
    }
}

/// `false` suppresses; `true` or a string enables
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Disabled,
    Enabled(Template),
}

impl Notice {
    fn from_option(value: Option<Toggle>, default: &str) -> Result<Self> {
        match value {
            None | Some(Toggle::Flag(true)) => Ok(Notice::Enabled(Template::parse(default)?)),
            Some(Toggle::Flag(false)) => Ok(Notice::Disabled),
            Some(Toggle::Text(text)) => Ok(Notice::Enabled(Template::parse(&text)?)),
        }
    }

    pub fn template(&self) -> Option<&Template> {
        match self {
            Notice::Enabled(template) => Some(template),
            Notice::Disabled => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Toggle {
    Flag(bool),
    Text(String),
}

/// Options of the `github` stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubOptions {
    pub success_comment: Notice,
    pub fail_title: Notice,
    pub assets: Vec<ReleaseArtifact>,
}

/// Options of the `exec` stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOptions {
    pub prepare_cmd: Option<Template>,
    pub publish_cmd: Option<Template>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawGitHubOptions {
    success_comment: Option<Toggle>,
    fail_title: Option<Toggle>,
    #[serde(default)]
    assets: Vec<ReleaseArtifact>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawExecOptions {
    prepare_cmd: Option<String>,
    publish_cmd: Option<String>,
}

/// No options are recognised for the analyzer and notes stages
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoOptions {}

/// One configured pipeline stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    CommitAnalyzer,
    ReleaseNotes,
    GitHub(GitHubOptions),
    Exec(ExecOptions),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::CommitAnalyzer => "commit-analyzer",
            Stage::ReleaseNotes => "release-notes-generator",
            Stage::GitHub(_) => "github",
            Stage::Exec(_) => "exec",
        }
    }

    fn parse(name: &str, options: Option<Value>) -> Result<Self> {
        let short = name.strip_prefix(PLUGIN_SCOPE).unwrap_or(name);
        let options = options.unwrap_or_else(|| Value::Object(Default::default()));
        let bad_options =
            |e: serde_json::Error| Error::Configuration(format!("invalid options for {}: {}", name, e));

        match short {
            "commit-analyzer" => {
                serde_json::from_value::<NoOptions>(options).map_err(bad_options)?;
                Ok(Stage::CommitAnalyzer)
            }
            "release-notes-generator" => {
                serde_json::from_value::<NoOptions>(options).map_err(bad_options)?;
                Ok(Stage::ReleaseNotes)
            }
            "github" => {
                let raw: RawGitHubOptions = serde_json::from_value(options).map_err(bad_options)?;
                Ok(Stage::GitHub(GitHubOptions {
                    success_comment: Notice::from_option(raw.success_comment, DEFAULT_SUCCESS_COMMENT)?,
                    fail_title: Notice::from_option(raw.fail_title, DEFAULT_FAIL_TITLE)?,
                    assets: raw.assets,
                }))
            }
            "exec" => {
                let raw: RawExecOptions = serde_json::from_value(options).map_err(bad_options)?;
                Ok(Stage::Exec(ExecOptions {
                    prepare_cmd: raw.prepare_cmd.as_deref().map(Template::parse).transpose()?,
                    publish_cmd: raw.publish_cmd.as_deref().map(Template::parse).transpose()?,
                }))
            }
            _ => Err(Error::Configuration(format!("unknown release stage '{}'", name))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStage {
    Bare(String),
    Configured(String, Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBranch {
    Name(String),
    Object { name: String },
}

#[derive(Debug, Deserialize)]
struct RawReleaseConfig {
    #[serde(default)]
    branches: Vec<RawBranch>,
    plugins: Vec<RawStage>,
}

/// Parsed `.releaserc.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub branches: Vec<String>,
    pub stages: Vec<Stage>,
}

impl ReleaseConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawReleaseConfig = serde_json::from_str(text)
            .map_err(|e| Error::Configuration(format!("invalid release configuration: {}", e)))?;

        let mut stages = Vec::with_capacity(raw.plugins.len());
        for stage in raw.plugins {
            let stage = match stage {
                RawStage::Bare(name) => Stage::parse(&name, None)?,
                RawStage::Configured(name, options) => Stage::parse(&name, Some(options))?,
            };
            if stages.iter().any(|s: &Stage| s.name() == stage.name()) {
                return Err(Error::Configuration(format!(
                    "release stage '{}' is configured twice",
                    stage.name()
                )));
            }
            stages.push(stage);
        }
        if !stages.contains(&Stage::CommitAnalyzer) {
            return Err(Error::Configuration(
                "release configuration has no commit-analyzer stage".to_string(),
            ));
        }

        let branches = raw
            .branches
            .into_iter()
            .map(|branch| match branch {
                RawBranch::Name(name) | RawBranch::Object { name } => name,
            })
            .collect();
        Ok(Self { branches, stages })
    }

    pub fn notes_enabled(&self) -> bool {
        self.stages.contains(&Stage::ReleaseNotes)
    }

    pub fn github(&self) -> Option<&GitHubOptions> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::GitHub(options) => Some(options),
            _ => None,
        })
    }

    pub fn exec(&self) -> Option<&ExecOptions> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Exec(options) => Some(options),
            _ => None,
        })
    }

    pub fn assets(&self) -> &[ReleaseArtifact] {
        self.github().map(|github| github.assets.as_slice()).unwrap_or_default()
    }

    /// Whether `branch` may cut releases; an empty list allows any branch
    pub fn allows_branch(&self, branch: &str) -> bool {
        self.branches.is_empty() || self.branches.iter().any(|b| b == branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASERC: &str = r#"{
        "branches": ["master", {"name": "next"}],
        "plugins": [
            "@semantic-release/commit-analyzer",
            "@semantic-release/release-notes-generator",
            ["@semantic-release/github", {
                "successComment": false,
                "failTitle": "Release ${nextRelease.version} failed",
                "assets": [
                    {"path": "docs/geometry.json", "label": "Geometry Schema"},
                    {"path": "docs/geometry.json", "label": "Display Schema"}
                ]
            }],
            ["@semantic-release/exec", {
                "prepareCmd": "docs.py --version ${nextRelease.version}",
                "publishCmd": "bash deploy.sh"
            }]
        ]
    }"#;

    fn context() -> TemplateContext {
        TemplateContext {
            next_version: "2.3.0".to_string(),
            next_tag: "v2.3.0".to_string(),
            last_version: "2.2.1".to_string(),
            branch: "master".to_string(),
        }
    }

    #[test]
    fn test_parse_releaserc() {
        let config = ReleaseConfig::parse(RELEASERC).unwrap();
        assert_eq!(config.branches, vec!["master", "next"]);
        assert_eq!(config.stages.len(), 4);
        assert!(config.notes_enabled());
        assert!(config.allows_branch("next"));
        assert!(!config.allows_branch("feature"));

        let github = config.github().unwrap();
        assert_eq!(github.success_comment, Notice::Disabled);
        assert_eq!(
            github.fail_title.template().unwrap().render(&context()),
            "Release 2.3.0 failed"
        );
        assert_eq!(config.assets().len(), 2);
    }

    #[test]
    fn test_prepare_cmd_substitution() {
        let config = ReleaseConfig::parse(RELEASERC).unwrap();
        let prepare = config.exec().unwrap().prepare_cmd.as_ref().unwrap();
        assert_eq!(prepare.render(&context()), "docs.py --version 2.3.0");
    }

    #[test]
    fn test_all_tokens_render() {
        let template = Template::parse(
            "${nextRelease.gitTag} ${lastRelease.version} ${branch.name} ${ nextRelease.version }",
        )
        .unwrap();
        assert_eq!(template.render(&context()), "v2.3.0 2.2.1 master 2.3.0");
    }

    #[test]
    fn test_unknown_token_rejected() {
        let text = r#"{"plugins": ["@semantic-release/commit-analyzer",
            ["@semantic-release/exec", {"prepareCmd": "docs.py ${nextRelease.channel}"}]]}"#;
        match ReleaseConfig::parse(text) {
            Err(Error::Configuration(message)) => assert!(message.contains("nextRelease.channel")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_stage_and_option_rejected() {
        let unknown_stage = r#"{"plugins": ["@semantic-release/commit-analyzer", "@semantic-release/npm"]}"#;
        assert!(matches!(ReleaseConfig::parse(unknown_stage), Err(Error::Configuration(_))));

        let unknown_option = r#"{"plugins": ["commit-analyzer", ["github", {"draft": true}]]}"#;
        assert!(matches!(ReleaseConfig::parse(unknown_option), Err(Error::Configuration(_))));

        assert!(matches!(ReleaseConfig::parse("{ nope"), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_analyzer_required() {
        let text = r#"{"plugins": ["release-notes-generator"]}"#;
        assert!(matches!(ReleaseConfig::parse(text), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_defaults_enable_notices() {
        let config = ReleaseConfig::parse(r#"{"plugins": ["commit-analyzer", "github"]}"#).unwrap();
        let github = config.github().unwrap();
        assert!(github.success_comment.template().is_some());
        assert!(github.fail_title.template().is_some());
        assert!(github.assets.is_empty());
        assert!(config.exec().is_none());
    }

    #[test]
    fn test_duplicate_paths_get_distinct_names() {
        let artifacts = vec![
            ReleaseArtifact::new("docs/geometry.json", "Geometry Schema"),
            ReleaseArtifact::new("docs/geometry.json", "Display Schema"),
            ReleaseArtifact::new("other/geometry.json", "Display Schema"),
            ReleaseArtifact::new("docs/display.json", "Display"),
        ];
        assert_eq!(
            upload_names(&artifacts),
            vec![
                "geometry.json",
                "display_schema.json",
                "display_schema_2.json",
                "display.json",
            ]
        );
    }
}
