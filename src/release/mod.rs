//! Release Pipeline
//!
//! A strictly sequential state machine:
//!
//! ```text
//! Idle -> Analyzing -> Versioning -> Documenting -> Publishing -> Deploying -> Idle
//!                 \___________\____________\_____________\____________\-> Failed
//! ```
//!
//! Commit history, the documentation step, the release host and external
//! commands all sit behind traits so a run can be driven end to end with
//! fakes.

pub mod commits;
pub mod config;
pub mod host;
pub mod notes;
pub mod runner;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{ReleaseSettings, SchemaConfig};
use crate::error::{Error, Result};
use crate::model::ModelRegistry;
use crate::version::ReleaseVersion;

pub use commits::{analyze, Analysis, CommitSource, ConventionalCommit, GitHistory, RawCommit};
pub use config::{upload_names, ReleaseArtifact, ReleaseConfig, TemplateContext};
pub use host::{GitHubHost, HostError, PublishedRelease, ReleaseHost, ReleaseRequest};
pub use notes::ReleaseNotes;
pub use runner::{CommandOutput, CommandRunner, ShellRunner};

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    Idle,
    Analyzing,
    Versioning,
    Documenting,
    Publishing,
    Deploying,
    Failed,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseState::Idle => "idle",
            ReleaseState::Analyzing => "analyzing",
            ReleaseState::Versioning => "versioning",
            ReleaseState::Documenting => "documenting",
            ReleaseState::Publishing => "publishing",
            ReleaseState::Deploying => "deploying",
            ReleaseState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released {
        version: ReleaseVersion,
        url: String,
    },
    /// No commit since the last release qualifies
    NoRelease,
    /// Stopped after Versioning
    DryRun { version: ReleaseVersion },
}

/// Generates the docs for a version when no `prepareCmd` is configured
pub trait Documenter {
    fn document(&self, version: &ReleaseVersion) -> Result<()>;
}

/// Runs the built-in exporter and publisher on a registry
pub struct CatalogDocs<'a> {
    pub registry: &'a ModelRegistry,
    pub config: &'a SchemaConfig,
}

impl Documenter for CatalogDocs<'_> {
    fn document(&self, version: &ReleaseVersion) -> Result<()> {
        let generated = crate::docs::generate(
            self.registry,
            self.config,
            &version.version_string(),
            &self.config.docs.output_dir,
        )?;
        info!(
            "Generated {} documents and {} pages",
            generated.export.files.len(),
            generated.pages.len()
        );
        Ok(())
    }
}

/// Run options not carried by `.releaserc.json`
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub dry_run: bool,
    pub branch: String,
    pub repository: Option<String>,
    pub max_publish_attempts: u32,
    pub retry_delay: Duration,
    /// Base directory asset paths are resolved against
    pub root: PathBuf,
}

impl PipelineOptions {
    pub fn from_settings(settings: &ReleaseSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            dry_run: false,
            branch: settings.branch.clone(),
            repository: settings.repository.clone(),
            max_publish_attempts: settings.max_publish_attempts,
            retry_delay: Duration::from_millis(settings.retry_delay_ms),
            root: root.into(),
        }
    }
}

/// One release run
pub struct ReleasePipeline<'a> {
    config: &'a ReleaseConfig,
    commits: &'a dyn CommitSource,
    documenter: &'a dyn Documenter,
    runner: &'a dyn CommandRunner,
    host: Option<&'a dyn ReleaseHost>,
    options: PipelineOptions,
    state: ReleaseState,
    history: Vec<ReleaseState>,
    /// Set once Versioning has picked the next version
    context: Option<TemplateContext>,
}

impl<'a> ReleasePipeline<'a> {
    pub fn new(
        config: &'a ReleaseConfig,
        commits: &'a dyn CommitSource,
        documenter: &'a dyn Documenter,
        runner: &'a dyn CommandRunner,
        options: PipelineOptions,
    ) -> Self {
        Self {
            config,
            commits,
            documenter,
            runner,
            host: None,
            options,
            state: ReleaseState::Idle,
            history: vec![ReleaseState::Idle],
            context: None,
        }
    }

    /// Host used by Publishing; required unless the run is a dry run
    pub fn with_host(mut self, host: &'a dyn ReleaseHost) -> Self {
        self.host = Some(host);
        self
    }

    pub fn state(&self) -> ReleaseState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[ReleaseState] {
        &self.history
    }

    pub fn run(&mut self) -> Result<ReleaseOutcome> {
        match self.execute() {
            Ok(outcome) => {
                self.transition(ReleaseState::Idle);
                Ok(outcome)
            }
            Err(e) => {
                let failed_in = self.state;
                self.transition(ReleaseState::Failed);
                self.report_failure(failed_in, &e);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: ReleaseState) {
        info!("Release state: {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn execute(&mut self) -> Result<ReleaseOutcome> {
        if !self.config.allows_branch(&self.options.branch) {
            return Err(Error::Configuration(format!(
                "branch '{}' is not configured for releases",
                self.options.branch
            )));
        }

        self.transition(ReleaseState::Analyzing);
        let analysis = analyze(self.commits)?;
        let (Some(release_type), Some(version)) = (analysis.release_type, analysis.next_version())
        else {
            info!(
                "No release: {} commit(s) since {} and none qualify",
                analysis.commits.len(),
                describe_last(analysis.last_release.as_ref())
            );
            return Ok(ReleaseOutcome::NoRelease);
        };

        self.transition(ReleaseState::Versioning);
        info!(
            "Next release {} ({} bump from {})",
            version,
            release_type,
            describe_last(analysis.last_release.as_ref())
        );
        let context = TemplateContext {
            next_version: version.version_string(),
            next_tag: version.tag_string(),
            last_version: analysis
                .last_release
                .as_ref()
                .map(ReleaseVersion::version_string)
                .unwrap_or_default(),
            branch: self.options.branch.clone(),
        };
        self.context = Some(context.clone());
        if self.options.dry_run {
            return Ok(ReleaseOutcome::DryRun { version });
        }

        self.transition(ReleaseState::Documenting);
        self.document(&version, &context)?;

        self.transition(ReleaseState::Publishing);
        let published = self.publish(&version, &analysis, &context)?;

        self.transition(ReleaseState::Deploying);
        self.deploy(&context)?;

        Ok(ReleaseOutcome::Released {
            version,
            url: published.url,
        })
    }

    fn document(&self, version: &ReleaseVersion, context: &TemplateContext) -> Result<()> {
        match self.config.exec().and_then(|exec| exec.prepare_cmd.as_ref()) {
            Some(template) => {
                let command = template.render(context);
                let output = self.runner.run(&command)?;
                if !output.success() {
                    return Err(Error::DocGeneration(format!(
                        "'{}' failed with {}",
                        command,
                        output.describe()
                    )));
                }
                Ok(())
            }
            None => self.documenter.document(version),
        }
    }

    fn publish(
        &self,
        version: &ReleaseVersion,
        analysis: &Analysis,
        context: &TemplateContext,
    ) -> Result<PublishedRelease> {
        let host = self.host.ok_or_else(|| {
            Error::Configuration("no release host configured for publishing".to_string())
        })?;

        // Read every asset before creating the release so a missing file
        // cannot leave a release without its downloads
        let assets = self.config.assets();
        let names = upload_names(assets);
        let mut contents = Vec::with_capacity(assets.len());
        for artifact in assets {
            contents.push(read_artifact(&self.options.root, artifact)?);
        }

        let body = if self.config.notes_enabled() {
            ReleaseNotes {
                version,
                last_release: analysis.last_release.as_ref(),
                commits: &analysis.commits,
                date: Utc::now().date_naive(),
                repository: self.options.repository.as_deref(),
            }
            .render()
        } else {
            String::new()
        };
        let request = ReleaseRequest {
            tag: version.tag_string(),
            name: version.tag_string(),
            body,
            target: self.options.branch.clone(),
        };

        let attempts = self.options.max_publish_attempts;
        let delay = self.options.retry_delay;
        // A retried create can hit the release an earlier timed-out try made
        let release = host::with_retry(attempts, delay, "create release", || {
            match host.create_release(&request) {
                Err(HostError::Status { status: 422, body }) => {
                    match host.find_release(&request.tag)? {
                        Some(existing) => {
                            info!("Release {} already exists, reusing it", request.tag);
                            Ok(existing)
                        }
                        None => Err(HostError::Status { status: 422, body }),
                    }
                }
                result => result,
            }
        })?;

        for ((artifact, name), content) in assets.iter().zip(&names).zip(&contents) {
            host::with_retry(attempts, delay, &format!("upload {}", name), || {
                host.upload_asset(&release, name, &artifact.label, content)
            })?;
        }

        let success_comment = self
            .config
            .github()
            .and_then(|github| github.success_comment.template());
        if let Some(template) = success_comment {
            let body = template.render(context);
            let issues: BTreeSet<u64> = analysis
                .commits
                .iter()
                .filter(|commit| commit.release_type().is_some())
                .flat_map(|commit| commit.issues.iter().copied())
                .collect();
            for issue in issues {
                host::with_retry(attempts, delay, &format!("comment on #{}", issue), || {
                    host.comment_on_issue(issue, &body)
                })?;
            }
        }

        info!("Published {} with {} asset(s)", release.url, assets.len());
        Ok(release)
    }

    fn deploy(&self, context: &TemplateContext) -> Result<()> {
        let Some(template) = self.config.exec().and_then(|exec| exec.publish_cmd.as_ref()) else {
            return Ok(());
        };
        let command = template.render(context);
        let output = self.runner.run(&command)?;
        if !output.success() {
            return Err(Error::Deploy(format!(
                "'{}' failed with {}",
                command,
                output.describe()
            )));
        }
        Ok(())
    }

    /// Best effort: the run still returns the original error
    fn report_failure(&self, failed_in: ReleaseState, error: &Error) {
        let Some(host) = self.host else {
            return;
        };
        let Some(template) = self
            .config
            .github()
            .and_then(|github| github.fail_title.template())
        else {
            return;
        };
        let context = self.context.clone().unwrap_or_else(|| TemplateContext {
            next_version: String::new(),
            next_tag: String::new(),
            last_version: String::new(),
            branch: self.options.branch.clone(),
        });
        let title = template.render(&context);
        let body = format!(
            "The automated release from the `{}` branch failed while {}.\n\n```\n{}\n```\n",
            self.options.branch, failed_in, error
        );
        if let Err(e) = host.open_issue(&title, &body) {
            warn!("Could not open failure issue: {}", e);
        }
    }
}

fn describe_last(last: Option<&ReleaseVersion>) -> String {
    last.map(ReleaseVersion::tag_string)
        .unwrap_or_else(|| "the beginning of history".to_string())
}

fn read_artifact(root: &Path, artifact: &ReleaseArtifact) -> Result<Vec<u8>> {
    let path = root.join(&artifact.path);
    std::fs::read(&path).map_err(|e| {
        Error::DocGeneration(format!(
            "release asset {} ({}) is not available: {}",
            artifact.path.display(),
            artifact.label,
            e
        ))
    })
}
