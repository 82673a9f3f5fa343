//! Schema Release CLI
//!
//! Runs the release pipeline: analyse commits since the last tag, version,
//! regenerate docs, publish the release with its assets, then deploy.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use display_schemas::catalog;
use display_schemas::config::SchemaConfig;
use display_schemas::release::{
    CatalogDocs, GitHistory, GitHubHost, PipelineOptions, ReleaseConfig, ReleaseOutcome,
    ReleasePipeline, ShellRunner,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-release")]
#[command(about = "Version, document, publish and deploy a schema release")]
struct Cli {
    /// Repository checkout to release from
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    /// Explicit config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Branch name (default: the checked-out branch)
    #[arg(short, long)]
    branch: Option<String>,

    /// Stop after computing the next version
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SchemaConfig::load_from(cli.config.as_deref())?;
    let releaserc = cli.repo.join(&config.release.config_path);
    let release_config = ReleaseConfig::load(&releaserc)
        .with_context(|| format!("loading {}", releaserc.display()))?;

    let history = GitHistory::open(&cli.repo)?;
    let mut options = PipelineOptions::from_settings(&config.release, &cli.repo);
    options.dry_run = cli.dry_run;
    if let Some(branch) = cli.branch.or_else(|| history.current_branch()) {
        options.branch = branch;
    }

    println!("🔍 Analyzing commits on {}...", options.branch);

    let registry = catalog::registry();
    let mut docs_config = config.clone();
    docs_config.docs.output_dir = cli.repo.join(&config.docs.output_dir);
    let documenter = CatalogDocs { registry: &registry, config: &docs_config };
    let runner = ShellRunner::in_dir(&cli.repo);

    let host = if cli.dry_run {
        None
    } else {
        Some(GitHubHost::from_settings(&config.release)?)
    };

    let mut pipeline = ReleasePipeline::new(&release_config, &history, &documenter, &runner, options);
    if let Some(host) = &host {
        pipeline = pipeline.with_host(host);
    }

    let outcome = pipeline.run();
    let states: Vec<String> = pipeline.history().iter().map(|s| s.to_string()).collect();
    println!("📊 {}", states.join(" -> "));

    match outcome? {
        ReleaseOutcome::Released { version, url } => {
            println!("✅ Released v{}", version);
            println!("   {}", url);
        }
        ReleaseOutcome::NoRelease => {
            println!("✅ No release: no qualifying commits since the last release");
        }
        ReleaseOutcome::DryRun { version } => {
            println!("📝 Dry run: the next release would be v{}", version);
        }
    }
    Ok(())
}
