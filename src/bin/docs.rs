//! Schema Docs CLI
//!
//! Exports every family's JSON documents and publishes the HTML pages.
//!
//! Usage:
//!   schema-docs --version 2.3.0
//!   schema-docs --check

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use display_schemas::{catalog, docs, SchemaConfig, SchemaExporter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-docs")]
#[command(about = "Export schema documents and publish the HTML docs")]
struct Cli {
    /// Version label for the documents (a leading "v" is dropped)
    #[arg(short = 'V', long)]
    version: Option<String>,

    /// Output directory (default: docs.output_dir from the config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Explicit config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Compare a fresh render with the files on disk instead of writing
    #[arg(long)]
    check: bool,
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
    let output = cli.output.unwrap_or_else(|| config.docs.output_dir.clone());
    let version = cli
        .version
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let registry = catalog::registry();
    println!(
        "📦 {} definitions in {} families",
        registry.definition_names().len(),
        registry.families().len()
    );

    if cli.check {
        println!("🔍 Checking {} for drift...", output.display());
        let exporter = SchemaExporter::new(&registry, config.docs.document_info(&version))
            .with_options(config.export.clone());
        let drift = exporter.check_drift(&output)?;
        if drift.is_empty() {
            println!("✅ Generated documents are up to date");
            return Ok(());
        }
        for file in &drift {
            if file.missing {
                println!("❌ {} - missing", file.file);
            } else {
                println!("❌ {} - out of date", file.file);
            }
            print!("{}", file.diff);
        }
        println!();
        println!("❌ {} file(s) drifted; run schema-docs to regenerate", drift.len());
        std::process::exit(1);
    }

    let generated = docs::generate(&registry, &config, &version, &output)
        .with_context(|| format!("generating docs into {}", output.display()))?;

    println!("📂 Output: {}", output.display());
    for path in generated.export.files.iter().chain(&generated.pages) {
        println!("  📝 {}", path.display());
    }
    println!(
        "✅ Exported {} documents and {} pages (version {})",
        generated.export.files.len(),
        generated.pages.len(),
        display_schemas::document::normalize_version(&version)
    );
    Ok(())
}
