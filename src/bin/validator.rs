//! Schema Validator CLI
//!
//! Validates payloads against the catalog and verifies generated artifacts.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use display_schemas::checksum::{ChecksumManifest, CHECKSUMS_FILE};
use display_schemas::{catalog, Error, PayloadValidator, SchemaConfig};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate payloads and generated schema documents")]
struct Cli {
    /// Explicit config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON payloads (files or directories of .json files)
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Verify checksums.sha256 against the documents next to it
    Checksums {
        /// Docs directory (default: docs.output_dir from the config)
        dir: Option<PathBuf>,
    },

    /// Check the built-in catalog for consistency
    Catalog,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` when something was checked and found invalid
fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Validate { paths } => {
            let registry = catalog::registry();
            let validator = PayloadValidator::new(&registry)?;
            let files = json_files(&paths);
            if files.is_empty() {
                anyhow::bail!("no .json files found");
            }

            println!("🔍 Validating {} payload(s)...", files.len());
            let mut failed = 0;
            for file in &files {
                match validator.validate_file(file) {
                    Ok(name) => println!("  ✅ {} ({})", file.display(), name),
                    Err(Error::Validation { target, errors }) => {
                        failed += 1;
                        println!("  ❌ {}", target);
                        for error in errors {
                            println!("     └─ {}", error);
                        }
                    }
                    Err(e) => {
                        failed += 1;
                        println!("  ❌ {} - {}", file.display(), e);
                    }
                }
            }

            println!();
            if failed == 0 {
                println!("✅ All payloads valid");
            } else {
                println!("❌ {} of {} payload(s) invalid", failed, files.len());
            }
            Ok(failed == 0)
        }

        Commands::Checksums { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => SchemaConfig::load_from(cli.config.as_deref())?.docs.output_dir,
            };
            println!("🔍 Verifying {}", dir.join(CHECKSUMS_FILE).display());

            let manifest = ChecksumManifest::load(&dir)?;
            let mismatches = manifest.verify_dir(&dir)?;
            if mismatches.is_empty() {
                println!("✅ {} file(s) - all checksums valid", manifest.len());
                return Ok(true);
            }
            for mismatch in &mismatches {
                println!("  ❌ {}", mismatch);
            }
            println!("❌ checksum validation FAILED for {} file(s)", mismatches.len());
            Ok(false)
        }

        Commands::Catalog => {
            let registry = catalog::registry();
            registry.check()?;
            println!(
                "✅ Catalog consistent: {} models, {} enums",
                registry.models().len(),
                registry.enums().len()
            );
            for family in registry.families() {
                println!("  📂 {} ({} roots)", family.name, family.roots.len());
            }
            Ok(true)
        }
    }
}

fn json_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path).sort_by_file_name().into_iter().flatten() {
            if entry.file_type().is_file() && is_json(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}
