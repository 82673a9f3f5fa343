//! Error types for export, documentation and release runs

use thiserror::Error;

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error taxonomy
///
/// Every variant is fatal for the run that produced it. `Publish` is only
/// returned after the bounded retries against the release host ran out.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Schema export failed: {0}")]
    SchemaExport(#[from] ExportError),

    #[error("Documentation generation failed: {0}")]
    DocGeneration(String),

    #[error("Publishing failed after {attempts} attempt(s): {reason}")]
    Publish { attempts: u32, reason: String },

    #[error("Deployment failed: {0}")]
    Deploy(String),

    #[error("Validation failed for {target}: {errors:?}")]
    Validation { target: String, errors: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),
}

/// Registry inconsistencies found while exporting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("Duplicate definition name: {name}")]
    DuplicateDefinition { name: String },

    #[error("Unresolved reference in {definition}.{field}: {target}{}", suggestion_suffix(.suggestion))]
    UnresolvedReference {
        definition: String,
        field: String,
        target: String,
        suggestion: Option<String>,
    },

    #[error("Unresolved base of {definition}: {base}{}", suggestion_suffix(.suggestion))]
    UnresolvedBase {
        definition: String,
        base: String,
        suggestion: Option<String>,
    },

    #[error("{definition} extends concrete definition {base}; only abstract definitions can be extended")]
    ConcreteBase { definition: String, base: String },

    #[error("{definition}.{field} references abstract definition {target}")]
    AbstractReference {
        definition: String,
        field: String,
        target: String,
    },

    #[error("Inheritance cycle involving {definition}")]
    InheritanceCycle { definition: String },

    #[error("{definition} redeclares field '{field}' inherited from {base}")]
    FieldOverride {
        definition: String,
        field: String,
        base: String,
    },

    #[error("{definition} declares field '{field}' more than once")]
    DuplicateField { definition: String, field: String },

    #[error("{definition} declares the reserved discriminator field '{field}'")]
    ReservedField { definition: String, field: String },

    #[error("Discriminator collision in family {family}: '{literal}' is used by {first} and {second}")]
    DiscriminatorCollision {
        family: String,
        literal: String,
        first: String,
        second: String,
    },

    #[error("Family {family} has unknown root {root}")]
    UnknownRoot { family: String, root: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean {}?)", name),
        None => String::new(),
    }
}
