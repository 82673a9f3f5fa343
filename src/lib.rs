//! Display Schemas
//!
//! Data-model schemas for geometry, display and visualization objects, with
//! the tooling that ships them: JSON Schema (OpenAPI 3) export, HTML docs,
//! payload validation and a commit-driven release pipeline.
//!
//! ## Features
//!
//! - **Model Registry**: Declaration-ordered definitions with inheritance and
//!   `type` discriminators, checked for consistency before any export
//! - **Schema Export**: Flat, inheritance, mapper and redoc documents per
//!   family, written atomically with SHA256 checksums
//! - **Doc Publishing**: One HTML page per family plus an index
//! - **Validation**: Payloads checked against the flat schemas and the
//!   cross-field rules of meshes, graphic containers and analysis geometry
//! - **Release Pipeline**: Conventional commits to semver, release notes,
//!   asset upload and deployment
//!
//! ## Architecture
//!
//! ```text
//! docs/
//! ├── geometry.json               flat, closed definitions
//! ├── geometry_inheritance.json   allOf-composed definitions
//! ├── geometry_mapper.json        discriminator -> definition
//! ├── display.json ...
//! ├── visualization_redoc.json
//! ├── geometry.html ... index.html
//! └── checksums.sha256
//! ```

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod docs;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod release;
pub mod validate;
pub mod version;

pub use checksum::{Checksum, ChecksumManifest};
pub use config::SchemaConfig;
pub use docs::DocPublisher;
pub use document::{DocumentInfo, DocumentShape, FamilyBundle, SchemaDocument};
pub use error::{Error, ExportError, Result};
pub use export::SchemaExporter;
pub use geometry::Geometry;
pub use model::{Family, FieldDef, FieldType, ModelDefinition, ModelRegistry};
pub use release::{ReleaseOutcome, ReleasePipeline, ReleaseState};
pub use validate::PayloadValidator;
pub use version::{ReleaseType, ReleaseVersion};
