//! Schema Exporter
//!
//! Builds every family's documents from the registry and writes them into the
//! docs directory. All documents are rendered in memory before the first byte
//! is written, so a registry error never leaves a partial export behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::info;

use crate::checksum::{ChecksumManifest, CHECKSUMS_FILE};
use crate::config::{ExportConfig, OutputFormat};
use crate::document::{DocumentBuilder, DocumentInfo, FamilyBundle};
use crate::error::{Error, ExportError, Result};
use crate::model::{Family, ModelRegistry, ReferenceGraph};

/// Rendered bytes of one output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// What an export run wrote
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub checksums: ChecksumManifest,
}

/// A generated file whose content on disk differs from a fresh render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    pub file: String,
    pub missing: bool,
    /// Unified diff from the file on disk to the fresh render
    pub diff: String,
}

/// Registry to documents
pub struct SchemaExporter<'r> {
    registry: &'r ModelRegistry,
    info: DocumentInfo,
    options: ExportConfig,
}

impl<'r> SchemaExporter<'r> {
    pub fn new(registry: &'r ModelRegistry, info: DocumentInfo) -> Self {
        Self {
            registry,
            info,
            options: ExportConfig::default(),
        }
    }

    pub fn with_options(mut self, options: ExportConfig) -> Self {
        self.options = options;
        self
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Every document of one family
    pub fn build_family(&self, family: &Family) -> std::result::Result<FamilyBundle, ExportError> {
        let graph = ReferenceGraph::build(self.registry)?;
        self.build_with(&graph, family)
    }

    /// Every family, after a single registry-wide consistency check
    pub fn build_all(&self) -> std::result::Result<Vec<FamilyBundle>, ExportError> {
        let graph = ReferenceGraph::build(self.registry)?;
        graph.check_families(self.registry)?;
        self.registry
            .families()
            .iter()
            .map(|family| self.build_with(&graph, family))
            .collect()
    }

    fn build_with(
        &self,
        graph: &ReferenceGraph,
        family: &Family,
    ) -> std::result::Result<FamilyBundle, ExportError> {
        let members = graph.check_family(self.registry, family)?;
        tracing::debug!("{} closure: {} definitions", family.name, members.len());
        Ok(DocumentBuilder::new(self.registry, &self.info).build(family, &members))
    }

    /// All output files in memory, per family, plus the checksum manifest
    pub fn render(&self) -> Result<(Vec<Vec<RenderedFile>>, ChecksumManifest)> {
        let bundles = self.build_all()?;
        let pretty = self.options.output_format == OutputFormat::Pretty;

        let mut manifest = ChecksumManifest::new();
        let mut families = Vec::with_capacity(bundles.len());
        for bundle in &bundles {
            let mut files = Vec::with_capacity(bundle.documents.len());
            for document in &bundle.documents {
                let bytes = document.to_bytes(pretty)?;
                manifest.insert(document.file_name(), &bytes);
                files.push(RenderedFile { name: document.file_name(), bytes });
            }
            families.push(files);
        }
        Ok((families, manifest))
    }

    /// Write every document (and the checksum manifest) into `output_dir`
    ///
    /// Families are written concurrently, one scoped thread each; the call
    /// returns only after every writer has finished.
    pub fn export_all(&self, output_dir: &Path) -> Result<ExportSummary> {
        let (families, checksums) = self.render()?;
        std::fs::create_dir_all(output_dir)?;

        let results: Vec<Result<Vec<PathBuf>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = families
                .iter()
                .map(|files| scope.spawn(move || write_family(output_dir, files)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(Error::Io(std::io::Error::new(
                            std::io::ErrorKind::Other,
                            "document writer panicked",
                        )))
                    })
                })
                .collect()
        });

        let mut written = Vec::new();
        for result in results {
            written.extend(result?);
        }

        if self.options.include_checksums {
            let path = output_dir.join(CHECKSUMS_FILE);
            write_atomic(&path, checksums.render().as_bytes())?;
            written.push(path);
        }

        info!("Exported {} files to {}", written.len(), output_dir.display());
        Ok(ExportSummary { files: written, checksums })
    }

    /// Render in memory and compare with what `output_dir` holds
    pub fn check_drift(&self, output_dir: &Path) -> Result<Vec<Drift>> {
        let (families, checksums) = self.render()?;
        let mut expected: Vec<RenderedFile> = families.into_iter().flatten().collect();
        if self.options.include_checksums {
            expected.push(RenderedFile {
                name: CHECKSUMS_FILE.to_string(),
                bytes: checksums.render().into_bytes(),
            });
        }

        let mut drifted = Vec::new();
        for file in expected {
            let path = output_dir.join(&file.name);
            let on_disk = match std::fs::read(&path) {
                Ok(bytes) => Some(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                Err(e) => return Err(e.into()),
            };
            if on_disk.as_deref() == Some(file.bytes.as_slice()) {
                continue;
            }
            let old = on_disk
                .as_deref()
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            let new = String::from_utf8_lossy(&file.bytes);
            let diff = TextDiff::from_lines(old.as_ref(), new.as_ref())
                .unified_diff()
                .context_radius(3)
                .header(&format!("a/{}", file.name), &format!("b/{}", file.name))
                .to_string();
            drifted.push(Drift {
                missing: on_disk.is_none(),
                file: file.name,
                diff,
            });
        }
        Ok(drifted)
    }
}

fn write_family(output_dir: &Path, files: &[RenderedFile]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = output_dir.join(&file.name);
        write_atomic(&path, &file.bytes)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Replace `path` with `bytes` through a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldType, ModelDefinition};

    fn tiny() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(
                ModelDefinition::concrete("Point2D", "point")
                    .field(FieldDef::required("x", FieldType::number(), "x")),
            )
            .add_family(Family::new("Geometry", &["Point2D"]));
        registry
    }

    #[test]
    fn test_export_writes_documents_and_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let registry = tiny();
        let exporter = SchemaExporter::new(&registry, DocumentInfo::new("v1.0.0"));
        let summary = exporter.export_all(dir.path()).unwrap();

        for name in ["geometry.json", "geometry_inheritance.json", "geometry_mapper.json"] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }
        assert!(!dir.path().join("geometry_redoc.json").exists());
        assert_eq!(summary.files.len(), 4);

        let manifest = ChecksumManifest::load(dir.path()).unwrap();
        assert_eq!(manifest, summary.checksums);
        assert!(manifest.verify_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_compact_output_without_checksums() {
        let dir = tempfile::tempdir().unwrap();
        let registry = tiny();
        let exporter = SchemaExporter::new(&registry, DocumentInfo::new("1.0.0")).with_options(
            ExportConfig {
                output_format: OutputFormat::Compact,
                include_checksums: false,
            },
        );
        exporter.export_all(dir.path()).unwrap();

        let text = std::fs::read_to_string(dir.path().join("geometry.json")).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!dir.path().join(CHECKSUMS_FILE).exists());
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        write_atomic(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_drift_detected_after_edit() {
        let dir = tempfile::tempdir().unwrap();
        let registry = tiny();
        let exporter = SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"));
        exporter.export_all(dir.path()).unwrap();
        assert!(exporter.check_drift(dir.path()).unwrap().is_empty());

        let path = dir.path().join("geometry.json");
        let edited = std::fs::read_to_string(&path).unwrap().replace("1.0.0", "0.9.0");
        std::fs::write(&path, edited).unwrap();
        std::fs::remove_file(dir.path().join("geometry_mapper.json")).unwrap();

        let drift = exporter.check_drift(dir.path()).unwrap();
        let files: Vec<&str> = drift.iter().map(|d| d.file.as_str()).collect();
        assert_eq!(files, vec!["geometry.json", "geometry_mapper.json"]);
        assert!(drift[0].diff.contains("-    \"version\": \"0.9.0\""));
        assert!(drift[0].diff.contains("+    \"version\": \"1.0.0\""));
        assert!(drift[1].missing);
    }

    #[test]
    fn test_unknown_root_fails_build() {
        let mut registry = tiny();
        registry.add_family(Family::new("Display", &["DisplayPoint2D"]));
        let exporter = SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"));
        assert!(matches!(
            exporter.build_all(),
            Err(ExportError::UnknownRoot { .. })
        ));
    }
}
