//! Catalog Tests
//!
//! End-to-end checks over the built-in catalog: export determinism, document
//! agreement, checksums and payload validation against the fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use display_schemas::checksum::CHECKSUMS_FILE;
use display_schemas::document::SCHEMA_PREFIX;
use display_schemas::{
    catalog, ChecksumManifest, DocumentInfo, DocumentShape, Error, ExportError, Family, FieldDef,
    FieldType, Geometry, ModelDefinition, ModelRegistry, PayloadValidator, SchemaExporter,
};
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixtures(kind: &str) -> Vec<(String, Value)> {
    let mut entries: Vec<PathBuf> = fs::read_dir(fixtures_path().join(kind))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    entries.sort();
    entries
        .into_iter()
        .map(|path| {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            let value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
            (name, value)
        })
        .collect()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn compile_for(document: &Value, name: &str) -> JSONSchema {
    let schema = json!({
        "allOf": [{ "$ref": format!("{}{}", SCHEMA_PREFIX, name) }],
        "components": document["components"],
    });
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .unwrap()
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn test_catalog_is_consistent() {
    let registry = catalog::registry();
    registry.check().unwrap();

    let names: Vec<&str> = registry.families().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Visualization", "Geometry", "Display"]);
}

#[test]
fn test_export_is_deterministic() {
    let registry = catalog::registry();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    let exporter = SchemaExporter::new(&registry, DocumentInfo::new("v2.3.0"));
    let summary = exporter.export_all(first.path()).unwrap();
    exporter.export_all(second.path()).unwrap();

    for path in &summary.files {
        let name = path.file_name().unwrap();
        assert_eq!(
            fs::read(path).unwrap(),
            fs::read(second.path().join(name)).unwrap(),
            "{:?} differs between runs",
            name
        );
    }
    assert!(exporter.check_drift(first.path()).unwrap().is_empty());
}

#[test]
fn test_documents_carry_version() {
    let registry = catalog::registry();
    let dir = tempfile::tempdir().unwrap();
    SchemaExporter::new(&registry, DocumentInfo::new("v2.3.0"))
        .export_all(dir.path())
        .unwrap();

    for name in ["geometry.json", "display_inheritance.json", "visualization_redoc.json"] {
        let document = read_json(&dir.path().join(name));
        assert_eq!(document["info"]["version"], json!("2.3.0"), "{}", name);
        assert_eq!(document["openapi"], json!("3.0.2"), "{}", name);
    }
}

#[test]
fn test_mapper_covers_every_geometry() {
    let registry = catalog::registry();
    let dir = tempfile::tempdir().unwrap();
    SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"))
        .export_all(dir.path())
        .unwrap();

    let mapper = read_json(&dir.path().join("geometry_mapper.json"));
    for name in Geometry::TYPE_NAMES {
        assert_eq!(mapper["mapping"][*name], json!(*name), "{} not mapped", name);
    }
}

#[test]
fn test_tampered_document_fails_checksums() {
    let registry = catalog::registry();
    let dir = tempfile::tempdir().unwrap();
    SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"))
        .export_all(dir.path())
        .unwrap();

    let manifest = ChecksumManifest::load(dir.path()).unwrap();
    assert!(manifest.verify_dir(dir.path()).unwrap().is_empty());
    assert!(manifest.get("display_mapper.json").is_some());

    let path = dir.path().join("display.json");
    let tampered = fs::read_to_string(&path).unwrap().replace("Surface", "Shaded");
    fs::write(&path, tampered).unwrap();

    let mismatches = manifest.verify_dir(dir.path()).unwrap();
    assert_eq!(mismatches.len(), 1);
    assert!(mismatches[0].to_string().contains("display.json"));
}

#[test]
fn test_collision_writes_nothing() {
    let point = |name: &str| {
        ModelDefinition::concrete(name, "point")
            .field(FieldDef::required("x", FieldType::number(), "x"))
    };
    let mut registry = ModelRegistry::new();
    registry
        .add_model(point("Point2D"))
        .add_model(point("Other").tagged("Point2D"))
        .add_family(Family::new("Geometry", &["Point2D", "Other"]));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("docs");
    let result = SchemaExporter::new(&registry, DocumentInfo::new("1.0.0")).export_all(&out);

    match result {
        Err(Error::SchemaExport(ExportError::DiscriminatorCollision { literal, .. })) => {
            assert_eq!(literal, "Point2D");
        }
        other => panic!("Expected DiscriminatorCollision, got {:?}", other.map(|s| s.files)),
    }
    assert!(!out.join("geometry.json").exists());
    assert!(!out.join(CHECKSUMS_FILE).exists());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_valid_fixtures_pass() {
    let registry = catalog::registry();
    let validator = PayloadValidator::new(&registry).unwrap();

    for (name, payload) in fixtures("valid") {
        let literal = payload["type"].as_str().unwrap().to_string();
        match validator.validate(&payload) {
            Ok(model) => assert_eq!(model, literal, "{}", name),
            Err(e) => panic!("{} rejected: {}", name, e),
        }
    }
}

#[test]
fn test_invalid_fixtures_fail() {
    let registry = catalog::registry();
    let validator = PayloadValidator::new(&registry).unwrap();

    let expected = [
        ("analysis_misaligned.json", "does not align"),
        ("graphic_no_bounds.json", "min_point and max_point"),
        ("mesh_colors.json", "number of colors (3)"),
        ("unknown_field.json", "'w' was unexpected"),
    ];
    let invalid = fixtures("invalid");
    assert_eq!(invalid.len(), expected.len());

    for ((name, payload), (expected_name, needle)) in invalid.iter().zip(expected) {
        assert_eq!(name, expected_name);
        match validator.validate(payload) {
            Err(Error::Validation { errors, .. }) => {
                assert!(
                    errors.iter().any(|e| e.contains(needle)),
                    "{}: {:?} does not mention {:?}",
                    name,
                    errors,
                    needle
                );
            }
            other => panic!("{} should fail validation, got {:?}", name, other),
        }
    }
}

#[test]
fn test_validate_file_names_the_path() {
    let registry = catalog::registry();
    let validator = PayloadValidator::new(&registry).unwrap();
    let path = fixtures_path().join("invalid/mesh_colors.json");

    match validator.validate_file(&path) {
        Err(Error::Validation { target, errors }) => {
            assert!(target.ends_with("mesh_colors.json (DisplayMesh3D)"), "{}", target);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("/: "), "{}", errors[0]);
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
}

#[test]
fn test_flat_and_inheritance_agree() {
    let registry = catalog::registry();
    let dir = tempfile::tempdir().unwrap();
    SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"))
        .export_all(dir.path())
        .unwrap();

    let mut payloads = fixtures("valid");
    payloads.extend(fixtures("invalid"));

    let mut compared = 0;
    for family in registry.families() {
        let slug = family.slug();
        let flat = read_json(&dir.path().join(DocumentShape::Flat.file_name(&slug)));
        let inheritance = read_json(&dir.path().join(DocumentShape::Inheritance.file_name(&slug)));

        for (name, payload) in &payloads {
            let literal = payload["type"].as_str().unwrap();
            if flat["components"]["schemas"].get(literal).is_none() {
                continue;
            }
            let flat_ok = compile_for(&flat, literal).is_valid(payload);
            let inheritance_ok = compile_for(&inheritance, literal).is_valid(payload);
            assert_eq!(flat_ok, inheritance_ok, "{} in {} disagrees", name, family.name);
            compared += 1;
        }
    }
    assert!(compared >= 6, "only {} comparisons made", compared);
}

#[test]
fn test_flat_and_inheritance_reject_alike() {
    let registry = catalog::registry();
    let validator = PayloadValidator::new(&registry).unwrap();
    let dir = tempfile::tempdir().unwrap();
    SchemaExporter::new(&registry, DocumentInfo::new("1.0.0"))
        .export_all(dir.path())
        .unwrap();

    let cases = fixtures("rejected");
    assert_eq!(cases.len(), 5);

    for (name, case) in &cases {
        let model = case["model"].as_str().unwrap();
        let payload = &case["payload"];
        assert!(
            matches!(validator.validate_as(model, payload), Err(Error::Validation { .. })),
            "{} accepted as {}",
            name,
            model
        );

        let mut compared = 0;
        for family in registry.families() {
            let slug = family.slug();
            let flat = read_json(&dir.path().join(DocumentShape::Flat.file_name(&slug)));
            if flat["components"]["schemas"].get(model).is_none() {
                continue;
            }
            let inheritance =
                read_json(&dir.path().join(DocumentShape::Inheritance.file_name(&slug)));
            assert!(!compile_for(&flat, model).is_valid(payload), "{}: flat accepts", name);
            assert!(
                !compile_for(&inheritance, model).is_valid(payload),
                "{}: inheritance accepts in {}",
                name,
                family.name
            );
            compared += 1;
        }
        assert!(compared > 0, "{}: {} is in no family", name, model);
    }
}
