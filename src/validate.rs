//! Payload validation
//!
//! A payload is checked in two passes: against the flat (closed) schema of
//! the definition its `type` names, then against the cross-field rules the
//! schema cannot express. The second pass follows the declared field types,
//! so objects inside free-form dictionaries are never treated as models.

use std::collections::HashMap;
use std::path::Path;

use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::document::{DocumentBuilder, DocumentInfo, DocumentShape, SCHEMA_PREFIX};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::model::{
    Family, FieldType, ModelDefinition, ModelRegistry, ReferenceGraph, DISCRIMINATOR,
};

/// Validates JSON payloads against the registry's definitions
pub struct PayloadValidator<'r> {
    registry: &'r ModelRegistry,
    index: HashMap<&'r str, &'r ModelDefinition>,
    components: Value,
}

impl<'r> PayloadValidator<'r> {
    pub fn new(registry: &'r ModelRegistry) -> Result<Self> {
        ReferenceGraph::build(registry)?;

        // One flat document over every definition, families or not
        let roots: Vec<&str> = registry
            .models()
            .iter()
            .filter_map(ModelDefinition::discriminator)
            .collect();
        let members = registry.definition_names();
        let info = DocumentInfo::new(env!("CARGO_PKG_VERSION"));
        let bundle = DocumentBuilder::new(registry, &info)
            .build(&Family::new("Payloads", &roots), &members);
        let components = bundle
            .get(DocumentShape::Flat)
            .and_then(|document| document.content.get("components"))
            .cloned()
            .unwrap_or_else(|| json!({ "schemas": {} }));

        Ok(Self {
            registry,
            index: registry.discriminator_index(),
            components,
        })
    }

    /// Validate a payload, dispatching on its `type`; returns the definition name
    pub fn validate(&self, payload: &Value) -> Result<&'r str> {
        let literal = payload
            .get(DISCRIMINATOR)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Validation {
                target: "payload".to_string(),
                errors: vec![format!("missing string '{}' field", DISCRIMINATOR)],
            })?;
        let model: &'r ModelDefinition = *self.index.get(literal).ok_or_else(|| Error::Validation {
            target: literal.to_string(),
            errors: vec![format!("unknown type '{}'", literal)],
        })?;
        self.validate_as(&model.name, payload)?;
        Ok(model.name.as_str())
    }

    /// Validate a payload against a named definition
    pub fn validate_as(&self, name: &str, payload: &Value) -> Result<()> {
        let schema = json!({
            "allOf": [{ "$ref": format!("{}{}", SCHEMA_PREFIX, name) }],
            "components": self.components,
        });
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .map_err(|e| Error::Validation {
                target: name.to_string(),
                errors: vec![format!("schema does not compile: {}", e)],
            })?;

        let mut errors: Vec<String> = match compiled.validate(payload) {
            Ok(()) => Vec::new(),
            Err(found) => found
                .map(|e| format!("{}: {}", pointer_or_root(&e.instance_path.to_string()), e))
                .collect(),
        };
        if errors.is_empty() {
            errors = self.cross_field_errors(payload);
        }

        if errors.is_empty() {
            debug!("{} payload valid", name);
            Ok(())
        } else {
            Err(Error::Validation { target: name.to_string(), errors })
        }
    }

    /// Validate the payload stored in a JSON file
    pub fn validate_file(&self, path: &Path) -> Result<&'r str> {
        let text = std::fs::read_to_string(path)?;
        let payload: Value = serde_json::from_str(&text)?;
        self.validate(&payload).map_err(|e| match e {
            Error::Validation { target, errors } => Error::Validation {
                target: format!("{} ({})", path.display(), target),
                errors,
            },
            other => other,
        })
    }
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}

impl PayloadValidator<'_> {
    /// Cross-field rule violations in `payload` and every typed object below it
    pub fn cross_field_errors(&self, payload: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        self.walk_object(payload, "", &mut errors);
        errors
    }

    fn walk_object(&self, value: &Value, path: &str, errors: &mut Vec<String>) {
        let Some(object) = value.as_object() else {
            return;
        };
        let Some(model) = object
            .get(DISCRIMINATOR)
            .and_then(Value::as_str)
            .and_then(|literal| self.index.get(literal))
        else {
            return;
        };

        if let Err(message) = check_object(&model.name, object) {
            errors.push(format!("{}: {}", pointer_or_root(path), message));
        }
        for field in self.registry.all_fields(model) {
            if let Some(child) = object.get(&field.name) {
                self.walk_field(child, &field.ty, &format!("{}/{}", path, field.name), errors);
            }
        }
    }

    fn walk_field(&self, value: &Value, ty: &FieldType, path: &str, errors: &mut Vec<String>) {
        match ty {
            FieldType::Ref { .. } => self.walk_object(value, path, errors),
            FieldType::Array { items, .. } => {
                if let Some(list) = value.as_array() {
                    for (i, child) in list.iter().enumerate() {
                        self.walk_field(child, items, &format!("{}/{}", path, i), errors);
                    }
                }
            }
            FieldType::Union { variants } => {
                // Arrays go to the array alternative, objects through the discriminator
                let variant = variants.iter().find(|variant| match variant {
                    FieldType::Array { .. } => value.is_array(),
                    FieldType::Ref { .. } => value.is_object(),
                    _ => false,
                });
                if let Some(variant) = variant {
                    self.walk_field(value, variant, path, errors);
                }
            }
            // Dict contents are free-form
            _ => {}
        }
    }
}

fn check_object(literal: &str, object: &Map<String, Value>) -> std::result::Result<(), String> {
    match literal {
        "DisplayMesh2D" | "DisplayMesh3D" | "DisplayPolyface3D" => check_colors(object),
        "GraphicContainer" => check_graphic_container(object),
        "AnalysisGeometry" => check_analysis_geometry(object),
        _ => Ok(()),
    }
}

fn array_len(object: &Map<String, Value>, field: &str) -> Option<usize> {
    object.get(field).and_then(Value::as_array).map(Vec::len)
}

fn geometry(value: Option<&Value>) -> Option<Geometry> {
    value.and_then(|v| Geometry::from_value(v).ok())
}

/// Colors count must be 1, the face count or the vertex count
fn check_colors(object: &Map<String, Value>) -> std::result::Result<(), String> {
    let Some(colors) = array_len(object, "colors") else {
        return Ok(());
    };
    let Some(geo) = geometry(object.get("geometry")) else {
        return Ok(());
    };
    let faces = geo.face_count().unwrap_or_default();
    let vertices = geo.vertex_count().unwrap_or_default();
    if colors == 1 || colors == faces || colors == vertices {
        Ok(())
    } else {
        Err(format!(
            "number of colors ({}) does not match the number of faces ({}) nor the number of vertices ({})",
            colors, faces, vertices
        ))
    }
}

fn check_graphic_container(object: &Map<String, Value>) -> std::result::Result<(), String> {
    let values = array_len(object, "values").unwrap_or_default();
    let geo_value = object.get("geometry").filter(|v| !v.is_null());

    if let Some(geo) = geometry(geo_value) {
        if let (Some(faces), Some(vertices)) = (geo.face_count(), geo.vertex_count()) {
            if values == faces || values == vertices {
                return Ok(());
            }
            return Err(format!(
                "number of values ({}) does not match the number of faces ({}) nor the number of vertices ({})",
                values, faces, vertices
            ));
        }
    }

    let has = |field: &str| object.get(field).map_or(false, |v| !v.is_null());
    if !has("min_point") || !has("max_point") {
        return Err(
            "min_point and max_point are required unless geometry is a mesh or polyface".to_string(),
        );
    }
    if let Some(list) = geo_value.and_then(Value::as_array) {
        if list.len() != values {
            return Err(format!(
                "expected one value per geometry: {} values for {} geometries",
                values,
                list.len()
            ));
        }
    }
    Ok(())
}

fn check_analysis_geometry(object: &Map<String, Value>) -> std::result::Result<(), String> {
    let geos: Vec<&Value> = object
        .get("geometry")
        .and_then(Value::as_array)
        .map(|list| list.iter().collect())
        .unwrap_or_default();
    let (mut faces, mut vertices) = (0, 0);
    for geo in geos.iter().filter_map(|v| geometry(Some(v))).filter(Geometry::is_mesh) {
        faces += geo.face_count().unwrap_or_default();
        vertices += geo.vertex_count().unwrap_or_default();
    }

    let lengths: Vec<usize> = object
        .get("data_sets")
        .and_then(Value::as_array)
        .map(|sets| {
            sets.iter()
                .map(|set| set.get("values").and_then(Value::as_array).map_or(0, Vec::len))
                .collect()
        })
        .unwrap_or_default();
    let Some(&first) = lengths.first() else {
        return Ok(());
    };

    if ![geos.len(), faces, vertices].contains(&first) {
        return Err(format!(
            "number of values ({}) does not align with the number of geometries ({}), mesh faces ({}) or mesh vertices ({})",
            first,
            geos.len(),
            faces,
            vertices
        ));
    }
    if let Some(other) = lengths.iter().find(|len| **len != first) {
        return Err(format!(
            "all data sets must have the same length: {} != {}",
            other, first
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross_field_errors(payload: &Value) -> Vec<String> {
        let registry = crate::catalog::registry();
        let validator = PayloadValidator::new(&registry).unwrap();
        validator.cross_field_errors(payload)
    }

    fn square_mesh() -> Value {
        json!({
            "type": "Mesh3D",
            "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0], [2, 0, 0], [2, 1, 0]],
            "faces": [[0, 1, 2, 3], [1, 4, 5, 2]]
        })
    }

    #[test]
    fn test_valid_point() {
        let registry = crate::catalog::registry();
        let validator = PayloadValidator::new(&registry).unwrap();
        let name = validator
            .validate(&json!({"type": "Point3D", "x": 0, "y": 1.5, "z": -2}))
            .unwrap();
        assert_eq!(name, "Point3D");
    }

    #[test]
    fn test_schema_errors_reported() {
        let registry = crate::catalog::registry();
        let validator = PayloadValidator::new(&registry).unwrap();
        match validator.validate(&json!({"type": "Point3D", "x": 0, "y": 1, "w": 3})) {
            Err(Error::Validation { target, errors }) => {
                assert_eq!(target, "Point3D");
                assert!(!errors.is_empty());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let registry = crate::catalog::registry();
        let validator = PayloadValidator::new(&registry).unwrap();
        assert!(validator.validate(&json!({"type": "Hexagon"})).is_err());
        assert!(validator.validate(&json!({"x": 1})).is_err());
    }

    #[test]
    fn test_mesh_colors_align() {
        let mut payload = json!({
            "type": "DisplayMesh3D",
            "geometry": square_mesh(),
            "colors": [{"r": 255, "g": 0, "b": 0}, {"r": 0, "g": 0, "b": 255}]
        });
        assert!(cross_field_errors(&payload).is_empty());

        payload["colors"] = json!([
            {"r": 1, "g": 1, "b": 1}, {"r": 2, "g": 2, "b": 2}, {"r": 3, "g": 3, "b": 3}
        ]);
        let errors = cross_field_errors(&payload);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/: number of colors (3)"));
    }

    #[test]
    fn test_graphic_container_rules() {
        let on_mesh = json!({"type": "GraphicContainer", "values": [1, 2], "geometry": square_mesh()});
        assert!(cross_field_errors(&on_mesh).is_empty());

        let no_bounds = json!({
            "type": "GraphicContainer",
            "values": [1],
            "geometry": [{"type": "Point3D", "x": 0, "y": 0, "z": 0}]
        });
        assert_eq!(cross_field_errors(&no_bounds).len(), 1);

        let misaligned = json!({
            "type": "GraphicContainer",
            "values": [1, 2, 3],
            "min_point": {"type": "Point3D", "x": 0, "y": 0, "z": 0},
            "max_point": {"type": "Point3D", "x": 1, "y": 1, "z": 1},
            "geometry": [{"type": "Point3D", "x": 0, "y": 0, "z": 0}]
        });
        assert!(cross_field_errors(&misaligned)[0].contains("one value per geometry"));
    }

    #[test]
    fn test_analysis_geometry_rules_apply_when_nested() {
        let set = json!({
            "type": "VisualizationSet",
            "identifier": "Set_1",
            "geometry": [{
                "type": "AnalysisGeometry",
                "identifier": "Grid_1",
                "geometry": [square_mesh()],
                "data_sets": [
                    {"type": "VisualizationData", "values": [1, 2]},
                    {"type": "VisualizationData", "values": [1, 2, 3]}
                ]
            }]
        });
        let errors = cross_field_errors(&set);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/geometry/0: all data sets"));
    }

    #[test]
    fn test_user_data_is_not_checked_as_a_model() {
        let registry = crate::catalog::registry();
        let validator = PayloadValidator::new(&registry).unwrap();
        let payload = json!({
            "type": "DisplayPoint3D",
            "geometry": {"type": "Point3D", "x": 0, "y": 0, "z": 0},
            "color": {"r": 1, "g": 2, "b": 3},
            "user_data": {
                "type": "GraphicContainer",
                "note": "anything",
                "nested": [{"type": "DisplayMesh3D", "colors": [1, 2, 3]}]
            }
        });
        assert_eq!(validator.validate(&payload).unwrap(), "DisplayPoint3D");
        assert!(validator.cross_field_errors(&payload).is_empty());
    }

    #[test]
    fn test_union_list_geometry_is_followed() {
        let misaligned = json!({
            "type": "GraphicContainer",
            "values": [1, 2],
            "geometry": [{
                "type": "Mesh3D",
                "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0]],
                "faces": [[0, 1, 2]],
                "user_data": {"type": "GraphicContainer"}
            }],
            "min_point": {"type": "Point3D", "x": 0, "y": 0, "z": 0},
            "max_point": {"type": "Point3D", "x": 1, "y": 1, "z": 0}
        });
        let errors = cross_field_errors(&misaligned);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("/: expected one value per geometry"));
    }
}
