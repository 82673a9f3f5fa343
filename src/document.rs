//! Schema Documents
//!
//! Rendering of registry definitions into OpenAPI 3 / JSON Schema documents.
//! One traversal over a family's ordered members yields every shape, so the
//! flat, inheritance, redoc and mapper documents can never disagree about
//! which definitions exist.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::model::{
    Definition, EnumDefinition, Family, FieldDef, FieldType, ModelDefinition, ModelRegistry,
    DISCRIMINATOR,
};

/// OpenAPI version written into every wrapper document
pub const OPENAPI_VERSION: &str = "3.0.2";

pub const SCHEMA_PREFIX: &str = "#/components/schemas/";

/// The shapes a family is exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    /// Every concrete definition fully expanded
    Flat,
    /// Bases emitted once and referenced through `allOf`
    Inheritance,
    /// Discriminator literal to definition name
    Mapper,
    /// Inheritance without discriminator annotations
    Redoc,
}

impl DocumentShape {
    pub const ALL: [DocumentShape; 4] = [
        DocumentShape::Flat,
        DocumentShape::Inheritance,
        DocumentShape::Mapper,
        DocumentShape::Redoc,
    ];

    /// File name of this shape for a family slug
    pub fn file_name(&self, slug: &str) -> String {
        match self {
            DocumentShape::Flat => format!("{}.json", slug),
            DocumentShape::Inheritance => format!("{}_inheritance.json", slug),
            DocumentShape::Mapper => format!("{}_mapper.json", slug),
            DocumentShape::Redoc => format!("{}_redoc.json", slug),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    pub url: String,
    #[serde(rename = "altText")]
    pub alt_text: String,
}

/// Metadata stamped into the `info` block of every wrapper document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Version label without a leading `v`
    pub version: String,
    /// Prepended to the family name in titles ("Ladybug Geometry Schema")
    pub title_prefix: String,
    pub contact: Contact,
    pub license: License,
    pub logo: Logo,
}

impl DocumentInfo {
    /// Default metadata for the given version label
    pub fn new(version: &str) -> Self {
        Self {
            version: normalize_version(version),
            title_prefix: "Ladybug".to_string(),
            contact: Contact {
                name: "Ladybug Tools".to_string(),
                email: "info@ladybug.tools".to_string(),
                url: "https://github.com/ladybug-tools/ladybug-display-core".to_string(),
            },
            license: License {
                name: "MIT".to_string(),
                url: "https://github.com/ladybug-tools/ladybug-display-schema/blob/master/LICENSE"
                    .to_string(),
            },
            logo: Logo {
                url: "https://www.ladybug.tools/assets/img/ladybug-large.png".to_string(),
                alt_text: "Ladybug logo".to_string(),
            },
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = normalize_version(version);
        self
    }

    fn title(&self, family: &Family) -> String {
        format!("{} {} Schema", self.title_prefix, family.name)
    }
}

/// Strip a leading `v` from a version label (`v2.3.0` -> `2.3.0`)
pub fn normalize_version(label: &str) -> String {
    let label = label.trim();
    label.strip_prefix('v').unwrap_or(label).to_string()
}

/// One generated document
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Family slug
    pub family: String,
    pub shape: DocumentShape,
    pub content: Value,
}

impl SchemaDocument {
    pub fn file_name(&self) -> String {
        self.shape.file_name(&self.family)
    }

    /// Serialized bytes, newline terminated
    pub fn to_bytes(&self, pretty: bool) -> Result<Vec<u8>> {
        let mut bytes = if pretty {
            serde_json::to_vec_pretty(&self.content)?
        } else {
            serde_json::to_vec(&self.content)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Every document of one family
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyBundle {
    pub family: Family,
    pub documents: Vec<SchemaDocument>,
}

impl FamilyBundle {
    pub fn get(&self, shape: DocumentShape) -> Option<&SchemaDocument> {
        self.documents.iter().find(|d| d.shape == shape)
    }
}

/// Renders registry definitions into documents
pub struct DocumentBuilder<'r> {
    registry: &'r ModelRegistry,
    info: &'r DocumentInfo,
}

impl<'r> DocumentBuilder<'r> {
    pub fn new(registry: &'r ModelRegistry, info: &'r DocumentInfo) -> Self {
        Self { registry, info }
    }

    /// Build every shape of `family` from its ordered member list
    pub fn build(&self, family: &Family, members: &[&str]) -> FamilyBundle {
        let slug = family.slug();
        let mut flat = Map::new();
        let mut inheritance = Map::new();
        let mut redoc = Map::new();
        let mut mapping = Map::new();
        let mut families = Map::new();

        for name in members {
            match self.registry.get(name) {
                Some(Definition::Enum(definition)) => {
                    let schema = enum_schema(definition);
                    flat.insert(definition.name.clone(), schema.clone());
                    inheritance.insert(definition.name.clone(), schema.clone());
                    redoc.insert(definition.name.clone(), schema);
                }
                Some(Definition::Model(model)) => {
                    tracing::debug!("Rendering {} for {}", model.name, family.name);
                    if let Some(literal) = model.discriminator() {
                        flat.insert(model.name.clone(), self.flat_model(model));
                        mapping.insert(literal.to_string(), json!(model.name));
                    } else {
                        let concrete: Vec<Value> = self
                            .registry
                            .descendants(&model.name)
                            .into_iter()
                            .filter(|m| members.contains(&m.name.as_str()))
                            .map(|m| json!(m.name))
                            .collect();
                        families.insert(model.name.clone(), Value::Array(concrete));
                    }
                    inheritance.insert(model.name.clone(), self.inheritance_model(model, true));
                    redoc.insert(model.name.clone(), self.inheritance_model(model, false));
                }
                None => {}
            }
        }

        let mut documents = vec![
            SchemaDocument {
                family: slug.clone(),
                shape: DocumentShape::Flat,
                content: self.wrap(family, DocumentShape::Flat, flat),
            },
            SchemaDocument {
                family: slug.clone(),
                shape: DocumentShape::Inheritance,
                content: self.wrap(family, DocumentShape::Inheritance, inheritance),
            },
            SchemaDocument {
                family: slug.clone(),
                shape: DocumentShape::Mapper,
                content: json!({
                    "propertyName": DISCRIMINATOR,
                    "mapping": mapping,
                    "families": families,
                }),
            },
        ];
        if family.redoc {
            documents.push(SchemaDocument {
                family: slug,
                shape: DocumentShape::Redoc,
                content: self.wrap(family, DocumentShape::Redoc, redoc),
            });
        }

        FamilyBundle { family: family.clone(), documents }
    }

    /// OpenAPI wrapper around a set of component schemas
    fn wrap(&self, family: &Family, shape: DocumentShape, schemas: Map<String, Value>) -> Value {
        let slug = family.slug();
        let description = match shape {
            DocumentShape::Flat => format!("{} {} schema.", self.info.title_prefix, slug),
            _ => format!("Documentation for {} {} schema", self.info.title_prefix, slug),
        };
        let tags: Vec<Value> = family
            .roots
            .iter()
            .map(|root| {
                json!({
                    "name": root.to_lowercase(),
                    "x-displayName": root,
                    "description": format!(
                        "<SchemaDefinition schemaRef=\"{}{}\" />",
                        SCHEMA_PREFIX, root
                    ),
                })
            })
            .collect();
        let tag_names: Vec<String> = family.roots.iter().map(|r| r.to_lowercase()).collect();

        json!({
            "openapi": OPENAPI_VERSION,
            "info": {
                "title": self.info.title(family),
                "description": description,
                "version": self.info.version,
                "contact": self.info.contact,
                "license": self.info.license,
                "x-logo": self.info.logo,
            },
            "externalDocs": {
                "description": "OpenAPI Specification with Inheritance",
                "url": format!("./{}", DocumentShape::Inheritance.file_name(&slug)),
            },
            "tags": tags,
            "x-tagGroups": [{ "name": "Models", "tags": tag_names }],
            "paths": {},
            "components": { "schemas": schemas },
        })
    }

    /// Closed, fully expanded object schema
    fn flat_model(&self, model: &ModelDefinition) -> Value {
        let fields = self.registry.all_fields(model);
        let mut schema = self.object_part(model, &fields, false);
        schema.insert("title".into(), json!(model.name));
        schema.insert("description".into(), json!(model.description));
        schema.insert("additionalProperties".into(), json!(false));
        Value::Object(schema)
    }

    /// Own fields only, with the base pulled in through `allOf`
    fn inheritance_model(&self, model: &ModelDefinition, annotate: bool) -> Value {
        let own: Vec<&FieldDef> = model.fields.iter().collect();
        let Some(base) = model.base.as_deref() else {
            let mut schema = self.object_part(model, &own, annotate);
            schema.insert("title".into(), json!(model.name));
            schema.insert("description".into(), json!(model.description));
            if !model.is_abstract() {
                schema.insert("additionalProperties".into(), json!(false));
            }
            return Value::Object(schema);
        };

        let mut part = self.object_part(model, &own, annotate);
        if !model.is_abstract() {
            let mut names: Vec<Value> = vec![json!(DISCRIMINATOR)];
            names.extend(self.registry.all_fields(model).iter().map(|f| json!(f.name)));
            part.insert("propertyNames".into(), json!({ "enum": names }));
        }
        json!({
            "title": model.name,
            "description": model.description,
            "allOf": [schema_ref(base), Value::Object(part)],
        })
    }

    /// `type: object` with properties and required list for the given fields
    fn object_part(
        &self,
        model: &ModelDefinition,
        fields: &[&FieldDef],
        annotate: bool,
    ) -> Map<String, Value> {
        let mut properties = Map::new();
        if let Some(literal) = model.discriminator() {
            properties.insert(
                DISCRIMINATOR.to_string(),
                json!({
                    "title": "Type",
                    "default": literal,
                    "pattern": format!("^{}$", literal),
                    "type": "string",
                }),
            );
        }
        let mut required = Vec::new();
        for field in fields {
            properties.insert(field.name.clone(), self.field_schema(field, annotate));
            if field.required {
                required.push(json!(field.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".into(), Value::Array(required));
        }
        schema
    }

    fn field_schema(&self, field: &FieldDef, annotate: bool) -> Value {
        let schema = self.type_schema(&field.ty, annotate);
        // Draft 7 ignores siblings of $ref, so refs carrying metadata go through allOf
        let mut schema = match schema {
            Value::Object(map) if map.contains_key("$ref") => {
                let mut wrapped = Map::new();
                wrapped.insert("allOf".into(), json!([Value::Object(map)]));
                wrapped
            }
            Value::Object(map) => map,
            other => {
                let mut wrapped = Map::new();
                wrapped.insert("allOf".into(), json!([other]));
                wrapped
            }
        };
        schema.insert("title".into(), json!(title_case(&field.name)));
        schema.insert("description".into(), json!(field.description));
        if let Some(default) = &field.default {
            schema.insert("default".into(), default.clone());
        }
        Value::Object(schema)
    }

    /// JSON Schema for a field type; `annotate` adds OpenAPI discriminators
    pub fn type_schema(&self, ty: &FieldType, annotate: bool) -> Value {
        match ty {
            FieldType::Number { minimum, maximum } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("number"));
                if let Some(min) = minimum {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".into(), json!(max));
                }
                Value::Object(schema)
            }
            FieldType::Integer { minimum, maximum } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("integer"));
                if let Some(min) = minimum {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".into(), json!(max));
                }
                Value::Object(schema)
            }
            FieldType::String { pattern, min_length, max_length } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("string"));
                if let Some(pattern) = pattern {
                    schema.insert("pattern".into(), json!(pattern));
                }
                if let Some(min) = min_length {
                    schema.insert("minLength".into(), json!(min));
                }
                if let Some(max) = max_length {
                    schema.insert("maxLength".into(), json!(max));
                }
                Value::Object(schema)
            }
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Literal { value } => json!({ "type": "string", "enum": [value] }),
            FieldType::Array { items, min_items, max_items } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("array"));
                schema.insert("items".into(), self.type_schema(items, annotate));
                if let Some(min) = min_items {
                    schema.insert("minItems".into(), json!(min));
                }
                if let Some(max) = max_items {
                    schema.insert("maxItems".into(), json!(max));
                }
                Value::Object(schema)
            }
            FieldType::Ref { target } => schema_ref(target),
            FieldType::Union { variants } => {
                let any_of: Vec<Value> =
                    variants.iter().map(|v| self.type_schema(v, annotate)).collect();
                let mut schema = Map::new();
                schema.insert("anyOf".into(), Value::Array(any_of));
                if annotate {
                    if let Some(discriminator) = self.discriminator_for(variants) {
                        schema.insert("discriminator".into(), discriminator);
                    }
                }
                Value::Object(schema)
            }
            FieldType::Dict => json!({ "type": "object" }),
        }
    }

    /// OpenAPI discriminator object, when every variant is a concrete model
    fn discriminator_for(&self, variants: &[FieldType]) -> Option<Value> {
        let mut mapping = Map::new();
        for variant in variants {
            let FieldType::Ref { target } = variant else {
                return None;
            };
            let literal = self.registry.model(target)?.discriminator()?;
            mapping.insert(literal.to_string(), json!(format!("{}{}", SCHEMA_PREFIX, target)));
        }
        Some(json!({ "propertyName": DISCRIMINATOR, "mapping": mapping }))
    }
}

fn schema_ref(target: &str) -> Value {
    json!({ "$ref": format!("{}{}", SCHEMA_PREFIX, target) })
}

fn enum_schema(definition: &EnumDefinition) -> Value {
    json!({
        "title": definition.name,
        "description": definition.description,
        "enum": definition.values,
        "type": "string",
    })
}

/// `line_width` -> `Line Width`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumDefinition, ReferenceGraph};

    fn sample() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .add_enum(EnumDefinition::new("Mode", "modes", &["A", "B"]))
            .add_model(
                ModelDefinition::abstract_base("Base", "base")
                    .field(FieldDef::optional("user_data", FieldType::dict(), "data")),
            )
            .add_model(
                ModelDefinition::concrete("Dot", "dot")
                    .extends("Base")
                    .field(FieldDef::required("x", FieldType::number(), "x"))
                    .field(FieldDef::with_default(
                        "mode",
                        FieldType::reference("Mode"),
                        json!("A"),
                        "mode",
                    )),
            )
            .add_model(
                ModelDefinition::concrete("Holder", "holder").field(FieldDef::required(
                    "items",
                    FieldType::array(FieldType::one_of(&["Dot"])),
                    "items",
                )),
            )
            .add_family(Family::new("Test Family", &["Holder"]).with_redoc());
        registry
    }

    fn bundle(registry: &ModelRegistry) -> FamilyBundle {
        let info = DocumentInfo::new("v1.2.3");
        let family = registry.families()[0].clone();
        let graph = ReferenceGraph::build(registry).unwrap();
        let members = graph.closure(registry, &family).unwrap();
        DocumentBuilder::new(registry, &info).build(&family, &members)
    }

    #[test]
    fn test_file_names() {
        assert_eq!(DocumentShape::Flat.file_name("geometry"), "geometry.json");
        assert_eq!(DocumentShape::Inheritance.file_name("geometry"), "geometry_inheritance.json");
        assert_eq!(DocumentShape::Mapper.file_name("display"), "display_mapper.json");
        assert_eq!(DocumentShape::Redoc.file_name("visualization"), "visualization_redoc.json");
    }

    #[test]
    fn test_version_label_normalized() {
        assert_eq!(normalize_version("v2.3.0"), "2.3.0");
        assert_eq!(normalize_version("2.3.0"), "2.3.0");
        assert_eq!(DocumentInfo::new("v0.1.0").version, "0.1.0");
    }

    #[test]
    fn test_flat_omits_abstract_and_inlines_fields() {
        let registry = sample();
        let bundle = bundle(&registry);
        let flat = &bundle.get(DocumentShape::Flat).unwrap().content;
        let schemas = &flat["components"]["schemas"];

        assert!(schemas.get("Base").is_none());
        assert_eq!(schemas["Dot"]["additionalProperties"], json!(false));
        assert!(schemas["Dot"]["properties"].get("user_data").is_some());
        assert_eq!(schemas["Dot"]["required"], json!(["x"]));
        assert_eq!(schemas["Dot"]["properties"]["type"]["pattern"], json!("^Dot$"));
        assert!(schemas["Holder"]["properties"]["items"]["items"].get("discriminator").is_none());
        assert_eq!(flat["info"]["version"], json!("1.2.3"));
        assert_eq!(flat["info"]["title"], json!("Ladybug Test Family Schema"));
        assert_eq!(
            flat["externalDocs"]["url"],
            json!("./test-family_inheritance.json")
        );
    }

    #[test]
    fn test_inheritance_references_base() {
        let registry = sample();
        let bundle = bundle(&registry);
        let doc = &bundle.get(DocumentShape::Inheritance).unwrap().content;
        let schemas = &doc["components"]["schemas"];

        assert!(schemas["Base"].get("additionalProperties").is_none());
        assert_eq!(schemas["Dot"]["allOf"][0], json!({"$ref": "#/components/schemas/Base"}));
        assert_eq!(
            schemas["Dot"]["allOf"][1]["propertyNames"]["enum"],
            json!(["type", "user_data", "x", "mode"])
        );
        let union = &schemas["Holder"]["properties"]["items"]["items"];
        assert_eq!(
            union["discriminator"]["mapping"]["Dot"],
            json!("#/components/schemas/Dot")
        );
    }

    #[test]
    fn test_redoc_drops_discriminators() {
        let registry = sample();
        let bundle = bundle(&registry);
        let doc = &bundle.get(DocumentShape::Redoc).unwrap().content;
        let union = &doc["components"]["schemas"]["Holder"]["properties"]["items"]["items"];
        assert!(union.get("discriminator").is_none());
        assert!(union.get("anyOf").is_some());
    }

    #[test]
    fn test_mapper_lists_literals_and_families() {
        let registry = sample();
        let bundle = bundle(&registry);
        let mapper = &bundle.get(DocumentShape::Mapper).unwrap().content;
        assert_eq!(mapper["propertyName"], json!("type"));
        assert_eq!(mapper["mapping"], json!({"Dot": "Dot", "Holder": "Holder"}));
        assert_eq!(mapper["families"], json!({"Base": ["Dot"]}));
    }

    #[test]
    fn test_ref_with_default_wrapped_in_all_of() {
        let registry = sample();
        let bundle = bundle(&registry);
        let flat = &bundle.get(DocumentShape::Flat).unwrap().content;
        let mode = &flat["components"]["schemas"]["Dot"]["properties"]["mode"];
        assert_eq!(mode["allOf"], json!([{"$ref": "#/components/schemas/Mode"}]));
        assert_eq!(mode["default"], json!("A"));
        assert_eq!(mode["title"], json!("Mode"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("line_width"), "Line Width");
        assert_eq!(title_case("x"), "X");
    }
}
