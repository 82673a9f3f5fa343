//! Model Registry
//!
//! Declarative definitions of the geometry and display objects. The registry is
//! the single source of truth the exporter walks; schema documents are derived
//! from it and never edited by hand.
//!
//! Definitions keep their declaration order. Every traversal (closure of a
//! family, document emission, mapper tables) follows that order so repeated
//! exports are byte-stable.

pub mod graph;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use graph::ReferenceGraph;

/// Name of the reserved discriminator field carried by concrete definitions
pub const DISCRIMINATOR: &str = "type";

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    /// Floating point number with optional inclusive bounds
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    /// Integer with optional inclusive bounds
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    /// Text with optional regex pattern and length bounds
    String {
        pattern: Option<String>,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Boolean,
    /// A single fixed string literal
    Literal { value: String },
    /// Homogeneous list
    Array {
        items: Box<FieldType>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    /// Nested model or enum, by definition name
    Ref { target: String },
    /// One of several alternatives
    Union { variants: Vec<FieldType> },
    /// Free-form dictionary
    Dict,
}

impl FieldType {
    pub fn number() -> Self {
        FieldType::Number { minimum: None, maximum: None }
    }

    pub fn number_range(minimum: Option<f64>, maximum: Option<f64>) -> Self {
        FieldType::Number { minimum, maximum }
    }

    pub fn integer() -> Self {
        FieldType::Integer { minimum: None, maximum: None }
    }

    pub fn integer_range(minimum: Option<i64>, maximum: Option<i64>) -> Self {
        FieldType::Integer { minimum, maximum }
    }

    pub fn string() -> Self {
        FieldType::String { pattern: None, min_length: None, max_length: None }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        FieldType::String { pattern: Some(pattern.into()), min_length: None, max_length: None }
    }

    pub fn boolean() -> Self {
        FieldType::Boolean
    }

    pub fn literal(value: impl Into<String>) -> Self {
        FieldType::Literal { value: value.into() }
    }

    pub fn array(items: FieldType) -> Self {
        FieldType::Array { items: Box::new(items), min_items: None, max_items: None }
    }

    pub fn array_bounded(items: FieldType, min_items: Option<usize>, max_items: Option<usize>) -> Self {
        FieldType::Array { items: Box::new(items), min_items, max_items }
    }

    /// Fixed-length list of numbers, e.g. an (x, y, z) coordinate
    pub fn coordinates(len: usize) -> Self {
        Self::array_bounded(Self::number(), Some(len), Some(len))
    }

    pub fn reference(target: impl Into<String>) -> Self {
        FieldType::Ref { target: target.into() }
    }

    pub fn union(variants: Vec<FieldType>) -> Self {
        FieldType::Union { variants }
    }

    /// Union of model references, in the given order
    pub fn one_of(targets: &[&str]) -> Self {
        Self::union(targets.iter().map(|t| Self::reference(*t)).collect())
    }

    pub fn dict() -> Self {
        FieldType::Dict
    }

    /// All definition names referenced by this type, depth first
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldType::Ref { target } => out.push(target),
            FieldType::Array { items, .. } => items.collect_references(out),
            FieldType::Union { variants } => {
                for variant in variants {
                    variant.collect_references(out);
                }
            }
            _ => {}
        }
    }

    /// Short human-readable rendering used in documentation tables
    pub fn display_name(&self) -> String {
        match self {
            FieldType::Number { .. } => "number".to_string(),
            FieldType::Integer { .. } => "integer".to_string(),
            FieldType::String { .. } => "string".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Literal { value } => format!("\"{}\"", value),
            FieldType::Array { items, .. } => format!("[{}]", items.display_name()),
            FieldType::Ref { target } => target.clone(),
            FieldType::Union { variants } => variants
                .iter()
                .map(|v| v.display_name())
                .collect::<Vec<_>>()
                .join(" | "),
            FieldType::Dict => "object".to_string(),
        }
    }
}

/// A single named field of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    /// Required fields have no default and must be present in payloads
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub description: String,
}

impl FieldDef {
    /// A field that must always be present
    pub fn required(name: impl Into<String>, ty: FieldType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// A field that may be omitted and has no default
    pub fn optional(name: impl Into<String>, ty: FieldType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    /// A field that may be omitted and falls back to `default`
    pub fn with_default(
        name: impl Into<String>,
        ty: FieldType,
        default: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: Some(default),
            description: description.into(),
        }
    }
}

/// Whether a model can appear in payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    /// Shape shared by a family of variants; never instantiated directly
    Abstract,
    /// Instantiable variant identified by its discriminator literal
    Concrete { discriminator: String },
}

/// Declarative description of one domain object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    pub description: String,
    pub kind: ModelKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub fields: Vec<FieldDef>,
}

impl ModelDefinition {
    /// A concrete model whose discriminator literal equals its name
    pub fn concrete(name: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: ModelKind::Concrete { discriminator: name.clone() },
            name,
            description: description.into(),
            base: None,
            fields: Vec::new(),
        }
    }

    /// An abstract base model
    pub fn abstract_base(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: ModelKind::Abstract,
            base: None,
            fields: Vec::new(),
        }
    }

    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Override the discriminator literal of a concrete model
    pub fn tagged(mut self, literal: impl Into<String>) -> Self {
        self.kind = ModelKind::Concrete { discriminator: literal.into() };
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, ModelKind::Abstract)
    }

    pub fn discriminator(&self) -> Option<&str> {
        match &self.kind {
            ModelKind::Concrete { discriminator } => Some(discriminator),
            ModelKind::Abstract => None,
        }
    }
}

/// Named set of string literals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub description: String,
    pub values: Vec<String>,
}

impl EnumDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// A documented domain family and the roots its documents start from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Display name, e.g. "Geometry"
    pub name: String,
    pub roots: Vec<String>,
    /// Also emit a redoc document (inheritance without discriminators)
    #[serde(default)]
    pub redoc: bool,
}

impl Family {
    pub fn new(name: impl Into<String>, roots: &[&str]) -> Self {
        Self {
            name: name.into(),
            roots: roots.iter().map(|r| r.to_string()).collect(),
            redoc: false,
        }
    }

    pub fn with_redoc(mut self) -> Self {
        self.redoc = true;
        self
    }

    /// File stem used for this family's artifacts ("Geometry" -> "geometry")
    pub fn slug(&self) -> String {
        self.name
            .split_whitespace()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Either kind of named definition
#[derive(Debug, Clone, Copy)]
pub enum Definition<'a> {
    Model(&'a ModelDefinition),
    Enum(&'a EnumDefinition),
}

impl<'a> Definition<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Definition::Model(m) => &m.name,
            Definition::Enum(e) => &e.name,
        }
    }

    pub fn description(&self) -> &'a str {
        match self {
            Definition::Model(m) => &m.description,
            Definition::Enum(e) => &e.description,
        }
    }
}

/// Declaration-ordered store of models, enums and families
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDefinition>,
    enums: Vec<EnumDefinition>,
    families: Vec<Family>,
    /// Declaration order over models and enums together
    order: Vec<DefinitionSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinitionSlot {
    Model(usize),
    Enum(usize),
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model definition; order of calls is the declaration order
    pub fn add_model(&mut self, model: ModelDefinition) -> &mut Self {
        self.order.push(DefinitionSlot::Model(self.models.len()));
        self.models.push(model);
        self
    }

    pub fn add_enum(&mut self, definition: EnumDefinition) -> &mut Self {
        self.order.push(DefinitionSlot::Enum(self.enums.len()));
        self.enums.push(definition);
        self
    }

    pub fn add_family(&mut self, family: Family) -> &mut Self {
        self.families.push(family);
        self
    }

    pub fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    pub fn enums(&self) -> &[EnumDefinition] {
        &self.enums
    }

    pub fn families(&self) -> &[Family] {
        &self.families
    }

    pub fn family(&self, name: &str) -> Option<&Family> {
        self.families
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name) || f.slug() == name)
    }

    /// All definitions in declaration order
    pub fn definitions(&self) -> impl Iterator<Item = Definition<'_>> {
        self.order.iter().map(move |slot| match slot {
            DefinitionSlot::Model(i) => Definition::Model(&self.models[*i]),
            DefinitionSlot::Enum(i) => Definition::Enum(&self.enums[*i]),
        })
    }

    pub fn definition_names(&self) -> Vec<&str> {
        self.definitions().map(|d| d.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Definition<'_>> {
        self.definitions().find(|d| d.name() == name)
    }

    pub fn model(&self, name: &str) -> Option<&ModelDefinition> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn enum_definition(&self, name: &str) -> Option<&EnumDefinition> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Base chain of a model, nearest base first
    ///
    /// Stops at the first unresolved or repeated name; the consistency check
    /// reports those cases.
    pub fn ancestors(&self, model: &ModelDefinition) -> Vec<&ModelDefinition> {
        let mut chain: Vec<&ModelDefinition> = Vec::new();
        let mut next = model.base.as_deref();
        while let Some(name) = next {
            let Some(base) = self.model(name) else { break };
            if base.name == model.name || chain.iter().any(|m| m.name == base.name) {
                break;
            }
            chain.push(base);
            next = base.base.as_deref();
        }
        chain
    }

    /// Inherited fields (root base first) followed by the model's own fields
    pub fn all_fields<'a>(&'a self, model: &'a ModelDefinition) -> Vec<&'a FieldDef> {
        let mut fields: Vec<&FieldDef> = Vec::new();
        for ancestor in self.ancestors(model).into_iter().rev() {
            fields.extend(ancestor.fields.iter());
        }
        fields.extend(model.fields.iter());
        fields
    }

    /// Concrete models that derive (directly or not) from `base`, in declaration order
    pub fn descendants(&self, base: &str) -> Vec<&ModelDefinition> {
        self.models
            .iter()
            .filter(|m| !m.is_abstract())
            .filter(|m| self.ancestors(m).iter().any(|a| a.name == base))
            .collect()
    }

    /// Index from discriminator literal to concrete model, across the registry
    ///
    /// Later definitions never replace earlier ones; collisions are reported by
    /// [`ModelRegistry::check`].
    pub fn discriminator_index(&self) -> HashMap<&str, &ModelDefinition> {
        let mut index = HashMap::new();
        for model in &self.models {
            if let Some(literal) = model.discriminator() {
                index.entry(literal).or_insert(model);
            }
        }
        index
    }

    /// Verify every registry invariant
    pub fn check(&self) -> Result<(), crate::error::ExportError> {
        ReferenceGraph::build(self)?.check_families(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(
                ModelDefinition::abstract_base("Base", "base")
                    .field(FieldDef::optional("user_data", FieldType::dict(), "data")),
            )
            .add_model(
                ModelDefinition::abstract_base("Colored", "colored")
                    .extends("Base")
                    .field(FieldDef::required("color", FieldType::string(), "color")),
            )
            .add_model(
                ModelDefinition::concrete("Dot", "dot")
                    .extends("Colored")
                    .field(FieldDef::required("x", FieldType::number(), "x")),
            )
            .add_enum(EnumDefinition::new("Mode", "modes", &["A", "B"]));
        registry
    }

    #[test]
    fn test_all_fields_inherited_first() {
        let registry = sample();
        let dot = registry.model("Dot").unwrap();
        let names: Vec<_> = registry.all_fields(dot).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["user_data", "color", "x"]);
    }

    #[test]
    fn test_declaration_order_spans_models_and_enums() {
        let registry = sample();
        assert_eq!(registry.definition_names(), vec!["Base", "Colored", "Dot", "Mode"]);
    }

    #[test]
    fn test_descendants_of_root_base() {
        let registry = sample();
        let names: Vec<_> = registry.descendants("Base").iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Dot"]);
    }

    #[test]
    fn test_family_slug() {
        assert_eq!(Family::new("Geometry", &[]).slug(), "geometry");
        assert_eq!(Family::new("Display Objects", &[]).slug(), "display-objects");
    }

    #[test]
    fn test_type_references_are_depth_first() {
        let ty = FieldType::union(vec![
            FieldType::reference("A"),
            FieldType::array(FieldType::one_of(&["B", "C"])),
        ]);
        assert_eq!(ty.references(), vec!["A", "B", "C"]);
    }
}
