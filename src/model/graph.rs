//! Reference Graph
//!
//! petgraph view over the registry: one node per definition, one edge per
//! field reference or base link. Used for the consistency check and for the
//! closure of a family (everything reachable from its roots).

use std::collections::{HashMap, HashSet};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

use super::{Definition, Family, ModelRegistry, DISCRIMINATOR};
use crate::error::ExportError;

/// Why one definition points at another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// A field's type references the target
    Field,
    /// The source extends the target
    Base,
}

/// Dependency graph between registry definitions
pub struct ReferenceGraph {
    graph: DiGraph<String, EdgeKind>,
    nodes: HashMap<String, NodeIndex>,
}

impl ReferenceGraph {
    /// Build the graph, failing on the first structural inconsistency
    pub fn build(registry: &ModelRegistry) -> Result<Self, ExportError> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for definition in registry.definitions() {
            let name = definition.name().to_string();
            if nodes.contains_key(&name) {
                return Err(ExportError::DuplicateDefinition { name });
            }
            let idx = graph.add_node(name.clone());
            nodes.insert(name, idx);
        }

        let known = registry.definition_names();

        for model in registry.models() {
            let source = nodes[&model.name];

            let mut seen = HashSet::new();
            for field in &model.fields {
                if field.name == DISCRIMINATOR {
                    return Err(ExportError::ReservedField {
                        definition: model.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(ExportError::DuplicateField {
                        definition: model.name.clone(),
                        field: field.name.clone(),
                    });
                }

                for target in field.ty.references() {
                    match registry.get(target) {
                        None => {
                            return Err(ExportError::UnresolvedReference {
                                definition: model.name.clone(),
                                field: field.name.clone(),
                                target: target.to_string(),
                                suggestion: suggest(target, &known),
                            })
                        }
                        Some(Definition::Model(m)) if m.is_abstract() => {
                            return Err(ExportError::AbstractReference {
                                definition: model.name.clone(),
                                field: field.name.clone(),
                                target: target.to_string(),
                            })
                        }
                        Some(_) => {
                            graph.add_edge(source, nodes[target], EdgeKind::Field);
                        }
                    }
                }
            }

            if let Some(base) = &model.base {
                match registry.get(base) {
                    None => {
                        return Err(ExportError::UnresolvedBase {
                            definition: model.name.clone(),
                            base: base.clone(),
                            suggestion: suggest(base, &known),
                        })
                    }
                    Some(Definition::Model(m)) if m.is_abstract() => {
                        graph.add_edge(source, nodes[base.as_str()], EdgeKind::Base);
                    }
                    Some(_) => {
                        return Err(ExportError::ConcreteBase {
                            definition: model.name.clone(),
                            base: base.clone(),
                        })
                    }
                }
            }
        }

        let this = Self { graph, nodes };
        this.check_inheritance(registry)?;
        Ok(this)
    }

    fn check_inheritance(&self, registry: &ModelRegistry) -> Result<(), ExportError> {
        let mut bases: DiGraph<&str, ()> = DiGraph::new();
        let mut idx = HashMap::new();
        for model in registry.models() {
            idx.insert(model.name.as_str(), bases.add_node(model.name.as_str()));
        }
        for model in registry.models() {
            if let Some(base) = model.base.as_deref() {
                bases.add_edge(idx[model.name.as_str()], idx[base], ());
            }
        }
        if let Err(cycle) = toposort(&bases, None) {
            return Err(ExportError::InheritanceCycle {
                definition: bases[cycle.node_id()].to_string(),
            });
        }

        for model in registry.models() {
            for ancestor in registry.ancestors(model) {
                if let Some(field) = model
                    .fields
                    .iter()
                    .find(|f| ancestor.fields.iter().any(|a| a.name == f.name))
                {
                    return Err(ExportError::FieldOverride {
                        definition: model.name.clone(),
                        field: field.name.clone(),
                        base: ancestor.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check every family's roots and discriminator uniqueness
    pub fn check_families(&self, registry: &ModelRegistry) -> Result<(), ExportError> {
        for family in registry.families() {
            self.check_family(registry, family)?;
        }
        Ok(())
    }

    /// Closure of one family, failing when two members share a discriminator
    pub fn check_family<'r>(
        &self,
        registry: &'r ModelRegistry,
        family: &Family,
    ) -> Result<Vec<&'r str>, ExportError> {
        let members = self.closure(registry, family)?;
        let mut literals: HashMap<&str, &str> = HashMap::new();
        for name in &members {
            let Some(model) = registry.model(name) else { continue };
            let Some(literal) = model.discriminator() else { continue };
            if let Some(first) = literals.insert(literal, &model.name) {
                return Err(ExportError::DiscriminatorCollision {
                    family: family.name.clone(),
                    literal: literal.to_string(),
                    first: first.to_string(),
                    second: model.name.clone(),
                });
            }
        }
        Ok(members)
    }

    /// Definitions reachable from the family roots, in declaration order
    ///
    /// Bases are included so the inheritance document can reference them.
    pub fn closure<'r>(
        &self,
        registry: &'r ModelRegistry,
        family: &Family,
    ) -> Result<Vec<&'r str>, ExportError> {
        let mut reached: HashSet<NodeIndex> = HashSet::new();
        for root in &family.roots {
            let start = *self.nodes.get(root).ok_or_else(|| ExportError::UnknownRoot {
                family: family.name.clone(),
                root: root.clone(),
            })?;
            let mut dfs = Dfs::new(&self.graph, start);
            while let Some(node) = dfs.next(&self.graph) {
                reached.insert(node);
            }
        }

        Ok(registry
            .definition_names()
            .into_iter()
            .filter(|name| self.nodes.get(*name).map_or(false, |idx| reached.contains(idx)))
            .collect())
    }

    /// Names of the definitions a definition points at directly
    pub fn dependencies(&self, name: &str) -> Vec<(&str, EdgeKind)> {
        let Some(&idx) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<(&str, EdgeKind)> = self
            .graph
            .edges(idx)
            .map(|edge| (self.graph[edge.target()].as_str(), *edge.weight()))
            .collect();
        deps.sort_by(|a, b| a.0.cmp(b.0));
        deps.dedup();
        deps
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Closest known definition name, if any scores at all
fn suggest(target: &str, known: &[&str]) -> Option<String> {
    let matcher = SkimMatcherV2::default();
    known
        .iter()
        .filter_map(|name| {
            let forward = matcher.fuzzy_match(name, target);
            let backward = matcher.fuzzy_match(target, name);
            forward.max(backward).map(|score| (score, *name))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, name)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EnumDefinition, FieldDef, FieldType, ModelDefinition};

    fn point(name: &str) -> ModelDefinition {
        ModelDefinition::concrete(name, "a point")
            .field(FieldDef::required("x", FieldType::number(), "x"))
    }

    #[test]
    fn test_unresolved_reference_suggests_name() {
        let mut registry = ModelRegistry::new();
        registry.add_model(point("Point2D")).add_model(
            ModelDefinition::concrete("Holder", "holder")
                .field(FieldDef::required("p", FieldType::reference("Pt2D"), "p")),
        );
        match ReferenceGraph::build(&registry) {
            Err(ExportError::UnresolvedReference { target, suggestion, .. }) => {
                assert_eq!(target, "Pt2D");
                assert_eq!(suggestion.as_deref(), Some("Point2D"));
            }
            other => panic!("Expected UnresolvedReference, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_concrete_base_rejected() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(point("Point2D"))
            .add_model(point("Point3D").extends("Point2D"));
        let err = ReferenceGraph::build(&registry).err().unwrap();
        assert!(matches!(err, ExportError::ConcreteBase { .. }));
    }

    #[test]
    fn test_inheritance_cycle_detected() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(ModelDefinition::abstract_base("A", "a").extends("B"))
            .add_model(ModelDefinition::abstract_base("B", "b").extends("A"));
        let err = ReferenceGraph::build(&registry).err().unwrap();
        assert!(matches!(err, ExportError::InheritanceCycle { .. }));
    }

    #[test]
    fn test_field_override_rejected() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(
                ModelDefinition::abstract_base("Base", "base")
                    .field(FieldDef::required("x", FieldType::number(), "x")),
            )
            .add_model(point("Point2D").extends("Base"));
        let err = ReferenceGraph::build(&registry).err().unwrap();
        assert!(matches!(err, ExportError::FieldOverride { .. }));
    }

    #[test]
    fn test_reserved_discriminator_field_rejected() {
        let mut registry = ModelRegistry::new();
        registry.add_model(
            ModelDefinition::concrete("Tagged", "t")
                .field(FieldDef::required("type", FieldType::string(), "type")),
        );
        let err = ReferenceGraph::build(&registry).err().unwrap();
        assert!(matches!(err, ExportError::ReservedField { .. }));
    }

    #[test]
    fn test_abstract_reference_rejected() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(ModelDefinition::abstract_base("Base", "base"))
            .add_model(
                ModelDefinition::concrete("Holder", "holder")
                    .field(FieldDef::required("b", FieldType::reference("Base"), "b")),
            );
        let err = ReferenceGraph::build(&registry).err().unwrap();
        assert!(matches!(err, ExportError::AbstractReference { .. }));
    }

    #[test]
    fn test_closure_in_declaration_order() {
        let mut registry = ModelRegistry::new();
        registry
            .add_enum(EnumDefinition::new("Mode", "m", &["A"]))
            .add_model(point("Point2D"))
            .add_model(point("Unused"))
            .add_model(
                ModelDefinition::concrete("Holder", "holder")
                    .field(FieldDef::required("p", FieldType::reference("Point2D"), "p"))
                    .field(FieldDef::optional("m", FieldType::reference("Mode"), "m")),
            );
        let graph = ReferenceGraph::build(&registry).unwrap();
        let family = Family::new("Test", &["Holder"]);
        let closure = graph.closure(&registry, &family).unwrap();
        assert_eq!(closure, vec!["Mode", "Point2D", "Holder"]);
    }

    #[test]
    fn test_discriminator_collision_in_family() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(point("Point2D"))
            .add_model(point("Other").tagged("Point2D"))
            .add_family(Family::new("Geometry", &["Point2D", "Other"]));
        let graph = ReferenceGraph::build(&registry).unwrap();
        match graph.check_families(&registry) {
            Err(ExportError::DiscriminatorCollision { literal, first, second, .. }) => {
                assert_eq!(literal, "Point2D");
                assert_eq!(first, "Point2D");
                assert_eq!(second, "Other");
            }
            other => panic!("Expected DiscriminatorCollision, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_root() {
        let mut registry = ModelRegistry::new();
        registry
            .add_model(point("Point2D"))
            .add_family(Family::new("Geometry", &["Point3D"]));
        let graph = ReferenceGraph::build(&registry).unwrap();
        assert!(matches!(
            graph.check_families(&registry),
            Err(ExportError::UnknownRoot { .. })
        ));
    }
}
