//! Doc Publisher
//!
//! Renders human-readable HTML pages from the JSON documents the exporter
//! wrote. Pages are built from the documents on disk, not from the registry.

use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use serde_json::{Map, Value};
use tracing::info;

use crate::config::SchemaConfig;
use crate::document::{normalize_version, DocumentShape};
use crate::error::{Error, Result};
use crate::export::{write_atomic, ExportSummary, RenderedFile, SchemaExporter};
use crate::model::{Family, ModelRegistry};

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Name of the landing page
pub const INDEX_PAGE: &str = "index.html";

/// Writes `<family>.html` pages and an index into the docs directory
pub struct DocPublisher {
    docs_dir: PathBuf,
    version: String,
}

impl DocPublisher {
    pub fn new(docs_dir: impl Into<PathBuf>, version: &str) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            version: normalize_version(version),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Render every page in memory
    pub fn render(&self, families: &[Family]) -> Result<Vec<RenderedFile>> {
        let shell = asset("page.html")?;
        let style = asset("docs.css")?;

        let mut pages = Vec::with_capacity(families.len() + 1);
        for family in families {
            let document = self.read_document(family, DocumentShape::Flat)?;
            // The inheritance document is linked from every page; it must exist
            self.read_document(family, DocumentShape::Inheritance)?;

            let title = document
                .pointer("/info/title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} Schema", family.name));
            let content = family_content(family, &document)?;
            pages.push(RenderedFile {
                name: format!("{}.html", family.slug()),
                bytes: fill(shell, style, &title, &self.version, &content).into_bytes(),
            });
        }

        let index = self.index_content(families);
        pages.push(RenderedFile {
            name: INDEX_PAGE.to_string(),
            bytes: fill(shell, style, "Schema Documentation", &self.version, &index).into_bytes(),
        });
        Ok(pages)
    }

    /// Render and write every page
    pub fn publish(&self, families: &[Family]) -> Result<Vec<PathBuf>> {
        let pages = self.render(families)?;
        let mut written = Vec::with_capacity(pages.len());
        for page in pages {
            let path = self.docs_dir.join(&page.name);
            write_atomic(&path, &page.bytes)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    fn read_document(&self, family: &Family, shape: DocumentShape) -> Result<Value> {
        let path = self.docs_dir.join(shape.file_name(&family.slug()));
        let text = std::fs::read_to_string(&path).map_err(|e| {
            Error::DocGeneration(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            Error::DocGeneration(format!("malformed document {}: {}", path.display(), e))
        })
    }

    fn index_content(&self, families: &[Family]) -> String {
        let mut out = String::from("<ul class=\"families\">\n");
        for family in families {
            let slug = family.slug();
            let artifacts: Vec<String> = DocumentShape::ALL
                .iter()
                .map(|shape| shape.file_name(&slug))
                .filter(|name| self.docs_dir.join(name).exists())
                .map(|name| format!("<a href=\"{0}\"><code>{0}</code></a>", escape(&name)))
                .collect();
            out.push_str(&format!(
                "<li><a href=\"{}.html\">{}</a> ({})</li>\n",
                escape(&slug),
                escape(&family.name),
                artifacts.join(", ")
            ));
        }
        out.push_str("</ul>\n");
        out
    }
}

fn asset(name: &str) -> Result<&'static str> {
    ASSETS
        .get_file(name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| Error::DocGeneration(format!("missing page asset {}", name)))
}

fn fill(shell: &str, style: &str, title: &str, version: &str, content: &str) -> String {
    shell
        .replace("{{style}}", style)
        .replace("{{title}}", &escape(title))
        .replace("{{version}}", &escape(version))
        .replace("{{content}}", content)
}

/// Navigation plus one section per component schema
fn family_content(family: &Family, document: &Value) -> Result<String> {
    let schemas = document
        .pointer("/components/schemas")
        .and_then(Value::as_object)
        .ok_or_else(|| {
            Error::DocGeneration(format!("{} document has no components.schemas", family.name))
        })?;

    let mut out = String::new();
    if let Some(description) = document.pointer("/info/description").and_then(Value::as_str) {
        out.push_str(&format!("<p>{}</p>\n", escape(description)));
    }

    out.push_str("<nav><ul>\n");
    for name in schemas.keys() {
        out.push_str(&format!("<li><a href=\"#{0}\">{0}</a></li>\n", escape(name)));
    }
    out.push_str("</ul></nav>\n");

    for (name, schema) in schemas {
        out.push_str(&definition_section(name, schema));
    }
    Ok(out)
}

fn definition_section(name: &str, schema: &Value) -> String {
    let mut out = format!("<section id=\"{0}\">\n<h2>{0}</h2>\n", escape(name));
    if let Some(description) = schema.get("description").and_then(Value::as_str) {
        out.push_str(&format!("<p>{}</p>\n", escape(description)));
    }

    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        let values: Vec<String> = values
            .iter()
            .map(|v| format!("<code>{}</code>", escape(&compact(v))))
            .collect();
        out.push_str(&format!("<p>Allowed values: {}</p>\n", values.join(", ")));
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        out.push_str(&field_table(properties, &required));
    }
    out.push_str("</section>\n");
    out
}

fn field_table(properties: &Map<String, Value>, required: &[&str]) -> String {
    let mut out = String::from(
        "<table>\n<tr><th>Field</th><th>Type</th><th>Required</th><th>Default</th><th>Description</th></tr>\n",
    );
    for (field, schema) in properties {
        let default = schema
            .get("default")
            .map(|d| format!("<code>{}</code>", escape(&compact(d))))
            .unwrap_or_default();
        let description = schema
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        out.push_str(&format!(
            "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(field),
            type_label(schema),
            if required.contains(&field.as_str()) { "yes" } else { "no" },
            default,
            escape(description)
        ));
    }
    out.push_str("</table>\n");
    out
}

/// Short rendering of a property schema, with links to referenced definitions
fn type_label(schema: &Value) -> String {
    if let Some(target) = schema.get("$ref").and_then(Value::as_str) {
        let name = target.rsplit('/').next().unwrap_or(target);
        return format!("<a href=\"#{0}\">{0}</a>", escape(name));
    }
    for key in ["allOf", "anyOf"] {
        if let Some(variants) = schema.get(key).and_then(Value::as_array) {
            return variants.iter().map(type_label).collect::<Vec<_>>().join(" | ");
        }
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => format!(
            "[{}]",
            schema.get("items").map(type_label).unwrap_or_default()
        ),
        Some("string") if schema.get("pattern").is_some() => {
            let pattern = schema.get("pattern").and_then(Value::as_str).unwrap_or_default();
            format!("string <code>{}</code>", escape(pattern))
        }
        Some(other) => other.to_string(),
        None => "any".to_string(),
    }
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything a documentation run wrote
#[derive(Debug, Clone)]
pub struct GeneratedDocs {
    pub export: ExportSummary,
    pub pages: Vec<PathBuf>,
}

/// Export every family of `registry` into `output_dir`, then publish its pages
pub fn generate(
    registry: &ModelRegistry,
    config: &SchemaConfig,
    version: &str,
    output_dir: &Path,
) -> Result<GeneratedDocs> {
    let export = SchemaExporter::new(registry, config.docs.document_info(version))
        .with_options(config.export.clone())
        .export_all(output_dir)?;
    let pages = DocPublisher::new(output_dir, version).publish(registry.families())?;
    Ok(GeneratedDocs { export, pages })
}

/// True when `dir` holds every page a publish run would write
pub fn pages_exist(dir: &Path, families: &[Family]) -> bool {
    families
        .iter()
        .all(|family| dir.join(format!("{}.html", family.slug())).exists())
        && dir.join(INDEX_PAGE).exists()
}
