//! Geometric display objects in 2D space

use serde_json::json;

use super::base::{default_marker, default_or_number};
use crate::model::{FieldDef, FieldType, ModelDefinition, ModelRegistry};

/// Display wrapper named `Display<geometry>` around a single geometry field
pub(crate) fn wrapper(geometry: &str, base: &str, description: &str) -> ModelDefinition {
    ModelDefinition::concrete(format!("Display{}", geometry), description)
        .extends(base)
        .field(FieldDef::required(
            "geometry",
            FieldType::reference(geometry),
            format!("{} for the geometry.", geometry),
        ))
}

pub(crate) fn display_mode(default: &str) -> FieldDef {
    FieldDef::with_default(
        "display_mode",
        FieldType::reference("DisplayModes"),
        json!(default),
        "Text to indicate the display mode (surface, wireframe, etc.). The DisplayModes \
         enumeration contains all acceptable types.",
    )
}

/// Per-face or per-vertex colors of a mesh-like display object
pub(crate) fn mesh_colors(noun: &str) -> FieldDef {
    FieldDef::required(
        "colors",
        FieldType::array(FieldType::reference("Color")),
        format!(
            "A list of colors that correspond to either the faces of the {noun} or the \
             vertices of the {noun}. It can also be a single color for the entire {noun}."
        ),
    )
}

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry
        .add_model(wrapper(
            "Vector2D",
            "SingleColorBase",
            "A point object in 2D space with display properties.",
        ))
        .add_model(
            wrapper(
                "Point2D",
                "SingleColorBase",
                "A point object in 2D space with display properties.",
            )
            .field(FieldDef::with_default(
                "radius",
                default_or_number(Some(0.0)),
                default_marker(),
                "Number for the radius with which the point should be displayed in pixels \
                 (for the screen) or millimeters (in print).",
            )),
        )
        .add_model(wrapper(
            "Ray2D",
            "SingleColorBase",
            "A ray object in 2D space with display properties.",
        ))
        .add_model(wrapper(
            "LineSegment2D",
            "LineCurveBase",
            "A single line segment face in 2D space with display properties.",
        ))
        .add_model(wrapper(
            "Polyline2D",
            "LineCurveBase",
            "A polyline in 2D space with display properties.",
        ))
        .add_model(wrapper(
            "Arc2D",
            "LineCurveBase",
            "A single arc or circle in 2D space with display properties.",
        ))
        .add_model(wrapper(
            "Polygon2D",
            "LineCurveBase",
            "A single polygon in 2D space with display properties.",
        ))
        .add_model(
            wrapper(
                "Mesh2D",
                "DisplayBaseModel",
                "A mesh in 2D space with display properties.",
            )
            .field(mesh_colors("mesh"))
            .field(display_mode("Surface")),
        );
}
