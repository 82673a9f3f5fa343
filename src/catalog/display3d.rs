//! Geometric display objects in 3D space

use serde_json::json;

use super::display2d::{display_mode, mesh_colors, wrapper};
use crate::model::{FieldDef, FieldType, ModelDefinition, ModelRegistry};

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry
        .add_model(wrapper(
            "Vector3D",
            "SingleColorBase",
            "A point object in 3D space with display properties.",
        ))
        .add_model(wrapper(
            "Point3D",
            "SingleColorBase",
            "A point object in 3D space with display properties.",
        ))
        .add_model(wrapper(
            "Ray3D",
            "SingleColorBase",
            "A ray object in 3D space with display properties.",
        ))
        .add_model(
            wrapper("Plane", "SingleColorBase", "A plane object with display properties.")
                .field(FieldDef::with_default(
                    "show_axes",
                    FieldType::boolean(),
                    json!(false),
                    "A boolean to note whether the plane should be displayed with XY axes \
                     instead of just an origin point and a normal vector.",
                ))
                .field(FieldDef::with_default(
                    "show_grid",
                    FieldType::boolean(),
                    json!(false),
                    "A boolean to note whether the plane should be displayed with a grid.",
                )),
        )
        .add_model(wrapper(
            "LineSegment3D",
            "LineCurveBase",
            "A single line segment face in 3D space with display properties.",
        ))
        .add_model(wrapper(
            "Polyline3D",
            "LineCurveBase",
            "A polyline in 3D space with display properties.",
        ))
        .add_model(wrapper(
            "Arc3D",
            "LineCurveBase",
            "A single arc or circle in 3D space with display properties.",
        ))
        .add_model(
            wrapper(
                "Face3D",
                "SingleColorBase",
                "A single planar face in 3D space with display properties.",
            )
            .field(display_mode("Surface")),
        )
        .add_model(
            wrapper("Mesh3D", "DisplayBaseModel", "A mesh in 3D space with display properties.")
                .field(mesh_colors("mesh"))
                .field(display_mode("Surface")),
        )
        .add_model(
            wrapper(
                "Polyface3D",
                "DisplayBaseModel",
                "A Polyface in 3D space with display properties.",
            )
            .field(mesh_colors("polyface"))
            .field(display_mode("Surface")),
        )
        .add_model(
            wrapper("Sphere", "SingleColorBase", "A sphere object with display properties.")
                .field(display_mode("Surface")),
        )
        .add_model(
            wrapper("Cone", "SingleColorBase", "A cone object with display properties.")
                .field(display_mode("Surface")),
        )
        .add_model(
            wrapper("Cylinder", "SingleColorBase", "A cylinder object with display properties.")
                .field(display_mode("Surface")),
        )
        .add_model(
            ModelDefinition::concrete("DisplayText3D", "A text object in 3D space with display properties.")
                .extends("SingleColorBase")
                .field(FieldDef::required("text", FieldType::string(), "A text string to be displayed in the 3D scene."))
                .field(FieldDef::required(
                    "plane",
                    FieldType::reference("Plane"),
                    "A Ladybug Plane object to locate and orient the text in the 3D scene.",
                ))
                .field(FieldDef::required(
                    "height",
                    FieldType::number(),
                    "A number for the height of the text in the 3D scene.",
                ))
                .field(FieldDef::with_default(
                    "font",
                    FieldType::string(),
                    json!("Arial"),
                    "A text string for the font in which to draw the text. Note that this \
                     field may not be interpreted the same on all machines and in all \
                     interfaces, particularly when a machine lacks a given font.",
                ))
                .field(FieldDef::with_default(
                    "horizontal_alignment",
                    FieldType::reference("HorizontalAlignments"),
                    json!("Left"),
                    "String to specify the horizontal alignment of the text.",
                ))
                .field(FieldDef::with_default(
                    "vertical_alignment",
                    FieldType::reference("VerticalAlignments"),
                    json!("Bottom"),
                    "String to specify the vertical alignment of the text.",
                )),
        );
}
