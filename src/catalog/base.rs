//! Shared building blocks: colors, the `Default` marker, enumerations and the
//! abstract display bases.

use serde_json::json;

use crate::model::{EnumDefinition, FieldDef, FieldType, ModelDefinition, ModelRegistry};

pub(crate) const USER_DATA_DESCRIPTION: &str = "Optional dictionary of user data associated \
    with the object.All keys and values of this dictionary should be of a standard data type \
    to ensure correct serialization of the object (eg. str, float, int, list).";

/// `Default` or a number, with the number optionally bounded below
pub(crate) fn default_or_number(minimum: Option<f64>) -> FieldType {
    FieldType::union(vec![
        FieldType::reference("Default"),
        FieldType::number_range(minimum, None),
    ])
}

/// Value of a field defaulting to the `Default` marker
pub(crate) fn default_marker() -> serde_json::Value {
    json!({ "type": "Default" })
}

pub(crate) fn user_data() -> FieldDef {
    FieldDef::optional("user_data", FieldType::dict(), USER_DATA_DESCRIPTION)
}

fn channel(name: &str, description: &str) -> FieldDef {
    FieldDef::required(name, FieldType::integer_range(Some(0), Some(255)), description)
}

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry
        .add_model(
            ModelDefinition::concrete("Color", "A RGB color.")
                .field(channel("r", "Value for red channel."))
                .field(channel("g", "Value for green channel."))
                .field(channel("b", "Value for blue channel."))
                .field(FieldDef::with_default(
                    "a",
                    FieldType::integer_range(Some(0), Some(255)),
                    json!(255),
                    "Value for the alpha channel, which defines the opacity as a number \
                     between 0 (fully transparent) and 255 (fully opaque).",
                )),
        )
        .add_model(ModelDefinition::concrete(
            "Default",
            "Object to signify when the default value of a visual interface should be used.",
        ))
        .add_enum(EnumDefinition::new(
            "LineTypes",
            "An enumeration.",
            &["Continuous", "Dashed", "Dotted", "DashDot"],
        ))
        .add_enum(EnumDefinition::new(
            "DisplayModes",
            "An enumeration.",
            &["Surface", "SurfaceWithEdges", "Wireframe", "Points"],
        ))
        .add_enum(EnumDefinition::new(
            "HorizontalAlignments",
            "An enumeration.",
            &["Left", "Center", "Right"],
        ))
        .add_enum(EnumDefinition::new(
            "VerticalAlignments",
            "An enumeration.",
            &["Top", "Middle", "Bottom"],
        ))
        .add_model(
            ModelDefinition::abstract_base(
                "DisplayBaseModel",
                "Base class for all Geometric Display objects.",
            )
            .field(user_data()),
        )
        .add_model(
            ModelDefinition::abstract_base(
                "SingleColorBase",
                "Base class for all Geometric Display objects with a single color.",
            )
            .extends("DisplayBaseModel")
            .field(FieldDef::required(
                "color",
                FieldType::reference("Color"),
                "Color for the geometry.",
            )),
        )
        .add_model(
            ModelDefinition::abstract_base(
                "LineCurveBase",
                "Base class for all Geometric Display objects with a line like properties.",
            )
            .extends("SingleColorBase")
            .field(FieldDef::with_default(
                "line_width",
                default_or_number(Some(0.0)),
                default_marker(),
                "Number for line width in pixels (for the screen) or millimeters (in print). \
                 Set to zero to hide the geometry.",
            ))
            .field(FieldDef::with_default(
                "line_type",
                FieldType::reference("LineTypes"),
                json!("Continuous"),
                "Text to indicate the type of line to display (dashed, dotted, etc.). The \
                 LineTypes enumeration contains all acceptable types.",
            )),
        );
}
