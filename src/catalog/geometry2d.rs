//! Geometry objects in 2D space

use serde_json::json;

use crate::model::{FieldDef, FieldType, ModelDefinition, ModelRegistry};

pub(crate) fn xy(model: ModelDefinition) -> ModelDefinition {
    model
        .field(FieldDef::required("x", FieldType::number(), "Number for X coordinate."))
        .field(FieldDef::required("y", FieldType::number(), "Number for Y coordinate."))
}

/// At least three (x, y) points
fn vertices_2d(description: &str) -> FieldDef {
    FieldDef::required(
        "vertices",
        FieldType::array_bounded(FieldType::coordinates(2), Some(3), None),
        description,
    )
}

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry
        .add_model(xy(ModelDefinition::concrete("Vector2D", "A vector object in 2D space.")))
        .add_model(xy(ModelDefinition::concrete("Point2D", "A point object in 2D space.")))
        .add_model(
            ModelDefinition::concrete("Ray2D", "A ray object in 2D space.")
                .field(FieldDef::required(
                    "p",
                    FieldType::coordinates(2),
                    "Ray base point as 2 (x, y) values.",
                ))
                .field(FieldDef::required(
                    "v",
                    FieldType::coordinates(2),
                    "Ray direction vector as 2 (x, y) values.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("LineSegment2D", "A single line segment face in 2D space.")
                .field(FieldDef::required(
                    "p",
                    FieldType::coordinates(2),
                    "Line segment base point as 2 (x, y) values.",
                ))
                .field(FieldDef::required(
                    "v",
                    FieldType::coordinates(2),
                    "Line segment direction vector as 2 (x, y) values.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Polyline2D", "A polyline in 2D space.")
                .field(vertices_2d(
                    "A list of points representing the the vertices of the polyline. The list \
                     should include at least 3 points and each point should be a list of 2 \
                     (x, y) values.",
                ))
                .field(FieldDef::with_default(
                    "interpolated",
                    FieldType::boolean(),
                    json!(false),
                    "A boolean to note whether the polyline should be interpolated between the \
                     input vertices when it is translated to other interfaces.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Arc2D", "A single arc or circle in 2D space.")
                .field(FieldDef::required(
                    "c",
                    FieldType::coordinates(2),
                    "Center of the arc as 2 (x, y) values.",
                ))
                .field(FieldDef::required(
                    "r",
                    FieldType::number(),
                    "A number representing the radius of the arc.",
                ))
                .field(FieldDef::with_default(
                    "a1",
                    FieldType::number_range(Some(0.0), Some(std::f64::consts::TAU)),
                    json!(0),
                    "A number between 0 and 2 * pi for the start angle of the arc.",
                ))
                .field(FieldDef::with_default(
                    "a2",
                    FieldType::number_range(Some(0.0), Some(std::f64::consts::TAU)),
                    json!(std::f64::consts::TAU),
                    "A number between 0 and 2 * pi for the end angle of the arc.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Polygon2D", "A polygon in 2D space (without holes).")
                .field(vertices_2d(
                    "A list of points representing the vertices of the polygon. The list should \
                     include at least 3 points and each point should be a list of 2 (x, y) values.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Mesh2D", "A mesh in 2D space.")
                .field(vertices_2d(
                    "A list of points representing the vertices of the mesh. The list should \
                     include at least 3 points and each point should be a list of 2 (x, y) values.",
                ))
                .field(mesh_faces())
                .field(FieldDef::optional(
                    "colors",
                    FieldType::array(FieldType::reference("Color")),
                    "An optional list of colors that correspond to either the faces of the mesh \
                     or the vertices of the mesh.",
                )),
        );
}

/// Faces of 3 or 4 non-negative vertex indices, at least one face
pub(crate) fn mesh_faces() -> FieldDef {
    FieldDef::required(
        "faces",
        FieldType::array_bounded(
            FieldType::array_bounded(FieldType::integer_range(Some(0), None), Some(3), Some(4)),
            Some(1),
            None,
        ),
        "A list of lists with each sub-list having either 3 or 4 integers. These integers \
         correspond to indices within the list of vertices.",
    )
}
