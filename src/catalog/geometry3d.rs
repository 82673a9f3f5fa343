//! Geometry objects in 3D space

use serde_json::json;

use super::geometry2d::mesh_faces;
use crate::model::{FieldDef, FieldType, ModelDefinition, ModelRegistry};

fn xyz(model: ModelDefinition) -> ModelDefinition {
    model
        .field(FieldDef::required("x", FieldType::number(), "Number for X coordinate."))
        .field(FieldDef::required("y", FieldType::number(), "Number for Y coordinate."))
        .field(FieldDef::required("z", FieldType::number(), "Number for Z coordinate."))
}

fn point_3d(name: &str, description: &str) -> FieldDef {
    FieldDef::required(name, FieldType::coordinates(3), description)
}

/// List of at least three (x, y, z) points
fn points_3d(name: &str, description: &str) -> FieldDef {
    FieldDef::required(
        name,
        FieldType::array_bounded(FieldType::coordinates(3), Some(3), None),
        description,
    )
}

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry
        .add_model(xyz(ModelDefinition::concrete("Vector3D", "A vector object in 3D space.")))
        .add_model(xyz(ModelDefinition::concrete("Point3D", "A point object in 3D space.")))
        .add_model(
            ModelDefinition::concrete("Ray3D", "A ray object in 3D space.")
                .field(point_3d("p", "Ray base point as 3 (x, y, z) values."))
                .field(point_3d("v", "Ray direction vector as 3 (x, y, z) values.")),
        )
        .add_model(
            ModelDefinition::concrete("Plane", "A plane object.")
                .field(point_3d(
                    "n",
                    "Plane normal as 3 (x, y, z) values.",
                ))
                .field(point_3d(
                    "o",
                    "Plane origin as 3 (x, y, z) values",
                ))
                .field(FieldDef::optional(
                    "x",
                    FieldType::coordinates(3),
                    "Plane x-axis as 3 (x, y, z) values. If None, it is autocalculated.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("LineSegment3D", "A single line segment face in 3D space.")
                .field(point_3d("p", "Line segment base point as 3 (x, y, z) values."))
                .field(point_3d("v", "Line segment direction vector as 3 (x, y, z) values.")),
        )
        .add_model(
            ModelDefinition::concrete("Polyline3D", "A polyline in 3D space.")
                .field(points_3d(
                    "vertices",
                    "A list of points representing the the vertices of the polyline. The list \
                     should include at least 3 points and each point should be a list of 3 \
                     (x, y, z) values.",
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
            ModelDefinition::concrete("Arc3D", "A single arc or circle in 3D space.")
                .field(FieldDef::required(
                    "plane",
                    FieldType::reference("Plane"),
                    "A Ladybug Plane object for the plane in which the arc lies.",
                ))
                .field(FieldDef::required(
                    "radius",
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
            ModelDefinition::concrete("Face3D", "A single planar face in 3D space.")
                .field(points_3d(
                    "boundary",
                    "A list of points representing the outer boundary vertices of the face. \
                     The list should include at least 3 points and each point should be a \
                     list of 3 (x, y, z) values.",
                ))
                .field(FieldDef::optional(
                    "holes",
                    FieldType::array(FieldType::array_bounded(
                        FieldType::coordinates(3),
                        Some(3),
                        None,
                    )),
                    "Optional list of lists with one list for each hole in the face. Each \
                     hole should be a list of at least 3 points and each point a list of 3 \
                     (x, y, z) values. If None, it will be assumed that there are no holes in \
                     the face.",
                ))
                .field(FieldDef::optional(
                    "plane",
                    FieldType::reference("Plane"),
                    "Optional Plane indicating the plane in which the face exists. If None, \
                     the plane will usually be derived from the boundary points.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Mesh3D", "A mesh in 3D space.")
                .field(points_3d(
                    "vertices",
                    "A list of points representing the vertices of the mesh. The list should \
                     include at least 3 points and each point should be a list of 3 (x, y, z) \
                     values.",
                ))
                .field(mesh_faces())
                .field(FieldDef::optional(
                    "colors",
                    FieldType::array(FieldType::reference("Color")),
                    "An optional list of colors that correspond to either the faces of the mesh \
                     or the vertices of the mesh.",
                )),
        )
        .add_model(
            ModelDefinition::concrete(
                "PolyfaceEdgeInfo",
                "Optional edge information for Polyface.",
            )
            .field(FieldDef::required(
                "edge_indices",
                FieldType::array(FieldType::array_bounded(
                    FieldType::integer_range(Some(0), None),
                    Some(2),
                    Some(2),
                )),
                "A list of lists with each sub-list having 2 integers. These integers \
                 correspond to indices within the list of vertices.",
            ))
            .field(FieldDef::required(
                "edge_types",
                FieldType::array(FieldType::integer_range(Some(0), Some(1))),
                "A list of integers for each edge that parallels the edge_indices list. An \
                 integer of 0 denotes a naked edge and an integer of 1 denotes an internal \
                 edge. Anything higher is a non-manifold edge.",
            )),
        )
        .add_model(
            ModelDefinition::concrete("Polyface3D", "A Polyface in 3D space.")
                .field(points_3d(
                    "vertices",
                    "A list of points representing the vertices of the polyface. The list \
                     should include at least 3 points and each point should be a list of 3 \
                     (x, y, z) values.",
                ))
                .field(FieldDef::required(
                    "face_indices",
                    FieldType::array_bounded(
                        FieldType::array(FieldType::array_bounded(
                            FieldType::integer_range(Some(0), None),
                            Some(3),
                            None,
                        )),
                        Some(1),
                        None,
                    ),
                    "A list of lists with one list for each face of the polyface. Each face \
                     list must contain at least one sub-list of integers corresponding to \
                     indices within the list of vertices. The first sub-list denotes the \
                     boundary of the face while each subsequent sub-list denotes a hole.",
                ))
                .field(FieldDef::optional(
                    "edge_information",
                    FieldType::reference("PolyfaceEdgeInfo"),
                    "Optional edge information, which will speed up the creation of the \
                     Polyface object if it is available.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Sphere", "A sphere object.")
                .field(point_3d("center", "The center of the sphere as 3 (x, y, z) values."))
                .field(FieldDef::required(
                    "radius",
                    FieldType::number(),
                    "A number representing the radius of the sphere.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Cone", "A cone object.")
                .field(point_3d("vertex", "The tip of the cone as 3 (x, y, z) values."))
                .field(point_3d(
                    "axis",
                    "A vector representing the direction and height of the cone as 3 \
                     (x, y, z) values.",
                ))
                .field(FieldDef::required(
                    "angle",
                    FieldType::number(),
                    "An angle in radians representing the half angle between the axis and \
                     the surface.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("Cylinder", "A cylinder object.")
                .field(point_3d(
                    "center",
                    "The center of the bottom base of the cylinder as 3 (x, y, z) values.",
                ))
                .field(point_3d(
                    "axis",
                    "A vector representing the direction and height of the cylinder as 3 \
                     (x, y, z) values.",
                ))
                .field(FieldDef::required(
                    "radius",
                    FieldType::number(),
                    "A number representing the radius of the cylinder.",
                )),
        );
}
