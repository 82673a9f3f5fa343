//! Built-in Catalog
//!
//! The geometry, display and visualization objects shipped with the crate,
//! registered in a fixed declaration order, plus the three documented
//! families.

mod base;
mod display2d;
mod display3d;
mod geometry2d;
mod geometry3d;
mod graphic;
mod visualization;

use crate::model::{Family, ModelRegistry};

/// Every geometry object, in the order unions list them
pub const GEOMETRY_TYPES: &[&str] = &[
    "Vector2D", "Point2D", "Ray2D", "LineSegment2D", "Polyline2D", "Arc2D", "Polygon2D",
    "Mesh2D", "Vector3D", "Point3D", "Ray3D", "Plane", "LineSegment3D", "Polyline3D",
    "Arc3D", "Face3D", "Mesh3D", "Polyface3D", "Sphere", "Cone", "Cylinder",
];

/// Every display object, in the order unions list them
pub const DISPLAY_TYPES: &[&str] = &[
    "DisplayVector2D", "DisplayPoint2D", "DisplayRay2D", "DisplayLineSegment2D",
    "DisplayPolyline2D", "DisplayArc2D", "DisplayPolygon2D", "DisplayMesh2D",
    "DisplayVector3D", "DisplayPoint3D", "DisplayRay3D", "DisplayPlane",
    "DisplayLineSegment3D", "DisplayPolyline3D", "DisplayArc3D", "DisplayFace3D",
    "DisplayMesh3D", "DisplayPolyface3D", "DisplaySphere", "DisplayCone",
    "DisplayCylinder", "DisplayText3D",
];

/// Registry holding the whole built-in catalog and its families
pub fn registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    base::register(&mut registry);
    geometry2d::register(&mut registry);
    geometry3d::register(&mut registry);
    display2d::register(&mut registry);
    display3d::register(&mut registry);
    visualization::register(&mut registry);
    graphic::register(&mut registry);

    // The display family documents every display object except text
    let display_roots: Vec<&str> = DISPLAY_TYPES
        .iter()
        .copied()
        .filter(|name| *name != "DisplayText3D")
        .collect();

    registry
        .add_family(
            Family::new("Visualization", &["VisualizationSet", "VisualizationMetaData"])
                .with_redoc(),
        )
        .add_family(Family::new("Geometry", GEOMETRY_TYPES))
        .add_family(Family::new("Display", &display_roots));
    registry
}
