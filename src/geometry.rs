//! Typed geometry payloads
//!
//! Rust counterparts of the catalog's geometry objects. [`Geometry`] is the
//! tagged union over all of them, keyed by the same `type` discriminator the
//! schema documents use, so a payload that passes schema validation can be
//! read straight into it.

use serde::{Deserialize, Serialize};

/// (x, y) coordinate
pub type Xy = [f64; 2];
/// (x, y, z) coordinate
pub type Xyz = [f64; 3];

fn default_a2() -> f64 {
    std::f64::consts::TAU
}

fn default_alpha() -> u8 {
    255
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// Base point plus direction; shared by rays and line segments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray2D {
    pub p: Xy,
    pub v: Xy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment2D {
    pub p: Xy,
    pub v: Xy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline2D {
    pub vertices: Vec<Xy>,
    #[serde(default)]
    pub interpolated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc2D {
    pub c: Xy,
    pub r: f64,
    #[serde(default)]
    pub a1: f64,
    #[serde(default = "default_a2")]
    pub a2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon2D {
    pub vertices: Vec<Xy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh2D {
    pub vertices: Vec<Xy>,
    pub faces: Vec<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray3D {
    pub p: Xyz,
    pub v: Xyz,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal
    pub n: Xyz,
    /// Origin
    pub o: Xyz,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Xyz>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment3D {
    pub p: Xyz,
    pub v: Xyz,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline3D {
    pub vertices: Vec<Xyz>,
    #[serde(default)]
    pub interpolated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc3D {
    pub plane: Plane,
    pub radius: f64,
    #[serde(default)]
    pub a1: f64,
    #[serde(default = "default_a2")]
    pub a2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face3D {
    pub boundary: Vec<Xyz>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holes: Option<Vec<Vec<Xyz>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plane: Option<Plane>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh3D {
    pub vertices: Vec<Xyz>,
    pub faces: Vec<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolyfaceEdgeInfo {
    pub edge_indices: Vec<[usize; 2]>,
    pub edge_types: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyface3D {
    pub vertices: Vec<Xyz>,
    /// One entry per face: the boundary loop followed by any hole loops
    pub face_indices: Vec<Vec<Vec<usize>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_information: Option<PolyfaceEdgeInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Xyz,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub vertex: Xyz,
    pub axis: Xyz,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub center: Xyz,
    pub axis: Xyz,
    pub radius: f64,
}

/// Any geometry object, tagged by its `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Vector2D(Vector2D),
    Point2D(Point2D),
    Ray2D(Ray2D),
    LineSegment2D(LineSegment2D),
    Polyline2D(Polyline2D),
    Arc2D(Arc2D),
    Polygon2D(Polygon2D),
    Mesh2D(Mesh2D),
    Vector3D(Vector3D),
    Point3D(Point3D),
    Ray3D(Ray3D),
    Plane(Plane),
    LineSegment3D(LineSegment3D),
    Polyline3D(Polyline3D),
    Arc3D(Arc3D),
    Face3D(Face3D),
    Mesh3D(Mesh3D),
    Polyface3D(Polyface3D),
    Sphere(Sphere),
    Cone(Cone),
    Cylinder(Cylinder),
}

impl Geometry {
    /// Discriminator literal of every variant, in declaration order
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "Vector2D", "Point2D", "Ray2D", "LineSegment2D", "Polyline2D", "Arc2D", "Polygon2D",
        "Mesh2D", "Vector3D", "Point3D", "Ray3D", "Plane", "LineSegment3D", "Polyline3D",
        "Arc3D", "Face3D", "Mesh3D", "Polyface3D", "Sphere", "Cone", "Cylinder",
    ];

    /// Read a geometry payload
    pub fn from_value(value: &serde_json::Value) -> serde_json::Result<Self> {
        Geometry::deserialize(value)
    }

    /// Discriminator literal of this geometry
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Vector2D(_) => "Vector2D",
            Geometry::Point2D(_) => "Point2D",
            Geometry::Ray2D(_) => "Ray2D",
            Geometry::LineSegment2D(_) => "LineSegment2D",
            Geometry::Polyline2D(_) => "Polyline2D",
            Geometry::Arc2D(_) => "Arc2D",
            Geometry::Polygon2D(_) => "Polygon2D",
            Geometry::Mesh2D(_) => "Mesh2D",
            Geometry::Vector3D(_) => "Vector3D",
            Geometry::Point3D(_) => "Point3D",
            Geometry::Ray3D(_) => "Ray3D",
            Geometry::Plane(_) => "Plane",
            Geometry::LineSegment3D(_) => "LineSegment3D",
            Geometry::Polyline3D(_) => "Polyline3D",
            Geometry::Arc3D(_) => "Arc3D",
            Geometry::Face3D(_) => "Face3D",
            Geometry::Mesh3D(_) => "Mesh3D",
            Geometry::Polyface3D(_) => "Polyface3D",
            Geometry::Sphere(_) => "Sphere",
            Geometry::Cone(_) => "Cone",
            Geometry::Cylinder(_) => "Cylinder",
        }
    }

    /// True for the triangle/quad meshes (not polyfaces)
    pub fn is_mesh(&self) -> bool {
        matches!(self, Geometry::Mesh2D(_) | Geometry::Mesh3D(_))
    }

    /// Number of faces of a mesh or polyface
    pub fn face_count(&self) -> Option<usize> {
        match self {
            Geometry::Mesh2D(mesh) => Some(mesh.faces.len()),
            Geometry::Mesh3D(mesh) => Some(mesh.faces.len()),
            Geometry::Polyface3D(face) => Some(face.face_indices.len()),
            _ => None,
        }
    }

    /// Number of vertices of a mesh or polyface
    pub fn vertex_count(&self) -> Option<usize> {
        match self {
            Geometry::Mesh2D(mesh) => Some(mesh.vertices.len()),
            Geometry::Mesh3D(mesh) => Some(mesh.vertices.len()),
            Geometry::Polyface3D(face) => Some(face.vertices.len()),
            _ => None,
        }
    }
}
