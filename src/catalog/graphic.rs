//! Graphic container used to get legends, titles and colors for any graphic

use super::visualization::{legend_parameters, unit};
use super::GEOMETRY_TYPES;
use crate::model::{FieldDef, FieldType, ModelDefinition, ModelRegistry};

pub(crate) fn register(registry: &mut ModelRegistry) {
    registry.add_model(
        ModelDefinition::concrete(
            "GraphicContainer",
            "Graphic container used to get legends, titles, and colors for any graphic.",
        )
        .field(FieldDef::required(
            "values",
            FieldType::array_bounded(FieldType::number(), Some(1), None),
            "An list of numerical values that will be used to generate the legend and colors.",
        ))
        .field(FieldDef::optional(
            "geometry",
            FieldType::union(vec![
                FieldType::reference("Mesh2D"),
                FieldType::reference("Mesh3D"),
                FieldType::reference("Polyface3D"),
                FieldType::array(FieldType::one_of(GEOMETRY_TYPES)),
            ]),
            "An optional ladybug-geometry object (or list of ladybug-geometry objects) that is \
             aligned with the input values. If a Mesh or Polyface is specified here, it is \
             expected that the number of values match the number of faces or the number of \
             vertices. If a list of geometry objects is specified (ie. a list of Point3Ds), it \
             is expected that the length of this list align with the number of values.",
        ))
        .field(FieldDef::optional(
            "min_point",
            FieldType::reference("Point3D"),
            "A Point3D object for the minimum of the bounding box around the graphic \
             geometry. If None, then there must be an input for geometry and the bounding box \
             around this geometry will be used to set up the graphic container.",
        ))
        .field(FieldDef::optional(
            "max_point",
            FieldType::reference("Point3D"),
            "A Point3D object for the maximum of the bounding box around the graphic \
             geometry. If None, then there must be an input for geometry and the bounding box \
             around this geometry will be used to set up the graphic container.",
        ))
        .field(legend_parameters())
        .field(FieldDef::optional(
            "data_type",
            FieldType::reference("DataType"),
            "Optional DataType from the ladybug datatype subpackage (ie. Temperature()) , \
             which will be used to assign default legend properties. If None, the legend \
             associated with this object will contain no units unless a unit below is \
             specified.",
        ))
        .field(unit()),
    );
}
