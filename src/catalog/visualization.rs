//! Visualization sets: geometry aligned with data, legends and data types

use serde_json::json;

use super::base::{default_marker, default_or_number, user_data};
use super::{DISPLAY_TYPES, GEOMETRY_TYPES};
use crate::model::{EnumDefinition, FieldDef, FieldType, ModelDefinition, ModelRegistry};

/// Screen dimension: an integer followed by `px` or `%`
pub(crate) const SCREEN_DIMENSION: &str = r"^\d*px|\d*%$";

#[rustfmt::skip]
const DATA_TYPES: &[&str] = &[
    "ActivityLevel", "AerosolOpticalDepth", "AirSpeed",
    "AirTemperature", "AirTemperatureDelta", "Albedo",
    "Angle", "Area", "AtmosphericStationPressure",
    "CeilingHeight", "ClothingInsulation", "ConvectionCoefficient",
    "CoolingDegreeTime", "Current", "DewPointTemperature",
    "DiffuseHorizontalIlluminance", "DiffuseHorizontalIrradiance", "DiffuseHorizontalRadiation",
    "DirectHorizontalIrradiance", "DirectHorizontalRadiation", "DirectNormalIlluminance",
    "DirectNormalIrradiance", "DirectNormalRadiation", "DiscomfortReason",
    "Distance", "DryBulbTemperature", "EffectiveRadiantField",
    "Energy", "EnergyFlux", "EnergyIntensity",
    "Enthalpy", "ExtraterrestrialDirectNormalRadiation", "ExtraterrestrialHorizontalRadiation",
    "Fraction", "GlobalHorizontalIlluminance", "GlobalHorizontalIrradiance",
    "GlobalHorizontalRadiation", "GroundTemperature", "HeatingDegreeTime",
    "HorizontalInfraredRadiationIntensity", "HumidityRatio", "Illuminance",
    "Irradiance", "LiquidPrecipitationDepth", "LiquidPrecipitationQuantity",
    "Luminance", "Mass", "MassFlowRate",
    "MeanRadiantTemperature", "MetabolicRate", "OpaqueSkyCover",
    "OperativeTemperature", "OperativeTemperatureDelta", "PercentagePeopleDissatisfied",
    "Power", "PrecipitableWater", "PredictedMeanVote",
    "Pressure", "PrevailingOutdoorTemperature", "RValue",
    "RadiantCoefficient", "RadiantTemperature", "RadiantTemperatureDelta",
    "Radiation", "RelativeHumidity", "SkyTemperature",
    "SnowDepth", "SpecificEnergy", "Speed",
    "StandardEffectiveTemperature", "Temperature", "TemperatureDelta",
    "TemperatureTime", "ThermalComfort", "ThermalCondition",
    "ThermalConditionElevenPoint", "ThermalConditionFivePoint", "ThermalConditionNinePoint",
    "ThermalConditionSevenPoint", "Time", "TotalSkyCover",
    "UTCICategory", "UValue", "UniversalThermalClimateIndex",
    "Visibility", "Voltage", "Volume",
    "VolumeFlowRate", "VolumeFlowRateIntensity", "WetBulbTemperature",
    "WindDirection", "WindSpeed", "ZenithLuminance",
];

fn default_or_dimension() -> FieldType {
    FieldType::union(vec![
        FieldType::reference("Default"),
        FieldType::pattern(SCREEN_DIMENSION),
    ])
}

fn defaulted(name: &str, ty: FieldType, description: &str) -> FieldDef {
    FieldDef::with_default(name, ty, default_marker(), description)
}

pub(crate) fn legend_parameters() -> FieldDef {
    FieldDef::optional(
        "legend_parameters",
        FieldType::reference("LegendParameters"),
        "An Optional LegendParameters object to override default parameters of the legend. \
         None indicates that default legend parameters will be used.",
    )
}

fn data_type() -> FieldDef {
    FieldDef::optional(
        "data_type",
        FieldType::one_of(&["DataType", "GenericDataType"]),
        "Optional DataType from the ladybug datatype subpackage (ie. Temperature()) , which \
         will be used to assign default legend properties. If None, the legend associated \
         with this object will contain no units unless a unit below is specified.",
    )
}

pub(crate) fn unit() -> FieldDef {
    FieldDef::with_default(
        "unit",
        FieldType::string(),
        json!(""),
        "Optional text string for the units of the values. (ie. \"C\"). If None, the \
         default units of the data_type will be used.",
    )
}

fn hidden() -> FieldDef {
    FieldDef::with_default(
        "hidden",
        FieldType::boolean(),
        json!(false),
        "A boolean to note whether the geometry is hidden by default and must be un-hidden \
         to be visible in the 3D scene.",
    )
}

fn register_legends(registry: &mut ModelRegistry) {
    registry
        .add_model(
            ModelDefinition::concrete("Legend3DParameters", "Parameters of a legend in the 3D scene.")
                .field(FieldDef::optional(
                    "base_plane",
                    FieldType::reference("Plane"),
                    "A Ladybug Plane object to note the starting position from where the \
                     legend will be generated. The default is the world XY plane at origin \
                     (0, 0, 0) unless the legend is assigned to a specific geometry, in which \
                     case the origin is in the lower right corner of the geometry bounding \
                     box for vertical legends and the upper right corner for horizontal \
                     legends.",
                ))
                .field(defaulted(
                    "segment_height",
                    default_or_number(None),
                    "A number to set the height for each of the legend segments. The default \
                     is 1 unless the legend is assigned to a specific geometry, in which case \
                     it is automatically set to a value on an appropriate scale (some \
                     fraction of the bounding box around the geometry).",
                ))
                .field(defaulted(
                    "segment_width",
                    default_or_number(None),
                    "A number to set the width for each of the legend segments. The default \
                     is 1 unless the legend is assigned to a specific geometry, in which case \
                     it is automatically set to a value on an appropriate scale (some \
                     fraction of the bounding box around the geometry).",
                ))
                .field(defaulted(
                    "text_height",
                    default_or_number(None),
                    "A number to set the height for the legend text. Default is 1/3 of the \
                     segment_height.",
                )),
        )
        .add_model(
            ModelDefinition::concrete(
                "Legend2DParameters",
                "Parameters of a legend drawn in the 2D plane of a screen.",
            )
            .field(defaulted(
                "origin_x",
                default_or_dimension(),
                "A text string to note the X coordinate of the base point from where the \
                 legend will be generated (assuming an origin in the upper-left corner of the \
                 viewport with higher positive values of X moving to the right). Text must be \
                 formatted as an integer followed by either \"px\" (to denote the number of \
                 viewport pixels) or \"%\" (to denote the percentage of the viewport width). \
                 Examples include 10px, 5%. The default is set to make the legend clearly \
                 visible on the viewport (usually 10px).",
            ))
            .field(defaulted(
                "origin_y",
                default_or_dimension(),
                "A text string to note the Y coordinate of the base point from where the \
                 legend will be generated (assuming an origin in the upper-left corner of the \
                 viewport with higher positive values of Y moving downward). Text must be \
                 formatted as an integer followed by either \"px\" (to denote the number of \
                 viewport pixels) or \"%\" (to denote the percentage of the viewport height). \
                 Examples include 10px, 5%. The default is set to make the legend clearly \
                 visible on the viewport (usually 50px).",
            ))
            .field(defaulted(
                "segment_height",
                default_or_dimension(),
                "A text string to note the height for each of the legend segments. Text must \
                 be formatted as an integer followed by either \"px\" or \"%\". Examples \
                 include 10px, 5%. The default is set to make most legends readable (25px for \
                 horizontal legends and 36px for vertical legends).",
            ))
            .field(defaulted(
                "segment_width",
                default_or_dimension(),
                "A text string to set the width for each of the legend segments. Text must be \
                 formatted as an integer followed by either \"px\" or \"%\". Examples include \
                 10px, 5%. The default is set to make most legends readable (36px for \
                 horizontal legends and 25px for vertical legends).",
            ))
            .field(defaulted(
                "text_height",
                default_or_dimension(),
                "A text string to set the height for the legend text. Text must be formatted \
                 as an integer followed by either \"px\" or \"%\". Examples include 10px, 5%. \
                 Default is 12px.",
            )),
        )
        .add_model(
            ModelDefinition::concrete("LegendParameters", "Legend parameters used to customize legends.")
                .field(defaulted(
                    "min",
                    default_or_number(None),
                    "A number to set the lower boundary of the legend. If Default, the minimum \
                     of the values associated with the legend will be used.",
                ))
                .field(defaulted(
                    "max",
                    default_or_number(None),
                    "A number to set the upper boundary of the legend. If Default, the maximum \
                     of the values associated with the legend will be used.",
                ))
                .field(defaulted(
                    "segment_count",
                    FieldType::union(vec![
                        FieldType::reference("Default"),
                        FieldType::integer_range(Some(2), None),
                    ]),
                    "An integer representing the number of steps between the high and low \
                     boundary of the legend. The default is set to 11 or it will be equal to \
                     the number of items in the ordinal_dictionary. Any custom values input in \
                     here should always be greater than or equal to 2.",
                ))
                .field(FieldDef::optional(
                    "colors",
                    FieldType::array_bounded(FieldType::reference("Color"), Some(2), None),
                    "An list of color objects. Default is the Ladybug original colorset.",
                ))
                .field(FieldDef::with_default(
                    "title",
                    FieldType::string(),
                    json!(""),
                    "Text string for Legend title. Typically, the units of the data are used \
                     here but the type of data might also be used.",
                ))
                .field(FieldDef::with_default(
                    "continuous_legend",
                    FieldType::boolean(),
                    json!(false),
                    "Boolean noting whether legend is drawn as a gradient or discrete segments.",
                ))
                .field(FieldDef::optional(
                    "ordinal_dictionary",
                    FieldType::dict(),
                    "Optional dictionary that maps values to text categories. If None, \
                     numerical values will be used for the legend segments. If not, text \
                     categories will be used and the legend will be ordinal.",
                ))
                .field(FieldDef::with_default(
                    "decimal_count",
                    FieldType::integer_range(Some(0), None),
                    json!(2),
                    "An an integer for the number of decimal places in the legend text. Note \
                     that this input has no bearing on the resulting legend text when an \
                     ordinal_dictionary is present.",
                ))
                .field(FieldDef::with_default(
                    "include_larger_smaller",
                    FieldType::boolean(),
                    json!(false),
                    "Boolean noting whether > and < should be included in legend segment text.",
                ))
                .field(FieldDef::with_default(
                    "vertical",
                    FieldType::boolean(),
                    json!(true),
                    "Boolean noting whether legend is vertical (True) or horizontal (False).",
                ))
                .field(FieldDef::with_default(
                    "font",
                    FieldType::string(),
                    json!("Arial"),
                    "Text string to set the font for the legend text. Examples include \
                     \"Arial\", \"Times New Roman\", \"Courier\".",
                ))
                .field(FieldDef::optional(
                    "properties_3d",
                    FieldType::reference("Legend3DParameters"),
                    "A Legend3DParameters object to specify the dimensional properties of the \
                     legend when it is rendered in the 3D environment of the geometry scene.",
                ))
                .field(FieldDef::optional(
                    "properties_2d",
                    FieldType::reference("Legend2DParameters"),
                    "A Legend2DParameters object to specify the dimensional properties of the \
                     legend when it is rendered in the 2D plane of a screen.",
                ))
                .field(user_data()),
        );
}

fn register_data_types(registry: &mut ModelRegistry) {
    registry
        .add_enum(EnumDefinition::new("DataTypes", "An enumeration.", DATA_TYPES))
        .add_model(
            ModelDefinition::concrete("DataType", "Data type representation.")
                .field(FieldDef::required(
                    "data_type",
                    FieldType::reference("DataTypes"),
                    "Text to indicate the type of data. This governs the behavior of the data \
                     type and the acceptable units. The DataTypes enumeration contains all \
                     acceptable types.",
                ))
                .field(FieldDef::required(
                    "name",
                    FieldType::string(),
                    "Text to indicate how the data type displays. This can be more specific \
                     than the data_type.",
                )),
        )
        .add_model(
            ModelDefinition::concrete("GenericDataType", "Generic data type representation.")
                .field(FieldDef::with_default(
                    "data_type",
                    FieldType::literal("GenericType"),
                    json!("GenericType"),
                    "Always GenericType for generic data types.",
                ))
                .field(FieldDef::required(
                    "name",
                    FieldType::string(),
                    "Text to indicate how the data type displays. This can be more specific \
                     than the data_type.",
                ))
                .field(FieldDef::required(
                    "base_unit",
                    FieldType::string(),
                    "Text string for the base unit of the data type, which should be standard \
                     SI units where possible.",
                ))
                .field(defaulted(
                    "min",
                    default_or_number(None),
                    "Optional lower limit for the data type, values below which should be \
                     physically or mathematically impossible. (Default: -inf)",
                ))
                .field(defaulted(
                    "max",
                    default_or_number(None),
                    "Optional upper limit for the data type, values above which should be \
                     physically or mathematically impossible. (Default: +inf)",
                ))
                .field(FieldDef::with_default(
                    "abbreviation",
                    FieldType::string(),
                    json!(""),
                    "An optional abbreviation for the data type as text.",
                ))
                .field(FieldDef::optional(
                    "unit_descr",
                    FieldType::dict(),
                    "An optional dictionary describing categories that the numerical values \
                     of the units relate to.",
                ))
                .field(FieldDef::with_default(
                    "point_in_time",
                    FieldType::boolean(),
                    json!(true),
                    "Boolean to note whether the data type represents conditions at a single \
                     instant in time (True) as opposed to being an average or accumulation \
                     over time (False) when it is found in hourly lists of data.",
                ))
                .field(FieldDef::with_default(
                    "cumulative",
                    FieldType::boolean(),
                    json!(false),
                    "Boolean to tell whether the data type can be cumulative when it is \
                     represented over time (True) or it can only be averaged over time to be \
                     meaningful (False). Note that cumulative cannot be True when \
                     point_in_time is also True.",
                )),
        );
}

pub(crate) fn register(registry: &mut ModelRegistry) {
    register_legends(registry);
    register_data_types(registry);

    registry
        .add_model(
            ModelDefinition::concrete(
                "VisualizationData",
                "Represents a data set for visualization with legend parameters and data type.",
            )
            .field(FieldDef::required(
                "values",
                FieldType::array_bounded(FieldType::number(), Some(1), None),
                "A list of numerical values that will be used to generate the visualization \
                 colors.",
            ))
            .field(legend_parameters())
            .field(data_type())
            .field(unit())
            .field(user_data()),
        )
        .add_model(
            ModelDefinition::concrete(
                "VisualizationMetaData",
                "Represents the visualization metadata that can be assigned to \
                 VisualizationData.",
            )
            .field(legend_parameters())
            .field(data_type())
            .field(unit())
            .field(user_data()),
        )
        .add_model(
            ModelDefinition::abstract_base("VisualizationBase", "Base class for visualization objects.")
                .field(FieldDef::required(
                    "identifier",
                    FieldType::String {
                        pattern: Some("^[.A-Za-z0-9_-]+$".to_string()),
                        min_length: Some(1),
                        max_length: Some(100),
                    },
                    "Text string for a unique object ID. Must be less than 100 characters and \
                     not contain spaces or special characters.",
                ))
                .field(FieldDef::optional(
                    "display_name",
                    FieldType::string(),
                    "Display name of the object with no character restrictions. This is \
                     typically used to set the layer of the object in the interface that \
                     renders the VisualizationSet. A :: in the display_name can be used to \
                     denote sub-layers following a convention of ParentLayer::SubLayer. If not \
                     set, the display_name will be equal to the object identifier.",
                ))
                .field(user_data()),
        )
        .add_model(
            ModelDefinition::concrete(
                "AnalysisGeometry",
                "An object where multiple data streams correspond to the same geometry.",
            )
            .extends("VisualizationBase")
            .field(FieldDef::required(
                "geometry",
                FieldType::array(FieldType::one_of(GEOMETRY_TYPES)),
                "A list of ladybug-geometry objects that is aligned with the values in the \
                 input data_sets. The length of this list should usually be equal to the total \
                 number of values in each data_set, indicating that each geometry gets a \
                 single color. Alternatively, if all of the geometry objects are meshes, the \
                 number of values in the data can be equal to the total number of faces \
                 across the meshes or the total number of vertices across the meshes.",
            ))
            .field(FieldDef::required(
                "data_sets",
                FieldType::array_bounded(FieldType::reference("VisualizationData"), Some(1), None),
                "An list of VisualizationData objects representing the data sets that are \
                 associated with the input geometry.",
            ))
            .field(FieldDef::with_default(
                "active_data",
                FieldType::integer(),
                json!(0),
                "An integer to denote which of the input data_sets should be displayed by \
                 default.",
            ))
            .field(super::display2d::display_mode("Surface"))
            .field(hidden()),
        )
        .add_model(
            ModelDefinition::concrete(
                "ContextGeometry",
                "An object representing context geometry to display.",
            )
            .extends("VisualizationBase")
            .field(FieldDef::required(
                "geometry",
                FieldType::array(FieldType::one_of(DISPLAY_TYPES)),
                "A list of ladybug-geometry or ladybug-display objects that gives context to \
                 analysis geometry or other aspects of the visualization. Typically, these \
                 will display in wireframe around the geometry, though the properties of \
                 display geometry can be used to customize the visualization.",
            ))
            .field(hidden()),
        )
        .add_model(
            ModelDefinition::concrete(
                "VisualizationSet",
                "A visualization set containing analysis and context geometry to be visualized.",
            )
            .extends("VisualizationBase")
            .field(FieldDef::optional(
                "geometry",
                FieldType::array(FieldType::one_of(&["AnalysisGeometry", "ContextGeometry"])),
                "A list of AnalysisGeometry and ContextGeometry objects to display in the \
                 visualization. Each geometry object will typically be translated to its own \
                 layer within the interface that renders the VisualizationSet.",
            )),
        );
}
