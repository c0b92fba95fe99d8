// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Instructions for generating sensor grids from rooms.
//!
//! A grid parameter is a small immutable value stored on a 2D room. When the
//! model is translated to 3D each parameter is applied to the matching 3D
//! room and yields at most one sensor grid.

use std::fmt;

use df_radiance_core::hb::{ExteriorApertureType, ExteriorFaceType, Room};
use df_radiance_core::typing::{
    check_type, field, float_in_range, float_positive, int_positive, optional_bool,
    optional_f64, optional_i64, optional_str, optional_vector, required_f64, type_tag,
};
use df_radiance_core::SensorGrid;
use df_radiance_geometry::Vector3;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

fn valid_dimension(dimension: f64) -> df_radiance_core::Result<f64> {
    let dimension = float_positive(dimension, "grid dimension")?;
    if dimension == 0.0 {
        return Err(df_radiance_core::Error::InvalidValue {
            name: "grid dimension".into(),
            reason: "must be greater than 0".into(),
        });
    }
    Ok(dimension)
}

fn valid_offset(offset: f64) -> df_radiance_core::Result<f64> {
    float_in_range(offset, f64::MIN, f64::MAX, "grid offset")
}

fn base_dict(tag: &str, dimension: f64, offset: f64) -> Map<String, Value> {
    let mut base = Map::new();
    base.insert("type".into(), Value::from(tag));
    base.insert("dimension".into(), Value::from(dimension));
    base.insert("offset".into(), Value::from(offset));
    base
}

fn write_include_mesh(base: &mut Map<String, Value>, include_mesh: bool) {
    if !include_mesh {
        base.insert("include_mesh".into(), Value::from(false));
    }
}

/// A grid over the floors of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomGridParameter {
    dimension: f64,
    offset: f64,
    wall_offset: f64,
    include_mesh: bool,
}

impl RoomGridParameter {
    pub const DEFAULT_OFFSET: f64 = 1.0;

    pub fn new(dimension: f64, offset: f64, wall_offset: f64, include_mesh: bool) -> Result<Self> {
        Ok(Self {
            dimension: valid_dimension(dimension)?,
            offset: valid_offset(offset)?,
            wall_offset: float_in_range(wall_offset, 0.0, f64::MAX, "grid wall offset")?,
            include_mesh,
        })
    }

    pub fn dimension(&self) -> f64 {
        self.dimension
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Distance from the walls within which sensors are removed.
    pub fn wall_offset(&self) -> f64 {
        self.wall_offset
    }

    pub fn include_mesh(&self) -> bool {
        self.include_mesh
    }

    /// `None` when the offset is not below the ceiling or no cell fits the floor.
    pub fn generate_grid_from_room(&self, room: &Room) -> Option<SensorGrid> {
        if self.offset >= room.floor_to_ceiling_height() {
            return None;
        }
        let mut grid = room.generate_sensor_grid(self.dimension, self.offset, self.wall_offset)?;
        if !self.include_mesh {
            grid.mesh = None;
        }
        Some(grid)
    }

    /// A copy with every length scaled. The factor must keep the
    /// dimension positive.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        Self::new(
            self.dimension * factor,
            self.offset * factor,
            self.wall_offset * factor,
            self.include_mesh,
        )
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "RoomGridParameter")?;
        Self::new(
            required_f64(data, "dimension")?,
            optional_f64(data, "offset")?.unwrap_or(Self::DEFAULT_OFFSET),
            optional_f64(data, "wall_offset")?.unwrap_or(0.0),
            optional_bool(data, "include_mesh")?.unwrap_or(true),
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut base = base_dict("RoomGridParameter", self.dimension, self.offset);
        if self.wall_offset != 0.0 {
            base.insert("wall_offset".into(), Value::from(self.wall_offset));
        }
        write_include_mesh(&mut base, self.include_mesh);
        Value::Object(base)
    }
}

impl fmt::Display for RoomGridParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RoomGridParameter [dimension: {}] [offset: {}]",
            self.dimension, self.offset
        )
    }
}

/// A floor grid with several horizontal view directions at each position.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomRadialGridParameter {
    dimension: f64,
    offset: f64,
    wall_offset: f64,
    dir_count: u32,
    start_vector: [f64; 3],
    mesh_radius: Option<f64>,
    include_mesh: bool,
}

impl RoomRadialGridParameter {
    pub const DEFAULT_OFFSET: f64 = 1.2;
    pub const DEFAULT_DIR_COUNT: u32 = 8;
    pub const DEFAULT_START_VECTOR: [f64; 3] = [0.0, -1.0, 0.0];

    /// `mesh_radius` of `None` autocalculates the radius from the dimension.
    pub fn new(
        dimension: f64,
        offset: f64,
        wall_offset: f64,
        dir_count: u32,
        start_vector: [f64; 3],
        mesh_radius: Option<f64>,
        include_mesh: bool,
    ) -> Result<Self> {
        if dir_count == 0 {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "radial grid dir count".into(),
                reason: "must not be equal to 0".into(),
            }
            .into());
        }
        let mesh_radius = mesh_radius
            .map(|r| float_positive(r, "radial grid mesh_radius"))
            .transpose()?;
        Ok(Self {
            dimension: valid_dimension(dimension)?,
            offset: valid_offset(offset)?,
            wall_offset: float_in_range(wall_offset, 0.0, f64::MAX, "grid wall offset")?,
            dir_count,
            start_vector,
            mesh_radius,
            include_mesh,
        })
    }

    pub fn dimension(&self) -> f64 {
        self.dimension
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn wall_offset(&self) -> f64 {
        self.wall_offset
    }

    /// Number of directions around each position.
    pub fn dir_count(&self) -> u32 {
        self.dir_count
    }

    /// First direction; the others are rotated from it about Z.
    pub fn start_vector(&self) -> [f64; 3] {
        self.start_vector
    }

    pub fn mesh_radius(&self) -> Option<f64> {
        self.mesh_radius
    }

    pub fn include_mesh(&self) -> bool {
        self.include_mesh
    }

    pub fn generate_grid_from_room(&self, room: &Room) -> Option<SensorGrid> {
        if self.offset >= room.floor_to_ceiling_height() {
            return None;
        }
        let radius = if self.include_mesh {
            self.mesh_radius
        } else {
            Some(0.0)
        };
        let [x, y, z] = self.start_vector;
        room.generate_sensor_grid_radial(
            self.dimension,
            self.offset,
            self.wall_offset,
            self.dir_count,
            Vector3::new(x, y, z),
            radius,
        )
    }

    pub fn scale(&self, factor: f64) -> Result<Self> {
        Self::new(
            self.dimension * factor,
            self.offset * factor,
            self.wall_offset * factor,
            self.dir_count,
            self.start_vector,
            self.mesh_radius.map(|r| r * factor),
            self.include_mesh,
        )
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "RoomRadialGridParameter")?;
        let dir_count = match optional_i64(data, "dir_count")? {
            Some(n) => int_positive(n, "radial grid dir count")?,
            None => Self::DEFAULT_DIR_COUNT,
        };
        // an autocalculate object is written as {"type": "Autocalculate"}
        let mesh_radius = match field(data, "mesh_radius") {
            Some(Value::Object(_)) | None => None,
            Some(_) => optional_f64(data, "mesh_radius")?,
        };
        Self::new(
            required_f64(data, "dimension")?,
            optional_f64(data, "offset")?.unwrap_or(Self::DEFAULT_OFFSET),
            optional_f64(data, "wall_offset")?.unwrap_or(0.0),
            dir_count,
            optional_vector(data, "start_vector")?.unwrap_or(Self::DEFAULT_START_VECTOR),
            mesh_radius,
            optional_bool(data, "include_mesh")?.unwrap_or(true),
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut base = base_dict("RoomRadialGridParameter", self.dimension, self.offset);
        base.insert("dir_count".into(), Value::from(self.dir_count));
        base.insert(
            "start_vector".into(),
            Value::from(self.start_vector.to_vec()),
        );
        if let Some(r) = self.mesh_radius {
            base.insert("mesh_radius".into(), Value::from(r));
        }
        if self.wall_offset != 0.0 {
            base.insert("wall_offset".into(), Value::from(self.wall_offset));
        }
        write_include_mesh(&mut base, self.include_mesh);
        Value::Object(base)
    }
}

impl fmt::Display for RoomRadialGridParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RoomRadialGridParameter [dimension: {}] [offset: {}]",
            self.dimension, self.offset
        )
    }
}

/// A grid over the outdoor faces of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct ExteriorFaceGridParameter {
    dimension: f64,
    offset: f64,
    face_type: ExteriorFaceType,
    punched_geometry: bool,
    include_mesh: bool,
}

impl ExteriorFaceGridParameter {
    pub const DEFAULT_OFFSET: f64 = 0.1;

    pub fn new(
        dimension: f64,
        offset: f64,
        face_type: ExteriorFaceType,
        punched_geometry: bool,
        include_mesh: bool,
    ) -> Result<Self> {
        Ok(Self {
            dimension: valid_dimension(dimension)?,
            offset: valid_offset(offset)?,
            face_type,
            punched_geometry,
            include_mesh,
        })
    }

    pub fn dimension(&self) -> f64 {
        self.dimension
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn face_type(&self) -> ExteriorFaceType {
        self.face_type
    }

    /// Whether apertures and doors are cut out of the faces before gridding.
    pub fn punched_geometry(&self) -> bool {
        self.punched_geometry
    }

    pub fn include_mesh(&self) -> bool {
        self.include_mesh
    }

    pub fn generate_grid_from_room(&self, room: &Room) -> Option<SensorGrid> {
        let mut grid = room.generate_exterior_face_sensor_grid(
            self.dimension,
            self.offset,
            self.face_type,
            self.punched_geometry,
        )?;
        if !self.include_mesh {
            grid.mesh = None;
        }
        Some(grid)
    }

    pub fn scale(&self, factor: f64) -> Result<Self> {
        Self::new(
            self.dimension * factor,
            self.offset * factor,
            self.face_type,
            self.punched_geometry,
            self.include_mesh,
        )
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "ExteriorFaceGridParameter")?;
        let face_type = match optional_str(data, "face_type")? {
            Some(s) => s.parse()?,
            None => ExteriorFaceType::default(),
        };
        Self::new(
            required_f64(data, "dimension")?,
            optional_f64(data, "offset")?.unwrap_or(Self::DEFAULT_OFFSET),
            face_type,
            optional_bool(data, "punched_geometry")?.unwrap_or(false),
            optional_bool(data, "include_mesh")?.unwrap_or(true),
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut base = base_dict("ExteriorFaceGridParameter", self.dimension, self.offset);
        base.insert("face_type".into(), Value::from(self.face_type.as_str()));
        if self.punched_geometry {
            base.insert("punched_geometry".into(), Value::from(true));
        }
        write_include_mesh(&mut base, self.include_mesh);
        Value::Object(base)
    }
}

impl fmt::Display for ExteriorFaceGridParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ExteriorFaceGridParameter [dimension: {}] [type: {}]",
            self.dimension, self.face_type
        )
    }
}

/// A grid over the apertures of the outdoor faces of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct ExteriorApertureGridParameter {
    dimension: f64,
    offset: f64,
    aperture_type: ExteriorApertureType,
    include_mesh: bool,
}

impl ExteriorApertureGridParameter {
    pub const DEFAULT_OFFSET: f64 = 0.1;

    pub fn new(
        dimension: f64,
        offset: f64,
        aperture_type: ExteriorApertureType,
        include_mesh: bool,
    ) -> Result<Self> {
        Ok(Self {
            dimension: valid_dimension(dimension)?,
            offset: valid_offset(offset)?,
            aperture_type,
            include_mesh,
        })
    }

    pub fn dimension(&self) -> f64 {
        self.dimension
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn aperture_type(&self) -> ExteriorApertureType {
        self.aperture_type
    }

    pub fn include_mesh(&self) -> bool {
        self.include_mesh
    }

    pub fn generate_grid_from_room(&self, room: &Room) -> Option<SensorGrid> {
        let mut grid = room.generate_exterior_aperture_sensor_grid(
            self.dimension,
            self.offset,
            self.aperture_type,
        )?;
        if !self.include_mesh {
            grid.mesh = None;
        }
        Some(grid)
    }

    pub fn scale(&self, factor: f64) -> Result<Self> {
        Self::new(
            self.dimension * factor,
            self.offset * factor,
            self.aperture_type,
            self.include_mesh,
        )
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "ExteriorApertureGridParameter")?;
        let aperture_type = match optional_str(data, "aperture_type")? {
            Some(s) => s.parse()?,
            None => ExteriorApertureType::default(),
        };
        Self::new(
            required_f64(data, "dimension")?,
            optional_f64(data, "offset")?.unwrap_or(Self::DEFAULT_OFFSET),
            aperture_type,
            optional_bool(data, "include_mesh")?.unwrap_or(true),
        )
    }

    pub fn to_dict(&self) -> Value {
        let mut base = base_dict("ExteriorApertureGridParameter", self.dimension, self.offset);
        base.insert("aperture_type".into(), Value::from(self.aperture_type.as_str()));
        write_include_mesh(&mut base, self.include_mesh);
        Value::Object(base)
    }
}

impl fmt::Display for ExteriorApertureGridParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ExteriorApertureGridParameter [dimension: {}] [type: {}]",
            self.dimension, self.aperture_type
        )
    }
}

/// Any of the grid parameter variants.
#[derive(Debug, Clone, PartialEq)]
pub enum GridParameter {
    Room(RoomGridParameter),
    RoomRadial(RoomRadialGridParameter),
    ExteriorFace(ExteriorFaceGridParameter),
    ExteriorAperture(ExteriorApertureGridParameter),
}

type GridParameterFactory = fn(&Value) -> Result<GridParameter>;

fn load_room(data: &Value) -> Result<GridParameter> {
    RoomGridParameter::from_dict(data).map(GridParameter::Room)
}

fn load_room_radial(data: &Value) -> Result<GridParameter> {
    RoomRadialGridParameter::from_dict(data).map(GridParameter::RoomRadial)
}

fn load_exterior_face(data: &Value) -> Result<GridParameter> {
    ExteriorFaceGridParameter::from_dict(data).map(GridParameter::ExteriorFace)
}

fn load_exterior_aperture(data: &Value) -> Result<GridParameter> {
    ExteriorApertureGridParameter::from_dict(data).map(GridParameter::ExteriorAperture)
}

/// Dictionary loaders keyed by their `type` tag.
pub const GRID_PARAMETER_FACTORIES: &[(&str, GridParameterFactory)] = &[
    ("RoomGridParameter", load_room),
    ("RoomRadialGridParameter", load_room_radial),
    ("ExteriorFaceGridParameter", load_exterior_face),
    ("ExteriorApertureGridParameter", load_exterior_aperture),
];

impl GridParameter {
    /// The `type` tag written in dictionaries.
    pub fn type_name(&self) -> &'static str {
        match self {
            GridParameter::Room(_) => "RoomGridParameter",
            GridParameter::RoomRadial(_) => "RoomRadialGridParameter",
            GridParameter::ExteriorFace(_) => "ExteriorFaceGridParameter",
            GridParameter::ExteriorAperture(_) => "ExteriorApertureGridParameter",
        }
    }

    pub fn dimension(&self) -> f64 {
        match self {
            GridParameter::Room(p) => p.dimension(),
            GridParameter::RoomRadial(p) => p.dimension(),
            GridParameter::ExteriorFace(p) => p.dimension(),
            GridParameter::ExteriorAperture(p) => p.dimension(),
        }
    }

    pub fn offset(&self) -> f64 {
        match self {
            GridParameter::Room(p) => p.offset(),
            GridParameter::RoomRadial(p) => p.offset(),
            GridParameter::ExteriorFace(p) => p.offset(),
            GridParameter::ExteriorAperture(p) => p.offset(),
        }
    }

    pub fn include_mesh(&self) -> bool {
        match self {
            GridParameter::Room(p) => p.include_mesh(),
            GridParameter::RoomRadial(p) => p.include_mesh(),
            GridParameter::ExteriorFace(p) => p.include_mesh(),
            GridParameter::ExteriorAperture(p) => p.include_mesh(),
        }
    }

    /// Apply the parameter to a 3D room; `None` when no grid can be made.
    pub fn generate_grid_from_room(&self, room: &Room) -> Option<SensorGrid> {
        match self {
            GridParameter::Room(p) => p.generate_grid_from_room(room),
            GridParameter::RoomRadial(p) => p.generate_grid_from_room(room),
            GridParameter::ExteriorFace(p) => p.generate_grid_from_room(room),
            GridParameter::ExteriorAperture(p) => p.generate_grid_from_room(room),
        }
    }

    /// A copy with every length multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> Result<Self> {
        Ok(match self {
            GridParameter::Room(p) => GridParameter::Room(p.scale(factor)?),
            GridParameter::RoomRadial(p) => GridParameter::RoomRadial(p.scale(factor)?),
            GridParameter::ExteriorFace(p) => GridParameter::ExteriorFace(p.scale(factor)?),
            GridParameter::ExteriorAperture(p) => {
                GridParameter::ExteriorAperture(p.scale(factor)?)
            }
        })
    }

    /// Load any variant, selected by the dictionary `type` tag.
    pub fn from_dict(data: &Value) -> Result<Self> {
        let tag = type_tag(data)?;
        let (_, load) = GRID_PARAMETER_FACTORIES
            .iter()
            .find(|(name, _)| *name == tag)
            .ok_or_else(|| Error::UnknownGridParameter(tag.to_string()))?;
        load(data)
    }

    pub fn to_dict(&self) -> Value {
        match self {
            GridParameter::Room(p) => p.to_dict(),
            GridParameter::RoomRadial(p) => p.to_dict(),
            GridParameter::ExteriorFace(p) => p.to_dict(),
            GridParameter::ExteriorAperture(p) => p.to_dict(),
        }
    }
}

impl fmt::Display for GridParameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridParameter::Room(p) => p.fmt(f),
            GridParameter::RoomRadial(p) => p.fmt(f),
            GridParameter::ExteriorFace(p) => p.fmt(f),
            GridParameter::ExteriorAperture(p) => p.fmt(f),
        }
    }
}

impl From<RoomGridParameter> for GridParameter {
    fn from(p: RoomGridParameter) -> Self {
        GridParameter::Room(p)
    }
}

impl From<RoomRadialGridParameter> for GridParameter {
    fn from(p: RoomRadialGridParameter) -> Self {
        GridParameter::RoomRadial(p)
    }
}

impl From<ExteriorFaceGridParameter> for GridParameter {
    fn from(p: ExteriorFaceGridParameter) -> Self {
        GridParameter::ExteriorFace(p)
    }
}

impl From<ExteriorApertureGridParameter> for GridParameter {
    fn from(p: ExteriorApertureGridParameter) -> Self {
        GridParameter::ExteriorAperture(p)
    }
}

/// Load a list of grid parameter dictionaries.
pub fn grid_parameters_from_dicts(dicts: &[Value]) -> Result<Vec<GridParameter>> {
    dicts.iter().map(GridParameter::from_dict).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_radiance_geometry::Point3;
    use serde_json::json;

    fn office() -> Room {
        Room::from_box("Office", 4.0, 3.0, 3.0, Point3::origin()).unwrap()
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let gp = GridParameter::from_dict(&json!({"type": "RoomGridParameter", "dimension": 0.5}))
            .unwrap();
        assert_eq!(gp.offset(), 1.0);
        assert!(gp.include_mesh());
        assert_eq!(gp.to_string(), "RoomGridParameter [dimension: 0.5] [offset: 1]");

        let radial = RoomRadialGridParameter::from_dict(&json!({
            "type": "RoomRadialGridParameter",
            "dimension": 1,
            "mesh_radius": {"type": "Autocalculate"},
            "offset": null
        }))
        .unwrap();
        assert_eq!(radial.offset(), 1.2);
        assert_eq!(radial.dir_count(), 8);
        assert_eq!(radial.start_vector(), [0.0, -1.0, 0.0]);
        assert_eq!(radial.mesh_radius(), None);
    }

    #[test]
    fn dicts_omit_default_flags() {
        let gp = RoomGridParameter::new(0.5, 1.0, 0.0, true).unwrap();
        assert_eq!(
            gp.to_dict(),
            json!({"type": "RoomGridParameter", "dimension": 0.5, "offset": 1.0})
        );
        let ef = ExteriorFaceGridParameter::new(1.0, 0.1, ExteriorFaceType::Roof, true, false)
            .unwrap();
        assert_eq!(
            ef.to_dict(),
            json!({
                "type": "ExteriorFaceGridParameter",
                "dimension": 1.0,
                "offset": 0.1,
                "face_type": "Roof",
                "punched_geometry": true,
                "include_mesh": false
            })
        );
        assert_eq!(
            GridParameter::from_dict(&ef.to_dict()).unwrap(),
            GridParameter::ExteriorFace(ef)
        );
    }

    #[test]
    fn categorical_fields_are_case_insensitive() {
        let ea = ExteriorApertureGridParameter::from_dict(&json!({
            "type": "ExteriorApertureGridParameter",
            "dimension": 0.5,
            "aperture_type": "skylight"
        }))
        .unwrap();
        assert_eq!(ea.aperture_type(), ExteriorApertureType::Skylight);
        assert_eq!(ea.to_dict()["aperture_type"], "Skylight");

        let bad = ExteriorFaceGridParameter::from_dict(&json!({
            "type": "ExteriorFaceGridParameter",
            "dimension": 0.5,
            "face_type": "Ceiling"
        }));
        assert!(bad.unwrap_err().to_string().contains("Ceiling"));
    }

    #[test]
    fn unknown_tag_is_named() {
        let err = GridParameter::from_dict(&json!({"type": "BogusGrid", "dimension": 1}))
            .unwrap_err();
        assert!(matches!(&err, Error::UnknownGridParameter(t) if t == "BogusGrid"));
        assert!(err.to_string().contains("\"BogusGrid\""));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(RoomGridParameter::new(0.0, 1.0, 0.0, true).is_err());
        assert!(RoomGridParameter::new(-1.0, 1.0, 0.0, true).is_err());
        assert!(RoomRadialGridParameter::new(1.0, 1.2, 0.0, 0, [0.0, -1.0, 0.0], None, true)
            .is_err());
    }

    #[test]
    fn scale_touches_lengths_only() {
        let radial =
            RoomRadialGridParameter::new(0.5, 1.2, 0.25, 6, [1.0, 0.0, 0.0], Some(0.2), true)
                .unwrap();
        let gp = GridParameter::from(radial);
        let scaled = gp.scale(2.0).unwrap();
        assert_eq!(scaled.dimension(), 1.0);
        assert_eq!(scaled.offset(), 2.4);
        match scaled {
            GridParameter::RoomRadial(p) => {
                assert_eq!(p.wall_offset(), 0.5);
                assert_eq!(p.mesh_radius(), Some(0.4));
                assert_eq!(p.dir_count(), 6);
                assert_eq!(p.start_vector(), [1.0, 0.0, 0.0]);
            }
            other => panic!("unexpected variant {}", other),
        }
    }

    #[test]
    fn scale_keeps_dimension_positive() {
        let room = RoomGridParameter::new(1.0, 0.8, 0.0, true).unwrap();
        assert!(room.scale(0.0).is_err());
        assert!(room.scale(-1.0).is_err());

        let face = GridParameter::from(
            ExteriorFaceGridParameter::new(0.5, 0.1, ExteriorFaceType::Wall, false, true).unwrap(),
        );
        assert!(face.scale(0.0).is_err());
        assert!(face.scale(-2.0).is_err());

        let scaled = room.scale(0.5).unwrap();
        assert_eq!(RoomGridParameter::from_dict(&scaled.to_dict()).unwrap(), scaled);
    }

    #[test]
    fn offset_at_ceiling_gives_none() {
        let room = office();
        let at_ceiling = RoomGridParameter::new(1.0, 3.0, 0.0, true).unwrap();
        assert!(at_ceiling.generate_grid_from_room(&room).is_none());
        let above = RoomRadialGridParameter::new(1.0, 4.0, 0.0, 8, [0.0, -1.0, 0.0], None, true)
            .unwrap();
        assert!(above.generate_grid_from_room(&room).is_none());
    }

    #[test]
    fn include_mesh_strips_mesh() {
        let room = office();
        let gp = RoomGridParameter::new(1.0, 0.8, 0.0, false).unwrap();
        let grid = gp.generate_grid_from_room(&room).unwrap();
        assert_eq!(grid.count(), 12);
        assert!(grid.mesh.is_none());

        let radial = RoomRadialGridParameter::new(1.0, 1.2, 0.0, 4, [0.0, -1.0, 0.0], None, false)
            .unwrap();
        let grid = radial.generate_grid_from_room(&room).unwrap();
        assert_eq!(grid.count(), 48);
        assert!(grid.mesh.is_none());
    }

    #[test]
    fn exterior_grids_from_room() {
        let room = office();
        let walls = GridParameter::from(
            ExteriorFaceGridParameter::new(1.0, 0.1, ExteriorFaceType::Wall, false, true).unwrap(),
        );
        assert_eq!(walls.generate_grid_from_room(&room).unwrap().count(), 42);
        let apertures = GridParameter::from(
            ExteriorApertureGridParameter::new(0.5, 0.1, ExteriorApertureType::All, true).unwrap(),
        );
        assert!(apertures.generate_grid_from_room(&room).is_none());
    }
}
