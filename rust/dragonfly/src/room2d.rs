// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D rooms: horizontal floor plates extruded to a ceiling height.

use df_radiance_core::hb::properties::radiance_block;
use df_radiance_core::hb::BoundaryCondition;
use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{
    check_type, float_in_range, float_positive, optional_array, optional_bool, optional_str,
    required_f64, required_field, required_str, type_tag, valid_rad_string,
};
use df_radiance_geometry::polygon::signed_area;
use df_radiance_geometry::{Face3D, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::keys::{Room2DKey, StoryKey};
use crate::properties::Room2DRadianceProperties;

/// How glazing is laid out on one exterior wall segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WindowParameter {
    /// One window centered on the wall covering a fraction of its area.
    SimpleWindowRatio { window_ratio: f64 },
    /// One rectangular window centered along the wall.
    SingleWindow {
        width: f64,
        height: f64,
        #[serde(default = "default_sill_height")]
        sill_height: f64,
    },
}

fn default_sill_height() -> f64 {
    1.0
}

/// Skylight layout on an exposed roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SkylightParameter {
    /// One skylight centered on the roof covering a fraction of its area.
    GriddedSkylightRatio { skylight_ratio: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room2DProperties {
    pub radiance: Room2DRadianceProperties,
}

/// A room described by its floor plate and floor-to-ceiling height.
///
/// The floor winds counter-clockwise seen from above and holes wind
/// clockwise. Per-segment lists follow the boundary segments, then the
/// segments of each hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Room2D {
    pub identifier: String,
    pub display_name: Option<String>,
    floor_geometry: Face3D,
    floor_to_ceiling_height: f64,
    pub is_ground_contact: bool,
    pub is_top_exposed: bool,
    boundary_conditions: Vec<BoundaryCondition>,
    window_parameters: Vec<Option<WindowParameter>>,
    pub skylight_parameters: Option<SkylightParameter>,
    pub(crate) parent: Option<StoryKey>,
    pub properties: Room2DProperties,
}

fn orient(points: &[Point3<f64>], ccw: bool) -> Vec<Point3<f64>> {
    let xy: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    if (signed_area(&xy) > 0.0) == ccw {
        points.to_vec()
    } else {
        points.iter().rev().copied().collect()
    }
}

fn xy_list(points: &[Point3<f64>]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|p| Value::from(vec![p.x, p.y]))
            .collect(),
    )
}

fn read_xy_loop(value: &Value, z: f64) -> Result<Vec<Point3<f64>>> {
    let pts: Vec<[f64; 2]> = serde_json::from_value(value.clone())?;
    Ok(pts.iter().map(|[x, y]| Point3::new(*x, *y, z)).collect())
}

impl Room2D {
    /// Create a room with outdoor walls, no windows, touching the ground and
    /// exposed at the top.
    pub fn new(identifier: &str, floor_geometry: Face3D, floor_to_ceiling_height: f64) -> Result<Self> {
        let floor = Face3D::with_holes(
            orient(&floor_geometry.boundary, true),
            floor_geometry.holes.iter().map(|h| orient(h, false)).collect(),
        )?;
        if !floor.is_horizontal(1e-6) {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "Room2D floor_geometry".into(),
                reason: "must be horizontal".into(),
            }
            .into());
        }
        let height = float_positive(floor_to_ceiling_height, "Room2D floor_to_ceiling_height")?;
        if height == 0.0 {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "Room2D floor_to_ceiling_height".into(),
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        let segments = segment_count(&floor);
        Ok(Self {
            identifier: valid_rad_string(identifier, "Room2D identifier")?,
            display_name: None,
            floor_geometry: floor,
            floor_to_ceiling_height: height,
            is_ground_contact: true,
            is_top_exposed: true,
            boundary_conditions: vec![BoundaryCondition::Outdoors; segments],
            window_parameters: vec![None; segments],
            skylight_parameters: None,
            parent: None,
            properties: Room2DProperties::default(),
        })
    }

    /// A rectangular room with its minimum corner at `origin`.
    pub fn from_rectangle(
        identifier: &str,
        origin: Point3<f64>,
        width: f64,
        depth: f64,
        floor_to_ceiling_height: f64,
    ) -> Result<Self> {
        let floor = Face3D::rectangle(origin, Vector3::x(), Vector3::y(), width, depth)?;
        Self::new(identifier, floor, floor_to_ceiling_height)
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn floor_geometry(&self) -> &Face3D {
        &self.floor_geometry
    }

    pub fn floor_to_ceiling_height(&self) -> f64 {
        self.floor_to_ceiling_height
    }

    /// Elevation of the floor plate.
    pub fn floor_height(&self) -> f64 {
        self.floor_geometry.boundary[0].z
    }

    pub fn floor_area(&self) -> f64 {
        self.floor_geometry.area()
    }

    /// Wall segments of the floor plate: boundary first, then holes.
    pub fn floor_segments(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        loop_segments(&self.floor_geometry)
    }

    pub fn segment_count(&self) -> usize {
        segment_count(&self.floor_geometry)
    }

    pub fn boundary_conditions(&self) -> &[BoundaryCondition] {
        &self.boundary_conditions
    }

    pub fn set_boundary_conditions(&mut self, values: Vec<BoundaryCondition>) -> Result<()> {
        self.check_count("boundary_conditions", values.len())?;
        self.boundary_conditions = values;
        Ok(())
    }

    pub fn window_parameters(&self) -> &[Option<WindowParameter>] {
        &self.window_parameters
    }

    pub fn set_window_parameters(&mut self, values: Vec<Option<WindowParameter>>) -> Result<()> {
        self.check_count("window_parameters", values.len())?;
        self.window_parameters = values;
        Ok(())
    }

    fn check_count(&self, name: &'static str, got: usize) -> Result<()> {
        let expected = self.segment_count();
        if got != expected {
            return Err(Error::SegmentCount {
                name,
                expected,
                got,
            });
        }
        Ok(())
    }

    /// Key of the story holding the room, if it has been added to one.
    pub fn parent(&self) -> Option<StoryKey> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// The room key, once the room is stored in a model.
    pub fn key(&self) -> Room2DKey {
        self.properties.radiance.host()
    }

    pub fn move_by(&mut self, v: &Vector3<f64>) {
        self.floor_geometry = self.floor_geometry.move_by(v);
    }

    /// Scale the geometry, heights, window sizes and grid parameters.
    ///
    /// The factor must be positive. Nothing changes when it is rejected.
    pub fn scale(&mut self, factor: f64, origin: Option<&Point3<f64>>) -> Result<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "Room2D scale factor".into(),
                reason: format!("must be greater than 0. Got {}", factor),
            }
            .into());
        }
        self.properties.radiance.scale(factor)?;
        self.floor_geometry = self.floor_geometry.scale(factor, origin);
        self.floor_to_ceiling_height *= factor;
        for wp in self.window_parameters.iter_mut().flatten() {
            if let WindowParameter::SingleWindow {
                width,
                height,
                sill_height,
            } = wp
            {
                *width *= factor;
                *height *= factor;
                *sill_height *= factor;
            }
        }
        Ok(())
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = typed_map("Room2D");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("floor_boundary".into(), xy_list(&self.floor_geometry.boundary));
        if !self.floor_geometry.holes.is_empty() {
            let holes = self.floor_geometry.holes.iter().map(|h| xy_list(h)).collect();
            base.insert("floor_holes".into(), Value::Array(holes));
        }
        base.insert("floor_height".into(), Value::from(self.floor_height()));
        base.insert(
            "floor_to_ceiling_height".into(),
            Value::from(self.floor_to_ceiling_height),
        );
        base.insert("is_ground_contact".into(), Value::from(self.is_ground_contact));
        base.insert("is_top_exposed".into(), Value::from(self.is_top_exposed));
        base.insert(
            "boundary_conditions".into(),
            serde_json::to_value(&self.boundary_conditions)?,
        );
        if self.window_parameters.iter().any(Option::is_some) {
            base.insert(
                "window_parameters".into(),
                serde_json::to_value(&self.window_parameters)?,
            );
        }
        if let Some(sky) = &self.skylight_parameters {
            base.insert("skylight_parameters".into(), serde_json::to_value(sky)?);
        }
        let mut props = typed_map("Room2DProperties");
        if let Value::Object(rad) = self.properties.radiance.to_dict(abridged)? {
            props.extend(rad);
        }
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    /// Load a room; a full radiance record is loaded, an abridged one is
    /// left for the model to attach.
    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Room2D")?;
        let z = required_f64(data, "floor_height")?;
        let boundary = read_xy_loop(required_field(data, "floor_boundary")?, z)?;
        let holes = optional_array(data, "floor_holes")?
            .into_iter()
            .flatten()
            .map(|h| read_xy_loop(h, z))
            .collect::<Result<Vec<_>>>()?;
        let floor = Face3D::with_holes(boundary, holes)?;
        let mut room = Self::new(
            required_str(data, "identifier")?,
            floor,
            required_f64(data, "floor_to_ceiling_height")?,
        )?;
        room.display_name = optional_str(data, "display_name")?.map(str::to_string);
        room.is_ground_contact = optional_bool(data, "is_ground_contact")?.unwrap_or(true);
        room.is_top_exposed = optional_bool(data, "is_top_exposed")?.unwrap_or(true);
        if let Some(bcs) = optional_array(data, "boundary_conditions")? {
            let bcs: Vec<BoundaryCondition> = serde_json::from_value(Value::Array(bcs.clone()))?;
            room.set_boundary_conditions(bcs)?;
        }
        if let Some(wps) = optional_array(data, "window_parameters")? {
            let wps: Vec<Option<WindowParameter>> =
                serde_json::from_value(Value::Array(wps.clone()))?;
            for wp in wps.iter().flatten() {
                validate_window(wp)?;
            }
            room.set_window_parameters(wps)?;
        }
        if let Some(sky) = data.get("skylight_parameters").filter(|v| !v.is_null()) {
            let sky: SkylightParameter = serde_json::from_value(sky.clone())?;
            let SkylightParameter::GriddedSkylightRatio { skylight_ratio } = sky;
            float_in_range(skylight_ratio, 0.0, 1.0, "skylight_ratio")?;
            room.skylight_parameters = Some(sky);
        }
        if let Some(rad) = radiance_block(data) {
            if type_tag(rad)? == "Room2DRadianceProperties" {
                room.properties.radiance = Room2DRadianceProperties::from_dict(rad, Room2DKey::default())?;
            }
        }
        Ok(room)
    }
}

fn validate_window(wp: &WindowParameter) -> Result<()> {
    match wp {
        WindowParameter::SimpleWindowRatio { window_ratio } => {
            float_in_range(*window_ratio, 0.0, 1.0, "window_ratio")?;
        }
        WindowParameter::SingleWindow {
            width,
            height,
            sill_height,
        } => {
            float_positive(*width, "window width")?;
            float_positive(*height, "window height")?;
            float_positive(*sill_height, "window sill_height")?;
        }
    }
    Ok(())
}

fn loop_segments(face: &Face3D) -> Vec<(Point3<f64>, Point3<f64>)> {
    std::iter::once(&face.boundary)
        .chain(face.holes.iter())
        .flat_map(|pts| {
            let n = pts.len();
            (0..n).map(move |i| (pts[i], pts[(i + 1) % n]))
        })
        .collect()
}

fn segment_count(face: &Face3D) -> usize {
    face.boundary.len() + face.holes.iter().map(Vec::len).sum::<usize>()
}
