// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed 3D rooms.

use std::sync::Arc;

use df_radiance_geometry::{polygon::signed_area, Face3D, Point2, Point3, Vector3};
use serde_json::Value;

use super::boundary::{BoundaryCondition, FaceType};
use super::face::Face;
use super::properties::{load_full, radiance_block, RoomRadianceProperties};
use super::shade::Shade;
use crate::error::{Error, Result};
use crate::modifier::Modifier;
use crate::modifierset::{ModifierPool, ModifierSet, ModifierSetPool};
use crate::pool::typed_map;
use crate::typing::{
    check_type, int_positive, optional_array, optional_i64, optional_str, required_str,
    valid_rad_string,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomProperties {
    pub radiance: RoomRadianceProperties,
}

/// A closed volume bounded by faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub identifier: String,
    pub display_name: Option<String>,
    pub faces: Vec<Face>,
    pub indoor_shades: Vec<Shade>,
    pub outdoor_shades: Vec<Shade>,
    /// Number of identical copies of the room in the building.
    pub multiplier: u32,
    /// Identifier of the story the room belongs to.
    pub story: Option<String>,
    pub properties: RoomProperties,
}

/// Reorder a horizontal loop so that it winds counter-clockwise seen from above.
fn ccw_xy(points: &[Point3<f64>], ccw: bool) -> Vec<Point3<f64>> {
    let xy: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    if (signed_area(&xy) > 0.0) == ccw {
        points.to_vec()
    } else {
        points.iter().rev().copied().collect()
    }
}

impl Room {
    pub fn new(identifier: &str, faces: Vec<Face>) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "room identifier")?,
            display_name: None,
            faces,
            indoor_shades: Vec::new(),
            outdoor_shades: Vec::new(),
            multiplier: 1,
            story: None,
            properties: RoomProperties::default(),
        })
    }

    /// Extrude a horizontal floor polygon into a closed room.
    ///
    /// Faces are ordered floor, walls (one per boundary segment, then one per
    /// hole segment), roof, and named `<room>..Face<n>`. Walls and roof
    /// face outdoors; the floor touches the ground.
    pub fn from_floor_extrusion(identifier: &str, floor: &Face3D, height: f64) -> Result<Self> {
        if height <= 0.0 {
            return Err(Error::InvalidValue {
                name: "room height".into(),
                reason: format!("must be greater than 0. Got {}", height),
            });
        }
        let boundary = ccw_xy(&floor.boundary, true);
        let holes: Vec<Vec<Point3<f64>>> = floor.holes.iter().map(|h| ccw_xy(h, false)).collect();
        let up = Vector3::new(0.0, 0.0, height);
        let base = Face3D::with_holes(boundary.clone(), holes.clone())?;

        let mut geometries: Vec<(Face3D, FaceType)> = vec![(base.flip(), FaceType::Floor)];
        for loop_pts in std::iter::once(&boundary).chain(holes.iter()) {
            let n = loop_pts.len();
            for i in 0..n {
                let (a, b) = (loop_pts[i], loop_pts[(i + 1) % n]);
                let wall = Face3D::new(vec![a, b, b + up, a + up])?;
                geometries.push((wall, FaceType::Wall));
            }
        }
        geometries.push((base.move_by(&up), FaceType::RoofCeiling));

        let faces = geometries
            .into_iter()
            .enumerate()
            .map(|(i, (geo, face_type))| {
                let bc = if face_type == FaceType::Floor {
                    BoundaryCondition::Ground
                } else {
                    BoundaryCondition::Outdoors
                };
                Face::new(&format!("{}..Face{}", identifier, i + 1), geo, face_type, bc)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(identifier, faces)
    }

    /// An axis-aligned box room with its minimum corner at `origin`.
    pub fn from_box(
        identifier: &str,
        width: f64,
        depth: f64,
        height: f64,
        origin: Point3<f64>,
    ) -> Result<Self> {
        let floor = Face3D::rectangle(origin, Vector3::x(), Vector3::y(), width, depth)?;
        Self::from_floor_extrusion(identifier, &floor, height)
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Component-wise minimum over all face vertices.
    pub fn min(&self) -> Point3<f64> {
        self.faces.iter().map(|f| f.geometry.min()).fold(
            Point3::new(f64::MAX, f64::MAX, f64::MAX),
            |m, p| Point3::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z)),
        )
    }

    /// Component-wise maximum over all face vertices.
    pub fn max(&self) -> Point3<f64> {
        self.faces.iter().map(|f| f.geometry.max()).fold(
            Point3::new(f64::MIN, f64::MIN, f64::MIN),
            |m, p| Point3::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z)),
        )
    }

    /// Vertical extent of the room.
    pub fn floor_to_ceiling_height(&self) -> f64 {
        self.max().z - self.min().z
    }

    pub fn floor_faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.iter().filter(|f| f.face_type == FaceType::Floor)
    }

    /// Effective modifier set: the assigned one or the global default.
    pub fn modifier_set(&self) -> Arc<ModifierSet> {
        self.properties.radiance.modifier_set()
    }

    /// Modifiers assigned directly to faces, apertures and doors.
    pub fn face_modifiers(&self) -> Vec<&Arc<Modifier>> {
        self.faces.iter().flat_map(|f| f.assigned_modifiers()).collect()
    }

    /// Modifiers assigned directly to the room's shades.
    pub fn shade_modifiers(&self) -> Vec<&Arc<Modifier>> {
        self.indoor_shades
            .iter()
            .chain(self.outdoor_shades.iter())
            .filter_map(|s| s.properties.radiance.modifier_override())
            .collect()
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = typed_map("Room");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        let faces = self
            .faces
            .iter()
            .map(|f| f.to_dict(abridged))
            .collect::<Result<Vec<_>>>()?;
        base.insert("faces".into(), Value::Array(faces));
        for (key, shades) in [
            ("indoor_shades", &self.indoor_shades),
            ("outdoor_shades", &self.outdoor_shades),
        ] {
            if !shades.is_empty() {
                let dicts = shades
                    .iter()
                    .map(|s| s.to_dict(abridged))
                    .collect::<Result<Vec<_>>>()?;
                base.insert(key.into(), Value::Array(dicts));
            }
        }
        base.insert("multiplier".into(), Value::from(self.multiplier));
        if let Some(story) = &self.story {
            base.insert("story".into(), Value::from(story.as_str()));
        }
        let mut props = typed_map("RoomProperties");
        props.insert("radiance".into(), self.properties.radiance.to_dict(abridged)?);
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Room")?;
        let faces = optional_array(data, "faces")?
            .ok_or(Error::MissingKey("faces"))?
            .iter()
            .map(Face::from_dict)
            .collect::<Result<Vec<_>>>()?;
        let mut room = Self::new(required_str(data, "identifier")?, faces)?;
        room.display_name = optional_str(data, "display_name")?.map(str::to_string);
        for s in optional_array(data, "indoor_shades")?.into_iter().flatten() {
            room.indoor_shades.push(Shade::from_dict(s)?);
        }
        for s in optional_array(data, "outdoor_shades")?.into_iter().flatten() {
            room.outdoor_shades.push(Shade::from_dict(s)?);
        }
        if let Some(m) = optional_i64(data, "multiplier")? {
            room.multiplier = int_positive(m, "room multiplier")?;
        }
        room.story = optional_str(data, "story")?.map(str::to_string);
        room.properties.radiance =
            load_full(data, "RoomRadianceProperties", RoomRadianceProperties::from_dict)?;
        Ok(room)
    }

    /// Attach abridged references of the room, its faces (with their
    /// apertures and doors) and its shades, in that order.
    pub fn apply_properties_from_dict(
        &mut self,
        data: &Value,
        modifiers: &ModifierPool,
        modifier_sets: &ModifierSetPool,
    ) -> Result<()> {
        if let Some(radiance) = radiance_block(data) {
            self.properties
                .radiance
                .apply_properties_from_dict(radiance, modifier_sets)?;
        }
        let face_dicts = optional_array(data, "faces")?.into_iter().flatten();
        for (face, f_dict) in self.faces.iter_mut().zip(face_dicts) {
            face.apply_properties_from_dict(f_dict, modifiers)?;
        }
        for (key, shades) in [
            ("indoor_shades", &mut self.indoor_shades),
            ("outdoor_shades", &mut self.outdoor_shades),
        ] {
            let shade_dicts = optional_array(data, key)?.into_iter().flatten();
            for (shade, s_dict) in shades.iter_mut().zip(shade_dicts) {
                shade.apply_properties_from_dict(s_dict, modifiers)?;
            }
        }
        Ok(())
    }
}
