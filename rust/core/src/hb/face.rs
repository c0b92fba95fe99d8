// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room faces and the apertures and doors they host.

use std::sync::Arc;

use df_radiance_geometry::Face3D;
use serde_json::{Map, Value};

use super::boundary::{BoundaryCondition, FaceType};
use super::properties::{
    load_full, radiance_block, ApertureRadianceProperties, DoorRadianceProperties,
    FaceRadianceProperties,
};
use crate::error::Result;
use crate::modifier::Modifier;
use crate::modifierset::{ModifierPool, ModifierSet};
use crate::pool::typed_map;
use crate::typing::{
    check_type, field, optional_array, optional_bool, optional_str, required_field,
    required_str, valid_rad_string,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceProperties {
    pub radiance: FaceRadianceProperties,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApertureProperties {
    pub radiance: ApertureRadianceProperties,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoorProperties {
    pub radiance: DoorRadianceProperties,
}

/// A window or skylight in a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    pub identifier: String,
    pub display_name: Option<String>,
    pub geometry: Face3D,
    pub is_operable: bool,
    pub properties: ApertureProperties,
}

/// An opaque or glass door in a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Door {
    pub identifier: String,
    pub display_name: Option<String>,
    pub geometry: Face3D,
    pub is_glass: bool,
    pub properties: DoorProperties,
}

/// One planar face of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub identifier: String,
    pub display_name: Option<String>,
    pub geometry: Face3D,
    pub face_type: FaceType,
    pub boundary_condition: BoundaryCondition,
    pub apertures: Vec<Aperture>,
    pub doors: Vec<Door>,
    pub properties: FaceProperties,
}

/// Common header of every 3D entity dictionary.
fn entity_header(tag: &str, identifier: &str, display_name: &Option<String>) -> Map<String, Value> {
    let mut base = typed_map(tag);
    base.insert("identifier".into(), Value::from(identifier));
    if let Some(name) = display_name {
        base.insert("display_name".into(), Value::from(name.as_str()));
    }
    base
}

fn properties_dict(tag: &str, radiance: Value) -> Value {
    let mut props = typed_map(tag);
    props.insert("radiance".into(), radiance);
    Value::Object(props)
}

fn load_geometry(data: &Value) -> Result<Face3D> {
    Ok(serde_json::from_value(required_field(data, "geometry")?.clone())?)
}

impl Aperture {
    pub fn new(identifier: &str, geometry: Face3D, is_operable: bool) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "aperture identifier")?,
            display_name: None,
            geometry,
            is_operable,
            properties: ApertureProperties::default(),
        })
    }

    /// The assigned modifier, else the slot of `set` matching the parent face.
    pub fn effective_modifier(&self, parent: &Face, set: &ModifierSet) -> Arc<Modifier> {
        if let Some(m) = self.properties.radiance.modifier_override() {
            return Arc::clone(m);
        }
        if !matches!(parent.boundary_condition, BoundaryCondition::Outdoors) {
            return set.aperture_set.interior_modifier();
        }
        match parent.face_type {
            FaceType::RoofCeiling | FaceType::Floor => set.aperture_set.skylight_modifier(),
            _ if self.is_operable => set.aperture_set.operable_modifier(),
            _ => set.aperture_set.window_modifier(),
        }
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = entity_header("Aperture", &self.identifier, &self.display_name);
        base.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        base.insert("is_operable".into(), Value::from(self.is_operable));
        base.insert(
            "properties".into(),
            properties_dict("ApertureProperties", self.properties.radiance.to_dict(abridged)?),
        );
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Aperture")?;
        let mut aperture = Self::new(
            required_str(data, "identifier")?,
            load_geometry(data)?,
            optional_bool(data, "is_operable")?.unwrap_or(false),
        )?;
        aperture.display_name = optional_str(data, "display_name")?.map(str::to_string);
        aperture.properties.radiance = load_full(
            data,
            "ApertureRadianceProperties",
            ApertureRadianceProperties::from_dict,
        )?;
        Ok(aperture)
    }
}

impl Door {
    pub fn new(identifier: &str, geometry: Face3D, is_glass: bool) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "door identifier")?,
            display_name: None,
            geometry,
            is_glass,
            properties: DoorProperties::default(),
        })
    }

    /// The assigned modifier, else the slot of `set` matching the parent face.
    pub fn effective_modifier(&self, parent: &Face, set: &ModifierSet) -> Arc<Modifier> {
        if let Some(m) = self.properties.radiance.modifier_override() {
            return Arc::clone(m);
        }
        let exterior = parent.boundary_condition.is_exterior();
        match (exterior, self.is_glass) {
            (true, true) => set.door_set.exterior_glass_modifier(),
            (false, true) => set.door_set.interior_glass_modifier(),
            (true, false) if parent.face_type != FaceType::Wall => set.door_set.overhead_modifier(),
            (true, false) => set.door_set.exterior_modifier(),
            (false, false) => set.door_set.interior_modifier(),
        }
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = entity_header("Door", &self.identifier, &self.display_name);
        base.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        base.insert("is_glass".into(), Value::from(self.is_glass));
        base.insert(
            "properties".into(),
            properties_dict("DoorProperties", self.properties.radiance.to_dict(abridged)?),
        );
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Door")?;
        let mut door = Self::new(
            required_str(data, "identifier")?,
            load_geometry(data)?,
            optional_bool(data, "is_glass")?.unwrap_or(false),
        )?;
        door.display_name = optional_str(data, "display_name")?.map(str::to_string);
        door.properties.radiance =
            load_full(data, "DoorRadianceProperties", DoorRadianceProperties::from_dict)?;
        Ok(door)
    }
}

impl Face {
    pub fn new(
        identifier: &str,
        geometry: Face3D,
        face_type: FaceType,
        boundary_condition: BoundaryCondition,
    ) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "face identifier")?,
            display_name: None,
            geometry,
            face_type,
            boundary_condition,
            apertures: Vec::new(),
            doors: Vec::new(),
            properties: FaceProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// The assigned modifier, else the slot of `set` for this face type and
    /// boundary condition.
    pub fn effective_modifier(&self, set: &ModifierSet) -> Arc<Modifier> {
        if let Some(m) = self.properties.radiance.modifier_override() {
            return Arc::clone(m);
        }
        let exterior = self.boundary_condition.is_exterior();
        match (self.face_type, exterior) {
            (FaceType::AirBoundary, _) => set.air_boundary_modifier(),
            (FaceType::Wall, true) => set.wall_set.exterior_modifier(),
            (FaceType::Wall, false) => set.wall_set.interior_modifier(),
            (FaceType::Floor, true) => set.floor_set.exterior_modifier(),
            (FaceType::Floor, false) => set.floor_set.interior_modifier(),
            (FaceType::RoofCeiling, true) => set.roof_ceiling_set.exterior_modifier(),
            (FaceType::RoofCeiling, false) => set.roof_ceiling_set.interior_modifier(),
        }
    }

    /// Face geometry with the apertures and doors cut out as holes.
    pub fn punched_geometry(&self) -> Face3D {
        let subs: Vec<&Face3D> = self
            .apertures
            .iter()
            .map(|a| &a.geometry)
            .chain(self.doors.iter().map(|d| &d.geometry))
            .collect();
        if subs.is_empty() {
            self.geometry.clone()
        } else {
            self.geometry.punched(&subs)
        }
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = entity_header("Face", &self.identifier, &self.display_name);
        base.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        base.insert("face_type".into(), serde_json::to_value(self.face_type)?);
        base.insert(
            "boundary_condition".into(),
            serde_json::to_value(&self.boundary_condition)?,
        );
        if !self.apertures.is_empty() {
            let aps = self
                .apertures
                .iter()
                .map(|a| a.to_dict(abridged))
                .collect::<Result<Vec<_>>>()?;
            base.insert("apertures".into(), Value::Array(aps));
        }
        if !self.doors.is_empty() {
            let drs = self
                .doors
                .iter()
                .map(|d| d.to_dict(abridged))
                .collect::<Result<Vec<_>>>()?;
            base.insert("doors".into(), Value::Array(drs));
        }
        base.insert(
            "properties".into(),
            properties_dict("FaceProperties", self.properties.radiance.to_dict(abridged)?),
        );
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Face")?;
        let face_type: FaceType =
            serde_json::from_value(required_field(data, "face_type")?.clone())?;
        let bc = match field(data, "boundary_condition") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => BoundaryCondition::default(),
        };
        let mut face = Self::new(required_str(data, "identifier")?, load_geometry(data)?, face_type, bc)?;
        face.display_name = optional_str(data, "display_name")?.map(str::to_string);
        for ap in optional_array(data, "apertures")?.into_iter().flatten() {
            face.apertures.push(Aperture::from_dict(ap)?);
        }
        for dr in optional_array(data, "doors")?.into_iter().flatten() {
            face.doors.push(Door::from_dict(dr)?);
        }
        face.properties.radiance =
            load_full(data, "FaceRadianceProperties", FaceRadianceProperties::from_dict)?;
        Ok(face)
    }

    /// Attach abridged modifier references of the face, its apertures and its doors.
    pub fn apply_properties_from_dict(&mut self, data: &Value, modifiers: &ModifierPool) -> Result<()> {
        if let Some(radiance) = radiance_block(data) {
            self.properties
                .radiance
                .apply_properties_from_dict(radiance, modifiers)?;
        }
        let ap_dicts = optional_array(data, "apertures")?.into_iter().flatten();
        for (ap, ap_dict) in self.apertures.iter_mut().zip(ap_dicts) {
            if let Some(radiance) = radiance_block(ap_dict) {
                ap.properties
                    .radiance
                    .apply_properties_from_dict(radiance, modifiers)?;
            }
        }
        let dr_dicts = optional_array(data, "doors")?.into_iter().flatten();
        for (dr, dr_dict) in self.doors.iter_mut().zip(dr_dicts) {
            if let Some(radiance) = radiance_block(dr_dict) {
                dr.properties
                    .radiance
                    .apply_properties_from_dict(radiance, modifiers)?;
            }
        }
        Ok(())
    }

    /// Modifiers assigned directly to the face, its apertures or its doors.
    pub fn assigned_modifiers(&self) -> impl Iterator<Item = &Arc<Modifier>> {
        self.properties
            .radiance
            .modifier_override()
            .into_iter()
            .chain(
                self.apertures
                    .iter()
                    .filter_map(|a| a.properties.radiance.modifier_override()),
            )
            .chain(
                self.doors
                    .iter()
                    .filter_map(|d| d.properties.radiance.modifier_override()),
            )
    }
}
