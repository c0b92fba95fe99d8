// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 3D model: rooms, orphaned shades and their radiance extension.

use std::sync::Arc;

use serde_json::Value;

use super::properties::radiance_block;
use super::room::Room;
use super::shade::Shade;
use crate::checkdup::check_duplicate_identifiers;
use crate::dedup::{push_instance, unique_values};
use crate::error::Result;
use crate::modifier::Modifier;
use crate::modifierset::ModifierSet;
use crate::pool::{global_modifier_set_dict, load_properties_from_dict, typed_map};
use crate::sensorgrid::SensorGrid;
use crate::typing::{
    check_type, optional_array, optional_f64, optional_str, required_str, valid_rad_string,
};

pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Model-wide radiance data: sensor grids plus the derived modifier pools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRadianceProperties {
    pub sensor_grids: Vec<SensorGrid>,
}

impl ModelRadianceProperties {
    /// Modifier sets assigned to rooms, unique by value in first-seen order.
    pub fn modifier_sets(&self, host: &Model) -> Vec<Arc<ModifierSet>> {
        let mut sets = Vec::new();
        for room in &host.rooms {
            if let Some(set) = room.properties.radiance.modifier_set_override() {
                push_instance(&mut sets, set);
            }
        }
        unique_values(sets)
    }

    /// Every modifier referenced by the model: the assigned slots of used
    /// modifier sets followed by modifiers assigned to surfaces and shades.
    pub fn modifiers(&self, host: &Model) -> Vec<Arc<Modifier>> {
        let mut mods = Vec::new();
        for set in self.modifier_sets(host) {
            for m in set.modified_modifiers() {
                push_instance(&mut mods, &m);
            }
        }
        for room in &host.rooms {
            for m in room.face_modifiers() {
                push_instance(&mut mods, m);
            }
        }
        for m in self.shade_modifiers(host) {
            push_instance(&mut mods, &m);
        }
        unique_values(mods)
    }

    /// Modifiers assigned to room shades and orphaned shades.
    pub fn shade_modifiers(&self, host: &Model) -> Vec<Arc<Modifier>> {
        let mut mods = Vec::new();
        for room in &host.rooms {
            for m in room.shade_modifiers() {
                push_instance(&mut mods, m);
            }
        }
        for shade in &host.orphaned_shades {
            if let Some(m) = shade.properties.radiance.modifier_override() {
                push_instance(&mut mods, m);
            }
        }
        unique_values(mods)
    }

    pub fn add_sensor_grid(&mut self, grid: SensorGrid) {
        self.sensor_grids.push(grid);
    }

    pub fn add_sensor_grids(&mut self, grids: impl IntoIterator<Item = SensorGrid>) {
        self.sensor_grids.extend(grids);
    }

    /// Report modifier set identifiers used by more than one distinct set.
    pub fn check_duplicate_modifier_set_identifiers(
        &self,
        host: &Model,
        raise: bool,
    ) -> Result<String> {
        check_duplicate_identifiers(&self.modifier_sets(host), raise, "ModifierSet")
    }

    /// Report modifier identifiers used by more than one distinct modifier.
    pub fn check_duplicate_modifier_identifiers(&self, host: &Model, raise: bool) -> Result<String> {
        check_duplicate_identifiers(&self.modifiers(host), raise, "Modifier")
    }

    pub fn check_duplicate_sensor_grid_identifiers(&self, raise: bool) -> Result<String> {
        check_duplicate_identifiers(&self.sensor_grids, raise, "SensorGrid")
    }

    pub fn to_dict(&self, host: &Model) -> Result<Value> {
        let mut base = typed_map("ModelRadianceProperties");
        base.insert("global_modifier_set".into(), global_modifier_set_dict()?);
        let sets = self
            .modifier_sets(host)
            .iter()
            .map(|s| s.to_dict(true, true))
            .collect::<Result<Vec<_>>>()?;
        base.insert("modifier_sets".into(), Value::Array(sets));
        let mods = self
            .modifiers(host)
            .iter()
            .map(|m| m.to_dict())
            .collect::<Result<Vec<_>>>()?;
        base.insert("modifiers".into(), Value::Array(mods));
        if !self.sensor_grids.is_empty() {
            let grids = self
                .sensor_grids
                .iter()
                .map(SensorGrid::to_dict)
                .collect::<Result<Vec<_>>>()?;
            base.insert("sensor_grids".into(), Value::Array(grids));
        }
        Ok(Value::Object(base))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelProperties {
    pub radiance: ModelRadianceProperties,
}

/// A 3D model of closed rooms.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub identifier: String,
    pub display_name: Option<String>,
    pub rooms: Vec<Room>,
    pub orphaned_shades: Vec<Shade>,
    pub tolerance: f64,
    pub properties: ModelProperties,
}

impl Model {
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "model identifier")?,
            display_name: None,
            rooms: Vec::new(),
            orphaned_shades: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
            properties: ModelProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn room_by_identifier(&self, identifier: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.identifier == identifier)
    }

    pub fn to_dict(&self) -> Result<Value> {
        let mut base = typed_map("Model");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        let rooms = self
            .rooms
            .iter()
            .map(|r| r.to_dict(true))
            .collect::<Result<Vec<_>>>()?;
        base.insert("rooms".into(), Value::Array(rooms));
        if !self.orphaned_shades.is_empty() {
            let shades = self
                .orphaned_shades
                .iter()
                .map(|s| s.to_dict(true))
                .collect::<Result<Vec<_>>>()?;
            base.insert("orphaned_shades".into(), Value::Array(shades));
        }
        base.insert("tolerance".into(), Value::from(self.tolerance));
        let mut props = typed_map("ModelProperties");
        props.insert("radiance".into(), self.properties.radiance.to_dict(self)?);
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    /// Load a model and re-attach every abridged modifier and modifier set
    /// reference to the shared objects of the model pools.
    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Model")?;
        let mut model = Self::new(required_str(data, "identifier")?)?;
        model.display_name = optional_str(data, "display_name")?.map(str::to_string);
        if let Some(tol) = optional_f64(data, "tolerance")? {
            model.tolerance = tol;
        }
        let room_dicts = optional_array(data, "rooms")?.map(Vec::as_slice).unwrap_or_default();
        let shade_dicts = optional_array(data, "orphaned_shades")?
            .map(Vec::as_slice)
            .unwrap_or_default();
        model.rooms = room_dicts.iter().map(Room::from_dict).collect::<Result<_>>()?;
        model.orphaned_shades = shade_dicts.iter().map(Shade::from_dict).collect::<Result<_>>()?;

        if let Some(radiance) = radiance_block(data) {
            let (modifiers, modifier_sets) = load_properties_from_dict(radiance)?;
            for (room, r_dict) in model.rooms.iter_mut().zip(room_dicts) {
                room.apply_properties_from_dict(r_dict, &modifiers, &modifier_sets)?;
            }
            for (shade, s_dict) in model.orphaned_shades.iter_mut().zip(shade_dicts) {
                shade.apply_properties_from_dict(s_dict, &modifiers)?;
            }
            for g in optional_array(radiance, "sensor_grids")?.into_iter().flatten() {
                model.properties.radiance.add_sensor_grid(SensorGrid::from_dict(g)?);
            }
        }
        tracing::debug!(
            rooms = model.rooms.len(),
            sensor_grids = model.properties.radiance.sensor_grids.len(),
            "Loaded 3D model"
        );
        Ok(model)
    }
}
