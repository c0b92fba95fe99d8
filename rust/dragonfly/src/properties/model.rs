// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model-wide radiance data derived from the entity tree.
//!
//! Nothing is cached: every collection walks buildings, stories and rooms
//! again. Collection keeps each `Arc` once by identity; the final list then
//! collapses value-equal objects so that independently loaded copies of one
//! set or modifier are written once.

use std::sync::Arc;

use df_radiance_core::dedup::{push_instance, unique_values};
use df_radiance_core::hb::properties::radiance_block;
use df_radiance_core::hb::{self, ModelRadianceProperties as HbModelRadianceProperties};
use df_radiance_core::library::generic_modifier_set_visible;
use df_radiance_core::pool::{global_modifier_set_dict, load_properties_from_dict, typed_map};
use df_radiance_core::typing::optional_array;
use df_radiance_core::{check_duplicate_identifiers, Error as RadianceError, Modifier, ModifierSet};
use serde_json::Value;

use super::radiance_entry;
use crate::error::{Error, Result};
use crate::model::Model;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelRadianceProperties;

impl ModelRadianceProperties {
    /// Modifier sets assigned to buildings, their 3D rooms, stories and 2D
    /// rooms. The global default is not included.
    pub fn modifier_sets(&self, model: &Model) -> Vec<Arc<ModifierSet>> {
        let mut sets = Vec::new();
        for building in model.buildings() {
            if let Some(set) = building.properties.radiance.modifier_set_override() {
                push_instance(&mut sets, set);
            }
            for room in &building.room_3ds {
                if let Some(set) = room.properties.radiance.modifier_set_override() {
                    push_instance(&mut sets, set);
                }
            }
            for story in building
                .unique_stories()
                .iter()
                .filter_map(|k| model.story(*k).ok())
            {
                if let Some(set) = story.properties.radiance.modifier_set_override() {
                    push_instance(&mut sets, set);
                }
                for room in story
                    .room_2ds()
                    .iter()
                    .filter_map(|k| model.room_2d(*k).ok())
                {
                    if let Some(set) = room.properties.radiance.modifier_set_override() {
                        push_instance(&mut sets, set);
                    }
                }
            }
        }
        let sets = unique_values(sets);
        tracing::trace!(count = sets.len(), "Collected modifier sets");
        sets
    }

    /// Every modifier referenced by the model: the assigned slots of the
    /// used modifier sets, modifiers assigned to 3D surfaces, then shade
    /// modifiers.
    pub fn modifiers(&self, model: &Model) -> Vec<Arc<Modifier>> {
        let mut mods = Vec::new();
        for set in self.modifier_sets(model) {
            for m in set.modified_modifiers_unique() {
                push_instance(&mut mods, &m);
            }
        }
        for building in model.buildings() {
            for room in &building.room_3ds {
                for m in room.face_modifiers() {
                    push_instance(&mut mods, m);
                }
            }
        }
        for m in self.shade_modifiers(model) {
            push_instance(&mut mods, &m);
        }
        unique_values(mods)
    }

    /// Modifiers assigned to context shades and to shades of 3D rooms.
    pub fn shade_modifiers(&self, model: &Model) -> Vec<Arc<Modifier>> {
        let mut mods = Vec::new();
        for building in model.buildings() {
            for room in &building.room_3ds {
                for m in room.shade_modifiers() {
                    push_instance(&mut mods, m);
                }
            }
        }
        for shade in model.context_shades() {
            if let Some(m) = shade.properties.radiance.modifier_override() {
                push_instance(&mut mods, m);
            }
        }
        unique_values(mods)
    }

    /// The set used where no override exists up a host's parent chain.
    pub fn global_modifier_set(&self) -> Arc<ModifierSet> {
        generic_modifier_set_visible()
    }

    pub fn check_duplicate_modifier_set_identifiers(
        &self,
        model: &Model,
        raise: bool,
    ) -> Result<String> {
        Ok(check_duplicate_identifiers(
            &self.modifier_sets(model),
            raise,
            "ModifierSet",
        )?)
    }

    pub fn check_duplicate_modifier_identifiers(&self, model: &Model, raise: bool) -> Result<String> {
        Ok(check_duplicate_identifiers(
            &self.modifiers(model),
            raise,
            "Modifier",
        )?)
    }

    /// Run every check and join the non-empty reports.
    pub fn check_all(&self, model: &Model, raise: bool) -> Result<String> {
        let msgs = [
            self.check_duplicate_modifier_set_identifiers(model, false)?,
            self.check_duplicate_modifier_identifiers(model, false)?,
        ];
        let full_msg = msgs
            .iter()
            .filter(|m| !m.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        if raise && !full_msg.is_empty() {
            return Err(RadianceError::DuplicateIdentifiers(full_msg).into());
        }
        Ok(full_msg)
    }

    /// `{"radiance": ...}` with the global set, the used modifier sets
    /// (abridged) and every referenced modifier (in full).
    pub fn to_dict(&self, model: &Model) -> Result<Value> {
        let mut base = typed_map("ModelRadianceProperties");
        base.insert("global_modifier_set".into(), global_modifier_set_dict()?);
        let sets = self
            .modifier_sets(model)
            .iter()
            .map(|s| s.to_dict(true, true))
            .collect::<df_radiance_core::Result<Vec<_>>>()?;
        base.insert("modifier_sets".into(), Value::Array(sets));
        let mods = self
            .modifiers(model)
            .iter()
            .map(|m| m.to_dict())
            .collect::<df_radiance_core::Result<Vec<_>>>()?;
        base.insert("modifiers".into(), Value::Array(mods));
        Ok(radiance_entry(base))
    }

    /// Re-attach every abridged reference of a model dictionary.
    ///
    /// The pools are rebuilt from the model-level lists first. Records are
    /// then applied to buildings (with their 3D rooms), stories, 2D rooms and
    /// context shades, in that order, pairing entities and dictionaries by
    /// position.
    pub fn apply_properties_from_dict(model: &mut Model, data: &Value) -> Result<()> {
        let radiance = radiance_block(data).ok_or(Error::MissingRadianceProperties)?;
        let (modifiers, modifier_sets) = load_properties_from_dict(radiance)?;

        let building_dicts = optional_array(data, "buildings")?
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut story_pairs = Vec::new();
        let building_keys = model.building_keys().to_vec();
        for (key, b_dict) in building_keys.into_iter().zip(building_dicts) {
            let building = model.building_mut(key)?;
            if let Some(rad) = radiance_block(b_dict) {
                building
                    .properties
                    .radiance
                    .apply_properties_from_dict(rad, &modifier_sets)?;
            }
            let room_dicts = optional_array(b_dict, "room_3ds")?.into_iter().flatten();
            for (room, r_dict) in building.room_3ds.iter_mut().zip(room_dicts) {
                room.apply_properties_from_dict(r_dict, &modifiers, &modifier_sets)?;
            }
            let story_dicts = optional_array(b_dict, "unique_stories")?.into_iter().flatten();
            story_pairs.extend(building.unique_stories().iter().copied().zip(story_dicts));
        }

        let mut room_pairs = Vec::new();
        for (key, s_dict) in story_pairs {
            let story = model.story_mut(key)?;
            if let Some(rad) = radiance_block(s_dict) {
                story
                    .properties
                    .radiance
                    .apply_properties_from_dict(rad, &modifier_sets)?;
            }
            let room_dicts = optional_array(s_dict, "room_2ds")?.into_iter().flatten();
            room_pairs.extend(story.room_2ds().iter().copied().zip(room_dicts));
        }
        for (key, r_dict) in room_pairs {
            if let Some(rad) = radiance_block(r_dict) {
                model
                    .room_2d_mut(key)?
                    .properties
                    .radiance
                    .apply_properties_from_dict(rad, &modifier_sets)?;
            }
        }

        let shade_dicts = optional_array(data, "context_shades")?.into_iter().flatten();
        let shade_keys = model.context_shade_keys().to_vec();
        for (key, s_dict) in shade_keys.into_iter().zip(shade_dicts) {
            if let Some(rad) = radiance_block(s_dict) {
                model
                    .context_shade_mut(key)?
                    .properties
                    .radiance
                    .apply_properties_from_dict(rad, &modifiers)?;
            }
        }
        Ok(())
    }

    /// Radiance properties for a translated 3D model: one sensor grid per
    /// grid parameter of each 2D room, made from the 3D room with the same
    /// identifier. Rooms without grid parameters add nothing.
    pub fn to_honeybee(&self, model: &Model, target: &hb::Model) -> HbModelRadianceProperties {
        let mut props = HbModelRadianceProperties::default();
        for room_2d in model.room_2ds() {
            let params = room_2d.properties.radiance.grid_parameters();
            if params.is_empty() {
                continue;
            }
            let Some(room) = target.room_by_identifier(&room_2d.identifier) else {
                tracing::trace!(room = %room_2d.identifier, "No 3D room for grid parameters");
                continue;
            };
            let before = props.sensor_grids.len();
            props.add_sensor_grids(params.iter().filter_map(|gp| gp.generate_grid_from_room(room)));
            tracing::debug!(
                room = %room_2d.identifier,
                grids = props.sensor_grids.len() - before,
                "Generated sensor grids"
            );
        }
        props
    }

    pub fn duplicate(&self) -> Self {
        *self
    }
}
