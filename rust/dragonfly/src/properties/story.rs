// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance properties of a story.

use std::sync::Arc;

use df_radiance_core::library::generic_modifier_set_visible;
use df_radiance_core::pool::resolve;
use df_radiance_core::typing::check_type;
use df_radiance_core::{ModifierSet, ModifierSetPool};
use serde_json::Value;

use super::{insert_modifier_set, load_modifier_set, radiance_entry, record_map};
use crate::error::Result;
use crate::gridpar::GridParameter;
use crate::keys::StoryKey;
use crate::model::Model;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryRadianceProperties {
    host: StoryKey,
    modifier_set: Option<Arc<ModifierSet>>,
}

modifier_set_access!(StoryRadianceProperties, StoryKey);

impl StoryRadianceProperties {
    pub fn new(host: StoryKey, modifier_set: Option<Arc<ModifierSet>>) -> Self {
        Self { host, modifier_set }
    }

    /// The assigned set, else the parent building's, else the global default.
    pub fn modifier_set(&self, model: &Model) -> Arc<ModifierSet> {
        if let Some(set) = &self.modifier_set {
            return Arc::clone(set);
        }
        let building = model
            .story(self.host)
            .ok()
            .and_then(|s| s.parent())
            .and_then(|k| model.building(k).ok());
        match building {
            Some(b) => b.properties.radiance.modifier_set(),
            None => generic_modifier_set_visible(),
        }
    }

    /// Add a grid parameter to every 2D room of the story.
    pub fn add_grid_parameter(
        model: &mut Model,
        host: StoryKey,
        grid_parameter: GridParameter,
    ) -> Result<()> {
        let rooms = model.story(host)?.room_2ds().to_vec();
        for key in rooms {
            model
                .room_2d_mut(key)?
                .properties
                .radiance
                .add_grid_parameter(grid_parameter.clone());
        }
        Ok(())
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = record_map("StoryRadianceProperties", abridged);
        insert_modifier_set(&mut base, self.modifier_set.as_ref(), abridged)?;
        Ok(radiance_entry(base))
    }

    pub fn from_dict(data: &Value, host: StoryKey) -> Result<Self> {
        check_type(data, "StoryRadianceProperties")?;
        Ok(Self::new(host, load_modifier_set(data)?))
    }

    pub fn apply_properties_from_dict(
        &mut self,
        abridged_data: &Value,
        modifier_sets: &ModifierSetPool,
    ) -> Result<()> {
        if let Some(set) = resolve(abridged_data, "modifier_set", modifier_sets, "ModifierSet")? {
            self.modifier_set = Some(set);
        }
        Ok(())
    }

    pub fn duplicate(&self, new_host: Option<StoryKey>) -> Self {
        Self::new(new_host.unwrap_or(self.host), self.modifier_set.clone())
    }
}
