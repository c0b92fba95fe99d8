// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Buildings: unique stories plus optional detailed 3D rooms.

use df_radiance_core::hb::{self, properties::radiance_block};
use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{
    check_type, optional_array, optional_str, required_str, type_tag, valid_rad_string,
};
use serde_json::Value;

use crate::error::Result;
use crate::keys::{BuildingKey, StoryKey};
use crate::properties::BuildingRadianceProperties;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingProperties {
    pub radiance: BuildingRadianceProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub identifier: String,
    pub display_name: Option<String>,
    pub(crate) unique_stories: Vec<StoryKey>,
    /// Rooms modeled directly in 3D alongside the 2D stories.
    pub room_3ds: Vec<hb::Room>,
    pub properties: BuildingProperties,
}

impl Building {
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "Building identifier")?,
            display_name: None,
            unique_stories: Vec::new(),
            room_3ds: Vec::new(),
            properties: BuildingProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn unique_stories(&self) -> &[StoryKey] {
        &self.unique_stories
    }

    pub fn key(&self) -> BuildingKey {
        self.properties.radiance.host()
    }

    pub(crate) fn to_dict_with_stories(&self, abridged: bool, story_dicts: Vec<Value>) -> Result<Value> {
        let mut base = typed_map("Building");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("unique_stories".into(), Value::Array(story_dicts));
        if !self.room_3ds.is_empty() {
            let rooms = self
                .room_3ds
                .iter()
                .map(|r| r.to_dict(abridged))
                .collect::<df_radiance_core::Result<Vec<_>>>()?;
            base.insert("room_3ds".into(), Value::Array(rooms));
        }
        let mut props = typed_map("BuildingProperties");
        if let Value::Object(rad) = self.properties.radiance.to_dict(abridged)? {
            props.extend(rad);
        }
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    /// Load the building fields and 3D rooms; stories are loaded by the model.
    pub(crate) fn from_dict_without_stories(data: &Value) -> Result<Self> {
        check_type(data, "Building")?;
        let mut building = Self::new(required_str(data, "identifier")?)?;
        building.display_name = optional_str(data, "display_name")?.map(str::to_string);
        if let Some(rooms) = optional_array(data, "room_3ds")? {
            building.room_3ds = rooms
                .iter()
                .map(hb::Room::from_dict)
                .collect::<df_radiance_core::Result<_>>()?;
        }
        if let Some(rad) = radiance_block(data) {
            if type_tag(rad)? == "BuildingRadianceProperties" {
                building.properties.radiance =
                    BuildingRadianceProperties::from_dict(rad, BuildingKey::default())?;
            }
        }
        Ok(building)
    }
}
