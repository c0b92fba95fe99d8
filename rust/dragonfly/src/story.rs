// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stories: groups of 2D rooms sharing a floor-to-floor height.

use df_radiance_core::hb::properties::radiance_block;
use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{
    check_type, float_positive, int_positive, optional_f64, optional_i64, optional_str,
    required_str, type_tag, valid_rad_string,
};
use serde_json::Value;

use crate::error::Result;
use crate::keys::{BuildingKey, Room2DKey, StoryKey};
use crate::properties::StoryRadianceProperties;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryProperties {
    pub radiance: StoryRadianceProperties,
}

/// A story of a building.
///
/// Rooms are referenced by key; they are added with
/// [`Model::add_story`](crate::Model::add_story).
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub identifier: String,
    pub display_name: Option<String>,
    pub(crate) room_2ds: Vec<Room2DKey>,
    floor_to_floor_height: f64,
    multiplier: u32,
    pub(crate) parent: Option<BuildingKey>,
    pub properties: StoryProperties,
}

impl Story {
    pub fn new(identifier: &str, floor_to_floor_height: f64) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "Story identifier")?,
            display_name: None,
            room_2ds: Vec::new(),
            floor_to_floor_height: float_positive(
                floor_to_floor_height,
                "Story floor_to_floor_height",
            )?,
            multiplier: 1,
            parent: None,
            properties: StoryProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn room_2ds(&self) -> &[Room2DKey] {
        &self.room_2ds
    }

    pub fn floor_to_floor_height(&self) -> f64 {
        self.floor_to_floor_height
    }

    pub fn set_floor_to_floor_height(&mut self, value: f64) -> Result<()> {
        self.floor_to_floor_height = float_positive(value, "Story floor_to_floor_height")?;
        Ok(())
    }

    /// Number of times the story repeats in its building.
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, value: u32) -> Result<()> {
        if value == 0 {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "Story multiplier".into(),
                reason: "must be greater than 0".into(),
            }
            .into());
        }
        self.multiplier = value;
        Ok(())
    }

    pub fn parent(&self) -> Option<BuildingKey> {
        self.parent
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn key(&self) -> StoryKey {
        self.properties.radiance.host()
    }

    /// The story dictionary with its rooms given as dictionaries.
    pub(crate) fn to_dict_with_rooms(&self, abridged: bool, room_dicts: Vec<Value>) -> Result<Value> {
        let mut base = typed_map("Story");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("room_2ds".into(), Value::Array(room_dicts));
        base.insert(
            "floor_to_floor_height".into(),
            Value::from(self.floor_to_floor_height),
        );
        base.insert("multiplier".into(), Value::from(self.multiplier));
        let mut props = typed_map("StoryProperties");
        if let Value::Object(rad) = self.properties.radiance.to_dict(abridged)? {
            props.extend(rad);
        }
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    /// Load the story fields; rooms are loaded by the model.
    ///
    /// A missing `floor_to_floor_height` is left at 0 for the caller to
    /// derive from the rooms.
    pub(crate) fn from_dict_without_rooms(data: &Value) -> Result<Self> {
        check_type(data, "Story")?;
        let mut story = Self::new(
            required_str(data, "identifier")?,
            optional_f64(data, "floor_to_floor_height")?.unwrap_or(0.0),
        )?;
        story.display_name = optional_str(data, "display_name")?.map(str::to_string);
        if let Some(m) = optional_i64(data, "multiplier")? {
            story.set_multiplier(int_positive(m, "Story multiplier")?)?;
        }
        if let Some(rad) = radiance_block(data) {
            if type_tag(rad)? == "StoryRadianceProperties" {
                story.properties.radiance = StoryRadianceProperties::from_dict(rad, StoryKey::default())?;
            }
        }
        Ok(story)
    }
}
