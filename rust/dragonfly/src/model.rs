// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the host model.
//!
//! The [`Model`] owns every building, story, 2D room and context shade in
//! slot maps with stable keys. Parents are referenced by key (a room knows
//! its story, a story its building) and children by ordered key lists, so
//! the radiance records can resolve inherited values by walking keys.
//!
//! Inserting an entity hands its new key to the entity's radiance record.

use df_radiance_core::hb::properties::radiance_block;
use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{
    check_type, optional_array, optional_f64, optional_str, required_str, valid_rad_string,
};
use slotmap::SlotMap;
use serde_json::Value;

use crate::building::Building;
use crate::context::ContextShade;
use crate::error::{Error, Result};
use crate::keys::{BuildingKey, ContextShadeKey, Room2DKey, StoryKey};
use crate::properties::ModelRadianceProperties;
use crate::room2d::Room2D;
use crate::story::Story;

pub const DEFAULT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelProperties {
    pub radiance: ModelRadianceProperties,
}

/// A model of buildings made of stories of 2D rooms, plus context shades.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use df_radiance::{Building, Model, Room2D, Story};
/// use df_radiance_core::ModifierSet;
/// use df_radiance_geometry::Point3;
///
/// let mut model = Model::new("Campus")?;
/// let room = Room2D::from_rectangle("Office1", Point3::origin(), 5.0, 4.0, 3.0)?;
/// let room = model.add_room_2d(room);
/// let mut story = Story::new("Floor1", 3.5)?;
/// story
///     .properties
///     .radiance
///     .set_modifier_set(Some(Arc::new(ModifierSet::new("Tinted")?)));
/// let story = model.add_story(story, &[room])?;
/// model.add_building(Building::new("B1")?, &[story])?;
///
/// let set = model.room_2d(room)?.properties.radiance.modifier_set(&model);
/// assert_eq!(set.identifier(), "Tinted");
/// # Ok::<(), df_radiance::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    pub identifier: String,
    pub display_name: Option<String>,
    pub tolerance: f64,

    // Entity storage
    pub(crate) buildings: SlotMap<BuildingKey, Building>,
    pub(crate) stories: SlotMap<StoryKey, Story>,
    pub(crate) room_2ds: SlotMap<Room2DKey, Room2D>,
    pub(crate) context_shades: SlotMap<ContextShadeKey, ContextShade>,

    // Top-level order
    building_order: Vec<BuildingKey>,
    context_order: Vec<ContextShadeKey>,

    pub properties: ModelProperties,
}

impl Model {
    pub fn new(identifier: &str) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "Model identifier")?,
            display_name: None,
            tolerance: DEFAULT_TOLERANCE,
            buildings: SlotMap::with_key(),
            stories: SlotMap::with_key(),
            room_2ds: SlotMap::with_key(),
            context_shades: SlotMap::with_key(),
            building_order: Vec::new(),
            context_order: Vec::new(),
            properties: ModelProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    // =====================================================================
    // Insertion
    // =====================================================================

    /// Store a room that is not yet part of a story.
    pub fn add_room_2d(&mut self, mut room: Room2D) -> Room2DKey {
        room.parent = None;
        self.room_2ds.insert_with_key(|key| {
            room.properties.radiance.set_host(key);
            room
        })
    }

    /// Store a story holding the given rooms.
    ///
    /// Rooms already in another story are moved to the new one.
    pub fn add_story(&mut self, mut story: Story, rooms: &[Room2DKey]) -> Result<StoryKey> {
        for &room in rooms {
            self.room_2d(room)?;
        }
        story.room_2ds.clear();
        story.parent = None;
        let key = self.stories.insert_with_key(|key| {
            story.properties.radiance.set_host(key);
            story
        });
        for &room in rooms {
            self.assign_room_2d(key, room)?;
        }
        Ok(key)
    }

    /// Move a room into a story, detaching it from its previous story.
    pub fn assign_room_2d(&mut self, story: StoryKey, room: Room2DKey) -> Result<()> {
        self.story(story)?;
        let previous = self.room_2d(room)?.parent;
        if let Some(prev) = previous.and_then(|k| self.stories.get_mut(k)) {
            prev.room_2ds.retain(|&k| k != room);
        }
        self.room_2d_mut(room)?.parent = Some(story);
        self.story_mut(story)?.room_2ds.push(room);
        Ok(())
    }

    /// Store a building holding the given stories.
    pub fn add_building(&mut self, mut building: Building, stories: &[StoryKey]) -> Result<BuildingKey> {
        for &story in stories {
            self.story(story)?;
        }
        building.unique_stories.clear();
        let key = self.buildings.insert_with_key(|key| {
            building.properties.radiance.set_host(key);
            building
        });
        self.building_order.push(key);
        for &story in stories {
            self.assign_story(key, story)?;
        }
        Ok(key)
    }

    /// Move a story into a building, detaching it from its previous building.
    pub fn assign_story(&mut self, building: BuildingKey, story: StoryKey) -> Result<()> {
        self.building(building)?;
        let previous = self.story(story)?.parent;
        if let Some(prev) = previous.and_then(|k| self.buildings.get_mut(k)) {
            prev.unique_stories.retain(|&k| k != story);
        }
        self.story_mut(story)?.parent = Some(building);
        self.building_mut(building)?.unique_stories.push(story);
        Ok(())
    }

    pub fn add_context_shade(&mut self, shade: ContextShade) -> ContextShadeKey {
        let key = self.context_shades.insert_with_key(|key| {
            let mut shade = shade;
            shade.properties.radiance.set_host(key);
            shade
        });
        self.context_order.push(key);
        key
    }

    // =====================================================================
    // Duplication
    // =====================================================================

    /// Copy a room without a parent. The copy keeps the identifier and
    /// shares the modifier set of the original.
    pub fn duplicate_room_2d(&mut self, room: Room2DKey) -> Result<Room2DKey> {
        let mut copy = self.room_2d(room)?.clone();
        copy.parent = None;
        let radiance = copy.properties.radiance.clone();
        Ok(self.room_2ds.insert_with_key(|key| {
            copy.properties.radiance = radiance.duplicate(Some(key));
            copy
        }))
    }

    /// Copy a story and its rooms, without a parent building.
    pub fn duplicate_story(&mut self, story: StoryKey) -> Result<StoryKey> {
        let original = self.story(story)?.clone();
        let rooms = original
            .room_2ds
            .iter()
            .map(|&r| self.duplicate_room_2d(r))
            .collect::<Result<Vec<_>>>()?;
        let radiance = original.properties.radiance.clone();
        let key = self.add_story(original, &rooms)?;
        let copy = self.story_mut(key)?;
        copy.properties.radiance = radiance.duplicate(Some(key));
        Ok(key)
    }

    /// Copy a building with all of its stories and rooms and append it to
    /// the model.
    pub fn duplicate_building(&mut self, building: BuildingKey) -> Result<BuildingKey> {
        let original = self.building(building)?.clone();
        let stories = original
            .unique_stories
            .iter()
            .map(|&s| self.duplicate_story(s))
            .collect::<Result<Vec<_>>>()?;
        let radiance = original.properties.radiance.clone();
        let key = self.add_building(original, &stories)?;
        self.building_mut(key)?.properties.radiance = radiance.duplicate(Some(key));
        Ok(key)
    }

    // =====================================================================
    // Lookup
    // =====================================================================

    pub fn building(&self, key: BuildingKey) -> Result<&Building> {
        self.buildings.get(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn building_mut(&mut self, key: BuildingKey) -> Result<&mut Building> {
        self.buildings.get_mut(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn story(&self, key: StoryKey) -> Result<&Story> {
        self.stories.get(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn story_mut(&mut self, key: StoryKey) -> Result<&mut Story> {
        self.stories.get_mut(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn room_2d(&self, key: Room2DKey) -> Result<&Room2D> {
        self.room_2ds.get(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn room_2d_mut(&mut self, key: Room2DKey) -> Result<&mut Room2D> {
        self.room_2ds.get_mut(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn context_shade(&self, key: ContextShadeKey) -> Result<&ContextShade> {
        self.context_shades.get(key).ok_or(Error::NotFound(key.into()))
    }

    pub fn context_shade_mut(&mut self, key: ContextShadeKey) -> Result<&mut ContextShade> {
        self.context_shades
            .get_mut(key)
            .ok_or(Error::NotFound(key.into()))
    }

    pub fn building_by_identifier(&self, identifier: &str) -> Option<BuildingKey> {
        self.buildings()
            .find(|b| b.identifier == identifier)
            .map(Building::key)
    }

    pub fn story_by_identifier(&self, identifier: &str) -> Option<StoryKey> {
        self.stories
            .iter()
            .find(|(_, s)| s.identifier == identifier)
            .map(|(k, _)| k)
    }

    pub fn room_2d_by_identifier(&self, identifier: &str) -> Option<Room2DKey> {
        self.room_2ds
            .iter()
            .find(|(_, r)| r.identifier == identifier)
            .map(|(k, _)| k)
    }

    pub fn context_shade_by_identifier(&self, identifier: &str) -> Option<ContextShadeKey> {
        self.context_shades()
            .find(|s| s.identifier == identifier)
            .map(ContextShade::key)
    }

    // =====================================================================
    // Traversal
    // =====================================================================

    pub fn building_keys(&self) -> &[BuildingKey] {
        &self.building_order
    }

    pub fn context_shade_keys(&self) -> &[ContextShadeKey] {
        &self.context_order
    }

    /// Buildings in insertion order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> + '_ {
        self.building_order
            .iter()
            .filter_map(move |&k| self.buildings.get(k))
    }

    /// Stories of every building, building by building.
    pub fn stories(&self) -> impl Iterator<Item = &Story> + '_ {
        self.buildings()
            .flat_map(|b| b.unique_stories.iter())
            .filter_map(move |&k| self.stories.get(k))
    }

    /// 2D rooms of every story, story by story.
    pub fn room_2ds(&self) -> impl Iterator<Item = &Room2D> + '_ {
        self.stories()
            .flat_map(|s| s.room_2ds.iter())
            .filter_map(move |&k| self.room_2ds.get(k))
    }

    pub fn context_shades(&self) -> impl Iterator<Item = &ContextShade> + '_ {
        self.context_order
            .iter()
            .filter_map(move |&k| self.context_shades.get(k))
    }

    /// Every 2D room of the building's stories.
    pub fn unique_room_2d_keys(&self, building: BuildingKey) -> Result<Vec<Room2DKey>> {
        let mut keys = Vec::new();
        for &story in &self.building(building)?.unique_stories {
            keys.extend_from_slice(&self.story(story)?.room_2ds);
        }
        Ok(keys)
    }

    // =====================================================================
    // Dictionaries
    // =====================================================================

    /// Identifiers of stored stories and rooms that no building reaches.
    /// They are left out of the model dictionary and the 3D translation.
    pub fn detached_identifiers(&self) -> Vec<String> {
        let stories = self
            .stories
            .values()
            .filter(|s| s.parent.is_none())
            .map(|s| s.identifier.clone());
        let rooms = self
            .room_2ds
            .values()
            .filter(|r| r.parent.is_none())
            .map(|r| r.identifier.clone());
        stories.chain(rooms).collect()
    }

    /// The model dictionary. Entities are written abridged; shared modifier
    /// sets and modifiers are listed once under the model properties.
    ///
    /// Stories and rooms outside every building are dropped with a warning.
    pub fn to_dict(&self) -> Result<Value> {
        let detached = self.detached_identifiers();
        if !detached.is_empty() {
            tracing::warn!(
                model = %self.identifier,
                dropped = ?detached,
                "Skipping entities not assigned to a building"
            );
        }
        let mut base = typed_map("Model");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        let mut buildings = Vec::with_capacity(self.building_order.len());
        for building in self.buildings() {
            let mut stories = Vec::with_capacity(building.unique_stories.len());
            for &s_key in &building.unique_stories {
                let story = self.story(s_key)?;
                let rooms = story
                    .room_2ds
                    .iter()
                    .map(|&r| self.room_2d(r)?.to_dict(true))
                    .collect::<Result<Vec<_>>>()?;
                stories.push(story.to_dict_with_rooms(true, rooms)?);
            }
            buildings.push(building.to_dict_with_stories(true, stories)?);
        }
        base.insert("buildings".into(), Value::Array(buildings));
        if !self.context_order.is_empty() {
            let shades = self
                .context_shades()
                .map(|s| s.to_dict(true))
                .collect::<Result<Vec<_>>>()?;
            base.insert("context_shades".into(), Value::Array(shades));
        }
        base.insert("tolerance".into(), Value::from(self.tolerance));
        let mut props = typed_map("ModelProperties");
        if let Value::Object(rad) = self.properties.radiance.to_dict(self)? {
            props.extend(rad);
        }
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    /// Load a model, then re-attach the abridged radiance references of
    /// every entity to the shared objects listed in the model properties.
    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Model")?;
        let mut model = Self::new(required_str(data, "identifier")?)?;
        model.display_name = optional_str(data, "display_name")?.map(str::to_string);
        if let Some(tol) = optional_f64(data, "tolerance")? {
            model.tolerance = tol;
        }

        for b_dict in optional_array(data, "buildings")?.into_iter().flatten() {
            let building = Building::from_dict_without_stories(b_dict)?;
            let mut stories = Vec::new();
            for s_dict in optional_array(b_dict, "unique_stories")?.into_iter().flatten() {
                let mut story = Story::from_dict_without_rooms(s_dict)?;
                let mut rooms = Vec::new();
                let mut max_height: f64 = 0.0;
                for r_dict in optional_array(s_dict, "room_2ds")?.into_iter().flatten() {
                    let room = Room2D::from_dict(r_dict)?;
                    max_height = max_height.max(room.floor_to_ceiling_height());
                    rooms.push(model.add_room_2d(room));
                }
                if story.floor_to_floor_height() == 0.0 {
                    story.set_floor_to_floor_height(max_height)?;
                }
                stories.push(model.add_story(story, &rooms)?);
            }
            model.add_building(building, &stories)?;
        }
        for s_dict in optional_array(data, "context_shades")?.into_iter().flatten() {
            model.add_context_shade(ContextShade::from_dict(s_dict)?);
        }

        if radiance_block(data).is_some() {
            ModelRadianceProperties::apply_properties_from_dict(&mut model, data)?;
        }
        tracing::debug!(
            buildings = model.buildings.len(),
            stories = model.stories.len(),
            room_2ds = model.room_2ds.len(),
            context_shades = model.context_shades.len(),
            "Loaded model"
        );
        Ok(model)
    }
}
