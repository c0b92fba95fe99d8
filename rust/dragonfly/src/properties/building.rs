// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance properties of a building.

use std::sync::Arc;

use df_radiance_core::library::generic_modifier_set_visible;
use df_radiance_core::pool::resolve;
use df_radiance_core::typing::{check_type, optional_array};
use df_radiance_core::{ModifierSet, ModifierSetPool};
use serde_json::Value;

use super::{insert_modifier_set, load_modifier_set, radiance_entry, record_map};
use crate::error::Result;
use crate::gridpar::{grid_parameters_from_dicts, GridParameter};
use crate::keys::BuildingKey;
use crate::model::Model;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingRadianceProperties {
    host: BuildingKey,
    modifier_set: Option<Arc<ModifierSet>>,
}

modifier_set_access!(BuildingRadianceProperties, BuildingKey);

impl BuildingRadianceProperties {
    pub fn new(host: BuildingKey, modifier_set: Option<Arc<ModifierSet>>) -> Self {
        Self { host, modifier_set }
    }

    /// The assigned set, or the global default. Buildings have no parent.
    pub fn modifier_set(&self) -> Arc<ModifierSet> {
        self.modifier_set
            .clone()
            .unwrap_or_else(generic_modifier_set_visible)
    }

    /// Add a grid parameter to every unique 2D room of the building.
    pub fn add_grid_parameter(
        model: &mut Model,
        host: BuildingKey,
        grid_parameter: GridParameter,
    ) -> Result<()> {
        for key in model.unique_room_2d_keys(host)? {
            model
                .room_2d_mut(key)?
                .properties
                .radiance
                .add_grid_parameter(grid_parameter.clone());
        }
        Ok(())
    }

    /// Apply the `grid_parameters` of a geoJSON feature `properties` object.
    pub fn apply_properties_from_geojson_dict(
        model: &mut Model,
        host: BuildingKey,
        data: &Value,
    ) -> Result<()> {
        let dicts = optional_array(data, "grid_parameters")?;
        for gp in grid_parameters_from_dicts(dicts.map(Vec::as_slice).unwrap_or_default())? {
            Self::add_grid_parameter(model, host, gp)?;
        }
        Ok(())
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = record_map("BuildingRadianceProperties", abridged);
        insert_modifier_set(&mut base, self.modifier_set.as_ref(), abridged)?;
        Ok(radiance_entry(base))
    }

    /// Load a full record; abridged records must go through
    /// [`apply_properties_from_dict`](Self::apply_properties_from_dict).
    pub fn from_dict(data: &Value, host: BuildingKey) -> Result<Self> {
        check_type(data, "BuildingRadianceProperties")?;
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

    /// A copy sharing the same set, hosted by `new_host` or the current host.
    pub fn duplicate(&self, new_host: Option<BuildingKey>) -> Self {
        Self::new(new_host.unwrap_or(self.host), self.modifier_set.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Building;
    use crate::gridpar::{ExteriorFaceGridParameter, RoomGridParameter};
    use crate::keys::Room2DKey;
    use crate::room2d::Room2D;
    use crate::story::Story;
    use df_radiance_geometry::Point3;
    use serde_json::json;

    /// Two stories of one room each, plus a loose room outside the building.
    fn two_story_model() -> (Model, BuildingKey, Room2DKey) {
        let mut model = Model::new("Tower").unwrap();
        let mut stories = Vec::new();
        for (i, z) in [0.0, 3.5].into_iter().enumerate() {
            let room = Room2D::from_rectangle(
                &format!("Office{}", i + 1),
                Point3::new(0.0, 0.0, z),
                5.0,
                4.0,
                3.0,
            )
            .unwrap();
            let key = model.add_room_2d(room);
            let story = Story::new(&format!("Floor{}", i + 1), 3.5).unwrap();
            stories.push(model.add_story(story, &[key]).unwrap());
        }
        let loose = Room2D::from_rectangle("Shed", Point3::new(10.0, 0.0, 0.0), 2.0, 2.0, 2.5).unwrap();
        let shed = model.add_room_2d(loose);
        let building = model.add_building(Building::new("B1").unwrap(), &stories).unwrap();
        (model, building, shed)
    }

    fn grid_counts(model: &Model) -> Vec<(String, usize)> {
        model
            .room_2ds()
            .map(|r| (r.identifier.clone(), r.properties.radiance.grid_parameters().len()))
            .collect()
    }

    #[test]
    fn unassigned_building_uses_generic_set() {
        let props = BuildingRadianceProperties::default();
        assert_eq!(props.modifier_set(), generic_modifier_set_visible());
        let d = props.to_dict(true).unwrap();
        assert_eq!(d["radiance"]["type"], "BuildingRadiancePropertiesAbridged");
        assert!(d["radiance"].get("modifier_set").is_none());
    }

    #[test]
    fn grid_parameter_reaches_every_room_of_the_building() {
        let (mut model, building, shed) = two_story_model();
        let gp: GridParameter = RoomGridParameter::new(1.0, 0.8, 0.0, true).unwrap().into();
        BuildingRadianceProperties::add_grid_parameter(&mut model, building, gp).unwrap();
        let counts = grid_counts(&model);
        assert!(counts.contains(&("Office1".to_string(), 1)));
        assert!(counts.contains(&("Office2".to_string(), 1)));
        assert_eq!(counts.len(), 2);
        let shed = model.room_2d(shed).unwrap();
        assert!(shed.properties.radiance.grid_parameters().is_empty());
    }

    #[test]
    fn geojson_grid_parameters_are_applied() {
        let (mut model, building, _) = two_story_model();
        let face = ExteriorFaceGridParameter::from_dict(&json!({
            "type": "ExteriorFaceGridParameter",
            "dimension": 0.5,
            "offset": 0.1
        }))
        .unwrap();
        let feature = json!({
            "name": "B1",
            "grid_parameters": [
                {"type": "RoomGridParameter", "dimension": 1.0, "offset": 0.8},
                face.to_dict()
            ]
        });
        BuildingRadianceProperties::apply_properties_from_geojson_dict(&mut model, building, &feature)
            .unwrap();
        let office = model
            .room_2d(model.room_2d_by_identifier("Office2").unwrap())
            .unwrap();
        let gps = office.properties.radiance.grid_parameters();
        assert_eq!(gps.len(), 2);
        assert!(matches!(gps[1], GridParameter::ExteriorFace(_)));

        // A feature without grid parameters changes nothing.
        BuildingRadianceProperties::apply_properties_from_geojson_dict(&mut model, building, &json!({}))
            .unwrap();
        assert!(grid_counts(&model).contains(&("Office1".to_string(), 2)));
    }

    #[test]
    fn full_dict_carries_the_set() {
        let set = Arc::new(ModifierSet::new("Bright").unwrap());
        let props = BuildingRadianceProperties::new(BuildingKey::default(), Some(set));
        let full = props.to_dict(false).unwrap();
        let back = BuildingRadianceProperties::from_dict(&full["radiance"], BuildingKey::default())
            .unwrap();
        assert_eq!(back.modifier_set().identifier(), "Bright");
        assert!(props.duplicate(None).is_modifier_set_by_user());
    }
}
