// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance properties of a 2D room: a modifier set override plus the grid
//! parameters used to make sensor grids when the room is translated to 3D.

use std::sync::Arc;

use df_radiance_core::hb::RoomRadianceProperties;
use df_radiance_core::library::{generic_modifier_set_visible, is_generic_modifier_set};
use df_radiance_core::pool::resolve;
use df_radiance_core::typing::{check_type, optional_array};
use df_radiance_core::{ModifierSet, ModifierSetPool};
use serde_json::Value;

use super::{insert_modifier_set, load_modifier_set, radiance_entry, record_map};
use crate::error::Result;
use crate::gridpar::{grid_parameters_from_dicts, GridParameter};
use crate::keys::Room2DKey;
use crate::model::Model;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Room2DRadianceProperties {
    host: Room2DKey,
    modifier_set: Option<Arc<ModifierSet>>,
    grid_parameters: Vec<GridParameter>,
}

modifier_set_access!(Room2DRadianceProperties, Room2DKey);

impl Room2DRadianceProperties {
    pub fn new(
        host: Room2DKey,
        modifier_set: Option<Arc<ModifierSet>>,
        grid_parameters: Vec<GridParameter>,
    ) -> Self {
        Self {
            host,
            modifier_set,
            grid_parameters,
        }
    }

    /// The assigned set, else the parent story's effective set, else the
    /// global default.
    pub fn modifier_set(&self, model: &Model) -> Arc<ModifierSet> {
        if let Some(set) = &self.modifier_set {
            return Arc::clone(set);
        }
        let story = model
            .room_2d(self.host)
            .ok()
            .and_then(|r| r.parent())
            .and_then(|k| model.story(k).ok());
        match story {
            Some(s) => s.properties.radiance.modifier_set(model),
            None => generic_modifier_set_visible(),
        }
    }

    /// Grid parameters in the order they were added.
    pub fn grid_parameters(&self) -> &[GridParameter] {
        &self.grid_parameters
    }

    pub fn set_grid_parameters(&mut self, grid_parameters: Vec<GridParameter>) {
        self.grid_parameters = grid_parameters;
    }

    pub fn add_grid_parameter(&mut self, grid_parameter: GridParameter) {
        self.grid_parameters.push(grid_parameter);
    }

    pub fn remove_grid_parameters(&mut self) {
        self.grid_parameters.clear();
    }

    /// Scale every grid parameter, as when the host room is scaled.
    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.grid_parameters = self
            .grid_parameters
            .iter()
            .map(|gp| gp.scale(factor))
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = record_map("Room2DRadianceProperties", abridged);
        insert_modifier_set(&mut base, self.modifier_set.as_ref(), abridged)?;
        if !self.grid_parameters.is_empty() {
            let gps = self.grid_parameters.iter().map(GridParameter::to_dict).collect();
            base.insert("grid_parameters".into(), Value::Array(gps));
        }
        Ok(radiance_entry(base))
    }

    pub fn from_dict(data: &Value, host: Room2DKey) -> Result<Self> {
        check_type(data, "Room2DRadianceProperties")?;
        let grid_parameters = match optional_array(data, "grid_parameters")? {
            Some(dicts) => grid_parameters_from_dicts(dicts)?,
            None => Vec::new(),
        };
        Ok(Self::new(host, load_modifier_set(data)?, grid_parameters))
    }

    /// Attach the abridged set reference and load any grid parameters.
    pub fn apply_properties_from_dict(
        &mut self,
        abridged_data: &Value,
        modifier_sets: &ModifierSetPool,
    ) -> Result<()> {
        if let Some(set) = resolve(abridged_data, "modifier_set", modifier_sets, "ModifierSet")? {
            self.modifier_set = Some(set);
        }
        if let Some(dicts) = optional_array(abridged_data, "grid_parameters")? {
            self.grid_parameters = grid_parameters_from_dicts(dicts)?;
        }
        Ok(())
    }

    /// A copy sharing the same set with its own list of grid parameters.
    pub fn duplicate(&self, new_host: Option<Room2DKey>) -> Self {
        Self::new(
            new_host.unwrap_or(self.host),
            self.modifier_set.clone(),
            self.grid_parameters.clone(),
        )
    }

    /// Properties of the matching 3D room.
    ///
    /// The effective set is assigned explicitly unless it is the global
    /// default, which the 3D room falls back to on its own.
    pub fn to_honeybee(&self, model: &Model) -> RoomRadianceProperties {
        let set = self.modifier_set(model);
        if is_generic_modifier_set(&set) {
            RoomRadianceProperties::default()
        } else {
            RoomRadianceProperties::new(Some(set))
        }
    }

    /// Copy the override of a 3D room. The host is set on insertion.
    pub fn from_honeybee(hb_properties: &RoomRadianceProperties) -> Self {
        Self::new(
            Room2DKey::default(),
            hb_properties.modifier_set_override().cloned(),
            Vec::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::gridpar::{RoomGridParameter, RoomRadialGridParameter};
    use crate::room2d::Room2D;
    use rustc_hash::FxHashMap;
    use df_radiance_geometry::Point3;
    use serde_json::json;

    fn tinted() -> Arc<ModifierSet> {
        Arc::new(ModifierSet::new("Tinted").unwrap())
    }

    fn room_grid() -> GridParameter {
        RoomGridParameter::new(1.0, 0.8, 0.0, true).unwrap().into()
    }

    #[test]
    fn to_dict_omits_empty_grid_parameters() {
        let props = Room2DRadianceProperties::default();
        let d = props.to_dict(true).unwrap();
        let record = &d["radiance"];
        assert_eq!(record["type"], "Room2DRadiancePropertiesAbridged");
        assert!(record.get("grid_parameters").is_none());
        assert!(record.get("modifier_set").is_none());
    }

    #[test]
    fn abridged_dict_references_the_set() {
        let props = Room2DRadianceProperties::new(Room2DKey::default(), Some(tinted()), vec![room_grid()]);
        let d = props.to_dict(true).unwrap();
        assert_eq!(d["radiance"]["modifier_set"], "Tinted");
        assert_eq!(d["radiance"]["grid_parameters"][0]["type"], "RoomGridParameter");

        let full = props.to_dict(false).unwrap();
        assert_eq!(full["radiance"]["type"], "Room2DRadianceProperties");
        assert_eq!(full["radiance"]["modifier_set"]["identifier"], "Tinted");

        let back = Room2DRadianceProperties::from_dict(&full["radiance"], Room2DKey::default()).unwrap();
        assert_eq!(back.modifier_set_override().unwrap().identifier(), "Tinted");
        assert_eq!(back.grid_parameters(), props.grid_parameters());
    }

    #[test]
    fn apply_replaces_grid_parameters_and_resolves_set() {
        let mut props = Room2DRadianceProperties::new(Room2DKey::default(), None, vec![room_grid()]);
        let set = tinted();
        let mut pool = FxHashMap::default();
        pool.insert("Tinted".to_string(), Arc::clone(&set));

        let radial = RoomRadialGridParameter::new(0.5, 1.0, 0.0, 8, [0.0, -1.0, 0.0], Some(0.2), false)
            .unwrap();
        let data = json!({
            "type": "Room2DRadiancePropertiesAbridged",
            "modifier_set": "Tinted",
            "grid_parameters": [radial.to_dict()]
        });
        props.apply_properties_from_dict(&data, &pool).unwrap();
        assert!(Arc::ptr_eq(props.modifier_set_override().unwrap(), &set));
        assert_eq!(props.grid_parameters().len(), 1);
        assert!(matches!(props.grid_parameters()[0], GridParameter::RoomRadial(_)));

        let missing = json!({"modifier_set": "Nowhere"});
        let err = props.apply_properties_from_dict(&missing, &pool).unwrap_err();
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn unknown_grid_parameter_type_fails() {
        let mut props = Room2DRadianceProperties::default();
        let data = json!({"grid_parameters": [{"type": "FloorGrid"}]});
        let err = props
            .apply_properties_from_dict(&data, &FxHashMap::default())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownGridParameter(_)));
    }

    #[test]
    fn duplicate_owns_its_grid_parameters() {
        let props = Room2DRadianceProperties::new(Room2DKey::default(), Some(tinted()), vec![room_grid()]);
        let mut copy = props.duplicate(None);
        copy.remove_grid_parameters();
        assert_eq!(props.grid_parameters().len(), 1);
        assert!(Arc::ptr_eq(
            copy.modifier_set_override().unwrap(),
            props.modifier_set_override().unwrap()
        ));
    }

    #[test]
    fn default_set_is_not_written_to_3d_room() {
        let mut model = Model::new("Lone").unwrap();
        let room = Room2D::from_rectangle("Office", Point3::origin(), 4.0, 3.0, 3.0).unwrap();
        let key = model.add_room_2d(room);
        let props = &model.room_2d(key).unwrap().properties.radiance;
        assert!(props.to_honeybee(&model).modifier_set_override().is_none());

        let model_set = tinted();
        model
            .room_2d_mut(key)
            .unwrap()
            .properties
            .radiance
            .set_modifier_set(Some(Arc::clone(&model_set)));
        let hb = model.room_2d(key).unwrap().properties.radiance.to_honeybee(&model);
        assert!(Arc::ptr_eq(hb.modifier_set_override().unwrap(), &model_set));
    }
}
