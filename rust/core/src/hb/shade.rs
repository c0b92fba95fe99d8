// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use df_radiance_geometry::Face3D;
use serde_json::Value;

use super::properties::{load_full, radiance_block, ShadeRadianceProperties};
use crate::error::Result;
use crate::modifier::Modifier;
use crate::modifierset::{ModifierPool, ModifierSet};
use crate::pool::typed_map;
use crate::typing::{
    check_type, optional_bool, optional_str, required_field, required_str, valid_rad_string,
};

/// Extension properties of a shade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadeProperties {
    pub radiance: ShadeRadianceProperties,
}

/// A single planar shading surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Shade {
    pub identifier: String,
    pub display_name: Option<String>,
    pub geometry: Face3D,
    /// Detached shades do not move with a parent room.
    pub is_detached: bool,
    pub properties: ShadeProperties,
}

impl Shade {
    pub fn new(identifier: &str, geometry: Face3D, is_detached: bool) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "shade identifier")?,
            display_name: None,
            geometry,
            is_detached,
            properties: ShadeProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// The assigned modifier, else the set's interior or exterior shade slot.
    pub fn effective_modifier(&self, is_indoor: bool, set: &ModifierSet) -> Arc<Modifier> {
        if let Some(m) = self.properties.radiance.modifier_override() {
            return Arc::clone(m);
        }
        if is_indoor {
            set.shade_set.interior_modifier()
        } else {
            set.shade_set.exterior_modifier()
        }
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = typed_map("Shade");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        base.insert("is_detached".into(), Value::from(self.is_detached));
        let mut props = typed_map("ShadeProperties");
        props.insert("radiance".into(), self.properties.radiance.to_dict(abridged)?);
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "Shade")?;
        let geometry: Face3D = serde_json::from_value(required_field(data, "geometry")?.clone())?;
        let mut shade = Self::new(
            required_str(data, "identifier")?,
            geometry,
            optional_bool(data, "is_detached")?.unwrap_or(false),
        )?;
        shade.display_name = optional_str(data, "display_name")?.map(str::to_string);
        shade.properties.radiance =
            load_full(data, "ShadeRadianceProperties", ShadeRadianceProperties::from_dict)?;
        Ok(shade)
    }

    /// Attach the abridged modifier reference stored in `data`, if any.
    pub fn apply_properties_from_dict(&mut self, data: &Value, modifiers: &ModifierPool) -> Result<()> {
        if let Some(radiance) = radiance_block(data) {
            self.properties
                .radiance
                .apply_properties_from_dict(radiance, modifiers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library;
    use crate::modifier::Plastic;

    fn canopy() -> Shade {
        let geo = Face3D::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)], 3.0).unwrap();
        Shade::new("Canopy", geo, false).unwrap()
    }

    #[test]
    fn effective_modifier_follows_set_and_override() {
        let mut shade = canopy();
        let set = library::generic_modifier_set_visible();
        assert!(Arc::ptr_eq(
            &shade.effective_modifier(false, &set),
            &library::generic_exterior_shade()
        ));
        let wood = Arc::new(Plastic::from_single_reflectance("wood", 0.4, 0.0, 0.0).unwrap());
        shade.properties.radiance.set_modifier(Some(Arc::clone(&wood)));
        assert!(Arc::ptr_eq(&shade.effective_modifier(true, &set), &wood));
    }

    #[test]
    fn abridged_dict_round_trip() {
        let mut shade = canopy();
        let wood = Arc::new(Plastic::from_single_reflectance("wood", 0.4, 0.0, 0.0).unwrap());
        shade.properties.radiance.set_modifier(Some(Arc::clone(&wood)));
        let d = shade.to_dict(true).unwrap();
        assert_eq!(d["properties"]["radiance"]["modifier"], "wood");

        let mut loaded = Shade::from_dict(&d).unwrap();
        assert!(!loaded.properties.radiance.is_modifier_set_by_user());
        let mut pool = ModifierPool::default();
        pool.insert("wood".into(), wood);
        loaded.apply_properties_from_dict(&d, &pool).unwrap();
        assert_eq!(loaded, shade);
    }

    #[test]
    fn full_dict_carries_modifier() {
        let mut shade = canopy();
        let wood = Arc::new(Plastic::from_single_reflectance("wood", 0.4, 0.0, 0.0).unwrap());
        shade.properties.radiance.set_modifier(Some(wood));
        let loaded = Shade::from_dict(&shade.to_dict(false).unwrap()).unwrap();
        assert_eq!(loaded, shade);
    }
}
