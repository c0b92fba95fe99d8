// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context shades: surrounding geometry that only casts shadows.

use df_radiance_core::hb::properties::radiance_block;
use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{
    check_type, optional_bool, optional_str, required_field, required_str, type_tag,
    valid_rad_string,
};
use df_radiance_geometry::Face3D;
use serde_json::Value;

use crate::error::Result;
use crate::keys::ContextShadeKey;
use crate::properties::ContextShadeRadianceProperties;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextShadeProperties {
    pub radiance: ContextShadeRadianceProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextShade {
    pub identifier: String,
    pub display_name: Option<String>,
    pub geometry: Vec<Face3D>,
    /// Detached shades (trees, neighbours) do not move with a building.
    pub is_detached: bool,
    pub properties: ContextShadeProperties,
}

impl ContextShade {
    pub fn new(identifier: &str, geometry: Vec<Face3D>, is_detached: bool) -> Result<Self> {
        if geometry.is_empty() {
            return Err(df_radiance_core::Error::InvalidValue {
                name: "ContextShade geometry".into(),
                reason: "must contain at least one face".into(),
            }
            .into());
        }
        Ok(Self {
            identifier: valid_rad_string(identifier, "ContextShade identifier")?,
            display_name: None,
            geometry,
            is_detached,
            properties: ContextShadeProperties::default(),
        })
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn key(&self) -> ContextShadeKey {
        self.properties.radiance.host()
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = typed_map("ContextShade");
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("geometry".into(), serde_json::to_value(&self.geometry)?);
        base.insert("is_detached".into(), Value::from(self.is_detached));
        let mut props = typed_map("ContextShadeProperties");
        if let Value::Object(rad) = self.properties.radiance.to_dict(abridged)? {
            props.extend(rad);
        }
        base.insert("properties".into(), Value::Object(props));
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "ContextShade")?;
        let geometry: Vec<Face3D> = serde_json::from_value(required_field(data, "geometry")?.clone())?;
        let mut shade = Self::new(
            required_str(data, "identifier")?,
            geometry,
            optional_bool(data, "is_detached")?.unwrap_or(true),
        )?;
        shade.display_name = optional_str(data, "display_name")?.map(str::to_string);
        if let Some(rad) = radiance_block(data) {
            if type_tag(rad)? == "ContextShadeRadianceProperties" {
                shade.properties.radiance =
                    ContextShadeRadianceProperties::from_dict(rad, ContextShadeKey::default())?;
            }
        }
        Ok(shade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree() -> ContextShade {
        let canopy = Face3D::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], 4.0).unwrap();
        ContextShade::new("Tree", vec![canopy], true).unwrap()
    }

    #[test]
    fn dict_round_trip() {
        let d = tree().to_dict(true).unwrap();
        assert_eq!(d["type"], "ContextShade");
        assert_eq!(ContextShade::from_dict(&d).unwrap(), tree());
    }

    #[test]
    fn degenerate_geometry_fails_to_load() {
        let mut d = tree().to_dict(true).unwrap();
        d["geometry"][0] = json!({"type": "Face3D", "boundary": []});
        assert!(ContextShade::from_dict(&d).is_err());

        d["geometry"][0] = json!({"type": "Face3D", "boundary": [[0, 0, 4], [2, 0, 4], [4, 0, 4]]});
        assert!(ContextShade::from_dict(&d).is_err());
    }
}
