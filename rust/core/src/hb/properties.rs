// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance property records of 3D rooms, faces, apertures, doors and shades.
//!
//! Rooms carry an optional modifier set override. Surfaces carry an optional
//! modifier override; without one their modifier comes from the room's
//! effective modifier set.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::library::generic_modifier_set_visible;
use crate::modifier::Modifier;
use crate::modifierset::{ModifierPool, ModifierSet, ModifierSetPool};
use crate::pool::{resolve, typed_map};
use crate::typing::{check_type, field, type_tag};

/// Radiance properties of a 3D room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRadianceProperties {
    modifier_set: Option<Arc<ModifierSet>>,
}

impl RoomRadianceProperties {
    pub fn new(modifier_set: Option<Arc<ModifierSet>>) -> Self {
        Self { modifier_set }
    }

    /// The assigned set, or the global default.
    pub fn modifier_set(&self) -> Arc<ModifierSet> {
        self.modifier_set
            .clone()
            .unwrap_or_else(generic_modifier_set_visible)
    }

    /// The assigned set only.
    pub fn modifier_set_override(&self) -> Option<&Arc<ModifierSet>> {
        self.modifier_set.as_ref()
    }

    pub fn set_modifier_set(&mut self, value: Option<Arc<ModifierSet>>) {
        self.modifier_set = value;
    }

    pub fn is_modifier_set_by_user(&self) -> bool {
        self.modifier_set.is_some()
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let tag = if abridged {
            "RoomRadiancePropertiesAbridged"
        } else {
            "RoomRadianceProperties"
        };
        let mut base = typed_map(tag);
        if let Some(set) = &self.modifier_set {
            let value = if abridged {
                Value::from(set.identifier())
            } else {
                set.to_dict(false, true)?
            };
            base.insert("modifier_set".into(), value);
        }
        Ok(Value::Object(base))
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "RoomRadianceProperties")?;
        let modifier_set = field(data, "modifier_set")
            .map(|d| ModifierSet::from_dict(d).map(Arc::new))
            .transpose()?;
        Ok(Self { modifier_set })
    }

    pub fn apply_properties_from_dict(
        &mut self,
        data: &Value,
        modifier_sets: &ModifierSetPool,
    ) -> Result<()> {
        if let Some(set) = resolve(data, "modifier_set", modifier_sets, "ModifierSet")? {
            self.modifier_set = Some(set);
        }
        Ok(())
    }
}

macro_rules! modifier_properties {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            modifier: Option<Arc<Modifier>>,
        }

        impl $name {
            pub fn new(modifier: Option<Arc<Modifier>>) -> Self {
                Self { modifier }
            }

            /// The assigned modifier only.
            pub fn modifier_override(&self) -> Option<&Arc<Modifier>> {
                self.modifier.as_ref()
            }

            pub fn set_modifier(&mut self, value: Option<Arc<Modifier>>) {
                self.modifier = value;
            }

            pub fn is_modifier_set_by_user(&self) -> bool {
                self.modifier.is_some()
            }

            pub fn to_dict(&self, abridged: bool) -> Result<Value> {
                let tag = if abridged { concat!($tag, "Abridged") } else { $tag };
                let mut base = typed_map(tag);
                if let Some(m) = &self.modifier {
                    let value = if abridged {
                        Value::from(m.identifier())
                    } else {
                        m.to_dict()?
                    };
                    base.insert("modifier".into(), value);
                }
                Ok(Value::Object(base))
            }

            pub fn from_dict(data: &Value) -> Result<Self> {
                check_type(data, $tag)?;
                let modifier = field(data, "modifier")
                    .map(|d| Modifier::from_dict(d).map(Arc::new))
                    .transpose()?;
                Ok(Self { modifier })
            }

            pub fn apply_properties_from_dict(
                &mut self,
                data: &Value,
                modifiers: &ModifierPool,
            ) -> Result<()> {
                if let Some(m) = resolve(data, "modifier", modifiers, "Modifier")? {
                    self.modifier = Some(m);
                }
                Ok(())
            }
        }
    };
}

modifier_properties!(FaceRadianceProperties, "FaceRadianceProperties");
modifier_properties!(ApertureRadianceProperties, "ApertureRadianceProperties");
modifier_properties!(DoorRadianceProperties, "DoorRadianceProperties");
modifier_properties!(
    /// Radiance properties of a shade; also used for context geometry.
    ShadeRadianceProperties,
    "ShadeRadianceProperties"
);

/// The `properties.radiance` block of an entity dictionary, if any.
pub fn radiance_block(entity: &Value) -> Option<&Value> {
    entity
        .get("properties")
        .and_then(|p| field(p, "radiance"))
}

/// Load a full (non-abridged) radiance record from an entity dictionary.
///
/// Abridged or missing records give the default record; abridged
/// references are attached later from the model pools.
pub fn load_full<P: Default>(
    entity: &Value,
    full_tag: &str,
    load: fn(&Value) -> Result<P>,
) -> Result<P> {
    match radiance_block(entity) {
        Some(radiance) if type_tag(radiance)? == full_tag => load(radiance),
        _ => Ok(P::default()),
    }
}
