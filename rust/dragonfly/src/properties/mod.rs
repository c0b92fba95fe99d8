// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance property records attached to host entities.
//!
//! Every host entity owns one record in its `properties.radiance` field. A
//! record stores the key of its host (filled in when the entity enters the
//! model arena) and the overrides the user assigned. Effective values are
//! resolved on each call by walking the parent links of the model, so a
//! change to a story's override is seen by its rooms immediately.

use std::sync::Arc;

use df_radiance_core::pool::typed_map;
use df_radiance_core::typing::{as_object, field};
use df_radiance_core::ModifierSet;
use serde_json::{Map, Value};

use crate::error::Result;

/// Accessors shared by the records that carry a modifier set override.
macro_rules! modifier_set_access {
    ($name:ident, $key:ty) => {
        impl $name {
            /// Key of the host entity.
            pub fn host(&self) -> $key {
                self.host
            }

            pub(crate) fn set_host(&mut self, host: $key) {
                self.host = host;
            }

            /// The assigned set only, without inheritance.
            pub fn modifier_set_override(&self) -> Option<&Arc<ModifierSet>> {
                self.modifier_set.as_ref()
            }

            /// Assign a set, or clear the override with `None`.
            ///
            /// The set is shared by every entity it is assigned to and must
            /// not be changed afterwards.
            pub fn set_modifier_set(&mut self, value: Option<Arc<ModifierSet>>) {
                self.modifier_set = value;
            }

            pub fn is_modifier_set_by_user(&self) -> bool {
                self.modifier_set.is_some()
            }
        }
    };
}

pub mod building;
pub mod context;
pub mod model;
pub mod room2d;
pub mod story;

pub use building::BuildingRadianceProperties;
pub use context::ContextShadeRadianceProperties;
pub use model::ModelRadianceProperties;
pub use room2d::Room2DRadianceProperties;
pub use story::StoryRadianceProperties;

/// Start a record dictionary, switching to the abridged tag when asked.
pub(crate) fn record_map(full_tag: &str, abridged: bool) -> Map<String, Value> {
    if abridged {
        typed_map(&format!("{}Abridged", full_tag))
    } else {
        typed_map(full_tag)
    }
}

/// Write a modifier set override: its identifier when abridged, else in full.
pub(crate) fn insert_modifier_set(
    base: &mut Map<String, Value>,
    set: Option<&Arc<ModifierSet>>,
    abridged: bool,
) -> Result<()> {
    if let Some(set) = set {
        let value = if abridged {
            Value::from(set.identifier())
        } else {
            set.to_dict(false, true)?
        };
        base.insert("modifier_set".into(), value);
    }
    Ok(())
}

/// Read a full modifier set override; absent and `null` mean no override.
pub(crate) fn load_modifier_set(data: &Value) -> Result<Option<Arc<ModifierSet>>> {
    match field(data, "modifier_set") {
        Some(d) => {
            as_object(d, "ModifierSet")?;
            Ok(Some(Arc::new(ModifierSet::from_dict(d)?)))
        }
        None => Ok(None),
    }
}

/// Nest a record under the `radiance` key.
pub(crate) fn radiance_entry(record: Map<String, Value>) -> Value {
    let mut base = Map::new();
    base.insert("radiance".into(), Value::Object(record));
    Value::Object(base)
}
