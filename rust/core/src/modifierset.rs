// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Modifier sets: one modifier per face type and boundary condition.
//!
//! Every slot is optional. An empty slot resolves to the matching generic
//! modifier from [`crate::library`], so a freshly created set behaves like
//! the global default until slots are assigned. Sets are built with `&mut`
//! access and then frozen by wrapping them in an `Arc` before they are
//! assigned to hosts.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::dedup::{push_instance, unique_values};
use crate::error::{Error, Result};
use crate::library;
use crate::modifier::Modifier;
use crate::typing::{check_type, field, optional_str, required_str, valid_rad_string, value_kind};

/// Identifier to modifier lookup used when loading abridged dictionaries.
pub type ModifierPool = FxHashMap<String, Arc<Modifier>>;

/// Identifier to modifier set lookup.
pub type ModifierSetPool = FxHashMap<String, Arc<ModifierSet>>;

/// Write a modifier reference: the identifier when abridged, else the full dict.
fn modifier_ref(modifier: &Modifier, abridged: bool) -> Result<Value> {
    if abridged {
        Ok(Value::from(modifier.identifier()))
    } else {
        modifier.to_dict()
    }
}

/// Read one slot; `null` and absent both leave the slot empty.
fn load_slot(data: &Value, key: &str, pool: Option<&ModifierPool>) -> Result<Option<Arc<Modifier>>> {
    match (field(data, key), pool) {
        (None, _) => Ok(None),
        (Some(Value::String(id)), Some(pool)) => pool
            .get(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::MissingIdentifier {
                kind: "Modifier",
                identifier: id.clone(),
            }),
        (Some(v @ Value::Object(_)), _) => Ok(Some(Arc::new(Modifier::from_dict(v)?))),
        (Some(other), _) => Err(Error::type_error(
            format!("modifier for {}", key),
            value_kind(other),
        )),
    }
}

macro_rules! modifier_subset {
    (
        $(#[$meta:meta])*
        $name:ident, $tag:literal {
            $($slot:ident / $setter:ident => $default:path),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $($slot: Option<Arc<Modifier>>,)+
        }

        impl $name {
            $(
                /// Effective modifier of the slot.
                pub fn $slot(&self) -> Arc<Modifier> {
                    self.$slot.clone().unwrap_or_else($default)
                }

                pub fn $setter(&mut self, value: Option<Arc<Modifier>>) {
                    self.$slot = value;
                }
            )+

            /// Slots assigned explicitly, in slot order.
            pub fn modified(&self) -> Vec<&Arc<Modifier>> {
                [$(self.$slot.as_ref()),+].into_iter().flatten().collect()
            }

            /// Effective modifier of every slot, in slot order.
            pub fn effective(&self) -> Vec<Arc<Modifier>> {
                vec![$(self.$slot()),+]
            }

            fn to_dict(&self, abridged: bool, none_for_defaults: bool) -> Result<Value> {
                let mut base = Map::new();
                let tag = if abridged { concat!($tag, "Abridged") } else { $tag };
                base.insert("type".into(), Value::from(tag));
                $(
                    let slot = if none_for_defaults {
                        self.$slot.clone()
                    } else {
                        Some(self.$slot())
                    };
                    if let Some(m) = slot {
                        base.insert(stringify!($slot).into(), modifier_ref(&m, abridged)?);
                    }
                )+
                Ok(Value::Object(base))
            }

            fn from_dict(data: &Value, pool: Option<&ModifierPool>) -> Result<Self> {
                Ok(Self {
                    $($slot: load_slot(data, stringify!($slot), pool)?,)+
                })
            }
        }
    };
}

modifier_subset!(
    /// Modifiers for walls.
    WallModifierSet, "WallModifierSet" {
        exterior_modifier / set_exterior_modifier => library::generic_wall,
        interior_modifier / set_interior_modifier => library::generic_wall,
    }
);

modifier_subset!(
    FloorModifierSet, "FloorModifierSet" {
        exterior_modifier / set_exterior_modifier => library::generic_floor,
        interior_modifier / set_interior_modifier => library::generic_floor,
    }
);

modifier_subset!(
    RoofCeilingModifierSet, "RoofCeilingModifierSet" {
        exterior_modifier / set_exterior_modifier => library::generic_ceiling,
        interior_modifier / set_interior_modifier => library::generic_ceiling,
    }
);

modifier_subset!(
    /// Modifiers for apertures, split by host face and operability.
    ApertureModifierSet, "ApertureModifierSet" {
        window_modifier / set_window_modifier => library::generic_exterior_window,
        interior_modifier / set_interior_modifier => library::generic_interior_window,
        skylight_modifier / set_skylight_modifier => library::generic_exterior_window,
        operable_modifier / set_operable_modifier => library::generic_exterior_window,
    }
);

modifier_subset!(
    DoorModifierSet, "DoorModifierSet" {
        exterior_modifier / set_exterior_modifier => library::generic_door,
        interior_modifier / set_interior_modifier => library::generic_door,
        exterior_glass_modifier / set_exterior_glass_modifier => library::generic_exterior_window,
        interior_glass_modifier / set_interior_glass_modifier => library::generic_interior_window,
        overhead_modifier / set_overhead_modifier => library::generic_door,
    }
);

modifier_subset!(
    /// Modifiers for shades attached to rooms.
    ShadeModifierSet, "ShadeModifierSet" {
        exterior_modifier / set_exterior_modifier => library::generic_exterior_shade,
        interior_modifier / set_interior_modifier => library::generic_interior_shade,
    }
);

/// A bundle of modifiers assigned to a room (or a story or building, which
/// pass it down to their rooms).
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierSet {
    identifier: String,
    display_name: Option<String>,
    pub wall_set: WallModifierSet,
    pub floor_set: FloorModifierSet,
    pub roof_ceiling_set: RoofCeilingModifierSet,
    pub aperture_set: ApertureModifierSet,
    pub door_set: DoorModifierSet,
    pub shade_set: ShadeModifierSet,
    air_boundary_modifier: Option<Arc<Modifier>>,
}

impl ModifierSet {
    /// Create an empty set; every slot resolves to the generic defaults.
    pub fn new(identifier: &str) -> Result<Self> {
        let identifier = valid_rad_string(identifier, "modifier set identifier")?;
        Ok(Self::unchecked(&identifier))
    }

    pub(crate) fn unchecked(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: None,
            wall_set: WallModifierSet::default(),
            floor_set: FloorModifierSet::default(),
            roof_ceiling_set: RoofCeilingModifierSet::default(),
            aperture_set: ApertureModifierSet::default(),
            door_set: DoorModifierSet::default(),
            shade_set: ShadeModifierSet::default(),
            air_boundary_modifier: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn set_display_name(&mut self, name: Option<String>) {
        self.display_name = name;
    }

    pub fn air_boundary_modifier(&self) -> Arc<Modifier> {
        self.air_boundary_modifier
            .clone()
            .unwrap_or_else(library::air_boundary)
    }

    pub fn set_air_boundary_modifier(&mut self, value: Option<Arc<Modifier>>) {
        self.air_boundary_modifier = value;
    }

    /// Effective modifier of every slot, defaults included.
    pub fn modifiers(&self) -> Vec<Arc<Modifier>> {
        let mut all = Vec::new();
        all.extend(self.wall_set.effective());
        all.extend(self.floor_set.effective());
        all.extend(self.roof_ceiling_set.effective());
        all.extend(self.aperture_set.effective());
        all.extend(self.door_set.effective());
        all.extend(self.shade_set.effective());
        all.push(self.air_boundary_modifier());
        all
    }

    /// Value-unique list of [`Self::modifiers`].
    pub fn modifiers_unique(&self) -> Vec<Arc<Modifier>> {
        unique_values(self.modifiers())
    }

    /// Only the modifiers assigned explicitly to a slot.
    pub fn modified_modifiers(&self) -> Vec<Arc<Modifier>> {
        let mut modified: Vec<Arc<Modifier>> = Vec::new();
        let slots = self
            .wall_set
            .modified()
            .into_iter()
            .chain(self.floor_set.modified())
            .chain(self.roof_ceiling_set.modified())
            .chain(self.aperture_set.modified())
            .chain(self.door_set.modified())
            .chain(self.shade_set.modified())
            .chain(self.air_boundary_modifier.as_ref());
        for m in slots {
            push_instance(&mut modified, m);
        }
        modified
    }

    /// Value-unique list of [`Self::modified_modifiers`].
    pub fn modified_modifiers_unique(&self) -> Vec<Arc<Modifier>> {
        unique_values(self.modified_modifiers())
    }

    /// Write the set as a dictionary.
    ///
    /// `abridged` writes modifier identifiers instead of full modifiers.
    /// `none_for_defaults` leaves out slots that were never assigned;
    /// otherwise those slots are written with the generic default.
    pub fn to_dict(&self, abridged: bool, none_for_defaults: bool) -> Result<Value> {
        let mut base = Map::new();
        let tag = if abridged { "ModifierSetAbridged" } else { "ModifierSet" };
        base.insert("type".into(), Value::from(tag));
        base.insert("identifier".into(), Value::from(self.identifier.as_str()));
        if let Some(name) = &self.display_name {
            base.insert("display_name".into(), Value::from(name.as_str()));
        }
        base.insert("wall_set".into(), self.wall_set.to_dict(abridged, none_for_defaults)?);
        base.insert("floor_set".into(), self.floor_set.to_dict(abridged, none_for_defaults)?);
        base.insert(
            "roof_ceiling_set".into(),
            self.roof_ceiling_set.to_dict(abridged, none_for_defaults)?,
        );
        base.insert(
            "aperture_set".into(),
            self.aperture_set.to_dict(abridged, none_for_defaults)?,
        );
        base.insert("door_set".into(), self.door_set.to_dict(abridged, none_for_defaults)?);
        base.insert("shade_set".into(), self.shade_set.to_dict(abridged, none_for_defaults)?);
        let air = if none_for_defaults {
            self.air_boundary_modifier.clone()
        } else {
            Some(self.air_boundary_modifier())
        };
        if let Some(m) = air {
            base.insert("air_boundary_modifier".into(), modifier_ref(&m, abridged)?);
        }
        Ok(Value::Object(base))
    }

    /// Load a full `ModifierSet` dictionary.
    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "ModifierSet")?;
        Self::load(data, None)
    }

    /// Load a `ModifierSetAbridged` dictionary, resolving modifier ids in `modifiers`.
    pub fn from_dict_abridged(data: &Value, modifiers: &ModifierPool) -> Result<Self> {
        check_type(data, "ModifierSetAbridged")?;
        Self::load(data, Some(modifiers))
    }

    fn load(data: &Value, pool: Option<&ModifierPool>) -> Result<Self> {
        let identifier = required_str(data, "identifier")?;
        let mut set = Self::new(identifier)?;
        set.display_name = optional_str(data, "display_name")?.map(str::to_string);
        let empty = Value::Object(Map::new());
        let sub = |key: &str| field(data, key).unwrap_or(&empty);
        set.wall_set = WallModifierSet::from_dict(sub("wall_set"), pool)?;
        set.floor_set = FloorModifierSet::from_dict(sub("floor_set"), pool)?;
        set.roof_ceiling_set = RoofCeilingModifierSet::from_dict(sub("roof_ceiling_set"), pool)?;
        set.aperture_set = ApertureModifierSet::from_dict(sub("aperture_set"), pool)?;
        set.door_set = DoorModifierSet::from_dict(sub("door_set"), pool)?;
        set.shade_set = ShadeModifierSet::from_dict(sub("shade_set"), pool)?;
        set.air_boundary_modifier = load_slot(data, "air_boundary_modifier", pool)?;
        Ok(set)
    }
}

impl std::fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Radiance Modifier Set: {}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::{Glass, Plastic};

    fn tinted() -> ModifierSet {
        let glass = Arc::new(Glass::from_single_transmittance("tinted_glass", 0.4).unwrap());
        let mut set = ModifierSet::new("Tinted").unwrap();
        set.aperture_set.set_window_modifier(Some(Arc::clone(&glass)));
        set.aperture_set.set_skylight_modifier(Some(glass));
        set
    }

    #[test]
    fn empty_slots_fall_back_to_generics() {
        let set = tinted();
        assert_eq!(set.aperture_set.window_modifier().identifier(), "tinted_glass");
        assert_eq!(
            set.aperture_set.operable_modifier().identifier(),
            library::generic_exterior_window().identifier()
        );
        assert!(Arc::ptr_eq(&set.wall_set.exterior_modifier(), &library::generic_wall()));
    }

    #[test]
    fn modified_modifiers_dedup_shared_slots() {
        let set = tinted();
        assert_eq!(set.modified_modifiers().len(), 1);
        assert_eq!(set.modified_modifiers_unique()[0].identifier(), "tinted_glass");
    }

    #[test]
    fn value_equal_slots_collapse_only_in_unique_list() {
        let mut set = ModifierSet::new("Twins").unwrap();
        let a = Arc::new(Plastic::from_single_reflectance("paint", 0.6, 0.0, 0.0).unwrap());
        let b = Arc::new(Plastic::from_single_reflectance("paint", 0.6, 0.0, 0.0).unwrap());
        set.wall_set.set_exterior_modifier(Some(a));
        set.wall_set.set_interior_modifier(Some(b));
        assert_eq!(set.modified_modifiers().len(), 2);
        assert_eq!(set.modified_modifiers_unique().len(), 1);
    }

    #[test]
    fn abridged_dict_lists_only_assigned_slots() {
        let d = tinted().to_dict(true, true).unwrap();
        assert_eq!(d["type"], "ModifierSetAbridged");
        assert_eq!(d["aperture_set"]["type"], "ApertureModifierSetAbridged");
        assert_eq!(d["aperture_set"]["window_modifier"], "tinted_glass");
        assert!(d["aperture_set"].get("operable_modifier").is_none());
        assert!(d["wall_set"].get("exterior_modifier").is_none());
        assert!(d.get("air_boundary_modifier").is_none());
    }

    #[test]
    fn defaults_written_when_requested() {
        let d = tinted().to_dict(true, false).unwrap();
        assert_eq!(d["wall_set"]["exterior_modifier"], "generic_wall_0.50");
        assert_eq!(d["air_boundary_modifier"], "air_boundary");
    }

    #[test]
    fn full_and_abridged_round_trips() {
        let set = tinted();
        let full = set.to_dict(false, true).unwrap();
        assert_eq!(ModifierSet::from_dict(&full).unwrap(), set);

        let mut pool = ModifierPool::default();
        for m in set.modified_modifiers_unique() {
            pool.insert(m.identifier().to_string(), m);
        }
        let abridged = set.to_dict(true, true).unwrap();
        assert_eq!(ModifierSet::from_dict_abridged(&abridged, &pool).unwrap(), set);
    }

    #[test]
    fn abridged_lookup_failure_names_modifier() {
        let abridged = tinted().to_dict(true, true).unwrap();
        let err = ModifierSet::from_dict_abridged(&abridged, &ModifierPool::default()).unwrap_err();
        match err {
            Error::MissingIdentifier { identifier, .. } => assert_eq!(identifier, "tinted_glass"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn wrong_tag_is_format_error() {
        let d = tinted().to_dict(true, true).unwrap();
        assert!(matches!(ModifierSet::from_dict(&d), Err(Error::Format { .. })));
    }
}
