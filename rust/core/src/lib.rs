// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DF-Radiance Core
//!
//! Radiance modifiers, modifier sets and sensor grids, plus the 3D room
//! model ([`hb`]) they are assigned to.
//!
//! ## Overview
//!
//! - **Modifiers**: value objects describing a radiance material
//!   ([`Modifier`]).
//! - **Modifier sets**: one modifier per face type and boundary condition
//!   ([`ModifierSet`]), with generic defaults for unassigned slots
//!   ([`library`]).
//! - **Sharing**: modifiers and sets are shared behind `Arc`. Collection walks
//!   deduplicate by identity first and by value last ([`dedup`]).
//! - **Dictionaries**: every object round-trips through `serde_json::Value`.
//!   Abridged dictionaries reference shared objects by identifier and are
//!   re-attached through model pools ([`pool`]).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use df_radiance_core::{hb::Room, ModifierSet, Plastic};
//!
//! let mut set = ModifierSet::new("Bright")?;
//! let paint = Plastic::from_single_reflectance("paint", 0.7, 0.0, 0.0)?;
//! set.wall_set.set_interior_modifier(Some(Arc::new(paint)));
//!
//! let mut room = Room::from_box("Office", 5.0, 4.0, 3.0, Point3::origin())?;
//! room.properties.radiance.set_modifier_set(Some(Arc::new(set)));
//! let grid = room.generate_sensor_grid(0.5, 0.8, 0.0);
//! ```

pub mod checkdup;
pub mod dedup;
pub mod error;
pub mod hb;
pub mod library;
pub mod modifier;
pub mod modifierset;
pub mod pool;
pub mod sensorgrid;
pub mod typing;

pub use checkdup::{check_duplicate_identifiers, Identified};
pub use error::{Error, Result};
pub use modifier::{Glass, Metal, Mirror, Modifier, Plastic, Trans};
pub use modifierset::{
    ApertureModifierSet, DoorModifierSet, FloorModifierSet, ModifierPool, ModifierSet,
    ModifierSetPool, RoofCeilingModifierSet, ShadeModifierSet, WallModifierSet,
};
pub use sensorgrid::{Sensor, SensorGrid};
