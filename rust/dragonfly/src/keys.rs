// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host entity key types for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay valid while other
//! entities are added or removed. Radiance property records hold the key of
//! their host instead of a reference to it.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a building.
    pub struct BuildingKey;

    /// Key for a story of a building.
    pub struct StoryKey;

    /// Key for a 2D room (a floor plate extruded to a ceiling height).
    pub struct Room2DKey;

    /// Key for a context shade.
    pub struct ContextShadeKey;
}

/// A key that can reference any host entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostKey {
    Building(BuildingKey),
    Story(StoryKey),
    Room2D(Room2DKey),
    ContextShade(ContextShadeKey),
}

impl HostKey {
    /// Name of the entity type referenced by this key.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostKey::Building(_) => "Building",
            HostKey::Story(_) => "Story",
            HostKey::Room2D(_) => "Room2D",
            HostKey::ContextShade(_) => "ContextShade",
        }
    }
}

impl From<BuildingKey> for HostKey {
    fn from(k: BuildingKey) -> Self {
        HostKey::Building(k)
    }
}

impl From<StoryKey> for HostKey {
    fn from(k: StoryKey) -> Self {
        HostKey::Story(k)
    }
}

impl From<Room2DKey> for HostKey {
    fn from(k: Room2DKey) -> Self {
        HostKey::Room2D(k)
    }
}

impl From<ContextShadeKey> for HostKey {
    fn from(k: ContextShadeKey) -> Self {
        HostKey::ContextShade(k)
    }
}
