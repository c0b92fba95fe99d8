// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face types and boundary conditions.

use serde::{Deserialize, Serialize};

/// The role of a face in its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceType {
    Wall,
    Floor,
    RoofCeiling,
    AirBoundary,
}

/// What lies on the other side of a face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryCondition {
    #[default]
    Outdoors,
    Ground,
    Adiabatic,
    /// Adjacent to another face; objects are listed from the adjacent face outward.
    Surface {
        boundary_condition_objects: Vec<String>,
    },
}

impl BoundaryCondition {
    /// Exterior slots of a modifier set apply to outdoor and ground faces.
    pub fn is_exterior(&self) -> bool {
        matches!(self, BoundaryCondition::Outdoors | BoundaryCondition::Ground)
    }
}
