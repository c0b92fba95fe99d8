// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The 3D room model that radiance properties are transferred onto.
//!
//! Rooms are closed volumes of planar faces. Faces host apertures and doors;
//! rooms and models host shades. Each object carries a `properties.radiance`
//! record with its modifier (or modifier set) override.

pub mod boundary;
pub mod face;
pub mod grids;
pub mod model;
pub mod properties;
pub mod room;
pub mod shade;

pub use boundary::{BoundaryCondition, FaceType};
pub use face::{Aperture, Door, Face};
pub use grids::{ExteriorApertureType, ExteriorFaceType};
pub use model::{Model, ModelRadianceProperties};
pub use properties::{
    ApertureRadianceProperties, DoorRadianceProperties, FaceRadianceProperties,
    RoomRadianceProperties, ShadeRadianceProperties,
};
pub use room::Room;
pub use shade::Shade;
