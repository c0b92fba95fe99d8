// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # DF-Radiance
//!
//! Radiance properties for 2D building models: buildings made of stories,
//! stories made of 2D rooms (floor plates extruded to a ceiling height),
//! and context shades around them.
//!
//! ## Overview
//!
//! - **Arena model**: [`Model`] owns every entity in a `slotmap` and links
//!   them by key ([`keys`]). Parents are looked up through the model, so
//!   moving a room to another story is visible to every query right away.
//! - **Modifier set chain**: a 2D room without its own set uses its story's,
//!   a story uses its building's, and a building falls back to the generic
//!   default set.
//! - **Grid parameters**: 2D rooms carry [`GridParameter`]s that turn into
//!   sensor grids once the model is translated to 3D ([`translate`]).
//! - **Dictionaries**: the model round-trips through abridged dictionaries
//!   whose radiance blocks reference shared sets and modifiers by
//!   identifier.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use df_radiance::{Model, Room2D, Story, Building, TranslationOptions};
//! use df_radiance::gridpar::RoomGridParameter;
//!
//! let mut model = Model::new("Campus")?;
//! let mut room = Room2D::from_rectangle("Office1", Point3::origin(), 4.0, 3.0, 3.0)?;
//! room.properties.radiance.add_grid_parameter(RoomGridParameter::new(0.5, 0.8, 0.0, true)?.into());
//! let r = model.add_room_2d(room);
//! let s = model.add_story(Story::new("Floor1", 3.5)?, &[r])?;
//! model.add_building(Building::new("Office")?, &[s])?;
//!
//! let hb_models = model.to_honeybee(&TranslationOptions::default())?;
//! ```

pub mod building;
pub mod context;
pub mod error;
pub mod gridpar;
pub mod keys;
pub mod model;
pub mod properties;
pub mod room2d;
pub mod story;
pub mod translate;

pub use building::{Building, BuildingProperties};
pub use context::{ContextShade, ContextShadeProperties};
pub use error::{Error, Result};
pub use gridpar::{
    ExteriorApertureGridParameter, ExteriorFaceGridParameter, GridParameter,
    RoomGridParameter, RoomRadialGridParameter,
};
pub use keys::{BuildingKey, ContextShadeKey, HostKey, Room2DKey, StoryKey};
pub use model::{Model, ModelProperties, DEFAULT_TOLERANCE};
pub use properties::{
    BuildingRadianceProperties, ContextShadeRadianceProperties, ModelRadianceProperties,
    Room2DRadianceProperties, StoryRadianceProperties,
};
pub use room2d::{Room2D, Room2DProperties, SkylightParameter, WindowParameter};
pub use story::{Story, StoryProperties};
pub use translate::{ObjectPerModel, TranslationOptions};
