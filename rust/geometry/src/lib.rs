// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DF-Radiance Geometry
//!
//! Planar polygons and grid meshes used to lay out radiance sensor grids.
//! Faces are stored as `nalgebra` points; grids are generated in the local
//! plane of each face and offset along its normal.

pub mod error;
pub mod face;
pub mod mesh;
pub mod polygon;
mod points;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use face::Face3D;
pub use mesh::Mesh3D;
pub use polygon::{distance_to_segment, point_in_contour};
