// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor grid generation from 3D rooms.
//!
//! Every generator returns `None` when the room has nothing to grid.

use std::fmt;
use std::str::FromStr;

use df_radiance_geometry::{distance_to_segment, Face3D, Mesh3D, Point3, Vector3};

use super::boundary::{BoundaryCondition, FaceType};
use super::face::Face;
use super::room::Room;
use crate::error::{Error, Result};
use crate::sensorgrid::{Sensor, SensorGrid};

/// Which outdoor faces an exterior face grid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExteriorFaceType {
    #[default]
    Wall,
    Roof,
    Floor,
    All,
}

impl ExteriorFaceType {
    pub const ALL: [ExteriorFaceType; 4] = [Self::Wall, Self::Roof, Self::Floor, Self::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wall => "Wall",
            Self::Roof => "Roof",
            Self::Floor => "Floor",
            Self::All => "All",
        }
    }

    fn matches(&self, face_type: FaceType) -> bool {
        match self {
            Self::Wall => face_type == FaceType::Wall,
            Self::Roof => face_type == FaceType::RoofCeiling,
            Self::Floor => face_type == FaceType::Floor,
            Self::All => face_type != FaceType::AirBoundary,
        }
    }
}

/// Which outdoor apertures an exterior aperture grid covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExteriorApertureType {
    Window,
    Skylight,
    #[default]
    All,
}

impl ExteriorApertureType {
    pub const ALL: [ExteriorApertureType; 3] = [Self::Window, Self::Skylight, Self::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Window => "Window",
            Self::Skylight => "Skylight",
            Self::All => "All",
        }
    }

    fn matches(&self, face_type: FaceType) -> bool {
        match self {
            Self::Window => face_type == FaceType::Wall,
            Self::Skylight => face_type == FaceType::RoofCeiling,
            Self::All => true,
        }
    }
}

/// Case-insensitive lookup of a categorical value, reporting the choices on failure.
fn parse_choice<T: Copy>(
    value: &str,
    choices: &[T],
    as_str: fn(&T) -> &'static str,
    name: &str,
) -> Result<T> {
    let clean = value.trim().to_lowercase();
    choices
        .iter()
        .find(|c| as_str(c).to_lowercase() == clean)
        .copied()
        .ok_or_else(|| Error::InvalidValue {
            name: name.to_string(),
            reason: format!(
                "\"{}\" is not recognized.\nChoose from the following:\n{}",
                value,
                choices.iter().map(as_str).collect::<Vec<_>>().join(", ")
            ),
        })
}

impl FromStr for ExteriorFaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(s, &Self::ALL, Self::as_str, "ExteriorFaceGrid face_type")
    }
}

impl FromStr for ExteriorApertureType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_choice(s, &Self::ALL, Self::as_str, "ExteriorApertureGrid aperture_type")
    }
}

impl fmt::Display for ExteriorFaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ExteriorApertureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance from a point to the nearest edge of any loop of a face.
fn distance_to_edges(face: &Face3D, point: &Point3<f64>) -> f64 {
    std::iter::once(&face.boundary)
        .chain(face.holes.iter())
        .flat_map(|pts| {
            let n = pts.len();
            (0..n).map(move |i| distance_to_segment(point, &pts[i], &pts[(i + 1) % n]))
        })
        .fold(f64::MAX, f64::min)
}

/// Rotate a vector counter-clockwise about the Z axis.
fn rotate_z(v: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    let (sin, cos) = angle.sin_cos();
    Vector3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

fn is_outdoor(face: &Face) -> bool {
    matches!(face.boundary_condition, BoundaryCondition::Outdoors)
}

impl Room {
    /// Floor meshes of the room, facing up and offset above the floor.
    fn floor_mesh(&self, dimension: f64, offset: f64, wall_offset: f64) -> Option<Mesh3D> {
        let up = Vector3::z();
        let meshes: Vec<Mesh3D> = self
            .floor_faces()
            .filter_map(|f| {
                let mesh = f.geometry.mesh_grid(dimension, None, offset, true)?;
                if wall_offset <= dimension / 2.0 {
                    return Some(mesh);
                }
                let keep: Vec<bool> = mesh
                    .face_centroids()
                    .iter()
                    .map(|c| distance_to_edges(&f.geometry, &(c - up * offset)) >= wall_offset)
                    .collect();
                mesh.filter_faces(&keep)
            })
            .collect();
        Mesh3D::join(&meshes)
    }

    fn grid_from_mesh(&self, suffix: &str, mesh: Mesh3D) -> SensorGrid {
        let mut grid = SensorGrid::from_mesh_checked(format!("{}{}", self.identifier, suffix), mesh);
        grid.display_name = self.display_name.clone();
        grid.room_identifier = Some(self.identifier.clone());
        grid
    }

    /// A grid over the floors of the room with sensors looking up.
    ///
    /// Cells whose centers are closer than `wall_offset` to the floor edges are
    /// removed when `wall_offset` is larger than half a cell.
    pub fn generate_sensor_grid(
        &self,
        dimension: f64,
        offset: f64,
        wall_offset: f64,
    ) -> Option<SensorGrid> {
        let mesh = self.floor_mesh(dimension, offset, wall_offset)?;
        Some(self.grid_from_mesh("", mesh))
    }

    /// A floor grid where each position carries `dir_count` horizontal sensors
    /// rotated counter-clockwise from `start_vector`.
    ///
    /// The mesh holds one wedge per sensor of radius `mesh_radius`
    /// (`0.45 * dimension` when `None`); a radius of zero drops the mesh.
    pub fn generate_sensor_grid_radial(
        &self,
        dimension: f64,
        offset: f64,
        wall_offset: f64,
        dir_count: u32,
        start_vector: Vector3<f64>,
        mesh_radius: Option<f64>,
    ) -> Option<SensorGrid> {
        if dir_count == 0 {
            return None;
        }
        let start = Vector3::new(start_vector.x, start_vector.y, 0.0).try_normalize(1e-12)?;
        let base = self.floor_mesh(dimension, offset, wall_offset)?;
        let step = std::f64::consts::TAU / dir_count as f64;
        let dirs: Vec<Vector3<f64>> = (0..dir_count)
            .map(|i| rotate_z(&start, step * i as f64))
            .collect();
        let radius = mesh_radius.unwrap_or(dimension * 0.45);

        let mut sensors = Vec::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        for pos in base.face_centroids() {
            for dir in &dirs {
                sensors.push(Sensor::new([pos.x, pos.y, pos.z], [dir.x, dir.y, dir.z]));
                if radius > 0.0 {
                    let i = vertices.len();
                    vertices.push(pos);
                    vertices.push(pos + rotate_z(dir, -step / 2.0) * radius);
                    vertices.push(pos + rotate_z(dir, step / 2.0) * radius);
                    faces.push(vec![i, i + 1, i + 2]);
                }
            }
        }
        let mesh = if faces.is_empty() {
            None
        } else {
            Mesh3D::new(vertices, faces).ok()
        };
        Some(SensorGrid {
            identifier: format!("{}_Radial", self.identifier),
            display_name: self.display_name.clone(),
            sensors,
            mesh,
            room_identifier: Some(self.identifier.clone()),
        })
    }

    /// A grid over the outdoor faces of the given type, offset outward.
    pub fn generate_exterior_face_sensor_grid(
        &self,
        dimension: f64,
        offset: f64,
        face_type: ExteriorFaceType,
        punched_geometry: bool,
    ) -> Option<SensorGrid> {
        let meshes: Vec<Mesh3D> = self
            .faces
            .iter()
            .filter(|f| is_outdoor(f) && face_type.matches(f.face_type))
            .filter_map(|f| {
                let geo = if punched_geometry {
                    f.punched_geometry()
                } else {
                    f.geometry.clone()
                };
                geo.mesh_grid(dimension, None, offset, false)
            })
            .collect();
        let mesh = Mesh3D::join(&meshes)?;
        Some(self.grid_from_mesh("_Exterior_Face", mesh))
    }

    /// A grid over the apertures of outdoor faces, offset outward.
    pub fn generate_exterior_aperture_sensor_grid(
        &self,
        dimension: f64,
        offset: f64,
        aperture_type: ExteriorApertureType,
    ) -> Option<SensorGrid> {
        let meshes: Vec<Mesh3D> = self
            .faces
            .iter()
            .filter(|f| is_outdoor(f) && aperture_type.matches(f.face_type))
            .flat_map(|f| f.apertures.iter())
            .filter_map(|ap| ap.geometry.mesh_grid(dimension, None, offset, false))
            .collect();
        let mesh = Mesh3D::join(&meshes)?;
        Some(self.grid_from_mesh("_Exterior_Aperture", mesh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hb::face::Aperture;
    use approx::assert_relative_eq;

    fn office() -> Room {
        Room::from_box("Office", 4.0, 3.0, 3.0, Point3::origin()).unwrap()
    }

    #[test]
    fn parse_face_and_aperture_types() {
        assert_eq!("roof".parse::<ExteriorFaceType>().unwrap(), ExteriorFaceType::Roof);
        assert_eq!(" ALL ".parse::<ExteriorApertureType>().unwrap(), ExteriorApertureType::All);
        let err = "Ceiling".parse::<ExteriorFaceType>().unwrap_err().to_string();
        assert!(err.contains("\"Ceiling\" is not recognized"));
        assert!(err.contains("Wall, Roof, Floor, All"));
    }

    #[test]
    fn floor_grid_looks_up() {
        let grid = office().generate_sensor_grid(1.0, 0.8, 0.0).unwrap();
        assert_eq!(grid.count(), 12);
        assert_eq!(grid.identifier, "Office");
        assert_eq!(grid.room_identifier.as_deref(), Some("Office"));
        for s in &grid.sensors {
            assert_relative_eq!(s.pos[2], 0.8, epsilon = 1e-9);
            assert_relative_eq!(s.dir[2], 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn wall_offset_removes_edge_cells() {
        let room = office();
        // half a cell or less keeps everything
        assert_eq!(room.generate_sensor_grid(1.0, 0.8, 0.5).unwrap().count(), 12);
        // a 4 x 3 grid keeps only the 2 x 1 interior cells
        assert_eq!(room.generate_sensor_grid(1.0, 0.8, 1.0).unwrap().count(), 2);
        assert!(room.generate_sensor_grid(1.0, 0.8, 2.0).is_none());
    }

    #[test]
    fn radial_grid_fans_out() {
        let grid = office()
            .generate_sensor_grid_radial(1.0, 1.2, 0.0, 4, Vector3::new(0.0, -1.0, 0.0), None)
            .unwrap();
        assert_eq!(grid.identifier, "Office_Radial");
        assert_eq!(grid.count(), 48);
        assert_eq!(grid.mesh.as_ref().unwrap().face_count(), 48);
        assert_relative_eq!(grid.sensors[0].dir[1], -1.0, epsilon = 1e-12);
        assert_relative_eq!(grid.sensors[1].dir[0], 1.0, epsilon = 1e-12);

        let no_mesh = office()
            .generate_sensor_grid_radial(1.0, 1.2, 0.0, 8, Vector3::new(0.0, -1.0, 0.0), Some(0.0))
            .unwrap();
        assert!(no_mesh.mesh.is_none());
        assert_eq!(no_mesh.count(), 96);
    }

    #[test]
    fn exterior_faces_by_type() {
        let room = office();
        let walls = room
            .generate_exterior_face_sensor_grid(1.0, 0.1, ExteriorFaceType::Wall, false)
            .unwrap();
        // two 4 x 3 walls and two 3 x 3 walls
        assert_eq!(walls.count(), 42);
        let roof = room
            .generate_exterior_face_sensor_grid(1.0, 0.1, ExteriorFaceType::Roof, false)
            .unwrap();
        assert_eq!(roof.count(), 12);
        assert_relative_eq!(roof.sensors[0].pos[2], 3.1, epsilon = 1e-9);
        // the floor touches the ground
        assert!(room
            .generate_exterior_face_sensor_grid(1.0, 0.1, ExteriorFaceType::Floor, false)
            .is_none());
    }

    #[test]
    fn exterior_apertures() {
        let mut room = office();
        assert!(room
            .generate_exterior_aperture_sensor_grid(0.5, 0.1, ExteriorApertureType::All)
            .is_none());
        let window = room.faces[1].geometry.sub_face_by_ratio(0.25);
        room.faces[1]
            .apertures
            .push(Aperture::new("Office_Glz", window, false).unwrap());
        let grid = room
            .generate_exterior_aperture_sensor_grid(0.5, 0.1, ExteriorApertureType::Window)
            .unwrap();
        assert_eq!(grid.identifier, "Office_Exterior_Aperture");
        assert_eq!(grid.count(), 12);
        assert!(room
            .generate_exterior_aperture_sensor_grid(0.5, 0.1, ExteriorApertureType::Skylight)
            .is_none());
    }
}
