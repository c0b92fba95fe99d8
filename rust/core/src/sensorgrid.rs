// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sensor grids: ordered lists of measurement positions and directions.

use df_radiance_geometry::{Mesh3D, Vector3};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Result;
use crate::typing::{check_type, valid_rad_string};

/// A single sensor: a position and the direction it looks in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub pos: [f64; 3],
    pub dir: [f64; 3],
}

impl Sensor {
    pub fn new(pos: [f64; 3], dir: [f64; 3]) -> Self {
        Self { pos, dir }
    }
}

/// A named grid of sensors, optionally carrying the mesh it was built from.
///
/// When a mesh is present each mesh face corresponds to one sensor, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "SensorGrid")]
pub struct SensorGrid {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub sensors: Vec<Sensor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<Mesh3D>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_identifier: Option<String>,
}

impl SensorGrid {
    pub fn new(identifier: &str, sensors: Vec<Sensor>) -> Result<Self> {
        Ok(Self {
            identifier: valid_rad_string(identifier, "sensor grid identifier")?,
            display_name: None,
            sensors,
            mesh: None,
            room_identifier: None,
        })
    }

    /// One sensor per mesh face, at the face centroid looking along its normal.
    pub fn from_mesh3d(identifier: &str, mesh: Mesh3D) -> Result<Self> {
        let identifier = valid_rad_string(identifier, "sensor grid identifier")?;
        Ok(Self::from_mesh_checked(identifier, mesh))
    }

    /// Build from a mesh when the identifier is already known to be valid.
    pub(crate) fn from_mesh_checked(identifier: String, mesh: Mesh3D) -> Self {
        let sensors = mesh
            .face_centroids()
            .iter()
            .zip(mesh.face_normals())
            .map(|(c, n)| Sensor::new([c.x, c.y, c.z], [n.x, n.y, n.z]))
            .collect();
        Self {
            identifier,
            display_name: None,
            sensors,
            mesh: Some(mesh),
            room_identifier: None,
        }
    }

    /// Number of sensors.
    pub fn count(&self) -> usize {
        self.sensors.len()
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    /// Translate every sensor (and the mesh).
    pub fn move_by(&mut self, v: &Vector3<f64>) {
        for s in &mut self.sensors {
            s.pos = [s.pos[0] + v.x, s.pos[1] + v.y, s.pos[2] + v.z];
        }
        self.mesh = self.mesh.as_ref().map(|m| m.move_by(v));
    }

    /// Short summary written next to exported grids.
    pub fn info_dict(&self) -> Value {
        json!({
            "name": self.display_name(),
            "identifier": self.identifier,
            "count": self.count(),
        })
    }

    pub fn to_dict(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_dict(data: &Value) -> Result<Self> {
        check_type(data, "SensorGrid")?;
        Ok(serde_json::from_value(data.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use df_radiance_geometry::Face3D;

    fn grid() -> SensorGrid {
        let floor = Face3D::from_xy(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)], 0.0).unwrap();
        let mesh = floor.mesh_grid(1.0, None, 0.8, false).unwrap();
        SensorGrid::from_mesh3d("Office", mesh).unwrap()
    }

    #[test]
    fn sensors_follow_mesh_faces() {
        let g = grid();
        assert_eq!(g.count(), 2);
        assert_relative_eq!(g.sensors[0].pos[0], 0.5);
        assert_relative_eq!(g.sensors[0].pos[2], 0.8, epsilon = 1e-12);
        assert_relative_eq!(g.sensors[1].dir[2], 1.0);
    }

    #[test]
    fn dict_round_trip_and_info() {
        let mut g = grid();
        g.room_identifier = Some("Office".into());
        let d = g.to_dict().unwrap();
        assert_eq!(d["type"], "SensorGrid");
        assert_eq!(d["mesh"]["type"], "Mesh3D");
        assert_eq!(SensorGrid::from_dict(&d).unwrap(), g);
        assert_eq!(g.info_dict()["count"], 2);
    }

    #[test]
    fn move_shifts_sensors_and_mesh() {
        let mut g = grid();
        g.move_by(&Vector3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(g.sensors[0].pos[2], 1.8, epsilon = 1e-12);
        let (min, _) = g.mesh.as_ref().unwrap().bounds();
        assert_relative_eq!(min.z, 1.8, epsilon = 1e-12);
    }
}
