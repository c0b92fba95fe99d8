// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon mesh data structures

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::points::point_list;

/// A mesh of planar polygons (quads or triangles) sharing a vertex list.
///
/// Sensor grids use one mesh face per sensor cell, so face order is
/// significant and must match the order of the sensors derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Mesh3D")]
pub struct Mesh3D {
    /// Vertex positions
    #[serde(with = "point_list")]
    pub vertices: Vec<Point3<f64>>,
    /// Faces as lists of vertex indices (3 or 4 per face)
    pub faces: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename = "Mesh3D")]
struct RawMesh3D {
    #[serde(with = "point_list")]
    vertices: Vec<Point3<f64>>,
    faces: Vec<Vec<usize>>,
}

impl<'de> Deserialize<'de> for Mesh3D {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawMesh3D::deserialize(deserializer)?;
        Mesh3D::new(raw.vertices, raw.faces).map_err(serde::de::Error::custom)
    }
}

impl Mesh3D {
    /// Create a mesh, checking that every face references existing vertices.
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Result<Self> {
        for (i, face) in faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(Error::InvalidMesh(format!(
                    "face {} has {} vertices",
                    i,
                    face.len()
                )));
            }
            if let Some(bad) = face.iter().find(|&&idx| idx >= vertices.len()) {
                return Err(Error::InvalidMesh(format!(
                    "face {} references vertex {} of {}",
                    i,
                    bad,
                    vertices.len()
                )));
            }
        }
        Ok(Self { vertices, faces })
    }

    /// Number of faces
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if mesh has no faces
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Average of each face's vertices.
    pub fn face_centroids(&self) -> Vec<Point3<f64>> {
        self.faces
            .iter()
            .map(|face| {
                let sum = face
                    .iter()
                    .fold(Vector3::zeros(), |acc, &i| acc + self.vertices[i].coords);
                Point3::from(sum / face.len() as f64)
            })
            .collect()
    }

    /// Unit normal of each face (Newell's method).
    pub fn face_normals(&self) -> Vec<Vector3<f64>> {
        self.faces
            .iter()
            .map(|face| {
                let pts: Vec<Point3<f64>> = face.iter().map(|&i| self.vertices[i]).collect();
                crate::face::newell_normal(&pts).unwrap_or_else(Vector3::z)
            })
            .collect()
    }

    /// Area of each face.
    pub fn face_areas(&self) -> Vec<f64> {
        self.faces
            .iter()
            .map(|face| {
                let p0 = self.vertices[face[0]];
                let mut total = Vector3::zeros();
                for w in face[1..].windows(2) {
                    total += (self.vertices[w[0]] - p0).cross(&(self.vertices[w[1]] - p0));
                }
                total.norm() / 2.0
            })
            .collect()
    }

    /// Total area of all faces.
    pub fn area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    /// Keep only the faces whose flag is `true`, dropping unused vertices.
    ///
    /// Returns `None` if no face survives.
    pub fn filter_faces(&self, keep: &[bool]) -> Option<Mesh3D> {
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for (face, _) in self
            .faces
            .iter()
            .zip(keep.iter())
            .filter(|(_, flag)| **flag)
        {
            let new_face = face
                .iter()
                .map(|&i| {
                    *remap[i].get_or_insert_with(|| {
                        vertices.push(self.vertices[i]);
                        vertices.len() - 1
                    })
                })
                .collect();
            faces.push(new_face);
        }

        if faces.is_empty() {
            None
        } else {
            Some(Mesh3D { vertices, faces })
        }
    }

    /// Join several meshes into one. Returns `None` for an empty input.
    pub fn join(meshes: &[Mesh3D]) -> Option<Mesh3D> {
        if meshes.is_empty() {
            return None;
        }
        let total_verts: usize = meshes.iter().map(|m| m.vertices.len()).sum();
        let total_faces: usize = meshes.iter().map(|m| m.faces.len()).sum();
        let mut vertices = Vec::with_capacity(total_verts);
        let mut faces = Vec::with_capacity(total_faces);

        for mesh in meshes {
            let offset = vertices.len();
            vertices.extend_from_slice(&mesh.vertices);
            faces.extend(
                mesh.faces
                    .iter()
                    .map(|f| f.iter().map(|&i| i + offset).collect::<Vec<_>>()),
            );
        }
        Some(Mesh3D { vertices, faces })
    }

    /// Translate every vertex.
    pub fn move_by(&self, v: &Vector3<f64>) -> Mesh3D {
        Mesh3D {
            vertices: self.vertices.iter().map(|p| p + v).collect(),
            faces: self.faces.clone(),
        }
    }

    /// Scale every vertex about an origin (the world origin when `None`).
    pub fn scale(&self, factor: f64, origin: Option<&Point3<f64>>) -> Mesh3D {
        let o = origin.copied().unwrap_or_else(Point3::origin);
        Mesh3D {
            vertices: self
                .vertices
                .iter()
                .map(|p| o + (p - o) * factor)
                .collect(),
            faces: self.faces.clone(),
        }
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.vertices.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);
        for p in &self.vertices {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        (min, max)
    }
}
