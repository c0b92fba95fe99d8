// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar polygons with optional holes.
//!
//! A [`Face3D`] is the geometry of every surface in the building model:
//! Room2D floor plates, walls, roofs, apertures and context shades. The
//! winding order of the boundary defines the normal (right-hand rule), and
//! sensor grids are laid out in the face's local plane.

use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::mesh::Mesh3D;
use crate::points::{nested_point_list, point_list};
use crate::polygon::{distance_to_segment, point_in_contour};

/// Tolerance below which a normal component is treated as zero.
const AXIS_TOLERANCE: f64 = 1e-9;

/// A planar polygon in 3D space.
///
/// Deserialization goes through [`Face3D::with_holes`], so a loaded face is
/// never degenerate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Face3D")]
pub struct Face3D {
    /// Outer boundary, counter-clockwise when seen from the normal side
    #[serde(with = "point_list")]
    pub boundary: Vec<Point3<f64>>,
    /// Inner loops removed from the face
    #[serde(with = "nested_point_list", skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point3<f64>>>,
}

/// Wire form of [`Face3D`] before validation.
#[derive(Deserialize)]
#[serde(tag = "type", rename = "Face3D")]
struct RawFace3D {
    #[serde(with = "point_list")]
    boundary: Vec<Point3<f64>>,
    #[serde(default, with = "nested_point_list")]
    holes: Vec<Vec<Point3<f64>>>,
}

impl<'de> Deserialize<'de> for Face3D {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawFace3D::deserialize(deserializer)?;
        Face3D::with_holes(raw.boundary, raw.holes).map_err(serde::de::Error::custom)
    }
}

/// Computes a polygon normal using Newell's method.
///
/// Works for any planar polygon (convex or concave). Returns `None` for
/// degenerate loops.
pub fn newell_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    if points.len() < 3 {
        return None;
    }

    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    let n = points.len();
    for i in 0..n {
        let curr = points[i];
        let next = points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }

    let len = normal.norm();
    if len < 1e-15 {
        return None; // degenerate face
    }
    Some(normal / len)
}

fn loop_area(points: &[Point3<f64>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let p0 = points[0];
    let mut total = Vector3::new(0.0, 0.0, 0.0);
    for i in 1..points.len() - 1 {
        total += (points[i] - p0).cross(&(points[i + 1] - p0));
    }
    total.norm() / 2.0
}

impl Face3D {
    /// Create a face from its boundary vertices.
    pub fn new(boundary: Vec<Point3<f64>>) -> Result<Self> {
        Self::with_holes(boundary, Vec::new())
    }

    /// Create a face with holes.
    pub fn with_holes(boundary: Vec<Point3<f64>>, holes: Vec<Vec<Point3<f64>>>) -> Result<Self> {
        if boundary.len() < 3 {
            return Err(Error::Degenerate(format!(
                "boundary has {} vertices",
                boundary.len()
            )));
        }
        if newell_normal(&boundary).is_none() {
            return Err(Error::Degenerate("boundary has no area".into()));
        }
        if let Some((i, hole)) = holes.iter().enumerate().find(|(_, h)| h.len() < 3) {
            return Err(Error::Degenerate(format!(
                "hole {} has {} vertices",
                i,
                hole.len()
            )));
        }
        Ok(Self { boundary, holes })
    }

    /// Create a horizontal face at elevation `z` from 2D vertices.
    pub fn from_xy(vertices: &[(f64, f64)], z: f64) -> Result<Self> {
        Self::new(
            vertices
                .iter()
                .map(|&(x, y)| Point3::new(x, y, z))
                .collect(),
        )
    }

    /// Create an axis-aligned rectangle in the plane spanned by `x_axis` and `y_axis`.
    pub fn rectangle(
        origin: Point3<f64>,
        x_axis: Vector3<f64>,
        y_axis: Vector3<f64>,
        width: f64,
        height: f64,
    ) -> Result<Self> {
        let x = x_axis.normalize() * width;
        let y = y_axis.normalize() * height;
        Self::new(vec![origin, origin + x, origin + x + y, origin + y])
    }

    /// Unit normal following the boundary winding.
    pub fn normal(&self) -> Vector3<f64> {
        newell_normal(&self.boundary).unwrap_or_else(Vector3::z)
    }

    /// Area of the boundary minus the holes.
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| loop_area(h)).sum();
        (loop_area(&self.boundary) - holes).max(0.0)
    }

    /// Vertex average of the boundary.
    pub fn center(&self) -> Point3<f64> {
        let sum = self
            .boundary
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.boundary.len() as f64)
    }

    /// Component-wise minimum of the boundary.
    pub fn min(&self) -> Point3<f64> {
        self.boundary.iter().fold(
            Point3::new(f64::MAX, f64::MAX, f64::MAX),
            |m, p| Point3::new(m.x.min(p.x), m.y.min(p.y), m.z.min(p.z)),
        )
    }

    /// Component-wise maximum of the boundary.
    pub fn max(&self) -> Point3<f64> {
        self.boundary.iter().fold(
            Point3::new(f64::MIN, f64::MIN, f64::MIN),
            |m, p| Point3::new(m.x.max(p.x), m.y.max(p.y), m.z.max(p.z)),
        )
    }

    /// True when the normal points straight up or down within `tolerance`.
    pub fn is_horizontal(&self, tolerance: f64) -> bool {
        (1.0 - self.normal().z.abs()) <= tolerance
    }

    /// Reverse the winding (and so the normal) of the face.
    pub fn flip(&self) -> Face3D {
        Face3D {
            boundary: self.boundary.iter().rev().copied().collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().rev().copied().collect())
                .collect(),
        }
    }

    /// Local plane axes `(x, y)` of the face.
    ///
    /// Horizontal faces use the world X axis so grids follow the XY
    /// coordinate system of floor plates; other faces derive X from the
    /// normal so that it stays horizontal.
    pub fn plane_axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal();
        let x = if n.x.abs() < AXIS_TOLERANCE && n.y.abs() < AXIS_TOLERANCE {
            Vector3::x()
        } else {
            Vector3::new(n.y, -n.x, 0.0).normalize()
        };
        let y = n.cross(&x).normalize();
        (x, y)
    }

    fn project(&self, p: &Point3<f64>, x: &Vector3<f64>, y: &Vector3<f64>) -> Point2<f64> {
        let d = p - self.boundary[0];
        Point2::new(d.dot(x), d.dot(y))
    }

    fn projected_loops(
        &self,
        x: &Vector3<f64>,
        y: &Vector3<f64>,
    ) -> (Vec<Point2<f64>>, Vec<Vec<Point2<f64>>>) {
        let outer = self.boundary.iter().map(|p| self.project(p, x, y)).collect();
        let holes = self
            .holes
            .iter()
            .map(|h| h.iter().map(|p| self.project(p, x, y)).collect())
            .collect();
        (outer, holes)
    }

    /// Check if a point (projected into the face plane) lies inside the face
    /// and outside all holes.
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        let (x, y) = self.plane_axes();
        let (outer, holes) = self.projected_loops(&x, &y);
        let p = self.project(point, &x, &y);
        point_in_contour(&p, &outer) && !holes.iter().any(|h| point_in_contour(&p, h))
    }

    /// Shortest distance from a point to any edge of the boundary.
    pub fn distance_to_boundary(&self, point: &Point3<f64>) -> f64 {
        let n = self.boundary.len();
        (0..n)
            .map(|i| distance_to_segment(point, &self.boundary[i], &self.boundary[(i + 1) % n]))
            .fold(f64::MAX, f64::min)
    }

    /// The boundary segments of the face as `(start, end)` pairs.
    pub fn segments(&self) -> Vec<(Point3<f64>, Point3<f64>)> {
        let n = self.boundary.len();
        (0..n)
            .map(|i| (self.boundary[i], self.boundary[(i + 1) % n]))
            .collect()
    }

    /// Translate the face.
    pub fn move_by(&self, v: &Vector3<f64>) -> Face3D {
        Face3D {
            boundary: self.boundary.iter().map(|p| p + v).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(|p| p + v).collect())
                .collect(),
        }
    }

    /// Scale the face about an origin (the world origin when `None`).
    pub fn scale(&self, factor: f64, origin: Option<&Point3<f64>>) -> Face3D {
        let o = origin.copied().unwrap_or_else(Point3::origin);
        let scale_pt = |p: &Point3<f64>| o + (p - o) * factor;
        Face3D {
            boundary: self.boundary.iter().map(scale_pt).collect(),
            holes: self
                .holes
                .iter()
                .map(|h| h.iter().map(scale_pt).collect())
                .collect(),
        }
    }

    /// A copy of the face shrunk about its center so that its area is
    /// `ratio` times the original.
    pub fn sub_face_by_ratio(&self, ratio: f64) -> Face3D {
        let center = self.center();
        let mut sub = self.scale(ratio.sqrt(), Some(&center));
        sub.holes.clear();
        sub
    }

    /// A copy of this face with the boundaries of `sub_faces` cut out as holes.
    pub fn punched(&self, sub_faces: &[&Face3D]) -> Face3D {
        let mut holes = self.holes.clone();
        holes.extend(sub_faces.iter().map(|f| f.boundary.clone()));
        Face3D {
            boundary: self.boundary.clone(),
            holes,
        }
    }

    /// Generate a quad grid over the face.
    ///
    /// Cells are laid out from the minimum corner of the face's local plane;
    /// a cell is kept when its center falls inside the face. The grid is
    /// moved `offset` along the normal (the reversed normal when `flip` is
    /// set). Returns `None` when no cell center lands inside the face.
    pub fn mesh_grid(&self, x_dim: f64, y_dim: Option<f64>, offset: f64, flip: bool) -> Option<Mesh3D> {
        let y_dim = y_dim.unwrap_or(x_dim);
        if x_dim <= 0.0 || y_dim <= 0.0 {
            return None;
        }

        let (xa, ya) = self.plane_axes();
        let mut normal = self.normal();
        if flip {
            normal = -normal;
        }
        let (outer, holes) = self.projected_loops(&xa, &ya);

        let (mut u_min, mut v_min) = (f64::MAX, f64::MAX);
        let (mut u_max, mut v_max) = (f64::MIN, f64::MIN);
        for p in &outer {
            u_min = u_min.min(p.x);
            v_min = v_min.min(p.y);
            u_max = u_max.max(p.x);
            v_max = v_max.max(p.y);
        }
        let nu = ((u_max - u_min) / x_dim).ceil() as usize;
        let nv = ((v_max - v_min) / y_dim).ceil() as usize;

        let origin = self.boundary[0] + normal * offset;
        // counter-clockwise in (u, v) faces along xa × ya; reverse when the
        // grid normal points the other way
        let reverse = xa.cross(&ya).dot(&normal) < 0.0;

        let mut corner_index: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for j in 0..nv {
            for i in 0..nu {
                let center = Point2::new(
                    u_min + (i as f64 + 0.5) * x_dim,
                    v_min + (j as f64 + 0.5) * y_dim,
                );
                if !point_in_contour(&center, &outer)
                    || holes.iter().any(|h| point_in_contour(&center, h))
                {
                    continue;
                }

                let mut quad = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)]
                    .iter()
                    .map(|&(ci, cj)| {
                        *corner_index.entry((ci, cj)).or_insert_with(|| {
                            let u = u_min + ci as f64 * x_dim;
                            let v = v_min + cj as f64 * y_dim;
                            vertices.push(origin + xa * u + ya * v);
                            vertices.len() - 1
                        })
                    })
                    .collect::<Vec<usize>>();
                if reverse {
                    quad.reverse();
                }
                faces.push(quad);
            }
        }

        if faces.is_empty() {
            None
        } else {
            Some(Mesh3D { vertices, faces })
        }
    }
}
