// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grid layout over non-rectangular floor plates.

use approx::assert_relative_eq;
use df_radiance_geometry::{Face3D, Mesh3D, Point3, Vector3};

/// L-shaped plate: 10x10 with the upper-right 5x5 quadrant removed.
fn l_shape() -> Face3D {
    Face3D::from_xy(
        &[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (5.0, 5.0),
            (5.0, 10.0),
            (0.0, 10.0),
        ],
        0.0,
    )
    .unwrap()
}

#[test]
fn l_shape_grid_skips_notch() {
    let face = l_shape();
    assert_relative_eq!(face.area(), 75.0);

    let mesh = face.mesh_grid(1.0, None, 0.75, false).unwrap();
    assert_eq!(mesh.face_count(), 75);
    assert_relative_eq!(mesh.area(), 75.0, epsilon = 1e-9);
    for c in mesh.face_centroids() {
        assert!(!(c.x > 5.0 && c.y > 5.0), "cell in notch at {:?}", c);
        assert_relative_eq!(c.z, 0.75);
    }
}

#[test]
fn grid_filtering_by_wall_distance() {
    let face = l_shape();
    let mesh = face.mesh_grid(1.0, None, 0.0, false).unwrap();
    let keep: Vec<bool> = mesh
        .face_centroids()
        .iter()
        .map(|c| face.distance_to_boundary(c) >= 1.0)
        .collect();
    let inner = mesh.filter_faces(&keep).unwrap();
    assert!(inner.face_count() < mesh.face_count());
    for c in inner.face_centroids() {
        assert!(face.distance_to_boundary(&c) >= 1.0);
    }
}

#[test]
fn scaled_and_moved_faces_keep_shape() {
    let face = l_shape();
    let scaled = face.scale(2.0, None);
    assert_relative_eq!(scaled.area(), 300.0, epsilon = 1e-9);

    let moved = face.move_by(&Vector3::new(0.0, 0.0, 3.0));
    assert_relative_eq!(moved.min().z, 3.0);
    assert!(moved.contains_point(&Point3::new(1.0, 1.0, 3.0)));
    assert!(!moved.contains_point(&Point3::new(8.0, 8.0, 3.0)));
}

#[test]
fn joined_grids_keep_face_order() {
    let a = l_shape().mesh_grid(5.0, None, 0.0, false).unwrap();
    let b = l_shape()
        .move_by(&Vector3::new(20.0, 0.0, 0.0))
        .mesh_grid(5.0, None, 0.0, false)
        .unwrap();
    let joined = Mesh3D::join(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(joined.face_count(), a.face_count() + b.face_count());
    let centroids = joined.face_centroids();
    assert!(centroids[0].x < 10.0);
    assert!(centroids[joined.face_count() - 1].x > 20.0);
}
