// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serde helpers writing points as `[x, y, z]` arrays.

use nalgebra::Point3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub(crate) mod point_list {
    use super::*;

    pub fn serialize<S: Serializer>(points: &[Point3<f64>], s: S) -> Result<S::Ok, S::Error> {
        let arrays: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        arrays.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Point3<f64>>, D::Error> {
        let arrays = Vec::<[f64; 3]>::deserialize(d)?;
        Ok(arrays.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect())
    }
}

pub(crate) mod nested_point_list {
    use super::*;

    pub fn serialize<S: Serializer>(loops: &[Vec<Point3<f64>>], s: S) -> Result<S::Ok, S::Error> {
        let arrays: Vec<Vec<[f64; 3]>> = loops
            .iter()
            .map(|pts| pts.iter().map(|p| [p.x, p.y, p.z]).collect())
            .collect();
        arrays.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Vec<Vec<Point3<f64>>>, D::Error> {
        let arrays = Vec::<Vec<[f64; 3]>>::deserialize(d)?;
        Ok(arrays
            .into_iter()
            .map(|pts| pts.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect())
            .collect())
    }
}
