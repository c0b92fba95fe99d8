// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for host models and their radiance properties.

use crate::keys::HostKey;

/// Result type alias for host model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, loading or translating a host model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced host entity is not in the model arena.
    #[error("host entity not found: {0:?}")]
    NotFound(HostKey),

    /// A grid parameter dictionary carries an unknown `type` tag.
    #[error("GridParameter \"{0}\" is not recognized.")]
    UnknownGridParameter(String),

    /// A model dictionary has no radiance properties to apply.
    #[error("Dictionary possesses no ModelRadianceProperties.")]
    MissingRadianceProperties,

    /// A per-segment list does not match the number of floor segments.
    #[error("{name} has {got} items but the floor has {expected} segments")]
    SegmentCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// Radiance objects, dictionaries and validation.
    #[error(transparent)]
    Radiance(#[from] df_radiance_core::Error),

    #[error(transparent)]
    Geometry(#[from] df_radiance_geometry::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
