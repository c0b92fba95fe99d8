// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for radiance objects and their dictionaries.

use thiserror::Error;

/// Result type alias for radiance operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, validating or (de)serializing radiance objects.
#[derive(Error, Debug)]
pub enum Error {
    /// A dictionary field holds the wrong kind of value.
    #[error("Expected {expected}. Got {got}.")]
    Type { expected: String, got: String },

    /// A dictionary `type` discriminator does not match the expected object.
    #[error("Expected {expected}. Got {got}.")]
    Format { expected: String, got: String },

    /// An abridged reference names an object missing from the lookup pool.
    #[error("{kind} \"{identifier}\" was not found")]
    MissingIdentifier { kind: &'static str, identifier: String },

    /// Several objects share one identifier.
    #[error("{0}")]
    DuplicateIdentifiers(String),

    /// A numeric or categorical input is out of range.
    #[error("Invalid {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    /// A required dictionary key is absent.
    #[error("Dictionary is missing required key \"{0}\"")]
    MissingKey(&'static str),

    #[error(transparent)]
    Geometry(#[from] df_radiance_geometry::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::Format {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn type_error(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::Type {
            expected: expected.into(),
            got: got.into(),
        }
    }
}
