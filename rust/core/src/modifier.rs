// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance modifiers (materials).
//!
//! A [`Modifier`] describes how a surface reflects or transmits light. It is
//! shared between many surfaces through `Arc<Modifier>` and is never mutated
//! once shared. Dictionaries use the lowercase radiance primitive name as the
//! `type` tag (`plastic`, `glass`, ...).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::typing::{float_in_range, type_tag, valid_rad_string};

/// Primitive type names accepted in modifier dictionaries.
pub const MODIFIER_TYPES: &[&str] = &["plastic", "metal", "glass", "trans", "mirror"];

/// Opaque diffuse/specular material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plastic {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub r_reflectance: f64,
    pub g_reflectance: f64,
    pub b_reflectance: f64,
    #[serde(default)]
    pub specularity: f64,
    #[serde(default)]
    pub roughness: f64,
}

/// Metallic material; same parameters as [`Plastic`] but tinted highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metal {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub r_reflectance: f64,
    pub g_reflectance: f64,
    pub b_reflectance: f64,
    #[serde(default = "Metal::default_specularity")]
    pub specularity: f64,
    #[serde(default)]
    pub roughness: f64,
}

/// Thin glazing described by its transmissivity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glass {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub r_transmissivity: f64,
    pub g_transmissivity: f64,
    pub b_transmissivity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refraction_index: Option<f64>,
}

/// Translucent material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trans {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub r_reflectance: f64,
    pub g_reflectance: f64,
    pub b_reflectance: f64,
    #[serde(default)]
    pub specularity: f64,
    #[serde(default)]
    pub roughness: f64,
    #[serde(default)]
    pub transmitted_diff: f64,
    #[serde(default)]
    pub transmitted_spec: f64,
}

/// Perfect specular reflector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mirror {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub r_reflectance: f64,
    pub g_reflectance: f64,
    pub b_reflectance: f64,
}

/// A radiance modifier.
///
/// Equality compares values: two modifiers loaded from the same dictionary
/// are equal even though they are different instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modifier {
    Plastic(Plastic),
    Metal(Metal),
    Glass(Glass),
    Trans(Trans),
    Mirror(Mirror),
}

fn check_reflectance(values: [f64; 3], name: &str) -> Result<()> {
    for v in values {
        float_in_range(v, 0.0, 1.0, name)?;
    }
    Ok(())
}

impl Plastic {
    /// Grey plastic with equal reflectance in every channel.
    pub fn from_single_reflectance(
        identifier: &str,
        reflectance: f64,
        specularity: f64,
        roughness: f64,
    ) -> Result<Modifier> {
        let identifier = valid_rad_string(identifier, "plastic identifier")?;
        check_reflectance([reflectance; 3], "plastic reflectance")?;
        float_in_range(specularity, 0.0, 1.0, "plastic specularity")?;
        float_in_range(roughness, 0.0, 1.0, "plastic roughness")?;
        Ok(Modifier::Plastic(Plastic {
            identifier,
            display_name: None,
            r_reflectance: reflectance,
            g_reflectance: reflectance,
            b_reflectance: reflectance,
            specularity,
            roughness,
        }))
    }

    /// Average reflectance across the three channels.
    pub fn average_reflectance(&self) -> f64 {
        (self.r_reflectance + self.g_reflectance + self.b_reflectance) / 3.0
    }
}

impl Metal {
    fn default_specularity() -> f64 {
        0.9
    }

    pub fn from_single_reflectance(
        identifier: &str,
        reflectance: f64,
        specularity: f64,
        roughness: f64,
    ) -> Result<Modifier> {
        let identifier = valid_rad_string(identifier, "metal identifier")?;
        check_reflectance([reflectance; 3], "metal reflectance")?;
        float_in_range(specularity, 0.0, 1.0, "metal specularity")?;
        float_in_range(roughness, 0.0, 1.0, "metal roughness")?;
        Ok(Modifier::Metal(Metal {
            identifier,
            display_name: None,
            r_reflectance: reflectance,
            g_reflectance: reflectance,
            b_reflectance: reflectance,
            specularity,
            roughness,
        }))
    }
}

impl Glass {
    /// Convert a normal-incidence transmittance to radiance transmissivity.
    pub fn transmissivity_from_transmittance(transmittance: f64) -> f64 {
        if transmittance <= 0.0 {
            return 0.0;
        }
        ((0.8402528435 + 0.0072522239 * transmittance.powi(2)).sqrt() - 0.9166530661)
            / 0.0036261119
            / transmittance
    }

    /// Neutral glass from a single visible transmittance.
    pub fn from_single_transmittance(identifier: &str, transmittance: f64) -> Result<Modifier> {
        let identifier = valid_rad_string(identifier, "glass identifier")?;
        float_in_range(transmittance, 0.0, 1.0, "glass transmittance")?;
        let t = Self::transmissivity_from_transmittance(transmittance);
        Ok(Modifier::Glass(Glass {
            identifier,
            display_name: None,
            r_transmissivity: t,
            g_transmissivity: t,
            b_transmissivity: t,
            refraction_index: None,
        }))
    }
}

impl Trans {
    /// Grey translucent material.
    pub fn from_single_reflectance(
        identifier: &str,
        reflectance: f64,
        transmitted_diff: f64,
        transmitted_spec: f64,
    ) -> Result<Modifier> {
        let identifier = valid_rad_string(identifier, "trans identifier")?;
        check_reflectance([reflectance; 3], "trans reflectance")?;
        float_in_range(transmitted_diff, 0.0, 1.0, "trans transmitted_diff")?;
        float_in_range(transmitted_spec, 0.0, 1.0, "trans transmitted_spec")?;
        Ok(Modifier::Trans(Trans {
            identifier,
            display_name: None,
            r_reflectance: reflectance,
            g_reflectance: reflectance,
            b_reflectance: reflectance,
            specularity: 0.0,
            roughness: 0.0,
            transmitted_diff,
            transmitted_spec,
        }))
    }
}

impl Mirror {
    pub fn from_single_reflectance(identifier: &str, reflectance: f64) -> Result<Modifier> {
        let identifier = valid_rad_string(identifier, "mirror identifier")?;
        check_reflectance([reflectance; 3], "mirror reflectance")?;
        Ok(Modifier::Mirror(Mirror {
            identifier,
            display_name: None,
            r_reflectance: reflectance,
            g_reflectance: reflectance,
            b_reflectance: reflectance,
        }))
    }
}

impl Modifier {
    pub fn identifier(&self) -> &str {
        match self {
            Modifier::Plastic(m) => &m.identifier,
            Modifier::Metal(m) => &m.identifier,
            Modifier::Glass(m) => &m.identifier,
            Modifier::Trans(m) => &m.identifier,
            Modifier::Mirror(m) => &m.identifier,
        }
    }

    /// Display name, falling back to the identifier.
    pub fn display_name(&self) -> &str {
        let name = match self {
            Modifier::Plastic(m) => m.display_name.as_deref(),
            Modifier::Metal(m) => m.display_name.as_deref(),
            Modifier::Glass(m) => m.display_name.as_deref(),
            Modifier::Trans(m) => m.display_name.as_deref(),
            Modifier::Mirror(m) => m.display_name.as_deref(),
        };
        name.unwrap_or_else(|| self.identifier())
    }

    /// Radiance primitive name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Modifier::Plastic(_) => "plastic",
            Modifier::Metal(_) => "metal",
            Modifier::Glass(_) => "glass",
            Modifier::Trans(_) => "trans",
            Modifier::Mirror(_) => "mirror",
        }
    }

    /// Whether light passes through the material.
    pub fn is_transmissive(&self) -> bool {
        matches!(self, Modifier::Glass(_) | Modifier::Trans(_))
    }

    /// Parse a full modifier dictionary.
    pub fn from_dict(data: &Value) -> Result<Self> {
        let tag = type_tag(data)?;
        if !MODIFIER_TYPES.contains(&tag) {
            return Err(Error::format(
                format!("Modifier of type {}", MODIFIER_TYPES.join(", ")),
                tag,
            ));
        }
        Ok(serde_json::from_value(data.clone())?)
    }

    pub fn to_dict(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.type_name(), self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn plastic_dict_round_trip() {
        let m = Plastic::from_single_reflectance("wall_0.6", 0.6, 0.0, 0.0).unwrap();
        let d = m.to_dict().unwrap();
        assert_eq!(d["type"], "plastic");
        assert_eq!(d["identifier"], "wall_0.6");
        assert!(d.get("display_name").is_none());
        assert_eq!(Modifier::from_dict(&d).unwrap(), m);
    }

    #[test]
    fn equality_is_by_value() {
        let a = Glass::from_single_transmittance("clear", 0.6).unwrap();
        let b = Glass::from_single_transmittance("clear", 0.6).unwrap();
        let c = Glass::from_single_transmittance("clear", 0.5).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn transmissivity_conversion() {
        let t = Glass::transmissivity_from_transmittance(0.6);
        assert_relative_eq!(t, 0.654, epsilon = 1e-3);
        assert_eq!(Glass::transmissivity_from_transmittance(0.0), 0.0);
    }

    #[test]
    fn rejects_bad_inputs() {
        assert!(Plastic::from_single_reflectance("bad id", 0.5, 0.0, 0.0).is_err());
        assert!(Mirror::from_single_reflectance("mirror", 1.5).is_err());
        let err = Modifier::from_dict(&json!({"type": "BSDF", "identifier": "x"})).unwrap_err();
        assert!(matches!(err, Error::Format { .. }));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let m = Modifier::from_dict(&json!({
            "type": "metal",
            "identifier": "steel",
            "r_reflectance": 0.5,
            "g_reflectance": 0.5,
            "b_reflectance": 0.5
        }))
        .unwrap();
        match m {
            Modifier::Metal(metal) => assert_relative_eq!(metal.specularity, 0.9),
            other => panic!("unexpected {:?}", other),
        }
    }
}
