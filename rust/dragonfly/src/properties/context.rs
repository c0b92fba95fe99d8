// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Radiance properties of a context shade.

use std::sync::Arc;

use df_radiance_core::hb::ShadeRadianceProperties;
use df_radiance_core::library::generic_context;
use df_radiance_core::pool::resolve;
use df_radiance_core::typing::{as_object, check_type, field};
use df_radiance_core::{Modifier, ModifierPool};
use serde_json::Value;

use super::{radiance_entry, record_map};
use crate::error::Result;
use crate::keys::ContextShadeKey;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextShadeRadianceProperties {
    host: ContextShadeKey,
    modifier: Option<Arc<Modifier>>,
}

impl ContextShadeRadianceProperties {
    pub fn new(host: ContextShadeKey, modifier: Option<Arc<Modifier>>) -> Self {
        Self { host, modifier }
    }

    pub fn host(&self) -> ContextShadeKey {
        self.host
    }

    pub(crate) fn set_host(&mut self, host: ContextShadeKey) {
        self.host = host;
    }

    /// The assigned modifier, or the generic context modifier.
    pub fn modifier(&self) -> Arc<Modifier> {
        self.modifier.clone().unwrap_or_else(generic_context)
    }

    pub fn modifier_override(&self) -> Option<&Arc<Modifier>> {
        self.modifier.as_ref()
    }

    pub fn set_modifier(&mut self, value: Option<Arc<Modifier>>) {
        self.modifier = value;
    }

    pub fn is_modifier_set_by_user(&self) -> bool {
        self.modifier.is_some()
    }

    pub fn to_dict(&self, abridged: bool) -> Result<Value> {
        let mut base = record_map("ContextShadeRadianceProperties", abridged);
        if let Some(m) = &self.modifier {
            let value = if abridged {
                Value::from(m.identifier())
            } else {
                m.to_dict()?
            };
            base.insert("modifier".into(), value);
        }
        Ok(radiance_entry(base))
    }

    pub fn from_dict(data: &Value, host: ContextShadeKey) -> Result<Self> {
        check_type(data, "ContextShadeRadianceProperties")?;
        let modifier = match field(data, "modifier") {
            Some(d) => {
                as_object(d, "Modifier")?;
                Some(Arc::new(Modifier::from_dict(d)?))
            }
            None => None,
        };
        Ok(Self::new(host, modifier))
    }

    pub fn apply_properties_from_dict(
        &mut self,
        abridged_data: &Value,
        modifiers: &ModifierPool,
    ) -> Result<()> {
        if let Some(m) = resolve(abridged_data, "modifier", modifiers, "Modifier")? {
            self.modifier = Some(m);
        }
        Ok(())
    }

    pub fn duplicate(&self, new_host: Option<ContextShadeKey>) -> Self {
        Self::new(new_host.unwrap_or(self.host), self.modifier.clone())
    }

    /// Properties of the 3D shades made from this context shade.
    pub fn to_honeybee(&self) -> ShadeRadianceProperties {
        ShadeRadianceProperties::new(self.modifier.clone())
    }

    pub fn from_honeybee(hb_properties: &ShadeRadianceProperties) -> Self {
        Self::new(
            ContextShadeKey::default(),
            hb_properties.modifier_override().cloned(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_radiance_core::modifier::Plastic;
    use rustc_hash::FxHashMap;
    use serde_json::json;

    fn leaves() -> Arc<Modifier> {
        Arc::new(Plastic::from_single_reflectance("leaves", 0.3, 0.0, 0.0).unwrap())
    }

    #[test]
    fn unassigned_modifier_is_generic_context() {
        let props = ContextShadeRadianceProperties::default();
        assert!(!props.is_modifier_set_by_user());
        assert!(Arc::ptr_eq(&props.modifier(), &generic_context()));
        let d = props.to_dict(true).unwrap();
        assert_eq!(d["radiance"]["type"], "ContextShadeRadiancePropertiesAbridged");
        assert!(d["radiance"].get("modifier").is_none());
    }

    #[test]
    fn full_dict_round_trip() {
        let props = ContextShadeRadianceProperties::new(ContextShadeKey::default(), Some(leaves()));
        assert_eq!(props.to_dict(true).unwrap()["radiance"]["modifier"], "leaves");

        let full = props.to_dict(false).unwrap();
        let back =
            ContextShadeRadianceProperties::from_dict(&full["radiance"], ContextShadeKey::default())
                .unwrap();
        assert_eq!(back.modifier().identifier(), "leaves");
        assert_eq!(*back.modifier(), *props.modifier());

        let abridged = props.to_dict(true).unwrap();
        assert!(ContextShadeRadianceProperties::from_dict(
            &abridged["radiance"],
            ContextShadeKey::default()
        )
        .is_err());
    }

    #[test]
    fn apply_shares_the_pooled_modifier() {
        let modifier = leaves();
        let mut pool = FxHashMap::default();
        pool.insert("leaves".to_string(), Arc::clone(&modifier));

        let mut props = ContextShadeRadianceProperties::default();
        props
            .apply_properties_from_dict(&json!({"modifier": "leaves"}), &pool)
            .unwrap();
        assert!(Arc::ptr_eq(&props.modifier(), &modifier));
        assert!(Arc::ptr_eq(
            props.to_honeybee().modifier_override().unwrap(),
            &modifier
        ));

        let err = props
            .apply_properties_from_dict(&json!({"modifier": "bark"}), &pool)
            .unwrap_err();
        assert!(err.to_string().contains("bark"));
    }
}
