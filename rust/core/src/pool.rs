// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model-level pools of shared modifiers and modifier sets.
//!
//! A model dictionary stores every modifier once (in full) and every
//! modifier set once (abridged). Entities refer to them by identifier.
//! Loading rebuilds the pools first so each entity can be re-attached to the
//! shared `Arc` for its identifier.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::library::{generic_context, generic_modifier_set_visible};
use crate::modifier::Modifier;
use crate::modifierset::{ModifierPool, ModifierSet, ModifierSetPool};
use crate::typing::{field, optional_array, type_tag, value_kind};

/// Dictionary of the global default modifier set as embedded in a model.
///
/// The set is written abridged with every slot filled, without an
/// identifier, followed by the full definitions of its modifiers. The
/// generic context modifier is appended because the set itself has no slot
/// for context shades.
pub fn global_modifier_set_dict() -> Result<Value> {
    let global = generic_modifier_set_visible();
    let mut gs = match global.to_dict(true, false)? {
        Value::Object(map) => map,
        other => return Err(Error::type_error("object", value_kind(&other))),
    };
    gs.insert("type".into(), Value::from("GlobalModifierSet"));
    gs.remove("identifier");

    let mut modifiers = global
        .modifiers_unique()
        .iter()
        .map(|m| m.to_dict())
        .collect::<Result<Vec<_>>>()?;
    let context = generic_context();
    modifiers.push(context.to_dict()?);
    gs.insert("modifiers".into(), Value::Array(modifiers));
    gs.insert("context_modifier".into(), Value::from(context.identifier()));
    Ok(Value::Object(gs))
}

/// Rebuild the modifier and modifier set pools from a model `radiance` block.
///
/// Modifiers of the global set are added first so that abridged sets may
/// refer to generic modifiers without repeating them.
pub fn load_properties_from_dict(radiance: &Value) -> Result<(ModifierPool, ModifierSetPool)> {
    let mut modifiers = ModifierPool::default();
    let global_mods = field(radiance, "global_modifier_set")
        .map(|gs| optional_array(gs, "modifiers"))
        .transpose()?
        .flatten();
    let model_mods = optional_array(radiance, "modifiers")?;
    for m_dict in global_mods.into_iter().chain(model_mods).flatten() {
        let m = Modifier::from_dict(m_dict)?;
        modifiers.insert(m.identifier().to_string(), Arc::new(m));
    }

    let mut modifier_sets = ModifierSetPool::default();
    for s_dict in optional_array(radiance, "modifier_sets")?.into_iter().flatten() {
        let set = if type_tag(s_dict)? == "ModifierSetAbridged" {
            ModifierSet::from_dict_abridged(s_dict, &modifiers)?
        } else {
            ModifierSet::from_dict(s_dict)?
        };
        modifier_sets.insert(set.identifier().to_string(), Arc::new(set));
    }

    tracing::debug!(
        modifiers = modifiers.len(),
        modifier_sets = modifier_sets.len(),
        "Loaded radiance pools"
    );
    Ok((modifiers, modifier_sets))
}

/// Resolve an abridged reference stored under `key`.
///
/// Absent and `null` keys give `None`; an identifier missing from `pool`
/// is an error naming the identifier.
pub fn resolve<T>(
    data: &Value,
    key: &str,
    pool: &FxHashMap<String, Arc<T>>,
    kind: &'static str,
) -> Result<Option<Arc<T>>> {
    match field(data, key) {
        None => Ok(None),
        Some(Value::String(id)) => pool
            .get(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| Error::MissingIdentifier {
                kind,
                identifier: id.clone(),
            }),
        Some(other) => Err(Error::type_error(
            format!("{} identifier", kind),
            value_kind(other),
        )),
    }
}

/// Start a `{"type": ...}` dictionary.
pub fn typed_map(tag: &str) -> Map<String, Value> {
    let mut base = Map::new();
    base.insert("type".into(), Value::from(tag));
    base
}
