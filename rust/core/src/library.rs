// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generic default modifiers and the global default modifier set.
//!
//! Each default is created once per process and handed out as a clone of
//! the same `Arc`, so callers may test for "is this the default" with
//! `Arc::ptr_eq`.

use std::sync::{Arc, OnceLock};

use crate::modifier::{Glass, Modifier, Plastic};
use crate::modifierset::ModifierSet;

/// Identifier of the global default modifier set.
pub const GENERIC_MODIFIER_SET_IDENTIFIER: &str = "Generic_Interior_Visible_Modifier_Set";

fn plastic(identifier: &str, reflectance: f64) -> Modifier {
    Modifier::Plastic(Plastic {
        identifier: identifier.to_string(),
        display_name: None,
        r_reflectance: reflectance,
        g_reflectance: reflectance,
        b_reflectance: reflectance,
        specularity: 0.0,
        roughness: 0.0,
    })
}

fn glass(identifier: &str, transmittance: f64) -> Modifier {
    let t = Glass::transmissivity_from_transmittance(transmittance);
    Modifier::Glass(Glass {
        identifier: identifier.to_string(),
        display_name: None,
        r_transmissivity: t,
        g_transmissivity: t,
        b_transmissivity: t,
        refraction_index: None,
    })
}

macro_rules! shared_modifier {
    ($(#[$meta:meta])* $name:ident => $build:expr) => {
        $(#[$meta])*
        pub fn $name() -> Arc<Modifier> {
            static CELL: OnceLock<Arc<Modifier>> = OnceLock::new();
            Arc::clone(CELL.get_or_init(|| Arc::new($build)))
        }
    };
}

shared_modifier!(
    /// Opaque wall, 50% reflectance.
    generic_wall => plastic("generic_wall_0.50", 0.5)
);
shared_modifier!(
    /// Floor, 20% reflectance.
    generic_floor => plastic("generic_floor_0.20", 0.2)
);
shared_modifier!(
    /// Ceiling and roof, 80% reflectance.
    generic_ceiling => plastic("generic_ceiling_0.80", 0.8)
);
shared_modifier!(generic_door => plastic("generic_opaque_door_0.50", 0.5));
shared_modifier!(
    /// Exterior glazing, 64% visible transmittance.
    generic_exterior_window => glass("generic_exterior_window_vis_0.64", 0.64)
);
shared_modifier!(
    /// Interior glazing, 88% visible transmittance.
    generic_interior_window => glass("generic_interior_window_vis_0.88", 0.88)
);
shared_modifier!(generic_exterior_shade => plastic("generic_exterior_shade_0.35", 0.35));
shared_modifier!(generic_interior_shade => plastic("generic_interior_shade_0.50", 0.5));
shared_modifier!(
    /// Surrounding context (neighbouring buildings, terrain), 20% reflectance.
    generic_context => plastic("generic_context_0.20", 0.2)
);
shared_modifier!(
    /// Fully transparent boundary between rooms.
    air_boundary => glass("air_boundary", 1.0)
);

/// The global default modifier set.
///
/// It assigns no slot explicitly, so every slot resolves to the generic
/// modifiers above. Used whenever no override exists anywhere up a host's
/// parent chain.
pub fn generic_modifier_set_visible() -> Arc<ModifierSet> {
    static CELL: OnceLock<Arc<ModifierSet>> = OnceLock::new();
    Arc::clone(CELL.get_or_init(|| {
        Arc::new(ModifierSet::unchecked(GENERIC_MODIFIER_SET_IDENTIFIER))
    }))
}

/// True when `set` is the global default instance.
pub fn is_generic_modifier_set(set: &Arc<ModifierSet>) -> bool {
    Arc::ptr_eq(set, &generic_modifier_set_visible())
}
