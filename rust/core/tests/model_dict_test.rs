// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model dictionaries: shared objects survive a reload as shared objects.

use std::sync::Arc;

use df_radiance_core::hb::{Aperture, Model, Room, Shade};
use df_radiance_core::{library, Glass, ModifierSet, Plastic};
use df_radiance_geometry::{Face3D, Point3};

fn tinted_model() -> Model {
    let glass = Arc::new(Glass::from_single_transmittance("tinted_glass", 0.4).unwrap());
    let mut tinted = ModifierSet::new("Tinted").unwrap();
    tinted.aperture_set.set_window_modifier(Some(Arc::clone(&glass)));
    let tinted = Arc::new(tinted);

    let mut model = Model::new("Two_Offices").unwrap();
    for (i, x) in [0.0, 5.0].into_iter().enumerate() {
        let mut room =
            Room::from_box(&format!("Office{}", i + 1), 5.0, 4.0, 3.0, Point3::new(x, 0.0, 0.0))
                .unwrap();
        room.properties
            .radiance
            .set_modifier_set(Some(Arc::clone(&tinted)));
        let window = room.faces[1].geometry.sub_face_by_ratio(0.4);
        room.faces[1]
            .apertures
            .push(Aperture::new(&format!("Office{}_Glz", i + 1), window, false).unwrap());
        model.rooms.push(room);
    }

    let tree = Face3D::from_xy(&[(0.0, -5.0), (2.0, -5.0), (2.0, -4.0)], 0.0).unwrap();
    let mut shade = Shade::new("Tree", tree, true).unwrap();
    let leaves = Plastic::from_single_reflectance("leaves", 0.25, 0.0, 0.0).unwrap();
    shade.properties.radiance.set_modifier(Some(Arc::new(leaves)));
    model.orphaned_shades.push(shade);
    model
}

#[test]
fn model_dict_lists_sets_abridged_and_modifiers_full() {
    let model = tinted_model();
    let d = model.to_dict().unwrap();
    let radiance = &d["properties"]["radiance"];
    assert_eq!(radiance["type"], "ModelRadianceProperties");
    assert_eq!(radiance["global_modifier_set"]["type"], "GlobalModifierSet");

    let sets = radiance["modifier_sets"].as_array().unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["type"], "ModifierSetAbridged");
    assert_eq!(sets[0]["aperture_set"]["window_modifier"], "tinted_glass");

    let ids: Vec<&str> = radiance["modifiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["tinted_glass", "leaves"]);

    let room = &d["rooms"][0];
    assert_eq!(room["properties"]["radiance"]["modifier_set"], "Tinted");
}

#[test]
fn reload_shares_one_set_between_rooms() {
    let model = tinted_model();
    let d = model.to_dict().unwrap();
    let loaded = Model::from_dict(&d).unwrap();

    let a = loaded.rooms[0].properties.radiance.modifier_set();
    let b = loaded.rooms[1].properties.radiance.modifier_set();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.identifier(), "Tinted");
    // unassigned slots still resolve to the generic library
    assert!(Arc::ptr_eq(&a.wall_set.exterior_modifier(), &library::generic_wall()));

    assert_eq!(loaded.to_dict().unwrap(), d);
}

#[test]
fn reload_through_json_text() {
    let model = tinted_model();
    let text = serde_json::to_string(&model.to_dict().unwrap()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let loaded = Model::from_dict(&value).unwrap();
    assert_eq!(loaded.rooms.len(), 2);
    assert_eq!(
        loaded.properties.radiance.modifiers(&loaded).len(),
        model.properties.radiance.modifiers(&model).len()
    );
}

#[test]
fn rooms_without_overrides_use_global_set() {
    let mut model = Model::new("Bare").unwrap();
    model
        .rooms
        .push(Room::from_box("Plain", 3.0, 3.0, 3.0, Point3::origin()).unwrap());
    let d = model.to_dict().unwrap();
    assert!(d["properties"]["radiance"]["modifier_sets"]
        .as_array()
        .unwrap()
        .is_empty());
    let loaded = Model::from_dict(&d).unwrap();
    assert!(library::is_generic_modifier_set(
        &loaded.rooms[0].properties.radiance.modifier_set()
    ));
}
