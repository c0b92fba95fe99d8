// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model dictionaries keep overrides, shared objects and grid parameters.

use std::sync::Arc;

use df_radiance::gridpar::{grid_parameters_from_dicts, RoomGridParameter, RoomRadialGridParameter};
use df_radiance::{
    Building, ContextShade, Error, Model, ModelRadianceProperties, Room2D,
    Room2DRadianceProperties, Room2DKey, Story, TranslationOptions,
};
use df_radiance_core::hb::{self, BoundaryCondition};
use df_radiance_core::{Error as RadianceError, Glass, ModifierSet, Plastic};
use df_radiance_geometry::{Face3D, Point3};
use serde_json::json;

fn tinted_campus() -> Model {
    let glass = Arc::new(Glass::from_single_transmittance("tinted_glass", 0.4).unwrap());
    let mut tinted = ModifierSet::new("Tinted").unwrap();
    tinted.aperture_set.set_window_modifier(Some(glass));
    let tinted = Arc::new(tinted);

    let mut model = Model::new("Campus").unwrap();
    let mut office1 = Room2D::from_rectangle("Office1", Point3::origin(), 5.0, 4.0, 3.0).unwrap();
    office1
        .properties
        .radiance
        .add_grid_parameter(RoomGridParameter::new(0.5, 0.8, 0.0, true).unwrap().into());
    let mut office2 =
        Room2D::from_rectangle("Office2", Point3::new(5.0, 0.0, 0.0), 5.0, 4.0, 3.0).unwrap();
    office2
        .properties
        .radiance
        .set_modifier_set(Some(Arc::clone(&tinted)));
    let r1 = model.add_room_2d(office1);
    let r2 = model.add_room_2d(office2);

    let mut floor1 = Story::new("Floor1", 3.5).unwrap();
    floor1.properties.radiance.set_modifier_set(Some(tinted));
    floor1.set_multiplier(2).unwrap();
    let s = model.add_story(floor1, &[r1, r2]).unwrap();

    let mut b1 = Building::new("B1").unwrap();
    let mut lab = hb::Room::from_box("Lab", 3.0, 3.0, 3.0, Point3::new(0.0, 10.0, 0.0)).unwrap();
    lab.properties
        .radiance
        .set_modifier_set(Some(Arc::new(ModifierSet::new("Lab_Set").unwrap())));
    b1.room_3ds.push(lab);
    model.add_building(b1, &[s]).unwrap();

    let tree = Face3D::from_xy(&[(0.0, -5.0), (2.0, -5.0), (2.0, -4.0)], 0.0).unwrap();
    let mut shade = ContextShade::new("Tree", vec![tree], true).unwrap();
    let leaves = Plastic::from_single_reflectance("leaves", 0.25, 0.0, 0.0).unwrap();
    shade.properties.radiance.set_modifier(Some(Arc::new(leaves)));
    model.add_context_shade(shade);
    model
}

fn room_key(model: &Model, identifier: &str) -> Room2DKey {
    model.room_2d_by_identifier(identifier).unwrap()
}

#[test]
fn model_dict_lists_shared_objects_once() {
    let model = tinted_campus();
    let d = model.to_dict().unwrap();
    let radiance = &d["properties"]["radiance"];
    assert_eq!(d["properties"]["type"], "ModelProperties");
    assert_eq!(radiance["type"], "ModelRadianceProperties");
    assert_eq!(radiance["global_modifier_set"]["type"], "GlobalModifierSet");

    let set_ids: Vec<&str> = radiance["modifier_sets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(set_ids, vec!["Lab_Set", "Tinted"]);
    assert_eq!(radiance["modifier_sets"][1]["type"], "ModifierSetAbridged");

    let mod_ids: Vec<&str> = radiance["modifiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(mod_ids, vec!["tinted_glass", "leaves"]);

    let story = &d["buildings"][0]["unique_stories"][0];
    assert_eq!(
        story["properties"]["radiance"],
        json!({"type": "StoryRadiancePropertiesAbridged", "modifier_set": "Tinted"})
    );
    let office1 = &story["room_2ds"][0]["properties"]["radiance"];
    assert_eq!(office1["type"], "Room2DRadiancePropertiesAbridged");
    assert!(office1.get("modifier_set").is_none());
    assert_eq!(office1["grid_parameters"][0]["type"], "RoomGridParameter");
}

#[test]
fn model_dict_round_trip_is_exact() {
    let model = tinted_campus();
    let d = model.to_dict().unwrap();
    let reloaded = Model::from_dict(&d).unwrap();
    assert_eq!(reloaded.to_dict().unwrap(), d);

    let room = reloaded.room_2d(room_key(&reloaded, "Office1")).unwrap();
    assert_eq!(room.properties.radiance.modifier_set(&reloaded).identifier(), "Tinted");
    assert_eq!(room.properties.radiance.grid_parameters().len(), 1);
    let story = reloaded.story(room.parent().unwrap()).unwrap();
    assert_eq!(story.multiplier(), 2);
}

#[test]
fn reloaded_references_share_one_set() {
    let model = Model::from_dict(&tinted_campus().to_dict().unwrap()).unwrap();
    let office2 = model.room_2d(room_key(&model, "Office2")).unwrap();
    let story = model.story(office2.parent().unwrap()).unwrap();
    assert!(Arc::ptr_eq(
        office2.properties.radiance.modifier_set_override().unwrap(),
        story.properties.radiance.modifier_set_override().unwrap()
    ));
    let lab = &model.buildings().next().unwrap().room_3ds[0];
    assert_eq!(lab.modifier_set().identifier(), "Lab_Set");
}

#[test]
fn missing_radiance_block_fails_apply() {
    let mut model = tinted_campus();
    let mut d = model.to_dict().unwrap();
    d["properties"].as_object_mut().unwrap().remove("radiance");
    let err = ModelRadianceProperties::apply_properties_from_dict(&mut model, &d).unwrap_err();
    assert!(matches!(err, Error::MissingRadianceProperties));

    // loading without radiance leaves every host on the defaults
    let plain = Model::from_dict(&d).unwrap();
    assert!(plain.properties.radiance.modifier_sets(&plain).is_empty());
}

#[test]
fn unknown_set_reference_fails() {
    let mut d = tinted_campus().to_dict().unwrap();
    d["buildings"][0]["unique_stories"][0]["properties"]["radiance"]["modifier_set"] =
        json!("Nowhere");
    let err = Model::from_dict(&d).unwrap_err();
    match err {
        Error::Radiance(RadianceError::MissingIdentifier { identifier, .. }) => {
            assert_eq!(identifier, "Nowhere")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn full_record_requires_full_tag() {
    let abridged = json!({"type": "Room2DRadiancePropertiesAbridged", "modifier_set": "Tinted"});
    assert!(Room2DRadianceProperties::from_dict(&abridged, Room2DKey::default()).is_err());

    let full = json!({
        "type": "Room2DRadianceProperties",
        "grid_parameters": [{"type": "RoomRadialGridParameter", "dimension": 1.0}]
    });
    let record = Room2DRadianceProperties::from_dict(&full, Room2DKey::default()).unwrap();
    assert!(!record.is_modifier_set_by_user());
    assert_eq!(record.grid_parameters()[0].type_name(), "RoomRadialGridParameter");
}

#[test]
fn unknown_grid_parameter_is_named() {
    let err = grid_parameters_from_dicts(&[json!({"type": "BogusGrid", "dimension": 1})])
        .unwrap_err();
    assert!(matches!(&err, Error::UnknownGridParameter(tag) if tag == "BogusGrid"));
    assert!(err.to_string().contains("BogusGrid"));
}

#[test]
fn scaled_room_keeps_grid_counts() {
    let mut model = Model::new("Campus").unwrap();
    let mut room = Room2D::from_rectangle("Office1", Point3::origin(), 4.0, 3.0, 3.0).unwrap();
    let radial = RoomRadialGridParameter::new(1.0, 0.8, 0.0, 4, [0.0, -1.0, 0.0], None, true)
        .unwrap();
    room.properties.radiance.add_grid_parameter(radial.into());
    room.scale(2.0, None).unwrap();
    let gp = &room.properties.radiance.grid_parameters()[0];
    assert_eq!(gp.dimension(), 2.0);
    assert_eq!(gp.offset(), 1.6);
    assert_eq!(room.floor_to_ceiling_height(), 6.0);

    let r = model.add_room_2d(room);
    let s = model.add_story(Story::new("Floor1", 6.5).unwrap(), &[r]).unwrap();
    model.add_building(Building::new("B1").unwrap(), &[s]).unwrap();
    let hb_models = model.to_honeybee(&TranslationOptions::default()).unwrap();
    let grids = &hb_models[0].properties.radiance.sensor_grids;
    assert_eq!(grids.len(), 1);
    // 8 x 6 room at 2 m cells, four directions each
    assert_eq!(grids[0].count(), 12 * 4);
}

#[test]
fn offset_above_ceiling_adds_no_grid() {
    let mut model = Model::new("Campus").unwrap();
    let mut room = Room2D::from_rectangle("Attic", Point3::origin(), 4.0, 3.0, 1.0).unwrap();
    room.properties
        .radiance
        .add_grid_parameter(RoomGridParameter::new(0.5, 1.2, 0.0, true).unwrap().into());
    let r = model.add_room_2d(room);
    let s = model.add_story(Story::new("Floor1", 1.0).unwrap(), &[r]).unwrap();
    model.add_building(Building::new("B1").unwrap(), &[s]).unwrap();
    let hb_models = model.to_honeybee(&TranslationOptions::default()).unwrap();
    assert!(hb_models[0].properties.radiance.sensor_grids.is_empty());
    assert_eq!(hb_models[0].rooms[0].faces[0].boundary_condition, BoundaryCondition::Ground);
}
