// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation between the host model and 3D room models.
//!
//! 2D rooms are extruded into closed rooms whose walls follow the floor
//! segments. Window and skylight parameters become apertures, context
//! shades become orphaned shades, and the radiance records are converted
//! to their 3D counterparts. Sensor grids are generated last, from the
//! grid parameters of each 2D room against its 3D room.

use std::str::FromStr;

use df_radiance_core::hb::{self, Aperture, BoundaryCondition, FaceType};
use df_radiance_geometry::{Face3D, Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::building::Building;
use crate::context::ContextShade;
use crate::error::Result;
use crate::model::Model;
use crate::properties::{ContextShadeRadianceProperties, Room2DRadianceProperties};
use crate::room2d::{Room2D, SkylightParameter, WindowParameter};
use crate::story::Story;

/// How buildings are distributed over the translated models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectPerModel {
    /// One 3D model per building.
    Building,
    /// A single 3D model with every building.
    #[default]
    District,
}

impl FromStr for ObjectPerModel {
    type Err = df_radiance_core::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "building" => Ok(ObjectPerModel::Building),
            "district" => Ok(ObjectPerModel::District),
            _ => Err(df_radiance_core::Error::InvalidValue {
                name: "object_per_model".into(),
                reason: format!(
                    "\"{}\" is not recognized.\nChoose from the following:\nBuilding, District",
                    s
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationOptions {
    pub object_per_model: ObjectPerModel,
    /// Keep story multipliers on the rooms instead of repeating the rooms.
    pub use_multiplier: bool,
    /// Geometric tolerance; the model tolerance when `None`.
    pub tolerance: Option<f64>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            object_per_model: ObjectPerModel::District,
            use_multiplier: true,
            tolerance: None,
        }
    }
}

fn has_vertex(face: &Face3D, point: &Point3<f64>, tolerance: f64) -> bool {
    face.boundary.iter().any(|p| (p - point).norm() <= tolerance)
}

/// Geometry of a window on a wall made by extruding the segment `a -> b`.
fn window_geometry(
    wp: &WindowParameter,
    wall: &Face3D,
    wall_height: f64,
    tolerance: f64,
) -> Result<Option<Face3D>> {
    match *wp {
        WindowParameter::SimpleWindowRatio { window_ratio } => {
            if window_ratio <= 0.0 {
                return Ok(None);
            }
            Ok(Some(wall.sub_face_by_ratio(window_ratio)))
        }
        WindowParameter::SingleWindow {
            width,
            height,
            sill_height,
        } => {
            let (a, b) = (wall.boundary[0], wall.boundary[1]);
            let length = (b - a).norm();
            let w = width.min(length - 2.0 * tolerance);
            let h = height.min(wall_height - sill_height - tolerance);
            if w <= tolerance || h <= tolerance {
                return Ok(None);
            }
            let dir = (b - a) / length;
            let origin = a + dir * ((length - w) / 2.0) + Vector3::z() * sill_height;
            Ok(Some(Face3D::rectangle(origin, dir, Vector3::z(), w, h)?))
        }
    }
}

impl Room2D {
    /// The closed 3D room of this 2D room.
    pub fn to_honeybee(&self, model: &Model, tolerance: f64) -> Result<hb::Room> {
        self.extrude(model, &self.identifier, 0.0, tolerance)
    }

    /// Extrude the floor plate lifted by `lift`, naming the room `identifier`.
    fn extrude(&self, model: &Model, identifier: &str, lift: f64, tolerance: f64) -> Result<hb::Room> {
        let floor = self.floor_geometry().move_by(&Vector3::new(0.0, 0.0, lift));
        let height = self.floor_to_ceiling_height();
        let mut room = hb::Room::from_floor_extrusion(identifier, &floor, height)?;
        room.display_name = self.display_name.clone();

        let last = room.faces.len() - 1;
        for (face, (bc, wp)) in room.faces[1..last].iter_mut().zip(
            self.boundary_conditions()
                .iter()
                .zip(self.window_parameters()),
        ) {
            face.boundary_condition = bc.clone();
            if *bc != BoundaryCondition::Outdoors {
                continue;
            }
            if let Some(wp) = wp {
                if let Some(geo) = window_geometry(wp, &face.geometry, height, tolerance)? {
                    let id = format!("{}_Glz0", face.identifier);
                    face.apertures.push(Aperture::new(&id, geo, false)?);
                }
            }
        }

        room.faces[0].boundary_condition = if self.is_ground_contact {
            BoundaryCondition::Ground
        } else {
            BoundaryCondition::Adiabatic
        };
        let roof = &mut room.faces[last];
        if self.is_top_exposed {
            if let Some(SkylightParameter::GriddedSkylightRatio { skylight_ratio }) =
                self.skylight_parameters
            {
                if skylight_ratio > 0.0 {
                    let geo = roof.geometry.sub_face_by_ratio(skylight_ratio);
                    let id = format!("{}_Glz0", roof.identifier);
                    roof.apertures.push(Aperture::new(&id, geo, false)?);
                }
            }
        } else {
            roof.boundary_condition = BoundaryCondition::Adiabatic;
        }

        room.properties.radiance = self.properties.radiance.to_honeybee(model);
        Ok(room)
    }

    /// A 2D room from the first horizontal floor of a 3D room.
    ///
    /// Walls are matched to floor segments by their end points; glazing is
    /// kept as window and skylight ratios. Returns `None` for rooms without a
    /// horizontal floor.
    pub fn from_honeybee(room: &hb::Room, tolerance: f64) -> Result<Option<Self>> {
        let Some(floor) = room
            .floor_faces()
            .find(|f| f.geometry.is_horizontal(tolerance))
        else {
            return Ok(None);
        };
        let mut r2d = Room2D::new(
            &room.identifier,
            floor.geometry.flip(),
            room.floor_to_ceiling_height(),
        )?;
        r2d.display_name = room.display_name.clone();
        r2d.is_ground_contact = floor.boundary_condition == BoundaryCondition::Ground;

        let mut bcs = Vec::new();
        let mut wps = Vec::new();
        for (a, b) in r2d.floor_segments() {
            let wall = room.faces.iter().find(|f| {
                f.face_type == FaceType::Wall
                    && has_vertex(&f.geometry, &a, tolerance)
                    && has_vertex(&f.geometry, &b, tolerance)
            });
            match wall {
                Some(w) => {
                    bcs.push(w.boundary_condition.clone());
                    wps.push(glazing_ratio(w).map(|window_ratio| {
                        WindowParameter::SimpleWindowRatio { window_ratio }
                    }));
                }
                None => {
                    bcs.push(BoundaryCondition::Outdoors);
                    wps.push(None);
                }
            }
        }
        r2d.set_boundary_conditions(bcs)?;
        r2d.set_window_parameters(wps)?;

        let roofs: Vec<&hb::Face> = room
            .faces
            .iter()
            .filter(|f| f.face_type == FaceType::RoofCeiling)
            .collect();
        r2d.is_top_exposed = roofs
            .iter()
            .any(|f| f.boundary_condition == BoundaryCondition::Outdoors);
        r2d.skylight_parameters = roofs
            .iter()
            .find_map(|f| glazing_ratio(f))
            .map(|skylight_ratio| SkylightParameter::GriddedSkylightRatio { skylight_ratio });

        r2d.properties.radiance = Room2DRadianceProperties::from_honeybee(&room.properties.radiance);
        Ok(Some(r2d))
    }
}

/// Share of a face covered by apertures, if it has any.
fn glazing_ratio(face: &hb::Face) -> Option<f64> {
    let glazed: f64 = face.apertures.iter().map(|ap| ap.geometry.area()).sum();
    let area = face.geometry.area();
    (glazed > 0.0 && area > 0.0).then(|| (glazed / area).min(1.0))
}

impl Building {
    /// 3D rooms of every story followed by the building's own 3D rooms.
    ///
    /// Without multipliers each story is repeated `multiplier` times, one
    /// `floor_to_floor_height` apart; copies get a `_<n>` suffix.
    pub fn to_honeybee(&self, model: &Model, use_multiplier: bool, tolerance: f64) -> Result<Vec<hb::Room>> {
        let mut rooms = Vec::new();
        for &story_key in self.unique_stories() {
            let story = model.story(story_key)?;
            let copies = if use_multiplier { 1 } else { story.multiplier() };
            for i in 0..copies {
                let lift = story.floor_to_floor_height() * f64::from(i);
                for &room_key in story.room_2ds() {
                    let r2d = model.room_2d(room_key)?;
                    let (room_id, story_id) = if i == 0 {
                        (r2d.identifier.clone(), story.identifier.clone())
                    } else {
                        (
                            format!("{}_{}", r2d.identifier, i),
                            format!("{}_{}", story.identifier, i),
                        )
                    };
                    let mut room = r2d.extrude(model, &room_id, lift, tolerance)?;
                    room.story = Some(story_id);
                    if use_multiplier {
                        room.multiplier = story.multiplier();
                    }
                    rooms.push(room);
                }
            }
        }
        rooms.extend(self.room_3ds.iter().cloned());
        Ok(rooms)
    }
}

impl ContextShade {
    /// One 3D shade per face, named `<identifier>_<index>`.
    pub fn to_honeybee(&self) -> Result<Vec<hb::Shade>> {
        self.geometry
            .iter()
            .enumerate()
            .map(|(i, geo)| -> Result<hb::Shade> {
                let mut shade =
                    hb::Shade::new(&format!("{}_{}", self.identifier, i), geo.clone(), self.is_detached)?;
                shade.display_name = self.display_name.clone();
                shade.properties.radiance = self.properties.radiance.to_honeybee();
                Ok(shade)
            })
            .collect()
    }
}

impl Model {
    /// Translate the model into 3D room models with sensor grids.
    pub fn to_honeybee(&self, options: &TranslationOptions) -> Result<Vec<hb::Model>> {
        let tolerance = options.tolerance.unwrap_or(self.tolerance);
        let detached = self.detached_identifiers();
        if !detached.is_empty() {
            tracing::warn!(dropped = ?detached, "Entities outside buildings are not translated");
        }
        let mut shades = Vec::new();
        for context in self.context_shades() {
            shades.extend(context.to_honeybee()?);
        }

        let mut models = Vec::new();
        match options.object_per_model {
            ObjectPerModel::District => {
                let mut hb_model = hb::Model::new(&self.identifier)?;
                hb_model.display_name = self.display_name.clone();
                for building in self.buildings() {
                    hb_model
                        .rooms
                        .extend(building.to_honeybee(self, options.use_multiplier, tolerance)?);
                }
                models.push(hb_model);
            }
            ObjectPerModel::Building => {
                for building in self.buildings() {
                    let mut hb_model = hb::Model::new(&building.identifier)?;
                    hb_model.display_name = building.display_name.clone();
                    hb_model.rooms = building.to_honeybee(self, options.use_multiplier, tolerance)?;
                    models.push(hb_model);
                }
            }
        }

        for hb_model in &mut models {
            hb_model.tolerance = tolerance;
            hb_model.orphaned_shades = shades.clone();
            let radiance = self.properties.radiance.to_honeybee(self, hb_model);
            hb_model.properties.radiance = radiance;
        }
        tracing::debug!(
            models = models.len(),
            rooms = models.iter().map(|m| m.rooms.len()).sum::<usize>(),
            "Translated model to 3D"
        );
        Ok(models)
    }

    /// A single-building model of 2D rooms made from a 3D model.
    ///
    /// Rooms are grouped into stories by their `story` field, or by floor
    /// elevation when it is missing. Orphaned shades become context shades.
    pub fn from_honeybee(hb_model: &hb::Model) -> Result<Self> {
        let mut model = Model::new(&hb_model.identifier)?;
        model.display_name = hb_model.display_name.clone();
        model.tolerance = hb_model.tolerance;

        let mut story_index: FxHashMap<String, usize> = FxHashMap::default();
        let mut groups: Vec<(String, Vec<Room2D>, u32)> = Vec::new();
        for room in &hb_model.rooms {
            let Some(r2d) = Room2D::from_honeybee(room, model.tolerance)? else {
                tracing::warn!(room = %room.identifier, "Room has no horizontal floor; skipped");
                continue;
            };
            let story_id = room
                .story
                .clone()
                .unwrap_or_else(|| format!("Story_{:.2}", r2d.floor_height()));
            let i = *story_index.entry(story_id.clone()).or_insert_with(|| {
                groups.push((story_id, Vec::new(), room.multiplier));
                groups.len() - 1
            });
            groups[i].1.push(r2d);
        }

        let mut stories = Vec::with_capacity(groups.len());
        for (story_id, rooms, multiplier) in groups {
            let height = rooms
                .iter()
                .map(Room2D::floor_to_ceiling_height)
                .fold(0.0, f64::max);
            let mut story = Story::new(&story_id, height)?;
            story.set_multiplier(multiplier.max(1))?;
            let keys: Vec<_> = rooms.into_iter().map(|r| model.add_room_2d(r)).collect();
            stories.push(model.add_story(story, &keys)?);
        }
        let building = Building::new(&format!("{}_Building", hb_model.identifier))?;
        model.add_building(building, &stories)?;

        for shade in &hb_model.orphaned_shades {
            let mut context =
                ContextShade::new(&shade.identifier, vec![shade.geometry.clone()], shade.is_detached)?;
            context.display_name = shade.display_name.clone();
            context.properties.radiance =
                ContextShadeRadianceProperties::from_honeybee(&shade.properties.radiance);
            model.add_context_shade(context);
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use approx::assert_relative_eq;
    use df_radiance_core::library::is_generic_modifier_set;
    use df_radiance_core::{ModifierSet, Plastic};

    use crate::gridpar::RoomGridParameter;

    fn office_model(multiplier: u32) -> (Model, crate::keys::Room2DKey) {
        let mut model = Model::new("Campus").unwrap();
        let mut room =
            Room2D::from_rectangle("Office1", Point3::origin(), 4.0, 3.0, 3.0).unwrap();
        room.set_window_parameters(vec![
            Some(WindowParameter::SimpleWindowRatio { window_ratio: 0.4 }),
            None,
            Some(WindowParameter::SingleWindow {
                width: 2.0,
                height: 1.5,
                sill_height: 0.8,
            }),
            None,
        ])
        .unwrap();
        room.set_boundary_conditions(vec![
            BoundaryCondition::Outdoors,
            BoundaryCondition::Outdoors,
            BoundaryCondition::Adiabatic,
            BoundaryCondition::Outdoors,
        ])
        .unwrap();
        let r = model.add_room_2d(room);
        let mut story = Story::new("Floor1", 3.5).unwrap();
        story.set_multiplier(multiplier).unwrap();
        let s = model.add_story(story, &[r]).unwrap();
        model.add_building(Building::new("B1").unwrap(), &[s]).unwrap();
        (model, r)
    }

    #[test]
    fn extrusion_places_windows_on_outdoor_walls() {
        let (model, r) = office_model(1);
        let room = model.room_2d(r).unwrap().to_honeybee(&model, 0.01).unwrap();
        assert_eq!(room.faces.len(), 6);
        assert_eq!(room.faces[0].boundary_condition, BoundaryCondition::Ground);
        assert_eq!(room.faces[1].apertures.len(), 1);
        assert_relative_eq!(
            room.faces[1].apertures[0].geometry.area(),
            0.4 * room.faces[1].geometry.area(),
            epsilon = 1e-9
        );
        // single window on an adiabatic wall is dropped
        assert_eq!(room.faces[3].boundary_condition, BoundaryCondition::Adiabatic);
        assert!(room.faces[3].apertures.is_empty());
        assert_eq!(room.faces[5].boundary_condition, BoundaryCondition::Outdoors);
        assert!(is_generic_modifier_set(&room.modifier_set()));
    }

    #[test]
    fn single_window_is_centered() {
        let wall = Face3D::rectangle(Point3::origin(), Vector3::x(), Vector3::z(), 4.0, 3.0)
            .unwrap();
        let wp = WindowParameter::SingleWindow {
            width: 2.0,
            height: 1.5,
            sill_height: 0.8,
        };
        let geo = window_geometry(&wp, &wall, 3.0, 0.01).unwrap().unwrap();
        assert_relative_eq!(geo.area(), 3.0, epsilon = 1e-9);
        assert_relative_eq!(geo.min().x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(geo.min().z, 0.8, epsilon = 1e-9);
        assert_relative_eq!(geo.normal().y, wall.normal().y, epsilon = 1e-9);
    }

    #[test]
    fn multipliers_kept_or_expanded() {
        let (model, _) = office_model(3);
        let kept = model.to_honeybee(&TranslationOptions::default()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].rooms.len(), 1);
        assert_eq!(kept[0].rooms[0].multiplier, 3);
        assert_eq!(kept[0].rooms[0].story.as_deref(), Some("Floor1"));

        let options = TranslationOptions {
            use_multiplier: false,
            ..TranslationOptions::default()
        };
        let expanded = model.to_honeybee(&options).unwrap();
        let rooms = &expanded[0].rooms;
        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[2].identifier, "Office1_2");
        assert_eq!(rooms[2].story.as_deref(), Some("Floor1_2"));
        assert_relative_eq!(rooms[2].min().z, 7.0, epsilon = 1e-9);
        assert_eq!(rooms[2].multiplier, 1);
    }

    #[test]
    fn grids_follow_room_parameters() {
        let (mut model, r) = office_model(1);
        let gp = RoomGridParameter::new(1.0, 0.8, 0.0, true).unwrap();
        model
            .room_2d_mut(r)
            .unwrap()
            .properties
            .radiance
            .add_grid_parameter(gp.into());
        let models = model.to_honeybee(&TranslationOptions::default()).unwrap();
        let grids = &models[0].properties.radiance.sensor_grids;
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].identifier, "Office1");
        assert_eq!(grids[0].count(), 12);
    }

    #[test]
    fn context_shades_become_orphaned_shades() {
        let (mut model, _) = office_model(1);
        let tree = Face3D::from_xy(&[(0.0, -5.0), (2.0, -5.0), (2.0, -4.0)], 0.0).unwrap();
        let mut context = ContextShade::new("Tree", vec![tree.clone(), tree], true).unwrap();
        let leaves = Plastic::from_single_reflectance("leaves", 0.25, 0.0, 0.0).unwrap();
        context
            .properties
            .radiance
            .set_modifier(Some(Arc::new(leaves)));
        model.add_context_shade(context);

        let options = TranslationOptions {
            object_per_model: ObjectPerModel::Building,
            ..TranslationOptions::default()
        };
        let models = model.to_honeybee(&options).unwrap();
        assert_eq!(models[0].identifier, "B1");
        let shades = &models[0].orphaned_shades;
        assert_eq!(shades.len(), 2);
        assert_eq!(shades[1].identifier, "Tree_1");
        assert_eq!(
            shades[0]
                .properties
                .radiance
                .modifier_override()
                .map(|m| m.identifier()),
            Some("leaves")
        );
    }

    #[test]
    fn back_from_3d() {
        let (mut model, r) = office_model(1);
        let tinted = Arc::new(ModifierSet::new("Tinted").unwrap());
        model
            .room_2d_mut(r)
            .unwrap()
            .properties
            .radiance
            .set_modifier_set(Some(Arc::clone(&tinted)));
        let hb_model = model
            .to_honeybee(&TranslationOptions::default())
            .unwrap()
            .remove(0);

        let back = Model::from_honeybee(&hb_model).unwrap();
        let key = back.room_2d_by_identifier("Office1").unwrap();
        let room = back.room_2d(key).unwrap();
        assert_eq!(room.floor_to_ceiling_height(), 3.0);
        assert_eq!(room.boundary_conditions()[2], BoundaryCondition::Adiabatic);
        match &room.window_parameters()[0] {
            Some(WindowParameter::SimpleWindowRatio { window_ratio }) => {
                assert_relative_eq!(*window_ratio, 0.4, epsilon = 1e-9)
            }
            other => panic!("unexpected window {:?}", other),
        }
        assert!(room.window_parameters()[1].is_none());
        assert!(Arc::ptr_eq(
            &room.properties.radiance.modifier_set(&back),
            &tinted
        ));
        let story = back.story(room.parent().unwrap()).unwrap();
        assert_eq!(story.identifier, "Floor1");
    }

    #[test]
    fn object_per_model_parses() {
        assert_eq!("building".parse::<ObjectPerModel>().unwrap(), ObjectPerModel::Building);
        assert_eq!(" District ".parse::<ObjectPerModel>().unwrap(), ObjectPerModel::District);
        assert!("Campus".parse::<ObjectPerModel>().is_err());
    }
}
