//! Interactive entities on the docked island
//!
//! Placement is a pure function of the island geometry and each entity's
//! polar anchor. Orbiting entities carry a live position that eases along
//! their patrol circle; it is view state only and never feeds back into the
//! simulation.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::smoothing_factor;
use crate::world::{Island, Link, Movement, mash_seed};

const DEFAULT_ANCHOR_DISTANCE: f32 = 0.45;
const DEFAULT_ANCHOR_HEIGHT: f32 = 1.6;
const MIN_ANCHOR_DISTANCE: f32 = 0.15;
const MAX_ANCHOR_DISTANCE: f32 = 0.85;
/// Keep-out band along the shoreline
const MIN_SHORE_MARGIN: f32 = 4.0;
const SHORE_MARGIN_SCALE: f32 = 0.18;
/// Patrols smaller than this are treated as stationary
const MIN_ORBIT_RADIUS: f32 = 0.05;
const ORBIT_SMOOTHING: f32 = 0.0025;
/// Spin of orbiting entities (rad/s)
const ORBIT_SPIN: f32 = 0.6;

/// An entity placed on a specific island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandEntity {
    pub id: String,
    pub label: String,
    pub color: String,
    pub zone: Option<String>,
    pub links: Vec<Link>,
    /// Anchor point in world space
    pub center: Vec3,
    /// Patrol clamped to fit on the island
    pub movement: Option<Movement>,
}

/// Place every configured entity of `island`
pub fn derive_entities(island: &Island) -> Vec<IslandEntity> {
    let radius = island.radius;
    let origin = island.world_position();
    let margin = MIN_SHORE_MARGIN.max(radius * SHORE_MARGIN_SCALE);
    let max_distance = (radius - margin).max(radius * 0.4);

    island
        .entities
        .iter()
        .map(|spec| {
            let anchor = spec.anchor;
            let factor = anchor
                .distance
                .unwrap_or(DEFAULT_ANCHOR_DISTANCE)
                .clamp(MIN_ANCHOR_DISTANCE, MAX_ANCHOR_DISTANCE);
            let distance = max_distance.min(radius * factor);
            let lift = anchor.height.unwrap_or(DEFAULT_ANCHOR_HEIGHT);
            let center = Vec3::new(
                origin.x + anchor.angle.cos() * distance,
                origin.y + island.height + lift,
                origin.z + anchor.angle.sin() * distance,
            );

            let movement = spec.movement.and_then(|m| {
                let allowance = ((radius - margin) - distance).max(0.0);
                let orbit = m.radius.min(allowance);
                (orbit > MIN_ORBIT_RADIUS).then_some(Movement { radius: orbit, ..m })
            });

            IslandEntity {
                id: spec.id.clone(),
                label: spec.label.clone(),
                color: spec.color.clone(),
                zone: spec.zone.clone(),
                links: spec.links.clone(),
                center,
                movement,
            }
        })
        .collect()
}

/// Live view transform of one entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityPose {
    pub position: Vec3,
    pub rotation: f32,
    /// Orbit phase (radians)
    pub phase: f32,
}

/// Entities of the island currently docked at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityField {
    pub island_id: String,
    pub entities: Vec<IslandEntity>,
    pub poses: Vec<EntityPose>,
    pub selected: Option<String>,
}

impl EntityField {
    /// Place the island's entities; orbit phases come from the island seed
    pub fn for_island(island: &Island) -> Self {
        let entities = derive_entities(island);
        let mut rng = Pcg32::seed_from_u64(mash_seed(island.seed_str()) ^ 0x5eed_0f_0a);
        let poses = entities
            .iter()
            .map(|entity| EntityPose {
                position: entity.center,
                rotation: 0.0,
                phase: rng.random::<f32>() * std::f32::consts::TAU,
            })
            .collect();

        Self {
            island_id: island.id.clone(),
            entities,
            poses,
            selected: None,
        }
    }

    pub fn entity(&self, id: &str) -> Option<&IslandEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn selected_entity(&self) -> Option<&IslandEntity> {
        self.selected.as_deref().and_then(|id| self.entity(id))
    }

    /// Select `id`, or clear the selection if it is already selected
    ///
    /// Returns the new selection. Unknown ids leave the selection unchanged.
    pub fn toggle_selection(&mut self, id: &str) -> Option<&IslandEntity> {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else if self.entity(id).is_some() {
            self.selected = Some(id.to_string());
        } else {
            log::warn!("Ignoring selection of unknown entity {}", id);
        }
        self.selected_entity()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Advance orbits. Everything holds still while an entity is selected.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 || self.selected.is_some() {
            return;
        }
        let follow = smoothing_factor(ORBIT_SMOOTHING, dt);
        for (entity, pose) in self.entities.iter().zip(self.poses.iter_mut()) {
            let Some(movement) = entity.movement else {
                continue;
            };
            pose.phase += dt * movement.speed * std::f32::consts::PI;
            let target = entity.center
                + Vec3::new(
                    pose.phase.cos() * movement.radius,
                    0.0,
                    pose.phase.sin() * movement.radius,
                );
            pose.position = pose.position.lerp(target, follow);
            pose.rotation += dt * ORBIT_SPIN;
        }
    }
}
