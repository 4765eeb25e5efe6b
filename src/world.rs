//! World configuration
//!
//! Islands, their interactive entity layouts and the scenery derived from
//! them. The built-in archipelago ships as an embedded JSON asset; a custom
//! one can be parsed with [`WorldConfig::from_json`].

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::collision::{Collider, RawCollider, sanitize_colliders};

/// Built-in archipelago
const DEFAULT_WORLD_JSON: &str = include_str!("../assets/world.json");

/// Island colliders extend past the shoreline by this much
const COLLIDER_PADDING: f32 = 6.0;
const MIN_COLLIDER_RADIUS: f32 = 20.0;
/// Docking prompt range as a fraction of island radius
const LANDING_RANGE_SCALE: f32 = 0.35;
const MIN_LANDING_RANGE: f32 = 28.0;
/// Trees stay this far inside the shoreline
const TREE_EDGE_MARGIN: f32 = 4.0;

/// Errors raised while loading or querying world data
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Invalid world JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate island id: {0}")]
    DuplicateIsland(String),
    #[error("Duplicate entity id {entity} on island {island}")]
    DuplicateEntity { island: String, entity: String },
    #[error("Island {id} is invalid: {reason}")]
    InvalidIsland { id: String, reason: String },
    #[error("Unknown island: {0}")]
    UnknownIsland(String),
}

/// External link surfaced by a panel or entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// Info panel shown for an island
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionPanel {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Polar placement of an entity on the island top
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Angle around the island center (radians)
    #[serde(default)]
    pub angle: f32,
    /// Fraction of island radius (defaults to 0.45)
    #[serde(default)]
    pub distance: Option<f32>,
    /// Height above the island top (defaults to 1.6)
    #[serde(default)]
    pub height: Option<f32>,
}

/// Circular patrol around an entity's anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub radius: f32,
    /// Half-turns per second
    pub speed: f32,
}

/// Configured point of interest on an island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: String,
    pub label: String,
    #[serde(default = "default_entity_color")]
    pub color: String,
    /// Curated list this entity opens (hot, newcomers, quest)
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub anchor: Anchor,
    #[serde(default)]
    pub movement: Option<Movement>,
    #[serde(default)]
    pub links: Vec<Link>,
}

fn default_entity_color() -> String {
    "#38bdf8".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hill {
    pub radius: f32,
    pub height: f32,
    pub offset: [f32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedestal {
    pub offset: [f32; 2],
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IslandPalette {
    pub base: String,
    pub top: String,
    pub beach: String,
    pub trunk: String,
    #[serde(default)]
    pub foliage: Vec<String>,
}

/// A themed island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub id: String,
    pub label: String,
    /// Scenery seed (falls back to the id)
    #[serde(default)]
    pub seed: Option<String>,
    pub position: [f32; 3],
    pub radius: f32,
    pub height: f32,
    #[serde(default)]
    pub accent: String,
    #[serde(default)]
    pub palette: IslandPalette,
    #[serde(default)]
    pub tree_count: u32,
    #[serde(default)]
    pub hills: Vec<Hill>,
    #[serde(default)]
    pub pedestals: Vec<Pedestal>,
    #[serde(default)]
    pub panel: InteractionPanel,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

/// One scattered tree, relative to the island center
#[derive(Debug, Clone, PartialEq)]
pub struct TreePlacement {
    pub offset: Vec2,
    pub trunk_height: f32,
    pub foliage_height: f32,
    pub foliage_scale: f32,
    pub foliage_color: String,
    pub rotation: f32,
}

/// Hash an arbitrary seed string into an RNG seed
pub fn mash_seed(seed: &str) -> u64 {
    seed.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(1_664_525)
            .wrapping_add(b as u32)
            .wrapping_add(1_013_904_223)
    }) as u64
}

impl Island {
    /// Planar center (x, z)
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[2])
    }

    #[inline]
    pub fn world_position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn seed_str(&self) -> &str {
        self.seed.as_deref().unwrap_or(&self.id)
    }

    /// Collision circle for the boat
    pub fn collider(&self) -> Collider {
        Collider::new(
            format!("island-{}", self.id),
            self.center(),
            (self.radius + COLLIDER_PADDING).max(MIN_COLLIDER_RADIUS),
        )
    }

    /// Distance from the shoreline at which docking is offered
    pub fn landing_range(&self) -> f32 {
        (self.radius * LANDING_RANGE_SCALE).max(MIN_LANDING_RANGE)
    }

    /// Signed distance from `point` to the shoreline (negative = inland)
    pub fn shore_distance(&self, point: Vec2) -> f32 {
        (point - self.center()).length() - self.radius
    }

    /// Sand ring drawn around the island base
    pub fn beach_radius(&self) -> f32 {
        (self.radius * 1.06).max(self.radius + 2.0)
    }

    /// Deterministic tree layout from the island seed
    pub fn scatter_trees(&self) -> Vec<TreePlacement> {
        let mut rng = Pcg32::seed_from_u64(mash_seed(self.seed_str()));
        let spread = (self.radius - TREE_EDGE_MARGIN).max(0.0);
        let foliage = &self.palette.foliage;

        (0..self.tree_count as usize)
            .map(|index| {
                let angle = rng.random::<f32>() * std::f32::consts::TAU;
                let radius = rng.random::<f32>().sqrt() * spread;
                let trunk_height = 1.6 + rng.random::<f32>() * 0.8;
                let foliage_height = 1.8 + rng.random::<f32>() * 1.1;
                let foliage_scale = 1.6 + rng.random::<f32>() * 0.8;
                let foliage_color = if foliage.is_empty() {
                    default_entity_color()
                } else {
                    foliage[index % foliage.len()].clone()
                };
                TreePlacement {
                    offset: Vec2::new(angle.cos() * radius, angle.sin() * radius),
                    trunk_height,
                    foliage_height,
                    foliage_scale,
                    foliage_color,
                    rotation: rng.random::<f32>() * std::f32::consts::TAU,
                }
            })
            .collect()
    }

    fn validate(&self) -> Result<(), WorldError> {
        let invalid = |reason: &str| WorldError::InvalidIsland {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(invalid("radius must be positive"));
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(invalid("height must be non-negative"));
        }
        if !self.position.iter().all(|v| v.is_finite()) {
            return Err(invalid("position must be finite"));
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.id.as_str()) {
                return Err(WorldError::DuplicateEntity {
                    island: self.id.clone(),
                    entity: entity.id.clone(),
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn test_island(id: &str, position: [f32; 3], radius: f32, height: f32) -> Self {
        Self {
            id: id.to_string(),
            label: id.to_string(),
            seed: None,
            position,
            radius,
            height,
            accent: String::new(),
            palette: IslandPalette::default(),
            tree_count: 0,
            hills: Vec::new(),
            pedestals: Vec::new(),
            panel: InteractionPanel::default(),
            entities: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ocean {
    pub size: f32,
    /// World radius shown on the minimap
    pub minimap_radius: f32,
}

impl Default for Ocean {
    fn default() -> Self {
        Self {
            size: 520.0,
            minimap_radius: 360.0,
        }
    }
}

/// The whole archipelago
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default)]
    pub ocean: Ocean,
    pub islands: Vec<Island>,
    /// Extra obstacles (rocks, buoys); malformed entries are skipped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<RawCollider>,
}

impl WorldConfig {
    /// Parse and validate a world description
    pub fn from_json(json: &str) -> Result<Self, WorldError> {
        let world: WorldConfig = serde_json::from_str(json)?;
        world.validate()?;
        log::info!("Loaded world with {} islands", world.islands.len());
        Ok(world)
    }

    /// The built-in archipelago
    pub fn builtin() -> Result<Self, WorldError> {
        Self::from_json(DEFAULT_WORLD_JSON)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        let mut seen = HashSet::new();
        for island in &self.islands {
            island.validate()?;
            if !seen.insert(island.id.as_str()) {
                return Err(WorldError::DuplicateIsland(island.id.clone()));
            }
        }
        Ok(())
    }

    pub fn island(&self, id: &str) -> Result<&Island, WorldError> {
        self.islands
            .iter()
            .find(|island| island.id == id)
            .ok_or_else(|| WorldError::UnknownIsland(id.to_string()))
    }

    /// One collider per island in island order, then the valid obstacles
    pub fn colliders(&self) -> Vec<Collider> {
        let mut colliders: Vec<Collider> = self.islands.iter().map(Island::collider).collect();
        colliders.extend(sanitize_colliders(&self.obstacles));
        colliders
    }

    /// Island whose shoreline is closest to `point`, with the signed distance
    pub fn nearest_island(&self, point: Vec2) -> Option<(&Island, f32)> {
        self.islands
            .iter()
            .map(|island| (island, island.shore_distance(point)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_world_loads() {
        let world = WorldConfig::builtin().unwrap();
        assert_eq!(world.islands.len(), 5);
        let defi = world.island("defi").unwrap();
        assert_eq!(defi.center(), Vec2::new(220.0, -160.0));
        assert_eq!(defi.entities.len(), 3);
    }

    #[test]
    fn test_unknown_island_is_typed_error() {
        let world = WorldConfig::builtin().unwrap();
        assert!(matches!(
            world.island("atlantis"),
            Err(WorldError::UnknownIsland(id)) if id == "atlantis"
        ));
    }

    #[test]
    fn test_collider_radius_padding() {
        let island = Island::test_island("defi", [220.0, 0.0, -160.0], 46.0, 16.0);
        let collider = island.collider();
        assert_eq!(collider.id, "island-defi");
        assert_eq!(collider.radius, 52.0);

        let islet = Island::test_island("islet", [0.0, 0.0, 0.0], 8.0, 2.0);
        assert_eq!(islet.collider().radius, 20.0);
    }

    #[test]
    fn test_landing_range() {
        let big = Island::test_island("art", [0.0, 0.0, 340.0], 100.0, 17.0);
        assert!((big.landing_range() - 35.0).abs() < 1e-4);
        let small = Island::test_island("infra", [140.0, 0.0, 260.0], 34.0, 13.0);
        assert_eq!(small.landing_range(), 28.0);
    }

    #[test]
    fn test_nearest_island() {
        let world = WorldConfig::builtin().unwrap();
        let (island, distance) = world.nearest_island(Vec2::new(200.0, -150.0)).unwrap();
        assert_eq!(island.id, "defi");
        // Inside the shoreline
        assert!(distance < 0.0);
    }

    #[test]
    fn test_rejects_duplicate_islands() {
        let json = r#"{
            "islands": [
                { "id": "a", "label": "A", "position": [0, 0, 0], "radius": 10, "height": 2 },
                { "id": "a", "label": "B", "position": [50, 0, 0], "radius": 10, "height": 2 }
            ]
        }"#;
        assert!(matches!(
            WorldConfig::from_json(json),
            Err(WorldError::DuplicateIsland(_))
        ));
    }

    #[test]
    fn test_rejects_bad_radius() {
        let json = r#"{
            "islands": [
                { "id": "a", "label": "A", "position": [0, 0, 0], "radius": -1, "height": 2 }
            ]
        }"#;
        assert!(matches!(
            WorldConfig::from_json(json),
            Err(WorldError::InvalidIsland { .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            WorldConfig::from_json("{ not json"),
            Err(WorldError::Parse(_))
        ));
    }

    #[test]
    fn test_obstacles_join_colliders() {
        let json = r#"{
            "islands": [
                { "id": "a", "label": "A", "position": [0, 0, 0], "radius": 10, "height": 2 }
            ],
            "obstacles": [
                { "id": "rock", "position": [40, 0, 12], "radius": 3 },
                { "id": "buoy", "position": [-30, 8], "radius": 1.5 },
                { "id": "sunk", "position": [5, 0, 5], "radius": -2 },
                { "id": "lost", "radius": 4 }
            ]
        }"#;
        let world = WorldConfig::from_json(json).unwrap();
        let colliders = world.colliders();
        let ids: Vec<_> = colliders.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["island-a", "rock", "buoy"]);
        assert_eq!(colliders[1].center, Vec2::new(40.0, 12.0));
        assert_eq!(colliders[2].center, Vec2::new(-30.0, 8.0));
    }

    #[test]
    fn test_trees_are_deterministic_and_inside() {
        let world = WorldConfig::builtin().unwrap();
        let island = world.island("art").unwrap();
        let a = island.scatter_trees();
        let b = island.scatter_trees();
        assert_eq!(a.len(), 32);
        assert_eq!(a, b);
        for tree in &a {
            assert!(tree.offset.length() <= island.radius - 4.0 + 1e-3);
            assert!((1.6..=2.4).contains(&tree.trunk_height));
        }
        // Palette cycles by index
        assert_eq!(a[1].foliage_color, island.palette.foliage[1]);
    }

    #[test]
    fn test_beach_radius() {
        let island = Island::test_island("a", [0.0, 0.0, 0.0], 20.0, 2.0);
        assert_eq!(island.beach_radius(), 22.0);
        let island = Island::test_island("b", [0.0, 0.0, 0.0], 50.0, 2.0);
        assert!((island.beach_radius() - 53.0).abs() < 1e-4);
    }

    #[test]
    fn test_mash_seed_stable() {
        assert_eq!(mash_seed(""), 0);
        assert_eq!(mash_seed("island-defi"), mash_seed("island-defi"));
        assert_ne!(mash_seed("island-defi"), mash_seed("island-art"));
    }
}
