//! Collision detection and response against circular island colliders
//!
//! The boat is treated as a circle on the water plane. Each overlapping
//! collider pushes it back onto the combined boundary, nudges it along the
//! edge and leaves behind a slide impulse that keeps it gliding around the
//! obstacle for a few frames.
//!
//! Colliders are resolved sequentially in input order and every correction is
//! applied immediately. When two colliders overlap each other the later one
//! wins, so a correction may push the boat back into an earlier collider.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{COLLISION_EPSILON, COLLISION_SPEED_RETAIN};

/// Extra slide distance per unit of travel this frame
const SLIDE_DISTANCE_SPEED_SCALE: f32 = 1.4;
/// Extra slide distance per unit of penetration
const SLIDE_DISTANCE_PENETRATION_SCALE: f32 = 0.75;
/// Slide impulse per unit of penetration
const SLIDE_IMPULSE_PENETRATION_SCALE: f32 = 2.7;
/// Slide impulse floor relative to speed
const SLIDE_IMPULSE_SPEED_FLOOR: f32 = 1.35;
/// Absolute slide impulse floor
const SLIDE_IMPULSE_MIN: f32 = 3.4;

/// A circular obstacle on the water plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub id: String,
    /// Center projected onto (x, z)
    pub center: Vec2,
    pub radius: f32,
}

impl Collider {
    pub fn new(id: impl Into<String>, center: Vec2, radius: f32) -> Self {
        Self {
            id: id.into(),
            center,
            radius,
        }
    }

    /// Validate an externally supplied entry
    ///
    /// Entries without a usable position or with a non-positive radius are
    /// dropped with a warning instead of failing the whole list.
    pub fn from_raw(raw: &RawCollider) -> Option<Self> {
        let radius = raw.radius.unwrap_or(0.0);
        if !radius.is_finite() || radius <= 0.0 {
            log::warn!("Skipping collider {:?}: radius {:?}", raw.id, raw.radius);
            return None;
        }
        let center = match raw.position.as_deref() {
            // [x, y, z] with y ignored
            Some([x, _, z, ..]) => Vec2::new(*x, *z),
            // [x, z]
            Some([x, z]) => Vec2::new(*x, *z),
            _ => {
                log::warn!("Skipping collider {:?}: missing position", raw.id);
                return None;
            }
        };
        if !center.is_finite() {
            log::warn!("Skipping collider {:?}: non-finite position", raw.id);
            return None;
        }
        Some(Self::new(raw.id.clone().unwrap_or_default(), center, radius))
    }

    /// Positive finite radius and a finite center
    pub fn is_valid(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.center.is_finite()
    }

    /// Signed gap between a circle and this collider's edge (negative = overlap)
    pub fn gap(&self, point: Vec2, radius: f32) -> f32 {
        (point - self.center).length() - (self.radius + radius)
    }
}

/// Collider entry as it arrives from outside the core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCollider {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub position: Option<Vec<f32>>,
    #[serde(default)]
    pub radius: Option<f32>,
}

/// Validate a raw collider list, keeping input order
pub fn sanitize_colliders(raw: &[RawCollider]) -> Vec<Collider> {
    raw.iter().filter_map(Collider::from_raw).collect()
}

/// Tunables for collision response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionParams {
    /// Radius of the boat's collision circle
    pub boat_radius: f32,
    /// Slide impulse per unit of speed
    pub slide_factor: f32,
}

/// Outcome of resolving one tentative move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub position: Vec3,
    pub speed: f32,
    pub slide: Vec2,
    /// Whether any collider was touched
    pub collided: bool,
}

impl CollisionResult {
    /// No contact: everything passes through unchanged
    pub fn clear(position: Vec3, speed: f32, slide: Vec2) -> Self {
        Self {
            position,
            speed,
            slide,
            collided: false,
        }
    }
}

/// Resolve a tentative boat position against every collider in order
///
/// `forward` is the boat's planar facing and decides which way along the edge
/// the boat slides. Height (`y`) is never touched.
pub fn resolve(
    tentative: Vec3,
    forward: Vec2,
    speed: f32,
    slide: Vec2,
    colliders: &[Collider],
    params: &CollisionParams,
    dt: f32,
) -> CollisionResult {
    let mut result = CollisionResult::clear(tentative, speed, slide);

    for collider in colliders {
        if !collider.is_valid() {
            continue;
        }
        let mut pos = Vec2::new(result.position.x, result.position.z);
        let offset = pos - collider.center;
        let min_distance = collider.radius + params.boat_radius;
        if offset.length_squared() > min_distance * min_distance {
            continue;
        }

        let distance = offset.length().max(COLLISION_EPSILON);
        let penetration = min_distance - distance;
        let normal = if offset.length_squared() > 0.0 {
            offset / distance
        } else {
            // Dead center: push out backwards along the heading
            -forward.normalize_or(Vec2::X)
        };

        // Sit exactly on the combined boundary
        pos = collider.center + normal * min_distance;

        // Tangent agreeing with the direction of travel
        let mut tangent = normal.perp();
        if forward.dot(tangent) < 0.0 {
            tangent = -tangent;
        }

        let speed_magnitude = result.speed.abs();
        let slide_distance = (speed_magnitude * dt * SLIDE_DISTANCE_SPEED_SCALE)
            .max(penetration * SLIDE_DISTANCE_PENETRATION_SCALE);
        pos += tangent * slide_distance;

        let slide_strength = (speed_magnitude * params.slide_factor
            + penetration * SLIDE_IMPULSE_PENETRATION_SCALE)
            .max(speed_magnitude * SLIDE_IMPULSE_SPEED_FLOOR)
            .max(SLIDE_IMPULSE_MIN);
        result.slide = tangent * slide_strength;

        // Slow down without ever reversing
        let direction_sign = if result.speed >= 0.0 { 1.0 } else { -1.0 };
        result.speed = direction_sign * speed_magnitude * COLLISION_SPEED_RETAIN;

        result.position.x = pos.x;
        result.position.z = pos.y;
        result.collided = true;

        log::debug!(
            "Collision with {} (penetration {:.3}, slide {:.2})",
            collider.id,
            penetration,
            slide_strength
        );
    }

    result
}
