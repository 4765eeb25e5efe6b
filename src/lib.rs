//! Isle Voyage - sail between themed islands and explore them on foot
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (boat physics, collisions, camera, modes)
//! - `world`: Static island/entity configuration and scenery layout
//! - `hud`: Minimap and prompt helpers for the overlay
//! - `snapshot`: Plain-data frame snapshot handed to the renderer
//! - `settings`: Persisted player preferences

pub mod hud;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod world;

pub use settings::Settings;
pub use world::{WorldConfig, WorldError};

use glam::{Vec2, Vec3};

/// Simulation constants
pub mod consts {
    /// Largest frame delta accepted by the session tick (tab stalls, breakpoints)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame delta used when no previous timestamp exists
    pub const DEFAULT_FRAME_DT: f32 = 1.0 / 60.0;
    /// Reference rate that per-frame damping factors are tuned against
    pub const DAMPING_REFERENCE_HZ: f32 = 60.0;

    /// Telemetry broadcast interval (seconds)
    pub const TELEMETRY_INTERVAL: f32 = 0.08;

    /// Reverse speed cap as a fraction of max speed
    pub const REVERSE_SPEED_FRACTION: f32 = 0.55;
    /// Below this speed the boat cannot turn
    pub const MIN_TURN_SPEED: f32 = 0.01;

    /// Distance guard for near-coincident collision centers
    pub const COLLISION_EPSILON: f32 = 0.0001;
    /// Fraction of speed kept after touching a collider
    pub const COLLISION_SPEED_RETAIN: f32 = 0.965;

    /// Camera drag limits (radians)
    pub const CAMERA_YAW_LIMIT: f32 = 0.65;
    pub const CAMERA_PITCH_LIMIT: f32 = 0.35;

    /// Seconds the on-foot controls hint stays visible after docking
    pub const CONTROLS_HINT_SECS: f32 = 5.0;

    /// Spawn point of the boat
    pub const BOAT_SPAWN: [f32; 3] = [0.0, 0.9, 0.0];
    /// Initial heading (boat model faces +z)
    pub const BOAT_SPAWN_HEADING: f32 = std::f32::consts::PI;
}

/// Frame-rate independent exponential damping (λ in 1/s)
#[inline]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-lambda * dt).exp())
}

/// Lerp factor for a per-frame retention `base` normalized to 60 Hz
///
/// `base` is the fraction of the gap that would remain after one 60 Hz frame.
#[inline]
pub fn smoothing_factor(base: f32, dt: f32) -> f32 {
    1.0 - base.powf(dt * consts::DAMPING_REFERENCE_HZ)
}

/// Per-frame multiplicative decay normalized to 60 Hz
#[inline]
pub fn frame_decay(factor: f32, dt: f32) -> f32 {
    factor.powf(dt * consts::DAMPING_REFERENCE_HZ)
}

/// Planar forward direction (x, z) for a heading around world-up
///
/// Heading 0 faces -z, matching a model rotated by `heading` about +y.
#[inline]
pub fn heading_forward(heading: f32) -> Vec2 {
    Vec2::new(-heading.sin(), -heading.cos())
}

/// Planar right-hand side direction (x, z) for a heading
#[inline]
pub fn heading_side(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), -heading.sin())
}

/// Wrap an angle into (-PI, PI]
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}

/// Project a world position onto the water plane (x, z)
#[inline]
pub fn planar(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Rotate a planar (x, z) vector about world-up by `angle`
#[inline]
pub fn rotate_planar(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c + v.y * s, -v.x * s + v.y * c)
}
