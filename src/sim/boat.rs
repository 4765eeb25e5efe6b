//! Boat locomotion
//!
//! Integrates throttle, drift, braking and a smoothed turn rate once per frame,
//! then hands the tentative move to the collision resolver.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::{self, Collider, CollisionParams};
use super::controls::ControlState;
use crate::consts::*;
use crate::{damp, frame_decay, heading_forward};

/// Reverse thrust relative to forward acceleration
const REVERSE_THRUST: f32 = 0.6;
/// Share of turn authority available at standstill
const LOW_SPEED_TURN_SHARE: f32 = 0.35;
/// Angular acceleration toward the target turn rate, in multiples of turn speed
const TURN_ACCELERATION_SCALE: f32 = 2.4;
/// Decay rate of the turn rate once steering is released
const TURN_DAMPING: f32 = 5.2;
/// Turn-rate and heading changes smaller than this are float noise
const TURN_EPSILON: f32 = 0.001;
/// Slide impulses below this squared length are dropped
const SLIDE_SNAP_SQ: f32 = 1e-5;

/// Tunable handling characteristics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoatParams {
    pub max_speed: f32,
    pub acceleration: f32,
    pub braking: f32,
    /// Maximum turn rate (rad/s)
    pub turn_speed: f32,
    /// Per-frame speed retention with no throttle (normalized to 60 Hz)
    pub drift_damping: f32,
    /// Per-frame slide retention (normalized to 60 Hz)
    pub slide_damping: f32,
    pub collision_radius: f32,
    pub collision_slide_factor: f32,
}

impl Default for BoatParams {
    fn default() -> Self {
        Self {
            max_speed: 6.0,
            acceleration: 3.5,
            braking: 6.0,
            turn_speed: 60.0_f32.to_radians(),
            drift_damping: 0.98,
            slide_damping: 0.78,
            collision_radius: 2.8,
            collision_slide_factor: 1.8,
        }
    }
}

impl BoatParams {
    /// Handling used while exploring the archipelago
    pub fn cruise() -> Self {
        Self {
            max_speed: 9.0,
            acceleration: 5.2,
            braking: 6.5,
            turn_speed: 75.0_f32.to_radians(),
            drift_damping: 0.982,
            slide_damping: 0.78,
            collision_radius: 3.2,
            collision_slide_factor: 1.9,
        }
    }

    /// Handling with boost engaged
    pub fn boost() -> Self {
        Self {
            max_speed: 14.0,
            acceleration: 8.0,
            braking: 8.0,
            turn_speed: 90.0_f32.to_radians(),
            drift_damping: 0.987,
            ..Self::cruise()
        }
    }

    pub fn for_boost(boost: bool) -> Self {
        if boost { Self::boost() } else { Self::cruise() }
    }

    /// Lowest (most negative) speed allowed
    #[inline]
    pub fn min_speed(&self) -> f32 {
        -self.max_speed * REVERSE_SPEED_FRACTION
    }

    pub fn collision(&self) -> CollisionParams {
        CollisionParams {
            boat_radius: self.collision_radius,
            slide_factor: self.collision_slide_factor,
        }
    }
}

/// Everything that moves when the boat moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoatState {
    pub position: Vec3,
    /// Rotation about world-up (radians)
    pub heading: f32,
    /// Signed speed along the heading
    pub speed: f32,
    /// Current angular velocity (rad/s)
    pub turn_rate: f32,
    /// Lingering lateral impulse from the last collision (x, z)
    pub slide: Vec2,
}

impl Default for BoatState {
    fn default() -> Self {
        Self::at(Vec3::from_array(BOAT_SPAWN), BOAT_SPAWN_HEADING)
    }
}

impl BoatState {
    /// Boat at rest at the given pose
    pub fn at(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            turn_rate: 0.0,
            slide: Vec2::ZERO,
        }
    }

    /// Planar facing direction
    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading_forward(self.heading)
    }

    /// Hard stop used when the boat is disabled (docking, mode changes)
    ///
    /// Velocity-like fields are zeroed immediately rather than damped.
    pub fn halt(&mut self) {
        self.speed = 0.0;
        self.turn_rate = 0.0;
        self.slide = Vec2::ZERO;
    }

    /// Advance by `dt` seconds. Returns whether a collider was touched.
    ///
    /// A zero or negative `dt` leaves the state untouched.
    pub fn step(
        &mut self,
        controls: &ControlState,
        dt: f32,
        params: &BoatParams,
        colliders: &[Collider],
    ) -> bool {
        if dt <= 0.0 || !dt.is_finite() {
            return false;
        }

        // Throttle
        let mut accel = 0.0;
        if controls.forward {
            accel += params.acceleration;
        }
        if controls.backward {
            accel -= params.acceleration * REVERSE_THRUST;
        }
        let mut speed = self.speed + accel * dt;

        // Water resistance when coasting
        if !controls.forward && !controls.backward {
            speed *= frame_decay(params.drift_damping, dt);
        }

        if controls.brake {
            let reduction = params.braking * dt;
            speed = if speed > 0.0 {
                (speed - reduction).max(0.0)
            } else {
                (speed + reduction).min(0.0)
            };
        }

        speed = speed.clamp(params.min_speed(), params.max_speed);

        // Steering authority grows with speed
        let speed_factor = if params.max_speed > 0.0 {
            (speed.abs() / params.max_speed).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let turning = controls.turning();
        let target_turn_rate = if turning != 0.0 && speed.abs() > MIN_TURN_SPEED {
            turning * params.turn_speed * (LOW_SPEED_TURN_SHARE + speed_factor * (1.0 - LOW_SPEED_TURN_SHARE))
        } else {
            0.0
        };

        let turn_delta = target_turn_rate - self.turn_rate;
        if turn_delta.abs() > TURN_EPSILON {
            if target_turn_rate == 0.0 {
                self.turn_rate = damp(self.turn_rate, 0.0, TURN_DAMPING, dt);
            } else {
                let max_change = params.turn_speed * TURN_ACCELERATION_SCALE * dt;
                self.turn_rate += turn_delta.signum() * turn_delta.abs().min(max_change);
            }
        }
        // Stationary boats never keep turning
        if speed.abs() <= MIN_TURN_SPEED {
            self.turn_rate = 0.0;
        }

        if self.turn_rate.abs() > TURN_EPSILON {
            self.heading += self.turn_rate * dt;
        }

        // Collision slide fades out
        if self.slide.length_squared() > 0.0 {
            self.slide *= frame_decay(params.slide_damping, dt);
            if self.slide.length_squared() < SLIDE_SNAP_SQ {
                self.slide = Vec2::ZERO;
            }
        }

        let forward = self.forward();
        let motion = forward * speed * dt + self.slide * dt;
        let tentative = self.position + Vec3::new(motion.x, 0.0, motion.y);

        if colliders.is_empty() {
            self.position = tentative;
            self.speed = speed;
            return false;
        }

        let result = collision::resolve(
            tentative,
            forward,
            speed,
            self.slide,
            colliders,
            &params.collision(),
            dt,
        );
        self.position = result.position;
        self.speed = result.speed;
        self.slide = result.slide;
        // Contact scrubs speed; re-apply the stationary rule afterwards
        if self.speed.abs() <= MIN_TURN_SPEED {
            self.turn_rate = 0.0;
        }
        result.collided
    }
}
