//! On-foot exploration while docked
//!
//! The avatar has no heading or inertia: held directions move it at a fixed
//! pace inside a disk around the island center. A high, trailing camera keeps
//! the whole island top in view.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::camera::CameraPose;
use super::controls::ControlState;
use crate::world::Island;
use crate::{damp, smoothing_factor};

/// Walkable disk stops this far inside the shoreline
const EDGE_MARGIN: f32 = 4.0;
/// Smallest walkable radius regardless of island size
const MIN_WALK_RADIUS: f32 = 6.0;
/// Walking pace per unit of island radius
const PACE_PER_RADIUS: f32 = 0.4;
const MIN_PACE: f32 = 8.0;
/// Avatar sits at this fraction of island height
const GROUND_HEIGHT_SCALE: f32 = 0.12;
/// Avatar mesh is lifted above the ground point
const AVATAR_LIFT: f32 = 0.8;
/// Camera height above the island top, at rest and on arrival
const CAMERA_REST_HEIGHT: f32 = 12.0;
const CAMERA_ARRIVAL_HEIGHT: f32 = 14.0;
const CAMERA_HEIGHT_DAMPING: f32 = 4.0;
/// Camera trails the avatar by this fraction of island radius
const CAMERA_TRAIL_SCALE: f32 = 0.55;
const CAMERA_SMOOTHING: f32 = 0.0025;
/// Look-at height above the avatar
const LOOK_HEIGHT_SCALE: f32 = 0.6;
const LOOK_HEIGHT_BASE: f32 = 6.0;

/// Avatar locomotion and its camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkRig {
    /// Offset from the island center (x, z)
    pub offset: Vec2,
    pub camera_height: f32,
    pub camera: CameraPose,
}

impl WalkRig {
    /// Place the avatar at the island center
    pub fn arrive(island: &Island) -> Self {
        let mut rig = Self {
            offset: Vec2::ZERO,
            camera_height: island.height + CAMERA_ARRIVAL_HEIGHT,
            camera: CameraPose::default(),
        };
        rig.camera = rig.desired_camera(island);
        rig
    }

    /// Radius of the walkable disk
    pub fn walk_radius(island: &Island) -> f32 {
        (island.radius - EDGE_MARGIN).max(MIN_WALK_RADIUS)
    }

    /// Walking pace (units per second)
    pub fn pace(island: &Island) -> f32 {
        (island.radius * PACE_PER_RADIUS).max(MIN_PACE)
    }

    /// Ground point under the avatar in world space
    pub fn ground_point(&self, island: &Island) -> Vec3 {
        let center = island.center();
        Vec3::new(
            center.x + self.offset.x,
            island.height * GROUND_HEIGHT_SCALE,
            center.y + self.offset.y,
        )
    }

    /// Where the avatar mesh is drawn
    pub fn avatar_position(&self, island: &Island) -> Vec3 {
        self.ground_point(island) + Vec3::Y * AVATAR_LIFT
    }

    fn desired_camera(&self, island: &Island) -> CameraPose {
        let ground = self.ground_point(island);
        CameraPose {
            position: ground + Vec3::new(0.0, self.camera_height, island.radius * CAMERA_TRAIL_SCALE),
            look_at: ground + Vec3::new(0.0, island.height * LOOK_HEIGHT_SCALE + LOOK_HEIGHT_BASE, 0.0),
        }
    }

    /// Advance the avatar and camera by `dt`
    pub fn step(&mut self, controls: &ControlState, island: &Island, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }

        let side = controls.right as i32 - controls.left as i32;
        let front = controls.backward as i32 - controls.forward as i32;
        let movement = Vec2::new(side as f32, front as f32);

        if movement.length_squared() > 0.0 {
            self.offset += movement.normalize() * Self::pace(island) * dt;
            let limit = Self::walk_radius(island);
            let len = self.offset.length();
            if len > limit {
                self.offset *= limit / len;
            }
        }

        self.camera_height = damp(
            self.camera_height,
            island.height + CAMERA_REST_HEIGHT,
            CAMERA_HEIGHT_DAMPING,
            dt,
        );

        // Look-at follows the avatar directly, only the position trails
        let target = self.desired_camera(island);
        self.camera.position = self
            .camera
            .position
            .lerp(target.position, smoothing_factor(CAMERA_SMOOTHING, dt));
        self.camera.look_at = target.look_at;
    }
}
