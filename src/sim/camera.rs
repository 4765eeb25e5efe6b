//! Chase camera for sailing mode
//!
//! Pointer drags orbit the camera a little around the boat. Drag input only
//! moves the *target* yaw/pitch; the applied offsets ease toward them each
//! frame so raw pointer jitter never reaches the view.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::boat::BoatState;
use crate::consts::{CAMERA_PITCH_LIMIT, CAMERA_YAW_LIMIT};
use crate::{damp, heading_side, rotate_planar, smoothing_factor};

/// Camera sits this far behind (z) and above (y) the boat
const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 5.2, 11.5);
/// Look-at point relative to the boat
const LOOK_AT_OFFSET: Vec3 = Vec3::new(0.0, 1.6, 0.0);
/// Camera height change per radian of pitch
const PITCH_HEIGHT_SCALE: f32 = -1.4;
/// Look-at height change per radian of pitch
const PITCH_LOOK_SCALE: f32 = -5.5;
/// Sideways look-at shift per unit of sin(yaw)
const YAW_LOOK_SHIFT: f32 = 2.2;
/// Rate at which applied yaw/pitch follow their targets
const DRAG_DAMPING: f32 = 6.0;
/// Per-frame remaining gap for the camera position (60 Hz)
const POSITION_SMOOTHING: f32 = 0.0015;
/// Per-frame remaining gap for the look-at point (60 Hz)
const LOOK_AT_SMOOTHING: f32 = 0.0008;

/// Pointer-drag sensitivities (radians per pixel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSensitivity {
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for DragSensitivity {
    fn default() -> Self {
        Self {
            yaw: 0.0022,
            pitch: 0.0016,
        }
    }
}

/// Pointer-drag orbit state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDrag {
    pub active: bool,
    pub pointer_id: Option<i32>,
    pub last_cursor: Vec2,
    pub target_yaw: f32,
    pub target_pitch: f32,
    pub current_yaw: f32,
    pub current_pitch: f32,
}

impl CameraDrag {
    /// Start dragging with the primary button
    ///
    /// Targets pick up from the applied offsets so the view does not jump.
    pub fn begin(&mut self, pointer_id: i32, button: i16, cursor: Vec2) -> bool {
        if button != 0 {
            return false;
        }
        self.active = true;
        self.pointer_id = Some(pointer_id);
        self.last_cursor = cursor;
        self.target_yaw = self.current_yaw;
        self.target_pitch = self.current_pitch;
        true
    }

    /// Accumulate pointer motion into clamped targets
    pub fn drag_to(&mut self, pointer_id: i32, cursor: Vec2, sensitivity: &DragSensitivity) {
        if !self.active || self.pointer_id != Some(pointer_id) {
            return;
        }
        let delta = cursor - self.last_cursor;
        self.last_cursor = cursor;
        self.target_yaw =
            (self.target_yaw + delta.x * sensitivity.yaw).clamp(-CAMERA_YAW_LIMIT, CAMERA_YAW_LIMIT);
        self.target_pitch = (self.target_pitch + delta.y * sensitivity.pitch)
            .clamp(-CAMERA_PITCH_LIMIT, CAMERA_PITCH_LIMIT);
    }

    /// Release the drag; the view springs back behind the boat
    pub fn finish(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.pointer_id = None;
        self.last_cursor = Vec2::ZERO;
        self.target_yaw = 0.0;
        self.target_pitch = 0.0;
    }

    /// Release only if the event belongs to the dragging pointer
    pub fn finish_pointer(&mut self, pointer_id: Option<i32>) {
        if pointer_id.is_none() || pointer_id == self.pointer_id {
            self.finish();
        }
    }

    /// Drop every offset, used when leaving sailing mode
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Ease the applied offsets toward their targets
    pub fn update(&mut self, dt: f32) {
        self.current_yaw = damp(self.current_yaw, self.target_yaw, DRAG_DAMPING, dt);
        self.current_pitch = damp(self.current_pitch, self.target_pitch, DRAG_DAMPING, dt);
    }
}

/// Where the camera is and what it looks at
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// Ease toward `target` with separate smoothing for position and look-at
    pub fn approach(&mut self, target: &CameraPose, position_base: f32, look_base: f32, dt: f32) {
        self.position = self.position.lerp(target.position, smoothing_factor(position_base, dt));
        self.look_at = self.look_at.lerp(target.look_at, smoothing_factor(look_base, dt));
    }
}

/// Chase camera following the boat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChaseCamera {
    pub drag: CameraDrag,
    pub pose: CameraPose,
}

impl ChaseCamera {
    /// Ideal pose for a boat with the given applied yaw/pitch offsets
    pub fn desired_pose(boat: &BoatState, yaw: f32, pitch: f32) -> CameraPose {
        let direction = rotate_planar(boat.forward(), yaw).normalize_or_zero();
        let behind = direction * -FOLLOW_OFFSET.z;
        let position = Vec3::new(
            boat.position.x + behind.x + FOLLOW_OFFSET.x,
            boat.position.y + FOLLOW_OFFSET.y + pitch * PITCH_HEIGHT_SCALE,
            boat.position.z + behind.y,
        );

        let side = heading_side(boat.heading) * (yaw.sin() * YAW_LOOK_SHIFT);
        let mut look_at = boat.position + LOOK_AT_OFFSET + Vec3::new(side.x, 0.0, side.y);
        look_at.y += pitch * PITCH_LOOK_SCALE;

        CameraPose { position, look_at }
    }

    /// Snap straight to the ideal pose (spawn, undock)
    pub fn snap_to(&mut self, boat: &BoatState) {
        self.pose = Self::desired_pose(boat, self.drag.current_yaw, self.drag.current_pitch);
    }

    /// Per-frame follow step
    pub fn update(&mut self, boat: &BoatState, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.drag.update(dt);
        let target = Self::desired_pose(boat, self.drag.current_yaw, self.drag.current_pitch);
        self.pose
            .approach(&target, POSITION_SMOOTHING, LOOK_AT_SMOOTHING, dt);
    }
}
