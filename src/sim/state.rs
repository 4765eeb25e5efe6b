//! Session state
//!
//! Everything the per-frame tick mutates lives in [`SessionState`].
//! Presentation reads it (or a [`crate::snapshot::FrameSnapshot`]) after the
//! tick and never writes back.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::boat::{BoatParams, BoatState};
use super::camera::{CameraPose, ChaseCamera, DragSensitivity};
use super::collision::Collider;
use super::controls::ControlState;
use super::entities::EntityField;
use super::mode::{Mode, ModeState};
use super::walk::WalkRig;
use crate::consts::*;
use crate::wrap_angle;
use crate::world::{Island, WorldConfig};

/// Boat position and heading, published at the telemetry interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub x: f32,
    pub z: f32,
    pub heading: f32,
}

/// Notifications produced by a tick, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Telemetry(Telemetry),
    /// Nearest island while sailing (distance negative when overlapping)
    Proximity { island_id: String, distance: f32 },
    /// Active island after a mode change (`None` when back at sea)
    ModeChanged { island: Option<String> },
    EntitySelected { entity: Option<String> },
    /// Boat touched a collider this frame
    Collision,
}

/// One exploration session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub world: WorldConfig,
    /// Derived from `world`, in island order
    pub colliders: Vec<Collider>,
    pub boost: bool,
    pub params: BoatParams,
    pub controls: ControlState,
    pub boat: BoatState,
    pub chase: ChaseCamera,
    pub sensitivity: DragSensitivity,
    pub mode: ModeState,
    /// Present only while docked
    pub walk: Option<WalkRig>,
    /// Present only while docked
    pub entities: Option<EntityField>,
    /// Seconds between telemetry events (0 = every frame)
    pub telemetry_interval: f32,
    pub telemetry_timer: f32,
    /// Remaining seconds of the on-foot controls hint
    pub hint_timer: f32,
    pub show_controls_hint: bool,
    /// Simulated seconds since the session started
    pub elapsed: f32,
}

impl SessionState {
    /// Start sailing at the spawn point
    pub fn new(world: WorldConfig) -> Self {
        let colliders = world.colliders();
        let boat = BoatState::default();
        let mut chase = ChaseCamera::default();
        chase.snap_to(&boat);

        Self {
            world,
            colliders,
            boost: false,
            params: BoatParams::cruise(),
            controls: ControlState::default(),
            boat,
            chase,
            sensitivity: DragSensitivity::default(),
            mode: ModeState::default(),
            walk: None,
            entities: None,
            telemetry_interval: TELEMETRY_INTERVAL,
            telemetry_timer: 0.0,
            hint_timer: 0.0,
            show_controls_hint: true,
            elapsed: 0.0,
        }
    }

    /// Island the player is standing on
    pub fn active_island(&self) -> Option<&Island> {
        let id = self.mode.active_island.as_deref()?;
        self.world.island(id).ok()
    }

    #[inline]
    pub fn is_sailing(&self) -> bool {
        self.mode.mode == Mode::Sailing
    }

    pub fn set_boost(&mut self, boost: bool) {
        if self.boost != boost {
            log::info!("Boost {}", if boost { "on" } else { "off" });
        }
        self.boost = boost;
        self.params = BoatParams::for_boost(boost);
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            x: self.boat.position.x,
            z: self.boat.position.z,
            heading: wrap_angle(self.boat.heading),
        }
    }

    /// Pose of whichever camera is live
    pub fn camera(&self) -> CameraPose {
        match &self.walk {
            Some(walk) if !self.is_sailing() => walk.camera,
            _ => self.chase.pose,
        }
    }

    /// Avatar position while docked
    pub fn avatar_position(&self) -> Option<Vec3> {
        let walk = self.walk.as_ref()?;
        Some(walk.avatar_position(self.active_island()?))
    }

    pub fn controls_hint_visible(&self) -> bool {
        !self.is_sailing() && self.hint_timer > 0.0
    }

    /// Dock at the current landing candidate
    ///
    /// Leaving the sea drops camera drag, slide and turn rate right away.
    pub fn dock(&mut self) -> Option<String> {
        let island_id = self.mode.dock(&mut self.boat)?;
        self.chase.drag.reset();

        match self.world.island(&island_id) {
            Ok(island) => {
                self.walk = Some(WalkRig::arrive(island));
                self.entities = Some(EntityField::for_island(island));
            }
            Err(err) => log::warn!("Docked without island data: {}", err),
        }
        self.hint_timer = if self.show_controls_hint {
            CONTROLS_HINT_SECS
        } else {
            0.0
        };
        Some(island_id)
    }

    /// Return to the boat at its saved pose
    pub fn undock(&mut self) -> bool {
        if !self.mode.undock(&mut self.boat) {
            return false;
        }
        self.walk = None;
        self.entities = None;
        self.hint_timer = 0.0;
        self.chase.drag.reset();
        self.chase.snap_to(&self.boat);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_sailing() {
        let state = SessionState::new(WorldConfig::builtin().unwrap());
        assert!(state.is_sailing());
        assert_eq!(state.colliders.len(), state.world.islands.len());
        assert_eq!(state.boat.position, Vec3::from_array(BOAT_SPAWN));
        assert_eq!(state.params, BoatParams::cruise());
        assert!(state.avatar_position().is_none());
    }

    #[test]
    fn test_telemetry_heading_is_wrapped() {
        let mut state = SessionState::new(WorldConfig::builtin().unwrap());
        state.boat.heading = 5.0 * std::f32::consts::PI + 0.3;
        let heading = state.telemetry().heading;
        assert!(heading > -std::f32::consts::PI && heading <= std::f32::consts::PI);
        assert!((heading - (-std::f32::consts::PI + 0.3)).abs() < 1e-3);
    }

    #[test]
    fn test_boost_swaps_params() {
        let mut state = SessionState::new(WorldConfig::builtin().unwrap());
        state.set_boost(true);
        assert_eq!(state.params, BoatParams::boost());
        state.set_boost(false);
        assert_eq!(state.params, BoatParams::cruise());
    }

    #[test]
    fn test_dock_builds_island_rigs() {
        let mut state = SessionState::new(WorldConfig::builtin().unwrap());
        let defi = state.world.island("defi").unwrap().clone();
        state.boat.position = Vec3::new(defi.position[0] - defi.radius - 10.0, 0.9, defi.position[2]);
        state.mode.refresh_landing(&state.world, &state.boat);

        assert_eq!(state.dock().as_deref(), Some("defi"));
        assert!(state.controls_hint_visible());
        let field = state.entities.as_ref().unwrap();
        assert_eq!(field.entities.len(), defi.entities.len());
        assert!(state.avatar_position().is_some());
        assert_eq!(state.camera(), state.walk.as_ref().unwrap().camera);

        assert!(state.undock());
        assert!(state.walk.is_none());
        assert!(state.entities.is_none());
        assert!(!state.controls_hint_visible());
    }
}
