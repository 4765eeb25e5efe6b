//! Sailing/island mode machine
//!
//! Docking snapshots the boat pose into a single slot and parks the boat;
//! undocking consumes the slot and puts the boat back exactly where it was.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::boat::BoatState;
use crate::planar;
use crate::world::WorldConfig;

/// Which rig receives input this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Sailing,
    Island,
}

/// Boat pose saved while docked
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedPose {
    pub position: Vec3,
    pub heading: f32,
}

/// Nearest island within docking range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingCandidate {
    pub island_id: String,
    /// Distance from the boat to the shoreline (negative when overlapping)
    pub distance: f32,
}

/// Nearest island and its shoreline distance, whether in range or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub island_id: String,
    pub distance: f32,
    pub in_range: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeState {
    pub mode: Mode,
    pub saved_pose: Option<SavedPose>,
    pub active_island: Option<String>,
    pub landing: Option<LandingCandidate>,
}

impl ModeState {
    #[inline]
    pub fn is_sailing(&self) -> bool {
        self.mode == Mode::Sailing
    }

    /// Recompute the landing candidate from the boat position
    ///
    /// Only meaningful while sailing; while docked the candidate stays clear.
    pub fn refresh_landing(&mut self, world: &WorldConfig, boat: &BoatState) -> Option<Proximity> {
        if !self.is_sailing() {
            self.landing = None;
            return None;
        }

        let Some((island, distance)) = world.nearest_island(planar(boat.position)) else {
            self.landing = None;
            return None;
        };
        let in_range = distance < island.landing_range();

        let next = in_range.then(|| LandingCandidate {
            island_id: island.id.clone(),
            distance,
        });
        if next.as_ref().map(|c| &c.island_id) != self.landing.as_ref().map(|c| &c.island_id) {
            match &next {
                Some(c) => log::debug!("Landing available at {} ({:.1})", c.island_id, c.distance),
                None => log::debug!("Left landing range"),
            }
        }
        self.landing = next;

        Some(Proximity {
            island_id: island.id.clone(),
            distance,
            in_range,
        })
    }

    /// Sailing to island: save the boat pose and park the boat
    ///
    /// Returns the island docked at, or `None` if docking is not possible.
    pub fn dock(&mut self, boat: &mut BoatState) -> Option<String> {
        if !self.is_sailing() {
            log::warn!("Dock ignored: already on an island");
            return None;
        }
        let Some(candidate) = self.landing.take() else {
            log::warn!("Dock ignored: no island in range");
            return None;
        };

        self.saved_pose = Some(SavedPose {
            position: boat.position,
            heading: boat.heading,
        });
        boat.halt();
        self.mode = Mode::Island;
        self.active_island = Some(candidate.island_id.clone());
        log::info!("Docked at {}", candidate.island_id);
        Some(candidate.island_id)
    }

    /// Island to sailing: restore the saved pose
    ///
    /// Returns `false` if already sailing.
    pub fn undock(&mut self, boat: &mut BoatState) -> bool {
        if self.is_sailing() {
            log::warn!("Undock ignored: already sailing");
            return false;
        }
        if let Some(pose) = self.saved_pose.take() {
            boat.position = pose.position;
            boat.heading = pose.heading;
        }
        boat.halt();
        self.mode = Mode::Sailing;
        if let Some(id) = self.active_island.take() {
            log::info!("Left {}", id);
        }
        self.landing = None;
        true
    }
}
