//! Overlay helpers
//!
//! Pure formatting and projection used by the HUD. None of this feeds back
//! into the simulation.

use glam::Vec2;

use crate::sim::{LandingCandidate, SessionState, Telemetry};
use crate::world::WorldConfig;

/// Minimap size in CSS pixels
pub const MINIMAP_SIZE: f32 = 150.0;
/// Inset between the minimap edge and its ocean disk
const MINIMAP_INSET: f32 = 8.0;
/// Displayed progress never drops below this share of the bar
const MIN_PROGRESS_DISPLAY: f32 = 0.04;

/// Project a world (x, z) point onto the minimap disk
///
/// Points beyond `world_radius` are pulled onto the rim. The result is
/// relative to the minimap center, in pixels.
pub fn minimap_project(x: f32, z: f32, world_radius: f32) -> Vec2 {
    let disk = MINIMAP_SIZE / 2.0 - MINIMAP_INSET;
    let point = Vec2::new(x, z);
    let len = point.length();
    let scale = if len > world_radius { world_radius / len } else { 1.0 };
    point * scale / world_radius * disk
}

/// Rotation of the minimap boat marker in degrees
pub fn heading_marker_degrees(heading: f32) -> f32 {
    -heading.to_degrees()
}

/// Minimap marker for the boat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoatMarker {
    pub offset: Vec2,
    pub rotation_deg: f32,
}

impl BoatMarker {
    pub fn from_telemetry(telemetry: &Telemetry, world: &WorldConfig) -> Self {
        Self {
            offset: minimap_project(telemetry.x, telemetry.z, world.ocean.minimap_radius),
            rotation_deg: heading_marker_degrees(telemetry.heading),
        }
    }
}

/// Island markers (id, offset, accent color)
pub fn island_markers(world: &WorldConfig) -> Vec<(String, Vec2, String)> {
    world
        .islands
        .iter()
        .map(|island| {
            (
                island.id.clone(),
                minimap_project(island.position[0], island.position[2], world.ocean.minimap_radius),
                island.accent.clone(),
            )
        })
        .collect()
}

/// "Approach" prompt title for a landing candidate
pub fn landing_title(candidate: &LandingCandidate, world: &WorldConfig) -> String {
    match world.island(&candidate.island_id) {
        Ok(island) if !island.label.is_empty() => island.label.clone(),
        _ => format!("Island {}", candidate.island_id),
    }
}

pub const LANDING_HINT: &str = "Press E to dock";
pub const UNDOCK_HINT: &str = "Press B to return to the ocean";
pub const WALK_HINT: &str = "WASD or arrow keys to walk";

/// Landing prompt text while sailing near an island
pub fn landing_prompt(state: &SessionState) -> Option<String> {
    if !state.is_sailing() {
        return None;
    }
    let candidate = state.mode.landing.as_ref()?;
    Some(format!("Approach {} - {}", landing_title(candidate, &state.world), LANDING_HINT))
}

/// Quest progress as a bar fraction in [0.04, 1]
pub fn quest_progress(discovered: u32, total: u32) -> f32 {
    let progress = if total > 0 {
        (discovered as f32 / total as f32).min(1.0)
    } else {
        0.0
    };
    progress.max(MIN_PROGRESS_DISPLAY)
}
