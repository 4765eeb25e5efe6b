//! Frame snapshot for presentation
//!
//! Plain `#[repr(C)]` data copied out of the session once per frame, laid
//! out so a renderer can upload it as a uniform buffer as-is.

use bytemuck::{Pod, Zeroable};

use crate::sim::SessionState;

/// Bits of [`FrameSnapshot::flags`]
pub mod flags {
    /// Boat is visible and steerable
    pub const SAILING: u32 = 1 << 0;
    /// Landing prompt should be shown
    pub const LANDING_AVAILABLE: u32 = 1 << 1;
    /// Avatar is on an island
    pub const AVATAR_VISIBLE: u32 = 1 << 2;
    pub const CONTROLS_HINT: u32 = 1 << 3;
    pub const BOOST: u32 = 1 << 4;
    /// Camera drag in progress
    pub const DRAGGING: u32 = 1 << 5;
}

/// Per-frame view data
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FrameSnapshot {
    /// Camera position (w unused)
    pub camera_position: [f32; 4],
    /// Camera look-at point (w unused)
    pub camera_look_at: [f32; 4],
    /// Boat position and heading in w
    pub boat: [f32; 4],
    /// Avatar position and island height in w
    pub avatar: [f32; 4],
    pub flags: u32,
    pub entity_count: u32,
    /// Boat speed
    pub speed: f32,
    /// Session time (seconds)
    pub elapsed: f32,
}

/// One entity transform
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct EntityInstance {
    /// Position and spin angle in w
    pub transform: [f32; 4],
    pub selected: u32,
    pub _pad: [u32; 3],
}

impl FrameSnapshot {
    pub fn capture(state: &SessionState) -> Self {
        let camera = state.camera();
        let boat = &state.boat;

        let mut bits = 0;
        if state.is_sailing() {
            bits |= flags::SAILING;
        }
        if state.is_sailing() && state.mode.landing.is_some() {
            bits |= flags::LANDING_AVAILABLE;
        }
        if state.controls_hint_visible() {
            bits |= flags::CONTROLS_HINT;
        }
        if state.boost {
            bits |= flags::BOOST;
        }
        if state.chase.drag.active {
            bits |= flags::DRAGGING;
        }

        let mut avatar = [0.0; 4];
        if let (Some(pos), Some(island)) = (state.avatar_position(), state.active_island()) {
            bits |= flags::AVATAR_VISIBLE;
            avatar = [pos.x, pos.y, pos.z, island.height];
        }

        Self {
            camera_position: camera.position.extend(0.0).to_array(),
            camera_look_at: camera.look_at.extend(0.0).to_array(),
            boat: boat.position.extend(boat.heading).to_array(),
            avatar,
            flags: bits,
            entity_count: state
                .entities
                .as_ref()
                .map_or(0, |field| field.entities.len() as u32),
            speed: boat.speed,
            elapsed: state.elapsed,
        }
    }

    #[inline]
    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Entity transforms for the docked island, in configuration order
pub fn capture_entities(state: &SessionState) -> Vec<EntityInstance> {
    let Some(field) = state.entities.as_ref() else {
        return Vec::new();
    };
    field
        .entities
        .iter()
        .zip(&field.poses)
        .map(|(entity, pose)| EntityInstance {
            transform: pose.position.extend(pose.rotation).to_array(),
            selected: (field.selected.as_deref() == Some(entity.id.as_str())) as u32,
            _pad: [0; 3],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{BoatState, Command, InputQueue, tick};
    use crate::world::WorldConfig;
    use glam::Vec3;

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<FrameSnapshot>(), 80);
        assert_eq!(std::mem::size_of::<EntityInstance>(), 32);
    }

    #[test]
    fn test_capture_sailing() {
        let state = SessionState::new(WorldConfig::builtin().unwrap());
        let snapshot = FrameSnapshot::capture(&state);
        assert!(snapshot.has(flags::SAILING));
        assert!(!snapshot.has(flags::AVATAR_VISIBLE));
        assert_eq!(snapshot.boat[3], state.boat.heading);
        assert_eq!(snapshot.entity_count, 0);
        assert_eq!(snapshot.as_bytes().len(), 80);
        assert!(capture_entities(&state).is_empty());
    }

    #[test]
    fn test_capture_docked() {
        let mut state = SessionState::new(WorldConfig::builtin().unwrap());
        let mut queue = InputQueue::new();
        let art = state.world.island("art").unwrap().clone();
        state.boat = BoatState::at(Vec3::new(art.position[0], 0.9, art.position[2] - art.radius - 12.0), 0.0);
        state.mode.refresh_landing(&state.world, &state.boat);
        assert!(FrameSnapshot::capture(&state).has(flags::LANDING_AVAILABLE));

        queue.push(Command::Dock);
        queue.push(Command::SelectEntity(art.entities[0].id.clone()));
        tick(&mut state, &mut queue, 1.0 / 60.0);

        let snapshot = FrameSnapshot::capture(&state);
        assert!(!snapshot.has(flags::SAILING));
        assert!(snapshot.has(flags::AVATAR_VISIBLE));
        assert!(snapshot.has(flags::CONTROLS_HINT));
        assert_eq!(snapshot.entity_count as usize, art.entities.len());

        let instances = capture_entities(&state);
        assert_eq!(instances[0].selected, 1);
        assert!(instances[1..].iter().all(|i| i.selected == 0));
    }
}
