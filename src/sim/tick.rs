//! Per-frame session tick
//!
//! Order within a frame: drain queued commands, step the active rig (boat
//! with collision, or avatar), update cameras and entity orbits, then
//! publish telemetry and proximity.

use super::controls::{Command, InputQueue};
use super::state::{SessionEvent, SessionState};
use crate::consts::MAX_FRAME_DT;

/// Advance the session by one rendered frame
///
/// `dt` is clamped to [`MAX_FRAME_DT`] so a backgrounded tab cannot tunnel
/// the boat through an island. Queued commands are always applied; a zero,
/// negative or non-finite `dt` integrates nothing.
pub fn tick(state: &mut SessionState, input: &mut InputQueue, dt: f32) -> Vec<SessionEvent> {
    let mut events = Vec::new();

    for command in input.drain() {
        apply_command(state, command, &mut events);
    }

    if !dt.is_finite() || dt <= 0.0 {
        return events;
    }
    let dt = dt.min(MAX_FRAME_DT);
    state.elapsed += dt;

    if state.is_sailing() {
        let collided = state
            .boat
            .step(&state.controls, dt, &state.params, &state.colliders);
        if collided {
            events.push(SessionEvent::Collision);
        }
        state.chase.update(&state.boat, dt);
    } else {
        if let (Some(walk), Some(id)) = (state.walk.as_mut(), state.mode.active_island.as_deref()) {
            if let Ok(island) = state.world.island(id) {
                walk.step(&state.controls, island, dt);
            }
        }
        if let Some(field) = state.entities.as_mut() {
            field.update(dt);
        }
        state.hint_timer = (state.hint_timer - dt).max(0.0);
    }

    state.telemetry_timer += dt;
    if state.telemetry_timer >= state.telemetry_interval {
        state.telemetry_timer = 0.0;
        events.push(SessionEvent::Telemetry(state.telemetry()));
        if let Some(proximity) = state.mode.refresh_landing(&state.world, &state.boat) {
            events.push(SessionEvent::Proximity {
                island_id: proximity.island_id,
                distance: proximity.distance,
            });
        }
    }

    events
}

fn apply_command(state: &mut SessionState, command: Command, events: &mut Vec<SessionEvent>) {
    match command {
        Command::Press(action) => state.controls.set(action, true),
        Command::Release(action) => state.controls.set(action, false),
        Command::Dock => {
            if let Some(island) = state.dock() {
                events.push(SessionEvent::ModeChanged {
                    island: Some(island),
                });
            }
        }
        Command::Undock => {
            if state.undock() {
                events.push(SessionEvent::ModeChanged { island: None });
            }
        }
        Command::PointerDown {
            pointer_id,
            button,
            pos,
        } => {
            if state.is_sailing() {
                state.chase.drag.begin(pointer_id, button, pos);
            }
        }
        Command::PointerMove { pointer_id, pos } => {
            if state.is_sailing() {
                state.chase.drag.drag_to(pointer_id, pos, &state.sensitivity);
            }
        }
        Command::PointerUp { pointer_id } => state.chase.drag.finish_pointer(Some(pointer_id)),
        Command::PointerCancel { pointer_id } => state.chase.drag.finish_pointer(pointer_id),
        Command::PointerLeave => state.chase.drag.finish(),
        Command::SelectEntity(id) => match state.entities.as_mut() {
            Some(field) => {
                let entity = field.toggle_selection(&id).map(|e| e.id.clone());
                events.push(SessionEvent::EntitySelected { entity });
            }
            None => log::warn!("Entity {} selected while sailing", id),
        },
        Command::PointerMissed => {
            if let Some(field) = state.entities.as_mut() {
                if field.selected.is_some() {
                    field.clear_selection();
                    events.push(SessionEvent::EntitySelected { entity: None });
                }
            }
        }
        Command::ToggleBoost => state.set_boost(!state.boost),
        Command::Blur => {
            state.controls.clear();
            state.chase.drag.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boat::{BoatParams, BoatState};
    use crate::sim::collision::Collider;
    use crate::sim::controls::{Action, ControlState};
    use crate::sim::mode::Mode;
    use crate::world::WorldConfig;
    use glam::{Vec2, Vec3};
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn harbor() -> WorldConfig {
        WorldConfig::from_json(
            r#"{ "islands": [
                { "id": "near", "label": "Near", "position": [60, 0, -4], "radius": 20, "height": 6,
                  "entities": [
                    { "id": "kiosk", "label": "Kiosk", "anchor": { "angle": 0.5 },
                      "movement": { "radius": 2, "speed": 0.4 } }
                  ] }
            ] }"#,
        )
        .unwrap()
    }

    fn run(state: &mut SessionState, queue: &mut InputQueue, frames: usize) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(tick(state, queue, DT));
        }
        events
    }

    #[test]
    fn test_throttle_moves_boat() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        queue.push(Command::Press(Action::Forward));
        run(&mut state, &mut queue, 60);
        assert!(state.boat.speed > 0.0);
        // Heading PI sails toward +z
        assert!(state.boat.position.z > 1.0);

        queue.push(Command::Blur);
        tick(&mut state, &mut queue, DT);
        assert_eq!(state.controls, ControlState::default());
    }

    #[test]
    fn test_zero_delta_changes_nothing() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        queue.push(Command::Press(Action::Forward));
        run(&mut state, &mut queue, 30);

        let boat = state.boat;
        let camera = state.camera();
        let events = tick(&mut state, &mut queue, 0.0);
        assert!(events.is_empty());
        assert_eq!(state.boat, boat);
        assert_eq!(state.camera(), camera);
        tick(&mut state, &mut queue, -1.0);
        assert_eq!(state.boat, boat);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut a = SessionState::new(harbor());
        let mut b = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        a.controls.forward = true;
        b.controls.forward = true;
        tick(&mut a, &mut queue, 5.0);
        tick(&mut b, &mut queue, MAX_FRAME_DT);
        assert_eq!(a.boat, b.boat);
    }

    #[test]
    fn test_telemetry_interval() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        let events = run(&mut state, &mut queue, 60);
        let telemetry = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Telemetry(_)))
            .count();
        // 1 s at 0.08 s spacing, with whole frames between reports
        assert!((11..=13).contains(&telemetry));

        state.telemetry_interval = 0.0;
        let events = run(&mut state, &mut queue, 10);
        let telemetry = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Telemetry(_)))
            .count();
        assert_eq!(telemetry, 10);
    }

    #[test]
    fn test_dock_undock_round_trip() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        state.boat = BoatState::at(Vec3::new(12.5, 0.9, -4.0), 1.2);
        state.telemetry_interval = 0.0;

        let events = tick(&mut state, &mut queue, DT);
        assert!(events.contains(&SessionEvent::Proximity {
            island_id: "near".to_string(),
            distance: 27.5,
        }));
        assert_eq!(state.mode.landing.as_ref().unwrap().island_id, "near");

        queue.push(Command::Dock);
        let events = tick(&mut state, &mut queue, DT);
        assert_eq!(
            events[0],
            SessionEvent::ModeChanged {
                island: Some("near".to_string())
            }
        );
        assert_eq!(state.mode.mode, Mode::Island);
        // No proximity reports from the island
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::Proximity { .. })));

        // Walk around; the boat stays parked
        queue.push(Command::Press(Action::Right));
        run(&mut state, &mut queue, 90);
        assert!(state.walk.as_ref().unwrap().offset.x > 0.0);
        assert_eq!(state.boat.position, Vec3::new(12.5, 0.9, -4.0));

        queue.push(Command::Release(Action::Right));
        queue.push(Command::Undock);
        let events = tick(&mut state, &mut queue, DT);
        assert_eq!(events[0], SessionEvent::ModeChanged { island: None });
        assert!(state.is_sailing());
        assert_eq!(state.boat.position, Vec3::new(12.5, 0.9, -4.0));
        assert_eq!(state.boat.heading, 1.2);
        assert!(state.mode.saved_pose.is_none());
    }

    #[test]
    fn test_dock_without_candidate_is_ignored() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        queue.push(Command::Dock);
        let events = tick(&mut state, &mut queue, DT);
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::ModeChanged { .. })));
        assert!(state.is_sailing());
    }

    #[test]
    fn test_drag_only_while_sailing() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        queue.push(Command::PointerDown {
            pointer_id: 1,
            button: 0,
            pos: Vec2::ZERO,
        });
        queue.push(Command::PointerMove {
            pointer_id: 1,
            pos: Vec2::new(80.0, 0.0),
        });
        tick(&mut state, &mut queue, DT);
        assert!(state.chase.drag.active);
        assert!(state.chase.drag.current_yaw > 0.0);

        state.boat = BoatState::at(Vec3::new(12.5, 0.9, -4.0), 1.2);
        state.mode.refresh_landing(&state.world, &state.boat);
        queue.push(Command::Dock);
        tick(&mut state, &mut queue, DT);
        assert!(!state.chase.drag.active);
        assert_eq!(state.chase.drag.current_yaw, 0.0);

        queue.push(Command::PointerDown {
            pointer_id: 2,
            button: 0,
            pos: Vec2::ZERO,
        });
        tick(&mut state, &mut queue, DT);
        assert!(!state.chase.drag.active);
    }

    #[test]
    fn test_entity_selection_events() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        state.boat = BoatState::at(Vec3::new(12.5, 0.9, -4.0), 1.2);
        state.mode.refresh_landing(&state.world, &state.boat);
        queue.push(Command::Dock);
        queue.push(Command::SelectEntity("kiosk".to_string()));
        let events = tick(&mut state, &mut queue, DT);
        assert_eq!(
            events[1],
            SessionEvent::EntitySelected {
                entity: Some("kiosk".to_string())
            }
        );

        queue.push(Command::PointerMissed);
        let events = tick(&mut state, &mut queue, DT);
        assert_eq!(events[0], SessionEvent::EntitySelected { entity: None });

        queue.push(Command::SelectEntity("kiosk".to_string()));
        queue.push(Command::Undock);
        tick(&mut state, &mut queue, DT);
        assert!(state.entities.is_none());
    }

    #[test]
    fn test_controls_hint_expires() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        state.boat = BoatState::at(Vec3::new(12.5, 0.9, -4.0), 1.2);
        state.mode.refresh_landing(&state.world, &state.boat);
        queue.push(Command::Dock);
        tick(&mut state, &mut queue, DT);
        assert!(state.controls_hint_visible());
        run(&mut state, &mut queue, 60 * 5 + 5);
        assert!(!state.controls_hint_visible());
    }

    #[test]
    fn test_toggle_boost_command() {
        let mut state = SessionState::new(harbor());
        let mut queue = InputQueue::new();
        queue.push(Command::ToggleBoost);
        tick(&mut state, &mut queue, DT);
        assert!(state.boost);
        assert_eq!(state.params, BoatParams::boost());
    }

    fn arb_controls() -> impl Strategy<Value = ControlState> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(forward, backward, left, right, brake)| ControlState {
                forward,
                backward,
                left,
                right,
                brake,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_speed_and_turn_stay_bounded(
            inputs in prop::collection::vec((arb_controls(), 0.0f32..0.1), 1..200),
            boost in any::<bool>(),
        ) {
            let params = BoatParams::for_boost(boost);
            let mut boat = BoatState::default();
            for (controls, dt) in inputs {
                boat.step(&controls, dt, &params, &[]);
                prop_assert!(boat.speed <= params.max_speed + 1e-4);
                prop_assert!(boat.speed >= params.min_speed() - 1e-4);
                prop_assert!(boat.turn_rate.abs() <= params.turn_speed + 1e-4);
                prop_assert!(boat.position.is_finite());
                if boat.speed.abs() <= 0.01 {
                    prop_assert_eq!(boat.turn_rate, 0.0);
                }
            }
        }

        #[test]
        fn prop_stationary_rule_holds_against_colliders(
            start in -0.5f32..0.5,
            offset in -3.0f32..3.0,
            inputs in prop::collection::vec((arb_controls(), 0.0f32..0.1), 1..120),
        ) {
            let params = BoatParams::default();
            let colliders = [Collider::new("rock", Vec2::new(50.0, 0.0), 10.0)];
            // Creeping bow-first into the rock so contact keeps scrubbing speed
            let mut boat = BoatState::at(Vec3::new(38.0, 0.9, offset), -std::f32::consts::FRAC_PI_2);
            boat.speed = start;
            for (controls, dt) in inputs {
                boat.step(&controls, dt, &params, &colliders);
                prop_assert!(boat.speed <= params.max_speed + 1e-4);
                prop_assert!(boat.speed >= params.min_speed() - 1e-4);
                prop_assert!(boat.turn_rate.abs() <= params.turn_speed + 1e-4);
                prop_assert!(boat.position.is_finite());
                if boat.speed.abs() <= 0.01 {
                    prop_assert_eq!(boat.turn_rate, 0.0);
                }
            }
        }

        #[test]
        fn prop_drift_decays_without_sign_change(
            start in -3.0f32..6.0,
            dts in prop::collection::vec(0.001f32..0.1, 1..120),
        ) {
            let params = BoatParams::default();
            let mut boat = BoatState::default();
            boat.speed = start;
            let idle = ControlState::default();
            for dt in dts {
                let before = boat.speed;
                boat.step(&idle, dt, &params, &[]);
                prop_assert!(boat.speed.abs() <= before.abs());
                prop_assert!(boat.speed * before >= 0.0);
            }
        }

        #[test]
        fn prop_zero_delta_is_idempotent(
            inputs in prop::collection::vec(arb_controls(), 1..30),
        ) {
            let params = BoatParams::default();
            let mut boat = BoatState::default();
            for controls in &inputs {
                boat.step(controls, 1.0 / 60.0, &params, &[]);
            }
            let before = boat;
            for controls in &inputs {
                boat.step(controls, 0.0, &params, &[]);
            }
            prop_assert_eq!(boat, before);
        }

        #[test]
        fn prop_collisions_keep_boat_outside(
            angle in 0.0f32..std::f32::consts::TAU,
            frames in 1usize..240,
        ) {
            let mut state = SessionState::new(harbor());
            let mut queue = InputQueue::new();
            let island = state.world.island("near").unwrap().clone();
            let collider = state.colliders[0].clone();
            // Start just outside the collider, heading for the island center
            let start = island.center() + Vec2::new(angle.cos(), angle.sin()) * (collider.radius + 6.0);
            let heading = (start.x - island.center().x).atan2(start.y - island.center().y);
            state.boat = BoatState::at(Vec3::new(start.x, 0.9, start.y), heading);
            state.controls.forward = true;
            for _ in 0..frames {
                tick(&mut state, &mut queue, 1.0 / 60.0);
                let gap = collider.gap(crate::planar(state.boat.position), state.params.collision_radius);
                prop_assert!(gap >= -1e-3);
            }
        }
    }
}
