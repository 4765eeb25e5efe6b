//! Input sampling
//!
//! Event handlers never touch simulation state. They push [`Command`]s into an
//! [`InputQueue`] which the session drains once at the start of every frame.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Logical held actions shared by the boat and the walk rig
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Brake,
}

impl Action {
    /// Map a DOM `KeyboardEvent.code` to an action
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Action::Forward),
            "KeyS" | "ArrowDown" => Some(Action::Backward),
            "KeyA" | "ArrowLeft" => Some(Action::Left),
            "KeyD" | "ArrowRight" => Some(Action::Right),
            "Space" => Some(Action::Brake),
            _ => None,
        }
    }
}

/// Currently held actions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub brake: bool,
}

impl ControlState {
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Forward => self.forward = held,
            Action::Backward => self.backward = held,
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Brake => self.brake = held,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Brake => self.brake,
        }
    }

    /// Net steering input: left is +1, right is -1
    pub fn turning(&self) -> f32 {
        (self.left as i32 - self.right as i32) as f32
    }

    /// Release everything (focus loss, mode change)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Discrete input events, in arrival order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Press(Action),
    Release(Action),
    /// Dock at the current landing candidate (E)
    Dock,
    /// Leave the island and return to the boat (B)
    Undock,
    /// Primary-button pointer press over the canvas
    PointerDown { pointer_id: i32, button: i16, pos: Vec2 },
    PointerMove { pointer_id: i32, pos: Vec2 },
    PointerUp { pointer_id: i32 },
    PointerCancel { pointer_id: Option<i32> },
    PointerLeave,
    /// Click on an island entity
    SelectEntity(String),
    /// Click that hit nothing in the scene
    PointerMissed,
    ToggleBoost,
    /// Window lost focus; release held actions
    Blur,
}

impl Command {
    /// Translate a key-down `code` (ignoring auto-repeat) into a command
    pub fn from_key_down(code: &str, repeat: bool) -> Option<Self> {
        if let Some(action) = Action::from_key_code(code) {
            return Some(Command::Press(action));
        }
        if repeat {
            return None;
        }
        match code {
            "KeyE" => Some(Command::Dock),
            "KeyB" => Some(Command::Undock),
            _ => None,
        }
    }

    /// Translate a key-up `code` into a command
    pub fn from_key_up(code: &str) -> Option<Self> {
        Action::from_key_code(code).map(Command::Release)
    }
}

/// Single-producer/single-consumer command buffer
#[derive(Debug, Default)]
pub struct InputQueue {
    pending: VecDeque<Command>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take every queued command, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.pending.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(Action::from_key_code("KeyW"), Some(Action::Forward));
        assert_eq!(Action::from_key_code("ArrowLeft"), Some(Action::Left));
        assert_eq!(Action::from_key_code("Space"), Some(Action::Brake));
        assert_eq!(Action::from_key_code("KeyQ"), None);
    }

    #[test]
    fn test_dock_ignores_repeat() {
        assert_eq!(Command::from_key_down("KeyE", false), Some(Command::Dock));
        assert_eq!(Command::from_key_down("KeyE", true), None);
        // Held movement keys still register on repeat
        assert_eq!(
            Command::from_key_down("KeyW", true),
            Some(Command::Press(Action::Forward))
        );
        assert_eq!(Command::from_key_up("KeyB"), None);
    }

    #[test]
    fn test_turning_sign() {
        let mut c = ControlState::default();
        c.set(Action::Left, true);
        assert_eq!(c.turning(), 1.0);
        c.set(Action::Right, true);
        assert_eq!(c.turning(), 0.0);
        c.set(Action::Left, false);
        assert_eq!(c.turning(), -1.0);
        c.clear();
        assert!(!c.is_held(Action::Right));
    }

    #[test]
    fn test_queue_preserves_order() {
        let mut q = InputQueue::new();
        q.push(Command::Press(Action::Forward));
        q.push(Command::Dock);
        q.push(Command::Release(Action::Forward));
        assert_eq!(q.len(), 3);

        let drained: Vec<_> = q.drain().collect();
        assert_eq!(drained[0], Command::Press(Action::Forward));
        assert_eq!(drained[1], Command::Dock);
        assert!(q.is_empty());
    }
}
