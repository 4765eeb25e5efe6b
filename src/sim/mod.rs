//! Simulation core
//!
//! Boat kinematics, collision, cameras, the sailing/island mode machine and
//! the on-foot rig. Everything here is driven by an explicit frame delta and
//! queued commands:
//! - No rendering or platform dependencies
//! - Colliders are resolved in list order
//! - Random values only come from seeded PCG streams

pub mod boat;
pub mod camera;
pub mod collision;
pub mod controls;
pub mod entities;
pub mod mode;
pub mod state;
pub mod tick;
pub mod walk;

pub use boat::{BoatParams, BoatState};
pub use camera::{CameraDrag, CameraPose, ChaseCamera, DragSensitivity};
pub use collision::{Collider, CollisionParams, CollisionResult, RawCollider, resolve, sanitize_colliders};
pub use controls::{Action, Command, ControlState, InputQueue};
pub use entities::{EntityField, IslandEntity, derive_entities};
pub use mode::{LandingCandidate, Mode, ModeState, Proximity, SavedPose};
pub use state::{SessionEvent, SessionState, Telemetry};
pub use tick::tick;
pub use walk::WalkRig;
