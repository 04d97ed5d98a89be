//! Gameplay simulation module
//!
//! All gameplay logic lives here. It has no rendering or platform
//! dependencies:
//! - Seeded RNG only
//! - Stable iteration order (by entity id)
//! - One clock, advanced once per frame

pub mod camera;
pub mod collider;
pub mod entity;
pub mod physics;
pub mod state;
pub mod streaming;
pub mod tick;
pub mod world;

pub use camera::{Camera, CameraMode, CameraSettings};
pub use collider::{Collider, ColliderShape, get_collisions, is_collision};
pub use entity::{Entity, EntityId, EntityKind, ObstacleKind, PlanetKind, PlatformColor, StarKind};
pub use physics::{Integrator, KinematicState, MotionMode, RigidBody, integrate};
pub use state::{GameOverCause, GamePhase, GameResult, GameState, Hud, PlayerState};
pub use streaming::{decoration_management, platform_management};
pub use tick::{TickInput, tick};
pub use world::World;
