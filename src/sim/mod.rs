//! Simulation systems
//!
//! Every system is a plain function (or, for the enemy AI, a small struct)
//! that takes the [`World`](crate::World) explicitly:
//! - Single-threaded, one tick per frame
//! - Iterates id snapshots in ascending order
//! - Skips entities destroyed earlier in the same pass

pub mod collision;
pub mod control;
pub mod door;
pub mod enemy;
pub mod events;
pub mod movement;
pub mod rect;
pub mod rigidbody;
pub mod script;
pub mod spawn;
pub mod tick;
pub mod weapon;

pub use collision::{CollisionEvent, collision_system, detect_collisions, dispatch_collisions};
pub use enemy::EnemySystem;
pub use events::{GameEvent, SoundCue};
pub use rect::{Aabb, OrientedRect};
pub use tick::{GamePhase, Simulation, TickInput};
