//! Entity Component System
//!
//! Entities are plain ids; each component kind lives in its own sparse set.
//! The [`World`] ties them together and adds the simulation clock and event
//! queue shared by every system.

pub mod builder;
pub mod component;
pub mod components;
pub mod entity;
pub mod world;

pub use builder::EntityBuilder;
pub use component::{Component, ComponentKind, ComponentStore, ComponentValue, SparseSet};
pub use components::*;
pub use entity::EntityId;
pub use world::World;
