//! Entity builder
//!
//! Collects components before an entity exists so blueprints can be staged
//! (for example during level validation) and committed in one go.

use glam::Vec2;

use super::component::{ComponentKind, ComponentValue};
use super::components::*;
use super::{EntityId, World};

#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    components: Vec<ComponentValue>,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add any component
    pub fn with(mut self, component: impl Into<ComponentValue>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_transform(self, position: Vec2, rotation: f32) -> Self {
        self.with(Transform::at(position).with_rotation(rotation))
    }

    pub fn with_rect_collider(self, half_extents: Vec2) -> Self {
        self.with(Collider::rectangle(half_extents))
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        self.with(Velocity(velocity))
    }

    pub fn with_sprite(self, key: SpriteKey) -> Self {
        self.with(Sprite::new(key))
    }

    pub fn has_kind(&self, kind: ComponentKind) -> bool {
        self.components.iter().any(|c| c.kind() == kind)
    }

    pub fn components(&self) -> &[ComponentValue] {
        &self.components
    }

    /// Create the entity and register every staged component. Duplicate
    /// kinds are rejected by the world as usual.
    pub fn spawn(self, world: &mut World) -> EntityId {
        let id = world.create();
        for component in self.components {
            world.register_value(id, component);
        }
        id
    }
}
