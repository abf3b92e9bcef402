//! Velocity integration for bodies the rigidbody pass does not own
//!
//! Friction applies to everything except projectiles, solid bodies
//! included, so the player glides to a stop once input stops.

use crate::ecs::*;
use crate::settings::Settings;

/// Velocity multiplier for one frame of friction
#[inline]
pub fn friction_decay(settings: &Settings, dt_ms: f32) -> f32 {
    (-settings.friction_per_second * dt_ms / 1000.0).exp()
}

pub fn movement_system(world: &mut World, settings: &Settings, dt_ms: f32) {
    let decay = friction_decay(settings, dt_ms);
    for id in world.query_all(&[ComponentKind::Transform, ComponentKind::Velocity]) {
        let projectile = world.has::<Projectile>(id);
        let solid = world.has::<Rigidbody>(id);

        let Some(v) = world.try_get_mut::<Velocity>(id) else {
            continue;
        };
        if !projectile {
            v.0 *= decay;
        }
        let velocity = v.0;

        if !solid {
            if let Some(t) = world.try_get_mut::<Transform>(id) {
                t.position += velocity * dt_ms;
            }
        }
    }
}
