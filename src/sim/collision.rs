//! Collision detection and response dispatch
//!
//! Every collider pair is tested with a sub-stepped sweep of both
//! rectangles along their velocities. Hits become [`CollisionEvent`]s for
//! each side that owns a [`ColliderResponse`]; the queue is dispatched only
//! after the whole pass so handlers never observe a half-checked frame.

use glam::Vec2;

use super::rect::OrientedRect;
use super::{door, weapon};
use crate::ecs::{
    Collider, ColliderResponse, ColliderShape, ComponentKind, EntityId, Velocity, World,
};
use crate::settings::Settings;

/// One side of a detected overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Entity whose response handles this event
    pub source: EntityId,
    pub target: EntityId,
    /// First edge crossing, `None` when one rectangle contains the other
    pub contact: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
struct SweptCollider {
    id: EntityId,
    rect: OrientedRect,
    velocity: Vec2,
    responds: bool,
}

/// Sample both rectangles along their motion and return the first
/// overlapping pair of samples
///
/// Sample `step` (for `step in 0..substeps`) advances each rectangle by
/// `velocity * (dt_ms / substeps) * step`, so step 0 is the current pose.
pub fn swept_overlap(
    a: &OrientedRect,
    a_velocity: Vec2,
    b: &OrientedRect,
    b_velocity: Vec2,
    dt_ms: f32,
    substeps: u32,
) -> Option<(OrientedRect, OrientedRect)> {
    let substeps = substeps.max(1);
    let step_dt = dt_ms / substeps as f32;
    (0..substeps).find_map(|step| {
        let t = step_dt * step as f32;
        let a_step = a.translated(a_velocity * t);
        let b_step = b.translated(b_velocity * t);
        a_step.intersects(&b_step).then_some((a_step, b_step))
    })
}

/// Run the detection pass and return the queued events in pair order
pub fn detect_collisions(world: &World, settings: &Settings, dt_ms: f32) -> Vec<CollisionEvent> {
    let colliders: Vec<SweptCollider> = world
        .query(&[ComponentKind::Transform, ComponentKind::Collider])
        .filter_map(|id| {
            let collider = world.try_get::<Collider>(id)?;
            if collider.shape != ColliderShape::Rectangle {
                return None;
            }
            Some(SweptCollider {
                id,
                rect: super::rect::entity_bounds(world, id)?,
                velocity: world.try_get::<Velocity>(id).map_or(Vec2::ZERO, |v| v.0),
                responds: world.has::<ColliderResponse>(id),
            })
        })
        .collect();

    let mut events = Vec::new();
    for (i, a) in colliders.iter().enumerate() {
        for b in &colliders[i + 1..] {
            if !a.responds && !b.responds {
                continue;
            }
            let Some((a_rect, b_rect)) = swept_overlap(
                &a.rect,
                a.velocity,
                &b.rect,
                b.velocity,
                dt_ms,
                settings.collision_substeps,
            ) else {
                continue;
            };

            if a.responds {
                events.push(CollisionEvent {
                    source: a.id,
                    target: b.id,
                    contact: a_rect.contact_point(&b_rect),
                });
            }
            if b.responds {
                events.push(CollisionEvent {
                    source: b.id,
                    target: a.id,
                    contact: b_rect.contact_point(&a_rect),
                });
            }
        }
    }
    events
}

/// Hand each event to its source's response. Events whose source or
/// target died earlier in the queue are dropped.
pub fn dispatch_collisions(world: &mut World, settings: &Settings, events: &[CollisionEvent]) {
    for event in events {
        if !world.is_alive(event.source) || !world.is_alive(event.target) {
            log::trace!(
                "[{}]: skipping collision with {}, an entity is gone",
                event.source,
                event.target
            );
            continue;
        }
        match world.try_get::<ColliderResponse>(event.source).copied() {
            Some(ColliderResponse::Projectile) => {
                weapon::on_projectile_collision(world, settings, event)
            }
            Some(ColliderResponse::DoorTrigger) => door::on_door_collision(world, settings, event),
            None => {}
        }
    }
}

/// Detect then dispatch
pub fn collision_system(world: &mut World, settings: &Settings, dt_ms: f32) {
    let events = detect_collisions(world, settings, dt_ms);
    if !events.is_empty() {
        log::trace!("{} collision events this tick", events.len());
    }
    dispatch_collisions(world, settings, &events);
}
