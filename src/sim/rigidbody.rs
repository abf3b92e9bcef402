//! Solid body movement
//!
//! Moves every solid mover one axis at a time and pushes it back out of the
//! first solid neighbour it lands in. This is not a constraint solver: one
//! neighbour per axis per tick, found in ascending id order.

use super::rect::{OrientedRect, entity_bounds};
use crate::consts::MIN_RESOLVED_MOVEMENT;
use crate::ecs::*;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Integrate and resolve every `Rigidbody` mover that is not an obstacle
pub fn rigidbody_system(world: &mut World, settings: &Settings, dt_ms: f32) {
    let movers = world.query_all(&[
        ComponentKind::Rigidbody,
        ComponentKind::Transform,
        ComponentKind::Collider,
        ComponentKind::Velocity,
    ]);
    let solids = world.query_all(&[
        ComponentKind::Rigidbody,
        ComponentKind::Transform,
        ComponentKind::Collider,
    ]);

    for id in movers {
        if !world.is_alive(id) || world.has::<Obstacle>(id) {
            continue;
        }
        let Some(velocity) = world.try_get::<Velocity>(id).map(|v| v.0) else {
            continue;
        };
        let movement = velocity * dt_ms;
        for axis in [Axis::X, Axis::Y] {
            let delta = movement[axis.index()];
            if delta.abs() > MIN_RESOLVED_MOVEMENT {
                move_axis(world, settings, &solids, id, axis, delta);
            }
        }
    }
}

fn move_axis(
    world: &mut World,
    settings: &Settings,
    solids: &[EntityId],
    id: EntityId,
    axis: Axis,
    delta: f32,
) {
    let i = axis.index();
    if let Some(t) = world.try_get_mut::<Transform>(id) {
        t.position[i] += delta;
    }
    let Some(bounds) = entity_bounds(world, id) else {
        return;
    };
    let Some(neighbour) = first_overlap(world, solids, id, &bounds) else {
        return;
    };
    let Some(offset) = world.try_get::<Collider>(id).map(|c| c.offset[i]) else {
        return;
    };

    let half = bounds.aabb().half_size()[i];
    let wall = neighbour.aabb();
    let resolved = if delta > 0.0 {
        wall.min[i] - half - offset - settings.rigidbody_gap
    } else {
        wall.max[i] + half - offset + settings.rigidbody_gap
    };

    log::trace!("[{id}]: pushed out along {axis:?} to {resolved}");
    if let Some(t) = world.try_get_mut::<Transform>(id) {
        t.position[i] = resolved;
    }
    if let Some(v) = world.try_get_mut::<Velocity>(id) {
        v.0[i] = 0.0;
    }
}

/// First live solid other than `id` whose bounds intersect `bounds`
fn first_overlap(
    world: &World,
    solids: &[EntityId],
    id: EntityId,
    bounds: &OrientedRect,
) -> Option<OrientedRect> {
    solids
        .iter()
        .filter(|&&other| other != id && world.is_alive(other))
        .filter_map(|&other| entity_bounds(world, other))
        .find(|other| bounds.intersects(other))
}
