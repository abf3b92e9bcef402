//! Player input

use glam::Vec2;

use super::tick::TickInput;
use crate::ecs::*;
use crate::rotation_facing;
use crate::settings::Settings;

/// Apply one tick of input to every player entity
///
/// Movement overrides the player's velocity only while a direction is held;
/// friction brings it to rest otherwise.
pub fn control_system(world: &mut World, settings: &Settings, input: &TickInput) {
    let direction = input.move_dir.normalize_or_zero();

    for id in world.query_all(&[ComponentKind::Player, ComponentKind::Transform]) {
        if direction != Vec2::ZERO {
            if let Some(v) = world.try_get_mut::<Velocity>(id) {
                v.0 = direction * settings.player_speed;
            }
        }

        if let Some(aim) = input.aim {
            if let Some(t) = world.try_get_mut::<Transform>(id) {
                let to_aim = aim - t.position;
                if to_aim != Vec2::ZERO {
                    t.rotation = rotation_facing(to_aim);
                }
            }
        }

        if input.shoot {
            match world.try_get_mut::<Gun>(id) {
                Some(gun) => gun.shoot_requested = true,
                None => log::debug!("[{id}]: shoot ignored, player has no gun"),
            }
        }
    }
}
