//! Built-in entity scripts

use crate::ecs::*;
use crate::settings::Settings;

pub fn script_system(world: &mut World, settings: &Settings) {
    for id in world.query_all(&[ComponentKind::Script]) {
        let Some(&script) = world.try_get::<Script>(id) else {
            continue;
        };
        match script {
            Script::ProjectileLifetime => projectile_lifetime(world, settings, id),
        }
    }
}

/// Remove bullets that stalled or flew off the playfield
fn projectile_lifetime(world: &mut World, settings: &Settings, id: EntityId) {
    let stalled = world
        .try_get::<Velocity>(id)
        .is_some_and(|v| v.0.length() < settings.bullet_stall_speed);
    let leaked = world
        .try_get::<Transform>(id)
        .is_some_and(|t| settings.is_leaked(t.position));

    if stalled || leaked {
        log::debug!("[{id}]: expired (stalled: {stalled}, leaked: {leaked})");
        world.destroy(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn;
    use glam::Vec2;

    #[test]
    fn test_leaked_bullet_is_removed() {
        let settings = Settings::default();
        let mut world = World::new();
        let inside =
            spawn::bullet(Vec2::new(-50.0, 100.0), Vec2::new(-1.1, 0.0), 5).spawn(&mut world);
        let leaked = spawn::bullet(
            Vec2::new(-settings.bullet_leak_margin - 1.0, 100.0),
            Vec2::new(-1.1, 0.0),
            5,
        )
        .spawn(&mut world);

        script_system(&mut world, &settings);

        assert!(world.is_alive(inside));
        assert!(!world.is_alive(leaked));
    }

    #[test]
    fn test_stalled_bullet_is_removed() {
        let settings = Settings::default();
        let mut world = World::new();
        let bullet = spawn::bullet(Vec2::new(100.0, 100.0), Vec2::ZERO, 5).spawn(&mut world);
        script_system(&mut world, &settings);
        assert!(!world.is_alive(bullet));
    }
}
