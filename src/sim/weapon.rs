//! Guns and bullets
//!
//! The gun system turns shoot requests into bullets; the projectile
//! response decides what a bullet does to whatever it touches.

use glam::Vec2;

use super::collision::CollisionEvent;
use super::events::{self, GameEvent, SoundCue};
use super::rect::{Aabb, entity_bounds};
use super::spawn;
use crate::ecs::*;
use crate::rotation_facing;
use crate::settings::Settings;

/// Reflect velocity off a surface: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Axis speeds below this can't have carried the bullet through a face
const MIN_AXIS_SPEED: f32 = 1e-4;

/// Axis-aligned wall normal from the smaller penetration depth
///
/// Depth on each axis the bullet moves along is measured from the face it
/// came in through, so a bullet mostly through a thin wall still reports that
/// face rather than the far one. Returns the unit normal, which always
/// opposes the velocity, and the depth along it (negative while the boxes are
/// still apart on that axis). `None` for a bullet at rest.
pub fn wall_normal(bullet: &Aabb, wall: &Aabb, velocity: Vec2) -> Option<(Vec2, f32)> {
    let mut entry: Option<(Vec2, f32)> = None;
    for axis in 0..2 {
        let speed = velocity[axis];
        if speed.abs() < MIN_AXIS_SPEED {
            continue;
        }
        let (sign, depth) = if speed > 0.0 {
            (-1.0, bullet.max[axis] - wall.min[axis])
        } else {
            (1.0, wall.max[axis] - bullet.min[axis])
        };
        if entry.is_none_or(|(_, best)| depth < best) {
            let mut normal = Vec2::ZERO;
            normal[axis] = sign;
            entry = Some((normal, depth));
        }
    }
    entry
}

/// Whether the boxes are apart on some axis and the bullet moves further
/// apart along it
pub fn is_receding(bullet: &Aabb, wall: &Aabb, velocity: Vec2) -> bool {
    let overlap = bullet.overlap(wall);
    let away = bullet.center() - wall.center();
    (0..2).any(|axis| overlap[axis] < 0.0 && velocity[axis] * away[axis] >= 0.0)
}

/// Fire every gun with a pending request whose cooldown has elapsed
pub fn gun_system(world: &mut World, settings: &Settings) {
    let now = world.now_ms();
    for id in world.query_all(&[ComponentKind::Gun, ComponentKind::Transform]) {
        let Some(gun) = world.try_get_mut::<Gun>(id) else {
            continue;
        };
        if !gun.shoot_requested {
            continue;
        }
        gun.shoot_requested = false;

        if gun.ammo == 0 {
            log::debug!("[{id}]: out of ammo");
            continue;
        }
        if !gun.is_ready(now) {
            continue;
        }
        gun.ammo -= 1;
        gun.last_shot_ms = Some(now);
        let ricochets = gun.bullet_ricochets;

        let Some(&transform) = world.try_get::<Transform>(id) else {
            continue;
        };
        let facing = transform.facing();
        let bullet = spawn::bullet(
            transform.position + facing * settings.bullet_spawn_offset,
            facing * settings.bullet_speed,
            ricochets,
        )
        .spawn(world);

        log::debug!("[{id}]: fired {bullet}");
        events::play(world, settings, SoundCue::Shoot);
    }
}

/// Response for entities carrying `ColliderResponse::Projectile`
pub fn on_projectile_collision(world: &mut World, settings: &Settings, event: &CollisionEvent) {
    let (bullet, target) = (event.source, event.target);

    if let Some(&obstacle) = world.try_get::<Obstacle>(target) {
        hit_obstacle(world, settings, bullet, target, obstacle);
    } else if world.has::<Enemy>(target) {
        log::debug!("[{bullet}]: hit enemy {target}");
        world.destroy(target);
        world.destroy(bullet);
        events::play(world, settings, SoundCue::Hit);
        world.emit(GameEvent::EnemyKilled);
    } else if world.has::<Player>(target) {
        pick_up(world, settings, bullet, target);
    }
}

fn hit_obstacle(
    world: &mut World,
    settings: &Settings,
    bullet: EntityId,
    wall: EntityId,
    obstacle: Obstacle,
) {
    let wall_box = entity_bounds(world, wall).map(|r| r.aabb());

    if obstacle.breakable {
        log::debug!("[{bullet}]: broke {wall}");
        world.destroy(wall);
        events::play(world, settings, SoundCue::Explosion);
    }

    match obstacle.policy {
        BulletPolicy::Reflect => {
            if let Some(wall_box) = wall_box {
                ricochet(world, settings, bullet, &wall_box);
            }
        }
        BulletPolicy::Absorb => {
            world.destroy(bullet);
            events::play(world, settings, SoundCue::Hit);
        }
        BulletPolicy::PassThrough => {}
    }
}

fn ricochet(world: &mut World, settings: &Settings, bullet: EntityId, wall_box: &Aabb) {
    let Some(bullet_box) = entity_bounds(world, bullet).map(|r| r.aabb()) else {
        return;
    };
    let Some(velocity) = world.try_get::<Velocity>(bullet).map(|v| v.0) else {
        return;
    };

    // Already leaving this wall, e.g. a second contact in the same frame
    if is_receding(&bullet_box, wall_box, velocity) {
        return;
    }
    let Some((normal, penetration)) = wall_normal(&bullet_box, wall_box, velocity) else {
        return;
    };

    let Some(projectile) = world.try_get_mut::<Projectile>(bullet) else {
        return;
    };
    projectile.ricochets += 1;
    if projectile.ricochets > projectile.max_ricochets {
        log::debug!("[{bullet}]: out of ricochets");
        world.destroy(bullet);
        return;
    }

    let speed = velocity.length();
    let reflected = reflect_velocity(velocity, normal).normalize_or_zero() * speed;
    if let Some(v) = world.try_get_mut::<Velocity>(bullet) {
        v.0 = reflected;
    }
    if let Some(t) = world.try_get_mut::<Transform>(bullet) {
        if penetration > 0.0 {
            t.position += normal * (penetration + settings.rigidbody_gap);
        }
        t.rotation = rotation_facing(reflected);
    }
    events::play(world, settings, SoundCue::Ricochet);
}

/// Bullet returns to the player's gun
fn pick_up(world: &mut World, settings: &Settings, bullet: EntityId, player: EntityId) {
    let Some(gun) = world.try_get_mut::<Gun>(player) else {
        return;
    };
    gun.ammo = (gun.ammo + 1).min(gun.max_ammo);
    world.destroy(bullet);
    events::play(world, settings, SoundCue::Pickup);
    world.emit(GameEvent::AmmoPickedUp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::collision_system;
    use crate::sim::spawn::WallKind;

    const DT: f32 = 16.0;

    fn settings() -> Settings {
        Settings::default()
    }

    fn armed_player(world: &mut World, ammo: u32) -> EntityId {
        let id = spawn::player(Vec2::new(500.0, 500.0), 0.0, &settings()).spawn(world);
        if let Some(gun) = world.try_get_mut::<Gun>(id) {
            gun.ammo = ammo;
        }
        id
    }

    fn bullets(world: &World) -> Vec<EntityId> {
        world.query_all(&[ComponentKind::Projectile])
    }

    /// Bullet at (100, 100) heading right into a wall just ahead
    fn bullet_into_wall(
        world: &mut World,
        kind: WallKind,
        max_ricochets: u32,
    ) -> (EntityId, EntityId) {
        let bullet = spawn::bullet(Vec2::new(100.0, 100.0), Vec2::new(1.1, 0.0), max_ricochets)
            .spawn(world);
        let wall =
            spawn::wall(kind, Vec2::new(125.0, 100.0), Vec2::new(10.0, 40.0), 0.0).spawn(world);
        (bullet, wall)
    }

    fn aabb(min: (f32, f32), max: (f32, f32)) -> Aabb {
        Aabb {
            min: Vec2::new(min.0, min.1),
            max: Vec2::new(max.0, max.1),
        }
    }

    #[test]
    fn test_wall_normal_uses_entry_face() {
        let bullet = aabb((8.0, 0.0), (12.0, 10.0));
        let wall = aabb((10.0, -50.0), (30.0, 50.0));

        let hit = wall_normal(&bullet, &wall, Vec2::new(1.0, 0.0));
        assert_eq!(hit, Some((Vec2::new(-1.0, 0.0), 2.0)));

        // Moving diagonally it still came in through the left face
        let hit = wall_normal(&bullet, &wall, Vec2::new(1.0, 1.0));
        assert_eq!(hit.map(|(n, _)| n), Some(Vec2::new(-1.0, 0.0)));

        assert_eq!(wall_normal(&bullet, &wall, Vec2::ZERO), None);
    }

    #[test]
    fn test_wall_normal_bullet_mostly_through_thin_wall() {
        // Centre already past the wall centre, heading left
        let bullet = aabb((-14.9, 357.0), (9.1, 363.0));
        let wall = aabb((0.0, 20.0), (20.0, 700.0));
        let (normal, depth) = wall_normal(&bullet, &wall, Vec2::new(-1.1, 0.0)).expect("moving");
        assert_eq!(normal, Vec2::new(1.0, 0.0));
        assert!((depth - 34.9).abs() < 1e-4);
    }

    #[test]
    fn test_receding_only_when_apart_and_moving_away() {
        let wall = aabb((0.0, 0.0), (20.0, 100.0));
        let outside = aabb((20.1, 40.0), (44.1, 46.0));
        assert!(is_receding(&outside, &wall, Vec2::new(1.1, 0.0)));
        assert!(!is_receding(&outside, &wall, Vec2::new(-1.1, 0.0)));

        let inside = aabb((-4.0, 40.0), (20.0, 46.0));
        assert!(!is_receding(&inside, &wall, Vec2::new(-1.1, 0.0)));
    }

    #[test]
    fn test_reflect_velocity() {
        let v = reflect_velocity(Vec2::new(1.0, -1.0), Vec2::Y);
        assert_eq!(v, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_shoot_spends_ammo_and_spawns_one_bullet() {
        let mut world = World::new();
        let player = armed_player(&mut world, 10);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;

        gun_system(&mut world, &settings());

        let gun = world.get::<Gun>(player).expect("gun");
        assert_eq!(gun.ammo, 9);
        assert!(!gun.shoot_requested);
        assert_eq!(bullets(&world).len(), 1);

        let bullet = bullets(&world)[0];
        let t = world.get::<Transform>(bullet).expect("transform");
        // Facing -Y from (500, 500)
        assert!((t.position - Vec2::new(500.0, 465.0)).length() < 1e-3);
        let v = world.get::<Velocity>(bullet).expect("velocity").0;
        assert!((v - Vec2::new(0.0, -1.1)).length() < 1e-5);
        assert_eq!(
            world.drain_events(),
            vec![GameEvent::Sound(SoundCue::Shoot)]
        );
    }

    #[test]
    fn test_cooldown_drops_request() {
        let mut world = World::new();
        let player = armed_player(&mut world, 10);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;
        gun_system(&mut world, &settings());

        world.advance_clock(50.0);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;
        gun_system(&mut world, &settings());

        let gun = world.get::<Gun>(player).expect("gun");
        assert_eq!(gun.ammo, 9);
        assert!(!gun.shoot_requested);
        assert_eq!(bullets(&world).len(), 1);

        world.advance_clock(50.0);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;
        gun_system(&mut world, &settings());
        assert_eq!(bullets(&world).len(), 2);
    }

    #[test]
    fn test_empty_gun_does_not_fire() {
        let mut world = World::new();
        let player = armed_player(&mut world, 0);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;
        gun_system(&mut world, &settings());

        assert!(bullets(&world).is_empty());
        assert!(!world.get::<Gun>(player).expect("gun").shoot_requested);
    }

    #[test]
    fn test_reflector_bounces_bullet() {
        let mut world = World::new();
        let (bullet, wall) = bullet_into_wall(&mut world, WallKind::Reflector, 5);

        collision_system(&mut world, &settings(), DT);

        assert!(world.is_alive(bullet));
        assert!(world.is_alive(wall));
        let v = world.get::<Velocity>(bullet).expect("velocity").0;
        assert!((v - Vec2::new(-1.1, 0.0)).length() < 1e-5);
        assert_eq!(world.get::<Projectile>(bullet).map(|p| p.ricochets), Ok(1));
        let t = world.get::<Transform>(bullet).expect("transform");
        assert!((t.facing() - Vec2::new(-1.0, 0.0)).length() < 1e-5);
        assert!(
            world
                .drain_events()
                .contains(&GameEvent::Sound(SoundCue::Ricochet))
        );
    }

    #[test]
    fn test_bullet_dies_on_ricochet_past_budget() {
        let mut world = World::new();
        let (bullet, _) = bullet_into_wall(&mut world, WallKind::Reflector, 2);
        for _ in 0..2 {
            collision_system(&mut world, &settings(), DT);
            assert!(world.is_alive(bullet));
            // Turn it back towards the wall for another hit
            if let Some(v) = world.try_get_mut::<Velocity>(bullet) {
                v.0 = Vec2::new(1.1, 0.0);
            }
        }
        collision_system(&mut world, &settings(), DT);
        assert!(!world.is_alive(bullet));
    }

    #[test]
    fn test_zero_ricochet_budget_dies_on_first_reflector() {
        let mut world = World::new();
        let (bullet, wall) = bullet_into_wall(&mut world, WallKind::Reflector, 0);
        collision_system(&mut world, &settings(), DT);
        assert!(!world.is_alive(bullet));
        assert!(world.is_alive(wall));
    }

    #[test]
    fn test_absorbing_wall_destroys_bullet() {
        let mut world = World::new();
        let (bullet, wall) = bullet_into_wall(&mut world, WallKind::Solid, 5);
        collision_system(&mut world, &settings(), DT);
        assert!(!world.is_alive(bullet));
        assert!(world.is_alive(wall));
        assert_eq!(world.drain_events(), vec![GameEvent::Sound(SoundCue::Hit)]);
    }

    #[test]
    fn test_breakable_wall_is_destroyed() {
        let mut world = World::new();
        let (bullet, wall) = bullet_into_wall(&mut world, WallKind::PassBreakable, 5);
        collision_system(&mut world, &settings(), DT);
        assert!(!world.is_alive(wall));
        assert!(world.is_alive(bullet));
        let v = world.get::<Velocity>(bullet).expect("velocity").0;
        assert_eq!(v, Vec2::new(1.1, 0.0));
        assert!(
            world
                .drain_events()
                .contains(&GameEvent::Sound(SoundCue::Explosion))
        );
    }

    #[test]
    fn test_reflector_breakable_breaks_and_bounces() {
        let mut world = World::new();
        let (bullet, wall) = bullet_into_wall(&mut world, WallKind::ReflectorBreakable, 5);
        collision_system(&mut world, &settings(), DT);
        assert!(!world.is_alive(wall));
        assert!(world.is_alive(bullet));
        let v = world.get::<Velocity>(bullet).expect("velocity").0;
        assert!(v.x < 0.0);
    }

    #[test]
    fn test_absorb_breakable_takes_bullet_with_spent_budget() {
        for spent in [1, 2] {
            let mut world = World::new();
            let (bullet, wall) = bullet_into_wall(&mut world, WallKind::AbsorbBreakable, 2);
            if let Some(p) = world.try_get_mut::<Projectile>(bullet) {
                p.ricochets = spent;
            }

            collision_system(&mut world, &settings(), DT);

            assert!(!world.is_alive(wall));
            assert!(!world.is_alive(bullet));
            let events = world.drain_events();
            assert!(events.contains(&GameEvent::Sound(SoundCue::Explosion)));
            assert!(events.contains(&GameEvent::Sound(SoundCue::Hit)));
            assert!(!events.contains(&GameEvent::Sound(SoundCue::Ricochet)));
        }
    }

    #[test]
    fn test_point_blank_shot_into_reflector_bounces_back() {
        let mut world = World::new();
        let facing_left = -std::f32::consts::FRAC_PI_2;
        let player =
            spawn::player(Vec2::new(32.1, 360.0), facing_left, &settings()).spawn(&mut world);
        let wall = spawn::wall(
            WallKind::Reflector,
            Vec2::new(10.0, 360.0),
            Vec2::new(10.0, 340.0),
            0.0,
        )
        .spawn(&mut world);
        world.get_mut::<Gun>(player).expect("gun").shoot_requested = true;

        gun_system(&mut world, &settings());
        let bullet = bullets(&world)[0];
        // Spawned with most of its body already inside the wall
        let spawned = entity_bounds(&world, bullet).expect("bounds").aabb();
        assert!(spawned.center().x < 10.0);

        collision_system(&mut world, &settings(), DT);

        assert!(world.is_alive(wall));
        assert!(world.is_alive(bullet));
        let v = world.get::<Velocity>(bullet).expect("velocity").0;
        assert!(v.x > 1.0);
        assert_eq!(world.get::<Projectile>(bullet).map(|p| p.ricochets), Ok(1));

        let bullet_box = entity_bounds(&world, bullet).expect("bounds").aabb();
        let wall_box = entity_bounds(&world, wall).expect("bounds").aabb();
        assert!(bullet_box.overlap(&wall_box).x < 0.0);
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut world = World::new();
        let bullet =
            spawn::bullet(Vec2::new(100.0, 100.0), Vec2::new(1.1, 0.0), 5).spawn(&mut world);
        let enemy =
            spawn::enemy(Vec2::new(120.0, 100.0), 0.0, Vec::new(), &settings()).spawn(&mut world);

        collision_system(&mut world, &settings(), DT);

        assert!(!world.is_alive(bullet));
        assert!(!world.is_alive(enemy));
        assert!(world.drain_events().contains(&GameEvent::EnemyKilled));
    }

    #[test]
    fn test_player_picks_up_bullet() {
        let mut world = World::new();
        let player = armed_player(&mut world, 3);
        let bullet =
            spawn::bullet(Vec2::new(500.0, 520.0), Vec2::new(0.0, -1.1), 5).spawn(&mut world);

        collision_system(&mut world, &settings(), DT);

        assert!(!world.is_alive(bullet));
        assert_eq!(world.get::<Gun>(player).map(|g| g.ammo), Ok(4));
        assert!(world.drain_events().contains(&GameEvent::AmmoPickedUp));
    }

    #[test]
    fn test_pickup_caps_at_max_ammo() {
        let mut world = World::new();
        let max = settings().player_max_ammo;
        let player = armed_player(&mut world, max);
        spawn::bullet(Vec2::new(500.0, 520.0), Vec2::new(0.0, -1.1), 5).spawn(&mut world);

        collision_system(&mut world, &settings(), DT);
        assert_eq!(world.get::<Gun>(player).map(|g| g.ammo), Ok(max));
    }
}
