//! Enemy perception and behaviour
//!
//! Each enemy patrols its waypoints until it sees or hears the player, then
//! chases the last position it noticed the player at until the alert timer
//! runs out. The enemy only steers (sets velocity and facing); the
//! rigidbody pass does the moving.

use glam::Vec2;

use super::events::{self, GameEvent, SoundCue};
use super::rect::entity_bounds;
use crate::consts::ENEMY_STOP_DISTANCE;
use crate::ecs::*;
use crate::rotation_facing;
use crate::settings::Settings;

/// Whether any obstacle's axis-aligned bounds touch the segment `from-to`
pub fn line_of_sight_blocked(world: &World, from: Vec2, to: Vec2) -> bool {
    world
        .query(&[ComponentKind::Obstacle, ComponentKind::Transform, ComponentKind::Collider])
        .filter_map(|id| entity_bounds(world, id))
        .any(|bounds| bounds.aabb().intersects_segment(from, to))
}

/// Vision check: within radius, inside the cone and not blocked
pub fn can_see(world: &World, enemy: &Enemy, transform: &Transform, target: Vec2) -> bool {
    let to_target = target - transform.position;
    if to_target.length() > enemy.vision_radius {
        return false;
    }

    let direction = to_target.normalize_or_zero();
    // Standing on the same spot counts as in view
    if direction != Vec2::ZERO {
        let cos = transform.facing().dot(direction).clamp(-1.0, 1.0);
        if cos.acos().to_degrees() > enemy.vision_angle_deg / 2.0 {
            return false;
        }
    }

    !line_of_sight_blocked(world, transform.position, target)
}

pub fn can_hear(enemy: &Enemy, transform: &Transform, target: Vec2) -> bool {
    transform.position.distance(target) <= enemy.hear_radius
}

/// Enemy AI. Holds the player id between ticks and re-resolves it when the
/// cached one goes stale.
#[derive(Debug, Default)]
pub struct EnemySystem {
    player: Option<EntityId>,
}

impl EnemySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached player, e.g. after a level reload
    pub fn forget_player(&mut self) {
        self.player = None;
    }

    fn resolve_player(&mut self, world: &World) -> Option<EntityId> {
        let cached = self
            .player
            .filter(|&id| world.is_alive(id) && world.has::<Player>(id));
        if cached.is_none() {
            self.player = world
                .query(&[ComponentKind::Player, ComponentKind::Transform])
                .next();
            if let Some(id) = self.player {
                log::debug!("Enemies now tracking player {id}");
            }
            return self.player;
        }
        cached
    }

    pub fn update(&mut self, world: &mut World, settings: &Settings, dt_ms: f32) {
        for id in world.query_all(&[ComponentKind::Enemy, ComponentKind::Transform]) {
            if !world.is_alive(id) {
                continue;
            }
            let player = self.resolve_player(world);
            let player_pos = player
                .and_then(|p| world.try_get::<Transform>(p))
                .map(|t| t.position);

            self.think(world, settings, id, player_pos, dt_ms);

            if let (Some(player), Some(player_pos)) = (player, player_pos) {
                self.try_kill(world, settings, id, player, player_pos);
            }
        }
    }

    fn think(
        &self,
        world: &mut World,
        settings: &Settings,
        id: EntityId,
        player_pos: Option<Vec2>,
        dt_ms: f32,
    ) {
        let Some(&transform) = world.try_get::<Transform>(id) else {
            return;
        };
        let Some(mut enemy) = world.try_get::<Enemy>(id).cloned() else {
            return;
        };

        if enemy.is_alerted() {
            enemy.alert_timer_ms -= dt_ms;
            if enemy.alert_timer_ms <= 0.0 {
                log::debug!("[{id}]: lost the player, back to patrol");
                enemy.state = AwarenessState::Patrolling;
                enemy.last_known_player = None;
            }
        }

        if let Some(player_pos) = player_pos {
            let seen = can_see(world, &enemy, &transform, player_pos);
            let heard = can_hear(&enemy, &transform, player_pos);
            if seen || heard {
                if !enemy.is_alerted() {
                    log::debug!("[{id}]: alerted (seen: {seen}, heard: {heard})");
                    events::play(world, settings, SoundCue::Alarm);
                }
                enemy.state = AwarenessState::Alerted;
                enemy.alert_timer_ms = enemy.alert_duration_ms;
                enemy.last_known_player = Some(player_pos);
            }
        }

        let target = if enemy.is_alerted() {
            enemy.last_known_player
        } else {
            enemy.current_waypoint()
        };
        let speed = if enemy.is_alerted() {
            settings.enemy_pursuit_speed
        } else {
            settings.enemy_patrol_speed
        };

        let mut velocity = Vec2::ZERO;
        let mut rotation = transform.rotation;
        if let Some(target) = target {
            let to_target = target - transform.position;
            let distance = to_target.length();
            if distance > ENEMY_STOP_DISTANCE {
                velocity = to_target.normalize_or_zero() * speed;
                rotation = rotation_facing(to_target);
            }
            if !enemy.is_alerted() && distance < settings.enemy_arrival_radius {
                enemy.advance_waypoint();
            }
        }

        if let Some(v) = world.try_get_mut::<Velocity>(id) {
            v.0 = velocity;
        }
        if let Some(t) = world.try_get_mut::<Transform>(id) {
            t.rotation = rotation;
        }
        if let Some(e) = world.try_get_mut::<Enemy>(id) {
            *e = enemy;
        }
    }

    fn try_kill(
        &mut self,
        world: &mut World,
        settings: &Settings,
        id: EntityId,
        player: EntityId,
        player_pos: Vec2,
    ) {
        let Some(position) = world.try_get::<Transform>(id).map(|t| t.position) else {
            return;
        };
        if position.distance(player_pos) > settings.enemy_kill_radius {
            return;
        }

        log::info!("[{id}]: took down player {player}");
        world.destroy(player);
        self.player = None;
        events::play(world, settings, SoundCue::Explosion);
        world.emit(GameEvent::PlayerKilled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::{self, WallKind};

    fn settings() -> Settings {
        Settings::default()
    }

    /// Enemy at (400, 400) facing -Y
    fn enemy_at(world: &mut World, patrol: Vec<Vec2>) -> EntityId {
        spawn::enemy(Vec2::new(400.0, 400.0), 0.0, patrol, &settings()).spawn(world)
    }

    fn player_at(world: &mut World, pos: Vec2) -> EntityId {
        spawn::player(pos, 0.0, &settings()).spawn(world)
    }

    fn enemy_state(world: &World, id: EntityId) -> Enemy {
        world.get::<Enemy>(id).expect("enemy").clone()
    }

    fn sees(world: &World, enemy: EntityId, target: Vec2) -> bool {
        let e = world.get::<Enemy>(enemy).expect("enemy");
        let t = world.get::<Transform>(enemy).expect("transform");
        can_see(world, e, t, target)
    }

    #[test]
    fn test_vision_radius_boundary() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        let radius = settings().enemy_vision_radius;
        let eps = 0.01;

        // Straight ahead (facing -Y), no obstacles
        assert!(sees(&world, enemy, Vec2::new(400.0, 400.0 - (radius - eps))));
        assert!(!sees(&world, enemy, Vec2::new(400.0, 400.0 - (radius + eps))));
    }

    #[test]
    fn test_vision_cone() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        // 90 degree cone: 40 degrees off axis is visible, 50 is not
        let at = |deg: f32| {
            let r = deg.to_radians();
            Vec2::new(400.0 + 100.0 * r.sin(), 400.0 - 100.0 * r.cos())
        };
        assert!(sees(&world, enemy, at(40.0)));
        assert!(sees(&world, enemy, at(-40.0)));
        assert!(!sees(&world, enemy, at(50.0)));
        assert!(!sees(&world, enemy, Vec2::new(400.0, 500.0)));
        assert!(sees(&world, enemy, Vec2::new(400.0, 400.0)));
    }

    #[test]
    fn test_walls_block_sight() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        let target = Vec2::new(400.0, 200.0);
        assert!(sees(&world, enemy, target));

        spawn::wall(WallKind::Reflector, Vec2::new(400.0, 300.0), Vec2::new(50.0, 5.0), 0.0)
            .spawn(&mut world);
        assert!(!sees(&world, enemy, target));
        // A sight line passing beside the wall is clear
        assert!(sees(&world, enemy, Vec2::new(520.0, 200.0)));
    }

    #[test]
    fn test_later_obstacle_still_blocks() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        spawn::wall(WallKind::Solid, Vec2::new(900.0, 100.0), Vec2::splat(10.0), 0.0)
            .spawn(&mut world);
        spawn::wall(WallKind::Solid, Vec2::new(400.0, 300.0), Vec2::new(50.0, 5.0), 0.0)
            .spawn(&mut world);
        assert!(!sees(&world, enemy, Vec2::new(400.0, 200.0)));
    }

    #[test]
    fn test_hearing_alerts_from_behind() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        let player_pos = Vec2::new(400.0, 460.0);
        player_at(&mut world, player_pos);

        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);

        let state = enemy_state(&world, enemy);
        assert!(state.is_alerted());
        assert_eq!(state.last_known_player, Some(player_pos));
        assert_eq!(state.alert_timer_ms, settings().enemy_alert_duration_ms);
        assert_eq!(world.drain_events(), vec![GameEvent::Sound(SoundCue::Alarm)]);

        // Pursuit heads for the player
        let v = world.get::<Velocity>(enemy).expect("velocity").0;
        assert!((v - Vec2::new(0.0, settings().enemy_pursuit_speed)).length() < 1e-5);
    }

    #[test]
    fn test_alarm_only_on_first_detection() {
        let mut world = World::new();
        enemy_at(&mut world, Vec::new());
        player_at(&mut world, Vec2::new(400.0, 460.0));

        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(world.drain_events(), vec![GameEvent::Sound(SoundCue::Alarm)]);
    }

    #[test]
    fn test_alert_persists_until_timer_runs_out() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        let player = player_at(&mut world, Vec2::new(400.0, 460.0));
        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);

        // Out of earshot and beyond vision range
        world.get_mut::<Transform>(player).expect("transform").position = Vec2::new(400.0, 760.0);

        let step = settings().enemy_alert_duration_ms / 3.0;
        for _ in 0..2 {
            ai.update(&mut world, &settings(), step);
            let state = enemy_state(&world, enemy);
            assert!(state.is_alerted());
            assert_eq!(state.last_known_player, Some(Vec2::new(400.0, 460.0)));
        }

        ai.update(&mut world, &settings(), step);
        let state = enemy_state(&world, enemy);
        assert!(!state.is_alerted());
        assert_eq!(state.last_known_player, None);
    }

    #[test]
    fn test_patrol_walks_and_cycles_waypoints() {
        let mut world = World::new();
        let points = vec![Vec2::new(400.0, 300.0), Vec2::new(405.0, 400.0)];
        let enemy = enemy_at(&mut world, points);
        let mut ai = EnemySystem::new();

        ai.update(&mut world, &settings(), 16.0);
        let v = world.get::<Velocity>(enemy).expect("velocity").0;
        assert!((v - Vec2::new(0.0, -settings().enemy_patrol_speed)).length() < 1e-5);
        assert_eq!(enemy_state(&world, enemy).current_point, 0);

        // Arrive at the first waypoint
        world.get_mut::<Transform>(enemy).expect("transform").position = Vec2::new(400.0, 305.0);
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(enemy_state(&world, enemy).current_point, 1);

        world.get_mut::<Transform>(enemy).expect("transform").position = Vec2::new(405.0, 398.0);
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(enemy_state(&world, enemy).current_point, 0);
    }

    #[test]
    fn test_no_waypoints_is_inert() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        world.get_mut::<Velocity>(enemy).expect("velocity").0 = Vec2::new(1.0, 1.0);
        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(world.get::<Velocity>(enemy).map(|v| v.0), Ok(Vec2::ZERO));
    }

    #[test]
    fn test_kill_radius_takes_player_down() {
        let mut world = World::new();
        enemy_at(&mut world, Vec::new());
        let player = player_at(&mut world, Vec2::new(400.0, 427.0));
        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);

        assert!(!world.is_alive(player));
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::PlayerKilled));
        assert!(events.contains(&GameEvent::Sound(SoundCue::Explosion)));
    }

    #[test]
    fn test_stale_player_is_re_resolved() {
        let mut world = World::new();
        let enemy = enemy_at(&mut world, Vec::new());
        let first = player_at(&mut world, Vec2::new(400.0, 700.0));
        let mut ai = EnemySystem::new();
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(ai.player, Some(first));

        world.destroy(first);
        let second = player_at(&mut world, Vec2::new(400.0, 460.0));
        ai.update(&mut world, &settings(), 16.0);
        assert_eq!(ai.player, Some(second));
        assert!(enemy_state(&world, enemy).is_alerted());
    }
}
