//! Component kinds
//!
//! Plain data only. Behaviour lives in the `sim` systems that query for
//! these.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Position, orientation and draw order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec2,
    /// Render scale; collider bounds ignore it
    pub scale: Vec2,
    /// Draw layer (higher draws on top)
    pub layer: i32,
    /// Radians, 0 faces -Y
    pub rotation: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            layer: 0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Unit vector this transform faces
    pub fn facing(&self) -> Vec2 {
        crate::facing_direction(self.rotation)
    }
}

/// Collider shape discriminator. Only rectangles take part in collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColliderShape {
    #[default]
    Rectangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub half_extents: Vec2,
    /// Local offset of the collider centre from the transform position
    pub offset: Vec2,
}

impl Collider {
    pub fn rectangle(half_extents: Vec2) -> Self {
        Self {
            shape: ColliderShape::Rectangle,
            half_extents,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// Linear velocity in world units per millisecond
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

/// Marks a solid body that gets pushed out of other solid bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rigidbody;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Projectile {
    pub ricochets: u32,
    pub max_ricochets: u32,
}

impl Projectile {
    pub fn new(max_ricochets: u32) -> Self {
        Self {
            ricochets: 0,
            max_ricochets,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gun {
    pub max_ammo: u32,
    pub ammo: u32,
    /// Set by input, cleared by the weapon system whether or not it fired
    pub shoot_requested: bool,
    pub shoot_delay_ms: f64,
    /// Clock time of the last shot; `None` until the first one
    pub last_shot_ms: Option<f64>,
    /// Ricochet budget handed to spawned bullets
    pub bullet_ricochets: u32,
}

impl Gun {
    pub fn new(max_ammo: u32, shoot_delay_ms: f64, bullet_ricochets: u32) -> Self {
        Self {
            max_ammo,
            ammo: max_ammo,
            shoot_requested: false,
            shoot_delay_ms,
            last_shot_ms: None,
            bullet_ricochets,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.player_max_ammo,
            settings.player_shoot_delay_ms,
            settings.player_bullet_ricochets,
        )
    }

    /// Whether the cooldown has elapsed at clock time `now_ms`
    pub fn is_ready(&self, now_ms: f64) -> bool {
        match self.last_shot_ms {
            Some(last) => last + self.shoot_delay_ms <= now_ms,
            None => true,
        }
    }
}

/// What happens to a bullet that touches an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletPolicy {
    Reflect,
    Absorb,
    PassThrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub policy: BulletPolicy,
    /// Destroyed by the first bullet that touches it, whatever the policy
    pub breakable: bool,
}

impl Obstacle {
    pub fn new(policy: BulletPolicy, breakable: bool) -> Self {
        Self { policy, breakable }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AwarenessState {
    #[default]
    Patrolling,
    Alerted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub patrol_points: Vec<Vec2>,
    pub current_point: usize,
    pub hear_radius: f32,
    pub vision_radius: f32,
    /// Full cone in degrees; half of it either side of the facing
    pub vision_angle_deg: f32,
    pub state: AwarenessState,
    /// Remaining alert time (ms)
    pub alert_timer_ms: f32,
    pub alert_duration_ms: f32,
    pub last_known_player: Option<Vec2>,
}

impl Enemy {
    pub fn new(patrol_points: Vec<Vec2>, settings: &Settings) -> Self {
        Self {
            patrol_points,
            current_point: 0,
            hear_radius: settings.enemy_hear_radius,
            vision_radius: settings.enemy_vision_radius,
            vision_angle_deg: settings.enemy_vision_angle_deg,
            state: AwarenessState::Patrolling,
            alert_timer_ms: 0.0,
            alert_duration_ms: settings.enemy_alert_duration_ms,
            last_known_player: None,
        }
    }

    pub fn is_alerted(&self) -> bool {
        self.state == AwarenessState::Alerted
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.patrol_points.get(self.current_point).copied()
    }

    /// Advance to the next waypoint, wrapping around
    pub fn advance_waypoint(&mut self) {
        if !self.patrol_points.is_empty() {
            self.current_point = (self.current_point + 1) % self.patrol_points.len();
        }
    }
}

/// Collision response policy, dispatched by the collision system after
/// detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderResponse {
    /// Bullet behaviour: ricochet, absorb, break walls, hit enemies, pickup
    Projectile,
    /// Completes the level when the player touches it
    DoorTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Door;

/// Texture keys understood by the renderer collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKey {
    Player,
    Bullet,
    Enemy,
    SolidWall,
    ReflectorWall,
    BreakableWall,
    Door,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub key: SpriteKey,
    /// 0xRRGGBBAA
    pub tint: u32,
}

impl Sprite {
    pub const WHITE: u32 = 0xFFFF_FFFF;

    pub fn new(key: SpriteKey) -> Self {
        Self {
            key,
            tint: Self::WHITE,
        }
    }

    pub fn tinted(key: SpriteKey, tint: u32) -> Self {
        Self { key, tint }
    }
}

/// Built-in per-entity behaviour run by the script system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Removes a bullet once it stalls or leaks past the playfield margin
    ProjectileLifetime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gun_cooldown() {
        let mut gun = Gun::new(10, 100.0, 5);
        assert!(gun.is_ready(0.0));
        gun.last_shot_ms = Some(50.0);
        assert!(!gun.is_ready(149.0));
        assert!(gun.is_ready(150.0));
    }

    #[test]
    fn test_enemy_waypoints_wrap() {
        let points = vec![Vec2::ZERO, Vec2::X, Vec2::Y];
        let mut enemy = Enemy::new(points, &Settings::default());
        enemy.advance_waypoint();
        enemy.advance_waypoint();
        assert_eq!(enemy.current_waypoint(), Some(Vec2::Y));
        enemy.advance_waypoint();
        assert_eq!(enemy.current_waypoint(), Some(Vec2::ZERO));
    }

    #[test]
    fn test_enemy_without_waypoints() {
        let mut enemy = Enemy::new(Vec::new(), &Settings::default());
        enemy.advance_waypoint();
        assert_eq!(enemy.current_waypoint(), None);
        assert!(!enemy.is_alerted());
    }

    #[test]
    fn test_transform_facing() {
        let t = Transform::at(Vec2::new(5.0, 5.0));
        assert!((t.facing() - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }
}
