//! Recon Rico - top-down arena shooter simulation
//!
//! Core modules:
//! - `ecs`: Entity registry and per-kind component storage
//! - `sim`: Per-frame simulation (collisions, rigidbodies, weapons, enemy AI)
//! - `level`: Level descriptions and staged loading
//! - `settings`: Data-driven tuning

pub mod ecs;
pub mod error;
pub mod level;
pub mod settings;
pub mod sim;

pub use ecs::{EntityId, World};
pub use error::{LevelError, SettingsError, WorldError};
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield size in world units (one unit per pixel at 1280x720)
    pub const PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Nominal frame length for the headless runner (ms)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;

    /// Collision sweep samples per frame
    pub const COLLISION_SUBSTEPS: u32 = 4;
    /// Gap left between a rigidbody and the neighbour it was pushed out of
    pub const RIGIDBODY_GAP: f32 = 0.1;
    /// Movement below this (per axis, per tick) is not resolved
    pub const MIN_RESOLVED_MOVEMENT: f32 = 0.001;

    /// Bullet defaults (velocity is world units per millisecond)
    pub const BULLET_SPEED: f32 = 1.1;
    pub const BULLET_SPAWN_OFFSET: f32 = 35.0;
    pub const BULLET_HALF_EXTENTS: (f32, f32) = (3.0, 12.0);
    /// Bullets this far outside the playfield are removed
    pub const BULLET_LEAK_MARGIN: f32 = 200.0;
    /// Bullets slower than this are considered spent
    pub const BULLET_STALL_SPEED: f32 = 0.01;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 0.25;
    pub const PLAYER_HALF_EXTENTS: (f32, f32) = (12.0, 12.0);
    pub const PLAYER_MAX_AMMO: u32 = 20;
    pub const PLAYER_SHOOT_DELAY_MS: f64 = 100.0;
    pub const PLAYER_BULLET_RICOCHETS: u32 = 5;
    /// Velocity decay rate for non-projectiles (per second)
    pub const FRICTION_PER_SECOND: f32 = 12.0;

    /// Enemy defaults
    pub const ENEMY_HALF_EXTENTS: (f32, f32) = (14.0, 14.0);
    pub const ENEMY_HEAR_RADIUS: f32 = 80.0;
    pub const ENEMY_VISION_RADIUS: f32 = 320.0;
    pub const ENEMY_VISION_ANGLE_DEG: f32 = 90.0;
    pub const ENEMY_ALERT_DURATION_MS: f32 = 3000.0;
    pub const ENEMY_PATROL_SPEED: f32 = 0.1;
    pub const ENEMY_PURSUIT_SPEED: f32 = 0.2;
    /// Distance at which a patrol waypoint counts as reached
    pub const ENEMY_ARRIVAL_RADIUS: f32 = 10.0;
    /// Enemies stop steering when this close to their target
    pub const ENEMY_STOP_DISTANCE: f32 = 2.0;
    /// Centre distance at which an enemy takes the player down. Must exceed
    /// the summed half extents, rigidbodies never get closer than that.
    pub const ENEMY_KILL_RADIUS: f32 = 30.0;
}

/// Unit vector the entity faces for a given rotation.
///
/// Rotation 0 faces screen-up (-Y), matching the sprite orientation.
#[inline]
pub fn facing_direction(rotation: f32) -> Vec2 {
    Vec2::new(rotation.sin(), -rotation.cos())
}

/// Rotation that makes an entity face along `direction`.
///
/// Zero-length directions map to rotation 0.
#[inline]
pub fn rotation_facing(direction: Vec2) -> f32 {
    if direction.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    direction.y.atan2(direction.x) + std::f32::consts::FRAC_PI_2
}

/// Rotate a vector counter-clockwise by `radians`
#[inline]
pub fn rotate_vec(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
