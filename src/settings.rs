//! Simulation tuning
//!
//! Every gameplay number the systems read lives here so a level pack can ship
//! its own balance file. Missing keys fall back to the defaults in `consts`.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === Playfield ===
    /// Playfield width; level entities outside it are skipped
    pub playfield_width: f32,
    /// Playfield height
    pub playfield_height: f32,

    // === Collision ===
    /// Sweep samples per frame
    pub collision_substeps: u32,
    /// Gap left after pushing a rigidbody out of a neighbour
    pub rigidbody_gap: f32,

    // === Bullets ===
    /// Bullet speed (units per ms)
    pub bullet_speed: f32,
    /// Spawn distance ahead of the shooter
    pub bullet_spawn_offset: f32,
    /// Distance outside the playfield after which bullets are removed
    pub bullet_leak_margin: f32,
    /// Bullets slower than this are removed
    pub bullet_stall_speed: f32,

    // === Player ===
    pub player_speed: f32,
    pub friction_per_second: f32,
    pub player_max_ammo: u32,
    pub player_shoot_delay_ms: f64,
    pub player_bullet_ricochets: u32,

    // === Enemies ===
    pub enemy_hear_radius: f32,
    pub enemy_vision_radius: f32,
    /// Full vision cone in degrees
    pub enemy_vision_angle_deg: f32,
    pub enemy_alert_duration_ms: f32,
    pub enemy_patrol_speed: f32,
    pub enemy_pursuit_speed: f32,
    pub enemy_arrival_radius: f32,
    pub enemy_kill_radius: f32,

    // === Audio ===
    /// Emit sound cues into the event queue
    pub sounds_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,

            collision_substeps: COLLISION_SUBSTEPS,
            rigidbody_gap: RIGIDBODY_GAP,

            bullet_speed: BULLET_SPEED,
            bullet_spawn_offset: BULLET_SPAWN_OFFSET,
            bullet_leak_margin: BULLET_LEAK_MARGIN,
            bullet_stall_speed: BULLET_STALL_SPEED,

            player_speed: PLAYER_SPEED,
            friction_per_second: FRICTION_PER_SECOND,
            player_max_ammo: PLAYER_MAX_AMMO,
            player_shoot_delay_ms: PLAYER_SHOOT_DELAY_MS,
            player_bullet_ricochets: PLAYER_BULLET_RICOCHETS,

            enemy_hear_radius: ENEMY_HEAR_RADIUS,
            enemy_vision_radius: ENEMY_VISION_RADIUS,
            enemy_vision_angle_deg: ENEMY_VISION_ANGLE_DEG,
            enemy_alert_duration_ms: ENEMY_ALERT_DURATION_MS,
            enemy_patrol_speed: ENEMY_PATROL_SPEED,
            enemy_pursuit_speed: ENEMY_PURSUIT_SPEED,
            enemy_arrival_radius: ENEMY_ARRIVAL_RADIUS,
            enemy_kill_radius: ENEMY_KILL_RADIUS,

            sounds_enabled: true,
        }
    }
}

impl Settings {
    /// Parse settings from JSON (missing keys keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Whether a point lies inside the playfield (edges inclusive)
    pub fn in_playfield(&self, point: Vec2) -> bool {
        point.x >= 0.0
            && point.x <= self.playfield_width
            && point.y >= 0.0
            && point.y <= self.playfield_height
    }

    /// Whether a point is far enough outside the playfield to count as leaked
    pub fn is_leaked(&self, point: Vec2) -> bool {
        let m = self.bullet_leak_margin;
        point.x < -m
            || point.x > self.playfield_width + m
            || point.y < -m
            || point.y > self.playfield_height + m
    }

    /// Keep values the systems divide by or iterate over in range
    fn sanitize(&mut self) {
        if self.collision_substeps == 0 {
            log::warn!("collisionSubsteps must be at least 1, using 1");
            self.collision_substeps = 1;
        }
        if self.rigidbody_gap < 0.0 {
            log::warn!("rigidbodyGap must not be negative, using {}", RIGIDBODY_GAP);
            self.rigidbody_gap = RIGIDBODY_GAP;
        }
        if !(self.playfield_width > 0.0 && self.playfield_height > 0.0) {
            log::warn!(
                "Playfield must have a positive size, using {PLAYFIELD_WIDTH}x{PLAYFIELD_HEIGHT}"
            );
            self.playfield_width = PLAYFIELD_WIDTH;
            self.playfield_height = PLAYFIELD_HEIGHT;
        }
    }
}
