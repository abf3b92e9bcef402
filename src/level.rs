//! Level descriptions
//!
//! A level is an ordered list of entity descriptors stored as JSON:
//!
//! ```json
//! { "entities": [
//!     { "type": "player", "position": [640, 360] },
//!     { "type": "solid_wall", "position": [640, 20], "size": [1280, 40] },
//!     { "type": "enemy", "position": [200, 200], "patrolPoints": [[200, 200], [400, 200]] }
//! ] }
//! ```
//!
//! Loading is staged: every descriptor is turned into a blueprint and
//! validated before the world is touched, so a failed load commits nothing.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::{EntityBuilder, EntityId, World};
use crate::error::LevelError;
use crate::settings::Settings;
use crate::sim::spawn::{self, WallKind};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entities: Vec<LevelEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<Vec2>,
    /// Full width and height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec2>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patrol_points: Vec<Vec2>,
}

/// Entity types understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Player,
    Bullet,
    Wall(WallKind),
    Enemy,
    Door,
}

impl EntityType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "player" => EntityType::Player,
            "bullet" => EntityType::Bullet,
            "solid_wall" => EntityType::Wall(WallKind::Solid),
            "pass_breakable_wall" => EntityType::Wall(WallKind::PassBreakable),
            "absorb_breakable_wall" | "breakable_wall" => {
                EntityType::Wall(WallKind::AbsorbBreakable)
            }
            "reflector_wall" => EntityType::Wall(WallKind::Reflector),
            "reflector_breakable_wall" => EntityType::Wall(WallKind::ReflectorBreakable),
            "enemy" => EntityType::Enemy,
            "door" => EntityType::Door,
            _ => return None,
        })
    }
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate every descriptor and build its blueprint without touching
    /// any world
    pub fn stage(&self, settings: &Settings) -> Result<Vec<EntityBuilder>, LevelError> {
        let mut staged = Vec::with_capacity(self.entities.len());
        let mut players = 0;

        for (index, entity) in self.entities.iter().enumerate() {
            let Some(entity_type) = EntityType::from_tag(&entity.kind) else {
                log::warn!("Skipping entity #{index}: unknown type `{}`", entity.kind);
                continue;
            };
            if !settings.in_playfield(entity.position) {
                log::warn!(
                    "Skipping entity #{index} ({}): position {} is outside the playfield",
                    entity.kind,
                    entity.position
                );
                continue;
            }

            let missing = |field| LevelError::MissingField {
                index,
                kind: entity.kind.clone(),
                field,
            };
            let (position, rotation) = (entity.position, entity.rotation);

            let builder = match entity_type {
                EntityType::Player => {
                    players += 1;
                    spawn::player(position, rotation, settings)
                }
                EntityType::Bullet => {
                    let velocity = entity.velocity.ok_or_else(|| missing("velocity"))?;
                    spawn::bullet(position, velocity, settings.player_bullet_ricochets)
                }
                EntityType::Wall(kind) => {
                    let size = entity.size.ok_or_else(|| missing("size"))?;
                    spawn::wall(kind, position, size / 2.0, rotation)
                }
                EntityType::Enemy => {
                    spawn::enemy(position, rotation, entity.patrol_points.clone(), settings)
                }
                EntityType::Door => {
                    let size = entity.size.ok_or_else(|| missing("size"))?;
                    spawn::door(position, size / 2.0, rotation)
                }
            };
            staged.push(builder);
        }

        match players {
            0 => return Err(LevelError::NoPlayer),
            1 => {}
            n => log::warn!("Level has {n} players, enemies will track the first"),
        }
        Ok(staged)
    }

    /// Stage then commit into `world`. On error the world is unchanged.
    pub fn spawn_into(
        &self,
        world: &mut World,
        settings: &Settings,
    ) -> Result<Vec<EntityId>, LevelError> {
        let staged = self.stage(settings)?;
        let ids: Vec<EntityId> = staged
            .into_iter()
            .map(|builder| builder.spawn(world))
            .collect();
        log::info!(
            "Loaded level{} with {} entities",
            self.name.as_deref().map(|n| format!(" '{n}'")).unwrap_or_default(),
            ids.len()
        );
        Ok(ids)
    }
}
