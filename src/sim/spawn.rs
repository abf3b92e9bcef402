//! Entity blueprints
//!
//! Every spawnable thing is described here as an [`EntityBuilder`], so the
//! level loader can stage blueprints and the weapon system can fire bullets
//! from the same recipes.

use glam::Vec2;

use crate::consts::*;
use crate::ecs::*;
use crate::rotation_facing;
use crate::settings::Settings;

/// Draw layers, bottom to top
pub mod layers {
    pub const WALL: i32 = 0;
    pub const DOOR: i32 = 0;
    pub const BULLET: i32 = 1;
    pub const ENEMY: i32 = 2;
    pub const PLAYER: i32 = 3;
}

/// Wall variants, named as in level files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    Solid,
    PassBreakable,
    AbsorbBreakable,
    Reflector,
    ReflectorBreakable,
}

impl WallKind {
    pub fn obstacle(self) -> Obstacle {
        match self {
            WallKind::Solid => Obstacle::new(BulletPolicy::Absorb, false),
            WallKind::PassBreakable => Obstacle::new(BulletPolicy::PassThrough, true),
            WallKind::AbsorbBreakable => Obstacle::new(BulletPolicy::Absorb, true),
            WallKind::Reflector => Obstacle::new(BulletPolicy::Reflect, false),
            WallKind::ReflectorBreakable => Obstacle::new(BulletPolicy::Reflect, true),
        }
    }

    fn sprite(self) -> Sprite {
        match self {
            WallKind::Solid => Sprite::new(SpriteKey::SolidWall),
            WallKind::Reflector => Sprite::new(SpriteKey::ReflectorWall),
            WallKind::ReflectorBreakable => Sprite::tinted(SpriteKey::ReflectorWall, 0xFFC0_C0FF),
            WallKind::PassBreakable => Sprite::tinted(SpriteKey::BreakableWall, 0xFFFF_FF80),
            WallKind::AbsorbBreakable => Sprite::new(SpriteKey::BreakableWall),
        }
    }
}

pub fn player(position: Vec2, rotation: f32, settings: &Settings) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::at(position).with_rotation(rotation).with_layer(layers::PLAYER))
        .with_rect_collider(Vec2::from(PLAYER_HALF_EXTENTS))
        .with_velocity(Vec2::ZERO)
        .with(Rigidbody)
        .with(Player)
        .with(Gun::from_settings(settings))
        .with_sprite(SpriteKey::Player)
}

/// A bullet facing along its velocity
pub fn bullet(position: Vec2, velocity: Vec2, max_ricochets: u32) -> EntityBuilder {
    EntityBuilder::new()
        .with(
            Transform::at(position)
                .with_rotation(rotation_facing(velocity))
                .with_layer(layers::BULLET),
        )
        .with_rect_collider(Vec2::from(BULLET_HALF_EXTENTS))
        .with_velocity(velocity)
        .with(Projectile::new(max_ricochets))
        .with(ColliderResponse::Projectile)
        .with(Script::ProjectileLifetime)
        .with_sprite(SpriteKey::Bullet)
}

pub fn wall(kind: WallKind, position: Vec2, half_extents: Vec2, rotation: f32) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::at(position).with_rotation(rotation).with_layer(layers::WALL))
        .with_rect_collider(half_extents)
        .with(Rigidbody)
        .with(kind.obstacle())
        .with(kind.sprite())
}

pub fn enemy(
    position: Vec2,
    rotation: f32,
    patrol_points: Vec<Vec2>,
    settings: &Settings,
) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::at(position).with_rotation(rotation).with_layer(layers::ENEMY))
        .with_rect_collider(Vec2::from(ENEMY_HALF_EXTENTS))
        .with_velocity(Vec2::ZERO)
        .with(Rigidbody)
        .with(Enemy::new(patrol_points, settings))
        .with_sprite(SpriteKey::Enemy)
}

pub fn door(position: Vec2, half_extents: Vec2, rotation: f32) -> EntityBuilder {
    EntityBuilder::new()
        .with(Transform::at(position).with_rotation(rotation).with_layer(layers::DOOR))
        .with_rect_collider(half_extents)
        .with(Door)
        .with(ColliderResponse::DoorTrigger)
        .with_sprite(SpriteKey::Door)
}
