//! Level exit
//!
//! A door ends the level when the player touches it; the simulation driver
//! then loads the next level of the run.

use super::collision::CollisionEvent;
use super::events::{self, GameEvent, SoundCue};
use crate::ecs::{Player, World};
use crate::settings::Settings;

/// Response for entities carrying `ColliderResponse::DoorTrigger`
pub fn on_door_collision(world: &mut World, settings: &Settings, event: &CollisionEvent) {
    if !world.has::<Player>(event.target) {
        return;
    }
    log::info!("[{}]: reached by player {}", event.source, event.target);
    events::play(world, settings, SoundCue::Pickup);
    world.emit(GameEvent::DoorReached);
}
