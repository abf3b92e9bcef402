//! Game events
//!
//! Systems push these into the world's queue; audio and UI collaborators
//! drain it once per frame.

use serde::{Deserialize, Serialize};

use crate::ecs::World;
use crate::settings::Settings;

/// Sound effect cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Gun fired
    Shoot,
    /// Bullet bounced off a wall
    Ricochet,
    /// Breakable wall destroyed or player taken down
    Explosion,
    /// Bullet absorbed or enemy hit
    Hit,
    Pause,
    Resume,
    /// Player picked a bullet back up
    Pickup,
    /// Enemy noticed the player
    Alarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    PlayerKilled,
    EnemyKilled,
    DoorReached,
    AmmoPickedUp,
}

/// Queue a sound cue unless sounds are disabled
pub fn play(world: &mut World, settings: &Settings, cue: SoundCue) {
    if settings.sounds_enabled {
        world.emit(GameEvent::Sound(cue));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_respects_toggle() {
        let mut world = World::new();
        let mut settings = Settings::default();
        play(&mut world, &settings, SoundCue::Shoot);
        settings.sounds_enabled = false;
        play(&mut world, &settings, SoundCue::Hit);
        assert_eq!(
            world.drain_events(),
            vec![GameEvent::Sound(SoundCue::Shoot)]
        );
    }
}
