//! Per-frame simulation tick
//!
//! [`Simulation`] owns the world and runs every system in a fixed order:
//! input, enemy AI, guns, collisions, rigidbodies, free movement, scripts.
//! Game events drained at the end of the tick drive the phase machine:
//! a taken-down player waits for a reload, and reaching the door moves on
//! to the next level of the run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::control::control_system;
use super::enemy::EnemySystem;
use super::events::{self, GameEvent, SoundCue};
use super::{collision, movement, rigidbody, script, weapon};
use crate::ecs::World;
use crate::error::LevelError;
use crate::level::LevelData;
use crate::settings::Settings;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (any length, zero for none)
    pub move_dir: Vec2,
    /// World point the player turns to face
    pub aim: Option<Vec2>,
    /// Fire the player's gun
    pub shoot: bool,
    /// Reload the current level
    pub reload: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Player taken down; waiting for a reload
    PlayerDown,
    /// Player reached the door of the last level
    LevelComplete,
}

pub struct Simulation {
    world: World,
    settings: Settings,
    levels: Vec<LevelData>,
    current: usize,
    phase: GamePhase,
    enemies: EnemySystem,
    tick_count: u64,
}

impl Simulation {
    /// Build a simulation and load `level` into it
    pub fn new(level: LevelData, settings: Settings) -> Result<Self, LevelError> {
        Self::with_levels(vec![level], settings)
    }

    /// Build a simulation over an ordered run of levels, starting at the first
    ///
    /// Every level is staged up front so a broken level fails here rather
    /// than halfway through the run.
    pub fn with_levels(levels: Vec<LevelData>, settings: Settings) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        for level in &levels {
            level.stage(&settings)?;
        }

        let mut sim = Self {
            world: World::new(),
            settings,
            levels,
            current: 0,
            phase: GamePhase::Playing,
            enemies: EnemySystem::new(),
            tick_count: 0,
        };
        sim.reload()?;
        Ok(sim)
    }

    /// Re-run the current level's load. The current world survives a failed load.
    pub fn reload(&mut self) -> Result<(), LevelError> {
        let staged = self.level().stage(&self.settings)?;

        self.world.clear();
        self.enemies.forget_player();
        for builder in staged {
            builder.spawn(&mut self.world);
        }
        self.phase = GamePhase::Playing;

        log::info!(
            "Level {}/{} loaded: {} entities at t={:.0}ms",
            self.current + 1,
            self.levels.len(),
            self.world.entity_count(),
            self.world.now_ms()
        );
        Ok(())
    }

    /// Move on to the next level. Returns `false` once the run is over, in
    /// which case the phase becomes [`GamePhase::LevelComplete`].
    pub fn advance_level(&mut self) -> Result<bool, LevelError> {
        if self.current + 1 >= self.levels.len() {
            self.set_phase(GamePhase::LevelComplete);
            return Ok(false);
        }

        self.current += 1;
        if let Err(err) = self.reload() {
            self.current -= 1;
            return Err(err);
        }
        Ok(true)
    }

    /// Advance the simulation by `dt_ms` and return the events it produced
    pub fn tick(&mut self, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
        if input.reload {
            if let Err(err) = self.reload() {
                log::error!("Reload failed: {err}");
            }
            return self.world.drain_events();
        }

        if input.pause {
            match self.phase {
                GamePhase::Playing => {
                    self.set_phase(GamePhase::Paused);
                    events::play(&mut self.world, &self.settings, SoundCue::Pause);
                }
                GamePhase::Paused => {
                    self.set_phase(GamePhase::Playing);
                    events::play(&mut self.world, &self.settings, SoundCue::Resume);
                }
                _ => {}
            }
        }

        if self.phase != GamePhase::Playing {
            return self.world.drain_events();
        }

        let world = &mut self.world;
        let settings = &self.settings;

        world.advance_clock(f64::from(dt_ms));
        control_system(world, settings, input);
        self.enemies.update(world, settings, dt_ms);
        weapon::gun_system(world, settings);
        collision::collision_system(world, settings, dt_ms);
        rigidbody::rigidbody_system(world, settings, dt_ms);
        movement::movement_system(world, settings, dt_ms);
        script::script_system(world, settings);

        self.tick_count += 1;

        let mut events = self.world.drain_events();
        let killed = events.contains(&GameEvent::PlayerKilled);
        let door = events.contains(&GameEvent::DoorReached);

        if killed {
            self.set_phase(GamePhase::PlayerDown);
        } else if door {
            match self.advance_level() {
                Ok(true) => events.extend(self.world.drain_events()),
                Ok(false) => {}
                Err(err) => {
                    log::error!("Loading level {} failed: {err}", self.current + 2);
                    self.set_phase(GamePhase::LevelComplete);
                }
            }
        }
        events
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The level currently loaded
    pub fn level(&self) -> &LevelData {
        &self.levels[self.current]
    }

    /// Zero-based position of the current level in the run
    pub fn level_index(&self) -> usize {
        self.current
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Ticks simulated while playing
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
