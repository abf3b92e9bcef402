//! Recon Rico headless runner
//!
//! Loads a run of levels and drives the simulation at a fixed frame length
//! with a seeded autopilot standing in for the keyboard and mouse.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command, value_parser};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use recon_rico::consts::FRAME_MS;
use recon_rico::level::LevelData;
use recon_rico::settings::Settings;
use recon_rico::sim::{GameEvent, GamePhase, Simulation, TickInput};

/// Ticks between autopilot direction changes
const AUTOPILOT_HOLD_TICKS: u64 = 30;
/// Ticks spent on the "player down" screen before reloading
const RELOAD_DELAY_TICKS: u32 = 60;

/// Seeded stand-in for player input
struct Autopilot {
    rng: Pcg32,
    move_dir: Vec2,
    aim: Vec2,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            move_dir: Vec2::ZERO,
            aim: Vec2::ZERO,
        }
    }

    fn next_input(&mut self, frame: u64, settings: &Settings) -> TickInput {
        if frame % AUTOPILOT_HOLD_TICKS == 0 {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            self.move_dir = if self.rng.random_bool(0.2) {
                Vec2::ZERO
            } else {
                Vec2::from_angle(angle)
            };
            self.aim = Vec2::new(
                self.rng.random_range(0.0..settings.playfield_width),
                self.rng.random_range(0.0..settings.playfield_height),
            );
        }

        TickInput {
            move_dir: self.move_dir,
            aim: Some(self.aim),
            shoot: self.rng.random_bool(0.05),
            ..TickInput::default()
        }
    }
}

#[derive(Debug, Default)]
struct RunSummary {
    shots: u32,
    ricochets: u32,
    enemies_killed: u32,
    pickups: u32,
    deaths: u32,
    doors: u32,
}

impl RunSummary {
    fn record(&mut self, event: &GameEvent) {
        use recon_rico::sim::SoundCue;
        match event {
            GameEvent::Sound(SoundCue::Shoot) => self.shots += 1,
            GameEvent::Sound(SoundCue::Ricochet) => self.ricochets += 1,
            GameEvent::EnemyKilled => self.enemies_killed += 1,
            GameEvent::AmmoPickedUp => self.pickups += 1,
            GameEvent::PlayerKilled => self.deaths += 1,
            GameEvent::DoorReached => self.doors += 1,
            GameEvent::Sound(_) => {}
        }
    }
}

/// Expand the command line paths into level files: files as given, directories
/// as their `*.json` files in name order
fn level_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("reading level directory {}", path.display()))?;
        let mut found = Vec::new();
        for entry in entries {
            let file = entry?.path();
            if file.extension().is_some_and(|ext| ext == "json") {
                found.push(file);
            }
        }
        found.sort();
        if found.is_empty() {
            log::warn!("No level files in {}", path.display());
        }
        files.extend(found);
    }
    Ok(files)
}

fn load_levels(files: &[PathBuf]) -> Result<Vec<LevelData>> {
    files
        .iter()
        .map(|path| {
            LevelData::load_file(path)
                .with_context(|| format!("loading level from {}", path.display()))
        })
        .collect()
}

fn level_label(sim: &Simulation, files: &[PathBuf]) -> String {
    match &sim.level().name {
        Some(name) => name.clone(),
        None => files
            .get(sim.level_index())
            .map(|path| path.display().to_string())
            .unwrap_or_default(),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("recon-rico")
        .about("Runs a Recon Rico level headless with a seeded autopilot")
        .arg(
            Arg::new("level")
                .value_name("LEVEL")
                .help("Level files (JSON) or directories of them, played in order")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("settings")
                .short('s')
                .long("settings")
                .value_name("FILE")
                .help("Settings file overriding the defaults")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ticks")
                .short('n')
                .long("ticks")
                .value_name("N")
                .help("Number of frames to simulate")
                .default_value("3600")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .help("Autopilot seed")
                .default_value("1")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("frame-ms")
                .long("frame-ms")
                .value_name("MILLISECONDS")
                .help("Frame length")
                .value_parser(value_parser!(f32)),
        )
        .get_matches();

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("level")
        .context("level path is required")?
        .cloned()
        .collect();
    let ticks = matches.get_one::<u64>("ticks").copied().unwrap_or(3600);
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(1);
    let frame_ms = matches
        .get_one::<f32>("frame-ms")
        .copied()
        .filter(|ms| *ms > 0.0)
        .unwrap_or(FRAME_MS);

    let settings = match matches.get_one::<PathBuf>("settings") {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let files = level_files(&paths)?;
    let levels = load_levels(&files)?;

    log::info!(
        "Recon Rico starting: {} level(s) ({ticks} ticks, seed {seed}, {frame_ms:.2}ms frames)",
        levels.len()
    );

    let mut sim = Simulation::with_levels(levels, settings).context("starting simulation")?;
    let mut autopilot = Autopilot::new(seed);
    let mut summary = RunSummary::default();
    let mut down_ticks = 0;

    for frame in 0..ticks {
        let input = match sim.phase() {
            GamePhase::PlayerDown => {
                down_ticks += 1;
                TickInput {
                    reload: down_ticks >= RELOAD_DELAY_TICKS,
                    ..TickInput::default()
                }
            }
            GamePhase::LevelComplete => break,
            _ => {
                down_ticks = 0;
                autopilot.next_input(frame, sim.settings())
            }
        };

        for event in sim.tick(&input, frame_ms) {
            log::debug!("frame {frame}: {event:?}");
            summary.record(&event);
        }
    }

    log::info!(
        "Finished after {} simulated ticks ({:.1}s of game time): {summary:?}",
        sim.tick_count(),
        sim.world().now_ms() / 1000.0
    );
    println!(
        "{} ({}/{}): shots={} ricochets={} kills={} pickups={} deaths={} doors={} completed={}",
        level_label(&sim, &files),
        sim.level_index() + 1,
        sim.level_count(),
        summary.shots,
        summary.ricochets,
        summary.enemies_killed,
        summary.pickups,
        summary.deaths,
        summary.doors,
        sim.phase() == GamePhase::LevelComplete
    );
    Ok(())
}
