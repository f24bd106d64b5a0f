//! Grid Invaders headless runner
//!
//! Plays sessions with a small autopilot standing in for the presentation
//! layer, then prints the leaderboard. Settings come from the JSON file named
//! by `GRID_INVADERS_SETTINGS` (default `grid-invaders.json`).

use std::path::PathBuf;
use std::sync::Arc;

use grid_invaders::consts::*;
use grid_invaders::highscores::{ScoreLedger, ScoreStore};
use grid_invaders::persistence::{FileStore, KeyValueStore, MemoryStore};
use grid_invaders::sim::{Viewport, World};
use grid_invaders::{Session, Settings};

/// Where the autopilot wants the player this tick (already clamped)
fn autopilot_target(world: &World, viewport: Viewport) -> f32 {
    desired_x(world, viewport).clamp(0.0, viewport.player_max_x())
}

fn desired_x(world: &World, viewport: Viewport) -> f32 {
    let player_centre = world.player.x + PLAYER_WIDTH / 2.0;

    // Dodge the closest shot falling onto us
    let danger_y = viewport.height - PLAYER_BOTTOM_OFFSET - 250.0;
    if let Some(shot) = world
        .adversary_shots
        .iter()
        .filter(|s| s.y > danger_y)
        .find(|s| (s.x - player_centre).abs() < PLAYER_WIDTH)
    {
        let away = if shot.x < player_centre { 1.0 } else { -1.0 };
        return world.player.x + away * PLAYER_WIDTH * 1.5;
    }

    // Otherwise line the muzzle up under the lowest adversary
    world
        .adversaries
        .iter()
        .max_by(|a, b| {
            a.y.total_cmp(&b.y).then_with(|| {
                let da = (a.x - world.player.x).abs();
                let db = (b.x - world.player.x).abs();
                db.total_cmp(&da)
            })
        })
        .map(|a| a.x + ADVERSARY_WIDTH / 2.0 - MUZZLE_OFFSET_X - PROJECTILE_WIDTH / 2.0)
        .unwrap_or(world.player.x)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_path = std::env::var_os("GRID_INVADERS_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("grid-invaders.json"));
    let settings = Settings::load(&settings_path);

    let store: Arc<dyn KeyValueStore> = match &settings.storage_path {
        Some(path) => Arc::new(FileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };
    let ledger = Arc::new(ScoreLedger::new(store));

    let session = Session::new(&settings, ledger.clone());
    let viewport = settings.viewport();
    session.set_viewport(viewport.width, viewport.height);

    for run in 1..=settings.demo_sessions.max(1) {
        let updates = session.subscribe();
        session.start();
        log::info!("Run {} started", run);

        let mut last_wave = 0;
        let mut last_tick = None;
        for snapshot in updates.iter() {
            if snapshot.is_game_over() {
                println!(
                    "Run {}: score {} on wave {}",
                    run, snapshot.world.score, snapshot.world.wave
                );
                break;
            }
            // React once per simulated tick, not to our own moves
            if !snapshot.is_running() || last_tick == Some(snapshot.world.ticks) {
                continue;
            }
            last_tick = Some(snapshot.world.ticks);
            if snapshot.world.wave != last_wave {
                last_wave = snapshot.world.wave;
                log::info!("Wave {} (speed {:.1})", last_wave, snapshot.world.adversary_speed);
            }
            let target = autopilot_target(&snapshot.world, viewport);
            if (target - snapshot.world.player.x).abs() > f32::EPSILON {
                session.move_player(target);
            }
        }
    }

    match ledger.load() {
        Ok(scores) if scores.is_empty() => println!("No high scores yet"),
        Ok(scores) => {
            println!("High scores:");
            for (rank, entry) in scores.entries.iter().enumerate() {
                println!("  {}. {:>6}  wave {}", rank + 1, entry.score, entry.wave);
            }
        }
        Err(e) => log::error!("Could not read high scores: {}", e),
    }
}
