//! Fixed timestep simulation tick
//!
//! `advance` maps one world snapshot to the next. It never mutates its input
//! and all randomness goes through a `RandomSource`, so a scripted source
//! reproduces a tick exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{
    obstacle_rect, projectile_rect, rect_overlap, shot_hits_adversary, shot_hits_player,
};
use super::state::{Projectile, Viewport, World};
use crate::consts::*;

/// Source of the two random decisions the engine makes each tick
pub trait RandomSource {
    /// Uniform integer in `0..=max`
    fn roll(&mut self, max: u32) -> u32;
    /// Uniform index in `0..len` (`len > 0`)
    fn pick(&mut self, len: usize) -> usize;
}

/// Production random source: seeded PCG
#[derive(Debug, Clone)]
pub struct SeededRng(Pcg32);

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self(Pcg32::seed_from_u64(seed))
    }

    /// Seed from the OS
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl RandomSource for SeededRng {
    fn roll(&mut self, max: u32) -> u32 {
        self.0.random_range(0..=max)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.0.random_range(0..len)
    }
}

/// Advance the world by one tick
pub fn advance(world: &World, viewport: Viewport, rng: &mut dyn RandomSource) -> World {
    if !world.running || world.paused {
        return world.clone();
    }

    let speed = world.adversary_speed;
    let mut direction = world.formation_direction;

    // Formation: slide, and step down + reverse when a side is touched
    let mut adversaries = world.adversaries.clone();
    let max_x = viewport.formation_max_x();
    let mut edge_reached = false;
    for a in &mut adversaries {
        a.x += speed * direction;
        if a.x < 0.0 || a.x > max_x {
            edge_reached = true;
        }
    }
    if edge_reached {
        direction = -direction;
        for a in &mut adversaries {
            a.x += direction * speed;
            a.y += FORMATION_STEP_DOWN;
        }
    }

    let respawn = || Projectile::respawn(world.player.x, viewport);

    // Player shot flies up, reloading once it leaves the top
    let mut shot = world.player_shot;
    if shot.y < 0.0 {
        shot = respawn();
    } else {
        shot.y -= PLAYER_SHOT_SPEED;
    }

    // Adversary shots fall until they are well below the viewport
    let discard_y = viewport.height + ADVERSARY_SHOT_MARGIN;
    let mut adversary_shots: Vec<Projectile> = world
        .adversary_shots
        .iter()
        .filter(|s| s.y < discard_y)
        .map(|s| Projectile {
            y: s.y + ADVERSARY_SHOT_SPEED,
            ..*s
        })
        .collect();

    // Player shot vs formation: at most one kill per tick
    let mut pending_score = 0;
    if let Some(hit_id) = adversaries
        .iter()
        .find(|a| shot_hits_adversary(&shot, a))
        .map(|a| a.id)
    {
        adversaries.retain(|a| a.id != hit_id);
        shot = respawn();
        pending_score = POINTS_PER_KILL * world.wave;
    }

    // Shots vs cover. A block hit by the player shot sends it back to the
    // muzzle, so later blocks are tested against the fresh shot.
    let mut obstacles = world.obstacles.clone();
    obstacles.retain(|o| {
        if rect_overlap(projectile_rect(&shot), obstacle_rect(o)) {
            shot = respawn();
            false
        } else {
            true
        }
    });

    adversary_shots.retain(|s| {
        let shot_box = projectile_rect(s);
        let before = obstacles.len();
        obstacles.retain(|o| !rect_overlap(shot_box, obstacle_rect(o)));
        obstacles.len() == before
    });

    // Return fire
    if !adversaries.is_empty() && rng.roll(FIRE_ROLL_MAX) < FIRE_CHANCE {
        let shooter = adversaries[rng.pick(adversaries.len())];
        adversary_shots.push(Projectile::adversary(
            shooter.x + ADVERSARY_MUZZLE_X,
            shooter.y + ADVERSARY_MUZZLE_Y,
        ));
    }

    let score = world.score + pending_score;

    if adversaries.is_empty() {
        log::info!("Wave {} cleared, score {}", world.wave, score);
        let mut next = world.next_wave(score, viewport);
        next.formation_direction = direction;
        next.ticks = world.ticks + 1;
        return next;
    }

    let player_hit = adversary_shots
        .iter()
        .any(|s| shot_hits_player(s, world.player.x, viewport));
    let invaded = adversaries
        .iter()
        .any(|a| a.y >= viewport.invasion_line());
    let game_over = player_hit || invaded;

    World {
        adversaries,
        player_shot: shot,
        adversary_shots,
        obstacles,
        score,
        formation_direction: direction,
        running: !game_over,
        game_over,
        ticks: world.ticks + 1,
        ..world.clone()
    }
}
