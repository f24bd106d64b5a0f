//! World state and entity types
//!
//! Every entity is a plain value. A `World` is an immutable snapshot once
//! published; the engine builds a new one each tick.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Simulation area in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both dimensions must be positive before a session can start
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Rightmost legal player x
    pub fn player_max_x(&self) -> f32 {
        (self.width - PLAYER_WIDTH).max(0.0)
    }

    /// Rightmost x an adversary may occupy before the formation turns
    pub fn formation_max_x(&self) -> f32 {
        self.width - ADVERSARY_EDGE_WIDTH
    }

    /// Player shot spawn height
    pub fn muzzle_y(&self) -> f32 {
        self.height - MUZZLE_OFFSET_Y
    }

    /// Adversaries at or below this y have reached the player
    pub fn invasion_line(&self) -> f32 {
        self.height - INVASION_LINE_OFFSET
    }
}

/// The player. Only the horizontal position is stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
}

/// One member of the formation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adversary {
    /// Stable within a session, never reused
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A shot in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    /// Adversary shots travel down and have a shorter hit-box
    pub from_adversary: bool,
}

impl Projectile {
    pub const fn player(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            from_adversary: false,
        }
    }

    pub const fn adversary(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            from_adversary: true,
        }
    }

    /// Fresh player shot at the muzzle of a player standing at `player_x`
    pub fn respawn(player_x: f32, viewport: Viewport) -> Self {
        Self::player(player_x + MUZZLE_OFFSET_X, viewport.muzzle_y())
    }
}

/// Destructible cover block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            width: OBSTACLE_SIZE,
            height: OBSTACLE_SIZE,
        }
    }
}

/// Complete simulation snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub player: Player,
    /// Formation members in row-major spawn order
    pub adversaries: Vec<Adversary>,
    /// The single player shot (always present)
    pub player_shot: Projectile,
    /// Adversary shots in spawn order
    pub adversary_shots: Vec<Projectile>,
    pub obstacles: Vec<Obstacle>,
    pub score: u32,
    /// Current wave (1-based)
    pub wave: u32,
    pub adversary_speed: f32,
    /// Signed formation step; flips at each side of the viewport
    pub formation_direction: f32,
    pub running: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Ticks simulated this session
    pub ticks: u64,
    /// Next adversary id to hand out
    pub(crate) next_id: u32,
}

impl Default for World {
    /// Pre-start world: a formation on screen but nothing running yet
    fn default() -> Self {
        let (adversaries, next_id) = create_formation(1);
        Self {
            player: Player { x: 0.0 },
            adversaries,
            player_shot: Projectile::player(0.0, -1.0),
            adversary_shots: Vec::new(),
            obstacles: create_obstacles(),
            score: 0,
            wave: 1,
            adversary_speed: ADVERSARY_BASE_SPEED,
            formation_direction: FORMATION_DIRECTION,
            running: false,
            paused: false,
            game_over: false,
            ticks: 0,
            next_id,
        }
    }
}

impl World {
    /// Fresh running world for a new session, player centred
    pub fn new(viewport: Viewport) -> Self {
        let player_x = (viewport.width / 2.0).clamp(0.0, viewport.player_max_x());
        Self {
            player: Player { x: player_x },
            player_shot: Projectile::respawn(player_x, viewport),
            running: true,
            ..Self::default()
        }
    }

    /// Next wave: new formation and cover, faster adversaries, shots cleared.
    /// Score, player position and formation direction carry over.
    pub fn next_wave(&self, score: u32, viewport: Viewport) -> Self {
        let (adversaries, next_id) = create_formation(self.next_id);
        Self {
            player: self.player,
            adversaries,
            player_shot: Projectile::respawn(self.player.x, viewport),
            adversary_shots: Vec::new(),
            obstacles: create_obstacles(),
            score,
            wave: self.wave + 1,
            adversary_speed: self.adversary_speed + ADVERSARY_SPEED_STEP,
            formation_direction: self.formation_direction,
            running: true,
            paused: false,
            game_over: false,
            ticks: self.ticks,
            next_id,
        }
    }

    /// Copy with the player moved to `x`, clamped to the viewport
    pub fn with_player_x(&self, x: f32, viewport: Viewport) -> Self {
        let mut world = self.clone();
        world.player.x = x.clamp(0.0, viewport.player_max_x());
        world
    }

    pub(crate) fn next_adversary_id(&self) -> u32 {
        self.next_id
    }

    /// Add an adversary at an explicit position (scenario setup)
    pub fn spawn_adversary(&mut self, x: f32, y: f32) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.adversaries.push(Adversary { id, x, y });
        id
    }
}

/// Build the full formation, handing out ids from `first_id`.
/// Returns the adversaries and the next free id.
pub fn create_formation(first_id: u32) -> (Vec<Adversary>, u32) {
    let adversaries: Vec<Adversary> = (0..FORMATION_SIZE)
        .map(|index| {
            let row = index / FORMATION_COLS;
            let col = index % FORMATION_COLS;
            Adversary {
                id: first_id + index as u32,
                x: col as f32 * FORMATION_SPACING_X + FORMATION_ORIGIN_X,
                y: row as f32 * FORMATION_SPACING_Y + FORMATION_ORIGIN_Y,
            }
        })
        .collect();
    (adversaries, first_id + FORMATION_SIZE as u32)
}

/// Four clusters of cover blocks along the bottom of the arena
pub fn create_obstacles() -> Vec<Obstacle> {
    let cluster_width = OBSTACLE_COLS as f32 * OBSTACLE_SIZE
        + (OBSTACLE_COLS as f32 - 1.0) * OBSTACLE_SPACING;
    let pitch = OBSTACLE_SIZE + OBSTACLE_SPACING;

    let mut obstacles = Vec::with_capacity(OBSTACLE_CLUSTERS * OBSTACLE_COLS * OBSTACLE_ROWS);
    for c in 0..OBSTACLE_CLUSTERS {
        let cluster_x = (c as f32 + 1.0) * OBSTACLE_CLUSTER_PITCH - cluster_width / 2.0;
        for i in 0..OBSTACLE_COLS {
            for j in 0..OBSTACLE_ROWS {
                obstacles.push(Obstacle::new(
                    cluster_x + i as f32 * pitch,
                    OBSTACLE_TOP_Y + j as f32 * pitch,
                ));
            }
        }
    }
    obstacles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formation_layout() {
        let (adversaries, next_id) = create_formation(1);
        assert_eq!(adversaries.len(), 40);
        assert_eq!(next_id, 41);

        assert_eq!((adversaries[0].x, adversaries[0].y), (60.0, 40.0));
        assert_eq!((adversaries[7].x, adversaries[7].y), (760.0, 40.0));
        assert_eq!((adversaries[39].x, adversaries[39].y), (760.0, 360.0));
    }

    #[test]
    fn test_formation_ids_unique() {
        let (adversaries, _) = create_formation(100);
        let mut ids: Vec<u32> = adversaries.iter().map(|a| a.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 40);
        assert_eq!(ids[0], 100);
    }

    #[test]
    fn test_obstacle_layout() {
        let obstacles = create_obstacles();
        assert_eq!(obstacles.len(), 24);
        // First cluster centred on x = 200 (width 70)
        assert_eq!(obstacles[0].x, 165.0);
        assert_eq!(obstacles[0].y, 1800.0);
        assert_eq!(obstacles[1].y, 1825.0);
        assert!(obstacles.iter().all(|o| o.width == 20.0 && o.height == 20.0));
    }

    #[test]
    fn test_new_world_centres_player() {
        let viewport = Viewport::new(1080.0, 1920.0);
        let world = World::new(viewport);
        assert_eq!(world.player.x, 540.0);
        assert_eq!(world.player_shot, Projectile::player(560.0, 1850.0));
        assert!(world.running);
        assert!(!world.game_over);
        assert_eq!(world.wave, 1);
        assert_eq!(world.score, 0);
        assert_eq!(world.formation_direction, 10.0);
    }

    #[test]
    fn test_next_wave_keeps_ids_fresh() {
        let viewport = Viewport::new(1080.0, 1920.0);
        let world = World::new(viewport);
        let next = world.next_wave(120, viewport);
        assert_eq!(next.wave, 2);
        assert_eq!(next.score, 120);
        assert_eq!(next.adversary_speed, 1.5);
        assert_eq!(next.adversaries.len(), 40);
        assert!(next.adversaries.iter().all(|a| a.id > 40));
    }

    #[test]
    fn test_player_clamp() {
        let viewport = Viewport::new(1080.0, 1920.0);
        let world = World::new(viewport);
        assert_eq!(world.with_player_x(-20.0, viewport).player.x, 0.0);
        assert_eq!(world.with_player_x(5000.0, viewport).player.x, 1030.0);
        assert_eq!(world.with_player_x(300.0, viewport).player.x, 300.0);
    }

    #[test]
    fn test_viewport_validity() {
        assert!(Viewport::new(10.0, 10.0).is_valid());
        assert!(!Viewport::new(0.0, 10.0).is_valid());
        assert!(!Viewport::new(10.0, 0.0).is_valid());
        assert!(!Viewport::default().is_valid());
    }
}
