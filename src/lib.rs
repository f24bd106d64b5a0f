//! Grid Invaders - a fixed-tick formation shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, per-tick update)
//! - `session`: Session controller (scheduler, snapshot publishing, game-over save)
//! - `highscores`: Top-5 score ledger with its stable string format
//! - `persistence`: Key-value storage backends for the ledger
//! - `platform`: Host lifecycle signals (background/foreground)
//! - `settings`: Runtime configuration

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{HighScoreRecord, HighScores, ScoreLedger, ScoreStore};
pub use session::{Session, SessionPhase, Snapshot};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick (milliseconds)
    pub const TICK_MS: u64 = 50;

    /// Formation layout
    pub const FORMATION_ROWS: usize = 5;
    pub const FORMATION_COLS: usize = 8;
    pub const FORMATION_SIZE: usize = FORMATION_ROWS * FORMATION_COLS;
    pub const FORMATION_ORIGIN_X: f32 = 60.0;
    pub const FORMATION_ORIGIN_Y: f32 = 40.0;
    pub const FORMATION_SPACING_X: f32 = 100.0;
    pub const FORMATION_SPACING_Y: f32 = 80.0;
    /// Signed horizontal step multiplied by adversary speed each tick
    pub const FORMATION_DIRECTION: f32 = 10.0;
    /// Vertical drop applied when the formation touches a side
    pub const FORMATION_STEP_DOWN: f32 = 40.0;

    /// Adversary footprint used for the side-edge test
    pub const ADVERSARY_EDGE_WIDTH: f32 = 60.0;
    /// Adversary sprite size (proximity centre is the sprite centre)
    pub const ADVERSARY_WIDTH: f32 = 50.0;
    pub const ADVERSARY_HEIGHT: f32 = 30.0;
    /// Adversary speed at wave 1 and per-wave increase
    pub const ADVERSARY_BASE_SPEED: f32 = 1.0;
    pub const ADVERSARY_SPEED_STEP: f32 = 0.5;

    /// Player paddle
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    /// Player hit-box top edge, measured up from the viewport bottom
    pub const PLAYER_BOTTOM_OFFSET: f32 = 50.0;

    /// Projectiles
    pub const PROJECTILE_WIDTH: f32 = 10.0;
    pub const PLAYER_SHOT_HEIGHT: f32 = 50.0;
    pub const ADVERSARY_SHOT_HEIGHT: f32 = 30.0;
    pub const PLAYER_SHOT_SPEED: f32 = 50.0;
    pub const ADVERSARY_SHOT_SPEED: f32 = 25.0;
    /// Player shot spawn offset from the player's left edge
    pub const MUZZLE_OFFSET_X: f32 = 20.0;
    /// Player shot spawn height, measured up from the viewport bottom
    pub const MUZZLE_OFFSET_Y: f32 = 70.0;
    /// Adversary shots below `height + margin` are discarded
    pub const ADVERSARY_SHOT_MARGIN: f32 = 50.0;
    /// Adversary shot spawn offset from the shooter's top-left corner
    pub const ADVERSARY_MUZZLE_X: f32 = 20.0;
    pub const ADVERSARY_MUZZLE_Y: f32 = 30.0;

    /// Squared hit radius for player shot vs adversary (30 units)
    pub const HIT_RADIUS_SQ: f32 = 900.0;

    /// Adversary fire roll: `roll(FIRE_ROLL_MAX) < FIRE_CHANCE`
    pub const FIRE_ROLL_MAX: u32 = 100;
    pub const FIRE_CHANCE: u32 = 5;

    /// Formation line at which the invaders have landed, up from the bottom
    pub const INVASION_LINE_OFFSET: f32 = 70.0;

    /// Points per adversary, multiplied by the current wave
    pub const POINTS_PER_KILL: u32 = 10;

    /// Obstacle layout
    pub const OBSTACLE_CLUSTERS: usize = 4;
    pub const OBSTACLE_COLS: usize = 3;
    pub const OBSTACLE_ROWS: usize = 2;
    pub const OBSTACLE_SIZE: f32 = 20.0;
    pub const OBSTACLE_SPACING: f32 = 5.0;
    pub const OBSTACLE_CLUSTER_PITCH: f32 = 200.0;
    pub const OBSTACLE_TOP_Y: f32 = 1800.0;
}
