//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed tick length
//! - Injected randomness only
//! - Stable iteration order (formation order, spawn order)
//! - No scheduling, storage, or rendering dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Rect, point_proximity, rect_overlap};
pub use state::{
    Adversary, Obstacle, Player, Projectile, Viewport, World, create_formation, create_obstacles,
};
pub use tick::{RandomSource, SeededRng, advance};
