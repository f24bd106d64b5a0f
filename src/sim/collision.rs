//! Collision primitives
//!
//! Everything in the arena is an axis-aligned box except the player shot vs
//! adversary test, which is a circular approximation around sprite centres.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Adversary, Obstacle, Projectile, Viewport};
use crate::consts::*;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

/// True iff the rectangles intersect. Touching edges do not count.
#[inline]
pub fn rect_overlap(a: Rect, b: Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// True iff the squared distance between two points is below `threshold_sq`
#[inline]
pub fn point_proximity(p1: Vec2, p2: Vec2, threshold_sq: f32) -> bool {
    p1.distance_squared(p2) < threshold_sq
}

/// Hit-box of a projectile; shots from the player are taller
pub fn projectile_rect(p: &Projectile) -> Rect {
    let h = if p.from_adversary {
        ADVERSARY_SHOT_HEIGHT
    } else {
        PLAYER_SHOT_HEIGHT
    };
    Rect::new(p.x, p.y, PROJECTILE_WIDTH, h)
}

pub fn obstacle_rect(o: &Obstacle) -> Rect {
    Rect::new(o.x, o.y, o.width, o.height)
}

/// Player hit-box, pinned near the bottom of the viewport
pub fn player_rect(player_x: f32, viewport: Viewport) -> Rect {
    Rect::new(
        player_x,
        viewport.height - PLAYER_BOTTOM_OFFSET,
        PLAYER_WIDTH,
        PLAYER_HEIGHT,
    )
}

/// Player shot vs adversary, measured between sprite centres
pub fn shot_hits_adversary(shot: &Projectile, adversary: &Adversary) -> bool {
    let shot_centre = Vec2::new(shot.x + PROJECTILE_WIDTH / 2.0, shot.y + 15.0);
    let adversary_centre = Vec2::new(
        adversary.x + ADVERSARY_WIDTH / 2.0,
        adversary.y + ADVERSARY_HEIGHT / 2.0,
    );
    point_proximity(shot_centre, adversary_centre, HIT_RADIUS_SQ)
}

/// Adversary shot vs player. Always uses the adversary shot height.
pub fn shot_hits_player(shot: &Projectile, player_x: f32, viewport: Viewport) -> bool {
    let shot_box = Rect::new(shot.x, shot.y, PROJECTILE_WIDTH, ADVERSARY_SHOT_HEIGHT);
    rect_overlap(shot_box, player_rect(player_x, viewport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap_intersecting() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(rect_overlap(a, b));
        assert!(rect_overlap(b, a));
    }

    #[test]
    fn test_rect_overlap_touching_edges_miss() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Shares the right edge
        assert!(!rect_overlap(a, Rect::new(10.0, 0.0, 10.0, 10.0)));
        // Shares the bottom edge
        assert!(!rect_overlap(a, Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_overlap_contained() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(rect_overlap(outer, inner));
    }

    #[test]
    fn test_point_proximity_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(point_proximity(a, Vec2::new(29.9, 0.0), HIT_RADIUS_SQ));
        // Exactly on the radius is a miss
        assert!(!point_proximity(a, Vec2::new(30.0, 0.0), HIT_RADIUS_SQ));
        assert!(!point_proximity(a, Vec2::new(20.0, 25.0), HIT_RADIUS_SQ));
    }

    #[test]
    fn test_shot_hits_adversary_centres() {
        let adversary = Adversary { id: 1, x: 100.0, y: 100.0 };
        // Shot centre lands on the adversary centre (125, 115)
        let shot = Projectile::player(120.0, 100.0);
        assert!(shot_hits_adversary(&shot, &adversary));

        let far = Projectile::player(200.0, 100.0);
        assert!(!shot_hits_adversary(&far, &adversary));
    }

    #[test]
    fn test_projectile_rect_height_by_origin() {
        assert_eq!(projectile_rect(&Projectile::player(0.0, 0.0)).h, 50.0);
        assert_eq!(projectile_rect(&Projectile::adversary(0.0, 0.0)).h, 30.0);
    }

    #[test]
    fn test_shot_hits_player() {
        let viewport = Viewport::new(1080.0, 1920.0);
        // Player box spans x 500..550, y 1870..1890
        let hit = Projectile::adversary(520.0, 1850.0);
        assert!(shot_hits_player(&hit, 500.0, viewport));

        // Bottom edge of the shot touches the top of the player box
        let grazing = Projectile::adversary(520.0, 1840.0);
        assert!(!shot_hits_player(&grazing, 500.0, viewport));

        let beside = Projectile::adversary(560.0, 1870.0);
        assert!(!shot_hits_player(&beside, 500.0, viewport));
    }
}
