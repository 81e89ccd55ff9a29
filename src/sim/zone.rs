//! Exclusion zone geometry
//!
//! An axis-aligned rectangle particles are kept out of (the header/logo
//! region). Containment is inclusive of the edges; a zero-area zone
//! contains nothing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particle::Viewport;
use crate::consts::ZONE_EXIT_MARGIN;

/// Rectangle particles may not rest inside
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Default for ExclusionZone {
    fn default() -> Self {
        Self::none()
    }
}

impl ExclusionZone {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Zone anchored at the surface origin
    pub fn anchored(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// A zone that excludes nothing
    pub fn none() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Inclusive point test
    pub fn contains(&self, p: Vec2) -> bool {
        if self.is_empty() {
            return false;
        }
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    /// Move `p` just past a zone edge without leaving `viewport`
    ///
    /// Edges on the sides `dir` points to (by sign; negative = left/up) are
    /// tried first, then the other two; the shortest move wins. An exit that
    /// lands off-screen (an edge flush with the viewport border) is only
    /// used when the zone leaves no on-screen way out.
    pub fn exit_within(&self, p: Vec2, dir: Vec2, viewport: Viewport) -> Vec2 {
        let (min, max) = (self.min(), self.max());
        let exits = [
            (dir.x < 0.0, Vec2::new(min.x - ZONE_EXIT_MARGIN, p.y)),
            (dir.x >= 0.0, Vec2::new(max.x + ZONE_EXIT_MARGIN, p.y)),
            (dir.y < 0.0, Vec2::new(p.x, min.y - ZONE_EXIT_MARGIN)),
            (dir.y >= 0.0, Vec2::new(p.x, max.y + ZONE_EXIT_MARGIN)),
        ];
        let shortest = |preferred_only: bool, on_screen: bool| {
            exits
                .iter()
                .filter(|(preferred, _)| *preferred || !preferred_only)
                .filter(|(_, q)| viewport.contains(*q) || !on_screen)
                .map(|(_, q)| *q)
                .min_by(|a, b| a.distance_squared(p).total_cmp(&b.distance_squared(p)))
        };

        shortest(true, true)
            .or_else(|| shortest(false, true))
            .or_else(|| shortest(true, false))
            .unwrap_or(p)
    }

    /// Move `p` just past the closest edge that keeps it on screen
    pub fn nearest_exit(&self, p: Vec2, viewport: Viewport) -> Vec2 {
        let (min, max) = (self.min(), self.max());
        let dir = Vec2::new(
            if p.x - min.x < max.x - p.x { -1.0 } else { 1.0 },
            if p.y - min.y < max.y - p.y { -1.0 } else { 1.0 },
        );
        self.exit_within(p, dir, viewport)
    }
}
