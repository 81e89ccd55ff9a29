//! Particle initialization
//!
//! Spawns a full particle set for a viewport. Positions are rejection-sampled
//! so nothing starts inside the exclusion zone. The RNG is injected so tests
//! can seed it; production seeds a `Pcg32` from the clock.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::particle::{Color, Particle, ParticleSet, Viewport};
use super::zone::ExclusionZone;
use crate::consts::*;

/// Half-open sampling range `[min, max)`; `min == max` always yields `min`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Whether `v` could have come from `sample`
    pub fn covers(&self, v: f32) -> bool {
        if self.max > self.min {
            v >= self.min && v < self.max
        } else {
            v == self.min
        }
    }
}

/// How many particles a viewport gets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ParticleCount {
    /// `min(floor(width / spacing), max)`
    PerWidth { spacing: f32, max: usize },
    Fixed { count: usize },
}

impl ParticleCount {
    pub fn for_viewport(&self, viewport: Viewport) -> usize {
        match *self {
            ParticleCount::PerWidth { spacing, max } => {
                if spacing <= 0.0 || viewport.width <= 0.0 {
                    return 0;
                }
                ((viewport.width / spacing).floor() as usize).min(max)
            }
            ParticleCount::Fixed { count } => count,
        }
    }
}

/// Per-particle attribute ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRanges {
    pub radius: Span,
    /// Applied independently to each velocity component
    pub speed: Span,
    pub opacity: Span,
    /// Degrees
    pub rotation: Span,
    /// Degrees per frame
    pub rotation_speed: Span,
}

impl Default for SpawnRanges {
    fn default() -> Self {
        Self {
            radius: Span::new(1.0, 6.0),
            speed: Span::new(-0.5, 0.5),
            opacity: Span::new(0.1, 0.6),
            rotation: Span::new(0.0, 360.0),
            rotation_speed: Span::new(-1.0, 1.0),
        }
    }
}

/// Uniform point over the viewport, redrawn while inside `zone`
///
/// Gives up after `MAX_SPAWN_ATTEMPTS` and ejects the last candidate through
/// the nearest on-screen zone edge instead. Returns the point and whether it fell back.
fn spawn_point<R: Rng + ?Sized>(viewport: Viewport, zone: &ExclusionZone, rng: &mut R) -> (Vec2, bool) {
    let mut candidate = Vec2::ZERO;
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        candidate = Vec2::new(
            rng.random::<f32>() * viewport.width,
            rng.random::<f32>() * viewport.height,
        );
        if !zone.contains(candidate) {
            return (candidate, false);
        }
    }
    (zone.nearest_exit(candidate, viewport), true)
}

/// Build a fresh particle set for `viewport`
pub fn initialize<R: Rng + ?Sized>(
    ranges: &SpawnRanges,
    count: ParticleCount,
    palette: &[Color],
    viewport: Viewport,
    zone: &ExclusionZone,
    rng: &mut R,
) -> ParticleSet {
    let n = if palette.is_empty() {
        0
    } else {
        count.for_viewport(viewport)
    };

    let mut fallbacks = 0;
    let particles = (0..n)
        .map(|i| {
            let (pos, fell_back) = spawn_point(viewport, zone, rng);
            if fell_back {
                fallbacks += 1;
            }
            Particle::new(
                pos,
                Vec2::new(ranges.speed.sample(rng), ranges.speed.sample(rng)),
                ranges.radius.sample(rng),
                ranges.rotation.sample(rng),
                ranges.rotation_speed.sample(rng),
                palette[i % palette.len()],
                ranges.opacity.sample(rng),
            )
        })
        .collect();

    if fallbacks > 0 {
        log::warn!(
            "{} of {} particles could not be placed outside the exclusion zone in {}x{}",
            fallbacks,
            n,
            viewport.width,
            viewport.height
        );
    }

    ParticleSet::new(viewport, particles)
}
