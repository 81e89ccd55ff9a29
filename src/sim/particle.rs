//! Particle store and core simulation types
//!
//! A `ParticleSet` owns every live particle plus the viewport it was spawned
//! into. It is replaced wholesale on resize, never patched.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Drawing surface dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Bottom-right corner
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height).max(Vec2::ZERO)
    }

    /// Whether a point lies within `[0, width] × [0, height]`
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// An sRGB color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// CSS hex string, e.g. `#8919A5`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s).ok_or_else(|| format!("invalid color '{}', expected #RRGGBB", s))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.hex()
    }
}

/// Shape a particle is drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Triangle,
    Square,
    Circle,
}

impl ShapeKind {
    /// Partition by normalized index (`index / count`) into thirds
    pub fn for_index(index: usize, count: usize) -> Self {
        if count == 0 {
            return ShapeKind::Circle;
        }
        let t = index as f32 / count as f32;
        if t < 1.0 / 3.0 {
            ShapeKind::Triangle
        } else if t < 2.0 / 3.0 {
            ShapeKind::Square
        } else {
            ShapeKind::Circle
        }
    }
}

/// A single simulated particle
///
/// Only `pos`, `vel` and `rotation` evolve; the rest is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees, unbounded
    pub rotation: f32,
    radius: f32,
    rotation_speed: f32,
    color: Color,
    opacity: f32,
}

impl Particle {
    pub fn new(
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        rotation: f32,
        rotation_speed: f32,
        color: Color,
        opacity: f32,
    ) -> Self {
        Self {
            pos,
            vel,
            rotation,
            radius,
            rotation_speed,
            color,
            opacity,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Degrees per frame
    #[inline]
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

/// The live particle set for one field instance
#[derive(Debug, Clone, Default)]
pub struct ParticleSet {
    viewport: Viewport,
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new(viewport: Viewport, particles: Vec<Particle>) -> Self {
        Self {
            viewport,
            particles,
        }
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    /// Shape for the particle at `index`
    pub fn shape_of(&self, index: usize) -> ShapeKind {
        ShapeKind::for_index(index, self.particles.len())
    }
}

impl std::ops::Index<usize> for ParticleSet {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.particles[index]
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}
