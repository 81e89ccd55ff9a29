//! Immediate-mode 2D drawing surface

use glam::Vec2;

use crate::sim::{Color, ShapeKind, Viewport};

/// One filled particle shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub shape: ShapeKind,
    pub center: Vec2,
    /// Particle radius; shape extents derive from it (see `shapes::outline`)
    pub size: f32,
    /// Degrees, clockwise on screen
    pub rotation: f32,
    pub color: Color,
    pub alpha: f32,
}

/// One straight link line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub from: Vec2,
    pub to: Vec2,
    pub color: Color,
    pub alpha: f32,
    pub width: f32,
}

/// A 2D context with clear/fill/stroke primitives in viewport pixels
pub trait DrawSurface {
    /// Resize the backing store in place
    fn resize(&mut self, viewport: Viewport);
    /// Wipe the whole surface
    fn clear(&mut self);
    fn fill(&mut self, sprite: &Sprite);
    fn stroke(&mut self, stroke: &Stroke);
}
