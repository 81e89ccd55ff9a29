//! Headless draw surface that records commands
//!
//! Keeps the most recent frame's commands plus running counters. Clones share
//! the same recording, so a test can keep a handle while the field owns the
//! surface.

use std::cell::RefCell;
use std::rc::Rc;

use super::surface::{DrawSurface, Sprite, Stroke};
use crate::sim::Viewport;

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill(Sprite),
    Stroke(Stroke),
}

#[derive(Debug, Default)]
struct Recording {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
    frames: u64,
    resizes: u32,
}

/// Surface that draws nothing and remembers everything
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        let surface = Self::default();
        surface.inner.borrow_mut().viewport = viewport;
        surface
    }

    pub fn viewport(&self) -> Viewport {
        self.inner.borrow().viewport
    }

    /// Number of `clear` calls so far (one per rendered frame)
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }

    pub fn resizes(&self) -> u32 {
        self.inner.borrow().resizes
    }

    /// Commands issued since the last `clear`
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.inner.borrow().commands.clone()
    }

    pub fn fill_count(&self) -> usize {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill(_)))
            .count()
    }

    pub fn stroke_count(&self) -> usize {
        self.inner
            .borrow()
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Stroke(_)))
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn resize(&mut self, viewport: Viewport) {
        let mut rec = self.inner.borrow_mut();
        rec.viewport = viewport;
        rec.resizes += 1;
    }

    fn clear(&mut self) {
        let mut rec = self.inner.borrow_mut();
        rec.commands.clear();
        rec.frames += 1;
    }

    fn fill(&mut self, sprite: &Sprite) {
        self.inner.borrow_mut().commands.push(DrawCommand::Fill(*sprite));
    }

    fn stroke(&mut self, stroke: &Stroke) {
        self.inner.borrow_mut().commands.push(DrawCommand::Stroke(*stroke));
    }
}
