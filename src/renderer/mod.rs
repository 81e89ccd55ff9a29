//! Shape renderer
//!
//! Draws one frame onto any `DrawSurface`: clear, particles, then links on top.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod recording;
pub mod shapes;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use shapes::{Outline, outline};
pub use surface::{DrawSurface, Sprite, Stroke};

use crate::settings::{LinkStyle, ShapeStyle};
use crate::sim::{Edge, ParticleSet, ShapeKind};

/// Render a frame: particles first, then every edge over them
pub fn render<S, E>(surface: &mut S, set: &ParticleSet, edges: E, shapes: ShapeStyle, links: &LinkStyle)
where
    S: DrawSurface + ?Sized,
    E: IntoIterator<Item = Edge>,
{
    surface.clear();

    for (index, particle) in set.iter().enumerate() {
        let shape = match shapes {
            ShapeStyle::Mixed => set.shape_of(index),
            ShapeStyle::Circles => ShapeKind::Circle,
        };
        surface.fill(&Sprite {
            shape,
            center: particle.pos,
            size: particle.radius(),
            rotation: particle.rotation,
            color: particle.color(),
            alpha: particle.opacity(),
        });
    }

    for edge in edges {
        surface.stroke(&Stroke {
            from: set[edge.i].pos,
            to: set[edge.j].pos,
            color: links.color,
            alpha: edge.alpha,
            width: links.width,
        });
    }
}
