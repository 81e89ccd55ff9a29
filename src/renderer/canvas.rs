//! Canvas 2D surface (browser only)

use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::shapes::{Outline, outline};
use super::surface::{DrawSurface, Sprite, Stroke};
use crate::sim::Viewport;

/// A `<canvas>` and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let viewport = Viewport::new(canvas.width() as f32, canvas.height() as f32);
        Self {
            canvas,
            ctx,
            viewport,
        }
    }
}

impl DrawSurface for CanvasSurface {
    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width.max(0.0) as u32);
        self.canvas.set_height(viewport.height.max(0.0) as u32);
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.viewport.width as f64,
            self.viewport.height as f64,
        );
    }

    fn fill(&mut self, sprite: &Sprite) {
        self.ctx.set_global_alpha(sprite.alpha as f64);
        self.ctx.set_fill_style_str(&sprite.color.hex());
        self.ctx.begin_path();

        match outline(sprite) {
            Outline::Polygon(points) => {
                let Some((first, rest)) = points.split_first() else {
                    return;
                };
                self.ctx.move_to(first.x as f64, first.y as f64);
                for p in rest {
                    self.ctx.line_to(p.x as f64, p.y as f64);
                }
                self.ctx.close_path();
            }
            Outline::Circle { center, radius } => {
                // Only fails for a negative radius
                if self
                    .ctx
                    .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
                    .is_err()
                {
                    return;
                }
            }
        }

        self.ctx.fill();
    }

    fn stroke(&mut self, stroke: &Stroke) {
        self.ctx.set_global_alpha(stroke.alpha as f64);
        self.ctx.set_stroke_style_str(&stroke.color.hex());
        self.ctx.set_line_width(stroke.width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(stroke.from.x as f64, stroke.from.y as f64);
        self.ctx.line_to(stroke.to.x as f64, stroke.to.y as f64);
        self.ctx.stroke();
    }
}
