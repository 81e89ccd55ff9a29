//! Shape generation for particle sprites

use glam::Vec2;

use super::surface::Sprite;
use crate::sim::ShapeKind;

/// World-space geometry for a sprite
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Closed polygon, vertices in draw order
    Polygon(Vec<Vec2>),
    Circle { center: Vec2, radius: f32 },
}

/// Resolve a sprite to its on-screen outline
///
/// With `r = size`: triangle `(0,-r) (r,r) (-r,r)`, square of side `r`,
/// circle of radius `r / 2`, all around `center` and rotated by `rotation`.
pub fn outline(sprite: &Sprite) -> Outline {
    let r = sprite.size;
    let rot = Vec2::from_angle(sprite.rotation.to_radians());
    let place = |local: Vec2| sprite.center + rot.rotate(local);

    match sprite.shape {
        ShapeKind::Triangle => Outline::Polygon(vec![
            place(Vec2::new(0.0, -r)),
            place(Vec2::new(r, r)),
            place(Vec2::new(-r, r)),
        ]),
        ShapeKind::Square => {
            let h = r / 2.0;
            Outline::Polygon(vec![
                place(Vec2::new(-h, -h)),
                place(Vec2::new(h, -h)),
                place(Vec2::new(h, h)),
                place(Vec2::new(-h, h)),
            ])
        }
        ShapeKind::Circle => Outline::Circle {
            center: sprite.center,
            radius: r / 2.0,
        },
    }
}
