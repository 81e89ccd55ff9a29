//! Particle simulation module
//!
//! Everything that moves lives here. This module must stay platform-free:
//! - Seeded RNG only (injected, never ambient)
//! - Stable iteration order (by particle index)
//! - No rendering or browser dependencies

pub mod particle;
pub mod physics;
pub mod proximity;
pub mod spawn;
pub mod zone;

pub use particle::{Color, Particle, ParticleSet, ShapeKind, Viewport};
pub use physics::step;
pub use proximity::{Edge, ProximityEdges, build_edges, link_alpha};
pub use spawn::{ParticleCount, Span, SpawnRanges, initialize};
pub use zone::ExclusionZone;
