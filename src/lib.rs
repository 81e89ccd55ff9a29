//! Particle Field - animated particle backgrounds for the review analyzer UI
//!
//! Core modules:
//! - `sim`: Particle store, spawning, physics, proximity graph (no platform deps)
//! - `renderer`: Draw-surface abstraction and the shape renderer
//! - `field`: One particle field instance (simulation + surface)
//! - `scheduler`: Frame loop lifecycle (start/stop/resize)
//! - `platform`: Browser/headless host abstraction
//! - `settings`: Variant presets and JSON overrides

pub mod error;
pub mod field;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use error::FieldError;
pub use field::ParticleField;
pub use scheduler::{FrameScheduler, SchedulerState};
pub use settings::{FieldSettings, Variant};

/// Field configuration constants
pub mod consts {
    /// Background variant: one particle per this many pixels of viewport width
    pub const BACKGROUND_PARTICLE_SPACING: f32 = 10.0;
    /// Background variant: particle count ceiling
    pub const BACKGROUND_MAX_PARTICLES: usize = 150;
    /// Ceiling for any count rule, including overrides (links are an all-pairs scan)
    pub const MAX_PARTICLES: usize = BACKGROUND_MAX_PARTICLES;
    /// Overlay variant: fixed particle count
    pub const OVERLAY_PARTICLE_COUNT: usize = 50;

    /// Link distance thresholds (pixels)
    pub const BACKGROUND_LINK_DISTANCE: f32 = 150.0;
    pub const OVERLAY_LINK_DISTANCE: f32 = 100.0;
    /// Link opacity at zero distance
    pub const LINK_BASE_ALPHA: f32 = 0.2;
    pub const BACKGROUND_LINK_WIDTH: f32 = 0.3;
    pub const OVERLAY_LINK_WIDTH: f32 = 1.0;

    /// Header exclusion zone (anchored at the origin, covers the logo)
    pub const HEADER_ZONE_WIDTH: f32 = 300.0;
    pub const HEADER_ZONE_HEIGHT: f32 = 100.0;

    /// Repulsion: positional nudge as a multiple of velocity
    pub const REPEL_NUDGE: f32 = 5.0;
    /// Repulsion: minimum per-axis speed after a particle is pushed out
    pub const MIN_REPEL_SPEED: f32 = 0.1;
    /// How far past the zone edge an ejected particle lands
    pub const ZONE_EXIT_MARGIN: f32 = 0.5;

    /// Spawn rejection-sampling retries before falling back to ejection
    pub const MAX_SPAWN_ATTEMPTS: u32 = 64;

    /// Frames between debug stat lines
    pub const STATS_LOG_INTERVAL: u64 = 600;
}
