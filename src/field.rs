//! A single particle field instance
//!
//! Owns its settings, particle set, drawing surface and RNG. Nothing here is
//! shared between instances.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::renderer::{self, DrawSurface};
use crate::settings::FieldSettings;
use crate::sim::{self, ParticleSet, Viewport};

pub struct ParticleField<S: DrawSurface> {
    settings: FieldSettings,
    particles: ParticleSet,
    surface: S,
    rng: Pcg32,
}

impl<S: DrawSurface> ParticleField<S> {
    /// Spawn a field for `viewport` onto an already-sized surface
    pub fn new(settings: FieldSettings, surface: S, viewport: Viewport, seed: u64) -> Self {
        let mut field = Self {
            settings,
            particles: ParticleSet::default(),
            surface,
            rng: Pcg32::seed_from_u64(seed),
        };
        field.particles = field.spawn(viewport);
        field
    }

    fn spawn(&mut self, viewport: Viewport) -> ParticleSet {
        let s = &self.settings;
        sim::initialize(
            &s.spawn,
            s.count,
            &s.palette,
            viewport,
            &s.exclusion_zone,
            &mut self.rng,
        )
    }

    /// Step, link, draw
    pub fn frame(&mut self) {
        let s = &self.settings;
        sim::step(&mut self.particles, &s.exclusion_zone);
        let edges = sim::build_edges(
            &self.particles,
            &s.exclusion_zone,
            s.links.distance,
            s.links.base_alpha,
        );
        renderer::render(&mut self.surface, &self.particles, edges, s.shapes, &s.links);
    }

    /// Resize the surface and replace the whole particle set
    pub fn resize(&mut self, viewport: Viewport) {
        self.surface.resize(viewport);
        self.particles = self.spawn(viewport);
        log::debug!(
            "Field respawned {} particles for {}x{}",
            self.particles.len(),
            viewport.width,
            viewport.height
        );
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
