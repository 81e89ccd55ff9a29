//! Per-frame particle integration
//!
//! One call = one frame. Steps are unit-less (not delta-time scaled), so the
//! display's repaint rate sets the apparent speed.

use glam::Vec2;

use super::particle::{Particle, ParticleSet, Viewport};
use super::zone::ExclusionZone;
use crate::consts::{MIN_REPEL_SPEED, REPEL_NUDGE};

/// Advance every particle by one frame
pub fn step(set: &mut ParticleSet, zone: &ExclusionZone) {
    let viewport = set.viewport();
    for particle in set.iter_mut() {
        step_particle(particle, viewport, zone);
    }
}

fn step_particle(p: &mut Particle, viewport: Viewport, zone: &ExclusionZone) {
    p.pos += p.vel;
    p.rotation += p.rotation_speed();

    // Reflect, don't clamp: the particle may sit outside for a frame. The
    // flipped component always points back inward.
    if p.pos.x < 0.0 {
        p.vel.x = p.vel.x.abs();
    } else if p.pos.x > viewport.width {
        p.vel.x = -p.vel.x.abs();
    }
    if p.pos.y < 0.0 {
        p.vel.y = p.vel.y.abs();
    } else if p.pos.y > viewport.height {
        p.vel.y = -p.vel.y.abs();
    }

    repel(p, viewport, zone);
}

/// Push a particle out of the zone within the same frame it entered
fn repel(p: &mut Particle, viewport: Viewport, zone: &ExclusionZone) {
    if !zone.contains(p.pos) {
        return;
    }

    let center = zone.center();
    let away = Vec2::new(
        if p.pos.x < center.x { -1.0 } else { 1.0 },
        if p.pos.y < center.y { -1.0 } else { 1.0 },
    );
    p.vel = away * p.vel.abs().max(Vec2::splat(MIN_REPEL_SPEED));
    // The push may not carry it off-screen
    p.pos = (p.pos + p.vel * REPEL_NUDGE).clamp(Vec2::ZERO, viewport.size());

    if zone.contains(p.pos) {
        p.pos = zone.exit_within(p.pos, away, viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::particle::Color;

    fn particle(pos: Vec2, vel: Vec2) -> Particle {
        Particle::new(pos, vel, 3.0, 0.0, 0.5, Color::rgb(0x89, 0x19, 0xA5), 0.4)
    }

    fn single(viewport: Viewport, p: Particle) -> ParticleSet {
        ParticleSet::new(viewport, vec![p])
    }

    #[test]
    fn test_integrates_position_and_rotation() {
        let mut set = single(
            Viewport::new(800.0, 600.0),
            particle(Vec2::new(400.0, 300.0), Vec2::new(0.25, -0.5)),
        );
        step(&mut set, &ExclusionZone::none());
        step(&mut set, &ExclusionZone::none());

        let p = &set[0];
        assert_eq!(p.pos, Vec2::new(400.5, 299.0));
        assert_eq!(p.rotation, 1.0);
        assert_eq!(p.vel, Vec2::new(0.25, -0.5));
    }

    #[test]
    fn test_reflects_off_edges() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut set = single(viewport, particle(Vec2::new(0.2, 599.8), Vec2::new(-0.4, 0.3)));
        step(&mut set, &ExclusionZone::none());

        let p = &set[0];
        assert!(p.pos.x < 0.0 && p.pos.y > viewport.height);
        assert_eq!(p.vel, Vec2::new(0.4, -0.3));

        // Next frame heads back inside
        step(&mut set, &ExclusionZone::none());
        assert!(viewport.contains(set[0].pos));
    }

    #[test]
    fn test_repels_resting_particle_upward_and_out() {
        let zone = ExclusionZone::anchored(300.0, 100.0);
        let mut set = single(Viewport::new(1000.0, 800.0), particle(Vec2::new(50.0, 10.0), Vec2::ZERO));
        step(&mut set, &zone);

        let p = &set[0];
        assert!(p.vel.y < 0.0, "pushed up, got {:?}", p.vel);
        assert!(p.vel.x < 0.0, "pushed left, got {:?}", p.vel);
        assert!(!zone.contains(p.pos), "still inside at {:?}", p.pos);
    }

    #[test]
    fn test_repels_far_half_down_right() {
        let zone = ExclusionZone::anchored(300.0, 100.0);
        let mut set = single(
            Viewport::new(1000.0, 800.0),
            particle(Vec2::new(298.0, 98.0), Vec2::new(-0.3, -0.2)),
        );
        step(&mut set, &zone);

        let p = &set[0];
        assert_eq!(p.vel, Vec2::new(0.3, 0.2));
        assert!(!zone.contains(p.pos));
    }

    #[test]
    fn test_nudge_alone_can_clear_zone() {
        let zone = ExclusionZone::anchored(300.0, 100.0);
        // Enters at (299.9, 60.0) moving left; nudge of 5 * 0.3 carries it out
        let mut set = single(
            Viewport::new(1000.0, 800.0),
            particle(Vec2::new(300.2, 60.0), Vec2::new(-0.3, 0.0)),
        );
        step(&mut set, &zone);

        let p = &set[0];
        assert!((p.pos.x - 301.4).abs() < 1e-4, "got {:?}", p.pos);
        assert!((p.pos.y - 60.5).abs() < 1e-4, "got {:?}", p.pos);
        assert!(!zone.contains(p.pos));
    }

    #[test]
    fn test_push_never_leaves_viewport() {
        let viewport = Viewport::new(1000.0, 800.0);
        let zone = ExclusionZone::anchored(300.0, 100.0);
        // A 5x nudge to the left would land at x = -1.5
        let mut set = single(viewport, particle(Vec2::new(1.5, 50.5), Vec2::new(-0.5, 0.0)));
        step(&mut set, &zone);

        let p = &set[0];
        assert!(viewport.contains(p.pos), "pushed off-screen to {:?}", p.pos);
        assert!(!zone.contains(p.pos));
    }

    #[test]
    fn test_reflection_points_inward() {
        let viewport = Viewport::new(800.0, 600.0);
        // Already outside but heading back: no flip
        let mut set = single(viewport, particle(Vec2::new(-0.6, 600.6), Vec2::new(0.1, -0.1)));
        step(&mut set, &ExclusionZone::none());
        assert_eq!(set[0].vel, Vec2::new(0.1, -0.1));
    }

    /// Longest run of consecutive frames spent outside the viewport
    fn longest_offscreen_run(start: Vec2, vel: Vec2, frames: usize) -> (usize, Vec2) {
        let viewport = Viewport::new(1000.0, 800.0);
        let zone = ExclusionZone::anchored(300.0, 100.0);
        let mut set = single(viewport, particle(start, vel));
        let (mut run, mut longest) = (0, 0);
        for _ in 0..frames {
            step(&mut set, &zone);
            assert!(!zone.contains(set[0].pos));
            if viewport.contains(set[0].pos) {
                run = 0;
            } else {
                run += 1;
                longest = longest.max(run);
            }
        }
        (longest, set[0].pos)
    }

    #[test]
    fn test_resting_particle_in_header_stays_on_screen() {
        let (longest, last) = longest_offscreen_run(Vec2::new(50.0, 10.0), Vec2::ZERO, 5000);
        assert!(longest <= 2, "off-screen for {} frames in a row", longest);
        assert!(Viewport::new(1000.0, 800.0).contains(last));
    }

    #[test]
    fn test_entry_from_right_near_top_stays_on_screen() {
        let (longest, last) = longest_offscreen_run(Vec2::new(300.2, 0.3), Vec2::new(-0.3, 0.4), 600);
        assert!(longest <= 2, "off-screen for {} frames in a row", longest);
        assert!(Viewport::new(1000.0, 800.0).contains(last));
    }

    #[test]
    fn test_particles_pass_through_each_other() {
        let viewport = Viewport::new(800.0, 600.0);
        let a = particle(Vec2::new(100.0, 100.0), Vec2::new(0.5, 0.0));
        let b = particle(Vec2::new(100.5, 100.0), Vec2::new(-0.5, 0.0));
        let mut set = ParticleSet::new(viewport, vec![a, b]);
        step(&mut set, &ExclusionZone::none());

        assert_eq!(set[0].pos, Vec2::new(100.5, 100.0));
        assert_eq!(set[1].pos, Vec2::new(100.0, 100.0));
        assert_eq!(set[0].vel.x, 0.5);
        assert_eq!(set[1].vel.x, -0.5);
    }
}
