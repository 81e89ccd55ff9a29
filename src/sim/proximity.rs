//! Per-frame proximity graph
//!
//! Every unordered pair closer than the link distance becomes an edge whose
//! alpha falls off linearly to zero at the threshold. All pairs are checked
//! (O(n²)); particle counts are capped at 150 so no spatial index is used.

use super::particle::ParticleSet;
use super::zone::ExclusionZone;

/// A link between particles `i < j` for the current frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub distance: f32,
    pub alpha: f32,
}

/// Link opacity for a pair `distance` apart
#[inline]
pub fn link_alpha(distance: f32, threshold: f32, base_alpha: f32) -> f32 {
    base_alpha * (1.0 - distance / threshold)
}

/// Lazy edge iterator over one frame's positions
///
/// Consumed once by the renderer; build a new one every frame.
pub struct ProximityEdges<'a> {
    set: &'a ParticleSet,
    /// Particles inside the exclusion zone never link
    excluded: Vec<bool>,
    threshold: f32,
    base_alpha: f32,
    i: usize,
    j: usize,
}

impl Iterator for ProximityEdges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let n = self.set.len();
        if self.threshold <= 0.0 {
            return None;
        }
        let threshold_sq = self.threshold * self.threshold;

        while self.i < n {
            if self.excluded[self.i] {
                self.i += 1;
                self.j = self.i + 1;
                continue;
            }
            while self.j < n {
                let j = self.j;
                self.j += 1;
                if self.excluded[j] {
                    continue;
                }
                let dist_sq = self.set[self.i].pos.distance_squared(self.set[j].pos);
                if dist_sq < threshold_sq {
                    let distance = dist_sq.sqrt();
                    return Some(Edge {
                        i: self.i,
                        j,
                        distance,
                        alpha: link_alpha(distance, self.threshold, self.base_alpha),
                    });
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

/// Edges for the current frame
pub fn build_edges<'a>(
    set: &'a ParticleSet,
    zone: &ExclusionZone,
    threshold: f32,
    base_alpha: f32,
) -> ProximityEdges<'a> {
    ProximityEdges {
        set,
        excluded: set.iter().map(|p| zone.contains(p.pos)).collect(),
        threshold,
        base_alpha,
        i: 0,
        j: 1,
    }
}
