//! Cloud decoration that mirrors a ring's shrink
//!
//! Purely cosmetic: reads a ring's progress through [`RingProgress`], eases
//! its own scale a little faster than the ring, and asks to be despawned
//! once the ring has finished.

use glam::Vec3;

use super::ring::{RingProgress, RingShrinker};
use crate::settings::CloudSettings;
use crate::{clamp01, lerp, smoothstep};

/// Height above the cloud from which the downward search starts
const SEARCH_LIFT: f32 = 10.0;

/// Result of one cloud update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudUpdate {
    pub scale: Vec3,
    /// Set exactly once, on the update that should remove the cloud
    pub despawn: bool,
}

#[derive(Debug, Clone)]
pub struct CloudMirror {
    initial_scale: Vec3,
    settings: CloudSettings,
    /// Index of the bound ring in the arena's ring list
    ring: Option<usize>,
    despawned: bool,
}

impl CloudMirror {
    pub fn new(initial_scale: Vec3, settings: CloudSettings) -> Self {
        Self {
            initial_scale,
            settings,
            ring: None,
            despawned: false,
        }
    }

    /// Bind to the nearest ring below `position`
    pub fn bind_below(&mut self, position: Vec3, rings: &[RingShrinker]) -> Option<usize> {
        self.ring = find_ring_below(position, rings, self.settings.max_detection_distance);
        match self.ring {
            Some(i) => log::info!("Cloud at {} bound to {}", position, rings[i].name()),
            None => log::warn!("Cloud at {} found no ring below", position),
        }
        self.ring
    }

    /// Bind explicitly, e.g. when spawning a cloud for a known ring
    pub fn assign_ring(&mut self, index: usize) {
        self.ring = Some(index);
    }

    pub fn ring(&self) -> Option<usize> {
        self.ring
    }

    pub fn is_despawned(&self) -> bool {
        self.despawned
    }

    /// Scale for a given ring progress
    pub fn scale_for(&self, progress: f32) -> Vec3 {
        let accelerated = clamp01(progress * self.settings.speed_multiplier);
        let t = smoothstep(0.0, 1.0, accelerated);
        self.initial_scale * lerp(1.0, self.settings.min_scale, t)
    }

    /// Follow `ring` for one tick. `ring` should be the bound ring.
    pub fn update(&mut self, ring: &impl RingProgress) -> CloudUpdate {
        let scale = self.scale_for(ring.progress());

        let despawn = self.settings.despawn_when_ring_done
            && !self.despawned
            && !ring.is_shrinking()
            && ring.progress() >= 1.0;
        if despawn {
            self.despawned = true;
        }

        CloudUpdate { scale, despawn }
    }
}

/// Nearest ring under `origin` within `max_distance` of vertical drop.
///
/// A ring counts as under the origin when the horizontal offset fits inside
/// its current X/Z extent, treated as a footprint radius.
pub fn find_ring_below(origin: Vec3, rings: &[RingShrinker], max_distance: f32) -> Option<usize> {
    let top = origin.y + SEARCH_LIFT;

    rings
        .iter()
        .enumerate()
        .filter_map(|(i, ring)| {
            let pos = ring.position();
            let drop = top - pos.y;
            if !(0.0..=max_distance).contains(&drop) {
                return None;
            }
            let extent = ring.extent();
            let reach = extent.x.max(extent.z);
            let dx = origin.x - pos.x;
            let dz = origin.z - pos.z;
            (dx * dx + dz * dz <= reach * reach).then_some((i, drop))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRing {
        progress: f32,
        shrinking: bool,
    }

    impl RingProgress for FakeRing {
        fn progress(&self) -> f32 {
            self.progress
        }

        fn is_shrinking(&self) -> bool {
            self.shrinking
        }
    }

    fn cloud() -> CloudMirror {
        CloudMirror::new(Vec3::splat(2.0), CloudSettings::default())
    }

    #[test]
    fn cloud_shrinks_faster_than_ring() {
        let c = cloud();
        assert_eq!(c.scale_for(0.0), Vec3::splat(2.0));
        // 1 / 1.3 of the way the cloud is already at its minimum
        let at_min = c.scale_for(1.0 / 1.3 + 0.01);
        assert!((at_min.x - 0.1).abs() < 1e-5);
        assert!(c.scale_for(0.5).x < 2.0 * lerp(1.0, 0.05, smoothstep(0.0, 1.0, 0.5)));
    }

    #[test]
    fn despawns_once_when_ring_finishes() {
        let mut c = cloud();
        let shrinking = FakeRing { progress: 0.9, shrinking: true };
        assert!(!c.update(&shrinking).despawn);

        let done = FakeRing { progress: 1.0, shrinking: false };
        assert!(c.update(&done).despawn);
        assert!(c.is_despawned());
        assert!(!c.update(&done).despawn);
    }

    #[test]
    fn paused_ring_does_not_despawn_cloud() {
        let mut c = cloud();
        let paused = FakeRing { progress: 0.4, shrinking: false };
        assert!(!c.update(&paused).despawn);
    }

    #[test]
    fn despawn_can_be_disabled() {
        let mut c = CloudMirror::new(
            Vec3::ONE,
            CloudSettings {
                despawn_when_ring_done: false,
                ..Default::default()
            },
        );
        let done = FakeRing { progress: 1.0, shrinking: false };
        let update = c.update(&done);
        assert!(!update.despawn);
        assert_eq!(update.scale, Vec3::splat(0.05));
    }

    #[test]
    fn follows_a_real_ring() {
        let mut ring = RingShrinker::new("R", Vec3::ONE, 0.5, 2.0);
        let mut c = cloud();
        c.assign_ring(0);
        ring.start();
        ring.advance(1.0);
        assert!(!c.update(&ring).despawn);
        ring.advance(1.0);
        assert!(c.update(&ring).despawn);
    }

    #[test]
    fn binds_to_nearest_ring_below() {
        let rings = vec![
            RingShrinker::new("Low", Vec3::splat(50.0), 10.0, 20.0).with_position(Vec3::new(0.0, -40.0, 0.0)),
            RingShrinker::new("High", Vec3::splat(50.0), 10.0, 20.0).with_position(Vec3::new(0.0, -5.0, 0.0)),
            RingShrinker::new("Far", Vec3::splat(5.0), 1.0, 20.0).with_position(Vec3::new(200.0, 0.0, 0.0)),
        ];
        let mut c = cloud();
        assert_eq!(c.bind_below(Vec3::new(3.0, 20.0, 4.0), &rings), Some(1));
        assert_eq!(c.ring(), Some(1));
    }

    #[test]
    fn nothing_below_leaves_cloud_unbound() {
        let rings = vec![
            RingShrinker::new("Above", Vec3::splat(50.0), 10.0, 20.0).with_position(Vec3::new(0.0, 100.0, 0.0)),
            RingShrinker::new("Deep", Vec3::splat(50.0), 10.0, 20.0).with_position(Vec3::new(0.0, -500.0, 0.0)),
            RingShrinker::new("Aside", Vec3::splat(5.0), 1.0, 20.0).with_position(Vec3::new(100.0, 0.0, 0.0)),
        ];
        assert_eq!(find_ring_below(Vec3::ZERO, &rings, 100.0), None);
        let mut c = cloud();
        assert_eq!(c.bind_below(Vec3::ZERO, &rings), None);
    }
}
