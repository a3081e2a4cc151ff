//! Fixed-capacity point storage.
//!
//! A [`PointBuffer`] holds three parallel sequences (positions, RGB colors,
//! and depths) that always have the same length. Index `i` of each refers to
//! the same point. Appends are unconditional until the buffer reaches its
//! capacity; after that the configured [`EvictionPolicy`] decides what a new
//! point does.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Default capacity of a point buffer.
pub const DEFAULT_MAX_POINTS: usize = 100_000_000;

/// What happens to a point added to a full buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EvictionPolicy {
    /// Overwrite the position of a uniformly random slot.
    /// The slot's color and depth are left as they were.
    #[default]
    OverwritePosition,
    /// Overwrite position, color, and depth of a uniformly random slot.
    OverwriteSlot,
    /// Overwrite slots oldest-first, position, color, and depth together.
    Ring,
    /// Drop the new point.
    Reject,
}

/// A growable point/color/depth store with a maximum point count.
#[derive(Debug, Clone)]
pub struct PointBuffer {
    positions: Vec<Vec3>,
    colors: Vec<[u8; 3]>,
    depths: Vec<f32>,
    max_points: usize,
    policy: EvictionPolicy,
    ring_cursor: usize,
    overflow_count: usize,
    rng: StdRng,
}

impl PointBuffer {
    /// Creates an empty buffer with the default eviction policy.
    #[must_use]
    pub fn new(max_points: usize) -> Self {
        Self::with_policy(max_points, EvictionPolicy::default())
    }

    /// Creates an empty buffer with the given eviction policy.
    #[must_use]
    pub fn with_policy(max_points: usize, policy: EvictionPolicy) -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            depths: Vec::new(),
            max_points,
            policy,
            ring_cursor: 0,
            overflow_count: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reseeds the slot picker used by the random eviction policies.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Adds a point with its color.
    ///
    /// Below capacity the point is appended to all three sequences. At
    /// capacity the eviction policy applies and the length does not change.
    pub fn add_point(&mut self, position: Vec3, color: [u8; 3]) {
        if self.positions.len() < self.max_points {
            self.positions.push(position);
            self.colors.push(color);
            self.depths.push(position.z);
            return;
        }

        self.overflow_count += 1;
        if self.overflow_count == 1 {
            log::warn!("reached max number of points ({})", self.max_points);
        } else {
            log::debug!(
                "point buffer full ({}), overflow #{}",
                self.max_points,
                self.overflow_count
            );
        }

        // Nothing to overwrite in a zero-capacity buffer.
        if self.positions.is_empty() {
            return;
        }

        match self.policy {
            EvictionPolicy::OverwritePosition => {
                let slot = self.rng.gen_range(0..self.positions.len());
                self.positions[slot] = position;
            }
            EvictionPolicy::OverwriteSlot => {
                let slot = self.rng.gen_range(0..self.positions.len());
                self.replace(slot, position, color);
            }
            EvictionPolicy::Ring => {
                let slot = self.ring_cursor % self.positions.len();
                self.replace(slot, position, color);
                self.ring_cursor = (slot + 1) % self.positions.len();
            }
            EvictionPolicy::Reject => {}
        }
    }

    fn replace(&mut self, slot: usize, position: Vec3, color: [u8; 3]) {
        self.positions[slot] = position;
        self.colors[slot] = color;
        self.depths[slot] = position.z;
    }

    /// Removes all points. Capacity and policy are kept.
    pub fn clear_points(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.depths.clear();
        self.ring_cursor = 0;
        self.overflow_count = 0;
    }

    /// Returns the number of stored points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no points are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns the capacity.
    #[must_use]
    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Returns the eviction policy.
    #[must_use]
    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Returns how many points arrived while the buffer was full.
    #[must_use]
    pub fn overflow_count(&self) -> usize {
        self.overflow_count
    }

    /// Point positions.
    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Per-point RGB colors.
    #[must_use]
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    /// Per-point depth values.
    #[must_use]
    pub fn depths(&self) -> &[f32] {
        &self.depths
    }

    /// Mean position, or `None` when empty.
    #[must_use]
    pub fn centroid(&self) -> Option<Vec3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec3 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f32)
    }

    /// Smallest and largest depth, or `None` when empty.
    #[must_use]
    pub fn depth_range(&self) -> Option<(f32, f32)> {
        self.depths.iter().fold(None, |range, &d| match range {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
    }
}

impl Default for PointBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POINTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Records every log line so overflow reporting can be checked.
    struct RecordingLogger;

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> = std::sync::Mutex::new(Vec::new());
    static LOGGER: RecordingLogger = RecordingLogger;

    impl log::Log for RecordingLogger {
        fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut records) = RECORDS.lock() {
                records.push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    fn records_containing(needle: &str) -> Vec<log::Level> {
        RECORDS
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .map(|(level, _)| *level)
            .collect()
    }

    fn filled(max: usize, policy: EvictionPolicy) -> PointBuffer {
        let mut buffer = PointBuffer::with_policy(max, policy).with_seed(7);
        for i in 0..max {
            let f = i as f32;
            buffer.add_point(Vec3::new(f, f + 0.5, f + 0.25), [i as u8, 0, 255]);
        }
        buffer
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut buffer = PointBuffer::new(10);
        buffer.add_point(Vec3::new(1.0, 2.0, 3.0), [10, 20, 30]);
        buffer.add_point(Vec3::new(4.0, 5.0, 6.0), [40, 50, 60]);

        assert_eq!(buffer.len(), 2);
        assert_eq!(
            buffer.positions(),
            &[Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)]
        );
        assert_eq!(buffer.colors(), &[[10, 20, 30], [40, 50, 60]]);
        assert_eq!(buffer.depths(), &[3.0, 6.0]);
        assert_eq!(buffer.overflow_count(), 0);
    }

    #[test]
    fn test_overflow_warns_once_then_logs_debug() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);

        // A capacity no other test uses, so its records are easy to pick out
        let mut buffer = filled(37, EvictionPolicy::Reject);
        for _ in 0..4 {
            buffer.add_point(Vec3::ONE, [0, 0, 0]);
        }

        assert_eq!(buffer.overflow_count(), 4);
        assert_eq!(
            records_containing("(37)"),
            vec![
                log::Level::Warn,
                log::Level::Debug,
                log::Level::Debug,
                log::Level::Debug
            ]
        );
    }

    #[test]
    fn test_overwrite_position_changes_one_slot() {
        let mut buffer = filled(5, EvictionPolicy::OverwritePosition);
        let before_positions = buffer.positions().to_vec();
        let before_colors = buffer.colors().to_vec();
        let before_depths = buffer.depths().to_vec();

        let incoming = Vec3::new(-100.0, -100.0, -100.0);
        buffer.add_point(incoming, [1, 2, 3]);

        assert_eq!(buffer.len(), 5);
        let changed: Vec<usize> = (0..5)
            .filter(|&i| buffer.positions()[i] != before_positions[i])
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(buffer.positions()[changed[0]], incoming);
        // Color and depth of the clobbered slot stay stale.
        assert_eq!(buffer.colors(), before_colors.as_slice());
        assert_eq!(buffer.depths(), before_depths.as_slice());
        assert_eq!(buffer.overflow_count(), 1);
    }

    #[test]
    fn test_overwrite_slot_replaces_all_fields() {
        let mut buffer = filled(4, EvictionPolicy::OverwriteSlot);
        let before = buffer.positions().to_vec();

        buffer.add_point(Vec3::new(9.0, 9.0, -9.0), [7, 7, 7]);

        assert_eq!(buffer.len(), 4);
        let slot = (0..4)
            .find(|&i| buffer.positions()[i] != before[i])
            .expect("one slot should change");
        assert_eq!(buffer.colors()[slot], [7, 7, 7]);
        assert_eq!(buffer.depths()[slot], -9.0);
    }

    #[test]
    fn test_ring_overwrites_oldest_first() {
        let mut buffer = filled(3, EvictionPolicy::Ring);
        buffer.add_point(Vec3::splat(10.0), [1, 1, 1]);
        buffer.add_point(Vec3::splat(11.0), [2, 2, 2]);
        buffer.add_point(Vec3::splat(12.0), [3, 3, 3]);
        buffer.add_point(Vec3::splat(13.0), [4, 4, 4]);

        assert_eq!(buffer.len(), 3);
        assert_eq!(
            buffer.positions(),
            &[Vec3::splat(13.0), Vec3::splat(11.0), Vec3::splat(12.0)]
        );
        assert_eq!(buffer.colors(), &[[4, 4, 4], [2, 2, 2], [3, 3, 3]]);
        assert_eq!(buffer.depths(), &[13.0, 11.0, 12.0]);
    }

    #[test]
    fn test_reject_drops_new_points() {
        let mut buffer = filled(2, EvictionPolicy::Reject);
        let before = buffer.positions().to_vec();
        buffer.add_point(Vec3::splat(50.0), [0, 0, 0]);

        assert_eq!(buffer.positions(), before.as_slice());
        assert_eq!(buffer.overflow_count(), 1);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut buffer = PointBuffer::new(0);
        buffer.add_point(Vec3::ONE, [1, 2, 3]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.overflow_count(), 1);
    }

    #[test]
    fn test_clear_points() {
        let mut buffer = filled(3, EvictionPolicy::Ring);
        buffer.add_point(Vec3::ZERO, [0, 0, 0]);
        buffer.clear_points();

        assert!(buffer.is_empty());
        assert!(buffer.colors().is_empty());
        assert!(buffer.depths().is_empty());
        assert_eq!(buffer.overflow_count(), 0);
        assert_eq!(buffer.max_points(), 3);

        buffer.add_point(Vec3::X, [9, 9, 9]);
        assert_eq!(buffer.positions(), &[Vec3::X]);
    }

    #[test]
    fn test_centroid_and_depth_range() {
        let mut buffer = PointBuffer::new(8);
        assert!(buffer.centroid().is_none());
        assert!(buffer.depth_range().is_none());

        buffer.add_point(Vec3::new(0.0, 0.0, -1.0), [0, 0, 0]);
        buffer.add_point(Vec3::new(2.0, 4.0, 3.0), [0, 0, 0]);

        assert_eq!(buffer.centroid(), Some(Vec3::new(1.0, 2.0, 1.0)));
        assert_eq!(buffer.depth_range(), Some((-1.0, 3.0)));
    }

    fn any_policy() -> impl Strategy<Value = EvictionPolicy> {
        prop_oneof![
            Just(EvictionPolicy::OverwritePosition),
            Just(EvictionPolicy::OverwriteSlot),
            Just(EvictionPolicy::Ring),
            Just(EvictionPolicy::Reject),
        ]
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(
            max in 0usize..32,
            policy in any_policy(),
            points in prop::collection::vec((-1e3f32..1e3, -1e3f32..1e3, -1e3f32..1e3), 0..100),
        ) {
            let mut buffer = PointBuffer::with_policy(max, policy).with_seed(1);
            for (x, y, z) in points {
                buffer.add_point(Vec3::new(x, y, z), [0, 128, 255]);
                prop_assert!(buffer.len() <= max);
                prop_assert_eq!(buffer.positions().len(), buffer.colors().len());
                prop_assert_eq!(buffer.positions().len(), buffer.depths().len());
            }
        }

        #[test]
        fn prop_under_capacity_preserves_everything(
            points in prop::collection::vec(((-1e3f32..1e3, -1e3f32..1e3, -1e3f32..1e3), any::<[u8; 3]>()), 0..64),
        ) {
            let mut buffer = PointBuffer::new(64);
            for &((x, y, z), color) in &points {
                buffer.add_point(Vec3::new(x, y, z), color);
            }
            prop_assert_eq!(buffer.len(), points.len());
            for (i, &((x, y, z), color)) in points.iter().enumerate() {
                prop_assert_eq!(buffer.positions()[i], Vec3::new(x, y, z));
                prop_assert_eq!(buffer.colors()[i], color);
                prop_assert_eq!(buffer.depths()[i], z);
            }
        }
    }
}
