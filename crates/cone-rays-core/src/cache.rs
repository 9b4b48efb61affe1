//! Active angle index used by the interaction layer on every frame.
//!
//! The cache is a derived view of the raw per-joint angle sets: only rays
//! with a non-negative selection threshold are kept, keyed by
//! `(Joint, FingerSide)`. It is always rebuilt wholesale from the raw data
//! and never patched in place.

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};

use crate::{ConeRayAngleSides, FingerSide, Joint, RayAngle};

/// Summary of one cache rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheRefreshReport {
    /// Number of (joint, side) entries in the rebuilt index.
    pub indexed_sides: usize,
    /// Rays left out because their selection threshold is negative.
    pub dropped_angles: usize,
    /// Side sets ignored because an earlier set already claimed the same
    /// (joint, side) key.
    pub duplicate_sides: usize,
}

/// Filtered `(Joint, FingerSide) -> enabled rays` index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleCache {
    active: HashMap<(Joint, FingerSide), Vec<RayAngle>>,
}

impl AngleCache {
    /// Build an index from raw per-joint side sets.
    ///
    /// Joints are visited in [`Joint::ALL`] order and side sets in stored
    /// order. The first set seen for a key wins; later sets for the same key
    /// are skipped and counted in [`CacheRefreshReport::duplicate_sides`].
    pub fn build(angles: &BTreeMap<Joint, Vec<ConeRayAngleSides>>) -> (Self, CacheRefreshReport) {
        let mut active = HashMap::new();
        let mut report = CacheRefreshReport::default();

        for joint in Joint::ALL {
            let Some(sides) = angles.get(&joint) else {
                continue;
            };
            for angle_side in sides {
                let key = (joint, angle_side.side);
                if active.contains_key(&key) {
                    warn!(
                        "ignoring duplicate {} angle set for {} ({} rays)",
                        angle_side.side,
                        joint,
                        angle_side.ray_angles.len()
                    );
                    report.duplicate_sides += 1;
                    continue;
                }

                let enabled: Vec<RayAngle> = angle_side.enabled().copied().collect();
                let dropped = angle_side.ray_angles.len() - enabled.len();
                if dropped > 0 {
                    info!(
                        "removed {} rays from {} {} as they had a selection threshold below 0",
                        dropped, joint, angle_side.side
                    );
                }
                report.dropped_angles += dropped;
                active.insert(key, enabled);
            }
        }

        report.indexed_sides = active.len();
        (Self { active }, report)
    }

    /// Enabled rays for `(joint, side)`, falling back to `fallback_side`.
    ///
    /// Returns the exact entry if it is non-empty, else the fallback entry if
    /// that is non-empty, else `None`.
    pub fn get(
        &self,
        joint: Joint,
        side: FingerSide,
        fallback_side: FingerSide,
    ) -> Option<&[RayAngle]> {
        self.non_empty(joint, side)
            .or_else(|| self.non_empty(joint, fallback_side))
    }

    /// Whether the index holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of indexed (joint, side) entries, empty ones included.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    fn non_empty(&self, joint: Joint, side: FingerSide) -> Option<&[RayAngle]> {
        self.active
            .get(&(joint, side))
            .filter(|angles| !angles.is_empty())
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(x: f64, threshold: f64) -> RayAngle {
        RayAngle::new(x, 0.0, threshold)
    }

    #[test]
    fn empty_cache_yields_none() {
        let cache = AngleCache::default();
        for joint in Joint::ALL {
            for side in FingerSide::ALL {
                assert!(cache.get(joint, side, FingerSide::Volar).is_none());
            }
        }
    }

    #[test]
    fn filters_negative_thresholds_in_order() {
        let mut angles = BTreeMap::new();
        angles.insert(
            Joint::IndexDistal,
            vec![ConeRayAngleSides::new(
                FingerSide::Volar,
                vec![ray(1.0, 0.1), ray(2.0, -0.5), ray(3.0, 0.3)],
            )],
        );

        let (cache, report) = AngleCache::build(&angles);
        assert_eq!(report.dropped_angles, 1);
        assert_eq!(report.duplicate_sides, 0);
        assert_eq!(report.indexed_sides, 1);

        let got = cache
            .get(Joint::IndexDistal, FingerSide::Volar, FingerSide::Volar)
            .unwrap();
        assert_eq!(got, &[ray(1.0, 0.1), ray(3.0, 0.3)]);
    }

    #[test]
    fn first_seen_side_wins() {
        let mut angles = BTreeMap::new();
        angles.insert(
            Joint::RingProximal,
            vec![
                ConeRayAngleSides::new(FingerSide::Radial, vec![ray(1.0, 0.1)]),
                ConeRayAngleSides::new(FingerSide::Radial, vec![ray(9.0, 0.1), ray(8.0, 0.1)]),
            ],
        );

        let (cache, report) = AngleCache::build(&angles);
        assert_eq!(report.duplicate_sides, 1);
        assert_eq!(
            cache.get(Joint::RingProximal, FingerSide::Radial, FingerSide::Volar),
            Some(&[ray(1.0, 0.1)][..])
        );
    }

    #[test]
    fn fully_disabled_side_falls_back() {
        let mut angles = BTreeMap::new();
        angles.insert(
            Joint::LittleDistal,
            vec![
                ConeRayAngleSides::new(FingerSide::Radial, vec![ray(1.0, -1.0)]),
                ConeRayAngleSides::new(FingerSide::Volar, vec![ray(2.0, 0.0)]),
            ],
        );

        let (cache, _) = AngleCache::build(&angles);
        assert_eq!(
            cache.get(Joint::LittleDistal, FingerSide::Radial, FingerSide::Volar),
            Some(&[ray(2.0, 0.0)][..])
        );
        // Radial has no enabled rays, so falling back onto it finds nothing.
        assert!(
            cache
                .get(Joint::LittleDistal, FingerSide::Radial, FingerSide::Radial)
                .is_none()
        );
        assert!(
            cache
                .get(Joint::IndexProximal, FingerSide::Radial, FingerSide::Volar)
                .is_none()
        );
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut angles = BTreeMap::new();
        angles.insert(
            Joint::MiddleIntermediate,
            vec![ConeRayAngleSides::new(
                FingerSide::Volar,
                vec![ray(4.0, 0.2), ray(5.0, -0.2)],
            )],
        );
        let (first, first_report) = AngleCache::build(&angles);
        let (second, second_report) = AngleCache::build(&angles);
        assert_eq!(first, second);
        assert_eq!(first_report, second_report);
    }
}
