//! Fixture builders shared by the workspace test suites.
//!
//! This module is public to allow use across workspace test suites,
//! but is not intended for production use.

use crate::{AngleSample, ConeRayAngleSides, ConeRayAngles, FingerSide, Joint, RayAngle, Real};

/// Tracking tick used by [`sample_stream`], in seconds (72 Hz headset).
pub const TICK: Real = 1.0 / 72.0;

/// A deterministic stream of samples cycling through `keys`.
///
/// Sample `i` belongs to `keys[i % keys.len()]`, is stamped `i * TICK` and
/// carries a ray tilted by `i` degrees with threshold `0.01 * i`.
pub fn sample_stream(keys: &[(Joint, FingerSide)], count: usize) -> Vec<AngleSample> {
    if keys.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|i| {
            let (joint, side) = keys[i % keys.len()];
            let angle = RayAngle::new(i as Real, (i * 15 % 360) as Real, 0.01 * i as Real);
            AngleSample::new(i as Real * TICK, joint, side, angle)
        })
        .collect()
}

/// An asset with one volar and one radial set on every joint.
///
/// Every set holds three rays; the middle one is disabled.
pub fn populated_asset() -> ConeRayAngles {
    let mut asset = ConeRayAngles::new();
    for joint in Joint::ALL {
        let base = joint.index() as Real * 10.0;
        let sides = FingerSide::ALL
            .into_iter()
            .map(|side| {
                let offset = if side == FingerSide::Radial { 90.0 } else { 0.0 };
                ConeRayAngleSides::new(
                    side,
                    vec![
                        RayAngle::new(base, offset, 0.1),
                        RayAngle::new(base + 1.0, offset, -1.0),
                        RayAngle::new(base + 2.0, offset, 0.2),
                    ],
                )
            })
            .collect();
        asset.set_angles(joint, sides);
    }
    asset.refresh_cache();
    asset
}
