//! Estimation pipeline: collected samples to a generated asset.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use cone_rays_core::{
    AngleSample, ConeRayAngleSides, ConeRayAngles, FingerSide, Joint, RayAngle,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::EstimatorError;

// ─────────────────────────────────────────────────────────────────────────────
// Strategy
// ─────────────────────────────────────────────────────────────────────────────

/// Converts the samples of one (joint, side) group into ray angles.
///
/// Implementations are expected to be deterministic: the same samples must
/// yield the same angles, so re-estimating from stored samples reproduces
/// the asset.
pub trait ConeRaySegmentComputation {
    /// Ray angles for one (joint, side) group of samples, in cast order.
    ///
    /// # Errors
    ///
    /// Implementation specific; the pipeline aborts on the first error.
    fn compute(
        &self,
        joint: Joint,
        side: FingerSide,
        samples: &[AngleSample],
    ) -> Result<Vec<RayAngle>>;
}

impl<F> ConeRaySegmentComputation for F
where
    F: Fn(Joint, FingerSide, &[AngleSample]) -> Result<Vec<RayAngle>>,
{
    fn compute(
        &self,
        joint: Joint,
        side: FingerSide,
        samples: &[AngleSample],
    ) -> Result<Vec<RayAngle>> {
        self(joint, side, samples)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Counts gathered while estimating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationSummary {
    /// Samples consumed.
    pub samples: usize,
    /// (joint, side) groups that had samples.
    pub groups: usize,
    /// (joint, side) groups without samples.
    pub empty_groups: usize,
    /// Ray angles produced, enabled or not.
    pub angles: usize,
}

impl std::fmt::Display for EstimationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} samples in {} groups ({} empty), {} angles",
            self.samples, self.groups, self.empty_groups, self.angles
        )
    }
}

/// Generate a cone ray angle asset from collected samples.
///
/// Samples are grouped by (joint, side), keeping arrival order within each
/// group. Every joint receives one set per side in [`FingerSide::ALL`]
/// order; groups without samples produce an empty set and the strategy is
/// not called for them. The returned asset has its cache refreshed.
///
/// # Errors
///
/// - [`EstimatorError::MissingComputation`] if `computation` is `None`.
/// - The first strategy error, with context naming the joint and side.
/// - A strategy result holding a non-finite angle or threshold, which could
///   not be written to the asset.
pub fn estimate_cone_ray_angles(
    samples: &[AngleSample],
    computation: Option<&dyn ConeRaySegmentComputation>,
    fallback_side: FingerSide,
) -> Result<(ConeRayAngles, EstimationSummary)> {
    let computation = computation.ok_or(EstimatorError::MissingComputation)?;

    let mut groups: HashMap<(Joint, FingerSide), Vec<AngleSample>> = HashMap::new();
    for sample in samples {
        groups.entry(sample.key()).or_default().push(*sample);
    }

    let mut summary = EstimationSummary {
        samples: samples.len(),
        ..Default::default()
    };
    let mut asset = ConeRayAngles::with_fallback_side(fallback_side);

    for joint in Joint::ALL {
        let mut sides = Vec::with_capacity(FingerSide::ALL.len());
        for side in FingerSide::ALL {
            let Some(group) = groups.get(&(joint, side)) else {
                summary.empty_groups += 1;
                sides.push(ConeRayAngleSides::empty(side));
                continue;
            };

            let ray_angles = computation
                .compute(joint, side, group)
                .with_context(|| format!("cone ray computation failed for {joint} {side}"))?;
            if let Some(bad) = ray_angles.iter().find(|a| !a.is_finite()) {
                bail!(
                    "cone ray computation for {joint} {side} produced a non-finite angle: {bad:?}"
                );
            }
            debug!(
                "{} {}: {} samples -> {} angles",
                joint,
                side,
                group.len(),
                ray_angles.len()
            );
            summary.groups += 1;
            summary.angles += ray_angles.len();
            sides.push(ConeRayAngleSides::new(side, ray_angles));
        }
        asset.set_angles(joint, sides);
    }

    asset.refresh_cache();
    info!("estimated cone ray angles: {}", summary);
    Ok((asset, summary))
}
