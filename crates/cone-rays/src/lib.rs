//! High-level entry crate for cone ray angle estimation.
//!
//! Cone rays detect touch and hover between a thumb and the segments of the
//! other fingers: each finger joint casts a fan of rays whose directions and
//! selection thresholds are estimated per user from hand-tracking data. This
//! crate provides:
//! - the angle data asset with its lookup cache ([`ConeRayAngles`])
//! - the estimator state machine that collects samples and generates the
//!   asset ([`ConeRayEstimator`])
//! - a JSON checkpointable session ([`EstimationSession`])
//!
//! # Quick Start
//!
//! ```no_run
//! use cone_rays::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! # struct Hand(InteractorId);
//! # impl DataCollector for Hand {
//! #     fn interactor(&self) -> Option<&InteractorId> { Some(&self.0) }
//! #     fn begin_collection(&mut self) -> anyhow::Result<()> { Ok(()) }
//! #     fn poll_samples(&mut self) -> Vec<AngleSample> { Vec::new() }
//! #     fn end_collection(&mut self) {}
//! # }
//! let mut estimator = ConeRayEstimator::new();
//! estimator.set_data_collector(Hand(InteractorId("right_hand".into())))?;
//! estimator.set_computation(
//!     |_: Joint, _: FingerSide, samples: &[AngleSample]| -> anyhow::Result<Vec<RayAngle>> {
//!         Ok(samples.iter().map(|s| s.angle).collect())
//!     },
//! )?;
//!
//! estimator.start_data_collection(None)?;
//! // ... host ticks while the user moves the thumb over each segment
//! estimator.update(1.0 / 72.0)?;
//! estimator.end_and_estimate()?;
//! estimator.update(1.0 / 72.0)?;
//!
//! let asset = estimator.save_generated_asset(None)?;
//! let rays = asset.get_angles(Joint::IndexDistal, FingerSide::Radial);
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`core`] - Joints, ray angles, the angle asset and its cache
//! - [`collection`] - Sample sources and the collection buffer
//! - [`estimation`] - The estimation pipeline and its strategy trait
//! - [`session`] - Session container and JSON checkpointing
//!
//! # Lookup
//!
//! [`ConeRayAngles::get_angles`] returns the enabled rays (non-negative
//! selection threshold) stored for a joint and side. When that side has
//! none, the asset's fallback side is used instead.

// ═══════════════════════════════════════════════════════════════════════════════
// Foundation
// ═══════════════════════════════════════════════════════════════════════════════

/// Data model: joints, ray angles, the angle asset and its cache.
pub mod core {
    pub use cone_rays_core::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Estimation Workflow
// ═══════════════════════════════════════════════════════════════════════════════

/// Sample sources and the per-collection sample buffer.
pub mod collection {
    pub use cone_rays_pipeline::collection::{DataCollection, DataCollector, InteractorId};
}

/// The estimation pipeline.
///
/// # Example
/// ```
/// use cone_rays::prelude::*;
/// use cone_rays::estimation::estimate_cone_ray_angles;
///
/// # fn main() -> anyhow::Result<()> {
/// let samples = vec![AngleSample::new(
///     0.0,
///     Joint::RingProximal,
///     FingerSide::Volar,
///     RayAngle::new(12.0, 40.0, 0.3),
/// )];
/// let keep = |_: Joint, _: FingerSide, s: &[AngleSample]| -> anyhow::Result<Vec<RayAngle>> {
///     Ok(s.iter().map(|s| s.angle).collect())
/// };
/// let (asset, summary) = estimate_cone_ray_angles(&samples, Some(&keep), FingerSide::Volar)?;
///
/// assert_eq!(summary.groups, 1);
/// assert!(asset.get_angles(Joint::RingProximal, FingerSide::Radial).is_some());
/// # Ok(())
/// # }
/// ```
pub mod estimation {
    pub use cone_rays_pipeline::estimation::{
        ConeRaySegmentComputation, EstimationSummary, estimate_cone_ray_angles,
    };
}

/// Session framework with JSON checkpointing.
pub mod session {
    pub use cone_rays_pipeline::session::{
        EstimationSession, LogEntry, SCHEMA_VERSION, SESSION_KIND, SavedAsset, SessionMetadata,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level Re-exports
// ═══════════════════════════════════════════════════════════════════════════════

pub use cone_rays_core::{
    AngleCache, AngleDataError, AngleSample, CacheRefreshReport, ConeRayAngleSides,
    ConeRayAngles, Finger, FingerSide, JOINT_COUNT, Joint, RayAngle, Real, Segment,
};
pub use cone_rays_pipeline::{
    ConeRayEstimator, EstimationSession, EstimatorConfig, EstimatorError, EstimatorState,
    StartOptions,
};

/// Prelude module for convenient imports.
///
/// ```no_run
/// use cone_rays::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use crate::{
        AngleSample, ConeRayAngleSides, ConeRayAngles, FingerSide, Joint, RayAngle, Real,
    };

    // Estimator
    pub use crate::{
        ConeRayEstimator, EstimationSession, EstimatorConfig, EstimatorError, EstimatorState,
        StartOptions,
    };

    // Collaborator traits
    pub use crate::collection::{DataCollector, InteractorId};
    pub use crate::estimation::ConeRaySegmentComputation;
}
