//! Cone ray angle estimation pipeline.
//!
//! This crate turns hand-tracking samples into a
//! [`ConeRayAngles`](cone_rays_core::ConeRayAngles) asset:
//!
//! - [`DataCollection`] buffers samples over one collection interval, fed by
//!   a host supplied [`DataCollector`].
//! - [`estimate_cone_ray_angles`] groups the samples per (joint, side) and
//!   runs an injected [`ConeRaySegmentComputation`] on each group.
//! - [`ConeRayEstimator`] sequences both as a state machine and keeps its
//!   results in an [`EstimationSession`] that can be checkpointed to JSON.
//!
//! ```no_run
//! use cone_rays_pipeline::{ConeRayEstimator, EstimatorState, StartOptions};
//! # fn main() -> anyhow::Result<()> {
//! # let mut estimator: ConeRayEstimator = unimplemented!();
//!
//! estimator.update_config(|c| c.ask_before_restart = true)?;
//! if estimator.state() == EstimatorState::ReadyAndHaveData {
//!     estimator.start_data_collection(Some(StartOptions::discard_unsaved()))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod estimation;
pub mod estimator;
pub mod session;

pub use collection::{DataCollection, DataCollector, InteractorId};
pub use config::EstimatorConfig;
pub use error::EstimatorError;
pub use estimation::{ConeRaySegmentComputation, EstimationSummary, estimate_cone_ray_angles};
pub use estimator::{ConeRayEstimator, EstimatorState, StartOptions};
pub use session::{EstimationSession, LogEntry, SavedAsset, SessionMetadata};
