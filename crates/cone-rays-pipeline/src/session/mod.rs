//! Estimation session framework.
//!
//! An [`EstimationSession`] is the persistent side of a
//! [`ConeRayEstimator`](crate::ConeRayEstimator): it keeps configuration,
//! the samples of the last collection, the generated asset, its saved
//! copies and an operation log, and can be checkpointed to JSON.
//!
//! ```no_run
//! use cone_rays_pipeline::session::EstimationSession;
//! # fn main() -> anyhow::Result<()> {
//! # let json = unimplemented!();
//!
//! let session = EstimationSession::from_json(json)?;
//! if let Some(asset) = session.output() {
//!     println!("{}", asset.to_json()?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod estimation_session;
pub mod types;

pub use estimation_session::EstimationSession;
pub use types::{LogEntry, SavedAsset, SessionMetadata, current_timestamp};

/// Session kind stored in [`SessionMetadata::kind`].
pub const SESSION_KIND: &str = "cone_ray_estimation";

/// Current schema version of serialized sessions.
pub const SCHEMA_VERSION: u32 = 1;
