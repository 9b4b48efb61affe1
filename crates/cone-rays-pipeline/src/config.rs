//! Estimator configuration.

use anyhow::{Result, ensure};
use cone_rays_core::{FingerSide, Real};
use serde::{Deserialize, Serialize};

/// Configuration for a [`ConeRayEstimator`](crate::ConeRayEstimator).
///
/// Stored in the estimation session and serialized with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Fallback side written into every generated asset.
    pub fallback_side: FingerSide,

    /// Require explicit confirmation before a restart discards a generated
    /// asset that has not been saved.
    pub ask_before_restart: bool,

    /// Push each generated asset to the collector's interactor so it starts
    /// using cone ray detection. Requires hand-tracking events on the
    /// interactor.
    pub set_detection_logic_on_estimation: bool,

    /// End collection and start estimating automatically once this many
    /// seconds of host ticks have elapsed. `None` collects until
    /// `end_and_estimate` is called.
    pub max_collection_secs: Option<Real>,

    /// Maximum number of samples kept per collection; later samples are
    /// rejected. `None` is unbounded.
    pub max_samples: Option<usize>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            fallback_side: FingerSide::Volar,
            ask_before_restart: false,
            set_detection_logic_on_estimation: false,
            max_collection_secs: None,
            max_samples: None,
        }
    }
}

impl EstimatorConfig {
    /// Check the collection limits.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound is zero, negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.max_collection_secs {
            ensure!(
                secs.is_finite() && secs > 0.0,
                "max_collection_secs must be positive (got {})",
                secs
            );
        }
        if let Some(max) = self.max_samples {
            ensure!(max > 0, "max_samples must be positive");
        }
        Ok(())
    }
}
