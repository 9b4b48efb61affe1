use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`ConeRayEstimator`](crate::ConeRayEstimator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstimatorState {
    /// Configured, nothing generated yet.
    #[default]
    Ready,
    /// A generated asset is available.
    ReadyAndHaveData,
    /// Samples are being collected.
    CollectingData,
    /// An estimation is pending and completes on the next update.
    EstimatingConeRays,
}

impl EstimatorState {
    /// Whether the estimator accepts a new collection or configuration change.
    pub fn is_at_rest(self) -> bool {
        matches!(self, Self::Ready | Self::ReadyAndHaveData)
    }
}

impl std::fmt::Display for EstimatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Options for [`ConeRayEstimator::start_data_collection`].
///
/// [`ConeRayEstimator::start_data_collection`]: crate::ConeRayEstimator::start_data_collection
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    /// Confirm that an unsaved generated asset may be discarded. Only
    /// consulted when `ask_before_restart` is set.
    pub discard_unsaved: bool,
}

impl StartOptions {
    /// Options that confirm discarding an unsaved generated asset.
    pub fn discard_unsaved() -> Self {
        Self {
            discard_unsaved: true,
        }
    }
}
