use thiserror::Error;

use crate::EstimatorState;

/// Configuration and lifecycle errors raised by the estimator.
///
/// Estimator operations return [`anyhow::Result`]; these values can be
/// recovered with `err.downcast_ref::<EstimatorError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    #[error("DataCollector not configured")]
    MissingDataCollector,
    #[error("Interactor in DataCollector not configured")]
    MissingInteractor,
    #[error("ConeRaySegmentComputation not configured")]
    MissingComputation,
    #[error(
        "set_detection_logic_on_estimation is set but the interactor has no hand-tracking events"
    )]
    MissingHandTrackingEvents,
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: EstimatorState,
    },
    #[error("a data collection is already active")]
    CollectionActive,
    #[error("restarting data collection would discard an unsaved generated asset")]
    UnsavedResult,
}
