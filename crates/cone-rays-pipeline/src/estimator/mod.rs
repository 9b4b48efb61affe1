//! The cone ray estimation state machine.
//!
//! ```text
//! Ready            --start_data_collection--> CollectingData
//! CollectingData   --end_and_estimate-------> EstimatingConeRays
//! CollectingData   --abort_data_collection--> Ready
//! EstimatingConeRays --update---------------> ReadyAndHaveData
//! ReadyAndHaveData --start_data_collection--> CollectingData
//! ReadyAndHaveData --re_estimate------------> EstimatingConeRays
//! ```

mod machine;
mod state;

pub use machine::ConeRayEstimator;
pub use state::{EstimatorState, StartOptions};
