//! Data collection: the sample source seam and the sample buffer.

use anyhow::Result;
use cone_rays_core::{AngleSample, ConeRayAngles, Real};
use log::{debug, warn};

use crate::EstimatorError;

/// Identifier of the interactor whose hand supplies the samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InteractorId(pub String);

impl std::fmt::Display for InteractorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of hand-tracking samples for one interactor.
///
/// The estimator calls [`begin_collection`](DataCollector::begin_collection)
/// when a collection starts, drains [`poll_samples`](DataCollector::poll_samples)
/// once per host tick and calls [`end_collection`](DataCollector::end_collection)
/// when the collection ends or is aborted.
pub trait DataCollector {
    /// The interactor samples are collected from; `None` if not configured.
    fn interactor(&self) -> Option<&InteractorId>;

    /// Whether the interactor exposes hand-tracking events, which are needed
    /// to switch it to cone ray detection.
    fn has_hand_tracking_events(&self) -> bool {
        false
    }

    /// Prepare the tracked surfaces for data collection.
    fn begin_collection(&mut self) -> Result<()>;

    /// Samples observed since the previous poll, in arrival order.
    fn poll_samples(&mut self) -> Vec<AngleSample>;

    fn end_collection(&mut self);

    /// Switch the interactor to cone ray detection using `angles`.
    fn apply_cone_ray_angles(&mut self, _angles: &ConeRayAngles) -> Result<()> {
        Ok(())
    }
}

/// Buffer of samples for one collection interval.
///
/// Samples are kept in arrival order. The buffer is cleared on start and
/// handed out on stop.
#[derive(Debug, Clone, Default)]
pub struct DataCollection {
    active: bool,
    buffer: Vec<AngleSample>,
    capacity: Option<usize>,
    rejected: usize,
    elapsed: Real,
}

impl DataCollection {
    /// Inactive collection without a capacity limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection that keeps at most `capacity` samples.
    pub fn with_capacity_limit(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Change the sample limit; applies to samples recorded from now on.
    pub fn set_capacity_limit(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }

    /// Begin accepting samples with an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EstimatorError::CollectionActive`] if already collecting.
    pub fn start(&mut self) -> Result<(), EstimatorError> {
        if self.active {
            return Err(EstimatorError::CollectionActive);
        }
        self.buffer.clear();
        self.rejected = 0;
        self.elapsed = 0.0;
        self.active = true;
        debug!("data collection started");
        Ok(())
    }

    /// Append a sample. Returns `false` if the sample was ignored because no
    /// collection is active, it holds a non-finite value or the capacity
    /// limit is reached.
    pub fn record_sample(&mut self, sample: AngleSample) -> bool {
        if !self.active {
            return false;
        }
        if !sample.is_finite() {
            warn!("ignoring non-finite sample for {} {}", sample.joint, sample.side);
            return false;
        }
        if self.capacity.is_some_and(|cap| self.buffer.len() >= cap) {
            if self.rejected == 0 {
                warn!(
                    "sample buffer full ({} samples); ignoring further samples",
                    self.buffer.len()
                );
            }
            self.rejected += 1;
            return false;
        }
        self.buffer.push(sample);
        true
    }

    /// End accumulation and take the buffer. Empty if nothing was active.
    pub fn stop(&mut self) -> Vec<AngleSample> {
        if self.active {
            debug!(
                "data collection stopped with {} samples ({} rejected) after {:.2}s",
                self.buffer.len(),
                self.rejected,
                self.elapsed
            );
        }
        self.active = false;
        std::mem::take(&mut self.buffer)
    }

    /// Abort the collection and drop its samples.
    pub fn discard(&mut self) {
        let dropped = self.stop();
        if !dropped.is_empty() {
            debug!("discarded {} collected samples", dropped.len());
        }
    }

    /// Account host time towards the collection interval.
    pub fn advance(&mut self, dt: Real) {
        if self.active && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Whether samples are currently accepted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of buffered samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Samples ignored because of the capacity limit.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Seconds of host time accounted since start.
    pub fn elapsed(&self) -> Real {
        self.elapsed
    }
}
