use anyhow::{Context, Result};
use cone_rays_core::{AngleSample, ConeRayAngles, Real};
use log::{debug, info, warn};

use super::state::{EstimatorState, StartOptions};
use crate::collection::{DataCollection, DataCollector};
use crate::estimation::{ConeRaySegmentComputation, EstimationSummary, estimate_cone_ray_angles};
use crate::session::EstimationSession;
use crate::{EstimatorConfig, EstimatorError};

type AssetListener = Box<dyn FnMut(&ConeRayAngles)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingEstimation {
    /// Samples of the collection that just ended.
    FromCollection,
    /// Samples stored by the previous collection.
    Rerun,
}

impl PendingEstimation {
    fn operation(self) -> &'static str {
        match self {
            Self::FromCollection => "estimate",
            Self::Rerun => "re_estimate",
        }
    }

    /// State to return to if the estimation fails.
    fn rest_state(self) -> EstimatorState {
        match self {
            Self::FromCollection => EstimatorState::Ready,
            Self::Rerun => EstimatorState::ReadyAndHaveData,
        }
    }
}

/// Drives data collection and cone ray estimation for one interactor.
///
/// The estimator is single threaded and advanced by the host through
/// [`update`](Self::update). Estimation is deferred: after
/// [`end_and_estimate`](Self::end_and_estimate) or
/// [`re_estimate`](Self::re_estimate) the state is
/// [`EstimatorState::EstimatingConeRays`] until the next update runs the
/// pipeline.
///
/// Operations return [`anyhow::Result`]; configuration and lifecycle
/// violations carry an [`EstimatorError`] and leave the state unchanged.
///
/// # Example
///
/// ```no_run
/// use cone_rays_pipeline::{ConeRayEstimator, DataCollector, EstimatorState, InteractorId};
/// # use cone_rays_core::AngleSample;
/// # struct Hand(InteractorId);
/// # impl DataCollector for Hand {
/// #     fn interactor(&self) -> Option<&InteractorId> { Some(&self.0) }
/// #     fn begin_collection(&mut self) -> anyhow::Result<()> { Ok(()) }
/// #     fn poll_samples(&mut self) -> Vec<AngleSample> { Vec::new() }
/// #     fn end_collection(&mut self) {}
/// # }
/// # fn main() -> anyhow::Result<()> {
/// # let collector = Hand(InteractorId("right".into()));
/// # fn strategy(
/// #     _: cone_rays_core::Joint,
/// #     _: cone_rays_core::FingerSide,
/// #     s: &[cone_rays_core::AngleSample],
/// # ) -> anyhow::Result<Vec<cone_rays_core::RayAngle>> {
/// #     Ok(s.iter().map(|s| s.angle).collect())
/// # }
/// let mut estimator = ConeRayEstimator::new();
/// estimator.set_data_collector(collector)?;
/// estimator.set_computation(strategy)?;
///
/// estimator.start_data_collection(None)?;
/// for _ in 0..720 {
///     estimator.update(1.0 / 72.0)?;
/// }
/// estimator.end_and_estimate()?;
/// estimator.update(1.0 / 72.0)?;
///
/// assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
/// let asset = estimator.save_generated_asset(Some("right_hand.json"))?;
/// println!("{}", asset.to_json()?);
/// # Ok(())
/// # }
/// ```
pub struct ConeRayEstimator {
    state: EstimatorState,
    session: EstimationSession,
    collection: DataCollection,
    data_collector: Option<Box<dyn DataCollector>>,
    computation: Option<Box<dyn ConeRaySegmentComputation>>,
    pending: Option<PendingEstimation>,
    listeners: Vec<AssetListener>,
}

impl ConeRayEstimator {
    /// Estimator with the default configuration and no collaborators.
    pub fn new() -> Self {
        Self::from_parts(EstimationSession::new())
    }

    /// Estimator with the given configuration and no collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(config: EstimatorConfig) -> Result<Self> {
        let mut session = EstimationSession::new();
        session.set_config(config)?;
        Ok(Self::from_parts(session))
    }

    /// Resume from a stored session.
    ///
    /// Starts in [`EstimatorState::ReadyAndHaveData`] if the session holds a
    /// generated asset. Collaborators must be set again.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored configuration is invalid.
    pub fn from_session(session: EstimationSession) -> Result<Self> {
        session
            .config
            .validate()
            .context("invalid configuration in stored session")?;
        Ok(Self::from_parts(session))
    }

    fn from_parts(session: EstimationSession) -> Self {
        let state = if session.has_output() {
            EstimatorState::ReadyAndHaveData
        } else {
            EstimatorState::Ready
        };
        Self {
            state,
            collection: DataCollection::with_capacity_limit(session.config.max_samples),
            session,
            data_collector: None,
            computation: None,
            pending: None,
            listeners: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborators and configuration
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the source of samples and of the interactor to configure.
    ///
    /// # Errors
    ///
    /// Rejected while collecting or estimating.
    pub fn set_data_collector(&mut self, collector: impl DataCollector + 'static) -> Result<()> {
        self.require_rest("replace the data collector")?;
        self.data_collector = Some(Box::new(collector));
        Ok(())
    }

    /// Set the per-segment strategy that turns samples into ray angles.
    ///
    /// # Errors
    ///
    /// Rejected while collecting or estimating.
    pub fn set_computation(
        &mut self,
        computation: impl ConeRaySegmentComputation + 'static,
    ) -> Result<()> {
        self.require_rest("replace the computation")?;
        self.computation = Some(Box::new(computation));
        Ok(())
    }

    /// The configured data collector, if any.
    pub fn data_collector(&self) -> Option<&dyn DataCollector> {
        self.data_collector.as_deref()
    }

    /// Current configuration, stored in the session.
    pub fn config(&self) -> &EstimatorConfig {
        &self.session.config
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Rejected while collecting or estimating, or if the configuration is
    /// invalid.
    pub fn set_config(&mut self, config: EstimatorConfig) -> Result<()> {
        self.require_rest("change configuration")?;
        self.session.set_config(config)?;
        self.collection
            .set_capacity_limit(self.session.config.max_samples);
        Ok(())
    }

    /// Edit the configuration in place; it is kept unchanged if the edit
    /// does not validate.
    ///
    /// # Errors
    ///
    /// See [`set_config`](Self::set_config).
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut EstimatorConfig),
    {
        self.require_rest("change configuration")?;
        self.session.update_config(f)?;
        self.collection
            .set_capacity_limit(self.session.config.max_samples);
        Ok(())
    }

    /// Verify that collaborators are wired up for a collection and estimation.
    ///
    /// # Errors
    ///
    /// The first missing piece, in the order: data collector, its
    /// interactor, computation, hand-tracking events (only when
    /// `set_detection_logic_on_estimation` is set).
    pub fn check_configuration(&self) -> Result<(), EstimatorError> {
        let collector = self
            .data_collector
            .as_deref()
            .ok_or(EstimatorError::MissingDataCollector)?;
        if collector.interactor().is_none() {
            return Err(EstimatorError::MissingInteractor);
        }
        if self.computation.is_none() {
            return Err(EstimatorError::MissingComputation);
        }
        if self.config().set_detection_logic_on_estimation && !collector.has_hand_tracking_events()
        {
            return Err(EstimatorError::MissingHandTrackingEvents);
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> EstimatorState {
        self.state
    }

    /// Session holding samples, results and the operation log.
    pub fn session(&self) -> &EstimationSession {
        &self.session
    }

    /// Consume the estimator, keeping its session for checkpointing.
    pub fn into_session(self) -> EstimationSession {
        self.session
    }

    /// The latest generated asset, if any.
    pub fn generated_asset(&self) -> Option<&ConeRayAngles> {
        self.session.output()
    }

    /// Samples of the last finished collection.
    pub fn collected_samples(&self) -> Option<&[AngleSample]> {
        self.session.samples()
    }

    /// Samples buffered by the active collection.
    pub fn buffered_samples(&self) -> usize {
        self.collection.len()
    }

    /// Seconds of host time spent in the active collection.
    pub fn collection_elapsed(&self) -> Real {
        self.collection.elapsed()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Start collecting samples, discarding any previous result.
    ///
    /// # Errors
    ///
    /// - [`EstimatorError::InvalidTransition`] unless at rest.
    /// - A configuration error from [`check_configuration`](Self::check_configuration).
    /// - [`EstimatorError::UnsavedResult`] if `ask_before_restart` is set, the
    ///   generated asset is unsaved and `discard_unsaved` is not confirmed.
    /// - The collector failing to begin collection.
    pub fn start_data_collection(&mut self, opts: Option<StartOptions>) -> Result<()> {
        let opts = opts.unwrap_or_default();
        self.require_rest("start data collection")?;
        self.check_configuration()?;
        if self.config().ask_before_restart
            && self.session.has_unsaved_output()
            && !opts.discard_unsaved
        {
            return Err(EstimatorError::UnsavedResult.into());
        }

        if let Some(collector) = self.data_collector.as_deref_mut() {
            collector
                .begin_collection()
                .context("failed to begin data collection")?;
            self.session.metadata.interactor = collector.interactor().map(ToString::to_string);
        }
        if self.session.has_output() {
            debug!("discarding previously generated cone ray angles");
        }
        self.session.clear_samples();
        self.collection.start()?;
        self.session.log_success("start_data_collection");
        self.transition(EstimatorState::CollectingData);
        Ok(())
    }

    /// Feed one sample directly. Ignored (returns `false`) unless collecting.
    pub fn record_sample(&mut self, sample: AngleSample) -> bool {
        self.state == EstimatorState::CollectingData && self.collection.record_sample(sample)
    }

    /// Host tick.
    ///
    /// While collecting, drains the collector and ends the collection once
    /// `max_collection_secs` is reached. While estimating, runs the pending
    /// estimation to completion.
    ///
    /// # Errors
    ///
    /// Returns the estimation error if the pending estimation failed; the
    /// estimator is then back in the state the estimation started from.
    pub fn update(&mut self, dt: Real) -> Result<()> {
        match self.state {
            EstimatorState::CollectingData => {
                self.drain_collector();
                self.collection.advance(dt);
                let limit_reached = self
                    .config()
                    .max_collection_secs
                    .is_some_and(|limit| self.collection.elapsed() >= limit);
                if limit_reached {
                    info!(
                        "collection time limit reached after {:.2}s",
                        self.collection.elapsed()
                    );
                    self.end_and_estimate()?;
                }
                Ok(())
            }
            EstimatorState::EstimatingConeRays => self.run_pending(),
            EstimatorState::Ready | EstimatorState::ReadyAndHaveData => Ok(()),
        }
    }

    /// End the active collection and schedule an estimation from its samples.
    ///
    /// # Errors
    ///
    /// [`EstimatorError::InvalidTransition`] unless collecting.
    pub fn end_and_estimate(&mut self) -> Result<()> {
        if self.state != EstimatorState::CollectingData {
            return Err(self.invalid("end data collection").into());
        }
        self.check_configuration()?;

        self.drain_collector();
        if let Some(collector) = self.data_collector.as_deref_mut() {
            collector.end_collection();
        }
        let samples = self.collection.stop();
        let count = samples.len();
        if let Err(err) = self.session.set_samples(samples) {
            self.session
                .log_failure("end_data_collection", format!("{err:#}"));
            self.transition(EstimatorState::Ready);
            return Err(err);
        }

        self.session
            .log_success_with_notes("end_data_collection", format!("{count} samples"));
        self.pending = Some(PendingEstimation::FromCollection);
        self.transition(EstimatorState::EstimatingConeRays);
        Ok(())
    }

    /// Schedule a new estimation from the stored samples.
    ///
    /// # Errors
    ///
    /// - [`EstimatorError::InvalidTransition`] unless an asset was generated.
    /// - A configuration error.
    /// - No samples stored (e.g. a session restored without samples).
    pub fn re_estimate(&mut self) -> Result<()> {
        if self.state != EstimatorState::ReadyAndHaveData {
            return Err(self.invalid("re-estimate").into());
        }
        self.check_configuration()?;
        self.session
            .require_samples()
            .context("cannot re-estimate")?;

        self.pending = Some(PendingEstimation::Rerun);
        self.transition(EstimatorState::EstimatingConeRays);
        Ok(())
    }

    /// Stop the active collection and drop its samples.
    ///
    /// # Errors
    ///
    /// [`EstimatorError::InvalidTransition`] unless collecting.
    pub fn abort_data_collection(&mut self) -> Result<()> {
        if self.state != EstimatorState::CollectingData {
            return Err(self.invalid("abort data collection").into());
        }
        if let Some(collector) = self.data_collector.as_deref_mut() {
            collector.end_collection();
        }
        self.collection.discard();
        self.session.log_success("abort_data_collection");
        self.transition(EstimatorState::Ready);
        Ok(())
    }

    /// Return a copy of the generated asset for the host to persist and mark
    /// it saved.
    ///
    /// # Errors
    ///
    /// Returns an error if no asset has been generated.
    pub fn save_generated_asset(&mut self, notes: Option<&str>) -> Result<ConeRayAngles> {
        let saved = self.session.save_output(notes.map(str::to_owned))?;
        self.session.log_success("save_generated_asset");
        info!(
            "saved generated cone ray angles ({} angles)",
            saved.total_angles()
        );
        Ok(saved)
    }

    /// Drop the active collection, any pending estimation and every stored
    /// result, and return to [`EstimatorState::Ready`].
    ///
    /// Collaborators, listeners and the configuration are kept. Allowed in
    /// any state.
    pub fn reset(&mut self) {
        if self.state == EstimatorState::CollectingData {
            if let Some(collector) = self.data_collector.as_deref_mut() {
                collector.end_collection();
            }
        }
        self.collection.discard();
        self.pending = None;
        self.session.reset();
        info!("estimator reset from {}", self.state);
        self.transition(EstimatorState::Ready);
    }

    /// Register a callback run after each successful estimation.
    pub fn on_asset_generated(&mut self, listener: impl FnMut(&ConeRayAngles) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn require_rest(&self, operation: &'static str) -> Result<(), EstimatorError> {
        if self.state.is_at_rest() {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> EstimatorError {
        EstimatorError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    fn transition(&mut self, next: EstimatorState) {
        debug!("estimator state {} -> {}", self.state, next);
        self.state = next;
    }

    fn drain_collector(&mut self) {
        let Some(collector) = self.data_collector.as_deref_mut() else {
            return;
        };
        for sample in collector.poll_samples() {
            self.collection.record_sample(sample);
        }
    }

    fn run_pending(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            warn!("no estimation pending while {}", self.state);
            let rest = if self.session.has_output() {
                EstimatorState::ReadyAndHaveData
            } else {
                EstimatorState::Ready
            };
            self.transition(rest);
            return Ok(());
        };

        match self.estimate() {
            Ok((asset, summary)) => {
                self.apply_detection_logic(&asset);
                self.session.set_output(asset);
                self.session
                    .log_success_with_notes(pending.operation(), summary.to_string());
                self.transition(EstimatorState::ReadyAndHaveData);
                self.notify_listeners();
                Ok(())
            }
            Err(err) => {
                warn!("{} failed: {:#}", pending.operation(), err);
                self.session
                    .log_failure(pending.operation(), format!("{err:#}"));
                self.transition(pending.rest_state());
                Err(err)
            }
        }
    }

    fn estimate(&self) -> Result<(ConeRayAngles, EstimationSummary)> {
        let samples = self.session.require_samples()?;
        estimate_cone_ray_angles(
            samples,
            self.computation.as_deref(),
            self.config().fallback_side,
        )
    }

    fn apply_detection_logic(&mut self, asset: &ConeRayAngles) {
        if !self.config().set_detection_logic_on_estimation {
            return;
        }
        let Some(collector) = self.data_collector.as_deref_mut() else {
            return;
        };
        let interactor = collector
            .interactor()
            .map(ToString::to_string)
            .unwrap_or_default();
        match collector.apply_cone_ray_angles(asset) {
            Ok(()) => debug!("cone ray detection logic set on {}", interactor),
            Err(err) => {
                warn!(
                    "failed to set cone ray detection logic on {}: {:#}",
                    interactor, err
                );
                self.session
                    .log_failure("apply_detection_logic", format!("{err:#}"));
            }
        }
    }

    fn notify_listeners(&mut self) {
        let Some(asset) = self.session.output() else {
            return;
        };
        for listener in &mut self.listeners {
            listener(asset);
        }
    }
}

impl Default for ConeRayEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConeRayEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConeRayEstimator")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("collection", &self.collection)
            .field(
                "interactor",
                &self
                    .data_collector
                    .as_deref()
                    .and_then(|c| c.interactor().cloned()),
            )
            .field("has_computation", &self.computation.is_some())
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
