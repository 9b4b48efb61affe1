//! End-to-end estimator lifecycle against a scripted hand.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Result, bail};
use cone_rays_core::test_utils::{TICK, sample_stream};
use cone_rays_core::{AngleSample, ConeRayAngles, FingerSide, Joint, RayAngle};
use cone_rays_pipeline::{
    ConeRayEstimator, DataCollector, EstimationSession, EstimatorConfig, EstimatorError,
    EstimatorState, InteractorId, StartOptions,
};

#[derive(Default)]
struct Feed {
    queued: Vec<AngleSample>,
    begun: usize,
    ended: usize,
    applied: Vec<ConeRayAngles>,
}

#[derive(Clone)]
struct ScriptedHand {
    interactor: Option<InteractorId>,
    tracking_events: bool,
    feed: Rc<RefCell<Feed>>,
}

impl ScriptedHand {
    fn right() -> Self {
        Self {
            interactor: Some(InteractorId("right_hand".into())),
            tracking_events: true,
            feed: Rc::default(),
        }
    }
}

impl DataCollector for ScriptedHand {
    fn interactor(&self) -> Option<&InteractorId> {
        self.interactor.as_ref()
    }

    fn has_hand_tracking_events(&self) -> bool {
        self.tracking_events
    }

    fn begin_collection(&mut self) -> Result<()> {
        self.feed.borrow_mut().begun += 1;
        Ok(())
    }

    fn poll_samples(&mut self) -> Vec<AngleSample> {
        std::mem::take(&mut self.feed.borrow_mut().queued)
    }

    fn end_collection(&mut self) {
        self.feed.borrow_mut().ended += 1;
    }

    fn apply_cone_ray_angles(&mut self, angles: &ConeRayAngles) -> Result<()> {
        self.feed.borrow_mut().applied.push(angles.clone());
        Ok(())
    }
}

/// One ray per sample, carrying the sample's angle and threshold.
fn echo(_: Joint, _: FingerSide, samples: &[AngleSample]) -> Result<Vec<RayAngle>> {
    Ok(samples.iter().map(|s| s.angle).collect())
}

fn wired(config: EstimatorConfig) -> (ConeRayEstimator, Rc<RefCell<Feed>>) {
    let hand = ScriptedHand::right();
    let feed = Rc::clone(&hand.feed);
    let mut estimator = ConeRayEstimator::with_config(config).unwrap();
    estimator.set_data_collector(hand).unwrap();
    estimator.set_computation(echo).unwrap();
    (estimator, feed)
}

fn index_distal_volar(i: usize, threshold: f64) -> AngleSample {
    let angle = RayAngle::new(10.0 * (i + 1) as f64, 0.0, threshold);
    AngleSample::new(i as f64 * TICK, Joint::IndexDistal, FingerSide::Volar, angle)
}

/// Three IndexDistal volar rays with the middle one disabled, then
/// MiddleProximal volar rays only.
fn scenario_samples() -> Vec<AngleSample> {
    let mut samples = vec![
        index_distal_volar(0, 0.2),
        index_distal_volar(1, -1.0),
        index_distal_volar(2, 0.3),
    ];
    samples.extend(sample_stream(&[(Joint::MiddleProximal, FingerSide::Volar)], 4));
    samples
}

/// Run one full collection and estimation.
fn collect_and_estimate(
    estimator: &mut ConeRayEstimator,
    feed: &Rc<RefCell<Feed>>,
    samples: Vec<AngleSample>,
    opts: Option<StartOptions>,
) {
    estimator.start_data_collection(opts).unwrap();
    feed.borrow_mut().queued = samples;
    estimator.update(TICK).unwrap();
    estimator.end_and_estimate().unwrap();
    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
}

fn estimator_error(result: Result<()>) -> EstimatorError {
    result
        .unwrap_err()
        .downcast::<EstimatorError>()
        .expect("estimator error")
}

#[test]
fn full_lifecycle_generates_queryable_asset() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    assert_eq!(estimator.state(), EstimatorState::Ready);

    estimator.start_data_collection(None).unwrap();
    assert_eq!(estimator.state(), EstimatorState::CollectingData);

    feed.borrow_mut().queued = scenario_samples();
    estimator.update(TICK).unwrap();
    assert_eq!(estimator.buffered_samples(), 7);

    estimator.end_and_estimate().unwrap();
    assert_eq!(estimator.state(), EstimatorState::EstimatingConeRays);
    assert!(estimator.generated_asset().is_none());

    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);

    let asset = estimator.generated_asset().unwrap();
    let index = asset
        .get_angles(Joint::IndexDistal, FingerSide::Volar)
        .unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.iter().all(|a| a.ray_selection_threshold >= 0.0));
    // Stored data keeps the disabled ray.
    assert_eq!(asset.angles(Joint::IndexDistal)[0].ray_angles.len(), 3);

    let radial = asset
        .get_angles(Joint::MiddleProximal, FingerSide::Radial)
        .unwrap();
    let volar = asset
        .get_angles(Joint::MiddleProximal, FingerSide::Volar)
        .unwrap();
    assert_eq!(radial, volar);
    assert!(asset.get_angles(Joint::LittleDistal, FingerSide::Radial).is_none());

    let feed = feed.borrow();
    assert_eq!((feed.begun, feed.ended), (1, 1));
    assert!(feed.applied.is_empty());

    let operations: Vec<&str> = estimator
        .session()
        .log
        .iter()
        .map(|e| e.operation.as_str())
        .collect();
    assert_eq!(
        operations,
        ["start_data_collection", "end_data_collection", "estimate"]
    );
    assert_eq!(
        estimator.session().metadata.interactor.as_deref(),
        Some("right_hand")
    );
}

#[test]
fn end_and_estimate_from_ready_is_rejected() {
    let (mut estimator, _) = wired(EstimatorConfig::default());
    let err = estimator_error(estimator.end_and_estimate());
    assert_eq!(
        err,
        EstimatorError::InvalidTransition {
            operation: "end data collection",
            state: EstimatorState::Ready,
        }
    );
    assert_eq!(estimator.state(), EstimatorState::Ready);

    let err = estimator_error(estimator.re_estimate());
    assert!(matches!(err, EstimatorError::InvalidTransition { .. }));
    assert_eq!(err.to_string(), "cannot re-estimate while Ready");
    assert_eq!(estimator.state(), EstimatorState::Ready);
}

#[test]
fn busy_states_reject_transitions() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    estimator.start_data_collection(None).unwrap();

    assert!(matches!(
        estimator_error(estimator.start_data_collection(None)),
        EstimatorError::InvalidTransition {
            state: EstimatorState::CollectingData,
            ..
        }
    ));
    assert!(estimator.re_estimate().is_err());
    assert_eq!(estimator.state(), EstimatorState::CollectingData);

    feed.borrow_mut().queued = scenario_samples();
    estimator.end_and_estimate().unwrap();
    for result in [
        estimator.start_data_collection(None),
        estimator.end_and_estimate(),
        estimator.re_estimate(),
        estimator.abort_data_collection(),
    ] {
        assert!(matches!(
            estimator_error(result),
            EstimatorError::InvalidTransition {
                state: EstimatorState::EstimatingConeRays,
                ..
            }
        ));
    }
    assert_eq!(estimator.state(), EstimatorState::EstimatingConeRays);

    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
}

#[test]
fn re_estimate_reproduces_asset() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);
    let first = estimator.generated_asset().unwrap().to_json().unwrap();

    estimator.re_estimate().unwrap();
    assert_eq!(estimator.state(), EstimatorState::EstimatingConeRays);
    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);

    let second = estimator.generated_asset().unwrap().to_json().unwrap();
    assert_eq!(first, second);
    assert_eq!(estimator.collected_samples().map(<[_]>::len), Some(7));
}

#[test]
fn restart_discards_previous_result() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);

    estimator.start_data_collection(None).unwrap();
    assert_eq!(estimator.state(), EstimatorState::CollectingData);
    assert!(estimator.generated_asset().is_none());
    assert!(estimator.collected_samples().is_none());
    assert_eq!(estimator.buffered_samples(), 0);

    estimator.end_and_estimate().unwrap();
    estimator.update(TICK).unwrap();
    let asset = estimator.generated_asset().unwrap();
    assert_eq!(asset.total_angles(), 0);
    assert!(asset.get_angles(Joint::IndexDistal, FingerSide::Volar).is_none());
}

#[test]
fn failed_estimation_returns_to_origin_state() {
    let fail = Rc::new(Cell::new(false));
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    let switch = Rc::clone(&fail);
    estimator
        .set_computation(move |joint: Joint, side: FingerSide, samples: &[AngleSample]| {
            if switch.get() {
                bail!("samples do not span the surface");
            }
            echo(joint, side, samples)
        })
        .unwrap();

    // From a fresh collection: back to Ready, samples kept.
    fail.set(true);
    estimator.start_data_collection(None).unwrap();
    feed.borrow_mut().queued = scenario_samples();
    estimator.end_and_estimate().unwrap();
    let err = estimator.update(TICK).unwrap_err();
    assert!(format!("{err:#}").contains("samples do not span"), "{err:#}");
    assert_eq!(estimator.state(), EstimatorState::Ready);
    assert!(estimator.generated_asset().is_none());
    assert_eq!(estimator.collected_samples().map(<[_]>::len), Some(7));

    let last = estimator.session().log.last().unwrap();
    assert_eq!(last.operation, "estimate");
    assert!(!last.success);

    // From a re-estimation: previous asset stays.
    fail.set(false);
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);
    let before = estimator.generated_asset().cloned();
    fail.set(true);
    estimator.re_estimate().unwrap();
    assert!(estimator.update(TICK).is_err());
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
    assert_eq!(estimator.generated_asset().cloned(), before);
}

#[test]
fn listeners_run_after_each_estimation() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    estimator.on_asset_generated(move |asset| sink.borrow_mut().push(asset.total_angles()));

    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);
    estimator.re_estimate().unwrap();
    estimator.update(TICK).unwrap();

    assert_eq!(*seen.borrow(), vec![7, 7]);
}

#[test]
fn unsaved_result_requires_confirmation() {
    let config = EstimatorConfig {
        ask_before_restart: true,
        ..Default::default()
    };
    let (mut estimator, feed) = wired(config);
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);

    let err = estimator_error(estimator.start_data_collection(None));
    assert_eq!(err, EstimatorError::UnsavedResult);
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
    assert!(estimator.generated_asset().is_some());

    // Saving clears the prompt.
    let saved = estimator
        .save_generated_asset(Some("participant_03.json"))
        .unwrap();
    assert_eq!(Some(&saved), estimator.generated_asset());
    assert_eq!(estimator.session().saved.len(), 1);
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);

    // Or explicit confirmation.
    collect_and_estimate(
        &mut estimator,
        &feed,
        scenario_samples(),
        Some(StartOptions::discard_unsaved()),
    );
}

#[test]
fn save_without_asset_fails() {
    let (mut estimator, _) = wired(EstimatorConfig::default());
    let err = estimator.save_generated_asset(None).unwrap_err();
    assert!(err.to_string().contains("no generated asset"));
}

#[test]
fn detection_logic_applied_when_configured() {
    let config = EstimatorConfig {
        set_detection_logic_on_estimation: true,
        ..Default::default()
    };
    let (mut estimator, feed) = wired(config.clone());
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);
    assert_eq!(
        feed.borrow().applied.as_slice(),
        [estimator.generated_asset().unwrap().clone()]
    );

    let mut without_events = ConeRayEstimator::with_config(config).unwrap();
    without_events
        .set_data_collector(ScriptedHand {
            tracking_events: false,
            ..ScriptedHand::right()
        })
        .unwrap();
    without_events.set_computation(echo).unwrap();
    assert_eq!(
        estimator_error(without_events.start_data_collection(None)),
        EstimatorError::MissingHandTrackingEvents
    );
    assert_eq!(without_events.state(), EstimatorState::Ready);
}

#[test]
fn missing_interactor_blocks_collection() {
    let mut estimator = ConeRayEstimator::new();
    estimator
        .set_data_collector(ScriptedHand {
            interactor: None,
            ..ScriptedHand::right()
        })
        .unwrap();
    estimator.set_computation(echo).unwrap();

    let err = estimator.start_data_collection(None).unwrap_err();
    assert_eq!(err.to_string(), "Interactor in DataCollector not configured");
    assert_eq!(estimator.state(), EstimatorState::Ready);
}

#[test]
fn collection_time_limit_starts_estimation() {
    let config = EstimatorConfig {
        max_collection_secs: Some(0.1),
        ..Default::default()
    };
    let (mut estimator, feed) = wired(config);
    estimator.start_data_collection(None).unwrap();
    feed.borrow_mut().queued = scenario_samples();

    for _ in 0..7 {
        estimator.update(TICK).unwrap();
    }
    assert_eq!(estimator.state(), EstimatorState::CollectingData);

    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::EstimatingConeRays);
    estimator.update(TICK).unwrap();
    assert_eq!(estimator.state(), EstimatorState::ReadyAndHaveData);
    assert_eq!(feed.borrow().ended, 1);
}

#[test]
fn sample_limit_caps_collection() {
    let config = EstimatorConfig {
        max_samples: Some(4),
        ..Default::default()
    };
    let (mut estimator, feed) = wired(config);
    let samples = sample_stream(&[(Joint::RingDistal, FingerSide::Radial)], 10);
    collect_and_estimate(&mut estimator, &feed, samples.clone(), None);

    assert_eq!(estimator.collected_samples(), Some(&samples[..4]));
}

#[test]
fn pushed_samples_join_polled_samples() {
    let (mut estimator, feed) = wired(EstimatorConfig::default());
    estimator.start_data_collection(None).unwrap();
    let pushed = sample_stream(&[(Joint::IndexProximal, FingerSide::Volar)], 2);
    for sample in &pushed {
        assert!(estimator.record_sample(*sample));
    }
    feed.borrow_mut().queued = sample_stream(&[(Joint::IndexProximal, FingerSide::Radial)], 3);
    estimator.end_and_estimate().unwrap();

    assert_eq!(estimator.collected_samples().map(<[_]>::len), Some(5));
    assert_eq!(estimator.collected_samples().unwrap()[..2], pushed[..]);
}

#[test]
fn session_checkpoint_resumes_estimator() {
    let (mut estimator, feed) = wired(EstimatorConfig {
        fallback_side: FingerSide::Radial,
        ..Default::default()
    });
    collect_and_estimate(&mut estimator, &feed, scenario_samples(), None);
    let expected = estimator.generated_asset().cloned().unwrap();

    let json = estimator.into_session().to_json().unwrap();
    let session = EstimationSession::from_json(&json).unwrap();
    let mut resumed = ConeRayEstimator::from_session(session).unwrap();

    assert_eq!(resumed.state(), EstimatorState::ReadyAndHaveData);
    assert_eq!(resumed.config().fallback_side, FingerSide::Radial);
    assert_eq!(resumed.generated_asset(), Some(&expected));
    assert!(
        resumed
            .generated_asset()
            .unwrap()
            .get_angles(Joint::IndexDistal, FingerSide::Radial)
            .is_none()
    );

    assert_eq!(
        estimator_error(resumed.re_estimate()),
        EstimatorError::MissingDataCollector
    );
    resumed.set_data_collector(ScriptedHand::right()).unwrap();
    resumed.set_computation(echo).unwrap();
    resumed.re_estimate().unwrap();
    resumed.update(TICK).unwrap();
    assert_eq!(resumed.generated_asset(), Some(&expected));
}
