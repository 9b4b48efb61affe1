//! Cone ray estimation with a synthetic hand.
//!
//! This example demonstrates the estimator workflow without a headset:
//! 1. Wire a synthetic data collector and a simple segment computation
//! 2. Collect samples for a fixed time (auto-ends via `max_collection_secs`)
//! 3. Run the estimation and query the generated asset for cast directions
//! 4. Save the asset and checkpoint the session
//!
//! Run with: `cargo run -p cone-rays --example synthetic_hand`

use anyhow::Result;
use cone_rays::Finger;
use cone_rays::prelude::*;

const TICK: Real = 1.0 / 72.0;
const RAYS_PER_SIDE: usize = 5;

/// Sweeps the thumb over every segment, one sample per (joint, side) per tick.
struct SyntheticHand {
    interactor: InteractorId,
    tick: usize,
}

impl DataCollector for SyntheticHand {
    fn interactor(&self) -> Option<&InteractorId> {
        Some(&self.interactor)
    }

    fn has_hand_tracking_events(&self) -> bool {
        true
    }

    fn begin_collection(&mut self) -> Result<()> {
        self.tick = 0;
        Ok(())
    }

    fn poll_samples(&mut self) -> Vec<AngleSample> {
        self.tick += 1;
        let t = self.tick as Real * TICK;
        let mut samples = Vec::new();
        for joint in Joint::ALL {
            for side in FingerSide::ALL {
                let phase = t * 2.0 + joint.index() as Real;
                let x = 25.0 + 15.0 * phase.sin();
                let base = if side == FingerSide::Volar { 0.0 } else { 90.0 };
                let z = base + 20.0 * phase.cos();
                // The little finger radial side is barely reachable.
                let unreachable = joint.finger() == Finger::Little && side == FingerSide::Radial;
                let threshold = if unreachable { -1.0 } else { 0.01 + 0.002 * x };
                samples.push(AngleSample::new(t, joint, side, RayAngle::new(x, z, threshold)));
            }
        }
        samples
    }

    fn end_collection(&mut self) {}

    fn apply_cone_ray_angles(&mut self, angles: &ConeRayAngles) -> Result<()> {
        println!(
            "  {} now uses cone ray detection ({} rays)",
            self.interactor,
            angles.total_angles()
        );
        Ok(())
    }
}

/// Keeps `RAYS_PER_SIDE` samples evenly spread over the sorted tilt angles.
fn spread_rays(_: Joint, _: FingerSide, samples: &[AngleSample]) -> Result<Vec<RayAngle>> {
    let mut angles: Vec<RayAngle> = samples.iter().map(|s| s.angle).collect();
    angles.sort_by(|a, b| a.x.total_cmp(&b.x));
    let step = (angles.len() / RAYS_PER_SIDE).max(1);
    Ok(angles.into_iter().step_by(step).take(RAYS_PER_SIDE).collect())
}

fn main() -> Result<()> {
    println!("=== Cone Ray Estimation (Synthetic Hand) ===\n");

    let config = EstimatorConfig {
        max_collection_secs: Some(3.0),
        set_detection_logic_on_estimation: true,
        ..Default::default()
    };
    let mut estimator = ConeRayEstimator::with_config(config)?;
    estimator.set_data_collector(SyntheticHand {
        interactor: InteractorId("right_hand".into()),
        tick: 0,
    })?;
    estimator.set_computation(spread_rays)?;
    estimator.on_asset_generated(|asset| {
        println!("  Generated asset with {} rays", asset.total_angles());
    });

    println!("--- Step 1: Collecting ---");
    estimator.start_data_collection(None)?;
    while estimator.state() == EstimatorState::CollectingData {
        estimator.update(TICK)?;
    }
    println!(
        "  Collected {} samples",
        estimator.collected_samples().map_or(0, <[_]>::len)
    );
    println!();

    println!("--- Step 2: Estimating ---");
    estimator.update(TICK)?;
    println!("  State: {}", estimator.state());
    println!();

    println!("--- Step 3: Lookup ---");
    let asset = estimator.save_generated_asset(Some("right_hand.json"))?;
    for joint in [Joint::IndexDistal, Joint::LittleProximal] {
        for side in FingerSide::ALL {
            let rays = asset.get_angles(joint, side).unwrap_or_default();
            print!("  {joint} {side}: {} rays", rays.len());
            match rays.first() {
                Some(ray) => {
                    let d = ray.direction();
                    println!(", first casts along ({:.3}, {:.3}, {:.3})", d.x, d.y, d.z);
                }
                None => println!(),
            }
        }
    }
    println!();

    println!("--- Step 4: Checkpoint ---");
    let session_json = estimator.session().to_json()?;
    println!("  Session: {} bytes", session_json.len());
    println!("  Asset:   {} bytes", asset.to_json()?.len());

    Ok(())
}
