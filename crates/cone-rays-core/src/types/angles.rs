//! Ray angles, per-side angle sets and recorded samples.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::{FingerSide, Joint, Real};

/// A candidate cone ray cast direction and its selection threshold.
///
/// The direction is expressed in the joint frame as two angles in degrees:
/// `x` tilts the ray away from the joint's forward axis (+Z) and `z` rotates
/// the tilted ray around that axis. A negative `ray_selection_threshold`
/// disables the ray for runtime queries while keeping it in storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RayAngle {
    pub x: Real,
    pub z: Real,
    pub ray_selection_threshold: Real,
}

impl RayAngle {
    /// Ray tilted by `x` and spun by `z` degrees.
    pub fn new(x: Real, z: Real, ray_selection_threshold: Real) -> Self {
        Self {
            x,
            z,
            ray_selection_threshold,
        }
    }

    /// Whether the ray takes part in runtime queries.
    pub fn is_enabled(&self) -> bool {
        self.ray_selection_threshold >= 0.0
    }

    /// Whether both angles and the threshold are finite, i.e. the ray can be
    /// persisted and read back.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite() && self.ray_selection_threshold.is_finite()
    }

    /// Unit cast direction in the joint frame.
    pub fn direction(&self) -> Vector3<Real> {
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), self.x.to_radians());
        let spin = Rotation3::from_axis_angle(&Vector3::z_axis(), self.z.to_radians());
        spin * tilt * Vector3::z()
    }
}

/// Ordered ray angles for one side of a joint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConeRayAngleSides {
    /// The side of the finger the angles correspond to.
    pub side: FingerSide,
    /// Ray angles in cast order.
    #[serde(default)]
    pub ray_angles: Vec<RayAngle>,
}

impl ConeRayAngleSides {
    /// Angle set for `side`, in cast order.
    pub fn new(side: FingerSide, ray_angles: Vec<RayAngle>) -> Self {
        Self { side, ray_angles }
    }

    /// Side without any ray angles.
    pub fn empty(side: FingerSide) -> Self {
        Self::new(side, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.ray_angles.is_empty()
    }

    /// Ray angles with a non-negative selection threshold, in stored order.
    pub fn enabled(&self) -> impl Iterator<Item = &RayAngle> {
        self.ray_angles.iter().filter(|a| a.is_enabled())
    }
}

/// One observation recorded from the hand-tracking source during collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleSample {
    /// Seconds since the collection started.
    pub timestamp: Real,
    pub joint: Joint,
    pub side: FingerSide,
    /// Candidate ray angle observed on this tick, with its threshold.
    pub angle: RayAngle,
}

impl AngleSample {
    pub fn new(timestamp: Real, joint: Joint, side: FingerSide, angle: RayAngle) -> Self {
        Self {
            timestamp,
            joint,
            side,
            angle,
        }
    }

    /// Grouping key used by the estimation pipeline.
    pub fn key(&self) -> (Joint, FingerSide) {
        (self.joint, self.side)
    }

    /// Whether the timestamp and the observed angle are finite.
    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite() && self.angle.is_finite()
    }
}
