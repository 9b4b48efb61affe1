//! Core data model for cone ray touch detection on finger segments.
//!
//! This crate provides the building blocks used by the rest of the
//! workspace:
//!
//! - the closed set of tracked finger [`Joint`]s and the [`FingerSide`]s,
//! - [`RayAngle`] candidates grouped per side in [`ConeRayAngleSides`],
//! - recorded [`AngleSample`]s produced during data collection,
//! - the [`ConeRayAngles`] asset with its flat JSON format,
//! - the [`AngleCache`] answering `(joint, side)` queries with side fallback.
//!
//! # Example
//!
//! ```
//! use cone_rays_core::{ConeRayAngles, FingerSide, Joint};
//!
//! let json = r#"{
//!     "fallbackSide": "volar",
//!     "IndexDistalAngles": [
//!         { "side": "volar", "rayAngles": [
//!             { "x": 10.0, "z": 0.0, "raySelectionThreshold": 0.1 },
//!             { "x": 20.0, "z": 0.0, "raySelectionThreshold": -0.5 }
//!         ] }
//!     ]
//! }"#;
//!
//! let asset = ConeRayAngles::from_json(json)?;
//! let rays = asset.get_angles(Joint::IndexDistal, FingerSide::Radial).unwrap();
//! assert_eq!(rays.len(), 1);
//! # Ok::<(), cone_rays_core::AngleDataError>(())
//! ```

/// Angle asset and its flat JSON representation.
mod asset;
/// Filtered `(joint, side)` lookup index.
mod cache;
mod error;
/// Finger joints and sides.
mod joint;
/// Test utilities for cross-crate testing.
///
/// This module is public to allow usage in integration tests across
/// the workspace, but is not intended for production use.
pub mod test_utils;
/// Ray angles, side sets and samples.
mod types;

pub use asset::*;
pub use cache::*;
pub use error::*;
pub use joint::*;
pub use types::*;

/// Scalar type used for angles, thresholds and timestamps.
pub type Real = f64;
