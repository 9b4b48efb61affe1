//! Common value types shared across the workspace.
//!
//! This module provides the recorded sample type and the ray angle
//! containers stored in the angle asset.

mod angles;

pub use angles::*;
