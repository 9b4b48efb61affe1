//! Finger joints and finger sides.
//!
//! [`Joint`] is the closed set of the twelve tracked finger segments that
//! carry cone ray angles. [`Joint::ALL`] is the single source of truth for
//! iteration order and for the persisted field names of the angle asset.

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Finger that carries a tracked segment (the thumb is not modeled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Little,
}

/// Phalanx of a finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Proximal,
    Intermediate,
    Distal,
}

/// One of the twelve finger-segment joints that carry cone ray angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Joint {
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
}

/// Number of tracked joints.
pub const JOINT_COUNT: usize = 12;

impl Joint {
    /// All joints, finger-major, proximal to distal.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::IndexProximal,
        Joint::IndexIntermediate,
        Joint::IndexDistal,
        Joint::MiddleProximal,
        Joint::MiddleIntermediate,
        Joint::MiddleDistal,
        Joint::RingProximal,
        Joint::RingIntermediate,
        Joint::RingDistal,
        Joint::LittleProximal,
        Joint::LittleIntermediate,
        Joint::LittleDistal,
    ];

    /// Position in [`Joint::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Finger the joint belongs to.
    pub fn finger(self) -> Finger {
        match self {
            Self::IndexProximal | Self::IndexIntermediate | Self::IndexDistal => Finger::Index,
            Self::MiddleProximal | Self::MiddleIntermediate | Self::MiddleDistal => Finger::Middle,
            Self::RingProximal | Self::RingIntermediate | Self::RingDistal => Finger::Ring,
            Self::LittleProximal | Self::LittleIntermediate | Self::LittleDistal => Finger::Little,
        }
    }

    /// Phalanx the joint belongs to.
    pub fn segment(self) -> Segment {
        match self {
            Self::IndexProximal
            | Self::MiddleProximal
            | Self::RingProximal
            | Self::LittleProximal => Segment::Proximal,
            Self::IndexIntermediate
            | Self::MiddleIntermediate
            | Self::RingIntermediate
            | Self::LittleIntermediate => Segment::Intermediate,
            Self::IndexDistal | Self::MiddleDistal | Self::RingDistal | Self::LittleDistal => {
                Segment::Distal
            }
        }
    }

    /// Build a joint from its finger and segment.
    pub fn from_parts(finger: Finger, segment: Segment) -> Joint {
        let offset = match segment {
            Segment::Proximal => 0,
            Segment::Intermediate => 1,
            Segment::Distal => 2,
        };
        let base = match finger {
            Finger::Index => 0,
            Finger::Middle => 3,
            Finger::Ring => 6,
            Finger::Little => 9,
        };
        Self::ALL[base + offset]
    }

    /// Name of the angle-list field for this joint in the persisted asset.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::IndexProximal => "IndexProximalAngles",
            Self::IndexIntermediate => "IndexIntermediateAngles",
            Self::IndexDistal => "IndexDistalAngles",
            Self::MiddleProximal => "MiddleProximalAngles",
            Self::MiddleIntermediate => "MiddleIntermediateAngles",
            Self::MiddleDistal => "MiddleDistalAngles",
            Self::RingProximal => "RingProximalAngles",
            Self::RingIntermediate => "RingIntermediateAngles",
            Self::RingDistal => "RingDistalAngles",
            Self::LittleProximal => "LittleProximalAngles",
            Self::LittleIntermediate => "LittleIntermediateAngles",
            Self::LittleDistal => "LittleDistalAngles",
        }
    }

    /// Inverse of [`Joint::field_name`].
    pub fn from_field_name(name: &str) -> Option<Joint> {
        Self::ALL.into_iter().find(|joint| joint.field_name() == name)
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Face of a finger segment a ray angle set belongs to.
///
/// Ulnar and dorsal faces are not modeled. Serialized as the lowercase name;
/// deserialization also accepts the integer index (`0` volar, `1` radial)
/// used by assets exported from the headset runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerSide {
    #[default]
    Volar,
    Radial,
}

impl FingerSide {
    /// Both sides, in persisted order.
    pub const ALL: [FingerSide; 2] = [FingerSide::Volar, FingerSide::Radial];

    /// Lowercase name, as written to the asset.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Volar => "volar",
            Self::Radial => "radial",
        }
    }

    /// Side for a persisted integer index.
    pub fn from_index(index: u64) -> Option<FingerSide> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

struct FingerSideVisitor;

impl<'de> Visitor<'de> for FingerSideVisitor {
    type Value = FingerSide;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("\"volar\", \"radial\", 0 or 1")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<FingerSide, E> {
        FingerSide::ALL
            .into_iter()
            .find(|side| side.as_str() == value)
            .ok_or_else(|| E::unknown_variant(value, &["volar", "radial"]))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<FingerSide, E> {
        FingerSide::from_index(value)
            .ok_or_else(|| E::invalid_value(Unexpected::Unsigned(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<FingerSide, E> {
        u64::try_from(value)
            .ok()
            .and_then(FingerSide::from_index)
            .ok_or_else(|| E::invalid_value(Unexpected::Signed(value), &self))
    }
}

impl<'de> Deserialize<'de> for FingerSide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FingerSideVisitor)
    }
}

impl std::fmt::Display for FingerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
