//! The cone ray angle asset: raw per-joint angle sets plus the active cache.
//!
//! On disk the asset is a flat JSON object with one angle-list field per
//! joint (named by [`Joint::field_name`]) and a `fallbackSide` field:
//!
//! ```text
//! {
//!   "fallbackSide": "volar",
//!   "IndexProximalAngles": [ { "side": "volar", "rayAngles": [ ... ] } ],
//!   ...
//!   "LittleDistalAngles": []
//! }
//! ```
//!
//! Missing joint fields load as empty lists and unknown fields are ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    AngleCache, AngleDataError, CacheRefreshReport, ConeRayAngleSides, FingerSide, Joint,
    RayAngle,
};

const FALLBACK_SIDE_FIELD: &str = "fallbackSide";

/// Per-joint cone ray angles with a fallback-aware lookup cache.
///
/// The raw angle sets are the source of truth. The cache is derived from
/// them by [`ConeRayAngles::refresh_cache`] and is not reactive: after
/// editing the raw sets through [`ConeRayAngles::angles_mut`] or
/// [`ConeRayAngles::set_angles`], call `refresh_cache` before querying.
/// A freshly constructed asset answers `None` to every query until the first
/// refresh; an asset loaded from JSON is refreshed on load.
///
/// # Example
///
/// ```
/// use cone_rays_core::{ConeRayAngleSides, ConeRayAngles, FingerSide, Joint, RayAngle};
///
/// let mut asset = ConeRayAngles::new();
/// asset.set_angles(
///     Joint::MiddleProximal,
///     vec![ConeRayAngleSides::new(
///         FingerSide::Volar,
///         vec![RayAngle::new(20.0, 0.0, 0.1)],
///     )],
/// );
/// asset.refresh_cache();
///
/// // No radial set, so the volar fallback answers.
/// let rays = asset.get_angles(Joint::MiddleProximal, FingerSide::Radial);
/// assert_eq!(rays.map(|r| r.len()), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct ConeRayAngles {
    fallback_side: FingerSide,
    angles: BTreeMap<Joint, Vec<ConeRayAngleSides>>,
    cache: AngleCache,
}

impl ConeRayAngles {
    /// Create an empty asset with the default (volar) fallback side.
    pub fn new() -> Self {
        Self::with_fallback_side(FingerSide::default())
    }

    /// Empty asset that answers missing sides from `fallback_side`.
    pub fn with_fallback_side(fallback_side: FingerSide) -> Self {
        Self {
            fallback_side,
            angles: Joint::ALL.into_iter().map(|j| (j, Vec::new())).collect(),
            cache: AngleCache::default(),
        }
    }

    /// The side used when the requested side has no enabled angles.
    pub fn fallback_side(&self) -> FingerSide {
        self.fallback_side
    }

    /// Takes effect on the next query; no refresh needed.
    pub fn set_fallback_side(&mut self, side: FingerSide) {
        self.fallback_side = side;
    }

    /// Raw side sets stored for `joint`, including disabled rays.
    pub fn angles(&self, joint: Joint) -> &[ConeRayAngleSides] {
        self.angles.get(&joint).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable raw side sets for `joint`. Call [`Self::refresh_cache`] afterwards.
    pub fn angles_mut(&mut self, joint: Joint) -> &mut Vec<ConeRayAngleSides> {
        self.angles.entry(joint).or_default()
    }

    /// Replace the raw side sets for `joint`. Call [`Self::refresh_cache`] afterwards.
    pub fn set_angles(&mut self, joint: Joint, sides: Vec<ConeRayAngleSides>) {
        self.angles.insert(joint, sides);
    }

    /// Iterate raw side sets in [`Joint::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, &[ConeRayAngleSides])> {
        Joint::ALL.into_iter().map(|joint| (joint, self.angles(joint)))
    }

    /// Number of stored rays across all joints and sides, disabled ones included.
    pub fn total_angles(&self) -> usize {
        self.angles
            .values()
            .flatten()
            .map(|sides| sides.ray_angles.len())
            .sum()
    }

    /// Rebuild the active cache from the raw side sets.
    pub fn refresh_cache(&mut self) -> CacheRefreshReport {
        let (cache, report) = AngleCache::build(&self.angles);
        self.cache = cache;
        report
    }

    /// The active cache as of the last refresh.
    pub fn cache(&self) -> &AngleCache {
        &self.cache
    }

    /// Enabled rays for `(joint, side)`, or for `(joint, fallback_side)` when
    /// the requested side has none. `None` when neither has enabled rays.
    pub fn get_angles(&self, joint: Joint, side: FingerSide) -> Option<&[RayAngle]> {
        self.cache.get(joint, side, self.fallback_side)
    }

    /// Serialize to the flat JSON asset format.
    pub fn to_json(&self) -> Result<String, AngleDataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from the flat JSON asset format and refresh the cache.
    pub fn from_json(json: &str) -> Result<Self, AngleDataError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ConeRayAngles {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality of stored data; the derived cache is not compared.
impl PartialEq for ConeRayAngles {
    fn eq(&self, other: &Self) -> bool {
        self.fallback_side == other.fallback_side
            && Joint::ALL
                .into_iter()
                .all(|joint| self.angles(joint) == other.angles(joint))
    }
}

impl Serialize for ConeRayAngles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Joint::ALL.len() + 1))?;
        map.serialize_entry(FALLBACK_SIDE_FIELD, &self.fallback_side)?;
        for (joint, sides) in self.iter() {
            map.serialize_entry(joint.field_name(), sides)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ConeRayAngles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ConeRayAnglesVisitor)
    }
}

struct ConeRayAnglesVisitor;

impl<'de> Visitor<'de> for ConeRayAnglesVisitor {
    type Value = ConeRayAngles;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a flat cone ray angle object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut fallback_side: Option<FingerSide> = None;
        let mut seen: BTreeMap<Joint, Vec<ConeRayAngleSides>> = BTreeMap::new();

        while let Some(key) = map.next_key::<String>()? {
            if key == FALLBACK_SIDE_FIELD {
                if fallback_side.is_some() {
                    return Err(de::Error::duplicate_field(FALLBACK_SIDE_FIELD));
                }
                fallback_side = Some(map.next_value()?);
            } else if let Some(joint) = Joint::from_field_name(&key) {
                if seen.contains_key(&joint) {
                    return Err(de::Error::duplicate_field(joint.field_name()));
                }
                seen.insert(joint, map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }

        let mut asset = ConeRayAngles::with_fallback_side(fallback_side.unwrap_or_default());
        for (joint, sides) in seen {
            asset.set_angles(joint, sides);
        }
        asset.refresh_cache();
        Ok(asset)
    }
}
