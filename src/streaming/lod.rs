//! Level of Detail (LOD) tiers for distance-based detail reduction
//!
//! A [`LodTier`] pairs a geometry decimation step with a distance threshold.
//! Tiers live in a [`LodTable`] ordered from finest to coarsest; chunks refer
//! to their current tier through a copyable [`TierId`] and never own it.
//!
//! All comparisons use squared distances so per-frame, per-chunk selection
//! never takes a square root.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Default tier table
/// - near: full detail - 0-32m
/// - mid: every 2nd vertex - 32-96m
/// - far: every 4th vertex - 96-256m
/// - horizon: every 8th vertex - 256m+
pub const DEFAULT_TIERS: [(&str, u32, f32); 4] = [
    ("near", 1, 32.0),
    ("mid", 2, 96.0),
    ("far", 4, 256.0),
    ("horizon", 8, 1024.0),
];

/// One rung of the LOD ladder
///
/// `sqr_distance` is derived from `distance` and only ever updated together
/// with it through [`LodTier::set_distance`]. It is not serialized: loading a
/// tier re-derives it from the stored distance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "LodTierRecord", into = "LodTierRecord")]
pub struct LodTier {
    name: String,
    step: u32,
    distance: f32,
    sqr_distance: f32,
}

/// Persisted form of a [`LodTier`]
#[derive(Serialize, Deserialize)]
struct LodTierRecord {
    name: String,
    step: u32,
    distance: f32,
}

impl From<LodTierRecord> for LodTier {
    fn from(record: LodTierRecord) -> Self {
        Self::new(record.name, record.step, record.distance)
    }
}

impl From<LodTier> for LodTierRecord {
    fn from(tier: LodTier) -> Self {
        Self {
            name: tier.name,
            step: tier.step,
            distance: tier.distance,
        }
    }
}

impl LodTier {
    /// Create a tier
    ///
    /// Negative distances are accepted; they square to a positive threshold,
    /// which is rarely what the caller meant.
    ///
    /// # Examples
    /// ```
    /// use chunk_lod::streaming::lod::LodTier;
    ///
    /// let tier = LodTier::new("mid", 2, 50.0);
    /// assert_eq!(tier.sqr_distance(), 2500.0);
    /// ```
    pub fn new(name: impl Into<String>, step: u32, distance: f32) -> Self {
        Self {
            name: name.into(),
            step,
            distance,
            sqr_distance: distance * distance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry decimation factor (1 = full detail)
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Linear distance threshold
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Cached `distance * distance`
    pub fn sqr_distance(&self) -> f32 {
        self.sqr_distance
    }

    /// Change the distance threshold and re-derive the squared threshold
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
        self.sqr_distance = distance * distance;
    }

    /// Check whether a point at `sqr_distance` falls within this tier's threshold
    pub fn covers(&self, sqr_distance: f32) -> bool {
        self.sqr_distance >= sqr_distance
    }
}

/// Identity is `step` plus the exact `distance`; `name` is a label only.
///
/// Distances compare with plain `==`, so `0.0 == -0.0` and NaN never equals
/// itself.
impl PartialEq for LodTier {
    fn eq(&self, other: &Self) -> bool {
        self.step == other.step && self.distance == other.distance
    }
}

/// Non-owning reference to a tier in a [`LodTable`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TierId(pub usize);

impl TierId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered tier list, finest first
///
/// Owns every tier. The table outlives the chunks pointing into it; tiers are
/// only ever appended, so a [`TierId`] stays valid.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    tiers: Vec<LodTier>,
}

impl Default for LodTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS
                .iter()
                .map(|&(name, step, distance)| LodTier::new(name, step, distance))
                .collect(),
        }
    }
}

impl LodTable {
    /// Build a table from tiers ordered finest to coarsest
    ///
    /// Fails on an empty list or a zero decimation step. Thresholds that do not
    /// increase are allowed but logged: selection always follows list order.
    pub fn new(tiers: Vec<LodTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(Error::Config("LOD table must have at least one tier".into()));
        }

        for tier in &tiers {
            validate_tier(tier)?;
        }

        for pair in tiers.windows(2) {
            if pair[1].sqr_distance < pair[0].sqr_distance {
                log::warn!(
                    "LOD tier '{}' ({}m) is closer than preceding tier '{}' ({}m)",
                    pair[1].name,
                    pair[1].distance,
                    pair[0].name,
                    pair[0].distance
                );
            }
        }

        Ok(Self { tiers })
    }

    /// Append a tier at the coarse end
    pub fn push(&mut self, tier: LodTier) -> Result<TierId> {
        validate_tier(&tier)?;
        self.tiers.push(tier);
        Ok(TierId(self.tiers.len() - 1))
    }

    /// Select the tier for a point at `sqr_distance` from the viewer
    ///
    /// Returns the first tier, in finest-to-coarsest order, whose squared
    /// threshold is not exceeded. Beyond every threshold the coarsest tier is
    /// used. Equal thresholds resolve to the earlier tier.
    ///
    /// # Examples
    /// ```
    /// use chunk_lod::streaming::lod::{LodTable, LodTier};
    ///
    /// let table = LodTable::new(vec![
    ///     LodTier::new("near", 1, 10.0),
    ///     LodTier::new("mid", 2, 50.0),
    ///     LodTier::new("far", 4, 200.0),
    /// ]).unwrap();
    ///
    /// assert_eq!(table.select_tier(50.0).name(), "near");
    /// assert_eq!(table.select_tier(1600.0).name(), "mid");
    /// assert_eq!(table.select_tier(50_000.0).name(), "far"); // fallback
    /// ```
    pub fn select(&self, sqr_distance: f32) -> TierId {
        let index = self
            .tiers
            .iter()
            .position(|tier| tier.covers(sqr_distance))
            .unwrap_or(self.tiers.len() - 1);
        log::trace!("LOD select: sqr_distance={} -> tier {}", sqr_distance, index);
        TierId(index)
    }

    /// Select the tier itself for a point at `sqr_distance`
    pub fn select_tier(&self, sqr_distance: f32) -> &LodTier {
        &self.tiers[self.select(sqr_distance).0]
    }

    pub fn get(&self, id: TierId) -> Option<&LodTier> {
        self.tiers.get(id.0)
    }

    /// Tune a tier's distance threshold
    pub fn set_distance(&mut self, id: TierId, distance: f32) -> Result<()> {
        let tier = self.tiers.get_mut(id.0).ok_or(Error::UnknownTier(id.0))?;
        log::debug!(
            "LOD tier '{}' distance {} -> {}",
            tier.name,
            tier.distance,
            distance
        );
        tier.set_distance(distance);
        Ok(())
    }

    /// Finest tier
    pub fn finest(&self) -> TierId {
        TierId(0)
    }

    /// Coarsest tier (the fallback)
    pub fn coarsest(&self) -> TierId {
        TierId(self.tiers.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false: a table holds at least one tier
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TierId, &LodTier)> {
        self.tiers.iter().enumerate().map(|(i, tier)| (TierId(i), tier))
    }

    /// Tiers in configured order
    pub fn tiers(&self) -> &[LodTier] {
        &self.tiers
    }
}

fn validate_tier(tier: &LodTier) -> Result<()> {
    if tier.step == 0 {
        return Err(Error::Config(format!(
            "LOD tier '{}' has a decimation step of 0",
            tier.name
        )));
    }
    Ok(())
}
