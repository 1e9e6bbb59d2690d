//! Input contract: loot specifications, roll tables, roll policy, and errors.
//!
//! A [`LootSpec`] is immutable external configuration (the per-monster catalog
//! lives outside this crate). Per-monster quirks that the source material
//! expresses as overridden roll behavior — double rolls on a table, loot
//! shared across a team — are declarative fields here: [`RollTable::rolls`]
//! and [`LootSpec::team_size`]. Policy is data, not dispatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MAX_TABLES, TABLE_SUM_TOLERANCE};

fn default_rolls() -> u32 {
    1
}

fn default_team_size() -> u32 {
    1
}

/// One weighted, mutually exclusive roll: item → per-roll probability in
/// (0, 1]. The probabilities may sum to less than 1; the remainder is the
/// implicit "nothing" outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollTable {
    pub odds: BTreeMap<String, f64>,
    /// Independent rolls taken on this table per kill (default 1).
    #[serde(default = "default_rolls")]
    pub rolls: u32,
}

/// A collection goal: target quantities plus up to 4 roll tables, composed
/// in order (primary..quaternary) on every kill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LootSpec {
    pub name: String,
    /// Target quantity per item. Target 0 = the item is rolled (and counted
    /// by the simulator) but does not gate completion.
    pub targets: BTreeMap<String, u32>,
    pub tables: Vec<RollTable>,
    /// Every table probability is divided by this (loot shared across a
    /// team). Default 1.
    #[serde(default = "default_team_size")]
    pub team_size: u32,
}

impl LootSpec {
    /// Tracked items (target > 0) in stable map order — the digit order used
    /// by the state-space indexer.
    pub fn tracked(&self) -> impl Iterator<Item = (&str, u32)> {
        self.targets
            .iter()
            .filter(|(_, &t)| t > 0)
            .map(|(name, &t)| (name.as_str(), t))
    }

    /// Reject malformed or unsatisfiable specs before any construction.
    ///
    /// Checks, in order: table count, roll policy, probability ranges,
    /// per-table probability sums, and that every tracked item is obtainable
    /// from at least one table.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.tables.is_empty() {
            return Err(SpecError::Configuration(format!(
                "spec '{}' has no roll tables",
                self.name
            )));
        }
        if self.tables.len() > MAX_TABLES {
            return Err(SpecError::Configuration(format!(
                "spec '{}' has {} tables, max is {}",
                self.name,
                self.tables.len(),
                MAX_TABLES
            )));
        }
        if self.team_size == 0 {
            return Err(SpecError::Configuration(format!(
                "spec '{}' has team_size 0",
                self.name
            )));
        }

        for (ti, table) in self.tables.iter().enumerate() {
            if table.rolls == 0 {
                return Err(SpecError::Configuration(format!(
                    "spec '{}' table {} has rolls 0",
                    self.name, ti
                )));
            }
            let mut sum = 0.0f64;
            for (item, &p) in &table.odds {
                if !p.is_finite() || p <= 0.0 || p > 1.0 {
                    return Err(SpecError::Configuration(format!(
                        "spec '{}' table {}: probability {} for '{}' is outside (0, 1]",
                        self.name, ti, p, item
                    )));
                }
                sum += p;
            }
            if sum > 1.0 + TABLE_SUM_TOLERANCE {
                return Err(SpecError::Configuration(format!(
                    "spec '{}' table {}: probabilities sum to {} (> 1)",
                    self.name, ti, sum
                )));
            }
        }

        for (item, _) in self.tracked() {
            let obtainable = self.tables.iter().any(|t| t.odds.contains_key(item));
            if !obtainable {
                return Err(SpecError::Configuration(format!(
                    "spec '{}': item '{}' has a nonzero target but appears in no table",
                    self.name, item
                )));
            }
        }

        Ok(())
    }
}

/// Errors surfaced by spec validation and matrix construction.
///
/// `CapacityExceeded` is a normal failed result, not a defect: batch callers
/// are expected to match on it and fall back to Monte Carlo.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// Unsatisfiable or malformed spec; the caller must fix the input.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The state space exceeds the exact engine's hard cap.
    #[error("state space too large: {n_states} states exceeds cap of {cap}")]
    CapacityExceeded { n_states: u64, cap: u64 },
    /// `distribution()` was called before a successful `build_matrix()`.
    #[error("per-kill matrix not built; call build_matrix() first")]
    MatrixNotBuilt,
}
