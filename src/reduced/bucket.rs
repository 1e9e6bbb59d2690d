//! Identical-odds bucket reduction.
//!
//! When a table carries T interchangeable items (equal odds p, target 1
//! each), the chain only needs the *count* of distinct identities obtained,
//! not which ones: one mixed-radix dimension 0..=T per distinct odds value.
//!
//! The advance weight is where the reduction earns its keep. With c of T
//! already obtained, a single roll advances the counter exactly when it
//! lands on one of the T − c unseen identities, so the per-roll weight is
//! `(T − c) · p` — not simply p. Composing the per-roll matrices over a
//! trial's rolls then sums over every per-trial multiplicity of
//! new-versus-repeat draws (two rolls may hit the same unseen identity; the
//! intermediate count in the product is exactly that bookkeeping), giving
//! the exact per-trial advance distribution.

use std::collections::BTreeMap;

use crate::density::transitions::advance_matrix;
use crate::sparse::SparseMatrix;
use crate::state_space::StateSpace;
use crate::types::{LootSpec, SpecError};

/// One rarity class: `size` interchangeable identities at `p` each.
#[derive(Debug, Clone)]
pub struct RarityBucket {
    pub size: u32,
    pub p: f64,
}

/// A reduced spec: rarity buckets on a single table, rolled `rolls` times
/// per kill.
#[derive(Debug, Clone)]
pub struct BucketSpec {
    pub name: String,
    pub buckets: Vec<RarityBucket>,
    pub rolls: u32,
}

impl BucketSpec {
    /// Recognize a spec this reduction applies to: a single table whose
    /// tracked items all have target 1, grouped by identical (bit-equal)
    /// diluted odds. Returns `None` for any other shape.
    pub fn from_spec(spec: &LootSpec) -> Option<BucketSpec> {
        if spec.tables.len() != 1 {
            return None;
        }
        let table = &spec.tables[0];
        let tracked: Vec<(&str, u32)> = spec.tracked().collect();
        if tracked.is_empty() {
            return None;
        }
        if tracked.iter().any(|&(_, target)| target != 1) {
            return None;
        }

        let mut by_odds: BTreeMap<u64, RarityBucket> = BTreeMap::new();
        for (item, _) in tracked {
            let p = *table.odds.get(item)? / spec.team_size as f64;
            by_odds
                .entry(p.to_bits())
                .and_modify(|b| b.size += 1)
                .or_insert(RarityBucket { size: 1, p });
        }

        Some(BucketSpec {
            name: spec.name.clone(),
            buckets: by_odds.into_values().collect(),
            rolls: table.rolls,
        })
    }

    /// Reduced state-space size: Π (size + 1).
    pub fn n_states(&self) -> Result<u64, SpecError> {
        Ok(self.space()?.n_states())
    }

    fn space(&self) -> Result<StateSpace, SpecError> {
        StateSpace::new(
            self.buckets
                .iter()
                .enumerate()
                .map(|(i, b)| (format!("bucket-{}", i), b.size))
                .collect(),
        )
    }

    /// Per-kill matrix over the reduced space, with its absorbing index.
    pub fn per_kill_matrix(&self) -> Result<(SparseMatrix, usize), SpecError> {
        let space = self.space()?;
        let buckets = &self.buckets;
        let per_roll = advance_matrix(&space, |dim, count| {
            let b = &buckets[dim];
            (b.size as u64 - count) as f64 * b.p
        });

        let mut matrix = per_roll.clone();
        for _ in 1..self.rolls {
            matrix = matrix.multiply(&per_roll);
        }
        Ok((matrix, space.completed() as usize))
    }
}
