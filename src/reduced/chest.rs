//! Fixed-count uniform-draw reduction.
//!
//! Models a chest-style trial: `draws` draws per trial, each hitting the
//! reward list with chance `hit_chance` and then picking uniformly among
//! `pool_size` identities (with replacement across draws; drawing an
//! identity already credited — this trial or earlier — credits nothing new).
//!
//! Exact per-draw accounting, not simulation: with c identities credited,
//! one draw advances the counter with weight `hit_chance · (T − c) / T`,
//! and the trial is the `draws`-fold composition of that one-draw matrix,
//! so within-trial duplicates collapse naturally — a draw landing on an
//! identity credited earlier in the same trial finds it already counted.

use crate::constants::STATE_CAP;
use crate::density::forward::{completion_distribution, CompletionDistribution};
use crate::density::transitions::advance_matrix;
use crate::sparse::SparseMatrix;
use crate::state_space::StateSpace;
use crate::types::SpecError;

/// A uniform chest goal: collect every identity in a flat list, target 1
/// each.
#[derive(Debug, Clone)]
pub struct ChestSpec {
    pub name: String,
    /// Number of distinct identities on the list.
    pub pool_size: u32,
    /// Draws per trial.
    pub draws: u32,
    /// Chance each draw hits the list at all.
    pub hit_chance: f64,
}

impl ChestSpec {
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.pool_size == 0 || self.draws == 0 {
            return Err(SpecError::Configuration(format!(
                "chest '{}': pool_size and draws must be nonzero",
                self.name
            )));
        }
        if !self.hit_chance.is_finite() || self.hit_chance <= 0.0 || self.hit_chance > 1.0 {
            return Err(SpecError::Configuration(format!(
                "chest '{}': hit chance {} is outside (0, 1]",
                self.name, self.hit_chance
            )));
        }
        Ok(())
    }

    /// States 0..=pool_size: how many identities are credited.
    pub fn n_states(&self) -> u64 {
        self.pool_size as u64 + 1
    }

    fn space(&self) -> Result<StateSpace, SpecError> {
        StateSpace::new(vec![("credited".to_string(), self.pool_size)])
    }

    /// Per-trial matrix (the one-draw matrix composed `draws` times) with
    /// its absorbing index.
    pub fn per_kill_matrix(&self) -> Result<(SparseMatrix, usize), SpecError> {
        self.validate()?;
        let space = self.space()?;
        let t = self.pool_size as f64;
        let q = self.hit_chance;
        let per_draw = advance_matrix(&space, |_, count| q * (t - count as f64) / t);

        let mut matrix = per_draw.clone();
        for _ in 1..self.draws {
            matrix = matrix.multiply(&per_draw);
        }
        Ok((matrix, space.completed() as usize))
    }

    /// Build and analyze in one step, honoring the state cap.
    pub fn distribution(&self) -> Result<CompletionDistribution, SpecError> {
        if self.n_states() > STATE_CAP {
            return Err(SpecError::CapacityExceeded {
                n_states: self.n_states(),
                cap: STATE_CAP,
            });
        }
        let (matrix, absorbing) = self.per_kill_matrix()?;
        Ok(completion_distribution(&matrix, absorbing))
    }
}
