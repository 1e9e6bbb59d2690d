//! The external interface: spec in, kill-count distribution out.
//!
//! [`KcSolver`] owns one validated, immutable spec (with the scale
//! multiplier already applied) and wires the stages together:
//! state space → per-kill matrix → absorption analysis, plus the Monte
//! Carlo entry points. A solver is cheap to construct; changing the scale
//! means constructing a new one, which re-derives the state space and
//! starts with no cached matrix.

use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::constants::STATE_CAP;
use crate::density::forward::{completion_distribution, CompletionDistribution};
use crate::density::transitions::per_kill_matrix;
use crate::reduced::bucket::BucketSpec;
use crate::simulation::engine::{complete, simulate_batch, KillRecord, SimulationResult};
use crate::sparse::SparseMatrix;
use crate::state_space::StateSpace;
use crate::types::{LootSpec, SpecError};

pub struct KcSolver {
    spec: LootSpec,
    scale: u32,
    space: StateSpace,
    /// Per-kill matrix and its absorbing index, once built. The absorbing
    /// index travels with the matrix because a reduced build uses a smaller
    /// space than `self.space`.
    matrix: Option<(SparseMatrix, usize)>,
}

impl KcSolver {
    pub fn new(spec: LootSpec) -> Result<Self, SpecError> {
        Self::with_scale(spec, 1)
    }

    /// Validate the spec and apply `scale` linearly to every target.
    pub fn with_scale(mut spec: LootSpec, scale: u32) -> Result<Self, SpecError> {
        if scale == 0 {
            return Err(SpecError::Configuration(format!(
                "spec '{}': scale multiplier must be nonzero",
                spec.name
            )));
        }
        spec.validate()?;

        for (item, target) in spec.targets.iter_mut() {
            *target = target.checked_mul(scale).ok_or_else(|| {
                SpecError::Configuration(format!(
                    "spec '{}': scaled target for '{}' overflows",
                    spec.name, item
                ))
            })?;
        }

        let space = StateSpace::for_spec(&spec)?;
        debug!(
            spec = %spec.name,
            scale,
            n_states = space.n_states(),
            "solver constructed"
        );
        Ok(Self {
            spec,
            scale,
            space,
            matrix: None,
        })
    }

    /// The spec as solved: targets already scaled.
    pub fn spec(&self) -> &LootSpec {
        &self.spec
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Size of the full (unreduced) state space.
    pub fn n_states(&self) -> u64 {
        self.space.n_states()
    }

    pub fn matrix_built(&self) -> bool {
        self.matrix.is_some()
    }

    /// Build and retain the per-kill matrix.
    ///
    /// Prefers the full state space when it fits the cap; otherwise tries
    /// the identical-odds bucket reduction. `CapacityExceeded` is the
    /// normal "use the simulator instead" result, not a defect.
    pub fn build_matrix(&mut self) -> Result<(), SpecError> {
        if self.matrix.is_some() {
            return Ok(());
        }

        let n_states = self.space.n_states();
        if n_states <= STATE_CAP {
            let m = per_kill_matrix(&self.space, &self.spec);
            self.matrix = Some((m, self.space.completed() as usize));
            return Ok(());
        }

        if let Some(reduced) = BucketSpec::from_spec(&self.spec) {
            let reduced_states = reduced.n_states()?;
            if reduced_states <= STATE_CAP {
                info!(
                    spec = %self.spec.name,
                    full = n_states,
                    reduced = reduced_states,
                    "state space reduced via identical-odds buckets"
                );
                let (m, absorbing) = reduced.per_kill_matrix()?;
                self.matrix = Some((m, absorbing));
                return Ok(());
            }
        }

        Err(SpecError::CapacityExceeded {
            n_states,
            cap: STATE_CAP,
        })
    }

    /// The exact kill-count distribution. Requires a built matrix.
    pub fn distribution(&self) -> Result<CompletionDistribution, SpecError> {
        let (matrix, absorbing) = self.matrix.as_ref().ok_or(SpecError::MatrixNotBuilt)?;
        Ok(completion_distribution(matrix, *absorbing))
    }

    /// One Monte Carlo completion run.
    pub fn complete(&self, rng: &mut SmallRng) -> KillRecord {
        complete(&self.spec, rng)
    }

    /// A batch of independent Monte Carlo completion runs.
    pub fn simulate(&self, runs: usize, seed: u64) -> SimulationResult {
        simulate_batch(&self.spec, runs, seed)
    }
}
