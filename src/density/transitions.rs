//! Per-table transition matrices and their per-kill composition.
//!
//! One roll on one table moves the progress vector by at most one unit: the
//! rolled item's digit advances if it is tracked and below target, anything
//! else (nothing, an untracked item, a maxed item) is a self-loop. A kill is
//! the composition of every table's rolls, in canonical order — composing
//! independent stochastic steps over the same state space is ordinary Markov
//! composition, so the per-kill matrix is the product of the per-roll
//! matrices.

use tracing::debug;

use crate::sparse::SparseMatrix;
use crate::state_space::StateSpace;
use crate::types::{LootSpec, RollTable};

/// Build a one-step advance matrix: for every state and every dimension whose
/// digit is below its maximum, an edge advancing that digit by one unit with
/// weight `weight(dim, digit)`; diagonal = 1 − Σ outgoing.
///
/// Shared by the general builder (constant weight per dimension) and the
/// reduced encodings (weight depends on the current digit).
pub(crate) fn advance_matrix(
    space: &StateSpace,
    weight: impl Fn(usize, u64) -> f64,
) -> SparseMatrix {
    debug_assert!(
        space.n_states() <= u32::MAX as u64,
        "state space does not fit CSR column indices"
    );
    let n = space.n_states() as usize;
    let mut rows = Vec::with_capacity(n);

    for i in 0..n as u64 {
        let mut outgoing: Vec<(u32, f64)> = Vec::new();
        let mut row_total = 0.0f64;
        for dim in 0..space.dims() {
            let digit = space.digit(i, dim);
            if digit + 1 >= space.base(dim) {
                continue;
            }
            let w = weight(dim, digit);
            if w == 0.0 {
                continue;
            }
            row_total += w;
            // Advancing dimension `dim` by one unit adds its stride.
            outgoing.push(((i + space.stride(dim)) as u32, w));
        }

        let mut diagonal = 1.0 - row_total;
        if diagonal.abs() < 1e-12 {
            diagonal = 0.0;
        }
        let mut row = Vec::with_capacity(outgoing.len() + 1);
        row.push((i as u32, diagonal));
        row.extend(outgoing);
        rows.push(row);
    }

    SparseMatrix::from_rows(n, rows)
}

/// Transition matrix for a single roll on one table.
///
/// Items absent from the table, untracked items, and items already at target
/// contribute no edge; their probability mass stays on the diagonal ("no
/// useful drop").
pub fn table_matrix(space: &StateSpace, table: &RollTable, team_size: u32) -> SparseMatrix {
    let mut weights = vec![0.0f64; space.dims()];
    for (item, &p) in &table.odds {
        if let Some(dim) = space.dimension(item) {
            weights[dim] = p / team_size as f64;
        }
    }
    advance_matrix(space, |dim, _| weights[dim])
}

/// Compose the per-kill matrix: every table's matrix, raised to its roll
/// count, multiplied in canonical order (primary..quaternary).
pub fn per_kill_matrix(space: &StateSpace, spec: &LootSpec) -> SparseMatrix {
    let n = space.n_states() as usize;
    let mut composed: Option<SparseMatrix> = None;

    for table in &spec.tables {
        let m = table_matrix(space, table, spec.team_size);
        for _ in 0..table.rolls {
            composed = Some(match composed {
                None => m.clone(),
                Some(c) => c.multiply(&m),
            });
        }
    }

    let matrix = composed.unwrap_or_else(|| SparseMatrix::identity(n));
    debug!(
        n_states = n,
        nnz = matrix.nnz(),
        spec = %spec.name,
        "per-kill matrix composed"
    );
    matrix
}
