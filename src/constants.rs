//! Engine constants: resource caps, convergence thresholds, tolerances.

/// Maximum number of roll tables a spec may carry (primary..quaternary).
pub const MAX_TABLES: usize = 4;

/// Hard cap on the state-space size the exact engine will accept.
///
/// A resource bound, not a numerical limit: the power iteration is O(nnz)
/// per kill over potentially ~10^5 kills, and specs beyond this size are
/// served by Monte Carlo instead. Deliberately a fixed constant so results
/// do not depend on the machine running them.
pub const STATE_CAP: u64 = 4096;

/// Stop the power iteration once this much completion mass has accumulated.
pub const CONVERGENCE_THRESHOLD: f64 = 0.99999;

/// Safety ceiling on the number of kills the power iteration will step
/// through. Validated specs always converge long before this; the ceiling
/// only guards against pathological near-zero drop rates.
pub const MAX_KILLS: usize = 10_000_000;

/// Every row of every transition matrix must sum to 1 within this tolerance.
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Per-table probability sums may exceed 1 by at most this much
/// (floating-point slack for tables specified as fractions).
pub const TABLE_SUM_TOLERANCE: f64 = 1e-9;

/// Display cutoff: the low-signal prefix ends at the first kill count whose
/// pdf reaches `max(pdf) * DISPLAY_CUTOFF_RATIO`. Presentation only.
pub const DISPLAY_CUTOFF_RATIO: f64 = 1e-3;
