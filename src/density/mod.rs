//! Exact completion-density computation.
//!
//! Instead of sampling completions, this module builds the absorbing Markov
//! chain of the collection process and reads the completion probability per
//! kill count directly from its matrix powers:
//!
//! - [`transitions`]: one sparse matrix per roll table, composed into a
//!   single per-kill matrix
//! - [`forward`]: power iteration against the absorbing state →
//!   [`forward::CompletionDistribution`]

pub mod forward;
pub mod transitions;

pub use forward::{completion_distribution, CompletionDistribution};
pub use transitions::{per_kill_matrix, table_matrix};
