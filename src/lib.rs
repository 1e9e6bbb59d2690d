//! # dropkc — kill-count distributions for drop-table collection goals
//!
//! Answers "how many kills until I have all of X?" for loot systems where each
//! kill rolls up to four independent weighted tables. The collection process is
//! an **absorbing Markov chain** over per-item progress vectors; the crate
//! derives the exact distribution of the kill count at completion, and ships an
//! independent Monte Carlo simulator to validate it (and to stand in for it
//! when the state space is too large).
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | 1 | [`types`] | [`types::LootSpec`]: item targets + up to 4 roll tables + roll policy, validated up front |
//! | 2 | [`state_space`] | Mixed-radix indexing of progress vectors, bases = target+1 per tracked item |
//! | 3 | [`density::transitions`] | One sparse right-stochastic matrix per table; tables compose into one per-kill matrix |
//! | 4 | [`density::forward`] | Power iteration against the absorbing state → cdf/pdf/mean/mode/median per kill count |
//! | — | [`simulation`] | Monte Carlo completion runs (ground truth, and the fallback past the state cap) |
//! | — | [`reduced`] | Compact encodings for pools of same-odds items (exponential → polynomial states) |
//!
//! [`solver::KcSolver`] wires the stages together behind the external
//! interface: construct from a spec, `build_matrix()`, `distribution()`.
//!
//! ## State representation
//!
//! A progress vector assigns each tracked item a count in `0..=target`. The
//! flat index is the mixed-radix number with those digits (least-significant
//! item first), so state 0 is "nothing yet" and state `n_states - 1` is the
//! absorbing "everything collected" state. `n_states` is the product of
//! `target + 1` over tracked items and is refused above
//! [`constants::STATE_CAP`] — callers fall back to simulation.

pub mod constants;
pub mod density;
pub mod env_config;
pub mod reduced;
pub mod simulation;
pub mod solver;
pub mod sparse;
pub mod state_space;
pub mod types;
