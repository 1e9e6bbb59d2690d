//! Compact state encodings for pools of items sharing identical odds.
//!
//! Tracking N interchangeable items individually costs 2^N states; tracking
//! only *how many* of each rarity class have been obtained costs
//! Π(size + 1). Both reducers here emit an ordinary per-kill matrix over the
//! reduced space, analyzed by [`crate::density::forward`] unchanged:
//!
//! - [`bucket`]: items with identical per-roll odds collapse to one counter
//!   per distinct odds value
//! - [`chest`]: fixed-count uniform draws from one flat list per trial
//!   (duplicates within a trial credit once)

pub mod bucket;
pub mod chest;

pub use bucket::BucketSpec;
pub use chest::ChestSpec;
