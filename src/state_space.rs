//! Mixed-radix state indexing over per-item progress vectors.
//!
//! A state assigns each tracked dimension a digit in `0..=target`; the flat
//! index is the mixed-radix number with bases `target + 1`, least-significant
//! dimension first:
//!
//! `index = Σ digit_d · stride_d`, with `stride_0 = 1` and
//! `stride_{d+1} = stride_d · base_d`.
//!
//! Index 0 is "nothing obtained", index `n_states - 1` is the fully completed
//! (absorbing) state. [`StateSpace::index_to_digits`] and
//! [`StateSpace::digits_to_index`] are exact inverses over `[0, n_states)`,
//! O(#dimensions) per call.

use crate::constants::STATE_CAP;
use crate::types::{LootSpec, SpecError};

/// Immutable indexing context: dimension names, bases, and strides.
///
/// Built once per spec (or per reduced encoding) and shared by the matrix
/// builders; the dimension order is the stable order of the underlying map,
/// so indices are reproducible across runs.
#[derive(Debug, Clone)]
pub struct StateSpace {
    items: Vec<String>,
    bases: Vec<u64>,
    strides: Vec<u64>,
    n_states: u64,
}

impl StateSpace {
    /// Build a space from (dimension name, target) pairs. Targets of 0 are
    /// the caller's responsibility to filter out; a base-1 dimension would
    /// be a wasted digit.
    ///
    /// Overflow of the state-space product reports `CapacityExceeded`
    /// rather than wrapping.
    pub fn new(dims: Vec<(String, u32)>) -> Result<Self, SpecError> {
        let mut items = Vec::with_capacity(dims.len());
        let mut bases = Vec::with_capacity(dims.len());
        let mut strides = Vec::with_capacity(dims.len());
        let mut n_states: u64 = 1;

        for (name, target) in dims {
            debug_assert!(target > 0, "dimension '{}' has target 0", name);
            let base = target as u64 + 1;
            strides.push(n_states);
            n_states = n_states
                .checked_mul(base)
                .ok_or(SpecError::CapacityExceeded {
                    n_states: u64::MAX,
                    cap: STATE_CAP,
                })?;
            items.push(name);
            bases.push(base);
        }

        Ok(Self {
            items,
            bases,
            strides,
            n_states,
        })
    }

    /// Space for a spec's tracked items (target > 0), in stable map order.
    pub fn for_spec(spec: &LootSpec) -> Result<Self, SpecError> {
        Self::new(
            spec.tracked()
                .map(|(name, target)| (name.to_string(), target))
                .collect(),
        )
    }

    pub fn n_states(&self) -> u64 {
        self.n_states
    }

    pub fn dims(&self) -> usize {
        self.bases.len()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The absorbing, fully-completed state: every digit at its maximum.
    pub fn completed(&self) -> u64 {
        self.n_states - 1
    }

    /// Position of a dimension by name, if tracked.
    pub fn dimension(&self, item: &str) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }

    pub fn base(&self, dim: usize) -> u64 {
        self.bases[dim]
    }

    pub fn stride(&self, dim: usize) -> u64 {
        self.strides[dim]
    }

    /// Extract one digit without decomposing the whole index.
    #[inline]
    pub fn digit(&self, index: u64, dim: usize) -> u64 {
        (index / self.strides[dim]) % self.bases[dim]
    }

    /// Decompose an index into its per-dimension digits.
    pub fn index_to_digits(&self, index: u64) -> Vec<u32> {
        debug_assert!(index < self.n_states);
        let mut rem = index;
        self.bases
            .iter()
            .map(|&base| {
                let digit = rem % base;
                rem /= base;
                digit as u32
            })
            .collect()
    }

    /// Recompose digits into a flat index (Horner accumulation).
    pub fn digits_to_index(&self, digits: &[u32]) -> u64 {
        debug_assert_eq!(digits.len(), self.bases.len());
        let mut index = 0u64;
        let mut running_base = 1u64;
        for (digit, &base) in digits.iter().zip(&self.bases) {
            debug_assert!((*digit as u64) < base);
            index += *digit as u64 * running_base;
            running_base *= base;
        }
        index
    }
}
