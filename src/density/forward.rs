//! Absorption analysis — the kill-count completion distribution.
//!
//! With per-kill matrix `M` and absorbing state `F`, the chance of being
//! finished after `k` kills is `M^k[start, F]`. The iteration keeps the
//! start-state row of the running power (`v ← v·M`, `cdf[k] = v[F]`), which
//! is the same number at O(nnz) per kill instead of a matrix product, and
//! stops once the completion mass reaches the convergence threshold.
//!
//! The derived statistics follow the cdf exactly: pdf by differencing, mean
//! as Σ k·pdf[k], mode as the pdf argmax, median as the first k with
//! cdf > 0.5. Display truncation is computed last and never feeds back into
//! the statistics.

use tracing::{debug, warn};

use crate::constants::{CONVERGENCE_THRESHOLD, DISPLAY_CUTOFF_RATIO, MAX_KILLS};
use crate::sparse::SparseMatrix;

/// The exact distribution of the kill count at completion.
///
/// `cdf` and `pdf` are in percent, aligned with `kc` (kill counts from 1).
/// `mean`, `mode` and `median` are computed from the underlying
/// probabilities before the percent scaling. A spec with nothing to track
/// yields the empty distribution with all statistics at their 0 sentinels.
#[derive(Debug, Clone)]
pub struct CompletionDistribution {
    pub kc: Vec<u32>,
    pub cdf: Vec<f64>,
    pub pdf: Vec<f64>,
    pub mean: f64,
    pub mode: u32,
    pub median: u32,
    /// First index worth displaying: the low-signal prefix before the pdf
    /// reaches a fraction of its peak. Presentation only.
    pub display_cutoff: usize,
}

impl CompletionDistribution {
    fn trivial() -> Self {
        Self {
            kc: Vec::new(),
            cdf: Vec::new(),
            pdf: Vec::new(),
            mean: 0.0,
            mode: 0,
            median: 0,
            display_cutoff: 0,
        }
    }
}

/// Power the per-kill matrix against the absorbing state and derive the
/// completion distribution.
///
/// `absorbing` is the fully-completed state index (`n_states − 1`).
pub fn completion_distribution(
    matrix: &SparseMatrix,
    absorbing: usize,
) -> CompletionDistribution {
    let n = matrix.n();
    if n <= 1 {
        // All targets zero: completed before the first kill.
        return CompletionDistribution::trivial();
    }

    let mut v = vec![0.0f64; n];
    let mut next = vec![0.0f64; n];
    v[0] = 1.0;

    let mut cdf_raw: Vec<f64> = Vec::new();
    loop {
        matrix.propagate(&v, &mut next);
        std::mem::swap(&mut v, &mut next);
        let c = v[absorbing];
        cdf_raw.push(c);
        if c >= CONVERGENCE_THRESHOLD {
            break;
        }
        if cdf_raw.len() >= MAX_KILLS {
            warn!(
                kills = cdf_raw.len(),
                cdf = c,
                "kill cap reached before convergence; distribution is truncated"
            );
            break;
        }
    }
    debug!(
        kills = cdf_raw.len(),
        cdf = cdf_raw.last().copied().unwrap_or(0.0),
        "absorption converged"
    );

    from_cdf(cdf_raw)
}

fn from_cdf(cdf_raw: Vec<f64>) -> CompletionDistribution {
    let kills = cdf_raw.len();
    let mut pdf_raw = Vec::with_capacity(kills);
    let mut prev = 0.0f64;
    for &c in &cdf_raw {
        pdf_raw.push(c - prev);
        prev = c;
    }

    // mean = Σ k·pdf[k]; a plain sum, so zero pdf mass needs no special case
    // here. mode and median fall back to 0 when there is no mass at all.
    let mean: f64 = pdf_raw
        .iter()
        .enumerate()
        .map(|(i, &p)| (i + 1) as f64 * p)
        .sum();

    let mut mode = 0u32;
    let mut max_pdf = 0.0f64;
    for (i, &p) in pdf_raw.iter().enumerate() {
        if p > max_pdf {
            max_pdf = p;
            mode = (i + 1) as u32;
        }
    }

    let median = cdf_raw
        .iter()
        .position(|&c| c > 0.5)
        .map(|i| (i + 1) as u32)
        .unwrap_or(0);

    let display_cutoff = if max_pdf > 0.0 {
        pdf_raw
            .iter()
            .position(|&p| p >= max_pdf * DISPLAY_CUTOFF_RATIO)
            .unwrap_or(0)
    } else {
        0
    };

    CompletionDistribution {
        kc: (1..=kills as u32).collect(),
        cdf: cdf_raw.into_iter().map(|c| c * 100.0).collect(),
        pdf: pdf_raw.into_iter().map(|p| p * 100.0).collect(),
        mean,
        mode,
        median,
        display_cutoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two-state chain: obtain the single item with probability `p` per kill.
    fn geometric(p: f64) -> SparseMatrix {
        SparseMatrix::from_rows(2, vec![vec![(0, 1.0 - p), (1, p)], vec![(1, 1.0)]])
    }

    #[test]
    fn geometric_1_in_128() {
        let d = completion_distribution(&geometric(1.0 / 128.0), 1);

        // cdf[1] = 1/128 ≈ 0.78125%
        assert!((d.cdf[0] - 100.0 / 128.0).abs() < 1e-9);
        // Smallest k with 1 − (127/128)^k > 0.5 is 89.
        assert_eq!(d.median, 89);
        // Mode of a geometric distribution is the first kill.
        assert_eq!(d.mode, 1);
        // Truncation at 0.99999 leaves the mean within 0.05 of 128.
        assert!((d.mean - 128.0).abs() < 0.05, "mean={}", d.mean);
        assert!(*d.cdf.last().unwrap() >= 99.999);
    }

    #[test]
    fn cdf_is_non_decreasing_and_pdf_is_its_difference() {
        let d = completion_distribution(&geometric(0.03), 1);
        let mut prev = 0.0;
        for (i, &c) in d.cdf.iter().enumerate() {
            assert!(c >= prev, "cdf decreased at kc {}", d.kc[i]);
            assert!((d.pdf[i] - (c - prev)).abs() < 1e-9);
            prev = c;
        }
        let total: f64 = d.pdf.iter().sum();
        assert!((total - *d.cdf.last().unwrap()).abs() < 1e-6);
    }

    #[test]
    fn kc_is_one_based_and_aligned() {
        let d = completion_distribution(&geometric(0.5), 1);
        assert_eq!(d.kc[0], 1);
        assert_eq!(d.kc.len(), d.cdf.len());
        assert_eq!(d.kc.len(), d.pdf.len());
        assert!((d.cdf[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn trivial_space_short_circuits() {
        let d = completion_distribution(&SparseMatrix::identity(1), 0);
        assert!(d.kc.is_empty());
        assert_eq!(d.mean, 0.0);
        assert_eq!(d.mode, 0);
        assert_eq!(d.median, 0);
    }

    #[test]
    fn display_cutoff_does_not_move_the_statistics() {
        // A chain whose pdf ramps up slowly: collect 3 of an item at 1/20.
        let p = 1.0 / 20.0;
        let m = SparseMatrix::from_rows(
            4,
            vec![
                vec![(0, 1.0 - p), (1, p)],
                vec![(1, 1.0 - p), (2, p)],
                vec![(2, 1.0 - p), (3, p)],
                vec![(3, 1.0)],
            ],
        );
        let d = completion_distribution(&m, 3);
        assert!(d.display_cutoff < d.kc.len());
        // The cutoff is a hint; mean/mode/median come from the full series.
        assert!(d.mean > 55.0 && d.mean < 65.0, "mean={}", d.mean);
        assert!(d.mode >= 1);
        assert!(d.median >= d.mode);
    }
}
