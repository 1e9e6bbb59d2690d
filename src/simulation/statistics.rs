//! Statistics aggregation from batch kill counts.
//!
//! Computes the summary a batch caller wants from raw kc samples:
//! distribution moments, percentiles, and a binned histogram, all
//! serializable straight to JSON.

use serde::Serialize;

/// Aggregated kill-count statistics for one spec.
#[derive(Serialize)]
pub struct KcStatistics {
    pub num_runs: u64,
    pub seed: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: u64,
    pub max: u64,
    pub median: u64,
    pub percentiles: Percentiles,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Serialize)]
pub struct Percentiles {
    pub p5: u64,
    pub p10: u64,
    pub p25: u64,
    pub p50: u64,
    pub p75: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

#[derive(Serialize)]
pub struct HistogramBin {
    pub lower: u64,
    /// Exclusive upper bound.
    pub upper: u64,
    pub count: u32,
}

/// Number of histogram bins the kc range is divided into.
const HISTOGRAM_BINS: u64 = 60;

/// Aggregate statistics from raw kill counts.
pub fn aggregate_statistics(kcs: &[u64], seed: u64) -> KcStatistics {
    let mut sorted: Vec<u64> = kcs.to_vec();
    sorted.sort_unstable();

    if sorted.is_empty() {
        return KcStatistics {
            num_runs: 0,
            seed,
            mean: 0.0,
            std_dev: 0.0,
            min: 0,
            max: 0,
            median: 0,
            percentiles: Percentiles {
                p5: 0,
                p10: 0,
                p25: 0,
                p50: 0,
                p75: 0,
                p90: 0,
                p95: 0,
                p99: 0,
            },
            histogram: Vec::new(),
        };
    }

    let n = sorted.len() as f64;
    let mean: f64 = sorted.iter().map(|&k| k as f64).sum::<f64>() / n;
    let variance: f64 = sorted.iter().map(|&k| (k as f64 - mean).powi(2)).sum::<f64>() / n;

    let percentile = |p: f64| -> u64 {
        let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    };

    let percentiles = Percentiles {
        p5: percentile(5.0),
        p10: percentile(10.0),
        p25: percentile(25.0),
        p50: percentile(50.0),
        p75: percentile(75.0),
        p90: percentile(90.0),
        p95: percentile(95.0),
        p99: percentile(99.0),
    };

    let min = sorted[0];
    let max = *sorted.last().unwrap();
    let bin_width = ((max - min) / HISTOGRAM_BINS).max(1);
    let num_bins = ((max - min) / bin_width + 1) as usize;
    let mut counts = vec![0u32; num_bins];
    for &k in &sorted {
        counts[((k - min) / bin_width) as usize] += 1;
    }
    let histogram: Vec<HistogramBin> = counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 0)
        .map(|(i, &c)| HistogramBin {
            lower: min + i as u64 * bin_width,
            upper: min + (i as u64 + 1) * bin_width,
            count: c,
        })
        .collect();

    KcStatistics {
        num_runs: sorted.len() as u64,
        seed,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        median: percentile(50.0),
        percentiles,
        histogram,
    }
}

/// Save aggregated statistics as JSON.
pub fn save_statistics(stats: &KcStatistics, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(stats).expect("Failed to serialize statistics");
    std::fs::write(path, json).expect("Failed to write statistics file");
}
