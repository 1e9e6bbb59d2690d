//! Shared environment configuration for the binaries.
//!
//! Consolidates the `DROPKC_*` environment reads so every binary agrees on
//! defaults.

/// Read `DROPKC_NUM_THREADS` (fallback `RAYON_NUM_THREADS`, default 8) and
/// build the rayon global pool. Tolerates an already-initialized pool.
/// Returns the thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = std::env::var("DROPKC_NUM_THREADS")
        .or_else(|_| std::env::var("RAYON_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // May fail if already initialized
    num_threads
}

/// Read `DROPKC_RUNS` (default 100,000): Monte Carlo runs per spec when
/// no `--runs` argument is given.
pub fn default_runs() -> usize {
    std::env::var("DROPKC_RUNS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(100_000)
}

/// Install the tracing subscriber for binary output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();
}
