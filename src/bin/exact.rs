use std::time::Instant;

use dropkc::env_config;
use dropkc::solver::KcSolver;
use dropkc::types::{LootSpec, SpecError};

fn parse_args() -> (String, u32, bool) {
    let args: Vec<String> = std::env::args().collect();
    let mut spec_path: Option<String> = None;
    let mut scale = 1u32;
    let mut full = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scale" => {
                i += 1;
                if i < args.len() {
                    scale = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --scale value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--full" => {
                full = true;
            }
            "--help" | "-h" => {
                println!("Usage: dropkc-exact SPEC.json [--scale N] [--full]");
                println!();
                println!("Options:");
                println!("  --scale N   Multiply every target quantity by N (default: 1)");
                println!("  --full      Print the whole table, ignoring the display cutoff");
                std::process::exit(0);
            }
            other if spec_path.is_none() && !other.starts_with('-') => {
                spec_path = Some(other.to_string());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: dropkc-exact SPEC.json [--scale N] [--full]");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let spec_path = spec_path.unwrap_or_else(|| {
        eprintln!("Usage: dropkc-exact SPEC.json [--scale N] [--full]");
        std::process::exit(1);
    });
    (spec_path, scale, full)
}

fn load_spec(path: &str) -> LootSpec {
    let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", path, e);
        std::process::exit(1);
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", path, e);
        std::process::exit(1);
    })
}

fn main() {
    env_config::init_tracing();
    let (spec_path, scale, full) = parse_args();
    let spec = load_spec(&spec_path);

    let mut solver = KcSolver::with_scale(spec, scale).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    println!("{} ({} states)", solver.spec().name, solver.n_states());

    let t0 = Instant::now();
    match solver.build_matrix() {
        Ok(()) => {}
        Err(SpecError::CapacityExceeded { n_states, cap }) => {
            // The exact engine declines; fall back to sampling.
            println!("  State space too large ({} > {}), simulating instead", n_states, cap);
            env_config::init_rayon_threads();
            let runs = env_config::default_runs();
            let result = solver.simulate(runs, 42);
            println!(
                "  {} runs in {:.1}s",
                runs,
                result.elapsed.as_secs_f64()
            );
            println!("  Mean kc:   {:.2}", result.mean);
            println!("  Median kc: {}", result.median);
            println!("  Min / max: {} / {}", result.min, result.max);
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
    let build_ms = t0.elapsed().as_secs_f64() * 1000.0;

    let t1 = Instant::now();
    let d = solver.distribution().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    let analyze_ms = t1.elapsed().as_secs_f64() * 1000.0;

    println!("  Matrix build: {:.1} ms", build_ms);
    println!("  Absorption:   {:.1} ms ({} kills to convergence)", analyze_ms, d.kc.len());
    println!();
    println!("  Mean kc:   {:.2}", d.mean);
    println!("  Mode kc:   {}", d.mode);
    println!("  Median kc: {}", d.median);
    println!();

    let start = if full { 0 } else { d.display_cutoff };
    println!("{:>10}  {:>10}  {:>10}", "kc", "pdf %", "cdf %");
    for i in start..d.kc.len() {
        println!("{:>10}  {:>10.5}  {:>10.4}", d.kc[i], d.pdf[i], d.cdf[i]);
    }
}
