use dropkc::env_config;
use dropkc::simulation::statistics::{aggregate_statistics, save_statistics};
use dropkc::solver::KcSolver;
use dropkc::types::LootSpec;

fn parse_args() -> (String, usize, u64, u32, Option<String>) {
    let args: Vec<String> = std::env::args().collect();
    let mut spec_path: Option<String> = None;
    let mut runs = env_config::default_runs();
    let mut seed = 42u64;
    let mut scale = 1u32;
    let mut output: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    runs = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --runs value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --seed value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--scale" => {
                i += 1;
                if i < args.len() {
                    scale = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid --scale value: {}", args[i]);
                        std::process::exit(1);
                    });
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                println!(
                    "Usage: dropkc-simulate SPEC.json [--runs N] [--seed S] [--scale N] [--output FILE]"
                );
                println!();
                println!("Options:");
                println!("  --runs N      Completion runs (default: {})", env_config::default_runs());
                println!("  --seed S      RNG seed (default: 42)");
                println!("  --scale N     Multiply every target quantity by N (default: 1)");
                println!("  --output FILE Write aggregated statistics JSON to FILE");
                std::process::exit(0);
            }
            other if spec_path.is_none() && !other.starts_with('-') => {
                spec_path = Some(other.to_string());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let spec_path = spec_path.unwrap_or_else(|| {
        eprintln!(
            "Usage: dropkc-simulate SPEC.json [--runs N] [--seed S] [--scale N] [--output FILE]"
        );
        std::process::exit(1);
    });
    (spec_path, runs, seed, scale, output)
}

fn main() {
    env_config::init_tracing();
    let (spec_path, runs, seed, scale, output) = parse_args();

    let content = std::fs::read_to_string(&spec_path).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {}", spec_path, e);
        std::process::exit(1);
    });
    let spec: LootSpec = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Failed to parse {}: {}", spec_path, e);
        std::process::exit(1);
    });

    let num_threads = env_config::init_rayon_threads();
    let mut solver = KcSolver::with_scale(spec, scale).unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    println!(
        "{}: {} runs ({} threads)",
        solver.spec().name,
        runs,
        num_threads
    );

    let result = solver.simulate(runs, seed);
    let per_run_us = result.elapsed.as_secs_f64() * 1e6 / runs.max(1) as f64;
    println!(
        "  Elapsed:    {:.1} ms ({:.1} µs/run, {:.0} runs/sec)",
        result.elapsed.as_secs_f64() * 1000.0,
        per_run_us,
        runs as f64 / result.elapsed.as_secs_f64().max(1e-9)
    );
    println!();
    println!("Results:");
    println!("  Mean kc:   {:.2}", result.mean);
    println!("  Std dev:   {:.1}", result.std_dev);
    println!("  Min:       {}", result.min);
    println!("  Max:       {}", result.max);
    println!("  Median:    {}", result.median);

    // When the exact engine can handle the spec, cross-check the sample mean
    // against it.
    if solver.build_matrix().is_ok() {
        if let Ok(d) = solver.distribution() {
            let se = result.std_dev / (runs.max(1) as f64).sqrt();
            if se > 0.0 {
                let z = (result.mean - d.mean) / se;
                println!();
                println!(
                    "  Exact mean: {:.2}  (z = {:+.2}, |z| < 3.0 expected)",
                    d.mean, z
                );
                if z.abs() > 3.5 {
                    eprintln!(
                        "WARNING: Sample mean deviates from the exact mean by {:.1} standard errors",
                        z.abs()
                    );
                }
            }
        }
    }

    if let Some(path) = output {
        let stats = aggregate_statistics(&result.kcs, seed);
        save_statistics(&stats, &path);
        println!();
        println!("  Statistics saved: {}", path);
    }
}
