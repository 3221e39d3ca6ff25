//! Example: Estimate the attack of a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- [--json] [--config config.json] <file>
//!
//! Set `RUST_LOG=debug` to see per-stage progress.

use attack_time::{AttackConfig, AttackEstimator, Waveform};
use std::env;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut config_path: Option<String> = None;
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--config" => {
                config_path = Some(args.first().ok_or("--config requires a path")?.clone());
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_file [--json] [--config config.json] <file>\n\
                     \n\
                     --json     Emit the analysis as one JSON object\n\
                     --config   JSON file overriding AttackConfig fields\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let config: AttackConfig = match config_path {
        Some(p) => serde_json::from_str(&std::fs::read_to_string(p)?)?,
        None => AttackConfig::default(),
    };
    let estimator = AttackEstimator::new(config)?;

    let t0 = Instant::now();
    let waveform = Waveform::from_file(&path)?;
    let analysis = estimator.analyze(&waveform)?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;

    if json {
        println!("{}", serde_json::to_string(&analysis)?);
    } else {
        println!("Attack Results: {}", path);
        println!("  Start: {} ms", analysis.result.start_ms);
        println!("  Duration: {} ms", analysis.result.duration_ms);
        println!("  End: {} ms", analysis.result.end_ms());
        println!(
            "  Frames: {} analysed, {} truncated, {} unvoiced, {} silent",
            analysis.analysed_frames,
            analysis.truncated_frames,
            analysis.unvoiced_frames,
            analysis.silent_frames
        );
        println!("  Processing time: {:.2} ms", elapsed_ms);
    }

    Ok(())
}
