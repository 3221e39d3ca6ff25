//! Example: Grid-search the estimator against labelled recordings
//!
//! Usage:
//!   cargo run --release --example calibrate -- [--jobs N] --good <files...> --bad <files...>
//!
//! Emits one JSON object per grid point (JSONL) on stdout, then the best rows
//! on stderr.
//!
//! Notes:
//! - Parallelism is across grid points. Each file analysis is still single-threaded.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use attack_time::calibration::{sweep_default, CalibrationRow, Corpus, ParameterGrid};
use attack_time::AttackConfig;
use std::env;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

/// Lower overlap first; rows without an overlap fall back to larger margin
fn rank(a: &CalibrationRow, b: &CalibrationRow) -> std::cmp::Ordering {
    match (a.score.overlap, b.score.overlap) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => {
            let margin = |r: &CalibrationRow| r.score.margin.unwrap_or(f64::NEG_INFINITY);
            margin(b).total_cmp(&margin(a))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut jobs: Option<usize> = None;
    let mut good: Vec<String> = Vec::new();
    let mut bad: Vec<String> = Vec::new();
    let mut target: Option<bool> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--good" => target = Some(true),
            "--bad" => target = Some(false),
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: calibrate [--jobs N] --good <files...> --bad <files...>\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --good     Recordings with clean attacks\n\
                     --bad      Recordings with dirty attacks\n"
                );
                return Ok(());
            }
            _ => match target {
                Some(true) => good.push(a),
                Some(false) => bad.push(a),
                None => {
                    eprintln!("ERROR: {} given before --good or --bad", a);
                    std::process::exit(2);
                }
            },
        }
    }

    if good.is_empty() || bad.is_empty() {
        eprintln!("ERROR: Provide at least one --good and one --bad file. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    let grid = ParameterGrid::default();
    eprintln!(
        "Calibration: {} good, {} bad, {} grid points, jobs={}",
        good.len(),
        bad.len(),
        grid.len(),
        jobs
    );

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let config = AttackConfig::default();
    let rows = pool.install(|| {
        let corpus = Corpus::load(&good, &bad, &config)?;
        sweep_default(&corpus, &grid)
    })?;

    for row in &rows {
        println!("{}", serde_json::to_string(row)?);
    }

    let mut ranked: Vec<&CalibrationRow> = rows.iter().collect();
    ranked.sort_by(|a, b| rank(a, b));

    eprintln!(
        "Done: rows={} with_errors={} wall={:.0}ms",
        rows.len(),
        rows.iter().filter(|r| r.any_error != 0).count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    for row in ranked.iter().take(5) {
        eprintln!(
            "  ratio={:.3} threshold={:.3} window={} peaks={} overlap={:?} margin={:?}",
            row.parameters.onset_energy_ratio,
            row.parameters.peak_energy_threshold,
            row.parameters.rolling_window,
            row.parameters.peak_count,
            row.score.overlap,
            row.score.margin
        );
    }

    Ok(())
}
