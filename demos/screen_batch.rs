//! Example: Screen many voice recordings and spiral drawings in parallel
//!
//! Usage:
//!   cargo run --release --example screen_batch -- --model DIR [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - The modality is chosen per file from its extension (audio or image).
//! - Parallelism is across files. Each file is screened on one worker.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use neurovox::config::{ArtifactPaths, ScreeningConfig};
use neurovox::io::{AudioFormat, ImageFormat};
use neurovox::{PredictionResult, Screener, ScreeningError};
use rayon::prelude::*;
use serde::Serialize;
use std::env;
use std::path::Path;
use std::time::Instant;

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

#[derive(Serialize)]
struct ItemOut {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<PredictionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    processing_ms: f64,
}

fn screen_file(screener: &Screener, path: &str) -> Result<PredictionResult, ScreeningError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ScreeningError::DecodingError(format!("Cannot read {}: {}", path, e)))?;
    let filename = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    if AudioFormat::from_filename(&filename).is_ok() {
        Ok(screener.predict_from_audio(bytes, &filename)?.prediction)
    } else if ImageFormat::from_filename(&filename).is_ok() {
        Ok(screener.predict_from_handwriting(&bytes, &filename)?.prediction)
    } else {
        Err(ScreeningError::UnsupportedFormat {
            filename,
            expected: "WAV, MP3, OGG, FLAC, PNG, JPG, BMP or TIFF",
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut model_dir: Option<String> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--model" => {
                model_dir = Some(args.first().ok_or("--model requires a directory")?.clone());
                args.remove(0);
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: screen_batch --model DIR [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --model DIR  Directory holding final_model.json, scaler.json, metadata.json\n\
                     --jobs N     Parallel workers (default: CPU-1)\n\
                     --json       Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    let model_dir = model_dir.ok_or("--model is required. Use --help for usage.")?;
    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one recording or drawing. Use --help for usage.");
        std::process::exit(2);
    }

    let screener = Screener::load(&ArtifactPaths::in_dir(&model_dir), ScreeningConfig::default())?;
    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                let start = Instant::now();
                let outcome = screen_file(&screener, path);
                let processing_ms = start.elapsed().as_secs_f64() * 1000.0;
                match outcome {
                    Ok(result) => ItemOut {
                        file: path.clone(),
                        result: Some(result),
                        error: None,
                        processing_ms,
                    },
                    Err(e) => ItemOut {
                        file: path.clone(),
                        result: None,
                        error: Some(e.to_string()),
                        processing_ms,
                    },
                }
            })
            .collect()
    });

    for (idx, o) in outs.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(o)?);
            continue;
        }
        match (&o.result, &o.error) {
            (Some(r), _) => println!(
                "[{}/{}] {}: {} risk, P(PD)={:.3} ({}) time={:.0}ms",
                idx + 1,
                outs.len(),
                o.file,
                r.risk_level,
                r.probability_parkinson,
                if r.parkinson_detected { "detected" } else { "not detected" },
                o.processing_ms
            ),
            (None, error) => println!(
                "[{}/{}] {}: ERROR: {}",
                idx + 1,
                outs.len(),
                o.file,
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    let ok = outs.iter().filter(|o| o.result.is_some()).count();
    let detected = outs
        .iter()
        .filter_map(|o| o.result.as_ref())
        .filter(|r| r.parkinson_detected)
        .count();
    eprintln!(
        "Done: ok={}/{} detected={} wall={:.0}ms",
        ok,
        outs.len(),
        detected,
        t0.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}
