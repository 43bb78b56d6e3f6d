use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use sketch_cli::{Difficulty, ReferenceSource, ScoreRequest, ScoreResponse, ScoringConfig, SketchScorer};

#[derive(Parser)]
#[command(name = "sketch-score")]
#[command(version, about = "Score a hand-drawn sketch against a reference image", long_about = None)]
struct Cli {
    /// Reference image
    #[arg(short, long, value_name = "FILE")]
    reference: PathBuf,

    /// Submitted sketch
    #[arg(short, long, value_name = "FILE")]
    submission: PathBuf,

    /// easy, medium or hard
    #[arg(short, long, default_value = "medium")]
    difficulty: Difficulty,

    /// Scoring configuration (TOML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the diagnostic PNGs into this directory
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Print the full response as JSON
    #[arg(long)]
    json: bool,

    /// Worker threads (defaults to the config value)
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn setup_logging(level: &str) -> Result<LoggerHandle> {
    Logger::try_with_str(level)
        .with_context(|| format!("invalid log level '{level}'"))?
        .log_to_stderr()
        .start()
        .context("logger initialization failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = setup_logging(&cli.log_level)?;

    let mut cfg = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .map_err(|e| anyhow!("failed to load config {}: {e}", path.display()))?,
        None => ScoringConfig::default(),
    };
    if let Some(threads) = cli.threads {
        cfg.n_threads = threads;
    }
    sketch_core::init_thread_pool(cfg.n_threads)?;

    let scorer = SketchScorer::new(cfg)?;
    let submission = std::fs::read(&cli.submission)
        .with_context(|| format!("failed to read submission {}", cli.submission.display()))?;
    let request = ScoreRequest {
        submission,
        reference: ReferenceSource::Path(cli.reference.clone()),
        difficulty: cli.difficulty,
    };

    let (report, used_fallback) = scorer.score_request(&request)?;
    if let Some(dir) = &cli.out_dir {
        match report.artifacts.save_to(dir) {
            Ok(()) => log::info!("saved diagnostics to {}", dir.display()),
            Err(e) => log::error!("failed to save diagnostics to {}: {e}", dir.display()),
        }
    }

    if cli.json {
        let response = ScoreResponse::from_report(report, used_fallback)?;
        println!("{}", response.to_json()?);
        return Ok(());
    }

    let b = &report.breakdown;
    let d = &report.details;
    if used_fallback {
        println!("Reference not found; compared the submission with itself");
    }
    println!("Difficulty:       {}", d.difficulty);
    println!("Contour:          {:6.2}%  (precision {:.3}, recall {:.3})", b.contour_score, d.precision, d.recall);
    println!(
        "Keypoints:        {:6.2}%  ({}/{} matched)",
        b.keypoint_score, d.matched_keypoints, d.reference_keypoints
    );
    println!("Local similarity: {:6.2}%", b.local_similarity_score);
    println!(
        "Penalties:        ink x{:.2}, spatial x{:.2} ({}/{} extra patches)",
        d.ink_penalty, d.spatial_penalty, d.extra_patches, d.total_patches
    );
    println!("Score:            {:6.2}%", b.composite_score);
    Ok(())
}
