//! photosift - incremental image indexer feeding a remote photo catalog.
//!
//! Usage:
//!   photosift run --server URL     Index continuously against a catalog
//!   photosift run --server URL --once
//!                                  Run a single indexing cycle and exit
//!   photosift scan [PATH]          Offline dry-run listing indexable images
//!   photosift --help               Show help

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use photosift_catalog::HttpCatalogClient;
use photosift_core::EngineConfigBuilder;
use photosift_engine::{DirectoryResult, EngineError, Indexer};
use photosift_scan::ImageScanner;

#[derive(Parser)]
#[command(
    name = "photosift",
    version,
    about = "Incremental image indexer for a remote photo catalog",
    long_about = "photosift walks configured directories, hashes new and changed \
                  images, extracts their metadata, and submits the results to a \
                  catalog service.\n\nRun `photosift scan PATH` for an offline \
                  preview of what would be indexed."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index against a catalog service
    Run {
        /// Base URL of the catalog service
        #[arg(short, long)]
        server: String,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Delay between cycles (e.g., "300s", "5m", "1h")
        #[arg(short, long, default_value = "300s")]
        interval: String,

        /// Number of directories indexed concurrently
        #[arg(long, default_value = "4")]
        dir_jobs: usize,

        /// Number of files hashed concurrently per directory
        #[arg(long, default_value = "4")]
        hash_jobs: usize,

        /// Generate JPEG thumbnails for ingested images
        #[arg(short, long)]
        thumbnails: bool,
    },

    /// List the images a directory would contribute, without a catalog
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            server,
            once,
            interval,
            dir_jobs,
            hash_jobs,
            thumbnails,
        } => {
            let interval = parse_duration(&interval)?;
            run_index(&server, once, interval, dir_jobs, hash_jobs, thumbnails).await?;
        }
        Command::Scan { path, recursive } => {
            run_scan(&path, recursive).await?;
        }
    }

    Ok(())
}

/// Run indexing cycles until cancelled (or after one cycle with `--once`).
async fn run_index(
    server: &str,
    once: bool,
    interval: std::time::Duration,
    dir_jobs: usize,
    hash_jobs: usize,
    thumbnails: bool,
) -> Result<()> {
    let catalog = HttpCatalogClient::new(server).context("Invalid catalog URL")?;
    let config = EngineConfigBuilder::default()
        .directory_parallelism(dir_jobs)
        .hash_parallelism(hash_jobs)
        .generate_thumbnails(thumbnails)
        .build()?;

    let indexer = Indexer::new(Arc::new(catalog), config);
    let cancel = shutdown_token();

    info!(server, interval = ?interval, once, "indexer starting");

    loop {
        let started = Instant::now();
        match indexer.run_cycle(&cancel).await {
            Ok(results) => log_cycle_summary(&results, started),
            Err(EngineError::Cancelled) => {
                info!("indexing cycle cancelled, shutting down");
                break;
            }
            Err(err) => {
                warn!("indexing cycle failed: {err}");
            }
        }

        if once {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    Ok(())
}

/// Scan a directory offline and print what a cycle would pick up.
async fn run_scan(path: &PathBuf, recursive: bool) -> Result<()> {
    let path = path.canonicalize().context("Invalid path")?;
    if !path.is_dir() {
        return Err(eyre!("{} is not a directory", path.display()));
    }

    eprintln!("Scanning {}...", path.display());

    let cancel = shutdown_token();
    let scanner = ImageScanner::new();
    let mut stream = scanner.scan(&path, recursive, cancel.clone());

    let started = Instant::now();
    let mut files: u64 = 0;
    let mut total_bytes: u64 = 0;
    let mut warnings: u64 = 0;

    while let Some(item) = stream.next().await {
        match item {
            Ok(file) => {
                files += 1;
                total_bytes += file.size;
                println!("{:>10}  {}", format_size(file.size), file.path.display());
            }
            Err(photosift_core::ScanError::Cancelled) => {
                eprintln!("Scan cancelled.");
                break;
            }
            Err(err) => {
                warnings += 1;
                eprintln!("warning: {err}");
            }
        }
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {}", path.display(), format_size(total_bytes));
    println!(" {} indexable images", files);
    println!(" Scanned in {:.2}s", started.elapsed().as_secs_f64());
    println!("{}", "─".repeat(60));

    if warnings > 0 {
        println!();
        println!("{} warning(s) during scan", warnings);
    }

    Ok(())
}

/// Log the end-of-cycle aggregate over every directory result.
fn log_cycle_summary(results: &[DirectoryResult], started: Instant) {
    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    let files_scanned: u64 = results.iter().map(|r| r.files_scanned).sum();
    let files_processed: u64 = results.iter().map(|r| r.files_processed).sum();

    for result in results.iter().filter(|r| !r.success) {
        warn!(
            path = %result.path.display(),
            "directory failed: {}",
            result.error.as_deref().unwrap_or("unknown")
        );
    }

    info!(
        directories = results.len(),
        succeeded,
        failed,
        files_scanned,
        files_processed,
        elapsed = ?started.elapsed(),
        "indexing cycle complete"
    );
}

/// Token cancelled by the first Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            trigger.cancel();
        }
    });
    cancel
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a duration string (e.g., "300s", "5m", "1h").
fn parse_duration(s: &str) -> Result<std::time::Duration> {
    let s = s.trim().to_lowercase();

    let (num, multiplier) = if s.ends_with('h') {
        let num: f64 = s.trim_end_matches('h').parse()?;
        (num, 60.0 * 60.0)
    } else if s.ends_with('m') {
        let num: f64 = s.trim_end_matches('m').parse()?;
        (num, 60.0)
    } else if s.ends_with('s') {
        let num: f64 = s.trim_end_matches('s').parse()?;
        (num, 1.0)
    } else {
        let num: f64 = s.parse()?;
        (num, 1.0) // Default to seconds
    };

    if num <= 0.0 {
        return Err(eyre!("interval must be positive"));
    }

    Ok(std::time::Duration::from_secs_f64(num * multiplier))
}
