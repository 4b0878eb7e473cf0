use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use timeasure::profiling::summary;
use timeasure::{Configuration, Manager};

mod load_generator;

// ─── Configuration ───────────────────────────────────────────────

/// Concurrent load workers (override with TIMEASURE_WORKERS)
const DEFAULT_WORKERS: u32 = 16;

/// Run length in seconds (override with TIMEASURE_SECS)
const DEFAULT_SECS: u64 = 3;

/// Share of simulated calls that are reads
const READ_PCT: u8 = 80;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {key}={raw:?}")),
        Err(_) => Ok(default),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let workers = env_or("TIMEASURE_WORKERS", DEFAULT_WORKERS)?;
    let secs = env_or("TIMEASURE_SECS", DEFAULT_SECS)?;

    // ── 1. Wire hooks ────────────────────────────────────────────
    let config = Configuration::global();
    config.set_error_recovery_hook(|err, class_name| {
        tracing::error!(class = class_name, error = %err, "measurement dropped");
    });

    // ── 2. Start an aggregation session ─────────────────────────
    let manager = Manager::global();
    manager.prepare();

    // ── 3. Generate load ─────────────────────────────────────────
    tracing::info!(workers, secs, "running simulated load");
    let running = Arc::new(AtomicBool::new(true));
    load_generator::run(running, workers, secs, READ_PCT).await;

    // ── 4. Export ────────────────────────────────────────────────
    let records = manager.export();
    println!();
    print!("{}", summary::render(&records));
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&records).context("serializing export")?
    );

    Ok(())
}
