use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use timeasure::{CallSite, Tracker};

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `concurrency` Tokio tasks that run simulated tracked calls
/// until the deadline or the `running` flag is set to false.
pub async fn run(running: Arc<AtomicBool>, concurrency: u32, duration_secs: u64, read_pct: u8) {
    let deadline = Instant::now() + Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(concurrency as usize);

    for worker_id in 0..concurrency {
        let running = running.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, deadline, read_pct).await;
        }));
    }

    for h in handles {
        if let Err(e) = h.await {
            tracing::warn!(error = %e, "load worker terminated abnormally");
        }
    }

    running.store(false, Ordering::SeqCst);
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(id: u32, running: Arc<AtomicBool>, deadline: Instant, read_pct: u8) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);
    let users = Tracker::new("UserRepository");
    let sessions = Tracker::new("SessionStore");

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        let is_read = rng.gen_range(0u8..100) < read_pct;

        if is_read {
            do_read(&mut rng, &users).await;
        } else {
            do_write(&mut rng, &sessions).await;
        }
    }
    tracing::debug!(worker = id, "load worker finished");
}

// ─── Read operation ──────────────────────────────────────────────

async fn do_read(rng: &mut StdRng, users: &Tracker) {
    // 80 % cache hits, 20 % fall through to the slower backing store
    let (segment, latency_us) = if rng.gen_bool(0.8) {
        ("cache", rng.gen_range(50..400u64))
    } else {
        ("db", rng.gen_range(1_000..8_000u64))
    };
    let id = rng.gen_range(1..=10_000u32);

    let found = users
        .clone()
        .with_segment(segment)
        .track_async("find", simulated_io(latency_us, id % 97 != 0))
        .await;
    if !found {
        tracing::trace!(user = id, "user not found");
    }
}

// ─── Write operation ─────────────────────────────────────────────

async fn do_write(rng: &mut StdRng, sessions: &Tracker) {
    let latency_us = rng.gen_range(500..3_000u64);
    let ttl_secs = if rng.gen_bool(0.5) { 300 } else { 3_600 };

    // Pre-computed timings, as an interceptor that owns its own clock would send
    let t0 = Instant::now();
    simulated_io(latency_us, true).await;
    let t1 = Instant::now();

    timeasure::measure_timings(
        CallSite::new(sessions.class_name(), "create")
            .with_metadata(serde_json::json!({ "ttl_secs": ttl_secs })),
        t0,
        t1,
    );
}

async fn simulated_io(latency_us: u64, outcome: bool) -> bool {
    tokio::time::sleep(Duration::from_micros(latency_us)).await;
    outcome
}
