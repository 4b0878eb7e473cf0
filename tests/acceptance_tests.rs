//! End-to-end behaviour through the process-wide configuration.
//!
//! Every test here touches `Configuration::global()`, so they run serially
//! and start by restoring the default hooks and an empty slot.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serial_test::serial;
use timeasure::{measure, measure_timings, try_measure, CallSite, Configuration, Manager, Tracker};

fn reset_global() {
    let config = Configuration::global();
    config.reset_post_measuring_hook();
    config.set_error_recovery_hook(|_, _| {});
    config.store_slot().install(None);
}

fn report_ms(class: &str, method: &str, ms: u64) {
    let t0 = Instant::now();
    measure_timings(CallSite::new(class, method), t0, t0 + Duration::from_millis(ms));
}

#[test]
#[serial]
fn test_two_paths_aggregate_independently() {
    reset_global();
    let manager = Manager::global();
    manager.prepare();

    for ms in [10, 20, 5] {
        report_ms("Foo", "bar", ms);
    }
    let rows = manager.export();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_path(), "Foo#bar");
    assert_eq!(rows[0].call_count(), 3);
    assert!((rows[0].runtime_sum() - 35.0).abs() < 1e-9);

    report_ms("Baz", "qux", 7);
    let rows = manager.export();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].call_count(), 3);
    assert!((rows[0].runtime_sum() - 35.0).abs() < 1e-9);
    assert_eq!(rows[1].full_path(), "Baz#qux");
    assert_eq!(rows[1].call_count(), 1);
    assert!((rows[1].runtime_sum() - 7.0).abs() < 1e-9);
}

#[test]
#[serial]
fn test_second_prepare_resets_aggregation() {
    reset_global();
    let manager = Manager::global();
    manager.prepare();
    report_ms("Foo", "bar", 3);
    assert_eq!(manager.export().len(), 1);

    manager.prepare();

    assert!(manager.export().is_empty());
}

#[test]
#[serial]
fn test_unprepared_calls_leave_no_trace() {
    reset_global();
    let manager = Manager::global();

    report_ms("Foo", "bar", 3);
    assert_eq!(measure(CallSite::new("Foo", "bar"), || 9), 9);
    assert!(manager.export().is_empty());

    manager.prepare();
    assert!(manager.export().is_empty());
}

#[test]
#[serial]
fn test_failing_hook_recovers_once_per_call() {
    reset_global();
    let config = Configuration::global();
    let recoveries = Arc::new(AtomicUsize::new(0));
    let counter = recoveries.clone();
    config.set_post_measuring_hook(|_| Err("exporter offline".into()));
    config.set_error_recovery_hook(move |_, class| {
        assert_eq!(class, "Foo");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let values: Vec<u32> = (0..3).map(|i| measure(CallSite::new("Foo", "bar"), || i * 2)).collect();

    assert_eq!(values, vec![0, 2, 4]);
    assert_eq!(recoveries.load(Ordering::SeqCst), 3);
    reset_global();
}

#[test]
#[serial]
fn test_failed_work_is_not_measured() {
    reset_global();
    let manager = Manager::global();
    manager.prepare();

    let r: Result<(), String> = try_measure(CallSite::new("Foo", "bar"), || Err("boom".to_owned()));

    assert_eq!(r.unwrap_err(), "boom");
    assert!(manager.export().is_empty());
}

#[test]
#[serial]
fn test_later_identity_does_not_overwrite_first() {
    reset_global();
    let manager = Manager::global();
    manager.prepare();

    let t0 = Instant::now();
    measure_timings(
        CallSite::new("Foo", "bar").with_metadata(serde_json::json!("first")),
        t0,
        t0,
    );
    measure_timings(
        CallSite::new("Foo", "bar").with_metadata(serde_json::json!("second")),
        t0,
        t0,
    );

    let rows = manager.export();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].call_count(), 2);
    assert_eq!(rows[0].metadata(), Some(&serde_json::json!("first")));
}

#[tokio::test]
#[serial]
async fn test_tracker_on_global_config() {
    reset_global();
    let manager = Manager::global();
    manager.prepare();
    let tracker = Tracker::new("Mailer").with_segment("digest");

    let sent = tracker
        .track_async("deliver", async {
            tokio::time::sleep(Duration::from_millis(2)).await;
            true
        })
        .await;

    assert!(sent);
    let rows = manager.export();
    assert_eq!(rows[0].full_path(), "Mailer#deliver:digest");
    assert_eq!(rows[0].segment(), Some("digest"));
}
