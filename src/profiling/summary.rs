use std::fmt::Write;

use super::reported_method::AggregatedRecord;

/// Fixed-width table of records, heaviest `runtime_sum` first.
pub fn render(records: &[AggregatedRecord]) -> String {
    if records.is_empty() {
        return "No reported methods.\n".to_owned();
    }

    let mut sorted: Vec<&AggregatedRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.runtime_sum().total_cmp(&a.runtime_sum()));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<50} {:>10} {:>14} {:>12}",
        "Path", "Calls", "Total (ms)", "Avg (ms)"
    );
    let _ = writeln!(out, "{}", "─".repeat(89));
    for r in sorted {
        let _ = writeln!(
            out,
            "{:<50} {:>10} {:>14.3} {:>12.3}",
            r.full_path(),
            r.call_count(),
            r.runtime_sum(),
            r.mean_runtime()
        );
    }
    let _ = writeln!(out, "{}", "─".repeat(89));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{CallSite, Measurement};
    use crate::profiling::AggregationStore;
    use std::time::{Duration, Instant};

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "No reported methods.\n");
    }

    #[test]
    fn test_render_sorts_by_total_time() {
        let store = AggregationStore::new();
        let t0 = Instant::now();
        store.report(&Measurement::new(CallSite::new("Fast", "op"), t0, t0 + Duration::from_millis(1)));
        store.report(&Measurement::new(CallSite::new("Slow", "op"), t0, t0 + Duration::from_millis(50)));

        let table = render(&store.export());
        let slow = table.find("Slow#op").unwrap();
        let fast = table.find("Fast#op").unwrap();
        assert!(slow < fast);
        assert!(table.starts_with("Path"));
    }
}
