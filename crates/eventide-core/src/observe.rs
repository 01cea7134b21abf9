//! Optional metrics instrumentation.
//!
//! When the `observe` feature is enabled, core operations emit counters
//! and histograms via the [`metrics`] crate. A downstream application must
//! install a recorder (e.g. `metrics-exporter-prometheus`) to collect them.
//!
//! When the feature is **not** enabled every function in this module is a
//! zero-cost no-op.

/// Record a log append and the number of occupied slots probed before it.
///
/// - `eventide.log.appends_total` – counter
/// - `eventide.log.probe_collisions_total` – counter
#[inline]
pub fn record_log_append(collisions: u64) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("eventide.log.appends_total").increment(1);
        if collisions > 0 {
            metrics::counter!("eventide.log.probe_collisions_total").increment(collisions);
        }
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = collisions;
    }
}

/// Record an item event append.
///
/// - `eventide.item.puts_total` – counter with `kind` label
#[inline]
pub fn record_item_put(kind: u8) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("eventide.item.puts_total", "kind" => kind.to_string()).increment(1);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = kind;
    }
}

/// Record a persistent view sync.
///
/// - `eventide.view.syncs_total` – counter
/// - `eventide.view.events_folded` – histogram
#[inline]
pub fn record_view_sync(events_folded: u64) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("eventide.view.syncs_total").increment(1);
        metrics::histogram!("eventide.view.events_folded").record(events_folded as f64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = events_folded;
    }
}

/// Record a schema fold.
///
/// - `eventide.schema.folds_total` – counter
/// - `eventide.schema.fold_duration_seconds` – histogram
/// - `eventide.schema.events_folded` – histogram
#[inline]
pub fn record_schema_fold(duration: std::time::Duration, events_folded: u64) {
    #[cfg(feature = "observe")]
    {
        metrics::counter!("eventide.schema.folds_total").increment(1);
        metrics::histogram!("eventide.schema.fold_duration_seconds")
            .record(duration.as_secs_f64());
        metrics::histogram!("eventide.schema.events_folded").record(events_folded as f64);
    }
    #[cfg(not(feature = "observe"))]
    {
        let _ = (duration, events_folded);
    }
}
