//! Lightweight in-process metrics.
//!
//! Counters are atomics keyed by label set; `ResourceMetrics::render` produces
//! Prometheus text for whatever exporter the embedding application runs.

pub mod metrics;

pub use metrics::ResourceMetrics;
