//! Resource metrics for message handles.
//!
//! Counters and gauges with dynamic labels backed by `DashMap`. Labels are
//! flattened into sorted key vectors so rendering order is deterministic per
//! label set.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn label_key(labels: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut key: Vec<(String, String)> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &[(String, String)]) -> String {
    key.iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<Vec<(String, String)>, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Render in Prometheus text exposition format.
    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} counter", name);
        for r in self.map.iter() {
            let val = r.value().load(Ordering::Relaxed);
            let _ = writeln!(out, "{}{{{}}} {}", name, label_str(r.key()), val);
        }
    }
}

#[derive(Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {} gauge\n{} {}", name, name, self.get());
    }
}

/// Label values used by `releases`.
pub const RELEASE_EXPLICIT: &str = "explicit";
pub const RELEASE_DROP: &str = "drop";

#[derive(Default)]
pub struct ResourceMetrics {
    /// Messages bound to a native object, by origin (`inbound`/`outbound`).
    pub messages_created: CounterVec,
    /// Native releases, by path (`explicit`/`drop`).
    pub releases: CounterVec,
    /// Messages whose native object is still held.
    pub messages_live: Gauge,
    /// Native faults surfaced to callers, by error code.
    pub native_faults: CounterVec,
}

impl ResourceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explicit_releases(&self) -> u64 {
        self.releases.get(&[("path", RELEASE_EXPLICIT)])
    }

    pub fn drop_releases(&self) -> u64 {
        self.releases.get(&[("path", RELEASE_DROP)])
    }

    /// Render all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.messages_created.render("sdtmsg_messages_created_total", &mut out);
        self.releases.render("sdtmsg_native_releases_total", &mut out);
        self.messages_live.render("sdtmsg_messages_live", &mut out);
        self.native_faults.render("sdtmsg_native_faults_total", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_by_label() {
        let m = ResourceMetrics::new();
        m.releases.inc(&[("path", RELEASE_EXPLICIT)]);
        m.releases.inc(&[("path", RELEASE_EXPLICIT)]);
        m.releases.inc(&[("path", RELEASE_DROP)]);
        assert_eq!(m.explicit_releases(), 2);
        assert_eq!(m.drop_releases(), 1);
        assert_eq!(m.native_faults.get(&[("code", "CORRUPT")]), 0);
    }

    #[test]
    fn render_prometheus_text() {
        let m = ResourceMetrics::new();
        m.messages_created.inc(&[("origin", "outbound")]);
        m.messages_live.inc();
        m.native_faults.inc(&[("code", "we\"ird")]);

        let out = m.render();
        assert!(out.contains("# TYPE sdtmsg_messages_created_total counter"));
        assert!(out.contains("sdtmsg_messages_created_total{origin=\"outbound\"} 1"));
        assert!(out.contains("sdtmsg_messages_live 1"));
        assert!(out.contains("sdtmsg_native_faults_total{code=\"we\\\"ird\"} 1"));
    }
}
