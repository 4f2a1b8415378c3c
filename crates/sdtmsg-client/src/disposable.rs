//! Disposable resource handle over one native message.
//!
//! State machine: live -> disposed, exactly once, terminal.
//!
//! - `dispose()` takes the write guard, takes the native object out of the
//!   slot, publishes the disposed flag, then releases the object. A
//!   concurrent `dispose()` waits on the guard and finds nothing left to
//!   release.
//! - Reads run under the read guard (`with_live`), so no read can overlap the
//!   release of the object it is reading.
//! - Dropping a live handle releases the native object as well. This is a
//!   fallback that only bounds how long native memory stays pinned; holders
//!   are expected to call `dispose()` themselves.
//!
//! Lock poisoning never panics: the slot is recovered with `into_inner`. The
//! slot is emptied and the handle marked disposed before `release` runs, so a
//! panicking release still leaves the handle disposed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use sdtmsg_core::error::Result;

use crate::native::NativeMessage;
use crate::obs::metrics::{ResourceMetrics, RELEASE_DROP, RELEASE_EXPLICIT};

pub struct Disposable {
    native: RwLock<Option<Box<dyn NativeMessage>>>,
    disposed: AtomicBool,
    metrics: Arc<ResourceMetrics>,
}

impl Disposable {
    pub fn new(native: Box<dyn NativeMessage>, metrics: Arc<ResourceMetrics>) -> Self {
        metrics.messages_live.inc();
        Self {
            native: RwLock::new(Some(native)),
            disposed: AtomicBool::new(false),
            metrics,
        }
    }

    /// Pure query; no side effects.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Release the native object. Idempotent.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }

        let mut slot = self.native.write().unwrap_or_else(PoisonError::into_inner);
        let Some(native) = slot.take() else {
            return;
        };
        // published before release: a panicking release still ends disposed
        self.disposed.store(true, Ordering::SeqCst);
        self.metrics.releases.inc(&[("path", RELEASE_EXPLICIT)]);
        self.metrics.messages_live.dec();

        native.release();
        drop(slot);
        tracing::debug!("message disposed");
    }

    /// Run `f` against the native object if it is still live.
    ///
    /// Returns `Ok(None)` once disposed. Errors from `f` are native faults:
    /// they are logged, counted, and passed through.
    pub fn with_live<R>(
        &self,
        f: impl FnOnce(&dyn NativeMessage) -> Result<R>,
    ) -> Result<Option<R>> {
        if self.is_disposed() {
            return Ok(None);
        }

        let slot = self.native.read().unwrap_or_else(PoisonError::into_inner);
        let Some(native) = slot.as_deref() else {
            return Ok(None);
        };

        match f(native) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                let code = e.code().as_str();
                tracing::warn!(code, error = %e, "native message fault");
                self.metrics.native_faults.inc(&[("code", code)]);
                Err(e)
            }
        }
    }
}

impl Drop for Disposable {
    fn drop(&mut self) {
        let slot = self.native.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(native) = slot.take() {
            *self.disposed.get_mut() = true;
            self.metrics.releases.inc(&[("path", RELEASE_DROP)]);
            self.metrics.messages_live.dec();

            native.release();
            tracing::debug!("message released on drop without dispose");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;

    use bytes::Bytes;
    use sdtmsg_core::MessageError;

    use super::*;
    use crate::native::{IntField, PayloadKind, StringField};

    /// Counts releases; reads report a fixed correlation id.
    struct CountingNative {
        releases: Arc<AtomicUsize>,
        fail: bool,
        panic_on_release: bool,
    }

    impl NativeMessage for CountingNative {
        fn payload_kind(&self) -> Result<PayloadKind> {
            Ok(PayloadKind::None)
        }
        fn payload_data(&self) -> Result<Bytes> {
            Ok(Bytes::new())
        }
        fn property_keys(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }
        fn property(&self, _key: &str) -> Result<Option<Bytes>> {
            Ok(None)
        }
        fn string_field(&self, _field: StringField) -> Result<Option<String>> {
            if self.fail {
                return Err(MessageError::Corrupt("bad field table".into()));
            }
            Ok(Some("cid".into()))
        }
        fn int_field(&self, _field: IntField) -> Result<Option<i64>> {
            Ok(None)
        }
        fn release(self: Box<Self>) {
            self.releases.fetch_add(1, Ordering::SeqCst);
            if self.panic_on_release {
                panic!("native release failed");
            }
        }
    }

    type Fixture = (Disposable, Arc<AtomicUsize>, Arc<ResourceMetrics>);

    fn handle(fail: bool) -> Fixture {
        build(fail, false)
    }

    fn build(fail: bool, panic_on_release: bool) -> Fixture {
        let releases = Arc::new(AtomicUsize::new(0));
        let metrics = Arc::new(ResourceMetrics::new());
        let native = CountingNative {
            releases: Arc::clone(&releases),
            fail,
            panic_on_release,
        };
        (
            Disposable::new(Box::new(native), Arc::clone(&metrics)),
            releases,
            metrics,
        )
    }

    fn read_cid(h: &Disposable) -> Option<String> {
        h.with_live(|n| n.string_field(StringField::CorrelationId))
            .unwrap()
            .flatten()
    }

    #[test]
    fn dispose_is_idempotent() {
        let (h, releases, metrics) = handle(false);
        assert!(!h.is_disposed());
        assert_eq!(read_cid(&h).as_deref(), Some("cid"));

        for _ in 0..5 {
            h.dispose();
            assert!(h.is_disposed());
            assert_eq!(read_cid(&h), None);
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.explicit_releases(), 1);
        assert_eq!(metrics.messages_live.get(), 0);

        drop(h);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.drop_releases(), 0);
    }

    #[test]
    fn drop_releases_live_handle() {
        let (h, releases, metrics) = handle(false);
        drop(h);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.drop_releases(), 1);
        assert_eq!(metrics.explicit_releases(), 0);
        assert_eq!(metrics.messages_live.get(), 0);
    }

    #[test]
    fn faults_pass_through_and_are_counted() {
        let (h, _releases, metrics) = handle(true);
        let err = h
            .with_live(|n| n.string_field(StringField::CorrelationId))
            .unwrap_err();
        assert_eq!(err.code().as_str(), "CORRUPT");
        assert_eq!(metrics.native_faults.get(&[("code", "CORRUPT")]), 1);

        // after dispose the faulty object is never consulted again
        h.dispose();
        assert!(h
            .with_live(|n| n.string_field(StringField::CorrelationId))
            .unwrap()
            .is_none());
    }

    #[test]
    fn concurrent_dispose_releases_once() {
        let (h, releases, _metrics) = handle(false);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let _ = read_cid(&h);
                    h.dispose();
                    assert!(h.is_disposed());
                });
            }
        });
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_release_still_disposes() {
        let (h, releases, metrics) = build(false, true);

        let res = panic::catch_unwind(AssertUnwindSafe(|| h.dispose()));
        assert!(res.is_err());
        assert!(h.is_disposed());
        assert_eq!(metrics.messages_live.get(), 0);
        assert_eq!(metrics.explicit_releases(), 1);

        // the poisoned guard is recovered; nothing is released twice
        h.dispose();
        assert!(h.is_disposed());
        assert!(h
            .with_live(|n| n.string_field(StringField::CorrelationId))
            .unwrap()
            .is_none());

        drop(h);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.drop_releases(), 0);
        assert_eq!(metrics.messages_live.get(), 0);
    }

    #[test]
    fn panicking_release_on_drop_still_counts() {
        let (h, releases, metrics) = build(false, true);
        let res = panic::catch_unwind(AssertUnwindSafe(move || drop(h)));
        assert!(res.is_err());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.drop_releases(), 1);
        assert_eq!(metrics.messages_live.get(), 0);
    }
}
