#![allow(dead_code)]

use std::sync::Once;

use sdtmsg_client::native::StoredMessage;
use sdtmsg_client::{Message, MessageContext};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (`RUST_LOG` aware).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Hand a hand-built record to the context as if a transport delivered it.
/// Returns the store id so tests can invalidate it.
pub fn deliver(ctx: &MessageContext, record: StoredMessage) -> (Message, u64) {
    let native = ctx.store().insert(record);
    let id = native.id();
    (ctx.wrap(Box::new(native)), id)
}
