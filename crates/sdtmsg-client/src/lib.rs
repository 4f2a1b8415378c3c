//! sdtmsg client library entry.
//!
//! Wires the native message contract, the disposable handle, and the typed
//! message facade into one client surface:
//! - `MessageContext::wrap` binds a transport-delivered native message;
//! - `MessageContext::builder` constructs an outbound one;
//! - `Message` exposes payload, properties and metadata, inert after
//!   `dispose()`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Absent values are
//! `Option::None`; only native faults come back as `Err`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod context;
pub mod disposable;
pub mod message;
pub mod native;
pub mod obs;

pub use context::MessageContext;
pub use message::{ClassOfService, Expiration, Message, MessageBuilder};
pub use native::{IntField, NativeMessage, PayloadKind, StringField};
