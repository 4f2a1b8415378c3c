//! sdtmsg core: structured data types (SDT) and the shared error surface.
//!
//! This crate defines the value model carried in message payloads and user
//! properties (`Data`, `SdtMap`, `SdtStream`), the decoder/encoder contracts
//! the message layer consumes, and the error type shared by every sdtmsg
//! crate. It carries no native or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Type mismatches surface as `Option::None` on container accessors and as
//! `MessageError::TypeMismatch` on explicit conversions.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod sdt;

/// Shared result type.
pub use error::{ErrorCode, MessageError, Result};
pub use sdt::{Data, DataKind, SdtMap, SdtStream};
