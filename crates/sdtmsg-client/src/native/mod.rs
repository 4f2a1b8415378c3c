//! Native message source contract.
//!
//! A `NativeMessage` is the transport-owned object behind a `Message`. The
//! message layer never touches it directly: every read goes through the
//! `Disposable` handle, which also guarantees `release` runs at most once
//! (it consumes the box).
//!
//! Any `Err` returned here is a native fault and is surfaced to the caller.
//! Unset values are `Ok(None)`.

pub mod memory;

use bytes::Bytes;

use sdtmsg_core::error::Result;

pub use memory::{MemoryNative, MemoryStore, StoredMessage};

/// How the payload of a native message is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PayloadKind {
    /// No payload attached.
    #[default]
    None,
    /// Opaque binary attachment.
    Bytes,
    /// UTF-8 text.
    Text,
    /// Encoded SDT map.
    Map,
    /// Encoded SDT stream.
    Stream,
}

impl PayloadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadKind::None => "none",
            PayloadKind::Bytes => "bytes",
            PayloadKind::Text => "text",
            PayloadKind::Map => "map",
            PayloadKind::Stream => "stream",
        }
    }
}

/// Optional string metadata carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StringField {
    CorrelationId,
    HttpContentType,
    HttpContentEncoding,
    ApplicationMessageId,
    ApplicationMessageType,
}

impl StringField {
    pub const ALL: [StringField; 5] = [
        StringField::CorrelationId,
        StringField::HttpContentType,
        StringField::HttpContentEncoding,
        StringField::ApplicationMessageId,
        StringField::ApplicationMessageType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StringField::CorrelationId => "correlation_id",
            StringField::HttpContentType => "http_content_type",
            StringField::HttpContentEncoding => "http_content_encoding",
            StringField::ApplicationMessageId => "application_message_id",
            StringField::ApplicationMessageType => "application_message_type",
        }
    }
}

/// Optional integer metadata carried by a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntField {
    /// Milliseconds since the Unix epoch; 0 means never.
    Expiration,
    SequenceNumber,
    Priority,
    ClassOfService,
}

/// Read/release surface of one native message object.
pub trait NativeMessage: Send + Sync {
    /// Encoded kind of the payload. Consulted before `payload_data`.
    fn payload_kind(&self) -> Result<PayloadKind>;

    /// Raw payload bytes in the representation named by `payload_kind`.
    fn payload_data(&self) -> Result<Bytes>;

    /// Keys of all user properties.
    fn property_keys(&self) -> Result<Vec<String>>;

    /// Encoded SDT value of one user property.
    fn property(&self, key: &str) -> Result<Option<Bytes>>;

    fn string_field(&self, field: StringField) -> Result<Option<String>>;

    fn int_field(&self, field: IntField) -> Result<Option<i64>>;

    /// Give the native object back to its owner.
    fn release(self: Box<Self>);
}
