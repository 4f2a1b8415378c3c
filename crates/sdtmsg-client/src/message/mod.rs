//! Message facade: a typed, disposal-aware read view over one native message.
//!
//! Every accessor follows the same contract:
//! - disposed -> the empty value (`None`, empty map, `Expiration::Never`,
//!   `ClassOfService::Cos1`), no error;
//! - live but unset / not representable in the requested form -> the same
//!   empty value;
//! - native fault -> `Err`.
//!
//! Disposal and absence can only be told apart with `is_disposed()`.
//! Returned maps, streams, strings and bytes are snapshots: mutating them or
//! disposing the message afterwards does not affect them.

pub mod builder;
pub mod fields;
mod render;

use std::sync::Arc;

use bytes::Bytes;

use sdtmsg_core::error::{MessageError, Result};
use sdtmsg_core::sdt::{Data, SdtDecoder, SdtMap, SdtStream};

use crate::config::DisplayLimits;
use crate::disposable::Disposable;
use crate::native::{IntField, PayloadKind, StringField};

pub use builder::MessageBuilder;
pub use fields::{ClassOfService, Expiration};

pub struct Message {
    handle: Disposable,
    decoder: Arc<dyn SdtDecoder>,
    limits: DisplayLimits,
}

impl Message {
    pub(crate) fn new(
        handle: Disposable,
        decoder: Arc<dyn SdtDecoder>,
        limits: DisplayLimits,
    ) -> Self {
        Self {
            handle,
            decoder,
            limits,
        }
    }

    /// Release the native message now. Safe to call any number of times,
    /// from any thread.
    pub fn dispose(&self) {
        self.handle.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_disposed()
    }

    // ---- properties ----------------------------------------------------

    /// All user properties; empty if none were set.
    pub fn properties(&self) -> Result<SdtMap> {
        self.handle
            .with_live(|n| {
                let mut map = SdtMap::new();
                for key in n.property_keys()? {
                    if let Some(raw) = n.property(&key)? {
                        let value = self.decoder.decode_data(&raw)?;
                        map.insert(key, value);
                    }
                }
                Ok(map)
            })
            .map(Option::unwrap_or_default)
    }

    /// One user property. A property may be present and hold `Data::Null`.
    pub fn property(&self, key: &str) -> Result<Option<Data>> {
        self.handle
            .with_live(|n| {
                n.property(key)?
                    .map(|raw| self.decoder.decode_data(&raw))
                    .transpose()
            })
            .map(Option::flatten)
    }

    pub fn has_property(&self, key: &str) -> Result<bool> {
        self.handle
            .with_live(|n| Ok(n.property(key)?.is_some()))
            .map(|present| present.unwrap_or(false))
    }

    // ---- payload -------------------------------------------------------

    /// How the payload is encoded; `PayloadKind::None` once disposed.
    pub fn payload_kind(&self) -> Result<PayloadKind> {
        self.handle
            .with_live(|n| n.payload_kind())
            .map(Option::unwrap_or_default)
    }

    /// Payload as raw bytes. Succeeds for binary and text payloads (a text
    /// payload yields its UTF-8 bytes); map and stream payloads are not
    /// exposed as bytes.
    pub fn payload_as_bytes(&self) -> Result<Option<Bytes>> {
        self.read_payload(|kind, data| match kind {
            PayloadKind::Bytes | PayloadKind::Text => Ok(Some(data)),
            _ => Ok(None),
        })
    }

    pub fn payload_as_string(&self) -> Result<Option<String>> {
        self.read_payload(|kind, data| match kind {
            PayloadKind::Text => std::str::from_utf8(&data)
                .map(|s| Some(s.to_owned()))
                .map_err(|e| MessageError::Corrupt(format!("text payload is not utf-8: {e}"))),
            _ => Ok(None),
        })
    }

    pub fn payload_as_map(&self) -> Result<Option<SdtMap>> {
        self.read_payload(|kind, data| match kind {
            PayloadKind::Map => self.decoder.decode_map(&data).map(Some),
            _ => Ok(None),
        })
    }

    pub fn payload_as_stream(&self) -> Result<Option<SdtStream>> {
        self.read_payload(|kind, data| match kind {
            PayloadKind::Stream => self.decoder.decode_stream(&data).map(Some),
            _ => Ok(None),
        })
    }

    /// Consult the payload kind once, then hand the raw bytes to exactly one
    /// decode branch. Bytes are only fetched when the kind can be served.
    fn read_payload<T>(
        &self,
        decode: impl FnOnce(PayloadKind, Bytes) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        self.handle
            .with_live(|n| match n.payload_kind()? {
                PayloadKind::None => Ok(None),
                kind => decode(kind, n.payload_data()?),
            })
            .map(Option::flatten)
    }

    // ---- metadata ------------------------------------------------------

    pub fn correlation_id(&self) -> Result<Option<String>> {
        self.string_field(StringField::CorrelationId)
    }

    /// `Expiration::Never` when unset or disposed.
    pub fn expiration(&self) -> Result<Expiration> {
        self.handle
            .with_live(|n| match n.int_field(IntField::Expiration)? {
                Some(ms) => Expiration::from_millis(ms),
                None => Ok(Expiration::Never),
            })
            .map(Option::unwrap_or_default)
    }

    /// Set by the publishing application or assigned by the client library.
    pub fn sequence_number(&self) -> Result<Option<u64>> {
        self.int_field(IntField::SequenceNumber, |v| {
            u64::try_from(v)
                .map_err(|_| MessageError::Corrupt(format!("negative sequence number: {v}")))
        })
    }

    /// 0 (lowest) to 255 (highest).
    pub fn priority(&self) -> Result<Option<u8>> {
        self.int_field(IntField::Priority, |v| {
            u8::try_from(v)
                .map_err(|_| MessageError::Corrupt(format!("priority out of range: {v}")))
        })
    }

    pub fn http_content_type(&self) -> Result<Option<String>> {
        self.string_field(StringField::HttpContentType)
    }

    pub fn http_content_encoding(&self) -> Result<Option<String>> {
        self.string_field(StringField::HttpContentEncoding)
    }

    /// Opaque to the client; passed through unmodified.
    pub fn application_message_id(&self) -> Result<Option<String>> {
        self.string_field(StringField::ApplicationMessageId)
    }

    /// Opaque to the client; passed through unmodified.
    pub fn application_message_type(&self) -> Result<Option<String>> {
        self.string_field(StringField::ApplicationMessageType)
    }

    /// Always present; `Cos1` when unset or disposed.
    pub fn class_of_service(&self) -> Result<ClassOfService> {
        self.int_field(IntField::ClassOfService, ClassOfService::try_from)
            .map(Option::unwrap_or_default)
    }

    // empty strings count as unset
    fn string_field(&self, field: StringField) -> Result<Option<String>> {
        self.handle
            .with_live(|n| Ok(n.string_field(field)?.filter(|s| !s.is_empty())))
            .map(Option::flatten)
    }

    fn int_field<T>(
        &self,
        field: IntField,
        convert: impl FnOnce(i64) -> Result<T>,
    ) -> Result<Option<T>> {
        self.handle
            .with_live(|n| n.int_field(field)?.map(convert).transpose())
            .map(Option::flatten)
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
