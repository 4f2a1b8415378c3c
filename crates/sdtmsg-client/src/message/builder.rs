//! Outbound message construction.
//!
//! The builder collects typed values, encodes them with the context's
//! reference codec, stores the resulting native record and returns a live
//! `Message` bound to it. Payload setters replace each other, so a built
//! message carries exactly one payload representation.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use sdtmsg_core::error::{MessageError, Result};
use sdtmsg_core::sdt::{Data, SdtEncoder, SdtMap, SdtStream};

use super::{ClassOfService, Expiration, Message};
use crate::context::MessageContext;
use crate::native::{IntField, PayloadKind, StringField, StoredMessage};

#[derive(Debug, Clone, Default)]
enum OutboundPayload {
    #[default]
    None,
    Bytes(Bytes),
    Text(String),
    Map(SdtMap),
    Stream(SdtStream),
}

#[must_use]
pub struct MessageBuilder {
    ctx: MessageContext,
    properties: SdtMap,
    payload: OutboundPayload,
    strings: BTreeMap<StringField, String>,
    expiration: Expiration,
    sequence_number: Option<u64>,
    priority: Option<u8>,
    class_of_service: Option<ClassOfService>,
}

impl MessageBuilder {
    pub(crate) fn new(ctx: MessageContext) -> Self {
        Self {
            ctx,
            properties: SdtMap::new(),
            payload: OutboundPayload::None,
            strings: BTreeMap::new(),
            expiration: Expiration::Never,
            sequence_number: None,
            priority: None,
            class_of_service: None,
        }
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Data>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Merge `props` into the property set; later keys win.
    pub fn properties(mut self, props: SdtMap) -> Self {
        self.properties.extend(props);
        self
    }

    pub fn payload_bytes(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = OutboundPayload::Bytes(payload.into());
        self
    }

    pub fn payload_string(mut self, payload: impl Into<String>) -> Self {
        self.payload = OutboundPayload::Text(payload.into());
        self
    }

    pub fn payload_map(mut self, payload: SdtMap) -> Self {
        self.payload = OutboundPayload::Map(payload);
        self
    }

    pub fn payload_stream(mut self, payload: SdtStream) -> Self {
        self.payload = OutboundPayload::Stream(payload);
        self
    }

    pub fn correlation_id(self, id: impl Into<String>) -> Self {
        self.string(StringField::CorrelationId, id)
    }

    pub fn http_content_type(self, v: impl Into<String>) -> Self {
        self.string(StringField::HttpContentType, v)
    }

    pub fn http_content_encoding(self, v: impl Into<String>) -> Self {
        self.string(StringField::HttpContentEncoding, v)
    }

    pub fn application_message_id(self, v: impl Into<String>) -> Self {
        self.string(StringField::ApplicationMessageId, v)
    }

    pub fn application_message_type(self, v: impl Into<String>) -> Self {
        self.string(StringField::ApplicationMessageType, v)
    }

    /// The Unix epoch itself means "never expires".
    pub fn expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Expiration::from(at);
        self
    }

    pub fn sequence_number(mut self, n: u64) -> Self {
        self.sequence_number = Some(n);
        self
    }

    pub fn priority(mut self, p: u8) -> Self {
        self.priority = Some(p);
        self
    }

    pub fn class_of_service(mut self, cos: ClassOfService) -> Self {
        self.class_of_service = Some(cos);
        self
    }

    fn string(mut self, field: StringField, v: impl Into<String>) -> Self {
        self.strings.insert(field, v.into());
        self
    }

    /// Encode, store and bind. The returned message owns the new record.
    pub fn build(self) -> Result<Message> {
        if let Some((field, _)) = self.strings.iter().find(|(_, v)| v.is_empty()) {
            return Err(MessageError::BadRequest(format!("{} must not be empty", field.as_str())));
        }

        let codec = self.ctx.codec();
        let mut record = StoredMessage {
            strings: self.strings,
            ..StoredMessage::default()
        };

        for (key, value) in &self.properties {
            record
                .properties
                .insert(key.clone(), Bytes::from(codec.encode_data(value)?));
        }

        (record.payload_kind, record.payload) = match &self.payload {
            OutboundPayload::None => (PayloadKind::None, Bytes::new()),
            OutboundPayload::Bytes(b) => (PayloadKind::Bytes, b.clone()),
            OutboundPayload::Text(s) => (PayloadKind::Text, Bytes::from(s.clone())),
            OutboundPayload::Map(m) => (PayloadKind::Map, Bytes::from(codec.encode_map(m)?)),
            OutboundPayload::Stream(s) => {
                (PayloadKind::Stream, Bytes::from(codec.encode_stream(s)?))
            }
        };

        if !self.expiration.is_never() {
            record.ints.insert(IntField::Expiration, self.expiration.as_millis());
        }
        if let Some(n) = self.sequence_number {
            let n = i64::try_from(n).map_err(|_| {
                MessageError::BadRequest(format!("sequence number too large: {n}"))
            })?;
            record.ints.insert(IntField::SequenceNumber, n);
        }
        if let Some(p) = self.priority {
            record.ints.insert(IntField::Priority, i64::from(p));
        }
        if let Some(cos) = self.class_of_service {
            record.ints.insert(IntField::ClassOfService, i64::from(cos.as_u8()));
        }

        let native = self.ctx.store().insert(record);
        tracing::debug!(id = native.id(), "outbound message built");
        Ok(self.ctx.bind(Box::new(native), codec, "outbound"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn last_payload_wins() {
        let ctx = MessageContext::default();
        let msg = ctx
            .builder()
            .payload_string("first")
            .payload_bytes(vec![1u8, 2, 3])
            .build()
            .unwrap();
        assert_eq!(msg.payload_kind().unwrap(), PayloadKind::Bytes);
        assert!(msg.payload_as_string().unwrap().is_none());
    }

    #[test]
    fn empty_string_field_rejected() {
        let ctx = MessageContext::default();
        let err = ctx.builder().correlation_id("").build().unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_REQUEST");
        assert_eq!(ctx.store().live_count(), 0);
    }

    #[test]
    fn oversized_sequence_number_rejected() {
        let ctx = MessageContext::default();
        let err = ctx.builder().sequence_number(u64::MAX).build().unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_REQUEST");
    }

    #[test]
    fn non_finite_property_rejected() {
        let ctx = MessageContext::default();
        let err = ctx.builder().property("f", f64::NAN).build().unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_REQUEST");
    }
}
