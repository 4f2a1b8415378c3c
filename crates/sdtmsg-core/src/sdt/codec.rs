//! SDT codec contracts.
//!
//! The message layer only consumes decoded `Data`; turning native bytes into
//! `Data` is the job of an `SdtDecoder` supplied alongside the native message
//! source. `JsonSdtCodec` is a tag-preserving reference codec built on
//! `serde_json`. It is what the in-memory store and the test vectors use; it
//! is not the broker's binary wire format.

use crate::error::{MessageError, Result};
use crate::sdt::{Data, SdtMap, SdtStream};

/// Native encoded value -> SDT model.
///
/// Undecodable input is reported as `MessageError::Corrupt`: by the time a
/// blob reaches the decoder it came from a native object, so a failure means
/// the object is broken, not that the caller asked for the wrong type.
pub trait SdtDecoder: Send + Sync {
    fn decode_data(&self, raw: &[u8]) -> Result<Data>;
    fn decode_map(&self, raw: &[u8]) -> Result<SdtMap>;
    fn decode_stream(&self, raw: &[u8]) -> Result<SdtStream>;
}

/// SDT model -> native encoded value.
pub trait SdtEncoder: Send + Sync {
    fn encode_data(&self, data: &Data) -> Result<Vec<u8>>;
    fn encode_map(&self, map: &SdtMap) -> Result<Vec<u8>>;
    fn encode_stream(&self, stream: &SdtStream) -> Result<Vec<u8>>;
}

/// Reference codec: externally tagged JSON (`{"I32":1}`, `{"String":"x"}`).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSdtCodec;

impl JsonSdtCodec {
    pub fn new() -> Self {
        Self
    }
}

fn corrupt(what: &str, e: serde_json::Error) -> MessageError {
    tracing::trace!(what, error = %e, "sdt decode failed");
    MessageError::Corrupt(format!("undecodable sdt {what}: {e}"))
}

// JSON has no NaN/inf; refuse them up front instead of writing `null`.
fn ensure_finite<'a>(mut values: impl Iterator<Item = &'a Data>) -> Result<()> {
    if values.any(Data::has_non_finite) {
        return Err(MessageError::BadRequest("non-finite float not encodable".into()));
    }
    Ok(())
}

fn encode_err(e: serde_json::Error) -> MessageError {
    MessageError::Internal(format!("sdt encode failed: {e}"))
}

impl SdtDecoder for JsonSdtCodec {
    fn decode_data(&self, raw: &[u8]) -> Result<Data> {
        serde_json::from_slice(raw).map_err(|e| corrupt("value", e))
    }

    fn decode_map(&self, raw: &[u8]) -> Result<SdtMap> {
        serde_json::from_slice(raw).map_err(|e| corrupt("map", e))
    }

    fn decode_stream(&self, raw: &[u8]) -> Result<SdtStream> {
        serde_json::from_slice(raw).map_err(|e| corrupt("stream", e))
    }
}

impl SdtEncoder for JsonSdtCodec {
    fn encode_data(&self, data: &Data) -> Result<Vec<u8>> {
        ensure_finite(std::iter::once(data))?;
        serde_json::to_vec(data).map_err(encode_err)
    }

    fn encode_map(&self, map: &SdtMap) -> Result<Vec<u8>> {
        ensure_finite(map.values())?;
        serde_json::to_vec(map).map_err(encode_err)
    }

    fn encode_stream(&self, stream: &SdtStream) -> Result<Vec<u8>> {
        ensure_finite(stream.iter())?;
        serde_json::to_vec(stream).map_err(encode_err)
    }
}
