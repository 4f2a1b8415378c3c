//! Structured data types (SDT).
//!
//! - `Data`: closed tagged union of every value a payload or property can hold.
//! - `SdtMap`: string-keyed container, stable key order.
//! - `SdtStream`: positional container, heterogeneous elements.
//! - `codec`: decoder/encoder contracts plus a reference JSON codec.
//!
//! Containers never panic on a tag mismatch: typed getters return `None`,
//! `try_get_as` reports `MessageError::TypeMismatch`.

pub mod codec;
mod data;
mod map;
mod stream;

pub use codec::{JsonSdtCodec, SdtDecoder, SdtEncoder};
pub use data::{Data, DataKind};
pub use map::SdtMap;
pub use stream::SdtStream;
