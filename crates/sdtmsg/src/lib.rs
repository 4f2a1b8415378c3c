//! Top-level facade crate for sdtmsg.
//!
//! Re-exports the SDT core types and the client library so users can depend on a single crate.

pub mod core {
    pub use sdtmsg_core::*;
}

pub mod client {
    pub use sdtmsg_client::*;
}

pub use sdtmsg_client::{Message, MessageContext};
pub use sdtmsg_core::{Data, MessageError, SdtMap, SdtStream};
