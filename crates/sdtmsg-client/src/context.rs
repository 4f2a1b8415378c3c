//! Shared client state for sdtmsg messages.
//!
//! One `MessageContext` per application: it carries the validated config,
//! the SDT decoder used for inbound native messages, the in-memory store
//! that owns outbound records, and the resource metrics every handle reports
//! into. Cloning is cheap.

use std::sync::Arc;

use sdtmsg_core::error::Result;
use sdtmsg_core::sdt::{JsonSdtCodec, SdtDecoder};

use crate::config::{self, ClientConfig};
use crate::disposable::Disposable;
use crate::message::{Message, MessageBuilder};
use crate::native::{MemoryStore, NativeMessage};
use crate::obs::ResourceMetrics;

#[derive(Clone)]
pub struct MessageContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageContext")
            .field("cfg", &self.inner.cfg)
            .finish_non_exhaustive()
    }
}

struct ContextInner {
    cfg: ClientConfig,
    decoder: Arc<dyn SdtDecoder>,
    codec: Arc<JsonSdtCodec>,
    store: Arc<MemoryStore>,
    metrics: Arc<ResourceMetrics>,
}

impl MessageContext {
    /// Build a context whose inbound decoder is the reference JSON codec.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        Self::with_decoder(cfg, Arc::new(JsonSdtCodec::new()))
    }

    /// Build a context that decodes inbound native messages with `decoder`
    /// (the transport's SDT wire decoder).
    pub fn with_decoder(cfg: ClientConfig, decoder: Arc<dyn SdtDecoder>) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            inner: Arc::new(ContextInner {
                cfg,
                decoder,
                codec: Arc::new(JsonSdtCodec::new()),
                store: Arc::new(MemoryStore::new()),
                metrics: Arc::new(ResourceMetrics::new()),
            }),
        })
    }

    pub fn from_config_file(path: &str) -> Result<Self> {
        Self::new(config::load_from_file(path)?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<ResourceMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.inner.store)
    }

    pub(crate) fn codec(&self) -> Arc<JsonSdtCodec> {
        Arc::clone(&self.inner.codec)
    }

    /// Take ownership of a native message delivered by the transport.
    pub fn wrap(&self, native: Box<dyn NativeMessage>) -> Message {
        self.bind(native, Arc::clone(&self.inner.decoder), "inbound")
    }

    /// Start an outbound message backed by this context's store.
    pub fn builder(&self) -> MessageBuilder {
        MessageBuilder::new(self.clone())
    }

    pub(crate) fn bind(
        &self,
        native: Box<dyn NativeMessage>,
        decoder: Arc<dyn SdtDecoder>,
        origin: &'static str,
    ) -> Message {
        self.inner.metrics.messages_created.inc(&[("origin", origin)]);
        let handle = Disposable::new(native, self.metrics());
        Message::new(handle, decoder, self.inner.cfg.display)
    }
}

impl Default for MessageContext {
    fn default() -> Self {
        // the default config always validates
        Self {
            inner: Arc::new(ContextInner {
                cfg: ClientConfig::default(),
                decoder: Arc::new(JsonSdtCodec::new()),
                codec: Arc::new(JsonSdtCodec::new()),
                store: Arc::new(MemoryStore::new()),
                metrics: Arc::new(ResourceMetrics::new()),
            }),
        }
    }
}
