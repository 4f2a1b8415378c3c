//! Client config loader (strict parsing).

pub mod schema;

use std::fs;

use sdtmsg_core::error::{MessageError, Result};

pub use schema::{ClientConfig, DisplayLimits};

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MessageError::Internal(format!("read config failed: {e}")))?;
    let cfg = load_from_str(&s)?;
    tracing::info!(%path, "sdtmsg client config loaded");
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| MessageError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
