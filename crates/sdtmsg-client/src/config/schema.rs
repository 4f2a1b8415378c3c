use serde::Deserialize;
use sdtmsg_core::error::{MessageError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub display: DisplayLimits,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            display: DisplayLimits::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MessageError::UnsupportedVersion);
        }

        self.display.validate()?;

        Ok(())
    }
}

/// Bounds applied when a message is rendered with `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayLimits {
    /// Payload bytes shown (hex) before cutting off.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Characters shown of a text payload or string field.
    #[serde(default = "default_max_string_chars")]
    pub max_string_chars: usize,

    /// User properties listed before summarizing the rest.
    #[serde(default = "default_max_properties")]
    pub max_properties: usize,

    /// Hard cap on the whole rendering.
    #[serde(default = "default_max_total_chars")]
    pub max_total_chars: usize,
}

impl Default for DisplayLimits {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
            max_string_chars: default_max_string_chars(),
            max_properties: default_max_properties(),
            max_total_chars: default_max_total_chars(),
        }
    }
}

impl DisplayLimits {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.max_payload_bytes) {
            return Err(MessageError::BadRequest(
                "display.max_payload_bytes must be between 1 and 65536".into(),
            ));
        }
        if !(1..=65536).contains(&self.max_string_chars) {
            return Err(MessageError::BadRequest(
                "display.max_string_chars must be between 1 and 65536".into(),
            ));
        }
        if !(1..=1024).contains(&self.max_properties) {
            return Err(MessageError::BadRequest(
                "display.max_properties must be between 1 and 1024".into(),
            ));
        }
        if !(64..=1_048_576).contains(&self.max_total_chars) {
            return Err(MessageError::BadRequest(
                "display.max_total_chars must be between 64 and 1048576".into(),
            ));
        }
        if self.max_total_chars < self.max_string_chars {
            return Err(MessageError::BadRequest(
                "display.max_total_chars must not be less than max_string_chars".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_payload_bytes() -> usize {
    64
}
fn default_max_string_chars() -> usize {
    128
}
fn default_max_properties() -> usize {
    16
}
fn default_max_total_chars() -> usize {
    1024
}
