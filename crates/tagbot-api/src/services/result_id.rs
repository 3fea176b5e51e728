//! Opaque inline result ids.
//!
//! An id is the URL-safe base64 of the media id (8 bytes, big endian)
//! followed by one flag byte; a non-zero flag means choosing the result
//! must not update the item's `last_used` time.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use tagbot_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineResultId {
    pub media_id: i64,
    pub skip_last_used: bool,
}

impl InlineResultId {
    pub fn new(media_id: i64, skip_last_used: bool) -> Self {
        Self {
            media_id,
            skip_last_used,
        }
    }

    pub fn encode(&self) -> String {
        let mut bytes = [0u8; 9];
        bytes[..8].copy_from_slice(&self.media_id.to_be_bytes());
        bytes[8] = u8::from(self.skip_last_used);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|e| Error::InvalidInput(format!("invalid result id: {}", e)))?;
        let Ok(bytes) = <[u8; 9]>::try_from(bytes.as_slice()) else {
            return Err(Error::InvalidInput(format!(
                "invalid result id length: {}",
                bytes.len()
            )));
        };
        let mut media_id = [0u8; 8];
        media_id.copy_from_slice(&bytes[..8]);
        Ok(Self {
            media_id: i64::from_be_bytes(media_id),
            skip_last_used: bytes[8] != 0,
        })
    }
}
