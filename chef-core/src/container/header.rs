use crate::codec::CompressionMethod;
use crate::error::{ChefError, Result};
use crate::payload::EncodedPayload;
use crate::verify::VerificationMethod;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const MAGIC: &str = "EMOJICHEF";
pub const VERSION: u16 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub recipe_base: u32,
    pub bits_per_symbol: u8,
    pub original_byte_length: u64,
    pub packed_byte_length: u64,
    pub compression: CompressionMethod,
    pub verification: VerificationMethod,
    /// Hex-encoded digest of the original bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Header {
    pub fn from_payload(p: &EncodedPayload) -> Self {
        Self {
            recipe_base: p.recipe_base,
            bits_per_symbol: p.bits_per_symbol,
            original_byte_length: p.original_byte_length,
            packed_byte_length: p.packed_byte_length,
            compression: p.compression,
            verification: p.verification,
            digest: p.digest.as_deref().map(hex::encode),
            mime_type: p.mime_type.clone(),
        }
    }

    pub fn into_payload(self, symbols: String) -> Result<EncodedPayload> {
        let digest = self
            .digest
            .map(|h| {
                hex::decode(h.trim()).map_err(|e| ChefError::Decode(format!("digest hex: {e}")))
            })
            .transpose()?;
        Ok(EncodedPayload {
            recipe_base: self.recipe_base,
            bits_per_symbol: self.bits_per_symbol,
            symbols,
            original_byte_length: self.original_byte_length,
            packed_byte_length: self.packed_byte_length,
            mime_type: self.mime_type,
            compression: self.compression,
            verification: self.verification,
            digest,
        })
    }

    /// Writes `MAGIC/VERSION <json>\n` and returns the byte count.
    pub fn write_to(&self, mut w: impl Write) -> Result<u64> {
        let json = serde_json::to_string(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let line = format!("{MAGIC}/{VERSION} {json}\n");
        w.write_all(line.as_bytes())?;
        Ok(line.len() as u64)
    }

    pub fn parse_line(line: &str) -> Result<Self> {
        let (tag, json) = line
            .split_once(' ')
            .ok_or_else(|| ChefError::Decode("header line has no JSON".into()))?;
        let version = tag
            .strip_prefix(MAGIC)
            .and_then(|v| v.strip_prefix('/'))
            .ok_or_else(|| ChefError::Decode(format!("bad magic: {tag:?}")))?;
        if version != VERSION.to_string() {
            return Err(ChefError::Decode(format!("unsupported artifact version {version}")));
        }
        serde_json::from_str(json).map_err(|e| ChefError::Decode(format!("header: {e}")))
    }
}
