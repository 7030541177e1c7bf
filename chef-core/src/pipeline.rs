//! Stage composition.
//!
//! Encode: `[compress] -> pack -> attach metadata`.
//! Decode: `check metadata -> unpack -> [decompress] -> [verify]`.

use crate::alphabet::{Alphabet, Recipe};
use crate::codec::{CompressionMethod, Compressor, compress_bytes, decompress_bytes};
use crate::container::{artifact_to_string, parse_artifact};
use crate::error::{ChefError, Result};
use crate::payload::EncodedPayload;
use crate::stats::EncodingStats;
use crate::transcode;
use crate::verify::VerificationMethod;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LEVEL: i32 = 6;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub recipe: Recipe,
    pub compression: CompressionMethod,
    pub verification: VerificationMethod,
    pub level: i32,
    /// Pack in chunks of this many bytes; must be symbol-aligned.
    pub chunk_size: Option<usize>,
    /// Decode any supported base, taking the alphabet from the payload.
    pub recipe_from_header: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            recipe: Recipe::default(),
            compression: CompressionMethod::default(),
            verification: VerificationMethod::default(),
            level: DEFAULT_LEVEL,
            chunk_size: None,
            recipe_from_header: false,
        }
    }
}

/// Immutable codec: every call is a pure function of (config, input).
#[derive(Clone)]
pub struct Codec {
    config: CodecConfig,
    alphabet: Alphabet,
    compressor: Arc<dyn Compressor>,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Result<Self> {
        let alphabet = Alphabet::new(config.recipe);
        if let Some(chunk) = config.chunk_size {
            let unit = transcode::aligned_unit(alphabet.bits_per_symbol());
            if chunk == 0 || chunk % unit != 0 {
                return Err(ChefError::Configuration(format!(
                    "chunk size {chunk} must be a non-zero multiple of {unit} for {}",
                    config.recipe
                )));
            }
        }
        let compressor: Arc<dyn Compressor> = Arc::from(config.compression.compressor());
        Ok(Self {
            config,
            alphabet,
            compressor,
        })
    }

    /// Same settings, different chunking.
    pub fn with_chunk_size(&self, chunk_size: usize) -> Result<Self> {
        Codec::new(CodecConfig {
            chunk_size: Some(chunk_size),
            ..self.config.clone()
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn encode(&self, data: &[u8], mime_type: Option<&str>) -> Result<EncodedPayload> {
        let bits = self.alphabet.bits_per_symbol();
        let packed = compress_bytes(self.compressor.as_ref(), data, self.config.level)?;
        let indices = match self.config.chunk_size {
            Some(chunk) => transcode::encode_chunked(&packed, bits, chunk)?,
            None => transcode::encode(&packed, bits)?,
        };
        let symbols = self.alphabet.render(&indices)?;
        debug!(
            recipe = %self.config.recipe,
            compression = %self.config.compression,
            input = data.len(),
            packed = packed.len(),
            symbols = indices.len(),
            "encoded payload"
        );
        Ok(EncodedPayload {
            recipe_base: self.alphabet.base(),
            bits_per_symbol: bits,
            symbols,
            original_byte_length: data.len() as u64,
            packed_byte_length: packed.len() as u64,
            mime_type: mime_type.map(str::to_owned),
            compression: self.config.compression,
            verification: self.config.verification,
            digest: self.config.verification.digest(data),
        })
    }

    /// Compression and verification follow what the payload declares. The
    /// base must match this codec's recipe unless `recipe_from_header` is set.
    pub fn decode(&self, p: &EncodedPayload) -> Result<(Vec<u8>, Option<String>)> {
        let (alphabet, chunk_size) = if p.recipe_base == self.alphabet.base() {
            (self.alphabet, self.config.chunk_size)
        } else if self.config.recipe_from_header {
            // chunking is tied to the configured width; whole-buffer output is identical
            (Alphabet::new(Recipe::from_base(p.recipe_base)?), None)
        } else {
            return Err(ChefError::Configuration(format!(
                "payload uses base {}, codec is configured for {} (base {})",
                p.recipe_base,
                self.config.recipe,
                self.alphabet.base()
            )));
        };
        let bits = alphabet.bits_per_symbol();
        if p.bits_per_symbol != bits {
            return Err(ChefError::Decode(format!(
                "header declares {} bits per symbol for base {}",
                p.bits_per_symbol, p.recipe_base
            )));
        }
        if p.compression == CompressionMethod::None && p.packed_byte_length != p.original_byte_length
        {
            return Err(ChefError::Decode(format!(
                "uncompressed payload declares {} packed bytes for {} original bytes",
                p.packed_byte_length, p.original_byte_length
            )));
        }

        let indices = alphabet.parse(&p.symbols)?;
        let packed = match chunk_size {
            Some(chunk) => {
                transcode::decode_chunked(&indices, bits, p.packed_byte_length, chunk)?
            }
            None => transcode::decode(&indices, bits, p.packed_byte_length)?,
        };

        let limit = p.original_byte_length;
        let data = if p.compression == self.config.compression {
            decompress_bytes(self.compressor.as_ref(), &packed, limit)?
        } else {
            decompress_bytes(p.compression.compressor().as_ref(), &packed, limit)?
        };
        if data.len() as u64 != p.original_byte_length {
            return Err(ChefError::Corruption(format!(
                "{} yielded {} bytes, header declares {}",
                p.compression,
                data.len(),
                p.original_byte_length
            )));
        }
        p.verification.verify(&data, p.digest.as_deref())?;
        debug!(symbols = indices.len(), output = data.len(), "decoded payload");
        Ok((data, p.mime_type.clone()))
    }

    /// Text in, complete artifact text out.
    pub fn encode_str(&self, text: &str) -> Result<String> {
        artifact_to_string(&self.encode(text.as_bytes(), Some("text/plain"))?)
    }

    pub fn decode_str(&self, artifact: &str) -> Result<String> {
        let (data, _) = self.decode(&parse_artifact(artifact)?)?;
        String::from_utf8(data).map_err(|e| ChefError::Decode(format!("not UTF-8 text: {e}")))
    }

    pub fn encoding_stats(&self, original: &[u8], payload: &EncodedPayload) -> EncodingStats {
        EncodingStats::new(
            original.len() as u64,
            payload.symbol_count() as u64,
            self.alphabet.bits_per_symbol(),
        )
    }
}
