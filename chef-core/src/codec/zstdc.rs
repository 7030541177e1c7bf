use super::{CompressionMethod, Compressor, corrupt};
use crate::error::Result;
use std::io::{Read, Write};
use zstd::stream::{Decoder, Encoder};

const MAX_LEVEL: i32 = 22;

pub struct ZstdCompressor;

impl Compressor for ZstdCompressor {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Zstd
    }

    /// Returns the number of input bytes consumed.
    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64> {
        let mut enc = Encoder::new(dst, level.clamp(1, MAX_LEVEL))?;
        let consumed = std::io::copy(src, &mut enc)?;
        // writes the frame epilogue
        enc.finish()?;
        Ok(consumed)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        let mut dec = Decoder::new(src).map_err(|e| corrupt("zstd", e))?;
        std::io::copy(&mut dec, dst).map_err(|e| corrupt("zstd", e))
    }
}
