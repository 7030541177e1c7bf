use super::{CompressionMethod, Compressor, corrupt};
use crate::error::Result;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

pub struct ZlibCompressor;

impl Compressor for ZlibCompressor {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::Zlib
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64> {
        let mut enc = ZlibEncoder::new(dst, level_for(level));
        let consumed = std::io::copy(src, &mut enc)?;
        enc.finish()?;
        Ok(consumed)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        std::io::copy(&mut ZlibDecoder::new(src), dst).map_err(|e| corrupt("zlib", e))
    }
}

/// zlib knows 0..=9; anything else gets its default (6).
fn level_for(level: i32) -> Compression {
    u32::try_from(level)
        .ok()
        .filter(|l| *l <= 9)
        .map_or_else(Compression::default, Compression::new)
}
