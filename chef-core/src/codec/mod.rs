use crate::error::{ChefError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// Compression applied in the byte domain, before bit packing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMethod {
    #[default]
    None,
    Zlib,
    Zstd,
}

impl CompressionMethod {
    pub fn name(self) -> &'static str {
        match self {
            CompressionMethod::None => "none",
            CompressionMethod::Zlib => "zlib",
            CompressionMethod::Zstd => "zstd",
        }
    }

    pub fn compressor(self) -> Box<dyn Compressor> {
        match self {
            CompressionMethod::None => Box::new(Identity),
            CompressionMethod::Zlib => Box::new(zlib::ZlibCompressor),
            CompressionMethod::Zstd => Box::new(zstdc::ZstdCompressor),
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionMethod {
    type Err = ChefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "store" => Ok(CompressionMethod::None),
            "zlib" => Ok(CompressionMethod::Zlib),
            "zstd" => Ok(CompressionMethod::Zstd),
            other => Err(ChefError::Configuration(format!(
                "unsupported compression method: {other}"
            ))),
        }
    }
}

pub trait Compressor: Send + Sync {
    fn method(&self) -> CompressionMethod;
    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, level: i32) -> Result<u64>;
    /// Malformed input surfaces as [`ChefError::Corruption`].
    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64>;
}

pub fn compress_bytes(c: &dyn Compressor, data: &[u8], level: i32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2 + 64);
    c.compress(&mut &data[..], &mut out, level)?;
    Ok(out)
}

/// Fails with [`ChefError::Corruption`] as soon as the output would exceed
/// `limit` bytes.
pub fn decompress_bytes(c: &dyn Compressor, data: &[u8], limit: u64) -> Result<Vec<u8>> {
    let hint = limit.min(data.len() as u64 * 4);
    let mut sink = BoundedSink {
        out: Vec::with_capacity(usize::try_from(hint).unwrap_or(0)),
        limit,
        overflowed: false,
    };
    let result = c.decompress(&mut &data[..], &mut sink);
    if sink.overflowed {
        return Err(ChefError::Corruption(format!(
            "{} output exceeds the declared {limit} bytes",
            c.method()
        )));
    }
    result?;
    Ok(sink.out)
}

struct BoundedSink {
    out: Vec<u8>,
    limit: u64,
    overflowed: bool,
}

impl Write for BoundedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let room = self.limit.saturating_sub(self.out.len() as u64);
        if buf.len() as u64 > room {
            self.overflowed = true;
            return Err(std::io::Error::other("output limit reached"));
        }
        self.out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn corrupt(codec: &str, e: std::io::Error) -> ChefError {
    ChefError::Corruption(format!("{codec}: {e}"))
}

/// Bytes through unchanged.
pub struct Identity;

impl Compressor for Identity {
    fn method(&self) -> CompressionMethod {
        CompressionMethod::None
    }

    fn compress(&self, src: &mut dyn Read, dst: &mut dyn Write, _level: i32) -> Result<u64> {
        Ok(std::io::copy(src, dst)?)
    }

    fn decompress(&self, src: &mut dyn Read, dst: &mut dyn Write) -> Result<u64> {
        Ok(std::io::copy(src, dst)?)
    }
}

pub mod zlib;
pub mod zstdc;
