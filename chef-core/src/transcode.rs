//! Bit packing between bytes and fixed-width symbol indices.
//!
//! Bytes enter MSB-first; each symbol takes the top `bits` of the buffered
//! stream. A final partial group is zero-padded at the low end, so the exact
//! byte length has to travel out-of-band for decode to drop the padding.

use crate::error::{ChefError, Result};

pub const SUPPORTED_WIDTHS: [u8; 4] = [6, 7, 8, 10];

/// Fixed-width bit buffer. Never holds more than `width + 7` bits.
#[derive(Debug, Default)]
struct BitAccumulator {
    value: u32,
    bits: u32,
}

impl BitAccumulator {
    #[inline]
    fn push(&mut self, value: u32, width: u32) {
        debug_assert!(self.bits + width <= 32);
        self.value = (self.value << width) | value;
        self.bits += width;
    }

    #[inline]
    fn pop(&mut self, width: u32) -> Option<u32> {
        if self.bits < width {
            return None;
        }
        self.bits -= width;
        let out = (self.value >> self.bits) & ((1 << width) - 1);
        self.value &= (1 << self.bits) - 1;
        Some(out)
    }
}

fn check_width(bits: u8) -> Result<u32> {
    if SUPPORTED_WIDTHS.contains(&bits) {
        Ok(u32::from(bits))
    } else {
        Err(ChefError::Configuration(format!("unsupported symbol width {bits}")))
    }
}

/// Number of symbols needed for `len` bytes at `bits` per symbol.
pub fn symbol_count(len: u64, bits: u8) -> u64 {
    (len * 8).div_ceil(u64::from(bits))
}

/// Smallest byte count that ends on both a byte and a symbol boundary.
pub fn aligned_unit(bits: u8) -> usize {
    let b = usize::from(bits);
    lcm(8, b) / 8
}

fn lcm(a: usize, b: usize) -> usize {
    let (mut x, mut y) = (a, b);
    while y != 0 {
        (x, y) = (y, x % y);
    }
    a / x * b
}

pub fn encode(bytes: &[u8], bits: u8) -> Result<Vec<u16>> {
    let width = check_width(bits)?;
    let mut out = Vec::with_capacity(symbol_count(bytes.len() as u64, bits) as usize);
    let mut acc = BitAccumulator::default();
    for &b in bytes {
        acc.push(u32::from(b), 8);
        while let Some(idx) = acc.pop(width) {
            out.push(idx as u16);
        }
    }
    if acc.bits > 0 {
        let pad = width - acc.bits;
        acc.push(0, pad);
        if let Some(idx) = acc.pop(width) {
            out.push(idx as u16);
        }
    }
    Ok(out)
}

pub fn decode(indices: &[u16], bits: u8, len: u64) -> Result<Vec<u8>> {
    let width = check_width(bits)?;
    let expected = symbol_count(len, bits);
    let have = indices.len() as u64;
    if have < expected {
        return Err(ChefError::Decode(format!(
            "truncated body: {have} symbols carry {} bits, need {} for {len} bytes",
            have * u64::from(width),
            len * 8
        )));
    }
    if have > expected {
        return Err(ChefError::Decode(format!(
            "{} trailing symbols after {len} bytes",
            have - expected
        )));
    }

    let base = 1u32 << width;
    let mut out = Vec::with_capacity(len as usize);
    let mut acc = BitAccumulator::default();
    for (pos, &idx) in indices.iter().enumerate() {
        if u32::from(idx) >= base {
            return Err(ChefError::Decode(format!(
                "symbol {idx} at position {pos} out of range for base {base}"
            )));
        }
        acc.push(u32::from(idx), width);
        while (out.len() as u64) < len {
            match acc.pop(8) {
                Some(byte) => out.push(byte as u8),
                None => break,
            }
        }
    }

    // Whatever is left is padding and must be zero.
    if acc.value != 0 {
        return Err(ChefError::Decode(format!(
            "non-zero padding in final symbol ({} bits)",
            acc.bits
        )));
    }
    Ok(out)
}

/// Same output as [`encode`], processed `chunk` bytes at a time.
pub fn encode_chunked(bytes: &[u8], bits: u8, chunk: usize) -> Result<Vec<u16>> {
    let chunk = checked_chunk(bits, chunk)?;
    let mut out = Vec::with_capacity(symbol_count(bytes.len() as u64, bits) as usize);
    for piece in bytes.chunks(chunk) {
        out.extend(encode(piece, bits)?);
    }
    Ok(out)
}

/// Inverse of [`encode_chunked`]; accepts the same `chunk` it was encoded with.
pub fn decode_chunked(indices: &[u16], bits: u8, len: u64, chunk: usize) -> Result<Vec<u8>> {
    let chunk = checked_chunk(bits, chunk)?;
    let per_chunk = chunk * 8 / usize::from(bits);
    let expected = symbol_count(len, bits);
    if indices.len() as u64 != expected {
        // Let the whole-buffer decoder produce the precise error.
        return decode(indices, bits, len);
    }
    let mut out = Vec::with_capacity(len as usize);
    let mut remaining = len;
    for piece in indices.chunks(per_chunk) {
        let take = remaining.min(chunk as u64);
        out.extend(decode(piece, bits, take)?);
        remaining -= take;
    }
    Ok(out)
}

fn checked_chunk(bits: u8, chunk: usize) -> Result<usize> {
    check_width(bits)?;
    let unit = aligned_unit(bits);
    if chunk == 0 || chunk % unit != 0 {
        return Err(ChefError::Configuration(format!(
            "chunk size {chunk} is not a multiple of {unit} bytes for {bits}-bit symbols"
        )));
    }
    Ok(chunk)
}
