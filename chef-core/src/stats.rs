use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-operation measurements; never persisted with the artifact.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub input_size: u64,
    pub output_size: u64,
    pub ratio: f64,
    pub elapsed: Duration,
}

impl ProcessingStats {
    pub fn new(input_size: u64, output_size: u64, elapsed: Duration) -> Self {
        Self {
            input_size,
            output_size,
            ratio: ratio(output_size, input_size),
            elapsed,
        }
    }
}

/// Size comparison between a message and its symbols.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EncodingStats {
    pub original_bytes: u64,
    /// Number of symbols, not bytes.
    pub encoded_length: u64,
    pub actual_ratio: f64,
    pub theoretical_ratio: f64,
    pub bits_per_symbol: u8,
}

impl EncodingStats {
    pub fn new(original_bytes: u64, encoded_length: u64, bits_per_symbol: u8) -> Self {
        Self {
            original_bytes,
            encoded_length,
            actual_ratio: ratio(encoded_length, original_bytes),
            theoretical_ratio: 8.0 / f64::from(bits_per_symbol),
            bits_per_symbol,
        }
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios() {
        let s = EncodingStats::new(3, 4, 6);
        assert!((s.actual_ratio - 4.0 / 3.0).abs() < 1e-9);
        assert!((s.theoretical_ratio - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(ProcessingStats::new(0, 10, Duration::ZERO).ratio, 0.0);
    }
}
