use crate::codec::CompressionMethod;
use crate::verify::VerificationMethod;

/// Symbols plus everything decode needs to reverse them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedPayload {
    pub recipe_base: u32,
    pub bits_per_symbol: u8,
    pub symbols: String,
    /// Length of the caller's bytes.
    pub original_byte_length: u64,
    /// Length of the byte stream handed to the bit packer (after compression).
    pub packed_byte_length: u64,
    pub mime_type: Option<String>,
    pub compression: CompressionMethod,
    pub verification: VerificationMethod,
    pub digest: Option<Vec<u8>>,
}

impl EncodedPayload {
    pub fn symbol_count(&self) -> usize {
        self.symbols.chars().count()
    }
}
