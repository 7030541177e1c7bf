//! Corruption detection over the caller's payload bytes.
//!
//! None of these digests is keyed: a matching digest proves the bytes were not
//! damaged in transit, not that nobody changed them on purpose.

use crate::error::{ChefError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    #[default]
    None,
    /// Fast, weak.
    Crc32,
    Sha256,
    Blake3,
}

impl VerificationMethod {
    pub fn name(self) -> &'static str {
        match self {
            VerificationMethod::None => "none",
            VerificationMethod::Crc32 => "crc32",
            VerificationMethod::Sha256 => "sha256",
            VerificationMethod::Blake3 => "blake3",
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            VerificationMethod::None => 0,
            VerificationMethod::Crc32 => 4,
            VerificationMethod::Sha256 | VerificationMethod::Blake3 => 32,
        }
    }

    /// `None` for the disabled method.
    pub fn digest(self, data: &[u8]) -> Option<Vec<u8>> {
        match self {
            VerificationMethod::None => None,
            VerificationMethod::Crc32 => Some(crc32fast::hash(data).to_be_bytes().to_vec()),
            VerificationMethod::Sha256 => Some(Sha256::digest(data).to_vec()),
            VerificationMethod::Blake3 => Some(blake3::hash(data).as_bytes().to_vec()),
        }
    }

    /// Recompute over `data` and compare with the stored digest.
    pub fn verify(self, data: &[u8], expected: Option<&[u8]>) -> Result<()> {
        match (self.digest(data), expected) {
            (None, _) => Ok(()),
            (Some(_), None) => Err(ChefError::Decode(format!(
                "{self} verification declared but no digest stored"
            ))),
            (Some(_), Some(expected)) if expected.len() != self.digest_len() => {
                Err(ChefError::Decode(format!(
                    "{self} digest must be {} bytes, header stores {}",
                    self.digest_len(),
                    expected.len()
                )))
            }
            (Some(actual), Some(expected)) if actual == expected => Ok(()),
            (Some(actual), Some(expected)) => Err(ChefError::Verification {
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            }),
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VerificationMethod {
    type Err = ChefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(VerificationMethod::None),
            "crc32" => Ok(VerificationMethod::Crc32),
            "sha256" => Ok(VerificationMethod::Sha256),
            "blake3" => Ok(VerificationMethod::Blake3),
            other => Err(ChefError::Configuration(format!(
                "unsupported verification method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [VerificationMethod; 4] = [
        VerificationMethod::None,
        VerificationMethod::Crc32,
        VerificationMethod::Sha256,
        VerificationMethod::Blake3,
    ];

    #[test]
    fn digest_lengths_are_fixed() {
        for m in ALL {
            let len = m.digest(b"payload").map(|d| d.len()).unwrap_or(0);
            assert_eq!(len, m.digest_len(), "{m}");
        }
    }

    #[test]
    fn sha256_known_vector() {
        let d = VerificationMethod::Sha256.digest(b"abc").unwrap();
        assert_eq!(
            hex::encode(d),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn mismatch_is_verification_error() {
        for m in [VerificationMethod::Crc32, VerificationMethod::Sha256, VerificationMethod::Blake3] {
            let d = m.digest(b"payload").unwrap();
            assert!(m.verify(b"payload", Some(&d)).is_ok());
            assert!(matches!(
                m.verify(b"pAyload", Some(&d)),
                Err(ChefError::Verification { .. })
            ));
        }
    }

    #[test]
    fn missing_digest_is_decode_error() {
        assert!(matches!(
            VerificationMethod::Blake3.verify(b"x", None),
            Err(ChefError::Decode(_))
        ));
        assert!(VerificationMethod::None.verify(b"x", None).is_ok());
    }

    #[test]
    fn wrong_digest_length_is_decode_error() {
        let d = VerificationMethod::Sha256.digest(b"x").unwrap();
        assert!(matches!(
            VerificationMethod::Sha256.verify(b"x", Some(&d[..16])),
            Err(ChefError::Decode(_))
        ));
        assert!(matches!(
            VerificationMethod::Crc32.verify(b"x", Some(&d)),
            Err(ChefError::Decode(_))
        ));
    }
}
