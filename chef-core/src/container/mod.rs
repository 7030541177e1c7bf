//! Text artifact: one header line followed by the symbol body.
//!
//! ```text
//! EMOJICHEF/1 {"recipe_base":256,"bits_per_symbol":8,...}
//! 😀😁😂...
//! ```

pub mod header;

use crate::error::{ChefError, Result};
use crate::payload::EncodedPayload;
use header::Header;
use std::io::{Read, Write};

pub fn write_artifact(payload: &EncodedPayload, mut w: impl Write) -> Result<u64> {
    let header = Header::from_payload(payload);
    let mut n = header.write_to(&mut w)?;
    w.write_all(payload.symbols.as_bytes())?;
    w.write_all(b"\n")?;
    n += payload.symbols.len() as u64 + 1;
    Ok(n)
}

pub fn read_artifact(mut r: impl Read) -> Result<EncodedPayload> {
    let mut raw = Vec::new();
    r.read_to_end(&mut raw)?;
    let text = String::from_utf8(raw)
        .map_err(|e| ChefError::Decode(format!("artifact is not UTF-8: {e}")))?;
    parse_artifact(&text)
}

pub fn artifact_to_string(payload: &EncodedPayload) -> Result<String> {
    let mut buf = Vec::with_capacity(payload.symbols.len() + 256);
    write_artifact(payload, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ChefError::Decode(e.to_string()))
}

pub fn parse_artifact(text: &str) -> Result<EncodedPayload> {
    let (line, body) = text
        .split_once('\n')
        .ok_or_else(|| ChefError::Decode("artifact has no header line".into()))?;
    let header = Header::parse_line(line.trim_end_matches('\r'))?;
    let body = body.trim_end_matches(['\r', '\n']);
    header.into_payload(body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CompressionMethod;
    use crate::verify::VerificationMethod;

    fn payload() -> EncodedPayload {
        EncodedPayload {
            recipe_base: 64,
            bits_per_symbol: 6,
            symbols: "\u{1F357}\u{1F34B}\u{1F369}\u{1F366}".into(),
            original_byte_length: 3,
            packed_byte_length: 3,
            mime_type: Some("text/plain".into()),
            compression: CompressionMethod::None,
            verification: VerificationMethod::Crc32,
            digest: Some(vec![0xde, 0xad, 0xbe, 0xef]),
        }
    }

    #[test]
    fn artifact_survives_text_roundtrip() {
        let p = payload();
        let text = artifact_to_string(&p).unwrap();
        assert!(text.starts_with("EMOJICHEF/1 {"));
        assert!(text.contains("\"digest\":\"deadbeef\""));
        assert_eq!(parse_artifact(&text).unwrap(), p);
        assert_eq!(read_artifact(text.as_bytes()).unwrap(), p);
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let p = payload();
        let text = artifact_to_string(&p).unwrap().replace('\n', "\r\n");
        assert_eq!(parse_artifact(&text).unwrap(), p);
    }

    #[test]
    fn empty_body_is_valid() {
        let mut p = payload();
        p.symbols.clear();
        p.original_byte_length = 0;
        p.packed_byte_length = 0;
        let text = artifact_to_string(&p).unwrap();
        assert_eq!(parse_artifact(&text).unwrap(), p);
    }

    #[test]
    fn malformed_artifacts_are_decode_errors() {
        for bad in [
            "",
            "no newline at all",
            "HELLO/1 {}\nbody",
            "EMOJICHEF/9 {}\n",
            "EMOJICHEF/1 {not json}\n",
            "EMOJICHEF/1 {\"recipe_base\":64}\n",
        ] {
            assert!(matches!(parse_artifact(bad), Err(ChefError::Decode(_))), "{bad:?}");
        }
        assert!(matches!(read_artifact(&[0xffu8, 0xfe, b'\n'][..]), Err(ChefError::Decode(_))));
    }
}
