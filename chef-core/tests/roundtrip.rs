use chef_core::container::{artifact_to_string, parse_artifact};
use chef_core::transcode;
use chef_core::{ChefError, Codec, CodecConfig, CompressionMethod, Recipe, VerificationMethod};
use proptest::prelude::*;

fn recipe() -> impl Strategy<Value = Recipe> {
    prop_oneof![
        Just(Recipe::Quick),
        Just(Recipe::Light),
        Just(Recipe::Classic),
        Just(Recipe::Gourmet),
    ]
}

fn compression() -> impl Strategy<Value = CompressionMethod> {
    prop_oneof![
        Just(CompressionMethod::None),
        Just(CompressionMethod::Zlib),
        Just(CompressionMethod::Zstd),
    ]
}

fn verification() -> impl Strategy<Value = VerificationMethod> {
    prop_oneof![
        Just(VerificationMethod::None),
        Just(VerificationMethod::Crc32),
        Just(VerificationMethod::Sha256),
        Just(VerificationMethod::Blake3),
    ]
}

fn codec(recipe: Recipe, c: CompressionMethod, v: VerificationMethod) -> Codec {
    Codec::new(CodecConfig {
        recipe,
        compression: c,
        verification: v,
        ..Default::default()
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_pipeline_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
        r in recipe(),
        c in compression(),
        v in verification(),
    ) {
        let codec = codec(r, c, v);
        let payload = codec.encode(&data, Some("application/octet-stream")).unwrap();
        prop_assert_eq!(
            payload.symbol_count() as u64,
            transcode::symbol_count(payload.packed_byte_length, r.bits_per_symbol())
        );
        let text = artifact_to_string(&payload).unwrap();
        let (out, mime) = codec.decode(&parse_artifact(&text).unwrap()).unwrap();
        prop_assert_eq!(out, data);
        prop_assert_eq!(mime.as_deref(), Some("application/octet-stream"));
    }

    #[test]
    fn prop_symbols_stay_in_alphabet(
        data in proptest::collection::vec(any::<u8>(), 1..512),
        r in recipe(),
    ) {
        let codec = codec(r, CompressionMethod::None, VerificationMethod::None);
        let payload = codec.encode(&data, None).unwrap();
        for ch in payload.symbols.chars() {
            prop_assert!(u32::from(codec.alphabet().index_of(ch).unwrap()) < r.base());
        }
    }

    #[test]
    fn prop_encoding_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let codec = codec(Recipe::Gourmet, CompressionMethod::Zstd, VerificationMethod::Blake3);
        let a = codec.encode(&data, None).unwrap();
        let b = codec.encode(&data, None).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn empty_input_every_combination() {
    for r in Recipe::ALL {
        for c in [CompressionMethod::None, CompressionMethod::Zlib, CompressionMethod::Zstd] {
            for v in [
                VerificationMethod::None,
                VerificationMethod::Crc32,
                VerificationMethod::Sha256,
                VerificationMethod::Blake3,
            ] {
                let codec = codec(r, c, v);
                let p = codec.encode(&[], None).unwrap();
                assert_eq!(p.original_byte_length, 0);
                assert!(codec.decode(&p).unwrap().0.is_empty(), "{r}/{c}/{v}");
            }
        }
    }
}

#[test]
fn any_symbol_swap_is_detected_with_a_digest() {
    let codec = codec(Recipe::Quick, CompressionMethod::None, VerificationMethod::Sha256);
    // 13 bytes at 6 bits: 18 symbols, the last carrying 4 padding bits
    let payload = codec.encode(b"mise en place", None).unwrap();
    let symbols: Vec<char> = payload.symbols.chars().collect();
    let last = symbols.len() - 1;
    for i in 0..symbols.len() {
        let mut tampered = symbols.clone();
        let idx = codec.alphabet().index_of(tampered[i]).unwrap();
        tampered[i] = codec.alphabet().symbol_of((idx + 1) % 64).unwrap();
        let mut p = payload.clone();
        p.symbols = tampered.into_iter().collect();
        let err = codec.decode(&p).unwrap_err();
        if i < last {
            assert!(matches!(err, ChefError::Verification { .. }), "position {i}: {err}");
        } else {
            assert!(matches!(err, ChefError::Decode(_)), "padding bit: {err}");
        }
    }
}

#[test]
fn data_bits_in_the_final_symbol_fail_verification() {
    let codec = codec(Recipe::Quick, CompressionMethod::None, VerificationMethod::Sha256);
    let mut p = codec.encode(b"mise en place", None).unwrap();
    let mut symbols: Vec<char> = p.symbols.chars().collect();
    let last = symbols.len() - 1;
    let idx = codec.alphabet().index_of(symbols[last]).unwrap();
    // top two bits of the final symbol are data, the low four are padding
    symbols[last] = codec.alphabet().symbol_of(idx ^ 0b10_0000).unwrap();
    p.symbols = symbols.into_iter().collect();
    assert!(matches!(codec.decode(&p), Err(ChefError::Verification { .. })));
}

#[test]
fn truncated_artifact_is_a_decode_error() {
    let codec = codec(Recipe::Light, CompressionMethod::None, VerificationMethod::None);
    let mut p = codec.encode(b"three words here", None).unwrap();
    p.symbols.pop();
    assert!(matches!(codec.decode(&p), Err(ChefError::Decode(_))));
}

#[test]
fn foreign_glyph_is_a_decode_error() {
    let codec = codec(Recipe::Classic, CompressionMethod::None, VerificationMethod::None);
    let mut p = codec.encode(b"abc", None).unwrap();
    p.symbols.replace_range(0..4, "A");
    assert!(matches!(codec.decode(&p), Err(ChefError::Decode(_))));
}
