//! Integration tests: round-trip, worst-case size, boundary safety, and
//! determinism across the public API.

use aplib::block::{
    compress, compress_into, decompress, decompress_into, max_compressed_size,
    max_decompressed_size, CompressError, DecompressError, EncoderConfig, Flags,
};
use proptest::prelude::*;

fn roundtrip_with(data: &[u8], config: &EncoderConfig) {
    let (compressed, _stats) = compress(data, config).unwrap();
    let decompressed = decompress(&compressed, config.flags()).unwrap();
    assert_eq!(decompressed, data);
}

fn roundtrip(data: &[u8]) {
    roundtrip_with(data, &EncoderConfig::default());
}

#[test]
fn empty_compresses_to_empty_and_is_not_decodable() {
    let (compressed, _stats) = compress(b"", &EncoderConfig::default()).unwrap();
    assert!(compressed.is_empty());
    assert_eq!(
        decompress(&compressed, Flags::STANDARD),
        Err(DecompressError::EmptyInput)
    );
}

#[test]
fn single_byte_and_short_inputs_roundtrip() {
    for data in [&b"A"[..], b"AB", b"ABC", b"AAAA", b"\0\0\0\0"] {
        roundtrip(data);
    }
}

#[test]
fn highly_repetitive_input_roundtrips() {
    roundtrip(&vec![b'z'; 1 << 16]);
}

#[test]
fn run_of_zero_bytes_uses_nibble_zero_literal_path() {
    roundtrip(&vec![0u8; 4096]);
}

#[test]
fn random_looking_incompressible_data_roundtrips() {
    // A simple xorshift-style generator; deterministic so the test is
    // reproducible without reaching for a fuzzer-only corpus.
    let mut state: u32 = 0x9e3779b9;
    let mut data = Vec::with_capacity(8192);
    for _ in 0..8192 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        data.push((state & 0xff) as u8);
    }
    roundtrip(&data);
}

#[test]
fn enhanced_mode_roundtrips() {
    let config = EncoderConfig {
        enhanced: true,
        ..EncoderConfig::default()
    };
    let mut data = Vec::new();
    for i in 0..2000u32 {
        data.push((i % 7) as u8);
    }
    roundtrip_with(&data, &config);
}

#[test]
fn narrow_window_still_roundtrips_and_stays_in_window() {
    let config = EncoderConfig {
        max_window_size: 16,
        ..EncoderConfig::default()
    };
    roundtrip_with(b"abcdefghijklmnopabcdefghijklmnop", &config);
}

#[test]
fn compress_into_reports_output_too_small() {
    let mut tiny = [0u8; 1];
    let err = compress_into(b"hello world", &mut tiny, &EncoderConfig::default()).unwrap_err();
    assert_eq!(err, CompressError::OutputTooSmall);
}

#[test]
fn decompress_into_reports_output_too_small() {
    let (compressed, _stats) = compress(b"hello world hello world", &EncoderConfig::default()).unwrap();
    let mut tiny = [0u8; 1];
    let err = decompress_into(&compressed, &mut tiny, Flags::STANDARD).unwrap_err();
    assert_eq!(err, DecompressError::OutputTooSmall);
}

#[test]
fn max_compressed_size_is_a_real_upper_bound() {
    for len in [0usize, 1, 17, 1000, 100_000] {
        let data = vec![7u8; len];
        if data.is_empty() {
            continue;
        }
        let (compressed, _stats) = compress(&data, &EncoderConfig::default()).unwrap();
        assert!(compressed.len() <= max_compressed_size(len));
    }
}

#[test]
fn corrupted_stream_never_panics() {
    let (mut compressed, _stats) =
        compress(b"a moderately long and repetitive input string input string", &EncoderConfig::default())
            .unwrap();
    for i in 0..compressed.len() {
        let mut corrupted = compressed.clone();
        corrupted[i] ^= 0xff;
        let _ = decompress(&corrupted, Flags::STANDARD);
    }
    compressed.clear();
    let _ = decompress(&compressed, Flags::STANDARD);
}

#[test]
fn encoding_is_deterministic() {
    let data = b"determinism check determinism check determinism check";
    let (first, _) = compress(data, &EncoderConfig::default()).unwrap();
    let (second, _) = compress(data, &EncoderConfig::default()).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn proptest_roundtrip_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 1..4096)) {
        let (compressed, _stats) = compress(&data, &EncoderConfig::default()).unwrap();
        let decompressed = decompress(&compressed, Flags::STANDARD).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    #[test]
    fn proptest_roundtrip_match_heavy_bytes(
        seed in proptest::collection::vec(0u8..4, 1..1024),
        reps in 1usize..8,
    ) {
        // A small alphabet repeated drives up match density, exercising the
        // long/short/rep/nibble match paths far more than uniform bytes do.
        let mut data = Vec::new();
        for _ in 0..reps {
            data.extend_from_slice(&seed);
        }
        let (compressed, _stats) = compress(&data, &EncoderConfig::default()).unwrap();
        let decompressed = decompress(&compressed, Flags::STANDARD).unwrap();
        prop_assert_eq!(decompressed, data);
    }

    #[test]
    fn proptest_max_decompressed_size_agrees_with_decompress(
        data in proptest::collection::vec(any::<u8>(), 1..2048)
    ) {
        let (compressed, _stats) = compress(&data, &EncoderConfig::default()).unwrap();
        let expected = max_decompressed_size(&compressed, Flags::STANDARD).unwrap();
        let decompressed = decompress(&compressed, Flags::STANDARD).unwrap();
        prop_assert_eq!(expected, decompressed.len());
    }

    #[test]
    fn proptest_corrupted_input_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = decompress(&data, Flags::STANDARD);
    }
}
