//! Crate-level smoke tests exercising the public re-exports in `lib.rs`,
//! as distinct from the unit tests colocated in each `block` submodule.

use crate::{compress, decompress, max_compressed_size, CompressError, EncoderConfig, Flags};

fn roundtrip(data: &[u8]) {
    let (compressed, _stats) = compress(data, &EncoderConfig::default()).unwrap();
    more_asserts::assert_le!(compressed.len(), max_compressed_size(data.len()));
    let out = decompress(&compressed, Flags::STANDARD).unwrap();
    assert_eq!(out, data);
}

#[test]
fn public_api_roundtrips_plain_text() {
    roundtrip(b"To cute to die! Save the red panda!");
}

#[test]
fn public_api_roundtrips_structured_text() {
    roundtrip(
        br#"An iterator that knows its exact length.
        Many Iterators don't know how many times they will iterate, but some do.
        If an iterator knows how many times it can iterate, providing access to
        that information can be useful."#,
    );
}

#[test]
fn public_api_roundtrips_binary_data() {
    let data: Vec<u8> = (0u32..4096).map(|i| (i % 251) as u8).collect();
    roundtrip(&data);
}

#[test]
fn public_api_reports_invalid_window() {
    let config = EncoderConfig {
        max_window_size: 2,
        ..EncoderConfig::default()
    };
    assert_eq!(
        compress(b"data", &config).unwrap_err(),
        CompressError::InvalidWindow
    );
}
