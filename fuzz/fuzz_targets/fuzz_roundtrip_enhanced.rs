#![no_main]
use libfuzzer_sys::fuzz_target;

use aplib::block::{compress, decompress, EncoderConfig, Flags};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let config = EncoderConfig {
        enhanced: true,
        ..EncoderConfig::default()
    };
    let (compressed, _stats) = compress(data, &config).unwrap();
    let decompressed = decompress(&compressed, Flags::ENHANCED).unwrap();
    assert_eq!(data, &decompressed[..]);
});
