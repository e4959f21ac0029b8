#![no_main]
use libfuzzer_sys::fuzz_target;

use aplib::block::{compress, decompress, EncoderConfig, Flags};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let (compressed, _stats) = compress(data, &EncoderConfig::default()).unwrap();
    let decompressed = decompress(&compressed, Flags::STANDARD).unwrap();
    assert_eq!(data, &decompressed[..]);
});
