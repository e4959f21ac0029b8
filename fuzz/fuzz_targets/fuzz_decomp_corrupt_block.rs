#![no_main]
use libfuzzer_sys::fuzz_target;

use aplib::block::{compress, decompress, EncoderConfig, Flags};

fuzz_target!(|input: (Vec<u8>, usize, u8)| {
    let (data, flip_pos, flip_mask) = input;
    if data.is_empty() {
        return;
    }
    let (mut compressed, _stats) = compress(&data, &EncoderConfig::default()).unwrap();
    if !compressed.is_empty() {
        let idx = flip_pos % compressed.len();
        compressed[idx] ^= flip_mask;
    }
    // a single-bit corruption must never panic, only ever error or (rarely)
    // decode to something other than the original data
    let _ = decompress(&compressed, Flags::STANDARD);
});
