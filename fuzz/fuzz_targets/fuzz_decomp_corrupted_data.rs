#![no_main]
use libfuzzer_sys::fuzz_target;

use aplib::block::{decompress, Flags};

fuzz_target!(|data: &[u8]| {
    // should not panic, regardless of flags
    let _ = decompress(data, Flags::STANDARD);
    let _ = decompress(data, Flags::ENHANCED);
});
