/*! Pure Rust implementation of an aPLib-compatible byte-stream compressor
and decompressor.

This is a Lempel-Ziv codec with a bit-packed token stream rather than a
byte-aligned one: tokens are literals, short/long/rep matches, or 4-bit
"nibble" matches for the shortest back-references, see [`block`] for the
format. The decoder is bounds-checked against arbitrary input; there is no
`unsafe` anywhere in this crate.

# Examples
```
use aplib::block::{compress, decompress, EncoderConfig, Flags};

let input: &[u8] = b"Hello people, what's up?";
let (compressed, _stats) = compress(input, &EncoderConfig::default()).unwrap();
let decompressed = decompress(&compressed, Flags::STANDARD).unwrap();
assert_eq!(input, &decompressed[..]);
```

# Feature Flags
`std` (default) adds `std::error::Error` impls for the error types; without
it the crate is `core`+`alloc` only.
*/

pub mod block;
#[cfg(test)]
mod tests;

pub use block::{
    compress, compress_into, decompress, decompress_into, max_compressed_size,
    max_decompressed_size, CompressError, DecompressError, EncoderConfig, Flags,
};
