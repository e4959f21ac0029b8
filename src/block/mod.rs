/*!

An aPLib-compatible block codec: a Lempel-Ziv compressor/decompressor built
around a bit-packed token stream. Unlike the byte-oriented LZ4 block format,
every token in this grammar is a variable number of *bits*, so the central
abstraction here is [`bits::BitReader`]/[`bits::BitWriter`] rather than a
byte-aligned token.

# Wire format

```text
token := '0' literal_byte                                    (Literal)
       | '10' gamma2(hi) [byte(lo)]  gamma2(matchLen)         (LongMatch or RepMatch)
       | '110' byte(cmd)                                      (ShortMatch or EOD)
       | '111' bit bit bit bit                                (NibbleMatch)
```

Bits are packed MSB-first within each byte. The stream carries no header, no
magic, and no checksum: the first output byte is always a raw literal copied
verbatim, after which tokens are parsed until the end-of-data command
(`'110'` followed by a zero command byte) is reached.

# Glossary

- **Gamma2** -- the interleaved Elias-gamma-like variable-length integer code
  used here, with two polarity variants (standard / enhanced) and a
  byte-swap rule in enhanced mode for values >= 256.
- **FollowsLiteral** -- a one-bit context, true immediately after emitting a
  literal or nibble-match, false after any long-match/rep-match/short-match.
  Affects the long-match offset bias and gates rep-match availability.
- **LastOffset** -- the offset of the most recently emitted non-nibble
  match, used by rep-match.
- **RepMatch** -- a long-match-prefixed token that, when FollowsLiteral is
  true and the gamma2 high value is 2, reuses LastOffset instead of reading
  a new one.
- **NibbleMatch** -- a 4-bit-offset single-byte copy token, with offset 0
  reserved to emit a literal zero byte.
- **EOD** -- end-of-data token, encoded as the short-match prefix `110`
  followed by the command byte `0x00`.
- **Window** -- encoder-side bound on the maximum offset it may choose; not
  part of the wire format.
*/

pub mod bits;
pub mod compress;
pub mod cost;
pub mod decompress;
pub mod matchfinder;
pub mod stats;
pub mod token;

use alloc::vec::Vec;
use core::fmt;

pub use compress::{compress, compress_into, EncoderConfig};
pub use decompress::{decompress, decompress_into, max_decompressed_size};
pub use stats::EncodeStats;

/// Offset at (or above) which a long match implicitly requires one extra
/// byte of length (the decoder adds it back after the gamma2 length read).
pub const MINMATCH3_OFFSET: u32 = 1280;

/// Offset at (or above) which a long match implicitly requires two extra
/// bytes of length on top of [`MINMATCH3_OFFSET`]'s bump.
pub const MINMATCH4_OFFSET: u32 = 32000;

/// Smallest window the encoder will accept.
pub const MIN_WINDOW_SIZE: usize = 16;

/// Largest window the encoder will accept.
pub const MAX_WINDOW_SIZE: usize = 2_097_152;

/// Runtime format variant. Only one bit is defined: [`Flags::enhanced`].
///
/// This is *not* a bitmask integer on purpose: only one recognized bit
/// exists, and an open-ended bitmask would let callers pass nonsensical
/// combinations the format has no meaning for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Selects the enhanced (3-register, swapped gamma polarity) variant
    /// targeted at 8-bit microprocessors. Not self-describing: the decoder
    /// must be told which variant was used to encode a given stream.
    pub enhanced: bool,
}

impl Flags {
    pub const STANDARD: Flags = Flags { enhanced: false };
    pub const ENHANCED: Flags = Flags { enhanced: true };
}

/// Upper bound on the compressed size of an `n`-byte input.
///
/// Covers the worst case of every byte becoming its own literal (9 bits
/// each), plus the initial raw literal, the EOD token, and final bit
/// register flush padding.
#[inline]
pub fn max_compressed_size(n: usize) -> usize {
    n + n / 8 + 16
}

/// Errors produced while decoding a compressed stream.
///
/// The decoder never partially trusts its input: any of these indicates the
/// caller must discard whatever was written to the output buffer so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressError {
    /// The compressed input was empty; there is no initial literal to copy.
    EmptyInput,
    /// The bit or byte stream ended before a token could be fully parsed.
    ExpectedAnotherByte,
    /// A match's source position would read before the start of the output
    /// buffer (offset larger than the number of bytes decoded so far).
    OffsetOutOfBounds,
    /// The declared output capacity is too small for the decompressed data.
    OutputTooSmall,
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompressError::EmptyInput => f.write_str("compressed input is empty"),
            DecompressError::ExpectedAnotherByte => {
                f.write_str("expected another byte, found none")
            }
            DecompressError::OffsetOutOfBounds => {
                f.write_str("match offset is not contained in the decompressed buffer")
            }
            DecompressError::OutputTooSmall => {
                f.write_str("output buffer is too small for the decompressed data")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

/// Errors produced while encoding an input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// The caller-provided output capacity was too small for the worst-case
    /// (or even the actual) compressed size.
    OutputTooSmall,
    /// `max_window_size` was outside `16..=2_097_152`.
    InvalidWindow,
    /// An internal encoder invariant was violated. Never triggered by valid
    /// input; indicates a bug in the parser or cost model.
    Internal,
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::OutputTooSmall => {
                f.write_str("output buffer is too small for the compressed data")
            }
            CompressError::InvalidWindow => {
                f.write_str("max_window_size must be between 16 and 2097152")
            }
            CompressError::Internal => f.write_str("internal encoder invariant violated"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CompressError {}

/// A bounds-checked write target for the codec, whether the backing store
/// is a pre-sized `Vec` or a caller-owned slice.
///
/// Compression and decompression both write strictly left-to-right; `Sink`
/// centralizes the bounds checks so neither direction can write past the
/// declared output capacity.
pub struct Sink<'a> {
    output: &'a mut [u8],
    pos: usize,
}

impl<'a> From<&'a mut Vec<u8>> for Sink<'a> {
    fn from(vec: &'a mut Vec<u8>) -> Self {
        Sink { output: vec, pos: 0 }
    }
}

impl<'a> From<&'a mut [u8]> for Sink<'a> {
    fn from(output: &'a mut [u8]) -> Self {
        Sink { output, pos: 0 }
    }
}

impl<'a> Sink<'a> {
    #[inline]
    pub(crate) fn push(&mut self, byte: u8) -> Result<(), ()> {
        let dst = self.output.get_mut(self.pos).ok_or(())?;
        *dst = byte;
        self.pos += 1;
        Ok(())
    }

    /// Pushes a placeholder byte and returns its position, so a caller can
    /// come back and fill in the real value once it's known. Used to lay
    /// down a tag byte's slot before the data bytes its bits control are
    /// written, without yet knowing the tag byte's final contents.
    #[inline]
    pub(crate) fn reserve_byte(&mut self) -> Result<usize, ()> {
        let idx = self.pos;
        self.push(0)?;
        Ok(idx)
    }

    /// Overwrites a previously reserved byte position. Does not move `pos`.
    #[inline]
    pub(crate) fn patch_byte(&mut self, idx: usize, byte: u8) -> Result<(), ()> {
        let dst = self.output.get_mut(idx).ok_or(())?;
        *dst = byte;
        Ok(())
    }

    #[inline]
    pub(crate) fn extend_from_slice(&mut self, data: &[u8]) -> Result<(), ()> {
        let dst = self
            .output
            .get_mut(self.pos..self.pos + data.len())
            .ok_or(())?;
        dst.copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    /// Copies `len` bytes from `self.output[pos - offset..]` to the current
    /// write position, byte by byte, so that `offset < len` correctly
    /// replicates the run-length-extension behavior LZ77-style formats
    /// require (e.g. offset 1 replicates the last byte `len` times).
    #[inline]
    pub(crate) fn copy_match(&mut self, offset: usize, len: usize) -> Result<(), DecompressError> {
        if offset == 0 || offset > self.pos {
            return Err(DecompressError::OffsetOutOfBounds);
        }
        if self.pos + len > self.output.len() {
            return Err(DecompressError::OutputTooSmall);
        }
        let mut src = self.pos - offset;
        let mut dst = self.pos;
        for _ in 0..len {
            self.output[dst] = self.output[src];
            src += 1;
            dst += 1;
        }
        self.pos = dst;
        Ok(())
    }

    #[inline]
    pub fn get_data(&self) -> &[u8] {
        &self.output[..self.pos]
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.output.len()
    }
}

#[test]
fn test_sink_push_and_copy() {
    let mut data = alloc::vec![0u8; 8];
    let mut sink: Sink = (&mut data[..]).into();
    sink.push(b'A').unwrap();
    sink.push(b'B').unwrap();
    assert_eq!(sink.get_data(), b"AB");
    sink.copy_match(1, 5).unwrap();
    assert_eq!(sink.get_data(), b"ABBBBBB");
}

#[test]
fn test_sink_bounds() {
    let mut data = alloc::vec![0u8; 2];
    let mut sink: Sink = (&mut data[..]).into();
    sink.push(1).unwrap();
    sink.push(2).unwrap();
    assert!(sink.push(3).is_err());
}
