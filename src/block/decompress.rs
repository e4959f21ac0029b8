//! The decompression algorithm.
//!
//! Bounds-checked against both the input and the output buffer for *any*
//! byte sequence, including adversarial bit patterns: every read past the
//! input end, every write past the output capacity, and every match whose
//! source position would fall before the start of the output must fail
//! cleanly rather than corrupt memory. There is no `unsafe` anywhere in
//! this module.

use alloc::vec::Vec;

use super::bits::{BitReader, Channel};
use super::token::{decode_short_match, is_rep_match, long_match_min_bump, long_match_offset};
use super::{max_compressed_size, DecompressError, Flags, Sink};

/// A decode destination: either a real output buffer, or a counter used by
/// [`max_decompressed_size`] to dry-run the same bounds checks without
/// allocating or touching any backing bytes.
trait DecodeTarget {
    fn pos(&self) -> usize;
    fn push_literal(&mut self, byte: u8) -> Result<(), DecompressError>;
    fn push_zero(&mut self) -> Result<(), DecompressError>;
    fn copy_match(&mut self, offset: u32, len: u32) -> Result<(), DecompressError>;
}

impl<'a> DecodeTarget for Sink<'a> {
    #[inline]
    fn pos(&self) -> usize {
        Sink::pos(self)
    }

    #[inline]
    fn push_literal(&mut self, byte: u8) -> Result<(), DecompressError> {
        self.push(byte).map_err(|_| DecompressError::OutputTooSmall)
    }

    #[inline]
    fn push_zero(&mut self) -> Result<(), DecompressError> {
        self.push_literal(0)
    }

    #[inline]
    fn copy_match(&mut self, offset: u32, len: u32) -> Result<(), DecompressError> {
        Sink::copy_match(self, offset as usize, len as usize)
    }
}

/// A target that only tracks how many bytes *would* be written, performing
/// the same offset-validity checks without a backing buffer.
struct Counter(usize);

impl DecodeTarget for Counter {
    #[inline]
    fn pos(&self) -> usize {
        self.0
    }

    #[inline]
    fn push_literal(&mut self, _byte: u8) -> Result<(), DecompressError> {
        self.0 += 1;
        Ok(())
    }

    #[inline]
    fn push_zero(&mut self) -> Result<(), DecompressError> {
        self.0 += 1;
        Ok(())
    }

    #[inline]
    fn copy_match(&mut self, offset: u32, len: u32) -> Result<(), DecompressError> {
        if offset == 0 || offset as usize > self.0 {
            return Err(DecompressError::OffsetOutOfBounds);
        }
        self.0 += len as usize;
        Ok(())
    }
}

/// Runs the decode loop against any [`DecodeTarget`]; shared by the real
/// decoder and the dry-run size oracle so they can never disagree.
fn run<T: DecodeTarget>(input: &[u8], flags: Flags, target: &mut T) -> Result<(), DecompressError> {
    if input.is_empty() {
        return Err(DecompressError::EmptyInput);
    }
    let mut reader = BitReader::new(input, 0, flags.enhanced);
    // The first byte is always a raw literal, copied before any token.
    let first = reader.read_byte_raw()?;
    target.push_literal(first)?;

    let mut follows_literal = true;
    let mut last_offset: u32 = 1;

    loop {
        let bit0 = reader.read_bit(Channel::Cmd)?;
        if bit0 == 0 {
            // '0': literal
            let byte = reader.read_byte_raw()?;
            target.push_literal(byte)?;
            follows_literal = true;
            continue;
        }

        let bit1 = reader.read_bit(Channel::Cmd)?;
        if bit1 == 0 {
            // '10': long match or rep-match
            let hi = reader.read_gamma2(Channel::Gamma)?;
            let mut len_bias = 0u32;
            let rep = is_rep_match(follows_literal, hi);
            let offset = if rep {
                last_offset
            } else {
                let lo = reader.read_byte_raw()?;
                let offset = long_match_offset(hi, lo, follows_literal);
                if offset < 128 {
                    len_bias = 2;
                }
                offset
            };

            follows_literal = false;
            let mut len = reader.read_gamma2(Channel::Gamma)?;
            if !rep {
                len += long_match_min_bump(offset);
            }
            len += len_bias;

            target.copy_match(offset, len)?;
            last_offset = offset;
        } else {
            let bit2 = reader.read_bit(Channel::Cmd)?;
            if bit2 == 0 {
                // '110': short match or EOD
                let cmd = reader.read_byte_raw()?;
                match decode_short_match(cmd) {
                    None => return Ok(()), // EOD
                    Some((offset, len)) => {
                        follows_literal = false;
                        target.copy_match(offset, len)?;
                        last_offset = offset;
                    }
                }
            } else {
                // '111': nibble match
                let mut n = 0u32;
                for _ in 0..4 {
                    n = (n << 1) | reader.read_bit(Channel::Nibble)?;
                }
                if n == 0 {
                    target.push_zero()?;
                } else {
                    target.copy_match(n, 1)?;
                }
                follows_literal = true;
            }
        }
    }
}

/// Decompresses `input` into a caller-provided buffer of up to
/// `output.len()` bytes, returning the number of bytes written.
///
/// On any error, `output` may contain partially-written data; callers must
/// discard it rather than treat it as meaningful.
pub fn decompress_into(
    input: &[u8],
    output: &mut [u8],
    flags: Flags,
) -> Result<usize, DecompressError> {
    let mut sink: Sink = output.into();
    run(input, flags, &mut sink)?;
    Ok(sink.pos())
}

/// Decompresses `input`, allocating a `Vec` sized from
/// [`max_decompressed_size`].
pub fn decompress(input: &[u8], flags: Flags) -> Result<Vec<u8>, DecompressError> {
    let expected = max_decompressed_size(input, flags)?;
    let mut output = alloc::vec![0u8; expected];
    let n = decompress_into(input, &mut output, flags)?;
    output.truncate(n);
    Ok(output)
}

/// Parses `input` without writing any output, applying the same bounds
/// checks as a full decode, and returns the would-be decompressed length.
/// Agrees with a successful full decode on the same input.
pub fn max_decompressed_size(input: &[u8], flags: Flags) -> Result<usize, DecompressError> {
    let mut counter = Counter(0);
    run(input, flags, &mut counter)?;
    Ok(counter.0)
}

#[allow(dead_code)]
fn _worst_case_bound_sanity(n: usize) -> usize {
    // max_compressed_size is only used by the encoder, but referencing it
    // here keeps the import used under `cfg(test)`-free builds that don't
    // otherwise touch compression.
    max_compressed_size(n)
}
