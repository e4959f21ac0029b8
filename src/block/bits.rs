//! Bit-level I/O and the gamma2 variable-length integer code.
//!
//! The stream is byte-addressable; bits are packed MSB-first inside each
//! byte. Standard mode shares a single bit register across every read;
//! enhanced mode keeps three independent registers (one for command-prefix
//! bits, one for gamma integers, one for nibble-match bits), each refilling
//! independently from the same underlying byte cursor. This is modeled as a
//! distinct channel selector rather than a single register "upgraded" with
//! conditionals, so the two modes can never accidentally share state they
//! shouldn't.

use super::{DecompressError, Sink};

/// Selects which of the (up to three) bit registers a read or write uses.
/// In standard mode all three channels share register 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Cmd = 0,
    Gamma = 1,
    Nibble = 2,
}

#[derive(Debug, Default, Clone, Copy)]
struct BitReg {
    buf: u8,
    count: u8,
}

/// Reads single bits and gamma2 integers from a byte-addressable stream.
pub struct BitReader<'a> {
    input: &'a [u8],
    pos: usize,
    enhanced: bool,
    regs: [BitReg; 3],
}

impl<'a> BitReader<'a> {
    /// Creates a reader starting at byte offset `pos` of `input`.
    pub fn new(input: &'a [u8], pos: usize, enhanced: bool) -> Self {
        BitReader {
            input,
            pos,
            enhanced,
            regs: [BitReg::default(); 3],
        }
    }

    #[inline]
    fn reg_index(&self, channel: Channel) -> usize {
        if self.enhanced {
            channel as usize
        } else {
            0
        }
    }

    /// Current byte cursor. Only meaningful between tokens (registers may
    /// hold buffered bits that have already consumed bytes ahead of this).
    #[inline]
    pub fn byte_pos(&self) -> usize {
        self.pos
    }

    /// Reads one raw (non-bit-packed) byte directly from the stream,
    /// independent of any bit register. Used for literal bytes, the low
    /// byte of a long-match offset, and short-match/EOD command bytes.
    #[inline]
    pub fn read_byte_raw(&mut self) -> Result<u8, DecompressError> {
        let b = *self
            .input
            .get(self.pos)
            .ok_or(DecompressError::ExpectedAnotherByte)?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    pub fn has_more_bytes(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Reads a single bit (0 or 1) from the given channel's register,
    /// refilling it from the next input byte if it is empty.
    #[inline]
    pub fn read_bit(&mut self, channel: Channel) -> Result<u32, DecompressError> {
        let idx = self.reg_index(channel);
        if self.regs[idx].count == 0 {
            let byte = *self
                .input
                .get(self.pos)
                .ok_or(DecompressError::ExpectedAnotherByte)?;
            self.pos += 1;
            self.regs[idx].buf = byte;
            self.regs[idx].count = 8;
        }
        let reg = &mut self.regs[idx];
        let bit = (reg.buf & 0x80 != 0) as u32;
        reg.buf <<= 1;
        reg.count -= 1;
        Ok(bit)
    }

    /// Reads a gamma2-coded integer (always >= 2) from the given channel.
    ///
    /// In enhanced mode, once the value being accumulated reaches 256 or
    /// more, the partial value is saved as the low byte and accumulation
    /// restarts for the upper bits, so the split falls naturally out of the
    /// same loop that handles small values, without a separate encoding
    /// path.
    #[inline]
    pub fn read_gamma2(&mut self, channel: Channel) -> Result<u32, DecompressError> {
        let mut v: u32 = 1;
        let mut saved: u32 = 0;
        if !self.enhanced {
            loop {
                let bit = self.read_bit(channel)?;
                v = (v << 1) | bit;
                let cont = self.read_bit(channel)?;
                if cont == 0 {
                    break;
                }
            }
        } else {
            loop {
                if saved == 0 && v >= 256 {
                    saved = v;
                    v = 1;
                }
                let bit = self.read_bit(channel)?;
                v = (v << 1) | bit;
                let cont = self.read_bit(channel)?;
                if cont != 0 {
                    break;
                }
            }
            if saved != 0 {
                v = (v << 8) | (saved & 0xff);
            }
        }
        Ok(v)
    }
}

/// A bit register together with the sink position of the tag byte it will
/// eventually produce. The slot is reserved the moment the register starts
/// filling, so the tag byte physically precedes the raw bytes its bits
/// control -- matching what `BitReader` expects to find when it fetches a
/// fresh tag byte from the same cursor `read_byte_raw` advances.
#[derive(Debug, Default, Clone, Copy)]
struct WriteReg {
    buf: u8,
    count: u8,
    slot: Option<usize>,
}

/// Writes single bits and gamma2 integers to a byte-addressable sink.
pub struct BitWriter {
    enhanced: bool,
    regs: [WriteReg; 3],
}

impl BitWriter {
    pub fn new(enhanced: bool) -> Self {
        BitWriter {
            enhanced,
            regs: [WriteReg::default(); 3],
        }
    }

    #[inline]
    fn reg_index(&self, channel: Channel) -> usize {
        if self.enhanced {
            channel as usize
        } else {
            0
        }
    }

    #[inline]
    pub fn write_bit(&mut self, sink: &mut Sink, channel: Channel, bit: u8) -> Result<(), ()> {
        let idx = self.reg_index(channel);
        if self.regs[idx].count == 0 {
            let slot = sink.reserve_byte()?;
            self.regs[idx].slot = Some(slot);
        }
        let reg = &mut self.regs[idx];
        reg.buf = (reg.buf << 1) | (bit & 1);
        reg.count += 1;
        if reg.count == 8 {
            let byte = reg.buf;
            let slot = reg.slot.take().expect("slot reserved when register started filling");
            reg.buf = 0;
            reg.count = 0;
            sink.patch_byte(slot, byte)?;
        }
        Ok(())
    }

    #[inline]
    pub fn write_byte_raw(&mut self, sink: &mut Sink, byte: u8) -> Result<(), ()> {
        sink.push(byte)
    }

    /// Writes the "plain" gamma encoding of `v` (no enhanced byte-swap):
    /// the bits of `v` above the implicit leading one, MSB first, each
    /// followed by a continuation bit in the mode's polarity.
    fn write_plain_gamma(&mut self, sink: &mut Sink, channel: Channel, v: u32) -> Result<(), ()> {
        debug_assert!(v >= 2);
        let explicit_bits = 31 - v.leading_zeros();
        for i in (0..explicit_bits).rev() {
            let bit = ((v >> i) & 1) as u8;
            self.write_bit(sink, channel, bit)?;
            let more_follows = i > 0;
            let cont_bit = if self.enhanced {
                // enhanced polarity: 0 = continue, 1 = stop
                if more_follows {
                    0
                } else {
                    1
                }
            } else {
                // standard polarity: 1 = continue, 0 = stop
                more_follows as u8
            };
            self.write_bit(sink, channel, cont_bit)?;
        }
        Ok(())
    }

    /// Writes `v` (>= 2) as a gamma2 integer on the given channel.
    pub fn write_gamma2(&mut self, sink: &mut Sink, channel: Channel, v: u32) -> Result<(), ()> {
        debug_assert!(v >= 2);
        if self.enhanced && v >= 512 {
            let lo = (v & 0xff) as u8;
            let upper = v >> 8;
            for i in (0..8).rev() {
                let bit = (lo >> i) & 1;
                self.write_bit(sink, channel, bit)?;
                // always "continue": more bits (the upper part) follow.
                self.write_bit(sink, channel, 0)?;
            }
            self.write_plain_gamma(sink, channel, upper)
        } else {
            self.write_plain_gamma(sink, channel, v)
        }
    }

    /// Backfills any partially-filled bit registers' already-reserved tag
    /// slots, padding the low (as-yet-unwritten) bits of each byte with
    /// zeros. Must be called exactly once, after the EOD token has been
    /// written.
    pub fn finalize(&mut self, sink: &mut Sink) -> Result<(), ()> {
        // Flush in a fixed, deterministic order so output is reproducible
        // across platforms regardless of which channels were touched.
        for idx in 0..3 {
            let reg = &mut self.regs[idx];
            if reg.count > 0 {
                let byte = reg.buf << (8 - reg.count);
                let slot = reg.slot.take().expect("slot reserved when register started filling");
                reg.buf = 0;
                reg.count = 0;
                sink.patch_byte(slot, byte)?;
            }
            if !self.enhanced {
                // only one logical register exists; don't flush it 3 times.
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn roundtrip_gamma2(values: &[u32], enhanced: bool) {
        let mut buf = alloc::vec![0u8; 4096];
        let mut writer = BitWriter::new(enhanced);
        {
            let mut sink: Sink = (&mut buf[..]).into();
            for &v in values {
                writer.write_gamma2(&mut sink, Channel::Gamma, v).unwrap();
            }
            writer.finalize(&mut sink).unwrap();
        }
        let mut reader = BitReader::new(&buf, 0, enhanced);
        for &v in values {
            assert_eq!(reader.read_gamma2(Channel::Gamma).unwrap(), v);
        }
    }

    #[test]
    fn gamma2_standard_roundtrip() {
        roundtrip_gamma2(&[2, 3, 4, 7, 8, 255, 256, 257, 511, 512, 513, 65535, 65536, 1_000_000], false);
    }

    #[test]
    fn gamma2_enhanced_roundtrip() {
        roundtrip_gamma2(&[2, 3, 4, 7, 8, 255, 256, 257, 511, 512, 513, 65535, 65536, 1_000_000], true);
    }

    #[test]
    fn gamma2_enhanced_crossing_values() {
        // values right around the 256/512 byte-swap boundary
        roundtrip_gamma2(&[254, 255, 256, 257, 300, 400, 510, 511, 512, 513, 700], true);
    }

    #[test]
    fn bit_reader_refills_msb_first() {
        let data = [0b1010_0110u8];
        let mut r = BitReader::new(&data, 0, false);
        let bits: Vec<u32> = (0..8).map(|_| r.read_bit(Channel::Cmd).unwrap()).collect();
        assert_eq!(bits, vec![1, 0, 1, 0, 0, 1, 1, 0]);
    }

    #[test]
    fn bit_reader_out_of_input_errors() {
        let data: [u8; 0] = [];
        let mut r = BitReader::new(&data, 0, false);
        assert!(r.read_bit(Channel::Cmd).is_err());
    }

    #[test]
    fn enhanced_channels_are_independent() {
        let mut buf = alloc::vec![0u8; 64];
        let mut writer = BitWriter::new(true);
        {
            let mut sink: Sink = (&mut buf[..]).into();
            // interleave writes on two channels; each should refill from
            // its own register, consuming bytes in call order.
            writer.write_bit(&mut sink, Channel::Cmd, 1).unwrap();
            writer.write_bit(&mut sink, Channel::Nibble, 0).unwrap();
            for _ in 0..7 {
                writer.write_bit(&mut sink, Channel::Cmd, 0).unwrap();
            }
            for _ in 0..7 {
                writer.write_bit(&mut sink, Channel::Nibble, 1).unwrap();
            }
            writer.finalize(&mut sink).unwrap();
        }
        let mut reader = BitReader::new(&buf, 0, true);
        let cmd_bits: Vec<u32> = (0..8).map(|_| reader.read_bit(Channel::Cmd).unwrap()).collect();
        assert_eq!(cmd_bits, vec![1, 0, 0, 0, 0, 0, 0, 0]);
        let nib_bits: Vec<u32> = (0..8).map(|_| reader.read_bit(Channel::Nibble).unwrap()).collect();
        assert_eq!(nib_bits, vec![0, 1, 1, 1, 1, 1, 1, 1]);
    }
}
