//! Codeword packing for the canonical encoder.
//!
//! [`Codebook::encode`](crate::codebook::Codebook::encode) appends each
//! symbol's codeword here, highest code bit first. A byte is complete once
//! eight bits land in it, and its first bit is the first one the decoder
//! shifts into its accumulator. The stream ends on a byte boundary: the last
//! byte is filled out with zero bits, which the decoder will read as more
//! input, so callers keep the symbol count next to the bytes.
//!
//! ```
//! use huffstream_core::bitio::BitWriter;
//!
//! // Codewords 0, 0, 10 occupy the top four bits of a single byte
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b0, 1).unwrap();
//! writer.write_bits(0b0, 1).unwrap();
//! writer.write_bits(0b10, 2).unwrap();
//! assert_eq!(writer.bit_len(), 4);
//!
//! assert_eq!(writer.finish(), vec![0b0010_0000]);
//! ```

use crate::error::{BitIoError, Result};

/// Growable bit sink producing the encoded stream.
///
/// Unfinished bits wait in `bit_buffer`, filled from its high end; every
/// bit below the first `bit_count` stays zero, so [`finish`](Self::finish)
/// can emit the partial byte as is.
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// Empty writer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Empty writer with room for `bytes` output bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// Codewords are at most 32 bits, but any count up to 64 is accepted.
    ///
    /// # Errors
    /// `BitIoError::InvalidBitCount` if `count` is above 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let room = 8 - self.bit_count as usize;
            let take = remaining.min(room);

            // Top `take` of the remaining bits
            let shift = remaining - take;
            let bits = ((value >> shift) & ((1u64 << take) - 1)) as u8;

            self.bit_buffer |= bits << (room - take);
            self.bit_count += take as u8;

            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            remaining = shift;
        }

        Ok(())
    }

    /// Consume the writer and return the stream, zero-filled to a whole byte.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        self.bytes
    }

    /// Bits written so far, before any zero fill.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_single_byte() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b10110011, 8).unwrap();
        assert_eq!(writer.finish(), vec![0b10110011]);
    }

    #[test]
    fn test_partial_bits_are_zero_padded() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.bit_len(), 5);
        assert_eq!(writer.finish(), vec![0b10111000]);
    }

    #[test]
    fn test_code_straddles_byte_boundary() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b111111, 6).unwrap();
        writer.write_bits(0b0101, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b11111101, 0b01000000]);
    }

    #[test]
    fn test_ignores_bits_above_count() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 2).unwrap();
        assert_eq!(writer.finish(), vec![0b11000000]);
    }

    #[test]
    fn test_64_bit_value() {
        let mut writer = BitWriter::new();
        writer.write_bits(0x123456789ABCDEF0, 64).unwrap();
        assert_eq!(
            writer.finish(),
            vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0]
        );
    }

    #[test]
    fn test_zero_bits_writes_nothing() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFF, 0).unwrap();
        assert_eq!(writer.bit_len(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn test_invalid_bit_count() {
        let mut writer = BitWriter::new();
        assert!(writer.write_bits(0, 65).is_err());
    }
}
