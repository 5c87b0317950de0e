//! Canonical Huffman codebook built from per-symbol code lengths.
//!
//! Codes are assigned the DEFLATE way: symbols are ordered by (length,
//! symbol value) and receive consecutive code values, shifted left each time
//! the length grows. Two peers that agree on the lengths therefore agree on
//! every codeword, which is all a decode table needs.
//!
//! Lengths may describe an incomplete code (Kraft sum below one). The unused
//! part of the code space is always the all-ones end, so zero padding after
//! the last codeword never lands in it.

use crate::bitio::BitWriter;
use crate::error::{HuffmanError, Result};

/// Longest codeword the codebook accepts.
pub const MAX_CODE_LEN: u8 = 32;

/// Number of distinct byte symbols.
const SYMBOL_SPACE: usize = 256;

/// A single canonical codeword, right-justified in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeWord {
    pub bits: u32,
    pub len: u8,
}

/// Canonical prefix code over byte symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    /// Code length per symbol, 0 = absent (always 256 entries)
    lengths: Vec<u8>,
    /// Codeword per symbol
    codes: Vec<Option<CodeWord>>,
}

impl Codebook {
    /// Build the canonical code for the given lengths.
    ///
    /// `lengths[s]` is the code length of symbol `s`; symbols past the end of
    /// the slice are absent.
    ///
    /// # Errors
    /// - `HuffmanError::TooManySymbols` if more than 256 lengths are given
    /// - `HuffmanError::EmptyCodebook` if every length is zero
    /// - `HuffmanError::CodeLengthTooLong` if a length exceeds `MAX_CODE_LEN`
    /// - `HuffmanError::OverSubscribed` if the lengths overflow the code space
    pub fn from_lengths(lengths: &[u8]) -> Result<Self> {
        if lengths.len() > SYMBOL_SPACE {
            return Err(HuffmanError::TooManySymbols {
                count: lengths.len(),
            }
            .into());
        }

        let mut length_counts = [0u64; MAX_CODE_LEN as usize + 1];
        for (symbol, &length) in lengths.iter().enumerate() {
            if length > MAX_CODE_LEN {
                return Err(HuffmanError::CodeLengthTooLong {
                    symbol: symbol as u8,
                    length,
                    max: MAX_CODE_LEN,
                }
                .into());
            }
            if length > 0 {
                length_counts[length as usize] += 1;
            }
        }

        if length_counts.iter().all(|&count| count == 0) {
            return Err(HuffmanError::EmptyCodebook.into());
        }

        // Kraft check: `available` counts free codewords at the current length
        let mut available: u64 = 1;
        for length in 1..=MAX_CODE_LEN as usize {
            available <<= 1;
            if length_counts[length] > available {
                return Err(HuffmanError::OverSubscribed {
                    length: length as u8,
                }
                .into());
            }
            available -= length_counts[length];
        }

        // First code value of each length
        let mut next_code = [0u64; MAX_CODE_LEN as usize + 1];
        let mut code = 0u64;
        for length in 1..=MAX_CODE_LEN as usize {
            code = (code + length_counts[length - 1]) << 1;
            next_code[length] = code;
        }

        let mut padded = lengths.to_vec();
        padded.resize(SYMBOL_SPACE, 0);

        let codes = padded
            .iter()
            .map(|&length| {
                if length == 0 {
                    return None;
                }
                let slot = &mut next_code[length as usize];
                let bits = *slot as u32;
                *slot += 1;
                Some(CodeWord { bits, len: length })
            })
            .collect();

        Ok(Self {
            lengths: padded,
            codes,
        })
    }

    /// Codeword for `symbol`, if it has one.
    pub fn code(&self, symbol: u8) -> Option<CodeWord> {
        self.codes[symbol as usize]
    }

    /// Code length per symbol (256 entries, 0 = absent).
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Number of symbols that have a codeword.
    pub fn symbol_count(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }

    /// All assigned codewords in symbol order.
    pub fn codewords(&self) -> impl Iterator<Item = (u8, CodeWord)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|code| (symbol as u8, code)))
    }

    /// Encoded size of `symbols` in bits, excluding padding.
    pub fn encoded_bit_len(&self, symbols: &[u8]) -> Result<usize> {
        symbols.iter().try_fold(0usize, |total, &symbol| {
            let code = self
                .code(symbol)
                .ok_or(HuffmanError::UnknownSymbol(symbol))?;
            Ok(total + code.len as usize)
        })
    }

    /// Encode `symbols`, MSB-first, zero-padding the final byte.
    ///
    /// # Errors
    /// Returns `HuffmanError::UnknownSymbol` for a byte without a codeword.
    pub fn encode(&self, symbols: &[u8]) -> Result<Vec<u8>> {
        let mut writer = BitWriter::with_capacity(symbols.len());
        for &symbol in symbols {
            let code = self
                .code(symbol)
                .ok_or(HuffmanError::UnknownSymbol(symbol))?;
            writer.write_bits(code.bits as u64, code.len as usize)?;
        }
        Ok(writer.finish())
    }
}
