//! Streaming Huffman decoder.
//!
//! The decoder keeps three pieces of state between calls: the tree node it is
//! standing on, a 32-bit accumulator of input bits, and how many of the
//! accumulator's low bits are still unconsumed. Input is shifted in a whole
//! byte at a time; symbols are drained `tree_shift` bits per lookup. A codeword
//! that straddles two `decode` calls simply resumes from the saved node.
//!
//! # Flow Control
//!
//! Running out of input and running out of output space are not errors. Both
//! show up in the `(written, consumed)` counts returned by [`Decoder::decode`].
//!
//! # Alignment
//!
//! Consuming bits only shrinks the valid count; the accumulator word keeps its
//! old high bits. [`Decoder::aligned`] tests the whole word against zero, so it
//! reports true only when every byte still inside the word was zero.
//!
//! # Thread Safety
//!
//! A `Decoder` is per-stream mutable state. The `Coding` it borrows is
//! immutable and may be shared by decoders on other threads.

use log::{debug, trace};

use crate::coding::{descend, Coding, Step};
use crate::error::{HuffmanError, Result};

/// Width of the bit accumulator.
const HELD_CAPACITY: u8 = 32;

/// Incremental decoder bound to one [`Coding`].
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    coding: &'a Coding,
    /// Current node in `coding.tree_nodes()`
    tree_index: usize,
    /// Recently shifted-in input, valid bits right-justified
    held_bits: u32,
    /// Unconsumed low bits of `held_bits` (0-32)
    held_count: u8,
}

impl<'a> Decoder<'a> {
    /// Create a decoder positioned at the root with an empty accumulator.
    pub fn new(coding: &'a Coding) -> Self {
        Self {
            coding,
            tree_index: coding.tree_index_start(),
            held_bits: 0,
            held_count: 0,
        }
    }

    /// The table this decoder reads.
    pub fn coding(&self) -> &'a Coding {
        self.coding
    }

    /// Drain symbols from the accumulator into `dst`.
    ///
    /// Stops when `dst` is full or the next lookup needs more bits than are
    /// held. Returns the number of bytes written.
    fn write_symbols_to(&mut self, dst: &mut [u8]) -> Result<usize> {
        let tree_nodes = self.coding.tree_nodes();
        let tree_shift = self.coding.tree_shift();
        let mask = self.coding.selector_mask();
        let mut dn = 0;

        while dn < dst.len() && self.held_count > 0 {
            // Short buffers are padded with low zero bits; consume_bits says
            // how many of them the lookup actually relied on.
            let selector = if self.held_count >= tree_shift {
                (self.held_bits >> (self.held_count - tree_shift)) & mask
            } else {
                (self.held_bits << (tree_shift - self.held_count)) & mask
            };

            let pointer = tree_nodes[self.tree_index].child(selector).ok_or(
                HuffmanError::UnassignedPointer {
                    node: self.tree_index,
                    selector,
                },
            )?;

            if pointer.consume_bits > self.held_count {
                break;
            }

            self.held_count -= pointer.consume_bits;
            match pointer.step {
                Step::Descend(offset) => {
                    self.tree_index = descend(self.tree_index, offset);
                }
                Step::Return(symbol) => {
                    dst[dn] = symbol;
                    dn += 1;
                    self.tree_index = self.coding.tree_index_start();
                }
            }
        }

        Ok(dn)
    }

    /// Decode from `src` into `dst`, stopping when no further input can be
    /// consumed or no further output can be written.
    ///
    /// Returns `(written, consumed)`: bytes written to `dst` and bytes read
    /// from `src`. Unread input must be passed again on the next call.
    ///
    /// # Errors
    /// `HuffmanError::UnassignedPointer` if the input walks into a table slot
    /// no codeword reaches. Bytes written before the failure are left in
    /// `dst`; the decoder is not repaired and should be discarded.
    pub fn decode(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(usize, usize)> {
        let mut dn = 0;
        let mut sn = 0;

        loop {
            if dn == dst.len() {
                return Ok((dn, sn));
            }
            dn += self.write_symbols_to(&mut dst[dn..])?;

            if sn == src.len() {
                return Ok((dn, sn));
            }
            while sn < src.len() && HELD_CAPACITY - self.held_count >= 8 {
                self.held_bits = self.held_bits << 8 | u32::from(src[sn]);
                self.held_count += 8;
                sn += 1;
            }
        }
    }

    /// Returns true iff the raw accumulator word is zero.
    ///
    /// After the last symbol of a zero-padded stream this means no stray set
    /// bits remain. Stale bits from earlier bytes count too.
    pub fn aligned(&self) -> bool {
        self.held_bits == 0
    }

    /// Write any symbols resolvable from already buffered bits into `dst`.
    ///
    /// Returns the number of bytes written and whether the stream is
    /// finished, as reported by [`Decoder::aligned`].
    pub fn flush(&mut self, dst: &mut [u8]) -> Result<(usize, bool)> {
        let dn = self.write_symbols_to(dst)?;
        Ok((dn, self.aligned()))
    }
}

/// Decode exactly `symbol_count` symbols from a complete encoded buffer.
///
/// Zero padding can itself decode as symbols, so the count has to come from
/// the caller.
///
/// # Errors
/// - `HuffmanError::LengthMismatch` if `src` runs out first
/// - `HuffmanError::UnassignedPointer` if `src` is not valid for `coding`
pub fn decode_exact(coding: &Coding, src: &[u8], symbol_count: usize) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(coding);
    let mut output = vec![0u8; symbol_count];

    let (written, consumed) = decoder.decode(&mut output, src)?;
    let (flushed, finished) = decoder.flush(&mut output[written..])?;
    let total = written + flushed;

    trace!(
        "decode_exact: {} of {} input bytes -> {} symbols",
        consumed,
        src.len(),
        total
    );

    if total != symbol_count {
        return Err(HuffmanError::LengthMismatch {
            expected: symbol_count,
            actual: total,
        }
        .into());
    }

    if !finished {
        debug!(
            "stream not aligned after {} symbols ({} input bytes unread)",
            total,
            src.len() - consumed
        );
    }

    Ok(output)
}
