//! Error types for huffstream.
//!
//! Flow control ("need more input", "output full") is never an error: it is
//! reported through the byte counts returned by the decoder. The variants here
//! cover malformed code descriptions, corrupt decode tables and the encoder's
//! bit writer.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: writing bits into byte buffers
/// - Huffman: codebook construction, encoding, and decode-time table faults
/// - Coding: decode table construction and packed table loading
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., writing more than 64 bits at once)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Huffman codec error (e.g., unknown symbol, unassigned table slot)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// Decode table error (e.g., bad tree shift, corrupt packed table)
    #[error("coding table error: {0}")]
    Coding(#[from] CodingError),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Invalid bit count (more than 64 bits in one call)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// No symbol has a nonzero code length
    #[error("empty codebook: no symbol has a nonzero code length")]
    EmptyCodebook,

    /// More code lengths than there are byte symbols
    #[error("too many symbols: {count} code lengths given, at most 256 allowed")]
    TooManySymbols { count: usize },

    /// Code length exceeds the supported maximum
    #[error("code length {length} for symbol {symbol} exceeds maximum {max}")]
    CodeLengthTooLong { symbol: u8, length: u8, max: u8 },

    /// Code lengths describe more codewords than fit (Kraft sum above one)
    #[error("over-subscribed code lengths: codewords of length {length} overflow the code space")]
    OverSubscribed { length: u8 },

    /// Encoder was given a byte that has no codeword
    #[error("symbol {0:#04x} has no codeword in this codebook")]
    UnknownSymbol(u8),

    /// Decoding reached a table slot that no codeword leads to
    #[error("unassigned tree pointer at node {node}, selector {selector:#x}")]
    UnassignedPointer { node: usize, selector: u32 },

    /// Input ran out before the requested number of symbols was decoded
    #[error("decoded length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Decode table (Coding) errors.
#[derive(Debug, Error)]
pub enum CodingError {
    /// Tree shift outside the supported range
    #[error("invalid tree shift {shift}: must be between 1 and {max}")]
    InvalidTreeShift { shift: u8, max: u8 },

    /// Invalid magic number in a packed table
    #[error("invalid table magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Packed table length does not match its header
    #[error("packed table length mismatch: header implies {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Packed pointer carries a kind tag that is neither Descend nor Return
    #[error("unknown pointer kind tag {tag:#04b} at node {node}, slot {slot}")]
    UnknownPointerKind { tag: u8, node: usize, slot: usize },

    /// Packed pointer is internally inconsistent
    #[error("invalid pointer at node {node}, slot {slot}: {reason}")]
    InvalidPointer {
        node: usize,
        slot: usize,
        reason: &'static str,
    },

    /// Root index points outside the node table
    #[error("tree index start {start} out of range for {node_count} nodes")]
    InvalidStart { start: usize, node_count: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
