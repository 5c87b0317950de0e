//! huffstream-core: streaming, table-driven Huffman decoding
//!
//! This library turns a bit-packed canonical Huffman stream back into bytes
//! incrementally: input and output arrive in caller-sized slices, and a
//! codeword split across two calls resumes where it stopped.
//!
//! # Architecture
//!
//! - `codebook`: canonical codewords from per-symbol code lengths, plus the encoder
//! - `coding`: the multi-level decode table and its packed layout
//! - `decoder`: per-stream bit accumulator and table walk
//! - `bitio`: MSB-first bit writing
//! - `error`: structured errors
//!
//! # Example
//!
//! ```
//! use huffstream_core::{Codebook, Coding, CodingConfig, Decoder};
//!
//! let mut lengths = vec![0u8; 256];
//! lengths[b'A' as usize] = 1; // A -> 0
//! lengths[b'B' as usize] = 2; // B -> 10
//! let codebook = Codebook::from_lengths(&lengths).unwrap();
//! let coding = Coding::new(&codebook, CodingConfig::with_tree_shift(4)).unwrap();
//!
//! let encoded = codebook.encode(b"AAB").unwrap();
//! assert_eq!(encoded, vec![0b0010_0000]);
//!
//! let mut decoder = Decoder::new(&coding);
//! let mut out = [0u8; 3];
//! let (written, consumed) = decoder.decode(&mut out, &encoded).unwrap();
//! assert_eq!((written, consumed), (3, 1));
//! assert_eq!(&out, b"AAB");
//! ```
//!
//! # Design Principles
//!
//! - **Caller-owned buffers**: no allocation on the decode path
//! - **Counts, not errors, for flow control**: short input and full output are normal
//! - **Shared tables**: a `Coding` is immutable and can back many decoders

pub mod bitio;
pub mod codebook;
pub mod coding;
pub mod decoder;
pub mod error;

// Re-export commonly used types
pub use codebook::{CodeWord, Codebook};
pub use coding::{Coding, CodingConfig, Pointer, Step, TreeNode};
pub use decoder::{decode_exact, Decoder};
pub use error::{Error, Result};
