//! Shared helpers for the integration tests.
//!
//! Sample data and chunk sizes come from seeded ChaCha8 RNGs so every run is
//! reproducible.

#![allow(dead_code)]

use huffstream_core::{Coding, Decoder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Route `log` output through the test harness (`RUST_LOG=trace` to see it).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A complete code over all 256 byte values with lengths 1 through 11.
///
/// Symbol 0 gets the all-zero 1-bit code, so zero padding decodes as symbol 0.
pub fn skewed_lengths() -> Vec<u8> {
    let mut lengths = vec![11u8; 256];
    lengths[0] = 1;
    lengths[1] = 2;
    lengths[2] = 3;
    lengths[3..6].fill(10);
    lengths
}

/// Generate sample data with mixed structure.
///
/// Runs of one byte, text-like bytes from a small alphabet, short repeating
/// patterns and uniformly random bytes, picked per block.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let block = (size_bytes - data.len()).min(rng.gen_range(16..=512));

        match rng.gen_range(0..10u8) {
            0..=2 => {
                let byte_value: u8 = rng.gen();
                data.extend(std::iter::repeat(byte_value).take(block));
            }
            3..=5 => {
                let alphabet = b"\x00\x01\x02abcdefghijklmnopqrstuvwxyz .!,\n";
                data.extend((0..block).map(|_| alphabet[rng.gen_range(0..alphabet.len())]));
            }
            6..=7 => {
                let pattern: Vec<u8> = (0..rng.gen_range(4..=32)).map(|_| rng.gen()).collect();
                data.extend(pattern.iter().cycle().take(block));
            }
            _ => {
                data.extend((0..block).map(|_| rng.gen::<u8>()));
            }
        }
    }

    data
}

/// How input and output slices are cut for a chunked decode.
#[derive(Debug, Clone, Copy)]
pub enum Chunking {
    /// Fixed slice sizes
    Fixed { src: usize, dst: usize },
    /// Slice sizes drawn uniformly from `1..=max` with a seeded RNG
    Random { seed: u64, max_src: usize, max_dst: usize },
}

/// Decode `symbol_count` symbols from `encoded`, feeding the decoder the
/// slices described by `chunking`.
///
/// Returns the output and whether the final flush reported a finished stream.
pub fn decode_chunked(
    coding: &Coding,
    encoded: &[u8],
    symbol_count: usize,
    chunking: Chunking,
) -> (Vec<u8>, bool) {
    let mut rng = ChaCha8Rng::seed_from_u64(match chunking {
        Chunking::Random { seed, .. } => seed,
        Chunking::Fixed { .. } => 0,
    });
    let mut next_sizes = || match chunking {
        Chunking::Fixed { src, dst } => (src, dst),
        Chunking::Random {
            max_src, max_dst, ..
        } => (rng.gen_range(1..=max_src), rng.gen_range(1..=max_dst)),
    };

    let mut decoder = Decoder::new(coding);
    let mut output = vec![0u8; symbol_count];
    let mut written = 0;
    let mut consumed = 0;

    while written < symbol_count && consumed < encoded.len() {
        let (src_len, dst_len) = next_sizes();
        let src_end = (consumed + src_len).min(encoded.len());
        let dst_end = (written + dst_len).min(symbol_count);

        let (w, c) = decoder
            .decode(&mut output[written..dst_end], &encoded[consumed..src_end])
            .expect("decode failed");
        written += w;
        consumed += c;
    }

    let (flushed, finished) = decoder
        .flush(&mut output[written..])
        .expect("flush failed");
    written += flushed;

    assert_eq!(written, symbol_count, "stream ended early");
    (output, finished)
}
