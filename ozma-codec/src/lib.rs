//! # Ozma Codec
//!
//! LZMA1 compression: a sliding-window match finder, an adaptive range
//! coder, and a price-based optimal parser.
//!
//! ## Usage
//!
//! One-shot compression of a byte slice:
//!
//! ```
//! use ozma_codec::{compress_bytes, decompress_bytes};
//!
//! let data = b"Hello, LZMA World! Hello, LZMA World!";
//! let packed = compress_bytes(data).unwrap();
//! let unpacked = decompress_bytes(&packed).unwrap();
//! assert_eq!(&unpacked, data);
//! ```
//!
//! Streaming compression with caller-owned buffers:
//!
//! ```
//! use ozma_codec::{LzmaEncoder, LzmaParams};
//!
//! let mut encoder = LzmaEncoder::new(LzmaParams::default(), None).unwrap();
//! let mut out = [0u8; 4096];
//! let progress = encoder.encode(b"some input", &mut out).unwrap();
//! assert_eq!(progress.consumed, 10);
//! ```
//!
//! ## Stream format
//!
//! The classic LZMA1 container:
//! 1. Properties byte (`(pb * 5 + lp) * 9 + lc`)
//! 2. Dictionary size (4 bytes, little-endian)
//! 3. Uncompressed size (8 bytes, little-endian; all-ones = unknown)
//! 4. Range-coded payload
//!
//! With a known size the stream simply ends after the last symbol; with an
//! unknown size an explicit end marker (a match at distance `2^32 - 1`) is
//! emitted before the range-coder flush.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod encoder;
pub mod match_finder;
pub mod model;
pub mod optimal;
pub mod params;
pub mod price;
pub mod range_coder;

// Re-exports
pub use decoder::{LzmaDecoder, decompress, decompress_bytes};
pub use encoder::{HEADER_SIZE, LzmaEncoder, Progress};
pub use match_finder::{Match, MatchFinder};
pub use model::LzmaProps;
pub use params::{Algo, LzmaParams, MatchMode};
pub use range_coder::{RangeDecoder, RangeEncoder};

use ozma_core::error::Result;

/// Compress `data` into a full LZMA1 container with the given parameters.
///
/// The dictionary is trimmed to the input size (it never helps to index
/// further back than the data reaches), which also keeps small inputs
/// cheap at high levels.
pub fn compress(data: &[u8], params: LzmaParams) -> Result<Vec<u8>> {
    let mut params = params;
    let len32 = u32::try_from(data.len()).unwrap_or(u32::MAX);
    params.dict_size = params.dict_size.min(len32.max(params::DICT_SIZE_MIN));

    let mut encoder = LzmaEncoder::new(params, Some(data.len() as u64))?;
    let mut out = Vec::new();
    let mut buf = vec![0u8; 1 << 16];

    let mut offset = 0usize;
    while offset < data.len() {
        let progress = encoder.encode(&data[offset..], &mut buf)?;
        offset += progress.consumed;
        out.extend_from_slice(&buf[..progress.produced]);
    }
    while !encoder.is_finished() {
        let progress = encoder.encode(&[], &mut buf)?;
        out.extend_from_slice(&buf[..progress.produced]);
    }
    Ok(out)
}

/// Compress with the default (level 5) parameters.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>> {
    compress(data, LzmaParams::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_with(data: &[u8], params: LzmaParams) -> Vec<u8> {
        let packed = compress(data, params).unwrap();
        let unpacked = decompress_bytes(&packed).unwrap();
        assert_eq!(unpacked, data, "roundtrip mismatch for {params:?}");
        packed
    }

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        roundtrip_with(data, LzmaParams::default())
    }

    /// Deterministic pseudo-random bytes (multiplicative LCG).
    fn random_bytes(n: usize) -> Vec<u8> {
        let mut state = 0x2545F491_4F6CDD1Du64;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 56) as u8
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let packed = roundtrip(b"");
        // 13-byte header plus exactly five flush bytes
        assert_eq!(packed.len(), HEADER_SIZE + 5);
        assert_eq!(u64::from_le_bytes(packed[5..13].try_into().unwrap()), 0);
    }

    #[test]
    fn test_single_byte() {
        let packed = roundtrip(b"A");
        assert!(packed.len() < 30);
    }

    #[test]
    fn test_short_text() {
        roundtrip(b"Hello, LZMA World! This is a test of compression and decompression.");
    }

    #[test]
    fn test_all_zeros_64k() {
        let data = vec![0u8; 64 * 1024];
        let packed = roundtrip(&data);
        assert!(packed.len() < 100, "got {}", packed.len());
    }

    #[test]
    fn test_periodic_abc() {
        let data = b"ABC".repeat(10_000);
        let packed = roundtrip(&data);
        assert!(packed.len() < 200, "got {}", packed.len());
    }

    #[test]
    fn test_random_1mib_incompressible() {
        let data = random_bytes(1 << 20);
        let packed = roundtrip(&data);
        assert!(packed.len() >= data.len() * 98 / 100);
        // expansion stays within the per-symbol bound plus the header
        assert!(packed.len() <= data.len() + HEADER_SIZE + data.len() / 8 + 64);
    }

    #[test]
    fn test_all_levels() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(50);
        for level in 0..=9 {
            roundtrip_with(&data, LzmaParams::from_level(level));
        }
    }

    #[test]
    fn test_finder_and_parser_combinations() {
        let data = b"abracadabra abracadabra abracadabra!".repeat(30);
        for mode in [MatchMode::BinTree, MatchMode::HashChain] {
            for algo in [Algo::Normal, Algo::Fast] {
                let mut p = LzmaParams::default();
                p.mode = mode;
                p.algo = algo;
                roundtrip_with(&data, p);
            }
        }
    }

    #[test]
    fn test_literal_context_variants() {
        let data = b"literal context exercise: 0123456789 0123456789".repeat(20);
        for (lc, lp, pb) in [(0, 0, 0), (3, 0, 2), (0, 2, 0), (8, 0, 4), (1, 4, 1)] {
            let mut p = LzmaParams::default();
            p.lc = lc;
            p.lp = lp;
            p.pb = pb;
            roundtrip_with(&data, p);
        }
    }

    #[test]
    fn test_fb_extremes() {
        let data = b"xyzzy".repeat(500);
        for fb in [5u32, 16, 273] {
            let mut p = LzmaParams::default();
            p.fb = fb;
            p.mf_cycles = 16 + fb / 2;
            roundtrip_with(&data, p);
        }
    }

    #[test]
    fn test_unknown_size_uses_end_marker() {
        let data = b"end marker exercise ".repeat(100);
        let mut params = LzmaParams::default();
        params.dict_size = 1 << 16;
        let mut encoder = LzmaEncoder::new(params, None).unwrap();

        let mut out = Vec::new();
        let mut buf = vec![0u8; 1 << 16];
        let mut offset = 0;
        while offset < data.len() {
            let pr = encoder.encode(&data[offset..], &mut buf).unwrap();
            offset += pr.consumed;
            out.extend_from_slice(&buf[..pr.produced]);
        }
        while !encoder.is_finished() {
            let pr = encoder.encode(&[], &mut buf).unwrap();
            out.extend_from_slice(&buf[..pr.produced]);
        }

        assert_eq!(
            u64::from_le_bytes(out[5..13].try_into().unwrap()),
            u64::MAX
        );
        assert_eq!(decompress_bytes(&out).unwrap(), data);
    }

    #[test]
    fn test_chunked_input_invariance() {
        let data = b"chunking should never change the stream, chunk by chunk. ".repeat(200);

        let encode_chunked = |chunk_size: usize| -> Vec<u8> {
            let mut params = LzmaParams::default();
            params.dict_size = params
                .dict_size
                .min((data.len() as u32).max(params::DICT_SIZE_MIN));
            let mut encoder = LzmaEncoder::new(params, Some(data.len() as u64)).unwrap();
            let mut out = Vec::new();
            let mut buf = vec![0u8; 1 << 16];
            for chunk in data.chunks(chunk_size) {
                let mut offset = 0;
                while offset < chunk.len() {
                    let pr = encoder.encode(&chunk[offset..], &mut buf).unwrap();
                    offset += pr.consumed;
                    out.extend_from_slice(&buf[..pr.produced]);
                }
            }
            while !encoder.is_finished() {
                let pr = encoder.encode(&[], &mut buf).unwrap();
                out.extend_from_slice(&buf[..pr.produced]);
            }
            out
        };

        let whole = compress(&data, LzmaParams::default()).unwrap();
        for chunk_size in [1, 7, 1024, data.len()] {
            assert_eq!(encode_chunked(chunk_size), whole, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let data = random_bytes(32 * 1024);
        let a = compress(&data, LzmaParams::default()).unwrap();
        let b = compress(&data, LzmaParams::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_output_buffer_streaming() {
        // drain the queue through a 16-byte window; no call may stall
        let data = b"draining through a keyhole ".repeat(300);
        let mut params = LzmaParams::default();
        params.dict_size = 1 << 16;
        let mut encoder = LzmaEncoder::new(params, Some(data.len() as u64)).unwrap();

        let mut out = Vec::new();
        let mut buf = [0u8; 16];
        let mut offset = 0;
        loop {
            let src: &[u8] = if offset < data.len() {
                &data[offset..]
            } else {
                &[]
            };
            let pr = encoder.encode(src, &mut buf).unwrap();
            offset += pr.consumed;
            out.extend_from_slice(&buf[..pr.produced]);
            if encoder.is_finished() {
                break;
            }
            assert!(pr.any() || !encoder.is_finished());
        }
        assert_eq!(decompress_bytes(&out).unwrap(), data);
    }

    #[test]
    fn test_mixed_structured_payload() {
        // half text, half binary ramp, with long internal repeats
        let mut data = Vec::new();
        for i in 0..2000u32 {
            data.extend_from_slice(format!("record {:08}\n", i % 97).as_bytes());
            data.push((i % 251) as u8);
        }
        roundtrip(&data);
    }
}
