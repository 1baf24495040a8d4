//! Compressor (spec §4.4 "Compression"): applied after batching, gated by a
//! size threshold; decompression falls back to raw bytes for messages that
//! predate compression.

use flate2::read::{ZlibDecoder, ZlibEncoder};
use flate2::Compression;
use std::io::Read;

pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(bytes, Compression::default());
    let mut out = Vec::new();
    encoder
        .read_to_end(&mut out)
        .expect("in-memory zlib encode cannot fail");
    out
}

/// Attempts zlib decompression first; on failure returns `bytes` unchanged
/// (spec: "falling back to raw bytes for backward compatibility").
pub fn decompress(bytes: &[u8]) -> Vec<u8> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    match decoder.read_to_end(&mut out) {
        Ok(_) => out,
        Err(_) => bytes.to_vec(),
    }
}

/// Compresses only when `bytes.len()` is at or above `threshold`.
pub fn compress_if_above_threshold(bytes: &[u8], threshold: usize) -> (bool, Vec<u8>) {
    if bytes.len() >= threshold {
        (true, compress(bytes))
    } else {
        (false, bytes.to_vec())
    }
}
