//! bzip2 block compression/decompression adapter.
//!
//! Each of the three BSDIFF40 streams (control, diff, extra) is compressed
//! independently as its own bzip2 stream. Decompression doesn't know the
//! exact output size up front, so it grows its buffer geometrically the way
//! `bspatchlib.c`'s `decompress_block` does, instead of assuming the caller's
//! size hint is exact.

use std::io::{self, Read, Write};

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;

use crate::error::{Error, Result};

/// Default ceiling on a single decompressed block, to keep a corrupt or
/// hostile patch from driving an unbounded allocation.
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 128 * 1024 * 1024;

/// Compresses `data` with bzip2 (block size 9) and writes it to `sink`.
pub fn compress_to_stream<W: Write>(data: &[u8], sink: W, operation: &'static str) -> Result<W> {
    let mut encoder = BzEncoder::new(sink, Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| Error::io(operation, e))?;
    encoder.finish().map_err(|e| Error::io(operation, e))
}

/// Decompresses a bzip2 block of `compressed`, growing the output buffer
/// until it fits or `max_size` is exceeded.
///
/// `size_hint`, when known (e.g. the declared new-file size bounds the diff
/// and extra blocks), seeds the first allocation so the common case needs no
/// retry; pass `None` when no hint is available.
pub fn decompress_to_vec(
    compressed: &[u8],
    size_hint: Option<usize>,
    max_size: usize,
) -> Result<Vec<u8>> {
    let mut capacity = match size_hint {
        Some(hint) => hint.saturating_add(16),
        None => std::cmp::max(1024 + 8 * compressed.len(), 2 * compressed.len().max(1)),
    };

    loop {
        let capacity_to_try = capacity.min(max_size);
        match try_decompress(compressed, capacity_to_try) {
            Ok(buf) => return Ok(buf),
            Err(DecompressOutcome::NeedsMore) => {
                if capacity_to_try >= max_size {
                    return Err(Error::OutOfMemory {
                        requested_bytes: capacity_to_try,
                    });
                }
                capacity = capacity_to_try.saturating_mul(2).min(max_size).max(capacity_to_try + 1);
            }
            Err(DecompressOutcome::Codec(e)) => {
                // `compressed` is always an in-memory byte slice here, never
                // a real file or pipe, so a read failure out of the decoder
                // is the bzip2 codec rejecting the stream itself (bad magic,
                // corrupt block, truncated data), not a true I/O fault.
                return Err(Error::CompressionFailed { rc: codec_rc(&e) });
            }
        }
    }
}

/// Best-effort extraction of a diagnostic status code out of a codec
/// failure. A real OS error code is used when present; otherwise the
/// failure originated inside the bzip2 library itself rather than from the
/// platform, so there is no such code and a negative sentinel is reported.
fn codec_rc(e: &io::Error) -> i32 {
    e.raw_os_error().unwrap_or(-1)
}

enum DecompressOutcome {
    NeedsMore,
    Codec(io::Error),
}

/// Attempts a single decompression pass into a buffer of exactly `capacity`
/// bytes. A short read with no trailing EOF error signals truncation; we
/// treat it (and an explicit `UnexpectedEof`) as "buffer too small" so the
/// caller retries larger, matching the original's "keep doubling" strategy.
fn try_decompress(compressed: &[u8], capacity: usize) -> std::result::Result<Vec<u8>, DecompressOutcome> {
    let mut decoder = BzDecoder::new(compressed);
    let mut out = vec![0u8; capacity];
    let mut filled = 0;

    loop {
        if filled == out.len() {
            // Buffer exactly filled: we can't tell whether the stream ended
            // here or needs more room. Probe one more byte.
            let mut probe = [0u8; 1];
            match decoder.read(&mut probe) {
                Ok(0) => return Ok(out),
                Ok(_) => return Err(DecompressOutcome::NeedsMore),
                Err(e) => return Err(DecompressOutcome::Codec(e)),
            }
        }
        match decoder.read(&mut out[filled..]) {
            Ok(0) => {
                out.truncate(filled);
                return Ok(out);
            }
            Ok(n) => filled += n,
            Err(e) => return Err(DecompressOutcome::Codec(e)),
        }
    }
}
