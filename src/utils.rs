//! Whole-buffer convenience wrappers around [`Bsdiff`] and [`Bspatch`].
//!
//! These are the thin `diff`/`patch`/`inspect` operations the CLI binaries
//! and most library consumers actually want, as opposed to the streaming
//! builder API exposed directly by [`crate::bsdiff`] and [`crate::bspatch`].

use crate::bsdiff::Bsdiff;
use crate::bspatch::Bspatch;
use crate::error::Result;

/// Computes a BSDIFF40 patch turning `old` into `new`.
pub fn diff(old: &[u8], new: &[u8]) -> Result<Vec<u8>> {
    let mut patch = Vec::new();
    Bsdiff::new(old)?.compare(new, &mut patch)?;
    Ok(patch)
}

/// Applies a BSDIFF40 `patch` to `old`, returning the reconstructed buffer.
pub fn patch(old: &[u8], patch_bytes: &[u8]) -> Result<Vec<u8>> {
    Bspatch::new(patch_bytes)?.apply(old)
}

/// Decompresses the three blocks of a patch without replaying them, for
/// diagnostics.
///
/// Returns `(ctrl_decompressed_size, diff_decompressed_size, extra_decompressed_size)`.
pub fn inspect(patch_bytes: &[u8]) -> Result<(usize, usize, usize)> {
    Bspatch::new(patch_bytes)?.inspect()
}
