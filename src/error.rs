use std::io;

use thiserror::Error;

/// Why a patch was rejected as corrupt.
///
/// Kept as its own enum (rather than a free-form string) so callers and
/// tests can match on the exact failure instead of scraping a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptReason {
    /// Patch is shorter than the 32-byte header.
    TooShort,
    /// The first 8 bytes are not `b"BSDIFF40"`.
    BadMagic,
    /// A header length field is non-positive, or the block lengths don't fit
    /// inside the patch.
    BadHeaderLengths,
    /// A cursor computation would overflow `i64`/`usize` arithmetic.
    ArithmeticOverflow,
    /// The control stream ran out of bytes before a full triple could be read.
    CtrlUnderflow,
    /// The diff stream ran out of bytes before a control triple's `x` bytes.
    DiffUnderflow,
    /// The extra stream ran out of bytes before a control triple's `y` bytes.
    ExtraUnderflow,
    /// Applying control triples would write past the declared new-file size.
    NewSizeExceeded,
    /// A control triple's `x` or `y` field was negative.
    NegativeControlField,
}

impl std::fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            CorruptReason::TooShort => "patch shorter than the header",
            CorruptReason::BadMagic => "bad magic, not a BSDIFF40 patch",
            CorruptReason::BadHeaderLengths => "bad header lengths",
            CorruptReason::ArithmeticOverflow => "cursor arithmetic overflowed",
            CorruptReason::CtrlUnderflow => "control stream underflow",
            CorruptReason::DiffUnderflow => "diff stream underflow",
            CorruptReason::ExtraUnderflow => "extra stream underflow",
            CorruptReason::NewSizeExceeded => "control triple exceeds declared new size",
            CorruptReason::NegativeControlField => "negative control field",
        };
        f.write_str(msg)
    }
}

/// Every way a diff or patch operation can fail.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read from or write to a path-bound resource.
    #[error("I/O error during {operation} of {path}: {source}")]
    Io {
        /// The path involved, or `"<memory>"` when there is none.
        path: String,
        /// Short description of what was being attempted, e.g. `"write"`.
        operation: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A buffer allocation was refused because it would exceed configured limits.
    #[error("refused to allocate {requested_bytes} bytes")]
    OutOfMemory {
        /// Size of the allocation that was refused.
        requested_bytes: usize,
    },

    /// The patch bytes are not a well-formed BSDIFF40 patch.
    #[error("corrupt patch: {reason}")]
    CorruptPatch {
        /// The specific sanity check that failed.
        reason: CorruptReason,
    },

    /// The bzip2 codec itself failed, independent of patch structure.
    #[error("compression codec failed with code {rc}")]
    CompressionFailed {
        /// Opaque status code from the underlying codec, for diagnostics.
        rc: i32,
    },

    /// An input exceeds a size this format or implementation can represent.
    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    InputTooLarge {
        /// Size of the offending input.
        size: u64,
        /// The limit that was exceeded.
        limit: u64,
    },
}

impl Error {
    pub(crate) fn corrupt(reason: CorruptReason) -> Self {
        Error::CorruptPatch { reason }
    }

    pub(crate) fn io(operation: &'static str, source: io::Error) -> Self {
        Error::Io {
            path: "<memory>".to_string(),
            operation,
            source,
        }
    }
}

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::io("stream", source)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
