//! The 32-byte BSDIFF40 patch header.

use crate::error::{CorruptReason, Error, Result};
use crate::int_codec::{decode_int, encode_int};

/// Size in bytes of the fixed patch header.
pub const HEADER_SIZE: usize = 32;

/// The magic bytes that open every BSDIFF40 patch.
pub const MAGIC: &[u8; 8] = b"BSDIFF40";

/// Parsed patch header: compressed block lengths plus the declared new size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Length in bytes of the compressed control block.
    pub ctrl_len: i64,
    /// Length in bytes of the compressed diff block.
    pub diff_len: i64,
    /// Declared length of the reconstructed new file.
    pub new_size: i64,
}

impl Header {
    /// Serializes the header to its 32-byte on-disk form.
    pub fn encode(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(MAGIC);
        buf[8..16].copy_from_slice(&encode_int(self.ctrl_len)?);
        buf[16..24].copy_from_slice(&encode_int(self.diff_len)?);
        buf[24..32].copy_from_slice(&encode_int(self.new_size)?);
        Ok(buf)
    }

    /// Parses and sanity-checks a header out of the start of a patch buffer.
    ///
    /// Only checks the magic and the header's own shape; it does not know
    /// the total patch length, so block-length-vs-patch-length validation is
    /// left to the caller (see `Bspatch::new`).
    pub fn parse(patch: &[u8]) -> Result<Header> {
        if patch.len() < HEADER_SIZE {
            return Err(Error::corrupt(CorruptReason::TooShort));
        }
        if &patch[0..8] != MAGIC {
            return Err(Error::corrupt(CorruptReason::BadMagic));
        }

        let ctrl_len = decode_int(patch[8..16].try_into().unwrap());
        let diff_len = decode_int(patch[16..24].try_into().unwrap());
        let new_size = decode_int(patch[24..32].try_into().unwrap());

        Ok(Header {
            ctrl_len,
            diff_len,
            new_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let h = Header {
            ctrl_len: 24,
            diff_len: 0,
            new_size: 5,
        };
        let buf = h.encode().unwrap();
        assert_eq!(&buf[0..8], MAGIC);
        assert_eq!(Header::parse(&buf).unwrap(), h);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(b"BSDIFF41");
        assert!(matches!(
            Header::parse(&buf),
            Err(Error::CorruptPatch {
                reason: CorruptReason::BadMagic
            })
        ));
    }

    #[test]
    fn rejects_too_short() {
        let buf = [0u8; 10];
        assert!(matches!(
            Header::parse(&buf),
            Err(Error::CorruptPatch {
                reason: CorruptReason::TooShort
            })
        ));
    }

    #[test]
    fn parse_preserves_negative_lengths_for_the_caller_to_reject() {
        // Header::parse only checks magic and overall shape; validating that
        // the lengths make sense is `Bspatch::new`'s job.
        let h = Header {
            ctrl_len: 24,
            diff_len: 0,
            new_size: 5,
        };
        let mut buf = h.encode().unwrap();
        buf[16..24].copy_from_slice(&encode_int(-1).unwrap());
        let parsed = Header::parse(&buf).unwrap();
        assert_eq!(parsed.diff_len, -1);
    }
}
