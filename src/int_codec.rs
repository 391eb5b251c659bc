//! Sign-magnitude little-endian 64-bit integer codec.
//!
//! This is the integer encoding used throughout the BSDIFF40 format: the
//! header length fields and every control triple field. It is *not* two's
//! complement, so native signed little-endian helpers must not be used here.

use byteorder::{ByteOrder, LE};

use crate::error::{Error, Result};

const SIGN_BIT: u64 = 1 << 63;

/// Encodes `x` as 8 sign-magnitude little-endian bytes.
///
/// Returns `Error::InputTooLarge` for `i64::MIN`, whose magnitude (`2^63`)
/// has no representation in the 63 magnitude bits this format provides.
pub fn encode_int(x: i64) -> Result<[u8; 8]> {
    if x == i64::MIN {
        return Err(Error::InputTooLarge {
            size: SIGN_BIT,
            limit: SIGN_BIT - 1,
        });
    }

    let magnitude = x.unsigned_abs();
    let mut buf = [0u8; 8];
    LE::write_u64(&mut buf, magnitude);
    if x < 0 {
        buf[7] |= 0x80;
    }
    Ok(buf)
}

/// Decodes 8 sign-magnitude little-endian bytes into an `i64`.
pub fn decode_int(buf: &[u8; 8]) -> i64 {
    let raw = LE::read_u64(buf);
    let magnitude = raw & (SIGN_BIT - 1);
    if raw & SIGN_BIT != 0 {
        -(magnitude as i64)
    } else {
        magnitude as i64
    }
}
