//! The differ (component F) and patch writer (component G).

use std::io::Write;

use bzip2::write::BzEncoder;
pub use bzip2::Compression;

use crate::error::{Error, Result};
use crate::header::Header;
use crate::int_codec::encode_int;
use crate::suffix::SuffixArray;
use crate::Control;

/// Patches larger than this many bytes are rejected up front; BSDIFF40's own
/// length fields are 32-bit-clean by convention even though the wire format
/// could, in principle, carry more.
const MAX_INPUT_SIZE: u64 = (1u64 << 31) - 1;

/// Memory-saving bsdiff 4.x compatible delta compressor.
///
/// Builds the suffix array for `old` up front; `compare` can then be called
/// against any number of `new` buffers.
pub struct Bsdiff<'s> {
    old: &'s [u8],
    sa: SuffixArray<'s>,
    level: Compression,
}

impl<'s> Bsdiff<'s> {
    /// Prepares for delta compression and immediately sorts the suffix array.
    pub fn new(old: &'s [u8]) -> Result<Self> {
        if old.len() as u64 > MAX_INPUT_SIZE {
            return Err(Error::InputTooLarge {
                size: old.len() as u64,
                limit: MAX_INPUT_SIZE,
            });
        }
        Ok(Bsdiff {
            old,
            sa: SuffixArray::new(old),
            level: Compression::best(),
        })
    }

    /// Sets the bzip2 compression level (default is the best compression
    /// level bzip2 offers).
    pub fn compression_level(mut self, level: Compression) -> Self {
        self.level = level;
        self
    }

    /// Searches for matches of `new` in the old buffer and writes a
    /// BSDIFF40-compatible patch to `patch`.
    ///
    /// Returns the final size of the patch file.
    pub fn compare<P: Write>(&self, new: &[u8], patch: P) -> Result<u64> {
        if new.len() as u64 > MAX_INPUT_SIZE {
            return Err(Error::InputTooLarge {
                size: new.len() as u64,
                limit: MAX_INPUT_SIZE,
            });
        }
        write_patch(self.old, new, &self.sa, self.level, patch)
    }
}

fn write_patch<P: Write>(
    old: &[u8],
    new: &[u8],
    sa: &SuffixArray,
    level: Compression,
    mut patch: P,
) -> Result<u64> {
    let mut bz_ctrl = Vec::new();
    let mut bz_diff = Vec::new();
    let mut bz_extra = Vec::new();

    {
        let mut ctrl_enc = BzEncoder::new(&mut bz_ctrl, level);
        let mut diff_enc = BzEncoder::new(&mut bz_diff, level);
        let mut extra_enc = BzEncoder::new(&mut bz_extra, level);

        let mut new_pos: usize = 0;
        let mut old_pos: i64 = 0;
        let mut ctl = [0u8; 24];

        for c in Differ::new(old, new, sa) {
            let add = c.add as usize;
            let copy = c.copy as usize;

            // Diff bytes: new[new_pos..new_pos+add] minus old[old_pos..old_pos+add],
            // treating old positions outside [0, old.len()) as zero.
            for i in 0..add {
                let n = new[new_pos + i];
                let o = byte_at(old, old_pos + i as i64).unwrap_or(0);
                diff_enc
                    .write_all(&[n.wrapping_sub(o)])
                    .map_err(|e| Error::io("compress diff block", e))?;
            }
            new_pos += add;
            old_pos += add as i64;

            // Extra bytes: literal new[new_pos..new_pos+copy].
            if copy > 0 {
                extra_enc
                    .write_all(&new[new_pos..new_pos + copy])
                    .map_err(|e| Error::io("compress extra block", e))?;
            }
            new_pos += copy;

            old_pos += c.seek;

            ctl[0..8].copy_from_slice(&encode_int(c.add as i64)?);
            ctl[8..16].copy_from_slice(&encode_int(c.copy as i64)?);
            ctl[16..24].copy_from_slice(&encode_int(c.seek)?);
            ctrl_enc
                .write_all(&ctl)
                .map_err(|e| Error::io("compress ctrl block", e))?;
        }

        ctrl_enc.finish().map_err(|e| Error::io("finish ctrl block", e))?;
        diff_enc.finish().map_err(|e| Error::io("finish diff block", e))?;
        extra_enc.finish().map_err(|e| Error::io("finish extra block", e))?;
    }

    let header = Header {
        ctrl_len: bz_ctrl.len() as i64,
        diff_len: bz_diff.len() as i64,
        new_size: new.len() as i64,
    };
    patch
        .write_all(&header.encode()?)
        .map_err(|e| Error::io("write patch header", e))?;
    patch
        .write_all(&bz_ctrl)
        .map_err(|e| Error::io("write ctrl block", e))?;
    patch
        .write_all(&bz_diff)
        .map_err(|e| Error::io("write diff block", e))?;
    patch
        .write_all(&bz_extra)
        .map_err(|e| Error::io("write extra block", e))?;
    patch.flush().map_err(|e| Error::io("flush patch", e))?;

    Ok(32 + bz_ctrl.len() as u64 + bz_diff.len() as u64 + bz_extra.len() as u64)
}

/// Byte at a possibly out-of-range signed offset, treating out-of-range as
/// absent rather than panicking.
fn byte_at(buf: &[u8], idx: i64) -> Option<u8> {
    if idx >= 0 && (idx as usize) < buf.len() {
        Some(buf[idx as usize])
    } else {
        None
    }
}

/// Greedy approximate-match engine. Yields one control triple per step,
/// using a suffix array to find exact-match seeds and extending them into
/// approximate matches that tolerate a bounded fraction of mismatches.
struct Differ<'s, 't, 'sa> {
    old: &'s [u8],
    new: &'t [u8],
    sa: &'sa SuffixArray<'s>,

    scan: i64,
    len: i64,
    pos: i64,

    lastscan: i64,
    lastpos: i64,
    lastoffset: i64,

    done: bool,
}

impl<'s, 't, 'sa> Differ<'s, 't, 'sa> {
    fn new(old: &'s [u8], new: &'t [u8], sa: &'sa SuffixArray<'s>) -> Self {
        Differ {
            old,
            new,
            sa,
            scan: 0,
            len: 0,
            pos: 0,
            lastscan: 0,
            lastpos: 0,
            lastoffset: 0,
            done: false,
        }
    }
}

impl<'s, 't, 'sa> Iterator for Differ<'s, 't, 'sa> {
    type Item = Control;

    fn next(&mut self) -> Option<Control> {
        if self.done {
            return None;
        }

        let old_size = self.old.len() as i64;
        let new_size = self.new.len() as i64;

        while self.scan < new_size {
            let mut oldscore: i64 = 0;
            let mut num_stalled: u32 = 0;

            let mut scsc = self.scan + self.len;
            self.scan += self.len;

            loop {
                if self.scan >= new_size {
                    break;
                }

                let prev_len = self.len;
                let prev_oldscore = oldscore;
                let prev_pos = self.pos;

                let (len, pos) = self.sa.search(&self.new[self.scan as usize..]);
                self.len = len as i64;
                self.pos = pos as i64;

                while scsc < self.scan + self.len {
                    if byte_at(self.old, scsc + self.lastoffset) == Some(self.new[scsc as usize]) {
                        oldscore += 1;
                    }
                    scsc += 1;
                }

                if (self.len == oldscore && self.len != 0) || self.len > oldscore + 8 {
                    break;
                }

                if byte_at(self.old, self.scan + self.lastoffset) == Some(self.new[self.scan as usize]) {
                    oldscore -= 1;
                }
                self.scan += 1;

                const FUZZ: i64 = 8;
                if prev_len - FUZZ <= self.len
                    && self.len <= prev_len
                    && prev_oldscore - FUZZ <= oldscore
                    && oldscore <= prev_oldscore
                    && prev_pos <= self.pos
                    && self.pos <= prev_pos + FUZZ
                    && oldscore <= self.len
                    && self.len <= oldscore + FUZZ
                {
                    num_stalled += 1;
                } else {
                    num_stalled = 0;
                }
                if num_stalled > 100 {
                    break;
                }
            }

            if self.len == oldscore && self.scan != new_size {
                continue;
            }

            // Forward extension from lastscan/lastpos.
            let mut s: i64 = 0;
            let mut best_score: i64 = 0;
            let mut lenf: i64 = 0;
            let mut i: i64 = 0;
            while self.lastscan + i < self.scan && self.lastpos + i < old_size {
                if self.old[(self.lastpos + i) as usize] == self.new[(self.lastscan + i) as usize] {
                    s += 1;
                }
                i += 1;
                if s * 2 - i > best_score * 2 - lenf {
                    best_score = s;
                    lenf = i;
                }
            }

            // Backward extension from scan/pos.
            let mut lenb: i64 = 0;
            if self.scan < new_size {
                let mut s: i64 = 0;
                let mut best_score: i64 = 0;
                let mut i: i64 = 1;
                while self.scan >= self.lastscan + i && self.pos >= i {
                    if self.old[(self.pos - i) as usize] == self.new[(self.scan - i) as usize] {
                        s += 1;
                    }
                    if s * 2 - i > best_score * 2 - lenb {
                        best_score = s;
                        lenb = i;
                    }
                    i += 1;
                }
            }

            // Overlap resolution.
            if self.lastscan + lenf > self.scan - lenb {
                let overlap = (self.lastscan + lenf) - (self.scan - lenb);
                let mut s: i64 = 0;
                let mut best_score: i64 = 0;
                let mut lens: i64 = 0;
                for i in 0..overlap {
                    if self.new[(self.lastscan + lenf - overlap + i) as usize]
                        == self.old[(self.lastpos + lenf - overlap + i) as usize]
                    {
                        s += 1;
                    }
                    if self.new[(self.scan - lenb + i) as usize]
                        == self.old[(self.pos - lenb + i) as usize]
                    {
                        s -= 1;
                    }
                    if s > best_score {
                        best_score = s;
                        lens = i + 1;
                    }
                }
                lenf += lens - overlap;
                lenb -= lens;
            }

            let add = lenf as u64;
            let copy = ((self.scan - lenb) - (self.lastscan + lenf)) as u64;
            let seek = (self.pos - lenb) - (self.lastpos + lenf);

            self.lastscan = self.scan - lenb;
            self.lastpos = self.pos - lenb;
            self.lastoffset = self.pos - self.scan;

            if self.scan == new_size {
                self.done = true;
            }

            return Some(Control {
                add,
                copy,
                seek,
            });
        }

        self.done = true;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old: &[u8], new: &[u8]) -> Vec<u8> {
        let mut patch = Vec::new();
        Bsdiff::new(old).unwrap().compare(new, &mut patch).unwrap();
        patch
    }

    #[test]
    fn empty_old_puts_everything_in_extra() {
        let patch = diff(b"", b"hello");
        let header = Header::parse(&patch).unwrap();
        assert_eq!(header.new_size, 5);
    }

    #[test]
    fn identical_inputs_yield_zero_diff_stream() {
        let old = b"abcdefgh";
        let patch = diff(old, old);
        let header = Header::parse(&patch).unwrap();
        assert_eq!(header.new_size, 8);
    }

    #[test]
    fn produces_well_formed_header_lengths() {
        let patch = diff(b"the quick brown fox", b"the quick red fox");
        let header = Header::parse(&patch).unwrap();
        assert!(header.ctrl_len > 0);
        assert!(32 + header.ctrl_len + header.diff_len <= patch.len() as i64);
    }
}
