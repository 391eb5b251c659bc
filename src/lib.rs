/*!
Fast and memory saving bsdiff 4.x (BSDIFF40) compatible delta compressor and
patcher, with its own qsufsort suffix array.

Add dependency to `Cargo.toml` under your project:
```toml
[dependencies]
bsdelta = "0.1"
```

Build commands
--------------

The commands `bsdiff` and `bspatch` can be compiled with:
```shell
$ cargo build --release --bins --features cmd
$ target/release/bsdiff -h
$ target/release/bspatch -h
```

Examples
--------

Compare an old buffer with a new one and generate a patch:
```rust
use bsdelta::Bsdiff;

fn make_patch(old: &[u8], new: &[u8]) -> bsdelta::Result<Vec<u8>> {
    let mut patch = Vec::new();
    Bsdiff::new(old)?.compare(new, &mut patch)?;
    Ok(patch)
}
```

Apply a patch to an old buffer and produce the new one:
```rust
use bsdelta::Bspatch;

fn apply_patch(old: &[u8], patch: &[u8]) -> bsdelta::Result<Vec<u8>> {
    Bspatch::new(patch)?.apply(old)
}
```

Note that `bsdelta` does not generate byte-identical patches to the original
`bsdiff`/`qbsdiff` tools. Only the on-disk patch format is promised to be
compatible: any conforming `bspatch` can apply a patch produced here, and
this crate's `Bspatch` can apply a patch produced by any conforming `bsdiff`.
*/

#![forbid(unsafe_code)]

pub mod bsdiff;
pub mod bspatch;
mod compress;
pub mod error;
mod header;
mod int_codec;
mod suffix;
mod utils;

pub use bsdiff::{Bsdiff, Compression};
pub use bspatch::Bspatch;
pub use error::{CorruptReason, Error, Result};
pub use utils::{diff, inspect, patch};

/// Single control instruction: add `add` diff bytes to the old buffer, copy
/// `copy` literal bytes from the extra stream, then seek the old cursor by
/// `seek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Control {
    pub add: u64,
    pub copy: u64,
    pub seek: i64,
}
