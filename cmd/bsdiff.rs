#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::io::prelude::*;
use std::process;

use clap::Parser;

use bsdelta::{Bsdiff, Compression};

#[derive(Parser, Debug)]
#[clap(
    name = "bsdiff",
    version,
    about = "fast and memory saving bsdiff 4.x compatible delta compressor",
    long_about = None,
)]
struct Args {
    /// old file ("-" for stdin)
    #[clap(value_name = "OLD")]
    old_path: String,

    /// new file ("-" for stdin)
    #[clap(value_name = "NEW")]
    new_path: String,

    /// patch file ("-" for stdout)
    #[clap(value_name = "PATCH")]
    patch_path: String,

    /// bzip2 compression level (1-9)
    #[clap(short = 'z', value_name = "LEVEL")]
    level: Option<u32>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = execute(args) {
        println!("error: {}", e);
        process::exit(1);
    }
}

fn execute(args: Args) -> io::Result<()> {
    if args.old_path == "-" && args.new_path == "-" {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "old and new could not both be stdin at the same time",
        ));
    }

    let mut old = read_input(&args.old_path)?;
    old.shrink_to_fit();
    let mut new = read_input(&args.new_path)?;
    new.shrink_to_fit();

    let patch: Box<dyn Write> = if args.patch_path == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(&args.patch_path)?)
    };

    let mut bsdiff = Bsdiff::new(&old).map_err(to_io_error)?;
    if let Some(level) = args.level {
        let level = match level {
            n if (1..=9).contains(&n) => n,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "compression level must be in range 1-9",
                ));
            }
        };
        bsdiff = bsdiff.compression_level(Compression::new(level));
    }
    bsdiff.compare(&new, patch).map_err(to_io_error)?;
    Ok(())
}

fn read_input(path: &str) -> io::Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        fs::read(path)
    }
}

fn to_io_error(e: bsdelta::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}
