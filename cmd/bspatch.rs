#![forbid(unsafe_code)]

use std::fs;
use std::io;
use std::io::prelude::*;
use std::process;

use clap::Parser;

use bsdelta::Bspatch;

#[derive(Parser, Debug)]
#[clap(
    name = "bspatch",
    version,
    about = "fast and memory saving bsdiff 4.x compatible patcher",
    long_about = "With one positional argument (PATCH), prints the decompressed block \
sizes of that patch without applying it. With three (OLD NEW PATCH), applies \
PATCH to OLD and writes the result to NEW.",
)]
struct Args {
    /// old file ("-" for stdin); omit to only inspect PATCH
    #[clap(value_name = "OLD")]
    old_path: Option<String>,

    /// new file ("-" for stdout); required together with OLD
    #[clap(value_name = "NEW")]
    new_path: Option<String>,

    /// patch file. The sole positional argument in inspect mode.
    #[clap(value_name = "PATCH")]
    patch_path: Option<String>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = execute(args) {
        println!("error: {}", e);
        process::exit(1);
    }
}

fn execute(args: Args) -> io::Result<()> {
    match (args.old_path, args.new_path, args.patch_path) {
        (Some(patch_path), None, None) => inspect(&patch_path),
        (Some(old_path), Some(new_path), Some(patch_path)) => {
            apply(&old_path, &new_path, &patch_path)
        }
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "expected either PATCH, or OLD NEW PATCH",
        )),
    }
}

fn inspect(patch_path: &str) -> io::Result<()> {
    let patch = fs::read(patch_path)?;
    let (ctrl, diff, extra) = Bspatch::new(&patch)
        .and_then(|b| b.inspect())
        .map_err(to_io_error)?;
    println!(
        "Decompressed ctrl/diff/extra sizes are: {}/{}/{}.",
        ctrl, diff, extra
    );
    Ok(())
}

fn apply(old_path: &str, new_path: &str, patch_path: &str) -> io::Result<()> {
    let mut old = read_input(old_path)?;
    old.shrink_to_fit();
    let mut patch = fs::read(patch_path)?;
    patch.shrink_to_fit();

    let new = Bspatch::new(&patch).and_then(|b| b.apply(&old)).map_err(to_io_error)?;

    if new_path == "-" {
        io::stdout().write_all(&new)?;
    } else {
        fs::write(new_path, &new)?;
    }
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
