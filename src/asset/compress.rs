//! Deterministic gzip compression.
//!
//! The gzip header carries no file name and a zero mtime, so identical input
//! always yields identical output and regenerated modules diff cleanly.

use flate2::{Compression, GzBuilder};
use std::io::{self, Write};

/// Default compression level (best).
pub const DEFAULT_LEVEL: u32 = 9;

/// OS byte written into the gzip header ("unknown").
const OS_UNKNOWN: u8 = 255;

/// Gzip-compress `data` at `level` (0-9).
pub fn compress(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .operating_system(OS_UNKNOWN)
        .write(Vec::with_capacity(data.len() / 2 + 32), Compression::new(level));
    encoder.write_all(data)?;
    encoder.finish()
}
