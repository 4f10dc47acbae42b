//! Byte-array declarations.

use std::fmt::Write;

use crate::asset::ident::LEN_SUFFIX;

/// Indentation of array rows and route bodies.
pub const INDENT: &str = "    ";

/// Render `bytes` as a `PROGMEM` array named `ident` plus its length constant.
///
/// ```text
/// const uint8_t app_js[] PROGMEM = {
///     0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0xff, 0x4b, 0xcc,
///     0x2a, 0x00, 0x00
/// };
/// const size_t app_js_len = 15;
/// ```
///
/// Each row holds `chunk_width` bytes, the last row holds the remainder.
pub fn emit_declaration(ident: &str, bytes: &[u8], chunk_width: usize) -> String {
    let chunk_width = chunk_width.max(1);
    // "0x00, " per byte plus indentation and newline per row
    let rows = bytes.len().div_ceil(chunk_width);
    let mut out = String::with_capacity(bytes.len() * 6 + rows * (INDENT.len() + 1) + 128);

    writeln!(out, "const uint8_t {ident}[] PROGMEM = {{").ok();

    for (i, chunk) in bytes.chunks(chunk_width).enumerate() {
        out.push_str(INDENT);
        for (j, byte) in chunk.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            write!(out, "0x{byte:02x}").ok();
        }
        if i + 1 < rows {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("};\n");
    writeln!(out, "const size_t {ident}{LEN_SUFFIX} = {};", bytes.len()).ok();
    out
}
