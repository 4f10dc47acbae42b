//! MIME type detection for embedded assets.
//!
//! The table is intentionally small: it covers what a typical front-end
//! bundle emits, and everything else is served as a generic binary.

use std::path::Path;

/// MIME type constants used by the embedder.
pub mod types {
    pub const HTML: &str = "text/html";
    pub const CSS: &str = "text/css";
    pub const JAVASCRIPT: &str = "application/javascript";
    pub const JSON: &str = "application/json";

    pub const SVG: &str = "image/svg+xml";
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const ICO: &str = "image/x-icon";

    pub const WOFF: &str = "font/woff";
    pub const WOFF2: &str = "font/woff2";

    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Resolve the content type of a file from its extension (case-insensitive).
///
/// Unknown or missing extensions resolve to `application/octet-stream`.
pub fn resolve(filename: impl AsRef<Path>) -> &'static str {
    let ext = filename
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    from_extension(ext.as_deref())
}

/// Resolve a lowercase extension (without the dot).
pub fn from_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("html") => types::HTML,
        Some("js") => types::JAVASCRIPT,
        Some("css") => types::CSS,
        Some("json") => types::JSON,
        Some("svg") => types::SVG,
        Some("png") => types::PNG,
        Some("jpg") => types::JPEG,
        Some("ico") => types::ICO,
        Some("woff") => types::WOFF,
        Some("woff2") => types::WOFF2,
        _ => types::OCTET_STREAM,
    }
}
