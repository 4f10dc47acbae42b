//! Embedded assets: discovery, naming, compression.
//!
//! # Module Structure
//!
//! | Module     | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `scan`     | Deterministic discovery of files under `dist`  |
//! | `ident`    | Path -> C identifier, per-run collision check  |
//! | `compress` | Reproducible gzip encoding                     |

pub mod compress;
pub mod ident;
pub mod scan;

pub use ident::IdentRegistry;
pub use scan::discover;

use std::path::Path;

use crate::error::GenerateError;
use crate::utils::mime;

/// Relative path of the site's entry document.
pub const ENTRY_DOCUMENT: &str = "index.html";

/// One discovered file, fully processed.
#[derive(Debug, Clone)]
pub struct AssetFile {
    /// `/`-separated path relative to the build output root.
    pub relative_path: String,
    /// Uncompressed file contents.
    pub raw: Vec<u8>,
    /// Gzip-compressed contents, as embedded.
    pub compressed: Vec<u8>,
    /// Content type served for this asset.
    pub mime: &'static str,
    /// C identifier of the byte array.
    pub identifier: String,
}

impl AssetFile {
    /// Read and compress `relative_path` under `root`.
    ///
    /// `identifier` must already be reserved in the run's [`IdentRegistry`].
    pub fn load(
        root: &Path,
        relative_path: &str,
        identifier: String,
        level: u32,
    ) -> Result<Self, GenerateError> {
        let path = root.join(relative_path);
        let raw = std::fs::read(&path).map_err(|e| GenerateError::io(&path, e))?;
        let compressed = compress::compress(&raw, level).map_err(|e| GenerateError::io(&path, e))?;

        Ok(Self {
            mime: mime::resolve(relative_path),
            relative_path: relative_path.to_string(),
            raw,
            compressed,
            identifier,
        })
    }

    /// Whether this asset is the entry document, also served at `/`.
    pub fn is_entry(&self) -> bool {
        self.relative_path == ENTRY_DOCUMENT
    }
}
