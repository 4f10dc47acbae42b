//! Identifier generation for embedded assets.
//!
//! Every asset becomes two C symbols: `<ident>` (the byte array) and
//! `<ident>_len` (its length). [`IdentRegistry`] owns the names handed out
//! during one run and rejects any asset whose symbols clash with an earlier
//! one.

use rustc_hash::FxHashMap;

use crate::error::GenerateError;

/// Suffix of the generated length constant.
pub const LEN_SUFFIX: &str = "_len";

/// Map a relative asset path to a C identifier.
///
/// Path separators, `.` and every other character that is not an ASCII
/// letter, digit or `_` become `_`. A leading digit gets a `_` prefix.
///
/// ```text
/// index.html          -> index_html
/// assets/app-1a2b.js  -> assets_app_1a2b_js
/// 404.html            -> _404_html
/// ```
pub fn sanitize(relative_path: &str) -> String {
    let mut ident: String = relative_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Identifiers assigned so far in the current run.
#[derive(Debug, Default)]
pub struct IdentRegistry {
    /// Generated symbol -> relative path that owns it.
    owners: FxHashMap<String, String>,
}

impl IdentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitize `relative_path` and reserve its symbols.
    ///
    /// Fails with `DuplicateIdentifier` if either symbol is already taken.
    pub fn assign(&mut self, relative_path: &str) -> Result<String, GenerateError> {
        let ident = sanitize(relative_path);
        let len_ident = format!("{ident}{LEN_SUFFIX}");

        for name in [&ident, &len_ident] {
            if let Some(first) = self.owners.get(name.as_str()) {
                return Err(GenerateError::DuplicateIdentifier {
                    name: name.clone(),
                    first: first.clone(),
                    second: relative_path.to_string(),
                });
            }
        }

        self.owners.insert(len_ident, relative_path.to_string());
        self.owners.insert(ident.clone(), relative_path.to_string());
        Ok(ident)
    }
}
