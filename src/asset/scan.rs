//! Asset discovery (read-only, no side effects).

use std::path::Path;

use crate::error::GenerateError;

/// Discover every regular file under `root`.
///
/// Returns `/`-separated paths relative to `root`, sorted byte-wise so the
/// result does not depend on directory enumeration order.
///
/// ```text
/// dist/
/// ├── index.html          -> "index.html"
/// └── assets/
///     ├── app.js          -> "assets/app.js"
///     └── style.css       -> "assets/style.css"
/// ```
pub fn discover(root: &Path) -> Result<Vec<String>, GenerateError> {
    let mut results = Vec::new();
    discover_recursive(&mut results, root, "")?;
    results.sort_unstable();
    Ok(results)
}

/// Recursive helper, `prefix` is the relative path of `dir` (empty for root).
fn discover_recursive(
    results: &mut Vec<String>,
    dir: &Path,
    prefix: &str,
) -> Result<(), GenerateError> {
    let entries = std::fs::read_dir(dir).map_err(|e| GenerateError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::io(dir, e))?;
        let path = entry.path();

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            return Err(GenerateError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "file name is not UTF-8"),
            ));
        };
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        // Follows symlinks; anything that is neither a file nor a directory is skipped
        if path.is_dir() {
            discover_recursive(results, &path, &rel)?;
        } else if path.is_file() {
            results.push(rel);
        }
    }

    Ok(())
}
