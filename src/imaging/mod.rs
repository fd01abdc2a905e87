//! Image-stage operations: overlay masking + resize, pixel-level dedup, and
//! price-conditioned flip augmentation.

pub mod augment;
pub mod dedup;
pub mod normalize;

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// List the regular files in `dir` whose extension (case-insensitive) is in
/// `extensions`, sorted by filename. Sorting makes "first occurrence" during
/// dedup deterministic across platforms.
pub(crate) fn sorted_image_files(dir: &Path, extensions: &[&str]) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot list image directory {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if has_extension(&name, extensions) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            extensions.iter().any(|x| *x == e)
        })
        .unwrap_or(false)
}
