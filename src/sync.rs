//! Referential sync: enforce the row/file bijection between a dish table and
//! an image directory.

use crate::models::Dish;
use anyhow::{Context, Result};
use log::info;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug)]
pub struct SyncOutcome {
    pub dishes: Vec<Dish>,
    pub rows_dropped: usize,
    pub files_deleted: usize,
}

/// Drop every row without a matching file and delete every file without a
/// matching row. Both directions work from one snapshot of the directory
/// listing, so deletions never affect what is iterated.
pub fn sync_with_dir(dishes: Vec<Dish>, dir: &Path) -> Result<SyncOutcome> {
    let listing = snapshot_files(dir)?;

    let before = dishes.len();
    let kept: Vec<Dish> = dishes
        .into_iter()
        .filter(|d| listing.contains(&d.pic_id))
        .collect();
    let rows_dropped = before - kept.len();

    let keys: BTreeSet<&str> = kept.iter().map(|d| d.pic_id.as_str()).collect();
    let mut files_deleted = 0usize;
    for name in &listing {
        if !keys.contains(name.as_str()) {
            fs::remove_file(dir.join(name))
                .with_context(|| format!("deleting orphan image {name} in {}", dir.display()))?;
            files_deleted += 1;
        }
    }

    info!(
        "sync {}: dropped {} rows, deleted {} orphan files, {} pairs remain",
        dir.display(),
        rows_dropped,
        files_deleted,
        kept.len()
    );
    Ok(SyncOutcome {
        dishes: kept,
        rows_dropped,
        files_deleted,
    })
}

/// Materialize the directory listing once (regular files only).
fn snapshot_files(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot list image directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.insert(name.to_string());
            }
        }
    }
    Ok(names)
}
