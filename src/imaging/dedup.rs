//! Content-based image dedup: hash decoded pixels so re-encodes of the same
//! picture collide, keep the first file in filename order, delete the rest.

use anyhow::Result;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Default)]
pub struct DedupStats {
    pub kept: usize,
    pub deleted: usize,
    pub skipped: usize,
}

/// Remove every image in `dir` whose decoded pixel content was already seen.
/// The file list is materialized and sorted up front, so deletions cannot
/// perturb the iteration and reruns are no-ops.
pub fn dedup_dir(dir: &Path) -> Result<DedupStats> {
    let names = super::sorted_image_files(dir, IMAGE_EXTENSIONS)?;

    let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(names.len());
    let mut stats = DedupStats::default();
    for name in &names {
        let path = dir.join(name);
        let hash = match pixel_hash(&path) {
            Ok(h) => h,
            Err(e) => {
                warn!("skipping {name}: {e:#}");
                stats.skipped += 1;
                continue;
            }
        };
        if seen.insert(hash) {
            stats.kept += 1;
        } else {
            debug!("removing duplicate image {name}");
            fs::remove_file(&path)?;
            stats.deleted += 1;
        }
    }
    Ok(stats)
}

/// Digest of the decoded RGB pixel buffer, prefixed with the dimensions so
/// equal byte streams of different shapes cannot collide.
fn pixel_hash(path: &Path) -> Result<[u8; 32]> {
    let img = image::open(path)?;
    let rgb = img.into_rgb8();
    let (width, height) = rgb.dimensions();
    let mut hasher = Sha256::new();
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(rgb.as_raw());
    Ok(hasher.finalize().into())
}
