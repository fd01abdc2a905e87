//! Price-conditioned flip augmentation. Expensive dishes are rare, so their
//! images get mirrored (and, above a higher bar, vertically flipped) variants
//! with matching derived records.

use crate::models::Dish;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;

/// Mirror (`_lr`) variants are produced for prices at or above this value.
pub const MIRROR_MIN_PRICE: i64 = 150;

/// Vertical-flip (`_ud`) variants are produced for prices strictly above this
/// value, always in addition to the mirror variant.
pub const FLIP_MIN_PRICE: i64 = 300;

#[derive(Debug, Default)]
pub struct AugmentStats {
    pub mirrored: usize,
    pub flipped: usize,
    pub missing: usize,
}

/// Produce flip variants for every eligible row whose image exists in `dir`,
/// returning the input table with all derived rows appended. Derived rows are
/// generated per source row in mirror-then-flip order; the `_ud` variant is
/// flipped from the original image, not the mirrored one.
pub fn augment(dishes: &[Dish], dir: &Path) -> Result<(Vec<Dish>, AugmentStats)> {
    let mut stats = AugmentStats::default();
    let mut derived = Vec::new();

    for dish in dishes {
        let path = dir.join(&dish.pic_id);
        if !path.is_file() {
            debug!("no image for {}, skipping augmentation", dish.pic_id);
            stats.missing += 1;
            continue;
        }
        if dish.price < MIRROR_MIN_PRICE {
            continue;
        }
        let img = match image::open(&path) {
            Ok(img) => img,
            Err(e) => {
                warn!("cannot decode {}: {e:#}", dish.pic_id);
                continue;
            }
        };
        let stem = image_stem(&dish.pic_id);

        let lr_name = format!("{stem}_lr.jpg");
        img.fliph()
            .save(dir.join(&lr_name))
            .with_context(|| format!("writing mirrored variant {lr_name}"))?;
        derived.push(dish.with_pic_id(lr_name));
        stats.mirrored += 1;

        if dish.price > FLIP_MIN_PRICE {
            let ud_name = format!("{stem}_ud.jpg");
            img.flipv()
                .save(dir.join(&ud_name))
                .with_context(|| format!("writing flipped variant {ud_name}"))?;
            derived.push(dish.with_pic_id(ud_name));
            stats.flipped += 1;
        }
    }

    let mut all = dishes.to_vec();
    all.extend(derived);
    Ok((all, stats))
}

fn image_stem(pic_id: &str) -> &str {
    Path::new(pic_id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(pic_id)
}
