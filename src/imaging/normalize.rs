//! Overlay masking and resizing of raw dish photos.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use log::warn;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Vertical bands (top..bottom, in source pixels) covering the caption and
/// watermark overlays burned into the raw exports.
const MASK_BANDS: [(u32, u32); 2] = [(240, 310), (690, 760)];

/// Horizontal extent of the mask bands.
const MASK_X_EXTENT: u32 = 1000;

/// Output edge length; images are resized to exactly this square.
pub const TARGET_EDGE: u32 = 224;

#[derive(Debug, Default)]
pub struct NormalizeStats {
    pub processed: usize,
    pub skipped: usize,
}

/// Mask and resize every `.jpg` under `src`, writing results under `dst` with
/// the same filename. Files are independent, so the work runs on a bounded
/// rayon pool; a corrupt file is logged and skipped, never fatal.
pub fn normalize_dir(src: &Path, dst: &Path, workers: usize) -> Result<NormalizeStats> {
    fs::create_dir_all(dst)
        .with_context(|| format!("creating output directory {}", dst.display()))?;
    let names = super::sorted_image_files(src, &["jpg"])?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()
        .context("building image worker pool")?;

    let skipped = AtomicUsize::new(0);
    pool.install(|| {
        names.par_iter().for_each(|name| {
            if let Err(e) = normalize_one(&src.join(name), &dst.join(name)) {
                warn!("skipping {name}: {e:#}");
                skipped.fetch_add(1, Ordering::Relaxed);
            }
        });
    });

    let skipped = skipped.into_inner();
    Ok(NormalizeStats {
        processed: names.len() - skipped,
        skipped,
    })
}

fn normalize_one(src: &Path, dst: &Path) -> Result<()> {
    let img = image::open(src).with_context(|| format!("decoding {}", src.display()))?;
    let mut rgb = img.into_rgb8();
    mask_overlay_bands(&mut rgb);
    let resized = image::imageops::resize(&rgb, TARGET_EDGE, TARGET_EDGE, FilterType::Triangle);
    resized
        .save(dst)
        .with_context(|| format!("writing {}", dst.display()))?;
    Ok(())
}

/// Paint the two fixed overlay bands black, clamped to the image bounds.
pub(crate) fn mask_overlay_bands(img: &mut RgbImage) {
    let (width, height) = img.dimensions();
    let x_end = MASK_X_EXTENT.min(width);
    for &(top, bottom) in &MASK_BANDS {
        for y in top..bottom.min(height) {
            for x in 0..x_end {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_covers_bands_and_nothing_else() {
        let mut img = RgbImage::from_pixel(1200, 1000, Rgb([200, 200, 200]));
        mask_overlay_bands(&mut img);

        assert_eq!(*img.get_pixel(0, 240), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(999, 309), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(500, 690), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(500, 759), Rgb([0, 0, 0]));
        // just outside the bands and past the x extent
        assert_eq!(*img.get_pixel(500, 239), Rgb([200, 200, 200]));
        assert_eq!(*img.get_pixel(500, 310), Rgb([200, 200, 200]));
        assert_eq!(*img.get_pixel(500, 760), Rgb([200, 200, 200]));
        assert_eq!(*img.get_pixel(1001, 250), Rgb([200, 200, 200]));
    }

    #[test]
    fn test_mask_clamps_to_small_images() {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([200, 200, 200]));
        mask_overlay_bands(&mut img);
        // both bands lie outside a 100x100 image, so nothing changes
        assert_eq!(*img.get_pixel(50, 50), Rgb([200, 200, 200]));
    }

    #[test]
    fn test_normalize_dir_resizes_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir(&src).unwrap();

        RgbImage::from_pixel(800, 800, Rgb([250, 250, 250]))
            .save(src.join("a.jpg"))
            .unwrap();
        fs::write(src.join("broken.jpg"), b"not a jpeg").unwrap();
        fs::write(src.join("ignored.txt"), b"x").unwrap();

        let stats = normalize_dir(&src, &dst, 2).unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.skipped, 1);

        let out = image::open(dst.join("a.jpg")).unwrap();
        assert_eq!((out.width(), out.height()), (TARGET_EDGE, TARGET_EDGE));
        assert!(!dst.join("broken.jpg").exists());
        assert!(!dst.join("ignored.txt").exists());
    }

    #[test]
    fn test_normalized_output_keeps_masked_band_dark() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir(&src).unwrap();

        RgbImage::from_pixel(1000, 1000, Rgb([255, 255, 255]))
            .save(src.join("a.jpg"))
            .unwrap();
        normalize_dir(&src, &dst, 1).unwrap();

        let out = image::open(dst.join("a.jpg")).unwrap().into_rgb8();
        // y=700 in the source maps to roughly y=157 after the 224 resize
        let px = out.get_pixel(112, 157);
        assert!(px.0[0] < 60, "masked band should stay dark, got {:?}", px);
        // well clear of both bands stays bright
        let px = out.get_pixel(112, 10);
        assert!(px.0[0] > 200, "unmasked area should stay bright, got {:?}", px);
    }
}
