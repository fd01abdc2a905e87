//! High-level pipeline coordination: shard cleaning and merge, image-stage
//! processing, final sync, augmentation, and artifact writing.

use crate::cleaning::{CleaningConfig, RecordCleaner};
use crate::config::{AppConfig, CleanConfig};
use crate::export;
use crate::imaging;
use crate::ingest::{self, Shard};
use crate::merge::ShardMerger;
use crate::sync;
use anyhow::{ensure, Context, Result};
use log::info;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Canonical intermediate artifact: the cleaned, merged, pre-augmentation table.
pub const UNIFIED_CSV: &str = "merge_data.csv";
/// Final artifact: the synced table plus all derived flip rows.
pub const AUGMENTED_CSV: &str = "merge_data_flipped.csv";
/// Pooled directory of normalized, deduplicated, augmented images.
pub const POOLED_IMAGE_DIR: &str = "flipped_img";

#[derive(Debug)]
pub struct RunSummary {
    pub shards: usize,
    pub unified_rows: usize,
    pub synced_rows: usize,
    pub final_rows: usize,
    pub images_normalized: usize,
    pub duplicate_images_removed: usize,
    pub variants_created: usize,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub elapsed: std::time::Duration,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} shards, {} unified rows, {} after sync, {} final rows ({} variants), \
             {} images normalized, {} duplicates removed, {:.1}s",
            self.shards,
            self.unified_rows,
            self.synced_rows,
            self.final_rows,
            self.variants_created,
            self.images_normalized,
            self.duplicate_images_removed,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Run the full pipeline. Fatal-input checks happen before anything is
/// written, so a bad run leaves no partial artifacts behind.
pub fn run(cfg: &AppConfig) -> Result<RunSummary> {
    let started_utc = chrono::Utc::now();
    let t0 = Instant::now();

    let shards = ingest::discover_shards(&cfg.data_dir, Some(&cfg.image_root))?;
    preflight(&shards, &cfg.feature_csv)?;
    info!("discovered {} shards under {}", shards.len(), cfg.data_dir.display());

    let features = ingest::read_feature_table(&cfg.feature_csv)?;
    let pooled = cfg.out_dir.join(POOLED_IMAGE_DIR);
    bootstrap_dir(&pooled)?;

    // Stage 1: per-shard cleaning, sync against raw directories, merge.
    let merger = ShardMerger::new(CleaningConfig {
        min_price: cfg.min_price,
    });
    let unified = merger.merge(&shards, &features)?;
    let unified_rows = unified.len();
    export::write_unified_csv(&cfg.out_dir.join(UNIFIED_CSV), &unified)?;
    info!("unified table written: {unified_rows} rows");

    // Stage 2: mask + resize every shard's images into the pooled directory.
    let mut images_normalized = 0usize;
    for shard in &shards {
        let dir = shard.image_dir.as_deref().expect("run shards carry image dirs");
        let stats = imaging::normalize::normalize_dir(dir, &pooled, cfg.workers)?;
        info!(
            "shard {}: normalized {} images ({} skipped)",
            shard.index, stats.processed, stats.skipped
        );
        images_normalized += stats.processed;
    }

    // Stage 3: pixel-level dedup over the pooled directory.
    let dd = imaging::dedup::dedup_dir(&pooled)?;
    info!(
        "image dedup: kept {}, removed {} duplicates, skipped {}",
        dd.kept, dd.deleted, dd.skipped
    );

    // Stage 4: re-sync the unified table against the deduplicated pool.
    let synced = sync::sync_with_dir(unified, &pooled)?;
    let synced_rows = synced.dishes.len();

    // Stage 5: price-conditioned flip augmentation.
    let (augmented, astats) = imaging::augment::augment(&synced.dishes, &pooled)?;
    export::write_unified_csv(&cfg.out_dir.join(AUGMENTED_CSV), &augmented)?;
    info!(
        "augmentation: {} mirrored, {} flipped, {} rows missing images",
        astats.mirrored, astats.flipped, astats.missing
    );
    info!("pipeline finished: {UNIFIED_CSV} and {AUGMENTED_CSV} written");

    Ok(RunSummary {
        shards: shards.len(),
        unified_rows,
        synced_rows,
        final_rows: augmented.len(),
        images_normalized,
        duplicate_images_removed: dd.deleted,
        variants_created: astats.mirrored + astats.flipped,
        started_utc,
        elapsed: t0.elapsed(),
    })
}

/// Run only the per-shard cleaning path, writing one headerless cleaned CSV
/// per shard.
pub fn run_clean_only(cfg: &CleanConfig) -> Result<usize> {
    let shards = ingest::discover_shards(&cfg.data_dir, None)?;
    bootstrap_dir(&cfg.out_dir)?;

    let cleaner = RecordCleaner::new(CleaningConfig {
        min_price: cfg.min_price,
    });
    let mut total = 0usize;
    for shard in &shards {
        let raw = ingest::read_dish_csv(&shard.csv_path)?;
        let rows = cleaner.scrub(raw);
        let out_path = cfg
            .out_dir
            .join(format!("cleaned_data_FoodPanda_{}.csv", shard.index));
        export::write_shard_csv(&out_path, &rows)?;
        info!("shard {}: {} cleaned rows -> {}", shard.index, rows.len(), out_path.display());
        total += rows.len();
    }
    Ok(total)
}

/// There is no valid partial output without the primary inputs, so every
/// shard's CSV and image directory must exist before any stage runs.
fn preflight(shards: &[Shard], feature_csv: &Path) -> Result<()> {
    ensure!(
        feature_csv.is_file(),
        "feature table {} not found",
        feature_csv.display()
    );
    for shard in shards {
        ensure!(
            shard.csv_path.is_file(),
            "shard {} csv {} not found",
            shard.index,
            shard.csv_path.display()
        );
        let dir = shard
            .image_dir
            .as_deref()
            .with_context(|| format!("shard {} has no image directory", shard.index))?;
        ensure!(
            dir.is_dir(),
            "shard {} image directory {} not found",
            shard.index,
            dir.display()
        );
    }
    Ok(())
}

fn bootstrap_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        info!("{} already exists", dir.display());
    } else {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        info!("{} did not exist, created it", dir.display());
    }
    Ok(())
}
