//! Shard merging: clean each shard, reconcile it against its raw image
//! directory, and concatenate the survivors into the unified table.

use crate::cleaning::{CleaningConfig, RecordCleaner};
use crate::ingest::{self, FeatureTable, Shard};
use crate::models::Dish;
use crate::sync;
use anyhow::{Context, Result};
use log::info;

pub struct ShardMerger {
    cleaner: RecordCleaner,
}

#[derive(Debug)]
pub struct ShardOutcome {
    pub dishes: Vec<Dish>,
    pub raw_rows: usize,
    pub rows_dropped_by_sync: usize,
    pub files_deleted_by_sync: usize,
}

impl ShardMerger {
    pub fn new(cfg: CleaningConfig) -> Self {
        Self {
            cleaner: RecordCleaner::new(cfg),
        }
    }

    /// Clean one shard and enforce the row/file bijection against its raw
    /// image directory. Row-level problems only ever drop rows; a missing
    /// input file or directory is fatal.
    pub fn process_shard(&self, shard: &Shard, features: &FeatureTable) -> Result<ShardOutcome> {
        let raw = ingest::read_dish_csv(&shard.csv_path)?;
        let raw_rows = raw.len();
        let scrubbed = self.cleaner.scrub(raw);
        let dishes = self.cleaner.finish(scrubbed, features);

        let image_dir = shard
            .image_dir
            .as_deref()
            .with_context(|| format!("shard {} has no image directory", shard.index))?;
        let outcome = sync::sync_with_dir(dishes, image_dir)?;

        Ok(ShardOutcome {
            dishes: outcome.dishes,
            raw_rows,
            rows_dropped_by_sync: outcome.rows_dropped,
            files_deleted_by_sync: outcome.files_deleted,
        })
    }

    /// Process every shard in order and concatenate the results. Shard order
    /// and within-shard row order are both preserved; nothing re-sorts the
    /// unified table.
    pub fn merge(&self, shards: &[Shard], features: &FeatureTable) -> Result<Vec<Dish>> {
        let mut unified = Vec::new();
        for shard in shards {
            let out = self.process_shard(shard, features)?;
            info!(
                "shard {}: {} raw rows -> {} clean pairs (sync dropped {} rows, {} files)",
                shard.index,
                out.raw_rows,
                out.dishes.len(),
                out.rows_dropped_by_sync,
                out.files_deleted_by_sync
            );
            unified.extend(out.dishes);
        }
        Ok(unified)
    }
}
