use crate::error::IngestError;
use crate::models::RawDish;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw shard exports carry an optional UTF-8 byte-order mark.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Number of positional columns in a raw dish export.
const RAW_COLUMNS: usize = 11;

/// `shop_id` to feature-label mapping loaded from the feature-analysis CSV.
pub type FeatureTable = HashMap<String, String>;

/// One input unit: a shard CSV plus (for the full pipeline) its raw image
/// directory. The clean-only path discovers shards without image directories.
#[derive(Debug, Clone)]
pub struct Shard {
    pub index: u32,
    pub csv_path: PathBuf,
    pub image_dir: Option<PathBuf>,
}

fn io_err(path: &Path, e: &std::io::Error) -> IngestError {
    IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Read one headerless shard CSV into positional records. Rows with fewer
/// than the expected columns are dropped, not fatal; an unreadable file is.
pub fn read_dish_csv(path: &Path) -> Result<Vec<RawDish>, IngestError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, &e))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for rec in rdr.records() {
        let rec = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: unparsable row skipped: {}", path.display(), e);
                dropped += 1;
                continue;
            }
        };
        if rec.len() < RAW_COLUMNS {
            dropped += 1;
            continue;
        }
        rows.push(RawDish {
            pic_id: rec[0].to_string(),
            food_name: rec[1].to_string(),
            food_id: rec[2].to_string(),
            introduce: rec[3].to_string(),
            price: rec[4].to_string(),
            address: rec[5].to_string(),
            longitude: rec[6].to_string(),
            latitude: rec[7].to_string(),
            label: rec[8].to_string(),
            shop_id: rec[9].to_string(),
            sort: rec[10].to_string(),
        });
    }
    if dropped > 0 {
        debug!("{}: dropped {} malformed rows", path.display(), dropped);
    }
    Ok(rows)
}

/// Load the feature table (`shop_id, shop_name, feature label`, headerless).
/// On duplicate shop ids the last row wins.
pub fn read_feature_table(path: &Path) -> Result<FeatureTable, IngestError> {
    let bytes = fs::read(path).map_err(|e| io_err(path, &e))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    let mut table = FeatureTable::new();
    for rec in rdr.records() {
        let rec = rec.map_err(|e| IngestError::Csv {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if rec.len() < 3 {
            continue;
        }
        table.insert(rec[0].to_string(), rec[2].to_string());
    }
    Ok(table)
}

/// Discover numbered shards under `data_dir`. Shard CSVs are named
/// `dishes_info_<n>.csv`; with an image root, shard `n` pairs with
/// `<image_root>/food_img_re_<n>`. Shards come back in numeric order.
pub fn discover_shards(
    data_dir: &Path,
    image_root: Option<&Path>,
) -> Result<Vec<Shard>, IngestError> {
    let entries = fs::read_dir(data_dir).map_err(|e| io_err(data_dir, &e))?;

    let mut shards = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(data_dir, &e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(index) = shard_index(name) else {
            continue;
        };
        shards.push(Shard {
            index,
            csv_path: entry.path(),
            image_dir: image_root.map(|root| root.join(format!("food_img_re_{index}"))),
        });
    }
    if shards.is_empty() {
        return Err(IngestError::NoShards(data_dir.display().to_string()));
    }
    shards.sort_by_key(|s| s.index);
    Ok(shards)
}

fn shard_index(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("dishes_info_")?
        .strip_suffix(".csv")?
        .parse()
        .ok()
}
