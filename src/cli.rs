use crate::config::{AppConfig, CleanConfig};
use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "menu_reconciler",
    version,
    about = "Reconcile menu CSV shards with dish image directories",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full pipeline: clean, merge, normalize, dedup, sync, augment
    Run(RunArgs),
    /// Per-shard cleaning only (no feature join, no image stages)
    Clean(CleanArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory with dishes_info_<n>.csv shards (env: MENU_DATA_DIR)
    #[arg(long, value_name = "DIR", env = "MENU_DATA_DIR")]
    pub data_dir: PathBuf,
    /// Directory with food_img_re_<n> image directories (env: MENU_IMAGE_ROOT)
    #[arg(long, value_name = "DIR", env = "MENU_IMAGE_ROOT")]
    pub image_root: PathBuf,
    /// Feature-analysis CSV: shop_id, shop_name, feature label (env: MENU_FEATURE_CSV)
    #[arg(long, value_name = "FILE", env = "MENU_FEATURE_CSV")]
    pub feature_csv: PathBuf,
    /// Output directory for the CSVs and pooled image directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
    /// Minimum dish price; cheaper rows are dropped
    #[arg(long, value_name = "PRICE", default_value_t = 30)]
    pub min_price: i64,
    /// Worker threads for image normalization
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub workers: usize,
}

impl RunArgs {
    pub fn to_app_config(&self) -> Result<AppConfig, ConfigError> {
        let cfg = AppConfig {
            data_dir: self.data_dir.clone(),
            image_root: self.image_root.clone(),
            feature_csv: self.feature_csv.clone(),
            out_dir: self.out_dir.clone(),
            min_price: self.min_price,
            workers: self.workers,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory with dishes_info_<n>.csv shards (env: MENU_DATA_DIR)
    #[arg(long, value_name = "DIR", env = "MENU_DATA_DIR")]
    pub data_dir: PathBuf,
    /// Output directory for per-shard cleaned CSVs
    #[arg(long, value_name = "DIR", default_value = "clean_Data")]
    pub out_dir: PathBuf,
    /// Minimum dish price; cheaper rows are dropped
    #[arg(long, value_name = "PRICE", default_value_t = 10)]
    pub min_price: i64,
}

impl CleanArgs {
    pub fn to_clean_config(&self) -> Result<CleanConfig, ConfigError> {
        let cfg = CleanConfig {
            data_dir: self.data_dir.clone(),
            out_dir: self.out_dir.clone(),
            min_price: self.min_price,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}
