use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the full reconciliation pipeline.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AppConfig {
    /// Directory holding the `dishes_info_<n>.csv` shard exports.
    pub data_dir: PathBuf,
    /// Directory holding the `food_img_re_<n>` raw image directories.
    pub image_root: PathBuf,
    /// Feature-analysis CSV joined on shop_id.
    pub feature_csv: PathBuf,
    /// Destination for the output CSVs and the pooled image directory.
    pub out_dir: PathBuf,
    /// Minimum dish price; cheaper rows are dropped during cleaning.
    pub min_price: i64,
    /// Worker threads for the image-normalization stage.
    pub workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            image_root: PathBuf::from("."),
            feature_csv: PathBuf::from("Feature_analys_all.csv"),
            out_dir: PathBuf::from("."),
            min_price: 30,
            workers: 5,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "data_dir" });
        }
        if self.image_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "image_root" });
        }
        if self.feature_csv.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "feature_csv",
            });
        }
        if self.min_price < 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_price",
                reason: format!("{} is negative", self.min_price),
            });
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

/// Configuration for the per-shard clean-only path (no feature join, no
/// image stages).
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct CleanConfig {
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub min_price: i64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            out_dir: PathBuf::from("clean_Data"),
            min_price: 10,
        }
    }
}

impl CleanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "data_dir" });
        }
        if self.min_price < 0 {
            return Err(ConfigError::InvalidValue {
                field: "min_price",
                reason: format!("{} is negative", self.min_price),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AppConfig::default().validate().is_ok());
        assert!(CleanConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let cfg = AppConfig {
            workers: 0,
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_negative_min_price_rejected() {
        let cfg = CleanConfig {
            min_price: -1,
            ..CleanConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
