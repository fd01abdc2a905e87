//! CSV output: the unified/augmented tables (with header) and the per-shard
//! cleaned tables (headerless, original positional layout).

use crate::models::{CleanDish, Dish};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

const WRITE_BUF_CAPACITY: usize = 512 * 1024;

/// Write dishes with the fixed twelve-column header (serde field names are
/// the header; the in-memory tier stays off disk).
pub fn write_unified_csv(path: &Path, dishes: &[Dish]) -> Result<()> {
    let mut w = WriterBuilder::new().from_writer(open_buffered(path)?);
    for dish in dishes {
        w.serialize(dish)?;
    }
    w.flush()?;
    Ok(())
}

/// Write one shard's cleaned rows headerless, in the raw positional layout
/// (price back at column 4) so the file round-trips through ingestion.
pub fn write_shard_csv(path: &Path, rows: &[CleanDish]) -> Result<()> {
    let mut w = WriterBuilder::new()
        .has_headers(false)
        .from_writer(open_buffered(path)?);
    for r in rows {
        let price = r.price.to_string();
        w.write_record([
            r.pic_id.as_str(),
            r.food_name.as_str(),
            r.food_id.as_str(),
            r.introduce.as_str(),
            price.as_str(),
            r.address.as_str(),
            r.longitude.as_str(),
            r.latitude.as_str(),
            r.label.as_str(),
            r.shop_id.as_str(),
            r.sort.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn open_buffered(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("creating output file {}", path.display()))?;
    Ok(BufWriter::with_capacity(WRITE_BUF_CAPACITY, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest;

    fn dish(pic_id: &str, price: i64) -> Dish {
        Dish {
            pic_id: pic_id.into(),
            food_name: "dish".into(),
            food_id: "f1".into(),
            introduce: "tasty".into(),
            address: "addr".into(),
            longitude: "121.5".into(),
            latitude: "25.0".into(),
            label: "TW".into(),
            shop_id: "s1".into(),
            sort: "main".into(),
            price,
            span: "None".into(),
            tier: crate::models::price_tier(price),
        }
    }

    #[test]
    fn test_unified_csv_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge_data.csv");
        write_unified_csv(&path, &[dish("a.jpg", 80)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "pic_id,food_name,food_id,introduce,address,longitude,latitude,label,shop_id,sort,price,span"
        );
        assert_eq!(
            lines.next().unwrap(),
            "a.jpg,dish,f1,tasty,addr,121.5,25.0,TW,s1,main,80,None"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_shard_csv_round_trips_through_ingestion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned_data_FoodPanda_1.csv");
        let row = CleanDish {
            pic_id: "a.jpg".into(),
            food_name: "dish".into(),
            food_id: "f1".into(),
            introduce: String::new(),
            price: 42,
            address: "addr".into(),
            longitude: "121.5".into(),
            latitude: "25.0".into(),
            label: "TW".into(),
            shop_id: "s1".into(),
            sort: "main".into(),
        };
        write_shard_csv(&path, &[row]).unwrap();

        let back = ingest::read_dish_csv(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].pic_id, "a.jpg");
        assert_eq!(back[0].price, "42");
        assert_eq!(back[0].sort, "main");
    }

    #[test]
    fn test_output_parent_dirs_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep/nested/out.csv");
        write_unified_csv(&path, &[]).unwrap();
        assert!(path.exists());
    }
}
