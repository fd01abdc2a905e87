//! End-to-end pipeline test over a temporary shard tree: cleaning, merge,
//! image normalization, pixel dedup, referential sync, and augmentation.

use image::{Rgb, RgbImage};
use menu_reconciler::config::AppConfig;
use menu_reconciler::models::Dish;
use menu_reconciler::orchestrator::{self, AUGMENTED_CSV, POOLED_IMAGE_DIR, UNIFIED_CSV};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

fn flat(color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(400, 400, Rgb(color))
}

fn read_dishes(path: &Path) -> Vec<Dish> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.deserialize().map(|r| r.unwrap()).collect()
}

fn setup(tmp: &Path) -> AppConfig {
    let data_dir = tmp.join("data");
    let image_root = tmp.join("images");
    let img_dir = image_root.join("food_img_re_1");
    let out_dir = tmp.join("out");
    fs::create_dir_all(&data_dir).unwrap();
    fs::create_dir_all(&img_dir).unwrap();

    // Headerless shard export with a UTF-8 BOM, price at column 4.
    let mut csv = Vec::new();
    csv.extend_from_slice(b"\xef\xbb\xbf");
    csv.extend_from_slice(
        concat!(
            "a.jpg,braised pork,f1,classic,80,(\u{25b3}) No. 5 Lane 2,121.5,25.0,Taiwanese,s1,main\n",
            "b.jpg,cheap side,f2,small,29,No. 6,121.5,25.0,Taiwanese,s1,side\n",
            "c.jpg,bibimbap,f3,stone bowl,180,No. 7,121.5,25.0,Korean BBQ,s2,main\n",
            "d.jpg,family pizza,f4,large,350,No. 8,121.5,25.0,Pizza,s1,main\n",
            "e.jpg,lost dish,f5,gone,100,No. 9,121.5,25.0,Taiwanese,s1,main\n",
            "x.jpg,braised pork again,f1,dup,90,No. 5,121.5,25.0,Taiwanese,s1,main\n",
            "g.jpg,lookalike,f6,same photo,60,No. 10,121.5,25.0,Taiwanese,s1,main\n",
        )
        .as_bytes(),
    );
    fs::write(data_dir.join("dishes_info_1.csv"), csv).unwrap();

    fs::write(tmp.join("features.csv"), "s1,Shop One,fast casual\n").unwrap();

    flat([200, 40, 40]).save(img_dir.join("a.jpg")).unwrap();
    flat([40, 200, 40]).save(img_dir.join("b.jpg")).unwrap();
    flat([40, 40, 200]).save(img_dir.join("c.jpg")).unwrap();
    flat([200, 200, 40]).save(img_dir.join("d.jpg")).unwrap();
    // same pixel content as a.jpg, different name
    fs::copy(img_dir.join("a.jpg"), img_dir.join("g.jpg")).unwrap();
    // no row references this one
    flat([90, 90, 90]).save(img_dir.join("stray.jpg")).unwrap();
    // e.jpg deliberately absent

    AppConfig {
        data_dir,
        image_root,
        feature_csv: tmp.join("features.csv"),
        out_dir,
        min_price: 30,
        workers: 2,
    }
}

#[test]
fn full_pipeline_produces_consistent_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = setup(tmp.path());

    let summary = orchestrator::run(&cfg).unwrap();
    assert_eq!(summary.shards, 1);
    assert_eq!(summary.unified_rows, 4); // a, c, d, g
    assert_eq!(summary.duplicate_images_removed, 1); // g.jpg
    assert_eq!(summary.synced_rows, 3); // a, c, d
    assert_eq!(summary.variants_created, 3); // c_lr, d_lr, d_ud
    assert_eq!(summary.final_rows, 6);

    // Unified table: cleaned, merged, synced against the raw directory.
    let unified = read_dishes(&cfg.out_dir.join(UNIFIED_CSV));
    let pics: Vec<&str> = unified.iter().map(|d| d.pic_id.as_str()).collect();
    assert_eq!(pics, vec!["a.jpg", "c.jpg", "d.jpg", "g.jpg"]);

    let a = &unified[0];
    assert_eq!(a.address, "No. 5 Lane 2"); // noise marker stripped
    assert_eq!(a.label, "TW"); // Taiwanese merged
    assert_eq!(a.span, "fast casual"); // feature join hit
    let c = &unified[1];
    assert_eq!(c.label, "J&K");
    assert_eq!(c.span, "None"); // s2 missing from the feature table
    let d = &unified[2];
    assert_eq!(d.label, "American"); // Pizza trigger

    for dish in &unified {
        assert!(dish.price >= 30);
    }

    // Augmented table: originals first, then derived rows in generation order.
    let augmented = read_dishes(&cfg.out_dir.join(AUGMENTED_CSV));
    let pics: Vec<&str> = augmented.iter().map(|d| d.pic_id.as_str()).collect();
    assert_eq!(
        pics,
        vec!["a.jpg", "c.jpg", "d.jpg", "c_lr.jpg", "d_lr.jpg", "d_ud.jpg"]
    );
    // derived rows inherit everything but the key
    let d_ud = &augmented[5];
    assert_eq!(d_ud.price, 350);
    assert_eq!(d_ud.food_id, "f4");
    assert_eq!(d_ud.label, "American");

    // Bidirectional referential integrity against the pooled directory.
    let pooled = cfg.out_dir.join(POOLED_IMAGE_DIR);
    let files: BTreeSet<String> = fs::read_dir(&pooled)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let keys: BTreeSet<String> = augmented.iter().map(|d| d.pic_id.clone()).collect();
    assert_eq!(files, keys);
    assert_eq!(augmented.len(), keys.len(), "pic_id values must be unique");

    // Normalized and derived images all share the fixed square resolution.
    for name in &files {
        let img = image::open(pooled.join(name)).unwrap();
        assert_eq!((img.width(), img.height()), (224, 224), "{name}");
    }

    // The raw directory was pruned of orphans during the shard-stage sync.
    let raw_dir = cfg.image_root.join("food_img_re_1");
    assert!(!raw_dir.join("stray.jpg").exists());
    assert!(!raw_dir.join("b.jpg").exists());
    assert!(raw_dir.join("a.jpg").exists());
}

#[test]
fn rerun_against_populated_output_is_stable() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = setup(tmp.path());

    orchestrator::run(&cfg).unwrap();
    let first = read_dishes(&cfg.out_dir.join(AUGMENTED_CSV));

    // Second run re-normalizes into the already-populated pool and must not
    // corrupt it: same table, same file set.
    let summary = orchestrator::run(&cfg).unwrap();
    let second = read_dishes(&cfg.out_dir.join(AUGMENTED_CSV));
    let firsts: Vec<&str> = first.iter().map(|d| d.pic_id.as_str()).collect();
    let seconds: Vec<&str> = second.iter().map(|d| d.pic_id.as_str()).collect();
    assert_eq!(firsts, seconds);
    assert_eq!(summary.synced_rows, 3);

    let pooled = cfg.out_dir.join(POOLED_IMAGE_DIR);
    let files: BTreeSet<String> = fs::read_dir(&pooled)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    let keys: BTreeSet<String> = second.iter().map(|d| d.pic_id.clone()).collect();
    assert_eq!(files, keys);
}

#[test]
fn missing_feature_table_aborts_before_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = setup(tmp.path());
    cfg.feature_csv = tmp.path().join("nonexistent.csv");

    assert!(orchestrator::run(&cfg).is_err());
    assert!(!cfg.out_dir.join(UNIFIED_CSV).exists());
}
