//! Per-shard record cleaning: an ordered sequence of pure table transforms.
//!
//! Every step takes ownership of the table and returns a new one; unparsable
//! values disqualify their row and are never fatal to the shard.

use crate::ingest::FeatureTable;
use crate::models::{CleanDish, Dish, RawDish};
use log::debug;
use std::collections::HashSet;

/// Noise markers stripped from the address field. Spaced and longer variants
/// come first so the bare fragments only catch leftovers.
pub const ADDRESS_NOISE_TOKENS: &[&str] = &[
    "(△) ",
    "(△)",
    "(O) ",
    "(O)",
    "(X) ",
    "(X)",
    "(○) ",
    "(○)",
    "(x) (x) ",
    "(x) (x)",
    "(M) ",
    "(M)",
    "(#) ",
    "(#)",
    "( △)",
    "(△",
];

/// Category fragments removed from the label before the merge rules run.
pub const UNDEFINABLE_ITEMS: &[&str] = &[
    "Soups",
    "Noodles",
    "Hot Pot",
    "Fried Chicken",
    "Bento",
    "Teppanyaki",
];

/// Macro-category merge rules. Applied strictly in order over the *current*
/// label value, so a later rule whose trigger matches an earlier rewrite
/// overwrites it.
pub const MERGE_RULES: &[(&str, &[&str])] = &[
    ("Brunch", &["Breakfast", "Sandwiches & Toast"]),
    ("Drinks", &["Drinks", "Coffee"]),
    ("Desserts", &["Desserts", "Dou Hua", "Donut", "Cakes"]),
    ("Vegetarian", &["Vegetarian"]),
    ("American", &["American", "Pizza", "Steak", "Burgers"]),
    ("J&K", &["Japanese", "Korean"]),
    ("International", &["International", "Southeast Asian", "Curry"]),
    (
        "TW",
        &[
            "Taiwanese",
            "Lu wei",
            "Snacks",
            "TW Fried Chicken",
            "Fried Rice",
            "Chinese",
            "Hong Kong",
            "Dumpling",
            "Congee",
            "Healthy",
        ],
    ),
];

/// Value joined in for shop ids absent from the feature table.
pub const UNMATCHED_FEATURE: &str = "None";

#[derive(Debug, Clone)]
pub struct CleaningConfig {
    /// Rows priced below this are dropped. 30 for the merged pipeline,
    /// 10 for the per-shard clean-only path.
    pub min_price: i64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self { min_price: 30 }
    }
}

pub struct RecordCleaner {
    cfg: CleaningConfig,
}

impl RecordCleaner {
    pub fn new(cfg: CleaningConfig) -> Self {
        Self { cfg }
    }

    /// Run the fixed scrub sequence over one shard's raw rows.
    pub fn scrub(&self, rows: Vec<RawDish>) -> Vec<CleanDish> {
        let rows = filter_price(rows, self.cfg.min_price);
        let rows = dedup_by_food_id(rows);
        let rows = drop_missing_fields(rows);
        let rows = normalize_addresses(rows);
        let rows = strip_undefinable_items(rows);
        merge_categories(rows, MERGE_RULES)
    }

    /// Left-join the feature table onto scrubbed rows, producing final records.
    pub fn finish(&self, rows: Vec<CleanDish>, features: &FeatureTable) -> Vec<Dish> {
        join_features(rows, features)
    }
}

/// Coerce price to numeric, drop rows below the threshold or that fail to
/// parse, and round survivors to the nearest integer.
fn filter_price(rows: Vec<RawDish>, min_price: i64) -> Vec<CleanDish> {
    let before = rows.len();
    let kept: Vec<CleanDish> = rows
        .into_iter()
        .filter_map(|r| {
            let value: f64 = r.price.trim().parse().ok()?;
            if !value.is_finite() || value < min_price as f64 {
                return None;
            }
            Some(CleanDish {
                pic_id: r.pic_id,
                food_name: r.food_name,
                food_id: r.food_id,
                introduce: r.introduce,
                price: value.round() as i64,
                address: r.address,
                longitude: r.longitude,
                latitude: r.latitude,
                label: r.label,
                shop_id: r.shop_id,
                sort: r.sort,
            })
        })
        .collect();
    debug!("price filter (min {}): {} -> {} rows", min_price, before, kept.len());
    kept
}

/// Keep only the first row per distinct `food_id`, in original order.
fn dedup_by_food_id(rows: Vec<CleanDish>) -> Vec<CleanDish> {
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|r| seen.insert(r.food_id.clone()))
        .collect()
}

/// Drop rows missing a label or a shop id.
fn drop_missing_fields(rows: Vec<CleanDish>) -> Vec<CleanDish> {
    rows.into_iter()
        .filter(|r| !r.label.trim().is_empty() && !r.shop_id.trim().is_empty())
        .collect()
}

/// Strip the noise markers from the address, leaving the rest untouched.
fn normalize_addresses(mut rows: Vec<CleanDish>) -> Vec<CleanDish> {
    for row in &mut rows {
        row.address = strip_address_noise(&row.address);
    }
    rows
}

pub fn strip_address_noise(address: &str) -> String {
    let mut out = address.to_string();
    for token in ADDRESS_NOISE_TOKENS {
        if out.contains(token) {
            out = out.replace(token, "");
        }
    }
    out
}

/// Remove the verbatim undefinable-item fragments from the label.
fn strip_undefinable_items(mut rows: Vec<CleanDish>) -> Vec<CleanDish> {
    for row in &mut rows {
        for item in UNDEFINABLE_ITEMS {
            if row.label.contains(item) {
                row.label = row.label.replace(item, "");
            }
        }
    }
    rows
}

/// Apply the merge rules sequentially. Each rule rewrites the whole label to
/// its target when any trigger occurs in the label's current value.
pub fn merge_categories(
    mut rows: Vec<CleanDish>,
    rules: &[(&str, &[&str])],
) -> Vec<CleanDish> {
    for row in &mut rows {
        for (target, triggers) in rules {
            if triggers.iter().any(|t| row.label.contains(t)) {
                row.label = (*target).to_string();
            }
        }
    }
    rows
}

/// Left-join `shop_id` against the feature table; unmatched keys get the
/// literal `"None"`.
fn join_features(rows: Vec<CleanDish>, features: &FeatureTable) -> Vec<Dish> {
    rows.into_iter()
        .map(|r| {
            let span = features
                .get(&r.shop_id)
                .cloned()
                .unwrap_or_else(|| UNMATCHED_FEATURE.to_string());
            r.into_dish(span)
        })
        .collect()
}
