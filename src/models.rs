use serde::{Deserialize, Serialize};

/// One dish row exactly as it appears in a raw shard export: eleven positional
/// columns, price still a free-form string at index 4.
#[derive(Debug, Clone)]
pub struct RawDish {
    pub pic_id: String,
    pub food_name: String,
    pub food_id: String,
    pub introduce: String,
    pub price: String,
    pub address: String,
    pub longitude: String,
    pub latitude: String,
    pub label: String,
    pub shop_id: String,
    pub sort: String,
}

/// A dish row after scrubbing: price coerced to an integer, address and label
/// cleaned. The feature label (`span`) is not attached yet.
#[derive(Debug, Clone)]
pub struct CleanDish {
    pub pic_id: String,
    pub food_name: String,
    pub food_id: String,
    pub introduce: String,
    pub price: i64,
    pub address: String,
    pub longitude: String,
    pub latitude: String,
    pub label: String,
    pub shop_id: String,
    pub sort: String,
}

impl CleanDish {
    /// Attach the joined feature label and derive the price tier. Field order
    /// here fixes the output column order (price second-to-last, span last).
    pub fn into_dish(self, span: String) -> Dish {
        let tier = price_tier(self.price);
        Dish {
            pic_id: self.pic_id,
            food_name: self.food_name,
            food_id: self.food_id,
            introduce: self.introduce,
            address: self.address,
            longitude: self.longitude,
            latitude: self.latitude,
            label: self.label,
            shop_id: self.shop_id,
            sort: self.sort,
            price: self.price,
            span,
            tier,
        }
    }
}

/// The unified-table record. Serialized field names double as the CSV header,
/// so their order is the on-disk column order. `tier` is derived bookkeeping
/// and stays off disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub pic_id: String,
    pub food_name: String,
    pub food_id: String,
    pub introduce: String,
    pub address: String,
    pub longitude: String,
    pub latitude: String,
    pub label: String,
    pub shop_id: String,
    pub sort: String,
    pub price: i64,
    pub span: String,
    #[serde(skip)]
    pub tier: u8,
}

impl Dish {
    /// Copy of this record keyed by a derived image name; everything else is
    /// inherited unchanged.
    pub fn with_pic_id(&self, pic_id: String) -> Dish {
        Dish {
            pic_id,
            ..self.clone()
        }
    }
}

/// Price bucket 1-6. Total over all integers: the ranges
/// {<=50, (50,100], (100,150], (150,200], (200,300], (300,inf)} neither
/// overlap nor leave gaps.
pub fn price_tier(price: i64) -> u8 {
    match price {
        p if p <= 50 => 1,
        p if p <= 100 => 2,
        p if p <= 150 => 3,
        p if p <= 200 => 4,
        p if p <= 300 => 5,
        _ => 6,
    }
}
