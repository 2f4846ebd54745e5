// crates/fixture-lease-core/src/builders.rs
// ============================================================================
// Module: Fixture Lease Payload Builders
// Description: Catalog item payloads used to seed list and filter views.
// Purpose: Produce realistic seed records without performing any I/O.
// Dependencies: rand, serde_json, time
// ============================================================================

//! ## Overview
//! [`CatalogItemBuilder`] produces a fixed-size batch of catalog items that
//! covers every item type, alternates activation, and sprinkles optional
//! attachment fields. The set of keys per item is a function of the item type
//! and index only; values are randomized unless an RNG seed is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::DEFAULT_GLOBAL_REQUIRED;
use crate::core::IdentityId;
use crate::core::SEED_TAG;
use crate::interfaces::PayloadBuilder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default batch tag added next to the seed tag.
pub const DEFAULT_BATCH_TAG: &str = "baseline";

/// Item types cycled through by the builder.
pub const ITEM_TYPES: [&str; 3] = ["PHYSICAL", "DIGITAL", "SERVICE"];

/// Categories assigned at random.
const CATEGORIES: [&str; 4] = ["Electronics", "Books", "Services", "Office"];

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds catalog item payloads for seeding.
#[derive(Debug, Clone)]
pub struct CatalogItemBuilder {
    /// Items per batch.
    count: u64,
    /// Secondary tag identifying the batch.
    batch_tag: String,
    /// Fixed RNG seed for reproducible values.
    rng_seed: Option<u64>,
}

impl Default for CatalogItemBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_REQUIRED)
    }
}

impl CatalogItemBuilder {
    /// Creates a builder producing `count` items per batch.
    #[must_use]
    pub fn new(count: u64) -> Self {
        Self {
            count,
            batch_tag: DEFAULT_BATCH_TAG.to_string(),
            rng_seed: None,
        }
    }

    /// Sets the batch tag.
    #[must_use]
    pub fn with_batch_tag(mut self, tag: impl Into<String>) -> Self {
        self.batch_tag = tag.into();
        self
    }

    /// Fixes the RNG seed so every batch has identical values.
    #[must_use]
    pub const fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Returns the number of items per batch.
    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Builds one item.
    fn item(&self, rng: &mut StdRng, index: u64, owner: Option<&IdentityId>, now: &Value) -> Value {
        // Index-driven type selection keeps every variant present in the batch.
        let item_type = ITEM_TYPES[usize::try_from(index % 3).unwrap_or_default()];
        let category = CATEGORIES.choose(rng).copied().unwrap_or("Office");
        let mut fields = Map::new();
        fields.insert(
            "name".to_string(),
            json!(format!("Item {index} {:06x}", rng.gen_range(0..0x0100_0000_u32))),
        );
        fields.insert("description".to_string(), json!(format!("Description for item {index}")));
        fields.insert("item_type".to_string(), json!(item_type));
        fields.insert("price".to_string(), json!(round_to(rng.gen_range(10.0..500.0), 100.0)));
        fields.insert("category".to_string(), json!(category));
        fields.insert("normalizedCategory".to_string(), json!("general"));
        fields.insert("is_active".to_string(), json!(index % 2 == 0));
        fields.insert("version".to_string(), json!(1));
        fields.insert("created_by".to_string(), json!(owner.map(IdentityId::as_str)));
        fields.insert("tags".to_string(), json!([SEED_TAG, self.batch_tag]));
        fields.insert("createdAt".to_string(), now.clone());

        match item_type {
            "PHYSICAL" => {
                fields.insert("weight".to_string(), json!(round_to(rng.gen_range(0.5..10.0), 100.0)));
                fields.insert(
                    "dimensions".to_string(),
                    json!({
                        "length": round_to(rng.gen_range(10.0..100.0), 10.0),
                        "width": round_to(rng.gen_range(10.0..100.0), 10.0),
                        "height": round_to(rng.gen_range(1.0..50.0), 10.0),
                    }),
                );
            }
            "DIGITAL" => {
                fields.insert(
                    "download_url".to_string(),
                    json!("https://example.com/download/file.zip"),
                );
                fields.insert("file_size".to_string(), json!(rng.gen_range(1_000..5_000_000_u64)));
            }
            _ => {
                fields.insert("duration_hours".to_string(), json!(rng.gen_range(1..=40_u32)));
            }
        }

        if index % 3 == 0 {
            fields.insert("embed_url".to_string(), json!("https://example.com/embed/demo"));
        }
        if index % 4 == 0 {
            fields.insert(
                "file_path".to_string(),
                json!(format!("uploads/items/{:032x}.pdf", rng.gen_range(0..u128::MAX))),
            );
            fields.insert(
                "file_metadata".to_string(),
                json!({
                    "original_name": "document.pdf",
                    "content_type": "application/pdf",
                    "size": rng.gen_range(1_000..500_000_u64),
                    "uploaded_at": now,
                }),
            );
        }
        Value::Object(fields)
    }
}

impl PayloadBuilder for CatalogItemBuilder {
    fn build(&self, owner: Option<&IdentityId>) -> Vec<Value> {
        let mut rng = self.rng_seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let now = OffsetDateTime::now_utc().format(&Rfc3339).map_or(Value::Null, Value::String);
        (0..self.count).map(|index| self.item(&mut rng, index, owner, &now)).collect()
    }

    fn batch_size(&self) -> Option<u64> {
        Some(self.count)
    }
}

/// Rounds `value` to the precision given by `scale` (100.0 for two decimals).
fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}
