//! Presentation enrichment.
//!
//! Decorative inventory fields (stock status, lead time, SKU) for the UI
//! layer. These are derived, not real inventory data, and they sit outside
//! the estimation core: nothing here feeds budget or schedule math. Values
//! are hashed from the vendor/material pair rather than randomized so
//! reports stay byte-stable across identical runs.

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::VendorRecord;

/// Decorative inventory annotation for one vendor/material pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryDecoration {
    pub sku: String,
    pub stock_status: String,
    pub lead_time_days: u32,
}

const STOCK_STATUSES: [&str; 3] = ["In Stock", "Limited Stock", "Made to Order"];

/// Decorate a vendor/material pairing with display-only inventory fields.
pub fn decorate_inventory(vendor: &VendorRecord, material_name: &str) -> InventoryDecoration {
    let mut hasher = DefaultHasher::new();
    vendor.company_name.to_lowercase().hash(&mut hasher);
    vendor.location.to_lowercase().hash(&mut hasher);
    material_name.to_lowercase().hash(&mut hasher);
    let seed = hasher.finish();

    let prefix: String = material_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let prefix = if prefix.is_empty() { "SKU".to_string() } else { prefix };

    InventoryDecoration {
        sku: format!("{prefix}-{:05}", seed % 100_000),
        stock_status: STOCK_STATUSES[(seed % STOCK_STATUSES.len() as u64) as usize].to_string(),
        lead_time_days: 3 + (seed % 42) as u32,
    }
}
