//! Catalog domain types
//!
//! A raw supplier record is normalized into a searchable document plus a
//! vendor profile at ingestion time; both are immutable afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Searchable catalog entry. Owned exclusively by the retrieval index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub id: Uuid,
    /// Concatenated searchable fields: title, attribute key/value pairs,
    /// description, seller and company fields.
    pub text: String,
    /// Category derived from the record's source file, when known.
    pub source_category: Option<String>,
}

/// Vendor profile derived 1:1 from a raw catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorRecord {
    pub company_name: String,
    /// Free text, best-effort normalized to city/state.
    pub location: String,
    pub gst_status: String,
    /// Numeric 0-5 rendered as text, or "N/A".
    pub rating: String,
    pub availability: String,
    pub source_url: String,
    pub category: String,
}

impl VendorRecord {
    /// Deduplication identity: `(company_name, location)`, normalized.
    /// Returns `None` when the company name is empty — such records are
    /// skipped rather than grouped together.
    pub fn identity_key(&self) -> Option<(String, String)> {
        let company = self.company_name.trim().to_lowercase();
        if company.is_empty() {
            return None;
        }
        Some((company, self.location.trim().to_lowercase()))
    }
}

/// A normalized catalog record: the searchable document plus the vendor
/// profile extracted alongside it.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub document: CatalogDocument,
    pub vendor: VendorRecord,
}
