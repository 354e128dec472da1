//! Vendor resolution.
//!
//! For each material category, query the retrieval index with the search
//! term plus the project location, over-fetching to absorb duplicates,
//! then deduplicate by vendor identity while preserving rank order. When
//! catalog-backed retrieval is unavailable, fall back to the external
//! vendor lookup service.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::domain::VendorRecord;
use crate::error::CoreError;
use crate::index::RetrievalIndex;
use crate::services::{Embedder, VendorSource};

/// Metro disjunction used to broaden the query when no location is known.
const MAJOR_METROS: [&str; 6] = [
    "Mumbai",
    "Delhi",
    "Bengaluru",
    "Chennai",
    "Hyderabad",
    "Pune",
];

/// Candidates requested per vendor kept, to absorb duplicate identities.
const OVERFETCH_FACTOR: usize = 3;

/// Build the retrieval query for a material search term.
pub fn vendor_search_query(search_term: &str, location: Option<&str>) -> String {
    match location.filter(|l| !l.trim().is_empty()) {
        Some(location) => format!("{search_term} supplier in {location}"),
        None => format!("{search_term} supplier in {}", MAJOR_METROS.join(" or ")),
    }
}

/// Deduplicate vendors by identity key, preserving rank order and keeping
/// the first (best-ranked) record per identity. Vendors with an
/// unresolvable identity are skipped. Truncates to `k`.
pub fn dedupe_vendors(
    candidates: impl IntoIterator<Item = VendorRecord>,
    k: usize,
) -> Vec<VendorRecord> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut kept = Vec::new();
    for vendor in candidates {
        let Some(key) = vendor.identity_key() else {
            continue;
        };
        if seen.insert(key) {
            kept.push(vendor);
            if kept.len() == k {
                break;
            }
        }
    }
    kept
}

/// Resolve up to `k` distinct vendors for a material category. Retrieval
/// failures degrade to the external lookup, and lookup failures degrade to
/// an empty list; this never fails the surrounding report.
pub async fn resolve_vendors<E, V>(
    index: &RetrievalIndex,
    embedder: &E,
    fallback: Option<&V>,
    search_term: &str,
    location: Option<&str>,
    k: usize,
) -> Vec<VendorRecord>
where
    E: Embedder + ?Sized,
    V: VendorSource + ?Sized,
{
    if k == 0 {
        return Vec::new();
    }

    let query = vendor_search_query(search_term, location);
    match index.search(embedder, &query, k * OVERFETCH_FACTOR).await {
        Ok(hits) => {
            let vendors = dedupe_vendors(hits.into_iter().map(|h| h.vendor), k);
            debug!(term = search_term, kept = vendors.len(), "Vendors resolved from index");
            vendors
        }
        Err(e @ (CoreError::IndexNotReady | CoreError::EmptyCatalog)) => {
            debug!(error = %e, term = search_term, "Index unavailable, using vendor lookup");
            resolve_external(fallback, search_term, location, k).await
        }
        Err(e) => {
            warn!(error = %e, term = search_term, "Index search failed, using vendor lookup");
            resolve_external(fallback, search_term, location, k).await
        }
    }
}

async fn resolve_external<V: VendorSource + ?Sized>(
    fallback: Option<&V>,
    search_term: &str,
    location: Option<&str>,
    k: usize,
) -> Vec<VendorRecord> {
    let Some(source) = fallback else {
        return Vec::new();
    };
    match source.search(search_term, location.unwrap_or_default()).await {
        Ok(raw) => dedupe_vendors(raw, k),
        Err(e) => {
            // Absence of vendor results is valid; a lookup fault is too.
            warn!(error = %e, term = search_term, "Vendor lookup failed");
            Vec::new()
        }
    }
}
