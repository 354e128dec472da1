//! Catalog ingestion and normalization.
//!
//! Raw supplier records arrive as arbitrary nested JSON scraped from
//! heterogeneous sources. This module maps each record into the fixed
//! [`CatalogDocument`] / [`VendorRecord`] shape, treating every field
//! access as optional-with-default; nothing beyond this boundary touches
//! `serde_json::Value`. A malformed record is logged and skipped — a
//! single bad record never aborts a batch.

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{CatalogDocument, CatalogEntry, VendorRecord};
use crate::error::{CoreError, CoreResult};

/// Sentinel the scraper emits when a seller block was unavailable.
const SELLER_INFO_SENTINEL: &str = "Seller information not available";

/// Normalize one raw record into a searchable document plus its vendor
/// profile. Returns `Ok(None)` when the record renders to empty searchable
/// text and is to be discarded.
pub fn normalize_record(
    raw: &Value,
    source_category: Option<&str>,
) -> CoreResult<Option<CatalogEntry>> {
    let record = raw
        .as_object()
        .ok_or_else(|| CoreError::Parse(format!("expected object, got {}", type_name(raw))))?;

    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = non_empty_str(record.get("title")) {
        parts.push(format!("Title: {title}"));
    }

    if let Some(details) = record.get("details").and_then(Value::as_object) {
        for (key, value) in details {
            if let Some(rendered) = render_scalar(value) {
                parts.push(format!("{key}: {rendered}"));
            }
        }
    }

    if let Some(description) = non_empty_str(record.get("description")) {
        parts.push(format!("Description: {description}"));
    }

    if let Some(seller) = record.get("seller_info").and_then(Value::as_object) {
        for (key, value) in seller {
            if key == "error" {
                continue;
            }
            match render_scalar(value) {
                Some(rendered) if rendered != SELLER_INFO_SENTINEL => {
                    parts.push(format!("Seller {key}: {rendered}"));
                }
                _ => {}
            }
        }
    }

    if let Some(company) = record.get("company_info").and_then(Value::as_object) {
        for (key, value) in company {
            if let Some(rendered) = render_scalar(value) {
                parts.push(format!("Company {key}: {rendered}"));
            }
        }
    }

    let text = parts.join(" ");
    if text.trim().is_empty() {
        return Ok(None);
    }

    let document = CatalogDocument {
        id: Uuid::new_v4(),
        text,
        source_category: source_category.map(str::to_string),
    };
    let vendor = extract_vendor(record, source_category);

    Ok(Some(CatalogEntry { document, vendor }))
}

/// Normalize a batch of raw records, logging and skipping the bad ones.
pub fn normalize_batch(
    records: &[Value],
    source_category: Option<&str>,
) -> Vec<CatalogEntry> {
    let mut entries = Vec::with_capacity(records.len());
    for raw in records {
        match normalize_record(raw, source_category) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => debug!("Record rendered empty searchable text, discarded"),
            Err(e) => warn!(error = %e, "Skipping malformed catalog record"),
        }
    }
    entries
}

/// Load and normalize every `*.json` file in a directory. Each file holds
/// one record or an array of records; the source category is derived from
/// the file name. Unreadable or unparsable files are logged and skipped.
pub fn load_dir(dir: &Path) -> CoreResult<Vec<CatalogEntry>> {
    let listing = fs::read_dir(dir).map_err(|e| {
        CoreError::Internal(anyhow::anyhow!(
            "Failed to read catalog directory {}: {e}",
            dir.display()
        ))
    })?;

    let mut entries = Vec::new();
    for dirent in listing.flatten() {
        let path = dirent.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let category = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(category_from_file_stem);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read catalog file");
                continue;
            }
        };
        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse catalog file");
                continue;
            }
        };

        let records = match parsed {
            Value::Array(items) => items,
            single => vec![single],
        };
        let batch = normalize_batch(&records, category.as_deref());
        debug!(
            path = %path.display(),
            records = records.len(),
            kept = batch.len(),
            "Catalog file processed"
        );
        entries.extend(batch);
    }

    tracing::info!(documents = entries.len(), "Catalog loaded");
    Ok(entries)
}

/// `cement_links` -> `Cement`, `steel_bars` -> `Steel Bars`.
fn category_from_file_stem(stem: &str) -> String {
    stem.trim_end_matches("_links")
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_vendor(
    record: &serde_json::Map<String, Value>,
    source_category: Option<&str>,
) -> VendorRecord {
    let seller = record.get("seller_info").and_then(Value::as_object);
    let company = record.get("company_info").and_then(Value::as_object);
    let details = record.get("details").and_then(Value::as_object);

    let company_name = seller
        .and_then(|s| non_empty_str(s.get("seller_name")))
        .or_else(|| seller.and_then(|s| non_empty_str(s.get("contact_person"))))
        .or_else(|| company.and_then(|c| non_empty_str(c.get("company_name"))))
        .unwrap_or_default();

    let raw_location = seller
        .and_then(|s| non_empty_str(s.get("location")))
        .or_else(|| seller.and_then(|s| non_empty_str(s.get("full_address"))))
        .unwrap_or_default();

    VendorRecord {
        company_name,
        location: normalize_location(&raw_location),
        gst_status: company
            .and_then(|c| non_empty_str(c.get("gst")))
            .unwrap_or_else(|| "N/A".to_string()),
        rating: overall_rating(record.get("reviews")),
        availability: details
            .and_then(|d| non_empty_str(d.get("availability")))
            .unwrap_or_else(|| "N/A".to_string()),
        source_url: non_empty_str(record.get("url")).unwrap_or_default(),
        category: source_category.unwrap_or("N/A").to_string(),
    }
}

/// Best-effort city/state normalization: full addresses keep only the
/// segment after the last comma.
fn normalize_location(raw: &str) -> String {
    match raw.rsplit(',').next() {
        Some(tail) if !tail.trim().is_empty() => tail.trim().to_string(),
        _ => raw.trim().to_string(),
    }
}

/// Pull the overall rating out of the record's review list.
fn overall_rating(reviews: Option<&Value>) -> String {
    let Some(reviews) = reviews.and_then(Value::as_array) else {
        return "N/A".to_string();
    };
    for review in reviews {
        if review.get("type").and_then(Value::as_str) == Some("overall_rating") {
            if let Some(value) = review.get("value") {
                if let Some(rendered) = render_scalar(value) {
                    return rendered;
                }
            }
        }
    }
    "N/A".to_string()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    let s = value?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Render a scalar JSON value for searchable text; objects, arrays, nulls
/// and blank strings yield nothing.
fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
