//! External vendor lookup client.
//!
//! Calls the vendor webhook with a material query and an optional
//! location. The webhook's availability is not guaranteed and its payload
//! shape varies (bare array, `{"output": [...]}` wrapper, or a single
//! wrapped object), so parsing is tolerant and transport failures degrade
//! to an empty result list.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::VendorSource;
use crate::domain::VendorRecord;
use crate::error::CoreResult;

const COMPANY_NAME_NOISE_PREFIX: &str = "SELLER CONTACT DETAILS";

/// Client for the vendor webhook.
#[derive(Clone)]
pub struct VendorWebhookClient {
    client: Client,
    url: Url,
}

impl VendorWebhookClient {
    /// Create a new vendor webhook client.
    pub fn new(url: Url, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(url = %url, "Vendor webhook client initialized");

        Ok(Self { client, url })
    }
}

#[async_trait]
impl VendorSource for VendorWebhookClient {
    async fn search(&self, query: &str, location: &str) -> CoreResult<Vec<VendorRecord>> {
        let mut params = vec![("product_name", query)];
        if !location.is_empty() {
            params.push(("location", location));
        }

        debug!(query = query, location = location, "Vendor webhook request");

        let response = match self
            .client
            .get(self.url.clone())
            .query(&params)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, query = query, "Vendor webhook unreachable");
                return Ok(Vec::new());
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), query = query, "Vendor webhook error");
            return Ok(Vec::new());
        }

        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, query = query, "Vendor webhook returned invalid JSON");
                return Ok(Vec::new());
            }
        };

        let vendors = parse_webhook_payload(&payload);
        debug!(query = query, count = vendors.len(), "Vendor webhook parsed");
        Ok(vendors)
    }
}

/// Unwrap the webhook payload into individual raw items.
fn payload_items(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("output") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => vec![payload],
        },
        _ => Vec::new(),
    }
}

/// Parse a full webhook payload into vendor records, skipping items that
/// do not resolve to a company.
pub fn parse_webhook_payload(payload: &Value) -> Vec<VendorRecord> {
    payload_items(payload)
        .into_iter()
        .filter_map(parse_vendor_item)
        .collect()
}

fn parse_vendor_item(item: &Value) -> Option<VendorRecord> {
    // Items may themselves be wrapped in {"output": {...}}.
    let output = item.get("output").unwrap_or(item);

    let product = output.get("product_details");
    let seller = output.get("seller_details");
    let address = seller.and_then(|s| s.get("address"));
    let links = seller.and_then(|s| s.get("links"));

    let mut company_name = str_field(seller, "company_name");
    if let Some(stripped) = company_name.strip_prefix(COMPANY_NAME_NOISE_PREFIX) {
        company_name = stripped.trim().to_string();
    }
    if company_name.is_empty() {
        warn!("Vendor webhook item without a company name, skipped");
        return None;
    }

    let city = str_field(address, "city");
    let state = str_field(address, "state");
    let location = match (city.is_empty(), state.is_empty()) {
        (false, false) => format!("{city}, {state}"),
        (false, true) => city,
        (true, false) => state,
        (true, true) => "N/A".to_string(),
    };

    Some(VendorRecord {
        company_name,
        location,
        gst_status: "N/A".to_string(),
        rating: "N/A".to_string(),
        availability: non_empty_or(str_field(product, "availability"), "N/A"),
        source_url: str_field(links, "profile_url"),
        category: non_empty_or(str_field(product, "material_category"), "N/A"),
    })
}

fn str_field(obj: Option<&Value>, key: &str) -> String {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_item() -> Value {
        json!({
            "output": {
                "product_details": {
                    "material_category": "Concrete",
                    "product_type": "General",
                    "availability": "In Stock"
                },
                "seller_details": {
                    "company_name": "SELLER CONTACT DETAILS Acme Cements",
                    "address": { "city": "Navi Mumbai", "state": "Maharashtra" },
                    "links": { "profile_url": "https://example.com/acme" }
                }
            }
        })
    }

    #[test]
    fn parses_wrapped_array_payload() {
        let payload = json!({ "output": [sample_item()] });
        let vendors = parse_webhook_payload(&payload);
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors[0].company_name, "Acme Cements");
        assert_eq!(vendors[0].location, "Navi Mumbai, Maharashtra");
        assert_eq!(vendors[0].category, "Concrete");
        assert_eq!(vendors[0].availability, "In Stock");
        assert_eq!(vendors[0].source_url, "https://example.com/acme");
    }

    #[test]
    fn parses_bare_array_and_single_object_payloads() {
        let bare = json!([sample_item()]);
        assert_eq!(parse_webhook_payload(&bare).len(), 1);

        let single = json!({ "output": sample_item()["output"].clone() });
        assert_eq!(parse_webhook_payload(&single).len(), 1);
    }

    #[test]
    fn skips_items_without_company_name() {
        let payload = json!([{ "output": { "seller_details": { "address": {} } } }]);
        assert!(parse_webhook_payload(&payload).is_empty());
    }

    #[test]
    fn missing_fields_default_to_na() {
        let payload = json!([{
            "output": { "seller_details": { "company_name": "Solo Traders" } }
        }]);
        let vendors = parse_webhook_payload(&payload);
        assert_eq!(vendors[0].location, "N/A");
        assert_eq!(vendors[0].category, "N/A");
        assert_eq!(vendors[0].availability, "N/A");
    }
}
