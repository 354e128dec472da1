//! End-to-end pipeline tests against a frozen collaborator layer.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use procura_core::catalog;
use procura_core::pipeline::Pipeline;
use procura_core::services::{Advisor, Embedder, VendorSource};
use procura_core::{
    CatalogEntry, CoreError, CoreResult, EstimateSource, ProjectType, RetrievalIndex, VendorRecord,
};

/// Deterministic bag-of-tokens embedder: stable within and across runs.
struct HashEmbedder;

fn embed_text(text: &str) -> Vec<f32> {
    let mut vector = [0.0f32; 8];
    for token in text.to_lowercase().split_whitespace() {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        vector[(hasher.finish() % 8) as usize] += 1.0;
    }
    vector.to_vec()
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
        Ok(embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }
}

/// Advisor frozen to one reply.
struct FrozenAdvisor {
    reply: String,
}

#[async_trait]
impl Advisor for FrozenAdvisor {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> CoreResult<String> {
        Ok(self.reply.clone())
    }
}

/// Advisor that is always down.
struct DownAdvisor;

#[async_trait]
impl Advisor for DownAdvisor {
    async fn complete(&self, _prompt: &str, _max_tokens: u32) -> CoreResult<String> {
        Err(CoreError::AdvisorUnavailable("connection refused".to_string()))
    }
}

struct FrozenVendorSource {
    vendors: Vec<VendorRecord>,
}

#[async_trait]
impl VendorSource for FrozenVendorSource {
    async fn search(&self, _query: &str, _location: &str) -> CoreResult<Vec<VendorRecord>> {
        Ok(self.vendors.clone())
    }
}

fn catalog_entries() -> Vec<CatalogEntry> {
    let cement_records = vec![
        json!({
            "title": "OPC 53 Grade Cement",
            "url": "https://example.com/opc-53",
            "details": { "availability": "In Stock" },
            "seller_info": {
                "seller_name": "Shree Cement Traders",
                "full_address": "MIDC, Navi Mumbai"
            }
        }),
        json!({
            "title": "PPC Cement Bulk Supply",
            "url": "https://example.com/ppc",
            "seller_info": {
                "seller_name": "Deccan Buildmat",
                "full_address": "Camp, Pune"
            }
        }),
    ];
    let steel_records = vec![json!({
        "title": "TMT Steel Bars Fe500",
        "url": "https://example.com/tmt",
        "seller_info": {
            "seller_name": "Bharat Steels",
            "full_address": "Kalamboli, Navi Mumbai"
        }
    })];

    let mut entries = catalog::normalize_batch(&cement_records, Some("Cement"));
    entries.extend(catalog::normalize_batch(&steel_records, Some("Steel")));
    entries
}

async fn built_index() -> Arc<RetrievalIndex> {
    let index = Arc::new(RetrievalIndex::new());
    index.build(&HashEmbedder, catalog_entries()).await.unwrap();
    index
}

fn advisor_reply() -> String {
    r#"```json
[
  {"category": "Cement", "search_query": "OPC cement dealers", "priority": "high", "reason": "structural concrete"},
  {"category": "Steel", "search_query": "TMT steel stockists", "priority": "high", "reason": "reinforcement"}
]
```"#
        .to_string()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
}

const QUERY: &str = "25 MW data center, 2 lakh sqft, in Navi Mumbai, 1875 Cr";

#[tokio::test]
async fn advisor_driven_report_covers_all_sections() {
    let pipeline = Pipeline::new(
        Arc::new(HashEmbedder),
        Some(Arc::new(FrozenAdvisor { reply: advisor_reply() })),
        None,
        built_index().await,
        5,
    );

    let report = pipeline.run(QUERY, start_date()).await.unwrap();

    // Requirements
    assert_eq!(report.requirements.power_capacity_mw, Some(25.0));
    assert_eq!(report.requirements.built_up_area_sqft, 200_000.0);
    assert_eq!(report.requirements.project_volume_crore, Some(1875.0));
    assert_eq!(report.requirements.location, "Navi Mumbai");
    assert_eq!(report.requirements.project_type, ProjectType::DataCenter);

    // Advisor path drove the material list; quantities stay symbolic.
    assert_eq!(report.estimate_source, EstimateSource::Advisor);
    assert_eq!(report.material_estimates.len(), 2);
    for estimate in &report.material_estimates {
        assert_eq!(estimate.quantity.value, None);
        assert_eq!(estimate.total_cost, 0.0);
        assert!(estimate.vendor_count > 0);
        assert_eq!(
            report.vendors_by_category[&estimate.material_name].len(),
            estimate.vendor_count
        );
    }
    assert!(report.vendors_by_category.contains_key("Cement"));
    assert!(report.vendors_by_category.contains_key("Steel"));

    // The budget comes from the deterministic path and is pinned to the
    // stated volume even though the report's material lines carry no cost.
    let target = 1875.0 * 10_000_000.0;
    assert!((report.budget.total_cost - target).abs() / target < 1e-6);
    let pct_sum: f64 = report.budget.breakdown_percentage.values().sum();
    assert!((pct_sum - 100.0).abs() < 0.1);

    // Schedule: 8 contiguous phases, stretched for the 25 MW load.
    assert_eq!(report.schedule.len(), 8);
    assert_eq!(report.schedule[0].start_date, start_date());
    for pair in report.schedule.windows(2) {
        assert_eq!(pair[0].end_date, pair[1].start_date);
    }
    let total_days: i64 = report.schedule.iter().map(|p| p.duration_days).sum();
    // 18 months * 1.3 -> 23 months -> 690 days, minus per-phase rounding.
    assert!((683..=690).contains(&total_days));
}

#[tokio::test]
async fn advisor_outage_degrades_to_deterministic_estimates() {
    let pipeline = Pipeline::new(
        Arc::new(HashEmbedder),
        Some(Arc::new(DownAdvisor)),
        None,
        built_index().await,
        3,
    );

    let report = pipeline.run(QUERY, start_date()).await.unwrap();

    assert_eq!(report.estimate_source, EstimateSource::Deterministic);
    assert_eq!(report.material_estimates.len(), 11);
    for estimate in &report.material_estimates {
        let quantity = estimate.quantity.value.unwrap();
        assert_eq!(estimate.total_cost, quantity * estimate.unit_cost);
    }
}

#[tokio::test]
async fn identical_runs_yield_byte_identical_reports() {
    let pipeline = Pipeline::new(
        Arc::new(HashEmbedder),
        Some(Arc::new(FrozenAdvisor { reply: advisor_reply() })),
        None,
        built_index().await,
        5,
    );

    let first = pipeline.run(QUERY, start_date()).await.unwrap();
    let second = pipeline.run(QUERY, start_date()).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn unbuilt_index_uses_the_vendor_webhook_fallback() {
    let fallback = FrozenVendorSource {
        vendors: vec![VendorRecord {
            company_name: "Webhook Traders".to_string(),
            location: "Chennai".to_string(),
            gst_status: "N/A".to_string(),
            rating: "N/A".to_string(),
            availability: "In Stock".to_string(),
            source_url: String::new(),
            category: "Cement".to_string(),
        }],
    };
    let pipeline = Pipeline::new(
        Arc::new(HashEmbedder),
        None,
        Some(Arc::new(fallback)),
        Arc::new(RetrievalIndex::new()),
        5,
    );

    let report = pipeline.run(QUERY, start_date()).await.unwrap();

    // Deterministic path (no advisor), vendors via the webhook.
    assert_eq!(report.estimate_source, EstimateSource::Deterministic);
    let cement_vendors = &report.vendors_by_category["Cement"];
    assert_eq!(cement_vendors.len(), 1);
    assert_eq!(cement_vendors[0].company_name, "Webhook Traders");
}

#[tokio::test]
async fn blank_queries_fail_the_request() {
    let pipeline = Pipeline::new(
        Arc::new(HashEmbedder),
        None,
        None,
        Arc::new(RetrievalIndex::new()),
        5,
    );
    let err = pipeline.run("  ", start_date()).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidQuery(_)));
}
