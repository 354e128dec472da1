//! Procurement estimation pipeline.
//!
//! Orchestrates one query end to end: requirement extraction, material
//! estimation, per-material vendor resolution, budget decomposition, and
//! schedule allocation, composed into a [`ProcurementReport`].

use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::catalog;
use crate::config::Settings;
use crate::domain::{
    BudgetBreakdown, EstimateSource, MaterialEstimate, ProcurementReport, ProjectRequirements,
    SchedulePhase, VendorRecord,
};
use crate::error::CoreResult;
use crate::index::RetrievalIndex;
use crate::services::{
    Advisor, AdvisorClient, Embedder, EmbeddingClient, VendorSource, VendorWebhookClient,
};

pub mod budget;
pub mod estimator;
pub mod extract;
pub mod presentation;
pub mod schedule;
pub mod vendors;

pub use budget::compute_budget;
pub use estimator::{estimate_fallback_materials, estimate_materials, MaterialPlan};
pub use extract::RequirementExtractor;
pub use presentation::decorate_inventory;
pub use schedule::generate_schedule;
pub use vendors::resolve_vendors;

/// Pure composition of the pipeline stages into the final report. No
/// computation happens here.
pub fn assemble_report(
    query: &str,
    requirements: ProjectRequirements,
    estimate_source: EstimateSource,
    material_estimates: Vec<MaterialEstimate>,
    vendors_by_category: BTreeMap<String, Vec<VendorRecord>>,
    budget: BudgetBreakdown,
    schedule: Vec<SchedulePhase>,
) -> ProcurementReport {
    ProcurementReport {
        query: query.to_string(),
        requirements,
        estimate_source,
        material_estimates,
        vendors_by_category,
        budget,
        schedule,
    }
}

/// The request-serving pipeline. Owns the collaborator clients and an
/// explicit handle to the retrieval index; request handlers share one
/// instance by reference.
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    advisor: Option<Arc<dyn Advisor>>,
    vendor_fallback: Option<Arc<dyn VendorSource>>,
    index: Arc<RetrievalIndex>,
    extractor: RequirementExtractor,
    vendors_per_category: usize,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        advisor: Option<Arc<dyn Advisor>>,
        vendor_fallback: Option<Arc<dyn VendorSource>>,
        index: Arc<RetrievalIndex>,
        vendors_per_category: usize,
    ) -> Self {
        Self {
            embedder,
            advisor,
            vendor_fallback,
            index,
            extractor: RequirementExtractor::new(),
            vendors_per_category,
        }
    }

    /// Wire up the concrete HTTP collaborators from settings.
    pub fn from_settings(settings: &Settings, index: Arc<RetrievalIndex>) -> Result<Self> {
        let embedder = EmbeddingClient::new(
            &settings.embedding_service_url,
            &settings.embedding_service_token,
            settings.embedding_timeout_seconds,
        )?;
        let advisor = AdvisorClient::new(
            &settings.advisor_api_url,
            &settings.advisor_api_key,
            &settings.advisor_model,
            settings.advisor_timeout_seconds,
            settings.advisor_retry_backoff_seconds,
        )?;
        let vendor_fallback = settings
            .vendor_webhook_url
            .clone()
            .map(|url| VendorWebhookClient::new(url, settings.vendor_webhook_timeout_seconds))
            .transpose()?;

        Ok(Self::new(
            Arc::new(embedder),
            Some(Arc::new(advisor)),
            vendor_fallback.map(|c| Arc::new(c) as Arc<dyn VendorSource>),
            index,
            settings.vendors_per_category,
        ))
    }

    pub fn index(&self) -> &Arc<RetrievalIndex> {
        &self.index
    }

    /// Parse a free-text query into structured requirements.
    pub fn extract_requirements(&self, query: &str) -> CoreResult<ProjectRequirements> {
        self.extractor.extract(query)
    }

    /// Load the catalog directory and (re)build the retrieval index.
    pub async fn ingest_catalog(&self, dir: &Path) -> CoreResult<usize> {
        let entries = catalog::load_dir(dir)?;
        self.index.build(self.embedder.as_ref(), entries).await
    }

    /// Resolve up to `k` distinct vendors for one category/search term.
    pub async fn resolve_vendors(
        &self,
        search_term: &str,
        location: Option<&str>,
        k: usize,
    ) -> Vec<VendorRecord> {
        vendors::resolve_vendors(
            &self.index,
            self.embedder.as_ref(),
            self.vendor_fallback.as_deref(),
            search_term,
            location,
            k,
        )
        .await
    }

    /// Run the full pipeline for one query.
    ///
    /// `start_date` anchors the schedule; the caller passes today's date.
    /// Collaborator failures degrade through the fallback cascade; only an
    /// invalid query fails the request.
    #[instrument(skip(self), fields(query_chars = query.len()))]
    pub async fn run(&self, query: &str, start_date: NaiveDate) -> CoreResult<ProcurementReport> {
        let requirements = self.extractor.extract(query)?;
        info!(
            project_type = %requirements.project_type,
            location = %requirements.location,
            area_sqft = requirements.built_up_area_sqft,
            "Requirements extracted"
        );

        let known_categories = self.index.known_categories();
        let plan = estimator::estimate_materials(
            self.advisor.as_deref(),
            &requirements,
            &known_categories,
        )
        .await;

        // Advisor recommendations (when present) decide which categories
        // drive vendor search; otherwise the deterministic table does.
        let mut material_estimates = match plan.source {
            EstimateSource::Advisor => estimator::recommendation_estimates(&plan.recommendations),
            EstimateSource::Deterministic => plan.deterministic.clone(),
        };

        let mut vendors_by_category: BTreeMap<String, Vec<VendorRecord>> = BTreeMap::new();
        for (position, estimate) in material_estimates.iter_mut().enumerate() {
            let search_term = match plan.source {
                EstimateSource::Advisor => plan.recommendations[position].search_query.clone(),
                EstimateSource::Deterministic => estimate.material_name.clone(),
            };
            let resolved = self
                .resolve_vendors(
                    &search_term,
                    Some(&requirements.location),
                    self.vendors_per_category,
                )
                .await;
            estimate.vendor_count = resolved.len();
            vendors_by_category.insert(estimate.material_name.clone(), resolved);
        }

        // The budget always derives from the deterministic estimates, so
        // it stays well-defined even when the advisor path won.
        let budget = compute_budget(
            &plan.deterministic,
            requirements.built_up_area_sqft,
            requirements.project_volume_crore,
        );

        let schedule = generate_schedule(
            requirements.built_up_area_sqft,
            requirements.project_type,
            requirements.power_capacity_mw,
            start_date,
        );

        info!(
            materials = material_estimates.len(),
            total_cost = budget.total_cost,
            phases = schedule.len(),
            "Report assembled"
        );

        Ok(assemble_report(
            query,
            requirements,
            plan.source,
            material_estimates,
            vendors_by_category,
            budget,
            schedule,
        ))
    }
}
