//! Procurement estimation and retrieval core.
//!
//! Turns a free-text construction-project description ("25 MW data
//! center, 2 lakh sqft, Navi Mumbai, 1875 Cr") into a structured
//! procurement report: required materials, matching vendors, a cost
//! budget, and a phased schedule.
//!
//! The HTTP layer, auth, and persistence live outside this crate; it
//! exposes [`Pipeline`] plus the individual stages for callers that need
//! them separately. Collaborators (embedding service, AI advisor, vendor
//! webhook) are traits in [`services`], with HTTP implementations wired
//! from [`config::Settings`].

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod index;
pub mod logging;
pub mod pipeline;
pub mod services;

pub use config::Settings;
pub use domain::{
    BudgetBreakdown, CatalogDocument, CatalogEntry, EstimateSource, MaterialEstimate,
    PhaseStatus, Priority, ProcurementReport, ProjectRequirements, ProjectType, Quantity,
    SchedulePhase, VendorRecord,
};
pub use error::{CoreError, CoreResult};
pub use index::{RetrievalIndex, SearchHit};
pub use pipeline::{
    assemble_report, compute_budget, estimate_fallback_materials, generate_schedule,
    resolve_vendors, Pipeline, RequirementExtractor,
};
