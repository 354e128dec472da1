//! Procurement report
//!
//! The final aggregate returned for a query. Created once per request and
//! handed to the caller; persistence, if any, is the caller's concern.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::budget::BudgetBreakdown;
use super::catalog::VendorRecord;
use super::estimates::{EstimateSource, MaterialEstimate};
use super::requirements::ProjectRequirements;
use super::schedule::SchedulePhase;

/// Structured first-pass procurement estimate for one project query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcurementReport {
    pub query: String,
    pub requirements: ProjectRequirements,
    /// Advisor-derived when available, deterministic otherwise.
    pub estimate_source: EstimateSource,
    pub material_estimates: Vec<MaterialEstimate>,
    /// Ordered by category name so serialization is deterministic.
    pub vendors_by_category: BTreeMap<String, Vec<VendorRecord>>,
    pub budget: BudgetBreakdown,
    pub schedule: Vec<SchedulePhase>,
}
