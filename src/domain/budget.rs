//! Budget domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full cost decomposition for a project.
///
/// Invariant: `total_cost` equals the sum of the six components (within
/// floating-point tolerance), and the percentage map sums to 100 when
/// `total_cost > 0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetBreakdown {
    pub material_cost: f64,
    pub labor_cost: f64,
    pub equipment_cost: f64,
    pub overhead: f64,
    pub contractor_profit: f64,
    pub gst_cost: f64,
    pub total_cost: f64,
    pub cost_per_sqft: f64,
    /// Component share of `total_cost`, in percent. All zeros when the
    /// total is zero.
    pub breakdown_percentage: BTreeMap<String, f64>,
}
