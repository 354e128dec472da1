//! Budget engine.
//!
//! Converts numeric material estimates into a full cost breakdown. When
//! the query states a target project volume, every component is rescaled
//! so the final total matches the stated budget exactly while keeping the
//! original proportional split — scale-to-target takes precedence over
//! material-driven consistency.

use std::collections::BTreeMap;

use crate::domain::{BudgetBreakdown, MaterialEstimate};

pub const CRORE_RUPEES: f64 = 10_000_000.0;

const LABOR_RATIO: f64 = 0.35;
const EQUIPMENT_RATIO: f64 = 0.10;
const OVERHEAD_RATIO: f64 = 0.12;
const PROFIT_RATIO: f64 = 0.10;
const GST_RATE: f64 = 0.18;

/// Compute the cost breakdown from numeric material estimates. Symbolic
/// estimates (no numeric quantity) are ignored.
pub fn compute_budget(
    materials: &[MaterialEstimate],
    built_up_area_sqft: f64,
    target_volume_crore: Option<f64>,
) -> BudgetBreakdown {
    let material_cost: f64 = materials
        .iter()
        .filter(|m| m.quantity.value.is_some())
        .map(|m| m.total_cost)
        .sum();

    let labor_cost = LABOR_RATIO * material_cost;
    let equipment_cost = EQUIPMENT_RATIO * material_cost;
    let overhead = OVERHEAD_RATIO * material_cost;
    let contractor_profit = PROFIT_RATIO * material_cost;
    let subtotal = material_cost + labor_cost + equipment_cost + overhead + contractor_profit;
    let gst_cost = GST_RATE * subtotal;
    let total_cost = subtotal + gst_cost;

    let mut breakdown = BudgetBreakdown {
        material_cost,
        labor_cost,
        equipment_cost,
        overhead,
        contractor_profit,
        gst_cost,
        total_cost,
        cost_per_sqft: 0.0,
        breakdown_percentage: BTreeMap::new(),
    };

    if let Some(volume) = target_volume_crore {
        let target_rupees = volume * CRORE_RUPEES;
        if breakdown.total_cost > 0.0 {
            let scale = target_rupees / breakdown.total_cost;
            breakdown.material_cost *= scale;
            breakdown.labor_cost *= scale;
            breakdown.equipment_cost *= scale;
            breakdown.overhead *= scale;
            breakdown.contractor_profit *= scale;
            breakdown.gst_cost *= scale;
            // Pinned exactly to the stated budget, not the scaled sum.
            breakdown.total_cost = target_rupees;
        }
    }

    breakdown.cost_per_sqft = if built_up_area_sqft > 0.0 {
        breakdown.total_cost / built_up_area_sqft
    } else {
        0.0
    };
    breakdown.breakdown_percentage = percentages(&breakdown);

    breakdown
}

fn percentages(b: &BudgetBreakdown) -> BTreeMap<String, f64> {
    let share = |component: f64| {
        if b.total_cost > 0.0 {
            component / b.total_cost * 100.0
        } else {
            0.0
        }
    };
    BTreeMap::from([
        ("material".to_string(), share(b.material_cost)),
        ("labor".to_string(), share(b.labor_cost)),
        ("equipment".to_string(), share(b.equipment_cost)),
        ("overhead".to_string(), share(b.overhead)),
        ("contractor_profit".to_string(), share(b.contractor_profit)),
        ("gst".to_string(), share(b.gst_cost)),
    ])
}
