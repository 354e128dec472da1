//! Material estimate types
//!
//! Estimates are produced either deterministically from per-sqft factors
//! or symbolically from advisor category recommendations.

use serde::{Deserialize, Serialize};

/// Procurement priority for a material line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Tolerant parse for advisor output; unknown strings map to Medium.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A material quantity: numeric with a unit, or symbolic when the advisor
/// path produced it ("As per specification").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: String,
}

impl Quantity {
    pub fn numeric(value: f64, unit: &str) -> Self {
        Self {
            value: Some(value),
            unit: unit.to_string(),
        }
    }

    pub fn symbolic(label: &str) -> Self {
        Self {
            value: None,
            unit: label.to_string(),
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(v) => write!(f, "{:.0} {}", v, self.unit),
            None => write!(f, "{}", self.unit),
        }
    }
}

/// One estimated material line.
///
/// Invariant: `total_cost = quantity.value * unit_cost` whenever the
/// quantity is numeric; symbolic quantities carry zero cost fields and are
/// excluded from budget computation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialEstimate {
    pub material_name: String,
    pub quantity: Quantity,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub priority: Priority,
    /// Number of distinct vendors resolved for this material.
    pub vendor_count: usize,
}

/// A validated advisor recommendation: which catalog category matters and
/// how to search it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRecommendation {
    pub category: String,
    pub search_query: String,
    pub priority: Priority,
    pub reason: String,
}

/// Which estimation path produced the report's material list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EstimateSource {
    Advisor,
    Deterministic,
}
