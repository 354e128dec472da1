//! Project requirement types
//!
//! The structured form of a free-text project description. Created fresh
//! per query; never persisted.

use serde::{Deserialize, Serialize};

/// Built-up area assumed when the query does not state one. Downstream
/// formulas require a concrete area.
pub const DEFAULT_BUILT_UP_AREA_SQFT: f64 = 50_000.0;

/// Location assumed when the query does not state one.
pub const DEFAULT_LOCATION: &str = "Navi Mumbai";

/// Project category, driving material quantity multipliers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Residential,
    #[default]
    Commercial,
    Industrial,
    DataCenter,
}

impl ProjectType {
    /// Quantity multiplier applied on top of per-sqft material factors.
    pub fn quantity_multiplier(&self) -> f64 {
        match self {
            Self::Residential => 1.0,
            Self::Commercial => 1.3,
            Self::Industrial => 1.5,
            Self::DataCenter => 1.8,
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Residential => write!(f, "residential"),
            Self::Commercial => write!(f, "commercial"),
            Self::Industrial => write!(f, "industrial"),
            Self::DataCenter => write!(f, "data_center"),
        }
    }
}

/// Structured requirements extracted from a free-text query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRequirements {
    pub power_capacity_mw: Option<f64>,
    /// Always concrete; defaulted to [`DEFAULT_BUILT_UP_AREA_SQFT`] when
    /// the query gives no area.
    pub built_up_area_sqft: f64,
    /// Stated target budget in crore (1 crore = 10,000,000 rupees).
    pub project_volume_crore: Option<f64>,
    pub location: String,
    pub project_type: ProjectType,
}
