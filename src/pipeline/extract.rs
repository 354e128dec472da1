//! Requirement extraction.
//!
//! Pattern-based grammar over the free-text project description. Not a
//! learned NLP model: a fixed set of case-insensitive patterns, first
//! match wins per field.

use regex::Regex;

use crate::domain::{
    ProjectRequirements, ProjectType, DEFAULT_BUILT_UP_AREA_SQFT, DEFAULT_LOCATION,
};
use crate::error::{CoreError, CoreResult};

/// Compiled extraction grammar. Build once, reuse per query.
pub struct RequirementExtractor {
    power: Regex,
    area: Regex,
    volume: Regex,
    location: Regex,
}

impl RequirementExtractor {
    pub fn new() -> Self {
        // Patterns are literals; compilation cannot fail at runtime.
        Self {
            power: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:mega\s?watts?|mw)\b")
                .expect("power pattern"),
            area: Regex::new(
                r"(?i)(\d+(?:\.\d+)?)\s*(lacs?|lakhs?)?\s*(?:square\s*(?:foot|feet)|sq\.?\s*(?:ft|feet)|sqft)",
            )
            .expect("area pattern"),
            volume: Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:crores?|cr)\b(?:\s*(?:in\s+)?rupees)?")
                .expect("volume pattern"),
            location: Regex::new(
                r"(?i)\bin\s+([A-Za-z][A-Za-z\s]*?)(?:\s+area\b|\s+for\b|,|\s*$)",
            )
            .expect("location pattern"),
        }
    }

    /// Parse a free-text query into structured requirements. Rejects a
    /// blank query with [`CoreError::InvalidQuery`].
    pub fn extract(&self, query: &str) -> CoreResult<ProjectRequirements> {
        if query.trim().is_empty() {
            return Err(CoreError::InvalidQuery("No query provided".to_string()));
        }

        let power_capacity_mw = self
            .power
            .captures(query)
            .and_then(|c| c[1].parse::<f64>().ok());

        let built_up_area_sqft = self
            .area
            .captures(query)
            .and_then(|c| {
                let value = c[1].parse::<f64>().ok()?;
                let multiplier = if c.get(2).is_some() { 100_000.0 } else { 1.0 };
                Some(value * multiplier)
            })
            .unwrap_or(DEFAULT_BUILT_UP_AREA_SQFT);

        let project_volume_crore = self
            .volume
            .captures(query)
            .and_then(|c| c[1].parse::<f64>().ok());

        let location = if query.to_lowercase().contains("navi mumbai") {
            DEFAULT_LOCATION.to_string()
        } else {
            self.location
                .captures(query)
                .map(|c| c[1].trim().to_string())
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
        };

        let project_type = infer_project_type(query, power_capacity_mw.is_some());

        Ok(ProjectRequirements {
            power_capacity_mw,
            built_up_area_sqft,
            project_volume_crore,
            location,
            project_type,
        })
    }
}

impl Default for RequirementExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Explicit keyword wins; otherwise a stated power capacity implies a data
/// center, and everything else is treated as commercial.
fn infer_project_type(query: &str, has_power: bool) -> ProjectType {
    let lower = query.to_lowercase();
    if lower.contains("data center") || lower.contains("data centre") || lower.contains("datacenter")
    {
        ProjectType::DataCenter
    } else if lower.contains("residential") {
        ProjectType::Residential
    } else if lower.contains("industrial") {
        ProjectType::Industrial
    } else if lower.contains("commercial") {
        ProjectType::Commercial
    } else if has_power {
        ProjectType::DataCenter
    } else {
        ProjectType::Commercial
    }
}
