//! Material estimation.
//!
//! Two computation paths behind a fixed-order fallback cascade: the AI
//! advisor recommends which catalog categories matter, and a deterministic
//! per-area formula produces numeric quantities. The deterministic
//! estimates are always computed — they are the sole Budget Engine input,
//! so the budget stays numerically well-defined even when the advisor
//! yields only symbolic quantities.

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{
    CategoryRecommendation, EstimateSource, MaterialEstimate, Priority, ProjectRequirements,
    ProjectType, Quantity,
};
use crate::error::{CoreError, CoreResult};
use crate::services::Advisor;

/// Quantity label for advisor-derived lines that carry no numeric amount.
pub const SYMBOLIC_QUANTITY: &str = "As per specification";

/// The two estimation paths, in the order they are attempted. The
/// deterministic path cannot fail, so the cascade always terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatePath {
    Advisor,
    Deterministic,
}

pub const ESTIMATE_FALLBACK_ORDER: [EstimatePath; 2] =
    [EstimatePath::Advisor, EstimatePath::Deterministic];

/// One row of the deterministic estimation table.
pub struct MaterialSpec {
    pub name: &'static str,
    pub per_sqft_factor: f64,
    pub unit: &'static str,
    pub unit_cost: f64,
    pub priority: Priority,
}

/// Per-sqft factors and unit costs per common Indian construction norms.
pub const MATERIAL_TABLE: [MaterialSpec; 11] = [
    MaterialSpec { name: "Cement", per_sqft_factor: 0.4, unit: "Bags", unit_cost: 350.0, priority: Priority::High },
    MaterialSpec { name: "Steel", per_sqft_factor: 4.0, unit: "Kg", unit_cost: 65.0, priority: Priority::High },
    MaterialSpec { name: "Sand", per_sqft_factor: 1.2, unit: "Cft", unit_cost: 50.0, priority: Priority::High },
    MaterialSpec { name: "Aggregate", per_sqft_factor: 1.5, unit: "Cft", unit_cost: 40.0, priority: Priority::Medium },
    MaterialSpec { name: "Bricks", per_sqft_factor: 8.0, unit: "Units", unit_cost: 8.0, priority: Priority::High },
    MaterialSpec { name: "Tiles", per_sqft_factor: 1.3, unit: "Sqft", unit_cost: 45.0, priority: Priority::Medium },
    MaterialSpec { name: "Paint", per_sqft_factor: 0.18, unit: "Litres", unit_cost: 250.0, priority: Priority::Low },
    MaterialSpec { name: "Electrical Wire", per_sqft_factor: 1.5, unit: "Metres", unit_cost: 35.0, priority: Priority::Medium },
    MaterialSpec { name: "Plumbing Pipe", per_sqft_factor: 0.4, unit: "Metres", unit_cost: 120.0, priority: Priority::Medium },
    MaterialSpec { name: "Doors", per_sqft_factor: 0.01, unit: "Units", unit_cost: 5500.0, priority: Priority::Low },
    MaterialSpec { name: "Windows", per_sqft_factor: 0.012, unit: "Units", unit_cost: 4500.0, priority: Priority::Low },
];

/// Result of the estimation stage.
#[derive(Debug, Clone)]
pub struct MaterialPlan {
    /// Which path produced the report's material list.
    pub source: EstimateSource,
    /// Advisor category recommendations; empty on the deterministic path.
    pub recommendations: Vec<CategoryRecommendation>,
    /// Always present; the Budget Engine input.
    pub deterministic: Vec<MaterialEstimate>,
}

/// Deterministic per-area estimates:
/// `quantity = area x per_sqft_factor x type_multiplier`,
/// `total_cost = quantity x unit_cost`.
pub fn estimate_fallback_materials(
    built_up_area_sqft: f64,
    project_type: ProjectType,
) -> Vec<MaterialEstimate> {
    let multiplier = project_type.quantity_multiplier();
    MATERIAL_TABLE
        .iter()
        .map(|spec| {
            let quantity = built_up_area_sqft * spec.per_sqft_factor * multiplier;
            MaterialEstimate {
                material_name: spec.name.to_string(),
                quantity: Quantity::numeric(quantity, spec.unit),
                unit_cost: spec.unit_cost,
                total_cost: quantity * spec.unit_cost,
                priority: spec.priority,
                vendor_count: 0,
            }
        })
        .collect()
}

/// Render advisor recommendations as material lines with symbolic
/// quantities and zero cost fields.
pub fn recommendation_estimates(
    recommendations: &[CategoryRecommendation],
) -> Vec<MaterialEstimate> {
    recommendations
        .iter()
        .map(|rec| MaterialEstimate {
            material_name: rec.category.clone(),
            quantity: Quantity::symbolic(SYMBOLIC_QUANTITY),
            unit_cost: 0.0,
            total_cost: 0.0,
            priority: rec.priority,
            vendor_count: 0,
        })
        .collect()
}

/// Walk the fallback cascade and produce the material plan. Advisor
/// failures degrade silently to the deterministic path; they are logged,
/// never propagated.
pub async fn estimate_materials<A: Advisor + ?Sized>(
    advisor: Option<&A>,
    requirements: &ProjectRequirements,
    known_categories: &[String],
) -> MaterialPlan {
    let deterministic =
        estimate_fallback_materials(requirements.built_up_area_sqft, requirements.project_type);

    for path in ESTIMATE_FALLBACK_ORDER {
        match path {
            EstimatePath::Advisor => {
                match advise(advisor, requirements, known_categories).await {
                    Ok(recommendations) => {
                        debug!(count = recommendations.len(), "Advisor path succeeded");
                        return MaterialPlan {
                            source: EstimateSource::Advisor,
                            recommendations,
                            deterministic,
                        };
                    }
                    Err(e) => {
                        info!(error = %e, "Advisor path failed, falling back");
                    }
                }
            }
            EstimatePath::Deterministic => break,
        }
    }

    MaterialPlan {
        source: EstimateSource::Deterministic,
        recommendations: Vec::new(),
        deterministic,
    }
}

async fn advise<A: Advisor + ?Sized>(
    advisor: Option<&A>,
    requirements: &ProjectRequirements,
    known_categories: &[String],
) -> CoreResult<Vec<CategoryRecommendation>> {
    let advisor = advisor
        .ok_or_else(|| CoreError::AdvisorUnavailable("advisor not configured".to_string()))?;
    if known_categories.is_empty() {
        return Err(CoreError::AdvisorUnavailable(
            "no known catalog categories to recommend from".to_string(),
        ));
    }

    let prompt = recommendation_prompt(requirements, known_categories);
    let response = advisor.complete(&prompt, 1024).await?;
    let recommendations = parse_recommendations(&response, known_categories)?;
    Ok(recommendations)
}

fn recommendation_prompt(requirements: &ProjectRequirements, known_categories: &[String]) -> String {
    let requirements_json =
        serde_json::to_string_pretty(requirements).unwrap_or_else(|_| "{}".to_string());
    format!(
        "Project requirements:\n{requirements_json}\n\n\
         Known catalog categories: {}\n\n\
         Based on Indian construction standards, recommend the material categories \
         to procure for this project.\n\
         Output a valid JSON array of objects with these keys:\n\
         - \"category\": one of the known catalog categories\n\
         - \"search_query\": a supplier search phrase for that category\n\
         - \"priority\": high, medium or low\n\
         - \"reason\": basis of the recommendation\n\
         Use only the known categories. Output only JSON.",
        known_categories.join(", ")
    )
}

/// Parse the advisor's reply. The output is untrusted: code fences are
/// stripped, entries outside the known category list are dropped, and
/// anything unparsable fails the whole path so the caller can fall back.
pub fn parse_recommendations(
    response: &str,
    known_categories: &[String],
) -> CoreResult<Vec<CategoryRecommendation>> {
    let body = strip_code_fences(response);
    let parsed: Value = serde_json::from_str(body.trim()).map_err(|e| {
        CoreError::AdvisorUnavailable(format!("advisor returned unparsable JSON: {e}"))
    })?;
    let items = parsed.as_array().ok_or_else(|| {
        CoreError::AdvisorUnavailable("advisor JSON was not an array".to_string())
    })?;

    let mut recommendations = Vec::new();
    for item in items {
        let Some(raw_category) = item.get("category").and_then(Value::as_str) else {
            continue;
        };
        // Restrict to known categories, adopting the catalog's casing.
        let Some(category) = known_categories
            .iter()
            .find(|known| known.eq_ignore_ascii_case(raw_category.trim()))
        else {
            debug!(category = raw_category, "Dropping unknown advisor category");
            continue;
        };
        if recommendations
            .iter()
            .any(|r: &CategoryRecommendation| r.category == *category)
        {
            continue;
        }

        let search_query = item
            .get("search_query")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{category} suppliers"));
        let priority = item
            .get("priority")
            .and_then(Value::as_str)
            .map(Priority::parse_lenient)
            .unwrap_or_default();
        let reason = item
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        recommendations.push(CategoryRecommendation {
            category: category.clone(),
            search_query,
            priority,
            reason,
        });
    }

    if recommendations.is_empty() {
        return Err(CoreError::AdvisorUnavailable(
            "advisor returned zero usable recommendations".to_string(),
        ));
    }
    Ok(recommendations)
}

/// Advisors habitually wrap JSON in markdown fences; unwrap the first
/// fenced block when present.
fn strip_code_fences(response: &str) -> &str {
    if let Some(after) = response.split("```json").nth(1) {
        after.split("```").next().unwrap_or(after)
    } else if let Some(after) = response.split("```").nth(1) {
        after
    } else {
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubAdvisor {
        reply: CoreResult<String>,
    }

    impl StubAdvisor {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(CoreError::AdvisorUnavailable("down".to_string())),
            }
        }
    }

    #[async_trait]
    impl Advisor for StubAdvisor {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> CoreResult<String> {
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(CoreError::AdvisorUnavailable("down".to_string())),
            }
        }
    }

    fn requirements() -> ProjectRequirements {
        ProjectRequirements {
            power_capacity_mw: Some(25.0),
            built_up_area_sqft: 200_000.0,
            project_volume_crore: Some(1875.0),
            location: "Navi Mumbai".to_string(),
            project_type: ProjectType::DataCenter,
        }
    }

    fn known() -> Vec<String> {
        vec!["Cement".to_string(), "Steel".to_string(), "Tiles".to_string()]
    }

    #[test]
    fn fallback_totals_equal_quantity_times_unit_cost() {
        for area in [0.0, 1.0, 50_000.0, 987_654.0] {
            for project_type in [
                ProjectType::Residential,
                ProjectType::Commercial,
                ProjectType::Industrial,
                ProjectType::DataCenter,
            ] {
                for estimate in estimate_fallback_materials(area, project_type) {
                    let quantity = estimate.quantity.value.unwrap();
                    assert_eq!(estimate.total_cost, quantity * estimate.unit_cost);
                }
            }
        }
    }

    #[test]
    fn type_multiplier_scales_quantities() {
        let residential = estimate_fallback_materials(10_000.0, ProjectType::Residential);
        let data_center = estimate_fallback_materials(10_000.0, ProjectType::DataCenter);
        for (r, d) in residential.iter().zip(&data_center) {
            let r_qty = r.quantity.value.unwrap();
            let d_qty = d.quantity.value.unwrap();
            assert!((d_qty - r_qty * 1.8).abs() < 1e-9);
        }
    }

    #[test]
    fn parses_fenced_advisor_json_and_drops_unknown_categories() {
        let reply = r#"Here you go:
```json
[
  {"category": "cement", "search_query": "OPC 53 cement dealers", "priority": "high", "reason": "structural"},
  {"category": "Granite", "search_query": "granite", "priority": "low", "reason": "not in catalog"},
  {"category": "Steel", "priority": "unusual"}
]
```"#;
        let recs = parse_recommendations(reply, &known()).unwrap();
        assert_eq!(recs.len(), 2);
        // Catalog casing is adopted.
        assert_eq!(recs[0].category, "Cement");
        assert_eq!(recs[0].search_query, "OPC 53 cement dealers");
        assert_eq!(recs[0].priority, Priority::High);
        // Missing fields fall back to defaults.
        assert_eq!(recs[1].category, "Steel");
        assert_eq!(recs[1].search_query, "Steel suppliers");
        assert_eq!(recs[1].priority, Priority::Medium);
    }

    #[test]
    fn unparsable_or_empty_advisor_output_errors() {
        assert!(parse_recommendations("not json at all", &known()).is_err());
        assert!(parse_recommendations("[]", &known()).is_err());
        assert!(parse_recommendations(r#"[{"category": "Granite"}]"#, &known()).is_err());
    }

    #[tokio::test]
    async fn advisor_failure_falls_back_to_deterministic() {
        let plan =
            estimate_materials(Some(&StubAdvisor::failing()), &requirements(), &known()).await;
        assert_eq!(plan.source, EstimateSource::Deterministic);
        assert!(plan.recommendations.is_empty());
        assert_eq!(plan.deterministic.len(), MATERIAL_TABLE.len());
    }

    #[tokio::test]
    async fn advisor_success_still_computes_deterministic_estimates() {
        let advisor = StubAdvisor::replying(
            r#"[{"category": "Cement", "search_query": "cement dealers", "priority": "high", "reason": "base"}]"#,
        );
        let plan = estimate_materials(Some(&advisor), &requirements(), &known()).await;
        assert_eq!(plan.source, EstimateSource::Advisor);
        assert_eq!(plan.recommendations.len(), 1);
        assert_eq!(plan.deterministic.len(), MATERIAL_TABLE.len());
    }

    #[tokio::test]
    async fn missing_advisor_uses_deterministic_path() {
        let plan =
            estimate_materials(None::<&StubAdvisor>, &requirements(), &known()).await;
        assert_eq!(plan.source, EstimateSource::Deterministic);
    }

    #[test]
    fn symbolic_estimates_carry_zero_costs() {
        let recs = vec![CategoryRecommendation {
            category: "Cement".to_string(),
            search_query: "cement".to_string(),
            priority: Priority::High,
            reason: String::new(),
        }];
        let estimates = recommendation_estimates(&recs);
        assert_eq!(estimates[0].quantity.value, None);
        assert_eq!(estimates[0].quantity.unit, SYMBOLIC_QUANTITY);
        assert_eq!(estimates[0].unit_cost, 0.0);
        assert_eq!(estimates[0].total_cost, 0.0);
    }
}
