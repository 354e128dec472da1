//! Schedule engine.
//!
//! Proportional-allocation heuristic, not a dependency-aware scheduler: a
//! fixed ordered list of construction phases is laid out contiguously
//! across a duration derived from project size and power capacity.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::domain::{PhaseStatus, ProjectType, SchedulePhase};

/// One row of the fixed phase plan.
pub struct PhaseSpec {
    pub name: &'static str,
    pub owner: &'static str,
    /// Fraction of the total duration. Shares sum to 1.0.
    pub share: f64,
}

pub const SCHEDULE_PHASES: [PhaseSpec; 8] = [
    PhaseSpec { name: "Site Preparation", owner: "Civil Contractor", share: 0.08 },
    PhaseSpec { name: "Foundation", owner: "Civil Contractor", share: 0.12 },
    PhaseSpec { name: "Structural Framework", owner: "Structural Contractor", share: 0.20 },
    PhaseSpec { name: "MEP Installation", owner: "MEP Contractor", share: 0.15 },
    PhaseSpec { name: "Envelope", owner: "Facade Contractor", share: 0.12 },
    PhaseSpec { name: "Interior Finishing", owner: "Interiors Contractor", share: 0.18 },
    PhaseSpec { name: "Testing & Commissioning", owner: "Commissioning Agent", share: 0.10 },
    PhaseSpec { name: "Handover", owner: "Project Manager", share: 0.05 },
];

/// Duration multiplier for power-heavy projects.
const HIGH_POWER_THRESHOLD_MW: f64 = 10.0;
const HIGH_POWER_FACTOR: f64 = 1.3;

/// Base project duration in months, tiered by built-up area, stretched for
/// power-heavy projects (truncated to whole months).
pub fn project_duration_months(built_up_area_sqft: f64, power_capacity_mw: Option<f64>) -> i64 {
    let base: i64 = if built_up_area_sqft <= 50_000.0 {
        12
    } else if built_up_area_sqft <= 200_000.0 {
        18
    } else {
        24
    };

    match power_capacity_mw {
        Some(power) if power > HIGH_POWER_THRESHOLD_MW => (base as f64 * HIGH_POWER_FACTOR) as i64,
        _ => base,
    }
}

/// Lay the fixed phase plan out contiguously from `start_date`.
///
/// Each phase's duration is `floor(total_days x share)`; the sum may
/// undershoot `total_days` by up to one day per phase from rounding. The
/// status/progress pattern across phases is a fixed presentation
/// heuristic, not tracked progress.
pub fn generate_schedule(
    built_up_area_sqft: f64,
    project_type: ProjectType,
    power_capacity_mw: Option<f64>,
    start_date: NaiveDate,
) -> Vec<SchedulePhase> {
    let months = project_duration_months(built_up_area_sqft, power_capacity_mw);
    let total_days = months * 30;

    debug!(
        project_type = %project_type,
        months = months,
        total_days = total_days,
        "Generating schedule"
    );

    let mut phases = Vec::with_capacity(SCHEDULE_PHASES.len());
    let mut cursor = start_date;
    for (position, spec) in SCHEDULE_PHASES.iter().enumerate() {
        let duration_days = (total_days as f64 * spec.share).floor() as i64;
        let end_date = cursor + Duration::days(duration_days);
        let (status, progress_percent) = simulated_status(position);

        phases.push(SchedulePhase {
            name: spec.name.to_string(),
            owner: spec.owner.to_string(),
            start_date: cursor,
            end_date,
            duration_days,
            progress_percent,
            status,
        });
        cursor = end_date;
    }

    phases
}

/// Fixed display pattern: first phase done, second underway, third on the
/// critical path, the rest upcoming.
fn simulated_status(position: usize) -> (PhaseStatus, f64) {
    match position {
        0 => (PhaseStatus::Complete, 100.0),
        1 => (PhaseStatus::Active, 45.0),
        2 => (PhaseStatus::Critical, 10.0),
        _ => (PhaseStatus::Future, 0.0),
    }
}
