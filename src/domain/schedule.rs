//! Schedule domain types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display status of a schedule phase.
///
/// The status/progress pattern across phases is a fixed presentation
/// heuristic, not a tracked project state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Complete,
    Active,
    Critical,
    Future,
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Active => write!(f, "active"),
            Self::Critical => write!(f, "critical"),
            Self::Future => write!(f, "future"),
        }
    }
}

/// One named, time-boxed segment of the construction schedule.
///
/// Phases form a contiguous ordered sequence: each phase starts on the
/// previous phase's end date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulePhase {
    pub name: String,
    pub owner: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub progress_percent: f64,
    pub status: PhaseStatus,
}
