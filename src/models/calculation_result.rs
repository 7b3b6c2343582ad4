//! Calculation result models for the logbook engine.
//!
//! This module contains the per-trip [`TripBreakdown`], the [`FoldResult`]
//! returned when trips are folded into statistics, the [`ProgressReport`]
//! read by task and progress displays, and the audit trace types that record
//! every decision made along the way.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Jurisdiction, LightCondition, Period, Stage, Task};

/// How one trip's elapsed time was classified and credited.
///
/// # Example
///
/// ```
/// use logbook_engine::models::{LightCondition, Period, TripBreakdown};
/// use std::collections::BTreeSet;
/// use uuid::Uuid;
///
/// let breakdown = TripBreakdown {
///     trip_id: Uuid::new_v4(),
///     start_seconds: 8 * 3600,
///     elapsed_seconds: 7200,
///     day_seconds: 7200,
///     night_seconds: 0,
///     day_bonus_seconds: 0,
///     night_bonus_seconds: 0,
///     first_period: Period::Day,
///     light: BTreeSet::from([LightCondition::Day]),
/// };
/// assert_eq!(breakdown.credited_seconds(), 7200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripBreakdown {
    /// The trip this breakdown belongs to.
    pub trip_id: Uuid,
    /// Trip start as seconds since local midnight.
    pub start_seconds: i64,
    /// Total elapsed seconds.
    pub elapsed_seconds: i64,
    /// Seconds between civil dawn and civil dusk.
    pub day_seconds: i64,
    /// Seconds outside civil dawn and civil dusk.
    pub night_seconds: i64,
    /// Bonus seconds credited against the daytime portion.
    pub day_bonus_seconds: i64,
    /// Bonus seconds credited against the night-time portion.
    pub night_bonus_seconds: i64,
    /// Which period the trip started in.
    pub first_period: Period,
    /// Light conditions the trip passed through.
    pub light: BTreeSet<LightCondition>,
}

impl TripBreakdown {
    /// Returns the bonus seconds credited for this trip.
    pub fn bonus_seconds(&self) -> i64 {
        self.day_bonus_seconds + self.night_bonus_seconds
    }

    /// Returns driven plus bonus seconds.
    pub fn credited_seconds(&self) -> i64 {
        self.day_seconds + self.night_seconds + self.bonus_seconds()
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The jurisdiction whose rules were applied.
    pub jurisdiction: Jurisdiction,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate a fallback or anomaly that did not prevent the
/// calculation but may deserve attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// ```
/// use logbook_engine::models::AuditTrace;
///
/// let trace = AuditTrace::default();
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The result of folding pending trips into cumulative statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldResult {
    /// Unique identifier for this fold.
    pub fold_id: Uuid,
    /// When the fold was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the fold.
    pub engine_version: String,
    /// The jurisdiction the trips were folded under.
    pub jurisdiction: Jurisdiction,
    /// Whether statistics were reset and every trip refolded.
    pub full_recompute: bool,
    /// Breakdowns of the trips folded, in chronological order.
    pub breakdowns: Vec<TripBreakdown>,
    /// Complete audit trace of the fold.
    pub audit_trace: AuditTrace,
}

/// Cumulative totals after adding the manual baseline and derived bonuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTotals {
    /// Daytime seconds, trips plus baseline.
    pub day_seconds: i64,
    /// Night-time seconds, trips plus baseline.
    pub night_seconds: i64,
    /// Daytime bonus seconds, trips plus baseline.
    pub day_bonus_seconds: i64,
    /// Night-time bonus seconds, trips plus baseline.
    pub night_bonus_seconds: i64,
    /// Flat Safer Drivers course bonus, when it applies.
    pub safer_drivers_bonus_seconds: i64,
}

impl ProgressTotals {
    /// Returns driven seconds, day plus night.
    pub fn logged_seconds(&self) -> i64 {
        self.day_seconds.saturating_add(self.night_seconds)
    }

    /// Returns the accredited-instructor bonus, day plus night.
    pub fn instructor_bonus_seconds(&self) -> i64 {
        self.day_bonus_seconds.saturating_add(self.night_bonus_seconds)
    }

    /// Returns driven plus instructor bonus seconds, before Safer Drivers.
    pub fn logged_with_bonus_seconds(&self) -> i64 {
        self.logged_seconds()
            .saturating_add(self.instructor_bonus_seconds())
    }

    /// Returns every credited second, including the Safer Drivers bonus.
    pub fn credited_seconds(&self) -> i64 {
        self.logged_with_bonus_seconds()
            .saturating_add(self.safer_drivers_bonus_seconds)
    }

    /// Returns night-time driving plus night bonus.
    pub fn credited_night_seconds(&self) -> i64 {
        self.night_seconds.saturating_add(self.night_bonus_seconds)
    }
}

/// Learner progress for the active jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The active jurisdiction.
    pub jurisdiction: Jurisdiction,
    /// The learner stage, for staged jurisdictions.
    pub stage: Option<Stage>,
    /// Cumulative totals.
    pub totals: ProgressTotals,
    /// Trips folded into the totals.
    pub trips_folded: u32,
    /// Credited time as a share of the required time, capped at one.
    pub fraction_complete: Decimal,
    /// Completion requirements, in display order.
    pub tasks: Vec<Task>,
}

impl ProgressReport {
    /// Returns the task of the given kind, if the jurisdiction has one.
    pub fn task(&self, kind: super::TaskKind) -> Option<&Task> {
        self.tasks.iter().find(|t| t.kind == kind)
    }

    /// Returns true if every task is complete.
    pub fn all_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_sums() {
        let totals = ProgressTotals {
            day_seconds: 100,
            night_seconds: 50,
            day_bonus_seconds: 20,
            night_bonus_seconds: 10,
            safer_drivers_bonus_seconds: 5,
        };

        assert_eq!(totals.logged_seconds(), 150);
        assert_eq!(totals.instructor_bonus_seconds(), 30);
        assert_eq!(totals.logged_with_bonus_seconds(), 180);
        assert_eq!(totals.credited_seconds(), 185);
        assert_eq!(totals.credited_night_seconds(), 60);
    }

    #[test]
    fn test_breakdown_credited_seconds() {
        let breakdown = TripBreakdown {
            trip_id: Uuid::nil(),
            start_seconds: 0,
            elapsed_seconds: 100,
            day_seconds: 60,
            night_seconds: 40,
            day_bonus_seconds: 120,
            night_bonus_seconds: 80,
            first_period: Period::Night,
            light: BTreeSet::new(),
        };
        assert_eq!(breakdown.bonus_seconds(), 200);
        assert_eq!(breakdown.credited_seconds(), 300);
    }

    #[test]
    fn test_fold_result_serialization_round_trip() {
        let result = FoldResult {
            fold_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: "0.1.0".to_string(),
            jurisdiction: Jurisdiction::Nsw,
            full_recompute: true,
            breakdowns: vec![],
            audit_trace: AuditTrace {
                steps: vec![AuditStep {
                    step_number: 1,
                    rule_id: "trip_apportionment".to_string(),
                    rule_name: "Trip Day/Night Apportionment".to_string(),
                    jurisdiction: Jurisdiction::Nsw,
                    input: serde_json::json!({ "elapsed_seconds": 3600 }),
                    output: serde_json::json!({ "day_seconds": 3600 }),
                    reasoning: "entirely within daylight".to_string(),
                }],
                warnings: vec![],
                duration_us: 12,
            },
        };

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: FoldResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }
}
