//! Progress aggregation.
//!
//! This module folds trips into cumulative [`Statistics`] and derives the
//! learner's totals and tasks from them. Trips are processed in start-time
//! order because bonus allocation depends on it.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::config::JurisdictionRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, Jurisdiction, LearnerProfile, ManualEntries,
    ProgressReport, ProgressTotals, Statistics, TaskKind, TaskProgress, Trip, TripBreakdown,
};

use super::apportionment::apportion_trip;
use super::bonus::{BonusInput, BonusPool, allocate_trip_bonus};
use super::solar::SolarTimes;
use super::tasks::{build_tasks, safer_drivers_applies};

/// One trip's breakdown with the audit records produced for it.
#[derive(Debug, Clone)]
pub struct TripEvaluation {
    /// The trip's breakdown.
    pub breakdown: TripBreakdown,
    /// Audit steps, apportionment first then bonus.
    pub steps: Vec<AuditStep>,
    /// Warnings such as polar solar fallbacks.
    pub warnings: Vec<AuditWarning>,
}

/// Breakdowns and audit trace from folding a batch of trips.
#[derive(Debug, Clone, Default)]
pub struct TripFold {
    /// One breakdown per folded trip, in start-time order.
    pub breakdowns: Vec<TripBreakdown>,
    /// The audit trace of the batch.
    pub audit_trace: AuditTrace,
}

/// Evaluates one trip: solar times, day/night split, light and bonus.
///
/// # Arguments
///
/// * `trip` - A validated trip
/// * `jurisdiction` - The active jurisdiction
/// * `pool` - The open bonus pool, or `None` where no bonus applies
/// * `step_number` - The first audit step number to use
pub fn evaluate_trip(
    trip: &Trip,
    jurisdiction: Jurisdiction,
    pool: Option<&mut BonusPool>,
    step_number: u32,
) -> EngineResult<TripEvaluation> {
    let solar = SolarTimes::resolve(trip.local_date()?, trip.start_location, trip.zone()?)?;
    let apportioned = apportion_trip(trip, &solar.times, jurisdiction, step_number)?;
    let bonus = allocate_trip_bonus(
        pool,
        trip.id,
        BonusInput {
            supervisor_accredited: trip.supervisor_accredited,
            apportionment: apportioned.apportionment,
            first_period: apportioned.first_period,
        },
        jurisdiction,
        step_number + 1,
    );

    let breakdown = TripBreakdown {
        trip_id: trip.id,
        start_seconds: apportioned.start_seconds,
        elapsed_seconds: trip.elapsed_seconds(),
        day_seconds: apportioned.apportionment.day_seconds,
        night_seconds: apportioned.apportionment.night_seconds,
        day_bonus_seconds: bonus.credit.day_bonus_seconds,
        night_bonus_seconds: bonus.credit.night_bonus_seconds,
        first_period: apportioned.first_period,
        light: apportioned.light.conditions,
    };

    debug!(
        trip_id = %trip.id,
        day_seconds = breakdown.day_seconds,
        night_seconds = breakdown.night_seconds,
        day_bonus_seconds = breakdown.day_bonus_seconds,
        night_bonus_seconds = breakdown.night_bonus_seconds,
        "evaluated trip"
    );

    Ok(TripEvaluation {
        breakdown,
        steps: vec![apportioned.audit_step, bonus.audit_step],
        warnings: solar.warnings,
    })
}

/// Opens the bonus pool for a jurisdiction.
///
/// Bonus already in the statistics and the capped manual bonus entries are
/// deducted from the cap. Returns `None` for jurisdictions without a bonus.
pub fn open_bonus_pool(
    rules: &JurisdictionRules,
    statistics: &Statistics,
    entries: &ManualEntries,
) -> Option<BonusPool> {
    rules.bonus.as_ref().map(|rule| {
        let (manual_day, manual_night) = entries.capped_bonus_seconds(rule.cap_seconds);
        BonusPool::from_rule(
            rule,
            statistics.day_bonus_seconds + manual_day,
            statistics.night_bonus_seconds + manual_night,
        )
    })
}

/// Folds trips that are not yet accumulated into the statistics.
///
/// Trips are sorted by start time. Trips already flagged accumulated are
/// skipped with a warning, so folding the same trip twice never double
/// counts.
///
/// # Returns
///
/// The breakdowns and audit trace, or an error if the statistics belong to
/// another jurisdiction or a trip cannot be evaluated. On error the
/// statistics are left unchanged.
pub fn fold_trips(
    statistics: &mut Statistics,
    rules: &JurisdictionRules,
    entries: &ManualEntries,
    trips: &[Trip],
) -> EngineResult<TripFold> {
    let pending: Vec<&Trip> = trips
        .iter()
        .filter(|trip| {
            if trip.accumulated {
                warn!(trip_id = %trip.id, "skipping trip that is already accumulated");
            }
            !trip.accumulated
        })
        .collect();
    fold_ordered(statistics, rules, entries, pending)
}

/// Computes breakdowns for every trip from zero, ignoring accumulated flags.
///
/// Used for logbook export, where every trip needs a breakdown computed the
/// same way a full recompute would.
pub fn calculate_trip_breakdowns(
    rules: &JurisdictionRules,
    entries: &ManualEntries,
    trips: &[Trip],
) -> EngineResult<TripFold> {
    let mut statistics = Statistics::new(rules.jurisdiction);
    fold_ordered(&mut statistics, rules, entries, trips.iter().collect())
}

fn fold_ordered(
    statistics: &mut Statistics,
    rules: &JurisdictionRules,
    entries: &ManualEntries,
    mut trips: Vec<&Trip>,
) -> EngineResult<TripFold> {
    if statistics.jurisdiction != rules.jurisdiction {
        return Err(EngineError::JurisdictionMismatch {
            expected: rules.jurisdiction,
            found: statistics.jurisdiction,
        });
    }

    let start_time = Instant::now();
    trips.sort_by_key(|t| t.start_time);

    let mut working = statistics.clone();
    let mut pool = open_bonus_pool(rules, &working, entries);
    let mut fold = TripFold::default();
    let mut step_number: u32 = 1;

    for trip in trips {
        let evaluation = evaluate_trip(trip, rules.jurisdiction, pool.as_mut(), step_number)?;
        step_number += evaluation.steps.len() as u32;

        working.record(trip, &evaluation.breakdown);
        fold.breakdowns.push(evaluation.breakdown);
        fold.audit_trace.steps.extend(evaluation.steps);
        fold.audit_trace.warnings.extend(evaluation.warnings);
    }

    *statistics = working;
    fold.audit_trace.duration_us = start_time.elapsed().as_micros() as u64;
    Ok(fold)
}

/// Adds the manual baseline and derived bonuses to the statistics.
///
/// Manual bonus minutes are capped by the jurisdiction's pool. The Safer
/// Drivers bonus is added on top once the course counts.
pub fn calculate_progress_totals(
    statistics: &Statistics,
    rules: &JurisdictionRules,
    entries: &ManualEntries,
    profile: &LearnerProfile,
) -> ProgressTotals {
    let (manual_day_bonus, manual_night_bonus) =
        entries.capped_bonus_seconds(rules.bonus_cap_seconds());

    let mut totals = ProgressTotals {
        day_seconds: statistics.day_seconds.saturating_add(entries.day_seconds()),
        night_seconds: statistics.night_seconds.saturating_add(entries.night_seconds()),
        day_bonus_seconds: statistics.day_bonus_seconds.saturating_add(manual_day_bonus),
        night_bonus_seconds: statistics.night_bonus_seconds.saturating_add(manual_night_bonus),
        safer_drivers_bonus_seconds: 0,
    };

    if let Some(rule) = rules.safer_drivers()
        && safer_drivers_applies(
            Some(rule),
            profile.is_attested(TaskKind::SaferDriversCourse),
            totals.logged_with_bonus_seconds(),
        )
    {
        totals.safer_drivers_bonus_seconds = rule.bonus_seconds;
    }

    totals
}

/// Builds the learner's progress report.
///
/// # Arguments
///
/// * `statistics` - Statistics computed under the active jurisdiction
/// * `rules` - The active jurisdiction's rules
/// * `entries` - The jurisdiction's manual baseline
/// * `profile` - The learner profile, including the stage for TAS and WA
/// * `today` - The evaluation date for age and hold duration
///
/// # Returns
///
/// The report, or an error if the statistics belong to another
/// jurisdiction or the profile's stage does not fit the jurisdiction.
pub fn build_progress_report(
    statistics: &Statistics,
    rules: &JurisdictionRules,
    entries: &ManualEntries,
    profile: &LearnerProfile,
    today: NaiveDate,
) -> EngineResult<ProgressReport> {
    if statistics.jurisdiction != rules.jurisdiction {
        return Err(EngineError::JurisdictionMismatch {
            expected: rules.jurisdiction,
            found: statistics.jurisdiction,
        });
    }

    let phase = rules.phase(profile.stage)?;
    let totals = calculate_progress_totals(statistics, rules, entries, profile);
    let tasks = build_tasks(rules, phase, profile, &totals, today);
    let fraction_complete = TaskProgress::Seconds {
        current: totals.credited_seconds(),
        required: phase.requirement.required_seconds(),
    }
    .fraction();

    Ok(ProgressReport {
        generated_at: Utc::now(),
        jurisdiction: rules.jurisdiction,
        stage: profile.stage,
        totals,
        trips_folded: statistics.trips_folded,
        fraction_complete,
        tasks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleTable;
    use crate::models::{Conditions, Coordinate, LightCondition, Period, Stage};
    use chrono::{DateTime, TimeZone};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Builds a Melbourne trip from local AEDT clock times on 2026-01-15.
    fn melbourne_trip(start_hour: u32, hours: i64, accredited: bool) -> Trip {
        let start: DateTime<Utc> = chrono_tz::Australia::Melbourne
            .with_ymd_and_hms(2026, 1, 15, start_hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        Trip {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: start + chrono::Duration::hours(hours),
            time_zone: "Australia/Melbourne".to_string(),
            start_location: Coordinate::new(-37.81, 144.96),
            odometer_start: Decimal::new(1000, 0),
            distance_km: Decimal::new(40, 0),
            car_registration: "1AB2CD".to_string(),
            supervisor_id: "sup_001".to_string(),
            supervisor_accredited: accredited,
            conditions: Conditions::default(),
            accumulated: false,
        }
    }

    fn rules(jurisdiction: Jurisdiction) -> JurisdictionRules {
        RuleTable::builtin().rules(jurisdiction).unwrap().clone()
    }

    #[test]
    fn test_evaluate_daytime_trip() {
        let trip = melbourne_trip(8, 2, false);
        let evaluation = evaluate_trip(&trip, Jurisdiction::Vic, None, 1).unwrap();

        assert_eq!(evaluation.breakdown.day_seconds, 7200);
        assert_eq!(evaluation.breakdown.night_seconds, 0);
        assert_eq!(evaluation.breakdown.first_period, Period::Day);
        assert_eq!(
            evaluation.breakdown.light,
            std::collections::BTreeSet::from([LightCondition::Day])
        );
        assert_eq!(evaluation.steps.len(), 2);
        assert_eq!(evaluation.steps[1].step_number, 2);
        assert!(evaluation.warnings.is_empty());
    }

    #[test]
    fn test_fold_skips_accumulated_trips() {
        let rules = rules(Jurisdiction::Vic);
        let mut statistics = Statistics::new(Jurisdiction::Vic);
        let mut done = melbourne_trip(8, 1, false);
        done.accumulated = true;
        let pending = melbourne_trip(12, 1, false);

        let fold = fold_trips(
            &mut statistics,
            &rules,
            &ManualEntries::default(),
            &[done, pending.clone()],
        )
        .unwrap();

        assert_eq!(fold.breakdowns.len(), 1);
        assert_eq!(fold.breakdowns[0].trip_id, pending.id);
        assert_eq!(statistics.trips_folded, 1);
        assert_eq!(statistics.day_seconds, 3600);
    }

    #[test]
    fn test_fold_orders_trips_by_start_for_bonus() {
        let rules = rules(Jurisdiction::Nsw);
        let mut statistics = Statistics::new(Jurisdiction::Nsw);
        // Manual bonus leaves 1800s in the pool
        let entries = ManualEntries {
            day_bonus_minutes: Some(1170),
            ..ManualEntries::default()
        };
        let later = melbourne_trip(14, 1, true);
        let earlier = melbourne_trip(9, 1, true);

        let fold = fold_trips(&mut statistics, &rules, &entries, &[later.clone(), earlier.clone()])
            .unwrap();

        assert_eq!(fold.breakdowns[0].trip_id, earlier.id);
        assert_eq!(fold.breakdowns[0].day_bonus_seconds, 1800);
        assert_eq!(fold.breakdowns[1].trip_id, later.id);
        assert_eq!(fold.breakdowns[1].day_bonus_seconds, 0);
        assert_eq!(statistics.day_bonus_seconds, 1800);
        assert_eq!(fold.audit_trace.steps.len(), 4);
        assert_eq!(fold.audit_trace.steps[3].step_number, 4);
    }

    #[test]
    fn test_fold_rejects_statistics_from_other_jurisdiction() {
        let mut statistics = Statistics::new(Jurisdiction::Vic);
        let result = fold_trips(
            &mut statistics,
            &rules(Jurisdiction::Qld),
            &ManualEntries::default(),
            &[melbourne_trip(8, 1, false)],
        );

        match result {
            Err(EngineError::JurisdictionMismatch { expected, found }) => {
                assert_eq!(expected, Jurisdiction::Qld);
                assert_eq!(found, Jurisdiction::Vic);
            }
            other => panic!("Expected JurisdictionMismatch, got {:?}", other),
        }
        assert_eq!(statistics.trips_folded, 0);
    }

    #[test]
    fn test_fold_leaves_statistics_unchanged_on_error() {
        let rules = rules(Jurisdiction::Vic);
        let mut statistics = Statistics::new(Jurisdiction::Vic);
        let mut broken = melbourne_trip(10, 1, false);
        broken.time_zone = "Mars/Olympus".to_string();

        let result = fold_trips(
            &mut statistics,
            &rules,
            &ManualEntries::default(),
            &[melbourne_trip(8, 1, false), broken],
        );

        assert!(matches!(result, Err(EngineError::UnknownTimeZone { .. })));
        assert_eq!(statistics, Statistics::new(Jurisdiction::Vic));
    }

    #[test]
    fn test_totals_add_baseline_and_cap_manual_bonus() {
        let rules = rules(Jurisdiction::Qld);
        let mut statistics = Statistics::new(Jurisdiction::Qld);
        statistics.day_seconds = 3600;
        statistics.night_seconds = 1800;
        let entries = ManualEntries {
            day_minutes: 60,
            night_minutes: 30,
            day_bonus_minutes: Some(2000),
            night_bonus_minutes: Some(100),
        };

        let totals = calculate_progress_totals(
            &statistics,
            &rules,
            &entries,
            &LearnerProfile::new(date(2008, 1, 1)),
        );

        assert_eq!(totals.day_seconds, 7200);
        assert_eq!(totals.night_seconds, 3600);
        assert_eq!(totals.day_bonus_seconds, 72000);
        assert_eq!(totals.night_bonus_seconds, 0);
        assert_eq!(totals.safer_drivers_bonus_seconds, 0);
    }

    #[test]
    fn test_safer_drivers_bonus_added_at_threshold() {
        let rules = rules(Jurisdiction::Nsw);
        let mut profile = LearnerProfile::new(date(2008, 1, 1));
        profile.attest(TaskKind::SaferDriversCourse, None);

        let mut statistics = Statistics::new(Jurisdiction::Nsw);
        statistics.day_seconds = 170000;
        statistics.day_bonus_seconds = 9999;
        let below =
            calculate_progress_totals(&statistics, &rules, &ManualEntries::default(), &profile);
        assert_eq!(below.safer_drivers_bonus_seconds, 0);

        statistics.day_bonus_seconds = 10000;
        let at = calculate_progress_totals(&statistics, &rules, &ManualEntries::default(), &profile);
        assert_eq!(at.safer_drivers_bonus_seconds, 72000);
        assert_eq!(at.credited_seconds(), 180000 + 72000);
    }

    #[test]
    fn test_progress_report_requires_stage_for_tas() {
        let rules = rules(Jurisdiction::Tas);
        let statistics = Statistics::new(Jurisdiction::Tas);
        let mut profile = LearnerProfile::new(date(2009, 1, 1));

        let result = build_progress_report(
            &statistics,
            &rules,
            &ManualEntries::default(),
            &profile,
            date(2026, 6, 1),
        );
        assert!(matches!(result, Err(EngineError::StageRequired { .. })));

        profile.stage = Some(Stage::First);
        let report = build_progress_report(
            &statistics,
            &rules,
            &ManualEntries::default(),
            &profile,
            date(2026, 6, 1),
        )
        .unwrap();
        assert_eq!(report.stage, Some(Stage::First));
        assert_eq!(report.tasks.len(), 3);
        assert_eq!(report.fraction_complete, Decimal::ZERO);
        assert!(!report.all_complete());
    }

    #[test]
    fn test_progress_report_fraction_counts_credited_time() {
        let rules = rules(Jurisdiction::Nsw);
        let profile = LearnerProfile::new(date(2008, 1, 1));
        let mut statistics = Statistics::new(Jurisdiction::Nsw);
        statistics.day_seconds = 90000;
        statistics.day_bonus_seconds = 18000;
        let entries = ManualEntries {
            night_minutes: 1800,
            ..ManualEntries::default()
        };

        let report =
            build_progress_report(&statistics, &rules, &entries, &profile, date(2026, 6, 1))
                .unwrap();
        // (90000 + 18000 + 108000) / 432000
        assert_eq!(report.fraction_complete, Decimal::new(5, 1));
        assert_eq!(
            report.task(TaskKind::LogHours).unwrap().progress.fraction(),
            report.fraction_complete
        );
    }

    #[test]
    fn test_progress_report_fraction_stops_at_one() {
        let rules = rules(Jurisdiction::Vic);
        let profile = LearnerProfile::new(date(2008, 1, 1));
        let statistics = Statistics::new(Jurisdiction::Vic);
        let entries = ManualEntries {
            day_minutes: i64::MAX,
            night_minutes: i64::MAX,
            ..ManualEntries::default()
        };

        let report =
            build_progress_report(&statistics, &rules, &entries, &profile, date(2026, 6, 1))
                .unwrap();
        assert_eq!(report.totals.logged_seconds(), i64::MAX);
        assert_eq!(report.fraction_complete, Decimal::ONE);
    }
}
