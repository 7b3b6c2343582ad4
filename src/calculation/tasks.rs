//! Task derivation.
//!
//! Tasks are rebuilt from cumulative totals, the jurisdiction's rules and
//! the learner profile on every evaluation. A task is available once every
//! prerequisite task is complete.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::config::{HoursRequirement, JurisdictionRules, Phase, SaferDriversRule};
use crate::models::{LearnerProfile, ProgressTotals, Task, TaskKind, TaskProgress};

use super::hold_duration::hold_progress;

/// Returns true if the Safer Drivers course bonus counts.
///
/// The course counts once the learner has attested it and logged time
/// including instructor bonus has reached the rule's threshold.
///
/// ```
/// use logbook_engine::calculation::safer_drivers_applies;
/// use logbook_engine::config::SaferDriversRule;
///
/// let rule = SaferDriversRule { threshold_seconds: 180000, bonus_seconds: 72000 };
/// assert!(!safer_drivers_applies(Some(&rule), true, 179999));
/// assert!(safer_drivers_applies(Some(&rule), true, 180000));
/// assert!(!safer_drivers_applies(Some(&rule), false, 180000));
/// ```
pub fn safer_drivers_applies(
    rule: Option<&SaferDriversRule>,
    course_attested: bool,
    logged_with_bonus_seconds: i64,
) -> bool {
    rule.is_some_and(|r| course_attested && logged_with_bonus_seconds >= r.threshold_seconds)
}

/// Returns true if the logged-hours requirement is met.
///
/// Day/night requirements need the combined total and, separately, enough
/// night-time driving (night bonus counts toward night).
pub fn log_hours_complete(requirement: &HoursRequirement, totals: &ProgressTotals) -> bool {
    match requirement {
        HoursRequirement::DayNight { night_seconds, .. } => {
            totals.credited_seconds() >= requirement.required_seconds()
                && totals.credited_night_seconds() >= *night_seconds
        }
        HoursRequirement::Total { seconds } => totals.credited_seconds() >= *seconds,
    }
}

/// Builds the tasks for one phase of a jurisdiction.
///
/// # Arguments
///
/// * `rules` - The jurisdiction's rules
/// * `phase` - The phase for the learner's stage
/// * `profile` - The learner's age, permit date and attestations
/// * `totals` - Cumulative totals including baseline and bonuses
/// * `today` - The evaluation date for age and hold duration
///
/// # Returns
///
/// Tasks in the phase's display order.
pub fn build_tasks(
    rules: &JurisdictionRules,
    phase: &Phase,
    profile: &LearnerProfile,
    totals: &ProgressTotals,
    today: NaiveDate,
) -> Vec<Task> {
    let mut tasks: Vec<Task> = phase
        .tasks
        .iter()
        .map(|rule| {
            let (progress, complete, completed_on) = match rule.kind {
                TaskKind::LogHours => (
                    TaskProgress::Seconds {
                        current: totals.credited_seconds(),
                        required: phase.requirement.required_seconds(),
                    },
                    log_hours_complete(&phase.requirement, totals),
                    None,
                ),
                TaskKind::HoldDuration => {
                    let required = phase.hold.months_for_age(profile.age_on(today));
                    let hold = hold_progress(profile.permit_received, required, today);
                    (
                        TaskProgress::Months {
                            elapsed: hold.elapsed_months,
                            required,
                        },
                        hold.complete,
                        hold.eligible_on.filter(|_| hold.complete),
                    )
                }
                TaskKind::BonusCredits => {
                    let cap = rules.bonus_cap_seconds();
                    let current = totals.instructor_bonus_seconds();
                    (
                        TaskProgress::Seconds {
                            current,
                            required: cap,
                        },
                        cap > 0 && current >= cap,
                        None,
                    )
                }
                TaskKind::SaferDriversCourse => {
                    let attestation = profile.attestation(rule.kind);
                    let applies = safer_drivers_applies(
                        rules.safer_drivers(),
                        attestation.completed,
                        totals.logged_with_bonus_seconds(),
                    );
                    (
                        TaskProgress::Attested {
                            attested: attestation.completed,
                        },
                        applies,
                        attestation.completed_on.filter(|_| applies),
                    )
                }
                TaskKind::HazardPerceptionTest
                | TaskKind::DrivingAssessment
                | TaskKind::DrivingTest => {
                    let attestation = profile.attestation(rule.kind);
                    (
                        TaskProgress::Attested {
                            attested: attestation.completed,
                        },
                        attestation.completed,
                        attestation.completed_on,
                    )
                }
            };

            Task {
                kind: rule.kind,
                title: rule.kind.title().to_string(),
                progress,
                complete,
                available: true,
                prerequisites: rule.prerequisites.clone(),
                completed_on,
            }
        })
        .collect();

    let complete: BTreeMap<TaskKind, bool> = tasks.iter().map(|t| (t.kind, t.complete)).collect();
    let safer_gate_met = rules
        .safer_drivers()
        .is_some_and(|r| totals.logged_with_bonus_seconds() >= r.threshold_seconds);

    for task in &mut tasks {
        let prerequisites_met = task
            .prerequisites
            .iter()
            .all(|p| complete.get(p).copied().unwrap_or(false));
        task.available = match task.kind {
            TaskKind::SaferDriversCourse => prerequisites_met && safer_gate_met,
            _ => prerequisites_met,
        };
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleTable;
    use crate::models::{Jurisdiction, Stage};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 10, 1)
    }

    fn profile() -> LearnerProfile {
        let mut profile = LearnerProfile::new(date(2009, 2, 1));
        profile.permit_received = Some(date(2025, 9, 1));
        profile
    }

    fn totals(day: i64, night: i64) -> ProgressTotals {
        ProgressTotals {
            day_seconds: day,
            night_seconds: night,
            ..ProgressTotals::default()
        }
    }

    fn task(tasks: &[Task], kind: TaskKind) -> &Task {
        tasks.iter().find(|t| t.kind == kind).unwrap()
    }

    fn tasks_for(
        jurisdiction: Jurisdiction,
        stage: Option<Stage>,
        profile: &LearnerProfile,
        totals: &ProgressTotals,
    ) -> Vec<Task> {
        let table = RuleTable::builtin();
        let rules = table.rules(jurisdiction).unwrap();
        let phase = rules.phase(stage).unwrap();
        build_tasks(rules, phase, profile, totals, today())
    }

    #[test]
    fn test_vic_log_hours_needs_night_component() {
        // Plenty of total time but only 9 hours of night
        let tasks = tasks_for(Jurisdiction::Vic, None, &profile(), &totals(500000, 32400));
        let log = task(&tasks, TaskKind::LogHours);
        assert!(!log.complete);
        assert_eq!(
            log.progress,
            TaskProgress::Seconds {
                current: 532400,
                required: 432000
            }
        );

        let tasks = tasks_for(Jurisdiction::Vic, None, &profile(), &totals(396000, 36000));
        assert!(task(&tasks, TaskKind::LogHours).complete);
    }

    #[test]
    fn test_vic_driving_test_waits_for_prerequisites() {
        let mut learner = profile();
        learner.attest(TaskKind::HazardPerceptionTest, Some(date(2026, 5, 1)));

        let tasks = tasks_for(Jurisdiction::Vic, None, &learner, &totals(396000, 36000));
        assert!(task(&tasks, TaskKind::HoldDuration).complete);
        assert!(task(&tasks, TaskKind::DrivingTest).available);
        assert!(!task(&tasks, TaskKind::DrivingTest).complete);

        let tasks = tasks_for(Jurisdiction::Vic, None, &learner, &totals(1000, 0));
        assert!(!task(&tasks, TaskKind::DrivingTest).available);
    }

    #[test]
    fn test_hold_months_follow_age_bracket() {
        // A 30 year old in VIC needs 3 months
        let mut learner = LearnerProfile::new(date(1996, 1, 1));
        learner.permit_received = Some(date(2026, 7, 1));
        let tasks = tasks_for(Jurisdiction::Vic, None, &learner, &totals(0, 0));
        let hold = task(&tasks, TaskKind::HoldDuration);

        assert_eq!(
            hold.progress,
            TaskProgress::Months {
                elapsed: 3,
                required: 3
            }
        );
        assert!(hold.complete);
        assert_eq!(hold.completed_on, Some(date(2026, 10, 1)));
    }

    #[test]
    fn test_nsw_safer_drivers_gate_at_threshold() {
        let mut learner = profile();
        learner.attest(TaskKind::SaferDriversCourse, Some(date(2026, 8, 1)));

        let below = tasks_for(Jurisdiction::Nsw, None, &learner, &totals(179999, 0));
        let safer = task(&below, TaskKind::SaferDriversCourse);
        assert!(!safer.available);
        assert!(!safer.complete);

        let at = tasks_for(Jurisdiction::Nsw, None, &learner, &totals(180000, 0));
        let safer = task(&at, TaskKind::SaferDriversCourse);
        assert!(safer.available);
        assert!(safer.complete);
        assert_eq!(safer.completed_on, Some(date(2026, 8, 1)));
    }

    #[test]
    fn test_bonus_credits_complete_at_cap() {
        let mut full = totals(0, 0);
        full.day_bonus_seconds = 50000;
        full.night_bonus_seconds = 22000;

        let tasks = tasks_for(Jurisdiction::Qld, None, &profile(), &full);
        let bonus = task(&tasks, TaskKind::BonusCredits);
        assert!(bonus.complete);
        assert_eq!(bonus.progress.fraction(), rust_decimal::Decimal::ONE);
    }

    #[test]
    fn test_wa_first_stage_has_no_hold() {
        let learner = LearnerProfile::new(date(2009, 2, 1));
        let tasks = tasks_for(Jurisdiction::Wa, Some(Stage::First), &learner, &totals(0, 0));

        assert!(task(&tasks, TaskKind::HoldDuration).complete);
        assert!(!task(&tasks, TaskKind::HazardPerceptionTest).available);

        let tasks = tasks_for(
            Jurisdiction::Wa,
            Some(Stage::First),
            &learner,
            &totals(60000, 30000),
        );
        assert!(task(&tasks, TaskKind::LogHours).complete);
        assert!(task(&tasks, TaskKind::HazardPerceptionTest).available);
    }

    #[test]
    fn test_tas_total_requirement_counts_day_and_night() {
        let tasks = tasks_for(
            Jurisdiction::Tas,
            Some(Stage::Second),
            &profile(),
            &totals(150000, 30000),
        );
        assert!(task(&tasks, TaskKind::LogHours).complete);
    }
}
