//! Learner profile and manual carry-over entries.
//!
//! This module contains the [`LearnerProfile`], which supplies the personal
//! facts the jurisdiction rules depend on, and [`ManualEntries`], the
//! carry-over minutes a learner enters once per jurisdiction.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Stage, TaskKind};

/// A learner's record of completing a user-attested task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Whether the learner marked the task complete.
    pub completed: bool,
    /// When the task was completed, if recorded.
    #[serde(default)]
    pub completed_on: Option<NaiveDate>,
}

/// Personal facts about the learner that drive the jurisdiction rules.
///
/// # Example
///
/// ```
/// use logbook_engine::models::{Attestation, LearnerProfile, TaskKind};
/// use chrono::NaiveDate;
///
/// let mut profile = LearnerProfile::new(NaiveDate::from_ymd_opt(2008, 5, 20).unwrap());
/// profile.attest(TaskKind::HazardPerceptionTest, NaiveDate::from_ymd_opt(2026, 3, 1));
///
/// let today = NaiveDate::from_ymd_opt(2026, 5, 19).unwrap();
/// assert_eq!(profile.age_on(today), 17);
/// assert!(profile.is_attested(TaskKind::HazardPerceptionTest));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    /// The learner's date of birth.
    pub birth_date: NaiveDate,
    /// The date the learner permit was issued.
    #[serde(default)]
    pub permit_received: Option<NaiveDate>,
    /// The current stage, for staged jurisdictions.
    #[serde(default)]
    pub stage: Option<Stage>,
    /// Completion records for user-attested tasks.
    #[serde(default)]
    pub attestations: BTreeMap<TaskKind, Attestation>,
}

impl LearnerProfile {
    /// Creates a profile with only a birth date.
    pub fn new(birth_date: NaiveDate) -> Self {
        Self {
            birth_date,
            permit_received: None,
            stage: None,
            attestations: BTreeMap::new(),
        }
    }

    /// Returns the learner's age in whole years on the given date.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.birth_date).unwrap_or(0)
    }

    /// Records completion of an attested task.
    pub fn attest(&mut self, kind: TaskKind, completed_on: Option<NaiveDate>) {
        self.attestations.insert(
            kind,
            Attestation {
                completed: true,
                completed_on,
            },
        );
    }

    /// Returns the attestation for a task, or an incomplete default.
    ///
    /// Computed tasks such as logged hours are never attested, so any
    /// record stored against one is ignored.
    pub fn attestation(&self, kind: TaskKind) -> Attestation {
        if !kind.is_attested() {
            return Attestation::default();
        }
        self.attestations.get(&kind).copied().unwrap_or_default()
    }

    /// Returns true if the learner marked the task complete.
    pub fn is_attested(&self, kind: TaskKind) -> bool {
        self.attestation(kind).completed
    }
}

/// Carry-over minutes entered by the learner for one jurisdiction.
///
/// Used as a baseline added to trip-derived totals. Bonus minutes are
/// expressed in final credited units and are capped by the jurisdiction's
/// bonus pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntries {
    /// Daytime minutes logged before using the engine.
    #[serde(default)]
    pub day_minutes: i64,
    /// Night-time minutes logged before using the engine.
    #[serde(default)]
    pub night_minutes: i64,
    /// Daytime bonus minutes already credited.
    #[serde(default)]
    pub day_bonus_minutes: Option<i64>,
    /// Night-time bonus minutes already credited.
    #[serde(default)]
    pub night_bonus_minutes: Option<i64>,
}

impl ManualEntries {
    /// Returns the daytime baseline in seconds.
    pub fn day_seconds(&self) -> i64 {
        self.day_minutes.max(0).saturating_mul(60)
    }

    /// Returns the night-time baseline in seconds.
    pub fn night_seconds(&self) -> i64 {
        self.night_minutes.max(0).saturating_mul(60)
    }

    /// Returns `(day_bonus, night_bonus)` seconds, capped to `cap_seconds`.
    ///
    /// The cap is applied to the day bonus first, then to the night bonus.
    ///
    /// ```
    /// use logbook_engine::models::ManualEntries;
    ///
    /// let entries = ManualEntries {
    ///     day_minutes: 600,
    ///     night_minutes: 120,
    ///     day_bonus_minutes: Some(1000),
    ///     night_bonus_minutes: Some(500),
    /// };
    /// assert_eq!(entries.capped_bonus_seconds(72000), (60000, 12000));
    /// ```
    pub fn capped_bonus_seconds(&self, cap_seconds: i64) -> (i64, i64) {
        let cap = cap_seconds.max(0);
        let minutes_to_seconds =
            |minutes: Option<i64>| minutes.unwrap_or(0).max(0).saturating_mul(60);
        let day = minutes_to_seconds(self.day_bonus_minutes).min(cap);
        let night = minutes_to_seconds(self.night_bonus_minutes).min(cap - day);
        (day, night)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let profile = LearnerProfile::new(date(2005, 6, 15));
        assert_eq!(profile.age_on(date(2026, 6, 14)), 20);
        assert_eq!(profile.age_on(date(2026, 6, 15)), 21);
    }

    #[test]
    fn test_age_before_birth_is_zero() {
        let profile = LearnerProfile::new(date(2030, 1, 1));
        assert_eq!(profile.age_on(date(2026, 1, 1)), 0);
    }

    #[test]
    fn test_unattested_task_defaults_to_incomplete() {
        let profile = LearnerProfile::new(date(2008, 1, 1));
        assert!(!profile.is_attested(TaskKind::DrivingTest));
        assert_eq!(profile.attestation(TaskKind::DrivingTest).completed_on, None);
    }

    #[test]
    fn test_computed_task_cannot_be_attested() {
        let mut profile = LearnerProfile::new(date(2008, 1, 1));
        profile.attest(TaskKind::LogHours, Some(date(2026, 1, 1)));
        profile.attest(TaskKind::DrivingAssessment, Some(date(2026, 1, 1)));

        assert!(!profile.is_attested(TaskKind::LogHours));
        assert_eq!(profile.attestation(TaskKind::LogHours).completed_on, None);
        assert!(profile.is_attested(TaskKind::DrivingAssessment));
    }

    #[test]
    fn test_extreme_minutes_saturate() {
        let entries = ManualEntries {
            day_minutes: i64::MAX,
            night_minutes: i64::MAX / 2,
            day_bonus_minutes: Some(i64::MAX),
            night_bonus_minutes: Some(i64::MAX),
        };
        assert_eq!(entries.day_seconds(), i64::MAX);
        assert_eq!(entries.night_seconds(), i64::MAX);
        assert_eq!(entries.capped_bonus_seconds(72000), (72000, 0));
    }

    #[test]
    fn test_manual_entries_convert_minutes() {
        let entries = ManualEntries {
            day_minutes: 90,
            night_minutes: 30,
            ..ManualEntries::default()
        };
        assert_eq!(entries.day_seconds(), 5400);
        assert_eq!(entries.night_seconds(), 1800);
    }

    #[test]
    fn test_bonus_with_zero_cap_is_zero() {
        let entries = ManualEntries {
            day_bonus_minutes: Some(60),
            night_bonus_minutes: Some(60),
            ..ManualEntries::default()
        };
        assert_eq!(entries.capped_bonus_seconds(0), (0, 0));
    }

    #[test]
    fn test_bonus_under_cap_is_unchanged() {
        let entries = ManualEntries {
            day_bonus_minutes: Some(60),
            night_bonus_minutes: None,
            ..ManualEntries::default()
        };
        assert_eq!(entries.capped_bonus_seconds(72000), (3600, 0));
    }

    #[test]
    fn test_profile_deserializes_attestation_map() {
        let json = r#"{
            "birth_date": "2008-05-20",
            "permit_received": "2025-07-01",
            "attestations": {
                "safer_drivers_course": { "completed": true, "completed_on": "2026-02-01" }
            }
        }"#;
        let profile: LearnerProfile = serde_json::from_str(json).unwrap();
        assert!(profile.is_attested(TaskKind::SaferDriversCourse));
        assert_eq!(profile.stage, None);
    }
}
