//! Licensing task view models.
//!
//! Tasks are derived, read-only views of one completion requirement. They
//! are rebuilt from statistics and jurisdiction rules on every evaluation
//! and never persisted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of requirement a task represents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Log the required supervised driving time.
    LogHours,
    /// Hold the permit for the required number of months.
    HoldDuration,
    /// Earn accredited-instructor bonus credit.
    BonusCredits,
    /// Complete the NSW Safer Drivers course.
    SaferDriversCourse,
    /// Pass the hazard perception test.
    HazardPerceptionTest,
    /// Pass a driving assessment.
    DrivingAssessment,
    /// Pass the practical driving test.
    DrivingTest,
}

impl TaskKind {
    /// Returns the display title for the task.
    pub fn title(&self) -> &'static str {
        match self {
            TaskKind::LogHours => "Log supervised driving hours",
            TaskKind::HoldDuration => "Hold learner permit",
            TaskKind::BonusCredits => "Accredited instructor bonus",
            TaskKind::SaferDriversCourse => "Safer Drivers course",
            TaskKind::HazardPerceptionTest => "Hazard perception test",
            TaskKind::DrivingAssessment => "Driving assessment",
            TaskKind::DrivingTest => "Driving test",
        }
    }

    /// Returns true if completion is attested by the learner rather than computed.
    pub fn is_attested(&self) -> bool {
        matches!(
            self,
            TaskKind::SaferDriversCourse
                | TaskKind::HazardPerceptionTest
                | TaskKind::DrivingAssessment
                | TaskKind::DrivingTest
        )
    }
}

/// How far along a task is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskProgress {
    /// Measured in credited seconds.
    Seconds {
        /// Seconds credited so far.
        current: i64,
        /// Seconds required.
        required: i64,
    },
    /// Measured in whole months elapsed.
    Months {
        /// Whole months elapsed so far.
        elapsed: u32,
        /// Months required.
        required: u32,
    },
    /// A yes/no requirement attested by the learner.
    Attested {
        /// Whether the learner has attested completion.
        attested: bool,
    },
}

impl TaskProgress {
    /// Returns the completed fraction in `[0, 1]`, rounded to four places.
    ///
    /// ```
    /// use logbook_engine::models::TaskProgress;
    /// use rust_decimal::Decimal;
    ///
    /// let progress = TaskProgress::Seconds { current: 90, required: 360 };
    /// assert_eq!(progress.fraction(), Decimal::new(25, 2));
    /// ```
    pub fn fraction(&self) -> Decimal {
        let (current, required) = match self {
            TaskProgress::Seconds { current, required } => (*current, *required),
            TaskProgress::Months { elapsed, required } => {
                (i64::from(*elapsed), i64::from(*required))
            }
            TaskProgress::Attested { attested } => (i64::from(*attested), 1),
        };
        if required <= 0 {
            return Decimal::ONE;
        }
        let fraction = Decimal::from(current.max(0)) / Decimal::from(required);
        fraction.min(Decimal::ONE).round_dp(4)
    }
}

/// One completion requirement for the active jurisdiction and stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// The kind of requirement.
    pub kind: TaskKind,
    /// Display title.
    pub title: String,
    /// Current progress.
    pub progress: TaskProgress,
    /// Whether the requirement is satisfied.
    pub complete: bool,
    /// Whether every prerequisite is satisfied, so the task can be attempted.
    pub available: bool,
    /// Tasks that must be complete before this one is available.
    pub prerequisites: Vec<TaskKind>,
    /// When the learner recorded completion, for attested tasks.
    pub completed_on: Option<NaiveDate>,
}
