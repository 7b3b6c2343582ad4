//! Configuration types for jurisdiction rules.
//!
//! This module contains the strongly-typed rule structures that are
//! deserialized from YAML configuration files or built into the crate.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Jurisdiction, Stage, TaskKind};

/// Metadata about the rule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetMetadata {
    /// The human-readable name of the rule set.
    pub name: String,
    /// The version or effective date of the rules.
    pub version: String,
    /// URL to the authority publishing the rules.
    pub source_url: String,
}

/// Jurisdictions configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionsConfig {
    /// One entry per jurisdiction.
    pub jurisdictions: Vec<JurisdictionRules>,
}

/// The complete rules for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRules {
    /// The jurisdiction these rules apply to.
    pub jurisdiction: Jurisdiction,
    /// Accredited-instructor bonus rules, where the jurisdiction awards a bonus.
    #[serde(default)]
    pub bonus: Option<BonusRule>,
    /// The licensing phases a learner passes through.
    pub plan: LicencePlan,
}

impl JurisdictionRules {
    /// Returns the phase that applies to a learner at the given stage.
    ///
    /// Staged jurisdictions require a stage; single-phase jurisdictions
    /// reject one.
    ///
    /// # Example
    ///
    /// ```
    /// use logbook_engine::config::RuleTable;
    /// use logbook_engine::models::{Jurisdiction, Stage};
    ///
    /// let table = RuleTable::builtin();
    /// let tas = table.rules(Jurisdiction::Tas).unwrap();
    /// assert_eq!(tas.phase(Some(Stage::Second)).unwrap().requirement.required_seconds(), 180000);
    /// assert!(tas.phase(None).is_err());
    /// ```
    pub fn phase(&self, stage: Option<Stage>) -> EngineResult<&Phase> {
        match (&self.plan, stage) {
            (LicencePlan::Single { phase }, None) => Ok(phase),
            (LicencePlan::Single { .. }, Some(stage)) => Err(EngineError::StageNotApplicable {
                jurisdiction: self.jurisdiction,
                stage,
            }),
            (LicencePlan::Staged { .. }, None) => Err(EngineError::StageRequired {
                jurisdiction: self.jurisdiction,
            }),
            (LicencePlan::Staged { first, .. }, Some(Stage::First)) => Ok(first),
            (LicencePlan::Staged { second, .. }, Some(Stage::Second)) => Ok(second),
        }
    }

    /// Returns the bonus pool cap in seconds, or zero without a bonus.
    pub fn bonus_cap_seconds(&self) -> i64 {
        self.bonus.as_ref().map_or(0, |b| b.cap_seconds)
    }

    /// Returns the Safer Drivers rule, if the jurisdiction has one.
    pub fn safer_drivers(&self) -> Option<&SaferDriversRule> {
        self.bonus.as_ref().and_then(|b| b.safer_drivers.as_ref())
    }

    /// Returns every phase of the plan, in order.
    pub fn phases(&self) -> Vec<&Phase> {
        match &self.plan {
            LicencePlan::Single { phase } => vec![phase],
            LicencePlan::Staged { first, second } => vec![first, second],
        }
    }
}

/// Accredited-instructor bonus rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRule {
    /// The maximum bonus seconds a learner can be credited.
    pub cap_seconds: i64,
    /// Effective credit ratio for accredited supervision.
    pub multiplier: i64,
    /// Flat course bonus credited on top of the pool.
    #[serde(default)]
    pub safer_drivers: Option<SaferDriversRule>,
}

/// The NSW Safer Drivers course bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaferDriversRule {
    /// Logged plus bonus seconds required before the course counts.
    pub threshold_seconds: i64,
    /// Flat bonus credited once the course counts.
    pub bonus_seconds: i64,
}

/// The licensing phases of a jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LicencePlan {
    /// One learner period.
    Single {
        /// The only phase.
        phase: Phase,
    },
    /// Two sequential learner periods (TAS L1/L2, WA S1/S2).
    Staged {
        /// The first stage.
        first: Phase,
        /// The second stage.
        second: Phase,
    },
}

/// Requirements for one learner period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Supervised driving time required.
    pub requirement: HoursRequirement,
    /// Minimum permit hold duration.
    pub hold: HoldRule,
    /// Tasks shown to the learner, in display order.
    pub tasks: Vec<TaskRule>,
}

impl Phase {
    /// Returns the rule for a task kind, if the phase has one.
    pub fn task(&self, kind: TaskKind) -> Option<&TaskRule> {
        self.tasks.iter().find(|t| t.kind == kind)
    }
}

/// Supervised driving time required in a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HoursRequirement {
    /// Separate day and night requirements.
    DayNight {
        /// Required daytime seconds.
        day_seconds: i64,
        /// Required night-time seconds.
        night_seconds: i64,
    },
    /// A single combined requirement.
    Total {
        /// Required seconds.
        seconds: i64,
    },
}

impl HoursRequirement {
    /// Returns the total seconds required.
    ///
    /// ```
    /// use logbook_engine::config::HoursRequirement;
    ///
    /// let req = HoursRequirement::DayNight { day_seconds: 396000, night_seconds: 36000 };
    /// assert_eq!(req.required_seconds(), 432000);
    /// ```
    pub fn required_seconds(&self) -> i64 {
        match self {
            HoursRequirement::DayNight {
                day_seconds,
                night_seconds,
            } => day_seconds + night_seconds,
            HoursRequirement::Total { seconds } => *seconds,
        }
    }

    /// Returns the night-time seconds required, zero for a combined total.
    pub fn night_seconds(&self) -> i64 {
        match self {
            HoursRequirement::DayNight { night_seconds, .. } => *night_seconds,
            HoursRequirement::Total { .. } => 0,
        }
    }
}

/// Minimum permit hold duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HoldRule {
    /// The same duration for every learner.
    Fixed {
        /// Required months.
        months: u32,
    },
    /// A duration chosen by the learner's age.
    ByAge {
        /// Brackets in strictly ascending age order, ending in an open
        /// bracket; the first match wins.
        brackets: Vec<AgeBracket>,
    },
}

impl HoldRule {
    /// Returns the months required for a learner of the given age.
    ///
    /// A validated rule table always ends its brackets with an open one, so
    /// every age matches. An age past the last closed bracket of an
    /// unvalidated rule gets zero months.
    ///
    /// ```
    /// use logbook_engine::config::{AgeBracket, HoldRule};
    ///
    /// let rule = HoldRule::ByAge {
    ///     brackets: vec![
    ///         AgeBracket { max_age: Some(24), months: 12 },
    ///         AgeBracket { max_age: None, months: 6 },
    ///     ],
    /// };
    /// assert_eq!(rule.months_for_age(24), 12);
    /// assert_eq!(rule.months_for_age(25), 6);
    /// ```
    pub fn months_for_age(&self, age: u32) -> u32 {
        match self {
            HoldRule::Fixed { months } => *months,
            HoldRule::ByAge { brackets } => brackets
                .iter()
                .find(|b| b.max_age.is_none_or(|max| age <= max))
                .map_or(0, |b| b.months),
        }
    }
}

/// One age bracket of an age-dependent hold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBracket {
    /// Inclusive upper age bound; `None` for the open final bracket.
    #[serde(default)]
    pub max_age: Option<u32>,
    /// Required months for learners in this bracket.
    pub months: u32,
}

/// A task shown for a phase and the tasks it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRule {
    /// The kind of task.
    pub kind: TaskKind,
    /// Tasks that must be complete before this one is available.
    #[serde(default)]
    pub prerequisites: Vec<TaskKind>,
}

impl TaskRule {
    /// Creates a task rule with prerequisites.
    pub fn new(kind: TaskKind, prerequisites: &[TaskKind]) -> Self {
        Self {
            kind,
            prerequisites: prerequisites.to_vec(),
        }
    }
}
