//! The jurisdiction rule table.
//!
//! [`RuleTable`] maps each [`Jurisdiction`] to its [`JurisdictionRules`]. It
//! can be built into the crate with [`RuleTable::builtin`] or loaded from
//! YAML through [`super::ConfigLoader`]; both paths validate the same way.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{Jurisdiction, TaskKind};

use super::types::{
    AgeBracket, BonusRule, HoldRule, HoursRequirement, JurisdictionRules, LicencePlan, Phase,
    RulesetMetadata, SaferDriversRule, TaskRule,
};

/// One hour, in seconds.
const HOUR: i64 = 3600;

/// Jurisdiction rules keyed by jurisdiction.
///
/// # Example
///
/// ```
/// use logbook_engine::config::RuleTable;
/// use logbook_engine::models::Jurisdiction;
///
/// let table = RuleTable::builtin();
/// let nsw = table.rules(Jurisdiction::Nsw).unwrap();
/// assert_eq!(nsw.bonus_cap_seconds(), 72000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    metadata: RulesetMetadata,
    rules: BTreeMap<Jurisdiction, JurisdictionRules>,
}

impl RuleTable {
    /// Creates a validated rule table.
    ///
    /// # Returns
    ///
    /// Returns the table on success, or an error if:
    /// - A jurisdiction has no entry (`JurisdictionNotConfigured`)
    /// - A jurisdiction appears twice, has the wrong plan shape, age
    ///   brackets that are empty, out of order or without an open final
    ///   bracket, or a prerequisite naming a task missing from the same
    ///   phase (`InvalidRuleTable`)
    pub fn new(metadata: RulesetMetadata, rules: Vec<JurisdictionRules>) -> EngineResult<Self> {
        let mut by_jurisdiction = BTreeMap::new();
        for rule in rules {
            let jurisdiction = rule.jurisdiction;
            validate_rules(&rule)?;
            if by_jurisdiction.insert(jurisdiction, rule).is_some() {
                return Err(EngineError::InvalidRuleTable {
                    jurisdiction,
                    message: "configured more than once".to_string(),
                });
            }
        }

        if let Some(missing) = Jurisdiction::ALL
            .into_iter()
            .find(|j| !by_jurisdiction.contains_key(j))
        {
            return Err(EngineError::JurisdictionNotConfigured {
                jurisdiction: missing,
            });
        }

        Ok(Self {
            metadata,
            rules: by_jurisdiction,
        })
    }

    /// Returns the compiled-in Australian rule table.
    pub fn builtin() -> Self {
        let rules = builtin_rules()
            .into_iter()
            .map(|r| (r.jurisdiction, r))
            .collect();
        Self {
            metadata: builtin_metadata(),
            rules,
        }
    }

    /// Returns the rule set metadata.
    pub fn metadata(&self) -> &RulesetMetadata {
        &self.metadata
    }

    /// Returns the rules for a jurisdiction.
    pub fn rules(&self, jurisdiction: Jurisdiction) -> EngineResult<&JurisdictionRules> {
        self.rules
            .get(&jurisdiction)
            .ok_or(EngineError::JurisdictionNotConfigured { jurisdiction })
    }

    /// Iterates over every configured jurisdiction's rules.
    pub fn iter(&self) -> impl Iterator<Item = &JurisdictionRules> {
        self.rules.values()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_rules(rules: &JurisdictionRules) -> EngineResult<()> {
    let invalid = |message: String| EngineError::InvalidRuleTable {
        jurisdiction: rules.jurisdiction,
        message,
    };

    let staged = matches!(rules.plan, LicencePlan::Staged { .. });
    if staged != rules.jurisdiction.is_staged() {
        return Err(invalid(format!(
            "expected a {} plan",
            if rules.jurisdiction.is_staged() {
                "staged"
            } else {
                "single"
            }
        )));
    }

    if let Some(bonus) = &rules.bonus
        && (bonus.cap_seconds < 0 || bonus.multiplier < 1)
    {
        return Err(invalid(
            "bonus cap must not be negative and multiplier must be at least 1".to_string(),
        ));
    }

    for phase in rules.phases() {
        if let HoldRule::ByAge { brackets } = &phase.hold {
            validate_brackets(brackets).map_err(|m| invalid(m.to_string()))?;
        }
        for task in &phase.tasks {
            if let Some(missing) = task
                .prerequisites
                .iter()
                .find(|p| phase.task(**p).is_none())
            {
                return Err(invalid(format!(
                    "task {:?} depends on {:?}, which is not part of the phase",
                    task.kind, missing
                )));
            }
        }
    }
    Ok(())
}

/// Brackets must ascend strictly by `max_age` and end in one open bracket.
fn validate_brackets(brackets: &[AgeBracket]) -> Result<(), &'static str> {
    let Some((last, closed)) = brackets.split_last() else {
        return Err("age-dependent hold has no brackets");
    };
    if last.max_age.is_some() {
        return Err("age-dependent hold must end in an open bracket");
    }

    let mut previous: Option<u32> = None;
    for bracket in closed {
        let Some(max) = bracket.max_age else {
            return Err("only the final age bracket may be open");
        };
        if previous.is_some_and(|p| max <= p) {
            return Err("age brackets must ascend strictly");
        }
        previous = Some(max);
    }
    Ok(())
}

fn builtin_metadata() -> RulesetMetadata {
    RulesetMetadata {
        name: "Australian learner driver requirements".to_string(),
        version: "2026-01-01".to_string(),
        source_url: "https://www.austroads.gov.au/drivers-and-vehicles/graduated-licensing"
            .to_string(),
    }
}

fn builtin_rules() -> Vec<JurisdictionRules> {
    use TaskKind::*;

    vec![
        JurisdictionRules {
            jurisdiction: Jurisdiction::Vic,
            bonus: None,
            plan: LicencePlan::Single {
                phase: Phase {
                    requirement: HoursRequirement::DayNight {
                        day_seconds: 110 * HOUR,
                        night_seconds: 10 * HOUR,
                    },
                    hold: HoldRule::ByAge {
                        brackets: vec![
                            AgeBracket {
                                max_age: Some(20),
                                months: 12,
                            },
                            AgeBracket {
                                max_age: Some(25),
                                months: 6,
                            },
                            AgeBracket {
                                max_age: None,
                                months: 3,
                            },
                        ],
                    },
                    tasks: vec![
                        TaskRule::new(LogHours, &[]),
                        TaskRule::new(HoldDuration, &[]),
                        TaskRule::new(HazardPerceptionTest, &[]),
                        TaskRule::new(DrivingTest, &[LogHours, HoldDuration, HazardPerceptionTest]),
                    ],
                },
            },
        },
        JurisdictionRules {
            jurisdiction: Jurisdiction::Nsw,
            bonus: Some(BonusRule {
                cap_seconds: 20 * HOUR,
                multiplier: 3,
                safer_drivers: Some(SaferDriversRule {
                    threshold_seconds: 50 * HOUR,
                    bonus_seconds: 20 * HOUR,
                }),
            }),
            plan: LicencePlan::Single {
                phase: Phase {
                    requirement: HoursRequirement::DayNight {
                        day_seconds: 100 * HOUR,
                        night_seconds: 20 * HOUR,
                    },
                    hold: HoldRule::Fixed { months: 12 },
                    tasks: vec![
                        TaskRule::new(LogHours, &[]),
                        TaskRule::new(HoldDuration, &[]),
                        TaskRule::new(BonusCredits, &[]),
                        TaskRule::new(SaferDriversCourse, &[]),
                        TaskRule::new(HazardPerceptionTest, &[]),
                        TaskRule::new(DrivingTest, &[LogHours, HoldDuration, HazardPerceptionTest]),
                    ],
                },
            },
        },
        JurisdictionRules {
            jurisdiction: Jurisdiction::Qld,
            bonus: Some(BonusRule {
                cap_seconds: 20 * HOUR,
                multiplier: 3,
                safer_drivers: None,
            }),
            plan: LicencePlan::Single {
                phase: Phase {
                    requirement: HoursRequirement::DayNight {
                        day_seconds: 90 * HOUR,
                        night_seconds: 10 * HOUR,
                    },
                    hold: HoldRule::Fixed { months: 12 },
                    tasks: vec![
                        TaskRule::new(LogHours, &[]),
                        TaskRule::new(HoldDuration, &[]),
                        TaskRule::new(BonusCredits, &[]),
                        TaskRule::new(DrivingTest, &[LogHours, HoldDuration]),
                    ],
                },
            },
        },
        JurisdictionRules {
            jurisdiction: Jurisdiction::Sa,
            bonus: None,
            plan: LicencePlan::Single {
                phase: Phase {
                    requirement: HoursRequirement::DayNight {
                        day_seconds: 60 * HOUR,
                        night_seconds: 15 * HOUR,
                    },
                    hold: HoldRule::ByAge {
                        brackets: vec![
                            AgeBracket {
                                max_age: Some(24),
                                months: 12,
                            },
                            AgeBracket {
                                max_age: None,
                                months: 6,
                            },
                        ],
                    },
                    tasks: vec![
                        TaskRule::new(LogHours, &[]),
                        TaskRule::new(HoldDuration, &[]),
                        TaskRule::new(HazardPerceptionTest, &[]),
                        TaskRule::new(
                            DrivingAssessment,
                            &[LogHours, HoldDuration, HazardPerceptionTest],
                        ),
                    ],
                },
            },
        },
        JurisdictionRules {
            jurisdiction: Jurisdiction::Tas,
            bonus: None,
            plan: LicencePlan::Staged {
                first: staged_phase(30 * HOUR, 3, DrivingAssessment, &[LogHours, HoldDuration]),
                second: staged_phase(50 * HOUR, 9, DrivingAssessment, &[LogHours, HoldDuration]),
            },
        },
        JurisdictionRules {
            jurisdiction: Jurisdiction::Wa,
            bonus: None,
            plan: LicencePlan::Staged {
                first: staged_phase(25 * HOUR, 0, HazardPerceptionTest, &[LogHours]),
                second: staged_phase(25 * HOUR, 6, DrivingAssessment, &[LogHours, HoldDuration]),
            },
        },
    ]
}

fn staged_phase(
    seconds: i64,
    hold_months: u32,
    assessment: TaskKind,
    prerequisites: &[TaskKind],
) -> Phase {
    Phase {
        requirement: HoursRequirement::Total { seconds },
        hold: HoldRule::Fixed {
            months: hold_months,
        },
        tasks: vec![
            TaskRule::new(TaskKind::LogHours, &[]),
            TaskRule::new(TaskKind::HoldDuration, &[]),
            TaskRule::new(assessment, prerequisites),
        ],
    }
}
