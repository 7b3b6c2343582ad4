//! Accredited-instructor bonus allocation.
//!
//! Trips supervised by an accredited driving instructor earn extra credit
//! in jurisdictions with a bonus rule. Credit is drawn from a capped pool,
//! trip by trip in chronological order, crediting whichever period (day or
//! night) the trip started in first. The order is significant: once the pool
//! runs out, whichever period comes second receives nothing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BonusRule;
use crate::models::{AuditStep, Jurisdiction, Period};

use super::apportionment::Apportionment;
use super::solar::TwilightBounds;

/// Returns the period a trip started in.
///
/// A start in `[dawn, dusk)` is daytime; anything else is night-time.
///
/// ```
/// use logbook_engine::calculation::{TwilightBounds, first_period};
/// use logbook_engine::models::Period;
///
/// let bounds = TwilightBounds::new(6 * 3600, 18 * 3600);
/// assert_eq!(first_period(17 * 3600, bounds), Period::Day);
/// assert_eq!(first_period(18 * 3600, bounds), Period::Night);
/// ```
pub fn first_period(start_seconds: i64, bounds: TwilightBounds) -> Period {
    if bounds.contains(start_seconds) {
        Period::Day
    } else {
        Period::Night
    }
}

/// Bonus seconds credited to one trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusCredit {
    /// Bonus credited against daytime seconds.
    pub day_bonus_seconds: i64,
    /// Bonus credited against night-time seconds.
    pub night_bonus_seconds: i64,
}

impl BonusCredit {
    /// Returns the total bonus credited.
    pub fn total_seconds(&self) -> i64 {
        self.day_bonus_seconds + self.night_bonus_seconds
    }
}

/// The remaining bonus pool for a jurisdiction.
///
/// Existing bonus (already expressed in final credited units) is deducted
/// from the cap when the pool is opened.
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::{Apportionment, BonusPool};
/// use logbook_engine::models::Period;
///
/// let mut pool = BonusPool::new(100, 3, 0, 0);
/// let split = Apportionment { day_seconds: 50, night_seconds: 50 };
///
/// let credit = pool.allocate(true, split, Period::Day);
/// assert_eq!(credit.day_bonus_seconds, 100);
/// assert_eq!(credit.night_bonus_seconds, 0);
/// assert_eq!(pool.remaining_seconds(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusPool {
    remaining_seconds: i64,
    multiplier: i64,
}

impl BonusPool {
    /// Opens a pool with `cap − existing_day − existing_night` remaining, floored at zero.
    pub fn new(
        cap_seconds: i64,
        multiplier: i64,
        existing_day_bonus: i64,
        existing_night_bonus: i64,
    ) -> Self {
        Self {
            remaining_seconds: (cap_seconds - existing_day_bonus - existing_night_bonus).max(0),
            multiplier,
        }
    }

    /// Opens a pool from a jurisdiction's bonus rule.
    pub fn from_rule(rule: &BonusRule, existing_day_bonus: i64, existing_night_bonus: i64) -> Self {
        Self::new(
            rule.cap_seconds,
            rule.multiplier,
            existing_day_bonus,
            existing_night_bonus,
        )
    }

    /// Returns the seconds still available.
    pub fn remaining_seconds(&self) -> i64 {
        self.remaining_seconds
    }

    /// Returns true if no further bonus can be credited.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_seconds <= 0
    }

    /// Credits one trip against the pool.
    ///
    /// Nothing is credited unless the supervisor is accredited and the pool
    /// has seconds left. Otherwise the first period is credited
    /// `min(remaining, seconds × (multiplier − 1))`, the pool is reduced, and
    /// the other period is credited the same way.
    pub fn allocate(
        &mut self,
        supervisor_accredited: bool,
        apportionment: Apportionment,
        first: Period,
    ) -> BonusCredit {
        let mut credit = BonusCredit::default();
        if !supervisor_accredited || self.is_exhausted() {
            return credit;
        }

        let order = match first {
            Period::Day => [Period::Day, Period::Night],
            Period::Night => [Period::Night, Period::Day],
        };
        let extra = (self.multiplier - 1).max(0);

        for period in order {
            let seconds = match period {
                Period::Day => apportionment.day_seconds,
                Period::Night => apportionment.night_seconds,
            };
            let credited = self.remaining_seconds.min(seconds * extra).max(0);
            self.remaining_seconds -= credited;
            match period {
                Period::Day => credit.day_bonus_seconds = credited,
                Period::Night => credit.night_bonus_seconds = credited,
            }
        }

        credit
    }
}

/// One trip's input to sequence allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusInput {
    /// Whether the trip's supervisor is accredited.
    pub supervisor_accredited: bool,
    /// The trip's day/night split.
    pub apportionment: Apportionment,
    /// Which period the trip started in.
    pub first_period: Period,
}

/// Allocates bonus across trips already sorted by start time.
///
/// # Returns
///
/// One credit per input, in the same order.
pub fn allocate_bonuses(pool: &mut BonusPool, trips: &[BonusInput]) -> Vec<BonusCredit> {
    trips
        .iter()
        .map(|t| pool.allocate(t.supervisor_accredited, t.apportionment, t.first_period))
        .collect()
}

/// The result of allocating bonus to one trip, including the audit step.
#[derive(Debug, Clone)]
pub struct BonusAllocationResult {
    /// The bonus credited.
    pub credit: BonusCredit,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Allocates bonus to one trip and records the decision.
///
/// # Arguments
///
/// * `pool` - The jurisdiction's pool, or `None` where no bonus applies
/// * `trip_id` - The trip being credited
/// * `input` - The trip's accreditation flag, split and first period
/// * `jurisdiction` - The active jurisdiction
/// * `step_number` - The step number for audit trail sequencing
pub fn allocate_trip_bonus(
    pool: Option<&mut BonusPool>,
    trip_id: Uuid,
    input: BonusInput,
    jurisdiction: Jurisdiction,
    step_number: u32,
) -> BonusAllocationResult {
    let Some(pool) = pool else {
        return BonusAllocationResult {
            credit: BonusCredit::default(),
            audit_step: AuditStep {
                step_number,
                rule_id: "bonus_allocation".to_string(),
                rule_name: "Accredited Instructor Bonus".to_string(),
                jurisdiction,
                input: serde_json::json!({
                    "trip_id": trip_id.to_string(),
                    "supervisor_accredited": input.supervisor_accredited
                }),
                output: serde_json::json!({
                    "eligible": false,
                    "day_bonus_seconds": 0,
                    "night_bonus_seconds": 0
                }),
                reasoning: format!("{} does not award accredited instructor bonus", jurisdiction),
            },
        };
    };

    let remaining_before = pool.remaining_seconds();
    let credit = pool.allocate(input.supervisor_accredited, input.apportionment, input.first_period);

    let reasoning = if !input.supervisor_accredited {
        "Supervisor is not accredited - no bonus".to_string()
    } else if remaining_before == 0 {
        "Bonus pool exhausted - no bonus".to_string()
    } else {
        format!(
            "{:?} first: day {}s → {}s bonus, night {}s → {}s bonus ({}s of {}s pool remaining)",
            input.first_period,
            input.apportionment.day_seconds,
            credit.day_bonus_seconds,
            input.apportionment.night_seconds,
            credit.night_bonus_seconds,
            pool.remaining_seconds(),
            remaining_before
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "bonus_allocation".to_string(),
        rule_name: "Accredited Instructor Bonus".to_string(),
        jurisdiction,
        input: serde_json::json!({
            "trip_id": trip_id.to_string(),
            "supervisor_accredited": input.supervisor_accredited,
            "day_seconds": input.apportionment.day_seconds,
            "night_seconds": input.apportionment.night_seconds,
            "first_period": input.first_period,
            "pool_remaining_seconds": remaining_before
        }),
        output: serde_json::json!({
            "eligible": true,
            "day_bonus_seconds": credit.day_bonus_seconds,
            "night_bonus_seconds": credit.night_bonus_seconds,
            "pool_remaining_seconds": pool.remaining_seconds()
        }),
        reasoning,
    };

    BonusAllocationResult { credit, audit_step }
}
