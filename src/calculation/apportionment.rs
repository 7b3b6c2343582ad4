//! Day/night apportionment of a trip's elapsed time.
//!
//! This module splits a trip into daytime seconds (between civil dawn and
//! civil dusk) and night-time seconds, one local calendar day at a time.
//! Every day of a multi-day trip reuses the start date's solar times.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{AuditStep, Jurisdiction, Period, Trip};

use super::bonus::first_period;
use super::day_windows::{SECONDS_PER_DAY, day_windows};
use super::light_condition::{LightClassification, classify_light};
use super::solar::{SolarTimes, TwilightBounds};

/// Daytime and night-time seconds of a trip.
///
/// `day_seconds + night_seconds` always equals the trip's elapsed seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Apportionment {
    /// Seconds between civil dawn and civil dusk.
    pub day_seconds: i64,
    /// Seconds outside civil dawn and civil dusk.
    pub night_seconds: i64,
}

impl Apportionment {
    /// Returns the total seconds apportioned.
    pub fn total_seconds(&self) -> i64 {
        self.day_seconds + self.night_seconds
    }
}

/// Splits a span into day and night seconds.
///
/// For each local day window, day seconds are the overlap with
/// `[dawn, dusk]` and night seconds the overlap with `[0, dawn]` and
/// `[dusk, 86400]`. When dusk falls before dawn the light interval wraps
/// midnight, so day is `[0, dusk] ∪ [dawn, 86400]` and night `[dusk, dawn]`.
///
/// # Arguments
///
/// * `start_seconds` - Trip start as seconds since local midnight
/// * `elapsed_seconds` - Trip duration in seconds, greater than zero
/// * `bounds` - Civil dawn and dusk for the trip's start date
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::{TwilightBounds, apportion};
///
/// let bounds = TwilightBounds::new(6 * 3600 + 1800, 18 * 3600);
///
/// // 17:00 to 19:00 straddles dusk
/// let split = apportion(17 * 3600, 7200, bounds);
/// assert_eq!(split.day_seconds, 3600);
/// assert_eq!(split.night_seconds, 3600);
/// ```
pub fn apportion(start_seconds: i64, elapsed_seconds: i64, bounds: TwilightBounds) -> Apportionment {
    let mut result = Apportionment::default();

    for window in day_windows(start_seconds, elapsed_seconds) {
        if bounds.is_wrapped() {
            result.day_seconds +=
                window.overlap(0, bounds.dusk) + window.overlap(bounds.dawn, SECONDS_PER_DAY);
            result.night_seconds += window.overlap(bounds.dusk, bounds.dawn);
        } else {
            result.day_seconds += window.overlap(bounds.dawn, bounds.dusk);
            result.night_seconds +=
                window.overlap(0, bounds.dawn) + window.overlap(bounds.dusk, SECONDS_PER_DAY);
        }
    }

    result
}

/// The full time-of-day analysis of one trip.
#[derive(Debug, Clone)]
pub struct TripApportionmentResult {
    /// Trip start as seconds since local midnight.
    pub start_seconds: i64,
    /// Day and night seconds.
    pub apportionment: Apportionment,
    /// Which period the trip started in.
    pub first_period: Period,
    /// Light bands and conditions.
    pub light: LightClassification,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Apportions a trip and classifies its light conditions.
///
/// # Arguments
///
/// * `trip` - A validated trip
/// * `solar` - Solar times for the trip's start date and location
/// * `jurisdiction` - The active jurisdiction, recorded in the audit step
/// * `step_number` - The step number for audit trail sequencing
pub fn apportion_trip(
    trip: &Trip,
    solar: &SolarTimes,
    jurisdiction: Jurisdiction,
    step_number: u32,
) -> EngineResult<TripApportionmentResult> {
    let start_seconds = trip.start_seconds_from_midnight()?;
    let elapsed = trip.elapsed_seconds();

    let apportionment = apportion(start_seconds, elapsed, solar.civil);
    let first_period = first_period(start_seconds, solar.civil);
    let light = classify_light(start_seconds, elapsed, solar.civil, solar.astronomical);

    let reasoning = format!(
        "{}s trip starting {}s after local midnight on {}: {}s between civil dawn ({}s) and civil dusk ({}s), {}s outside; starts in {:?}",
        elapsed,
        start_seconds,
        solar.date,
        apportionment.day_seconds,
        solar.civil.dawn,
        solar.civil.dusk,
        apportionment.night_seconds,
        first_period
    );

    let audit_step = AuditStep {
        step_number,
        rule_id: "trip_apportionment".to_string(),
        rule_name: "Trip Day/Night Apportionment".to_string(),
        jurisdiction,
        input: serde_json::json!({
            "trip_id": trip.id.to_string(),
            "local_date": solar.date.to_string(),
            "start_seconds": start_seconds,
            "elapsed_seconds": elapsed,
            "civil_dawn": solar.civil.dawn,
            "civil_dusk": solar.civil.dusk,
            "astronomical_dawn": solar.astronomical.dawn,
            "astronomical_dusk": solar.astronomical.dusk
        }),
        output: serde_json::json!({
            "day_seconds": apportionment.day_seconds,
            "night_seconds": apportionment.night_seconds,
            "first_period": first_period,
            "light": light.conditions
        }),
        reasoning,
    };

    Ok(TripApportionmentResult {
        start_seconds,
        apportionment,
        first_period,
        light,
        audit_step,
    })
}
