//! Light condition classification.
//!
//! A trip is measured against five light bands built from the civil and
//! astronomical twilight bounds: late night, dawn, day, dusk and early
//! night. The result is used for logbook light codes and statistics.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::LightCondition;

use super::day_windows::{SECONDS_PER_DAY, day_windows};
use super::solar::TwilightBounds;

/// Seconds a trip spent in each light band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightBands {
    /// Midnight to astronomical dawn.
    pub late_night: i64,
    /// Astronomical dawn to civil dawn.
    pub dawn: i64,
    /// Civil dawn to civil dusk.
    pub day: i64,
    /// Civil dusk to astronomical dusk.
    pub dusk: i64,
    /// Astronomical dusk to midnight.
    pub early_night: i64,
}

/// The outcome of classifying a trip's light conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightClassification {
    /// Seconds per band.
    pub bands: LightBands,
    /// Conditions with a non-zero overlap.
    pub conditions: BTreeSet<LightCondition>,
}

/// Classifies a trip against the five light bands.
///
/// Each day window is intersected with every band; a band whose bounds are
/// inverted (for example after a polar fallback) contributes nothing. Night
/// is flagged when either night band has a non-zero overlap.
///
/// # Arguments
///
/// * `start_seconds` - Trip start as seconds since local midnight
/// * `elapsed_seconds` - Trip duration in seconds
/// * `civil` - Civil dawn and dusk for the trip's start date
/// * `astronomical` - Astronomical dawn and dusk for the trip's start date
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::{TwilightBounds, classify_light};
/// use logbook_engine::models::LightCondition;
///
/// let civil = TwilightBounds::new(6 * 3600, 19 * 3600);
/// let astronomical = TwilightBounds::new(5 * 3600, 20 * 3600);
///
/// // 18:30 to 21:00 runs from day through dusk into night
/// let result = classify_light(18 * 3600 + 1800, 9000, civil, astronomical);
/// assert_eq!(result.bands.day, 1800);
/// assert_eq!(result.bands.dusk, 3600);
/// assert_eq!(result.bands.early_night, 3600);
/// assert!(result.conditions.contains(&LightCondition::Night));
/// ```
pub fn classify_light(
    start_seconds: i64,
    elapsed_seconds: i64,
    civil: TwilightBounds,
    astronomical: TwilightBounds,
) -> LightClassification {
    let mut bands = LightBands::default();

    for window in day_windows(start_seconds, elapsed_seconds) {
        bands.late_night += window.overlap(0, astronomical.dawn);
        bands.dawn += window.overlap(astronomical.dawn, civil.dawn);
        bands.day += window.overlap(civil.dawn, civil.dusk);
        bands.dusk += window.overlap(civil.dusk, astronomical.dusk);
        bands.early_night += window.overlap(astronomical.dusk, SECONDS_PER_DAY);
    }

    let mut conditions = BTreeSet::new();
    if bands.dawn > 0 {
        conditions.insert(LightCondition::Dawn);
    }
    if bands.day > 0 {
        conditions.insert(LightCondition::Day);
    }
    if bands.dusk > 0 {
        conditions.insert(LightCondition::Dusk);
    }
    if bands.late_night > 0 || bands.early_night > 0 {
        conditions.insert(LightCondition::Night);
    }

    LightClassification { bands, conditions }
}
