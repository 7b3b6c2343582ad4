//! Sunrise, sunset and twilight boundaries.
//!
//! Boundaries are computed with the NOAA "Almanac for Computers" sunrise
//! equations at a chosen solar zenith, then converted to seconds since local
//! midnight in the trip's time zone. All times for a trip are taken from its
//! start date.

use std::fmt;

use chrono::{Datelike, NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditWarning, Coordinate};

use super::day_windows::SECONDS_PER_DAY;

/// Warning code recorded whenever a polar fallback replaces a boundary.
pub const POLAR_SOLAR_FALLBACK: &str = "POLAR_SOLAR_FALLBACK";

/// A solar depression band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Twilight {
    /// Sunrise and sunset, allowing for refraction and the solar disc.
    Official,
    /// Sun 6 degrees below the horizon.
    Civil,
    /// Sun 12 degrees below the horizon.
    Nautical,
    /// Sun 18 degrees below the horizon.
    Astronomical,
}

impl Twilight {
    /// Returns the solar zenith angle in degrees for this band.
    pub fn zenith(&self) -> f64 {
        match self {
            Twilight::Official => 90.833,
            Twilight::Civil => 96.0,
            Twilight::Nautical => 102.0,
            Twilight::Astronomical => 108.0,
        }
    }
}

impl fmt::Display for Twilight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Twilight::Official => write!(f, "official"),
            Twilight::Civil => write!(f, "civil"),
            Twilight::Nautical => write!(f, "nautical"),
            Twilight::Astronomical => write!(f, "astronomical"),
        }
    }
}

/// Why a boundary is undefined at a polar location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarCondition {
    /// The sun never drops below the band's angle on this date.
    AlwaysAboveHorizon,
    /// The sun never climbs above the band's angle on this date.
    AlwaysBelowHorizon,
}

impl fmt::Display for PolarCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolarCondition::AlwaysAboveHorizon => write!(f, "sun stays above the horizon angle"),
            PolarCondition::AlwaysBelowHorizon => write!(f, "sun stays below the horizon angle"),
        }
    }
}

/// Dawn and dusk for one band, in seconds since local midnight.
///
/// `dusk` may be earlier than `dawn` when the band's light interval wraps
/// past local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilightBounds {
    /// Seconds from local midnight to dawn.
    pub dawn: i64,
    /// Seconds from local midnight to dusk.
    pub dusk: i64,
}

impl TwilightBounds {
    /// Creates bounds from dawn and dusk offsets.
    pub fn new(dawn: i64, dusk: i64) -> Self {
        Self { dawn, dusk }
    }

    /// Returns the bounds used when the band is never crossed.
    ///
    /// A sun that stays above the angle lights the whole day; a sun that
    /// stays below it leaves an empty light interval at local noon.
    ///
    /// ```
    /// use logbook_engine::calculation::{PolarCondition, TwilightBounds};
    ///
    /// let bright = TwilightBounds::polar_fallback(PolarCondition::AlwaysAboveHorizon);
    /// assert_eq!((bright.dawn, bright.dusk), (0, 86400));
    ///
    /// let dark = TwilightBounds::polar_fallback(PolarCondition::AlwaysBelowHorizon);
    /// assert_eq!((dark.dawn, dark.dusk), (43200, 43200));
    /// ```
    pub fn polar_fallback(condition: PolarCondition) -> Self {
        match condition {
            PolarCondition::AlwaysAboveHorizon => Self::new(0, SECONDS_PER_DAY),
            PolarCondition::AlwaysBelowHorizon => {
                Self::new(SECONDS_PER_DAY / 2, SECONDS_PER_DAY / 2)
            }
        }
    }

    /// Returns true if the light interval wraps past local midnight.
    pub fn is_wrapped(&self) -> bool {
        self.dusk < self.dawn
    }

    /// Returns true if `seconds` falls in `[dawn, dusk)`.
    pub fn contains(&self, seconds: i64) -> bool {
        let seconds = seconds.rem_euclid(SECONDS_PER_DAY);
        if self.is_wrapped() {
            seconds >= self.dawn || seconds < self.dusk
        } else {
            seconds >= self.dawn && seconds < self.dusk
        }
    }
}

/// Computes dawn and dusk for one band.
///
/// # Arguments
///
/// * `date` - The local calendar date
/// * `coordinate` - Where the observer stands
/// * `zone` - The local time zone, used to convert UTC to local seconds
/// * `twilight` - Which band to compute
///
/// # Returns
///
/// The band's bounds, or `IndeterminateSolarEvent` if the sun never crosses
/// the band's angle on that date.
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::{Twilight, twilight_bounds};
/// use logbook_engine::models::Coordinate;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let melbourne = Coordinate::new(-37.81, 144.96);
/// let civil = twilight_bounds(date, melbourne, chrono_tz::Australia::Melbourne, Twilight::Civil).unwrap();
///
/// // Civil dawn is before 06:00 and civil dusk after 21:00 in midsummer.
/// assert!(civil.dawn < 6 * 3600);
/// assert!(civil.dusk > 21 * 3600);
/// ```
pub fn twilight_bounds(
    date: NaiveDate,
    coordinate: Coordinate,
    zone: Tz,
    twilight: Twilight,
) -> EngineResult<TwilightBounds> {
    let indeterminate = |condition| EngineError::IndeterminateSolarEvent {
        date,
        twilight,
        condition,
    };

    let offset = utc_offset_seconds(date, zone)?;
    let day_of_year = f64::from(date.ordinal());
    let zenith = twilight.zenith();

    let rising = event_utc_hours(day_of_year, coordinate, zenith, true).map_err(indeterminate)?;
    let setting = event_utc_hours(day_of_year, coordinate, zenith, false).map_err(indeterminate)?;

    Ok(TwilightBounds::new(
        to_local_seconds(rising, offset),
        to_local_seconds(setting, offset),
    ))
}

/// Sunrise, sunset and the three twilight bands for one date and place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTimes {
    /// The local date the times were computed for.
    pub date: NaiveDate,
    /// Sunrise and sunset.
    pub official: TwilightBounds,
    /// Civil dawn and dusk.
    pub civil: TwilightBounds,
    /// Nautical dawn and dusk.
    pub nautical: TwilightBounds,
    /// Astronomical dawn and dusk.
    pub astronomical: TwilightBounds,
}

/// Solar times together with any polar fallbacks applied.
#[derive(Debug, Clone)]
pub struct SolarTimesResult {
    /// The resolved solar times.
    pub times: SolarTimes,
    /// One warning per band that fell back.
    pub warnings: Vec<AuditWarning>,
}

impl SolarTimes {
    /// Computes every band, failing if any band is never crossed.
    pub fn compute(date: NaiveDate, coordinate: Coordinate, zone: Tz) -> EngineResult<Self> {
        Ok(Self {
            date,
            official: twilight_bounds(date, coordinate, zone, Twilight::Official)?,
            civil: twilight_bounds(date, coordinate, zone, Twilight::Civil)?,
            nautical: twilight_bounds(date, coordinate, zone, Twilight::Nautical)?,
            astronomical: twilight_bounds(date, coordinate, zone, Twilight::Astronomical)?,
        })
    }

    /// Computes every band, replacing undefined bands with the polar fallback.
    ///
    /// Each fallback is logged and reported as a `POLAR_SOLAR_FALLBACK`
    /// warning. Errors other than an undefined band are propagated.
    pub fn resolve(
        date: NaiveDate,
        coordinate: Coordinate,
        zone: Tz,
    ) -> EngineResult<SolarTimesResult> {
        let mut warnings = Vec::new();
        let mut band = |twilight: Twilight| -> EngineResult<TwilightBounds> {
            match twilight_bounds(date, coordinate, zone, twilight) {
                Ok(bounds) => Ok(bounds),
                Err(EngineError::IndeterminateSolarEvent { condition, .. }) => {
                    let bounds = TwilightBounds::polar_fallback(condition);
                    warn!(
                        %date,
                        %twilight,
                        ?condition,
                        latitude = coordinate.latitude,
                        longitude = coordinate.longitude,
                        "solar boundary undefined, using polar fallback"
                    );
                    warnings.push(AuditWarning {
                        code: POLAR_SOLAR_FALLBACK.to_string(),
                        message: format!(
                            "No {} dawn/dusk on {} at ({}, {}): {}; using dawn {}s, dusk {}s",
                            twilight,
                            date,
                            coordinate.latitude,
                            coordinate.longitude,
                            condition,
                            bounds.dawn,
                            bounds.dusk
                        ),
                        severity: "medium".to_string(),
                    });
                    Ok(bounds)
                }
                Err(other) => Err(other),
            }
        };

        let times = SolarTimes {
            date,
            official: band(Twilight::Official)?,
            civil: band(Twilight::Civil)?,
            nautical: band(Twilight::Nautical)?,
            astronomical: band(Twilight::Astronomical)?,
        };
        Ok(SolarTimesResult { times, warnings })
    }
}

/// Returns the zone's UTC offset at local noon on `date`, in seconds.
fn utc_offset_seconds(date: NaiveDate, zone: Tz) -> EngineResult<i64> {
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("cannot build local noon for {}", date),
        })?;
    let offset = zone
        .offset_from_local_datetime(&noon)
        .earliest()
        .unwrap_or_else(|| zone.offset_from_utc_datetime(&noon));
    Ok(i64::from(offset.fix().local_minus_utc()))
}

fn to_local_seconds(utc_hours: f64, offset_seconds: i64) -> i64 {
    ((utc_hours * 3600.0).round() as i64 + offset_seconds).rem_euclid(SECONDS_PER_DAY)
}

/// Returns the UTC hour of a rising or setting event, or why there is none.
fn event_utc_hours(
    day_of_year: f64,
    coordinate: Coordinate,
    zenith: f64,
    rising: bool,
) -> Result<f64, PolarCondition> {
    let lng_hour = coordinate.longitude / 15.0;
    let t = day_of_year + ((if rising { 6.0 } else { 18.0 }) - lng_hour) / 24.0;

    // Mean anomaly and true longitude
    let m = 0.9856 * t - 3.289;
    let l = normalize_degrees(
        m + 1.916 * sin_deg(m) + 0.020 * sin_deg(2.0 * m) + 282.634,
    );

    // Right ascension, in the same quadrant as L, in hours
    let mut ra = normalize_degrees(atan_deg(0.91764 * tan_deg(l)));
    ra += (l / 90.0).floor() * 90.0 - (ra / 90.0).floor() * 90.0;
    let ra = ra / 15.0;

    let sin_dec = 0.39782 * sin_deg(l);
    let cos_dec = sin_dec.asin().cos();

    let cos_h = (cos_deg(zenith) - sin_dec * sin_deg(coordinate.latitude))
        / (cos_dec * cos_deg(coordinate.latitude));
    if cos_h > 1.0 {
        return Err(PolarCondition::AlwaysBelowHorizon);
    }
    if cos_h < -1.0 {
        return Err(PolarCondition::AlwaysAboveHorizon);
    }

    let h = if rising {
        360.0 - cos_h.acos().to_degrees()
    } else {
        cos_h.acos().to_degrees()
    } / 15.0;

    let local_mean_time = h + ra - 0.06571 * t - 6.622;
    Ok((local_mean_time - lng_hour).rem_euclid(24.0))
}

fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

fn atan_deg(value: f64) -> f64 {
    value.atan().to_degrees()
}
