//! Trip model and related types.
//!
//! This module defines the [`Trip`] and [`Coordinate`] structs for
//! representing one supervised drive recorded by a learner.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::Conditions;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Represents a supervised drive.
///
/// Trips are immutable once finalized. The only field that changes after
/// recording is [`Trip::accumulated`], set once the trip's seconds have been
/// folded into cumulative statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique identifier for the trip.
    pub id: Uuid,
    /// The instant the trip started.
    pub start_time: DateTime<Utc>,
    /// The instant the trip ended.
    pub end_time: DateTime<Utc>,
    /// IANA time zone identifier in effect at the trip start.
    pub time_zone: String,
    /// Where the trip started.
    pub start_location: Coordinate,
    /// Odometer reading at the start of the trip, in kilometres.
    pub odometer_start: Decimal,
    /// Distance travelled, in kilometres.
    pub distance_km: Decimal,
    /// Registration of the car driven.
    pub car_registration: String,
    /// Reference to the supervising driver.
    pub supervisor_id: String,
    /// Whether the supervisor is an accredited driving instructor.
    #[serde(default)]
    pub supervisor_accredited: bool,
    /// Condition flags recorded for the trip.
    #[serde(default)]
    pub conditions: Conditions,
    /// Whether the trip has been folded into cumulative statistics.
    #[serde(default)]
    pub accumulated: bool,
}

impl Trip {
    /// Returns the elapsed duration of the trip in whole seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use logbook_engine::models::{Conditions, Coordinate, Trip};
    /// use chrono::{TimeZone, Utc};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let trip = Trip {
    ///     id: Uuid::new_v4(),
    ///     start_time: Utc.with_ymd_and_hms(2026, 1, 14, 21, 0, 0).unwrap(),
    ///     end_time: Utc.with_ymd_and_hms(2026, 1, 14, 23, 0, 0).unwrap(),
    ///     time_zone: "Australia/Melbourne".to_string(),
    ///     start_location: Coordinate::new(-37.81, 144.96),
    ///     odometer_start: Decimal::new(120000, 1),
    ///     distance_km: Decimal::new(455, 1),
    ///     car_registration: "1AB2CD".to_string(),
    ///     supervisor_id: "sup_001".to_string(),
    ///     supervisor_accredited: false,
    ///     conditions: Conditions::default(),
    ///     accumulated: false,
    /// };
    /// assert_eq!(trip.elapsed_seconds(), 7200);
    /// ```
    pub fn elapsed_seconds(&self) -> i64 {
        (self.end_time - self.start_time).num_seconds()
    }

    /// Resolves the trip's IANA time zone.
    pub fn zone(&self) -> EngineResult<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| EngineError::UnknownTimeZone {
                zone: self.time_zone.clone(),
            })
    }

    /// Returns the start instant in the trip's local time zone.
    pub fn local_start(&self) -> EngineResult<DateTime<Tz>> {
        Ok(self.start_time.with_timezone(&self.zone()?))
    }

    /// Returns the end instant in the trip's local time zone.
    pub fn local_end(&self) -> EngineResult<DateTime<Tz>> {
        Ok(self.end_time.with_timezone(&self.zone()?))
    }

    /// Returns the local calendar date the trip started on.
    pub fn local_date(&self) -> EngineResult<NaiveDate> {
        Ok(self.local_start()?.date_naive())
    }

    /// Returns the start instant as seconds since local midnight.
    pub fn start_seconds_from_midnight(&self) -> EngineResult<i64> {
        Ok(i64::from(self.local_start()?.time().num_seconds_from_midnight()))
    }

    /// Returns the odometer reading at the end of the trip.
    pub fn odometer_end(&self) -> Decimal {
        self.odometer_start + self.distance_km
    }

    /// Checks the ingestion-boundary invariants for a trip.
    ///
    /// A trip is well formed when its end is after its start, its time zone
    /// resolves, its car and supervisor references are present, its distance
    /// is not negative and its start coordinate is on the globe.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidTrip {
            trip_id: self.id,
            message: message.to_string(),
        };

        if self.end_time <= self.start_time {
            return Err(invalid("end time must be after start time"));
        }
        self.zone()?;
        if self.car_registration.trim().is_empty() {
            return Err(invalid("missing car reference"));
        }
        if self.supervisor_id.trim().is_empty() {
            return Err(invalid("missing supervisor reference"));
        }
        if self.distance_km.is_sign_negative() {
            return Err(invalid("distance cannot be negative"));
        }
        let Coordinate {
            latitude,
            longitude,
        } = self.start_location;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid("start coordinate is out of range"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_trip(start_hour: u32, end_hour: u32) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            // 2026-01-15 in Melbourne is AEDT (UTC+11)
            start_time: Utc.with_ymd_and_hms(2026, 1, 14, start_hour, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 1, 14, end_hour, 0, 0).unwrap(),
            time_zone: "Australia/Melbourne".to_string(),
            start_location: Coordinate::new(-37.81, 144.96),
            odometer_start: Decimal::new(1000, 0),
            distance_km: Decimal::new(255, 1),
            car_registration: "1AB2CD".to_string(),
            supervisor_id: "sup_001".to_string(),
            supervisor_accredited: false,
            conditions: Conditions::default(),
            accumulated: false,
        }
    }

    #[test]
    fn test_elapsed_seconds() {
        let trip = make_trip(21, 23);
        assert_eq!(trip.elapsed_seconds(), 7200);
    }

    #[test]
    fn test_start_seconds_from_midnight_uses_local_zone() {
        // 21:00 UTC is 08:00 AEDT the next day
        let trip = make_trip(21, 23);
        assert_eq!(trip.start_seconds_from_midnight().unwrap(), 8 * 3600);
        assert_eq!(
            trip.local_date().unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_odometer_end() {
        let trip = make_trip(21, 23);
        assert_eq!(trip.odometer_end(), Decimal::new(10255, 1));
    }

    #[test]
    fn test_validate_accepts_well_formed_trip() {
        assert!(make_trip(21, 23).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let trip = make_trip(23, 21);
        match trip.validate() {
            Err(EngineError::InvalidTrip { message, .. }) => {
                assert!(message.contains("after start"));
            }
            other => panic!("Expected InvalidTrip, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_length_trip() {
        assert!(make_trip(21, 21).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_zone() {
        let mut trip = make_trip(21, 23);
        trip.time_zone = "Australia/Atlantis".to_string();
        assert!(matches!(
            trip.validate(),
            Err(EngineError::UnknownTimeZone { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_supervisor() {
        let mut trip = make_trip(21, 23);
        trip.supervisor_id = "  ".to_string();
        assert!(trip.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_car() {
        let mut trip = make_trip(21, 23);
        trip.car_registration = String::new();
        assert!(trip.validate().is_err());
    }

    #[test]
    fn test_trip_deserialization_defaults() {
        let json = r#"{
            "id": "6f1c2b1e-8f43-4f0e-9a7e-3b0d2a4c5e61",
            "start_time": "2026-01-14T21:00:00Z",
            "end_time": "2026-01-14T23:00:00Z",
            "time_zone": "Australia/Melbourne",
            "start_location": { "latitude": -37.81, "longitude": 144.96 },
            "odometer_start": "1000",
            "distance_km": "25.5",
            "car_registration": "1AB2CD",
            "supervisor_id": "sup_001"
        }"#;

        let trip: Trip = serde_json::from_str(json).unwrap();
        assert!(!trip.accumulated);
        assert!(!trip.supervisor_accredited);
        assert!(trip.conditions.weather.is_empty());
        assert_eq!(trip.distance_km, Decimal::new(255, 1));
    }
}
