//! Cumulative logbook statistics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Jurisdiction, LightCondition, Road, Traffic, Trip, TripBreakdown, Weather};

/// Running totals folded from accumulated trips.
///
/// Statistics are tagged with the jurisdiction they were computed under;
/// totals from one jurisdiction are never comparable with another's.
/// Only the progress aggregator mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// The jurisdiction these totals were computed under.
    pub jurisdiction: Jurisdiction,
    /// Daytime seconds driven.
    pub day_seconds: i64,
    /// Night-time seconds driven.
    pub night_seconds: i64,
    /// Bonus seconds credited against daytime driving.
    pub day_bonus_seconds: i64,
    /// Bonus seconds credited against night-time driving.
    pub night_bonus_seconds: i64,
    /// Total distance driven.
    pub distance_km: Decimal,
    /// Number of trips folded in.
    pub trips_folded: u32,
    /// How many trips recorded each weather condition.
    #[serde(default)]
    pub weather_counts: BTreeMap<Weather, u32>,
    /// How many trips recorded each traffic condition.
    #[serde(default)]
    pub traffic_counts: BTreeMap<Traffic, u32>,
    /// How many trips recorded each road type.
    #[serde(default)]
    pub road_counts: BTreeMap<Road, u32>,
    /// How many trips passed through each light condition.
    #[serde(default)]
    pub light_counts: BTreeMap<LightCondition, u32>,
}

impl Statistics {
    /// Creates zeroed statistics for a jurisdiction.
    pub fn new(jurisdiction: Jurisdiction) -> Self {
        Self {
            jurisdiction,
            day_seconds: 0,
            night_seconds: 0,
            day_bonus_seconds: 0,
            night_bonus_seconds: 0,
            distance_km: Decimal::ZERO,
            trips_folded: 0,
            weather_counts: BTreeMap::new(),
            traffic_counts: BTreeMap::new(),
            road_counts: BTreeMap::new(),
            light_counts: BTreeMap::new(),
        }
    }

    /// Returns driven seconds, day plus night.
    pub fn logged_seconds(&self) -> i64 {
        self.day_seconds + self.night_seconds
    }

    /// Returns credited bonus seconds, day plus night.
    pub fn bonus_seconds(&self) -> i64 {
        self.day_bonus_seconds + self.night_bonus_seconds
    }

    /// Adds one trip's breakdown and condition flags to the totals.
    pub fn record(&mut self, trip: &Trip, breakdown: &TripBreakdown) {
        self.day_seconds += breakdown.day_seconds;
        self.night_seconds += breakdown.night_seconds;
        self.day_bonus_seconds += breakdown.day_bonus_seconds;
        self.night_bonus_seconds += breakdown.night_bonus_seconds;
        self.distance_km += trip.distance_km;
        self.trips_folded += 1;

        for weather in &trip.conditions.weather {
            *self.weather_counts.entry(*weather).or_insert(0) += 1;
        }
        for traffic in &trip.conditions.traffic {
            *self.traffic_counts.entry(*traffic).or_insert(0) += 1;
        }
        for road in &trip.conditions.road {
            *self.road_counts.entry(*road).or_insert(0) += 1;
        }
        for light in &breakdown.light {
            *self.light_counts.entry(*light).or_insert(0) += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conditions, Coordinate, Period};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn make_trip(conditions: Conditions) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            start_time: Utc.with_ymd_and_hms(2026, 1, 14, 21, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 1, 14, 22, 0, 0).unwrap(),
            time_zone: "Australia/Sydney".to_string(),
            start_location: Coordinate::new(-33.87, 151.21),
            odometer_start: Decimal::new(500, 0),
            distance_km: Decimal::new(42, 0),
            car_registration: "ABC123".to_string(),
            supervisor_id: "sup_001".to_string(),
            supervisor_accredited: true,
            conditions,
            accumulated: false,
        }
    }

    fn make_breakdown(trip: &Trip, day: i64, night: i64, day_bonus: i64) -> TripBreakdown {
        TripBreakdown {
            trip_id: trip.id,
            start_seconds: 8 * 3600,
            elapsed_seconds: day + night,
            day_seconds: day,
            night_seconds: night,
            day_bonus_seconds: day_bonus,
            night_bonus_seconds: 0,
            first_period: Period::Day,
            light: BTreeSet::from([LightCondition::Day]),
        }
    }

    #[test]
    fn test_new_statistics_are_zero() {
        let stats = Statistics::new(Jurisdiction::Qld);
        assert_eq!(stats.logged_seconds(), 0);
        assert_eq!(stats.bonus_seconds(), 0);
        assert_eq!(stats.trips_folded, 0);
        assert_eq!(stats.jurisdiction, Jurisdiction::Qld);
    }

    #[test]
    fn test_record_accumulates_seconds_and_distance() {
        let mut stats = Statistics::new(Jurisdiction::Nsw);
        let trip = make_trip(Conditions::default());
        stats.record(&trip, &make_breakdown(&trip, 3000, 600, 6000));
        stats.record(&trip, &make_breakdown(&trip, 1000, 0, 0));

        assert_eq!(stats.day_seconds, 4000);
        assert_eq!(stats.night_seconds, 600);
        assert_eq!(stats.day_bonus_seconds, 6000);
        assert_eq!(stats.logged_seconds(), 4600);
        assert_eq!(stats.distance_km, Decimal::new(84, 0));
        assert_eq!(stats.trips_folded, 2);
    }

    #[test]
    fn test_record_counts_conditions() {
        let mut stats = Statistics::new(Jurisdiction::Vic);
        let wet = make_trip(
            Conditions::default()
                .with_weather(Weather::Rain)
                .with_weather(Weather::Fog)
                .with_road(Road::Freeway),
        );
        let dry = make_trip(Conditions::default().with_weather(Weather::Clear));
        stats.record(&wet, &make_breakdown(&wet, 3600, 0, 0));
        stats.record(&dry, &make_breakdown(&dry, 3600, 0, 0));

        assert_eq!(stats.weather_counts[&Weather::Rain], 1);
        assert_eq!(stats.weather_counts[&Weather::Clear], 1);
        assert_eq!(stats.road_counts[&Road::Freeway], 1);
        assert_eq!(stats.light_counts[&LightCondition::Day], 2);
        assert!(!stats.traffic_counts.contains_key(&Traffic::Heavy));
    }

    #[test]
    fn test_statistics_serialize_condition_maps_with_string_keys() {
        let mut stats = Statistics::new(Jurisdiction::Sa);
        let trip = make_trip(Conditions::default().with_traffic(Traffic::Heavy));
        stats.record(&trip, &make_breakdown(&trip, 60, 0, 0));

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["traffic_counts"]["heavy"], 1);
        assert_eq!(json["jurisdiction"], "SA");
    }
}
