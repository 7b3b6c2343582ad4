//! Trip data source.
//!
//! The engine reads trips through the [`TripStore`] trait and writes back
//! only the accumulated flag. [`InMemoryTripStore`] is a simple
//! implementation used by tests, benchmarks and embedding applications
//! that keep trips in memory.

use crate::error::{EngineError, EngineResult};
use crate::models::Trip;
use uuid::Uuid;

/// A source of recorded trips.
///
/// Implementations return trips ordered by start time.
pub trait TripStore {
    /// Returns every trip not yet folded into statistics.
    fn pending_trips(&self) -> Vec<Trip>;

    /// Returns every trip, accumulated or not.
    fn trips(&self) -> Vec<Trip>;

    /// Flags a trip as folded into statistics.
    fn mark_accumulated(&mut self, trip_id: Uuid) -> EngineResult<()>;

    /// Clears the accumulated flag on every trip.
    fn reset_accumulated(&mut self);
}

/// Trips held in memory, kept sorted by start time.
///
/// # Example
///
/// ```
/// use logbook_engine::store::{InMemoryTripStore, TripStore};
///
/// let store = InMemoryTripStore::new();
/// assert!(store.is_empty());
/// assert!(store.pending_trips().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTripStore {
    trips: Vec<Trip>,
}

impl InMemoryTripStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and inserts a trip.
    ///
    /// # Returns
    ///
    /// `InvalidTrip` if the trip is malformed or its ID is already stored.
    pub fn insert(&mut self, trip: Trip) -> EngineResult<()> {
        trip.validate()?;
        if self.trips.iter().any(|t| t.id == trip.id) {
            return Err(EngineError::InvalidTrip {
                trip_id: trip.id,
                message: "trip is already recorded".to_string(),
            });
        }

        let index = self
            .trips
            .partition_point(|t| t.start_time <= trip.start_time);
        self.trips.insert(index, trip);
        Ok(())
    }

    /// Returns a trip by ID.
    pub fn get(&self, trip_id: Uuid) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == trip_id)
    }

    /// Returns the number of stored trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// Returns true if no trips are stored.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }
}

impl TripStore for InMemoryTripStore {
    fn pending_trips(&self) -> Vec<Trip> {
        self.trips.iter().filter(|t| !t.accumulated).cloned().collect()
    }

    fn trips(&self) -> Vec<Trip> {
        self.trips.clone()
    }

    fn mark_accumulated(&mut self, trip_id: Uuid) -> EngineResult<()> {
        let trip = self
            .trips
            .iter_mut()
            .find(|t| t.id == trip_id)
            .ok_or(EngineError::TripNotFound { trip_id })?;
        trip.accumulated = true;
        Ok(())
    }

    fn reset_accumulated(&mut self) {
        for trip in &mut self.trips {
            trip.accumulated = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Conditions, Coordinate};
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn make_trip(hour: u32) -> Trip {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap();
        Trip {
            id: Uuid::new_v4(),
            start_time: start,
            end_time: start + Duration::minutes(45),
            time_zone: "Australia/Brisbane".to_string(),
            start_location: Coordinate::new(-27.47, 153.03),
            odometer_start: Decimal::new(12000, 0),
            distance_km: Decimal::new(25, 0),
            car_registration: "123ABC".to_string(),
            supervisor_id: "sup_002".to_string(),
            supervisor_accredited: false,
            conditions: Conditions::default(),
            accumulated: false,
        }
    }

    #[test]
    fn test_insert_keeps_start_time_order() {
        let mut store = InMemoryTripStore::new();
        let late = make_trip(9);
        let early = make_trip(1);
        store.insert(late.clone()).unwrap();
        store.insert(early.clone()).unwrap();

        let ids: Vec<Uuid> = store.trips().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = InMemoryTripStore::new();
        let trip = make_trip(3);
        store.insert(trip.clone()).unwrap();

        let result = store.insert(trip);
        assert!(matches!(result, Err(EngineError::InvalidTrip { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_rejects_malformed_trip() {
        let mut store = InMemoryTripStore::new();
        let mut trip = make_trip(3);
        trip.end_time = trip.start_time;

        assert!(store.insert(trip).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_mark_and_reset_accumulated() {
        let mut store = InMemoryTripStore::new();
        let trip = make_trip(4);
        store.insert(trip.clone()).unwrap();
        store.insert(make_trip(6)).unwrap();

        store.mark_accumulated(trip.id).unwrap();
        assert_eq!(store.pending_trips().len(), 1);
        assert!(store.get(trip.id).unwrap().accumulated);

        store.reset_accumulated();
        assert_eq!(store.pending_trips().len(), 2);
    }

    #[test]
    fn test_mark_unknown_trip_is_not_found() {
        let mut store = InMemoryTripStore::new();
        let missing = Uuid::new_v4();

        match store.mark_accumulated(missing) {
            Err(EngineError::TripNotFound { trip_id }) => assert_eq!(trip_id, missing),
            other => panic!("Expected TripNotFound, got {:?}", other),
        }
    }
}
