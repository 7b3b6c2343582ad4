//! Driving condition flags recorded against a trip.
//!
//! Conditions are closed enumerations held in ordered sets, one set per
//! category, so a trip can record several conditions in the same category
//! (e.g. rain and fog).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Weather observed during a trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    /// Clear or fine weather.
    Clear,
    /// Rain.
    Rain,
    /// Thunderstorm.
    Thunder,
    /// Fog.
    Fog,
    /// Hail.
    Hail,
    /// Snow.
    Snow,
}

/// Traffic density during a trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Traffic {
    /// Light traffic.
    Light,
    /// Moderate traffic.
    Moderate,
    /// Heavy traffic.
    Heavy,
}

/// Road type driven on during a trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Road {
    /// Local or residential street.
    LocalStreet,
    /// Main road.
    MainRoad,
    /// Inner city streets.
    InnerCity,
    /// Freeway or motorway.
    Freeway,
    /// Rural highway or country road.
    RuralHighway,
    /// Unsealed gravel road.
    Gravel,
}

/// Natural light condition a trip passed through.
///
/// Derived from the five light bands (late night, dawn, day, dusk, early
/// night); both night bands map to [`LightCondition::Night`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LightCondition {
    /// Between astronomical and civil dawn.
    Dawn,
    /// Between civil dawn and civil dusk.
    Day,
    /// Between civil and astronomical dusk.
    Dusk,
    /// Before astronomical dawn or after astronomical dusk.
    Night,
}

/// Whether daytime or night-time driving came first within a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// The trip started between civil dawn and civil dusk.
    Day,
    /// The trip started before civil dawn or after civil dusk.
    Night,
}

/// The condition flags recorded against a trip.
///
/// # Example
///
/// ```
/// use logbook_engine::models::{Conditions, Road, Traffic, Weather};
///
/// let conditions = Conditions::default()
///     .with_weather(Weather::Rain)
///     .with_traffic(Traffic::Heavy)
///     .with_road(Road::Freeway);
/// assert!(conditions.weather.contains(&Weather::Rain));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    /// Weather observed.
    #[serde(default)]
    pub weather: BTreeSet<Weather>,
    /// Traffic densities encountered.
    #[serde(default)]
    pub traffic: BTreeSet<Traffic>,
    /// Road types driven on.
    #[serde(default)]
    pub road: BTreeSet<Road>,
}

impl Conditions {
    /// Adds a weather condition.
    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather.insert(weather);
        self
    }

    /// Adds a traffic condition.
    pub fn with_traffic(mut self, traffic: Traffic) -> Self {
        self.traffic.insert(traffic);
        self
    }

    /// Adds a road type.
    pub fn with_road(mut self, road: Road) -> Self {
        self.road.insert(road);
        self
    }
}
