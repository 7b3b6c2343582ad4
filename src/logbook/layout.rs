//! Per-jurisdiction logbook layouts.
//!
//! Each jurisdiction's printed logbook has its own condition columns, code
//! letters and subtotal cadence. TAS and WA branch further on the learner
//! stage.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{Jurisdiction, LightCondition, Road, Stage, Traffic, Weather};

/// A condition column printed on a logbook row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConditionColumn {
    /// Natural light the trip passed through.
    Light,
    /// Weather observed.
    Weather,
    /// Traffic density.
    Traffic,
    /// Road types driven on.
    Road,
}

/// The shape of one jurisdiction's logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookLayout {
    /// The jurisdiction the layout belongs to.
    pub jurisdiction: Jurisdiction,
    /// The learner stage, for staged jurisdictions.
    pub stage: Option<Stage>,
    /// A subtotal row follows every this many trip rows.
    pub subtotal_every: usize,
    /// Whether day and night durations get separate columns.
    pub day_night_columns: bool,
    /// Whether accredited instructor bonus gets a column.
    pub bonus_column: bool,
    /// Condition columns, in print order.
    pub conditions: Vec<ConditionColumn>,
}

impl LogbookLayout {
    /// Returns the layout for a jurisdiction and stage.
    ///
    /// # Example
    ///
    /// ```
    /// use logbook_engine::logbook::{ConditionColumn, LogbookLayout};
    /// use logbook_engine::models::{Jurisdiction, Stage};
    ///
    /// let nsw = LogbookLayout::for_jurisdiction(Jurisdiction::Nsw, None).unwrap();
    /// assert_eq!(nsw.subtotal_every, 7);
    ///
    /// let tas = LogbookLayout::for_jurisdiction(Jurisdiction::Tas, Some(Stage::First)).unwrap();
    /// assert!(tas.conditions.is_empty());
    /// ```
    pub fn for_jurisdiction(jurisdiction: Jurisdiction, stage: Option<Stage>) -> EngineResult<Self> {
        use ConditionColumn::{Light, Road, Traffic, Weather};

        let (subtotal_every, day_night_columns, bonus_column, conditions) =
            match (jurisdiction, stage) {
                (Jurisdiction::Vic, None) => (14, true, false, vec![Light, Weather, Traffic, Road]),
                (Jurisdiction::Nsw, None) => (7, true, true, vec![Light, Weather, Traffic, Road]),
                (Jurisdiction::Qld, None) => (8, true, true, vec![Light, Traffic]),
                (Jurisdiction::Sa, None) => (14, true, false, vec![Light, Weather, Road]),
                (Jurisdiction::Tas, Some(Stage::First)) => (11, false, false, vec![]),
                (Jurisdiction::Tas, Some(Stage::Second)) => (11, true, false, vec![Light, Weather, Road]),
                (Jurisdiction::Wa, Some(_)) => (10, true, false, vec![Light, Road]),
                (Jurisdiction::Tas | Jurisdiction::Wa, None) => {
                    return Err(EngineError::StageRequired { jurisdiction });
                }
                (_, Some(stage)) => {
                    return Err(EngineError::StageNotApplicable {
                        jurisdiction,
                        stage,
                    });
                }
            };

        Ok(Self {
            jurisdiction,
            stage,
            subtotal_every,
            day_night_columns,
            bonus_column,
            conditions,
        })
    }

    /// Returns true if a subtotal row follows the given 1-based row number.
    pub fn subtotal_after(&self, row_number: usize, is_last: bool) -> bool {
        is_last || (self.subtotal_every > 0 && row_number % self.subtotal_every == 0)
    }

    /// Returns the code printed for a light condition.
    pub fn light_code(&self, light: LightCondition) -> &'static str {
        match (self.jurisdiction, light) {
            (Jurisdiction::Vic, LightCondition::Day) => "D",
            (Jurisdiction::Vic, LightCondition::Dawn | LightCondition::Dusk) => "K",
            (Jurisdiction::Vic, LightCondition::Night) => "N",
            (_, LightCondition::Dawn) => "DN",
            (_, LightCondition::Day) => "D",
            (_, LightCondition::Dusk) => "DK",
            (_, LightCondition::Night) => "N",
        }
    }

    /// Returns the code printed for a weather condition.
    pub fn weather_code(&self, weather: Weather) -> &'static str {
        match (self.jurisdiction, weather) {
            (Jurisdiction::Nsw, Weather::Clear) => "F",
            (Jurisdiction::Nsw, Weather::Hail) => "I",
            (_, Weather::Clear) => "C",
            (_, Weather::Rain) => "R",
            (_, Weather::Thunder) => "T",
            (_, Weather::Fog) => "FG",
            (_, Weather::Hail) => "H",
            (_, Weather::Snow) => "S",
        }
    }

    /// Returns the code printed for a traffic density.
    pub fn traffic_code(&self, traffic: Traffic) -> &'static str {
        match traffic {
            Traffic::Light => "L",
            Traffic::Moderate => "M",
            Traffic::Heavy => "H",
        }
    }

    /// Returns the code printed for a road type.
    pub fn road_code(&self, road: Road) -> &'static str {
        match (self.jurisdiction, road) {
            (Jurisdiction::Vic, Road::LocalStreet) => "L",
            (Jurisdiction::Vic, Road::MainRoad) => "M",
            (Jurisdiction::Vic, Road::InnerCity) => "C",
            (Jurisdiction::Vic, Road::Freeway) => "F",
            (Jurisdiction::Vic, Road::RuralHighway) => "R",
            (_, Road::LocalStreet) => "LS",
            (_, Road::MainRoad) => "MR",
            (_, Road::InnerCity) => "IC",
            (_, Road::Freeway) => "FW",
            (_, Road::RuralHighway) => "RH",
            (_, Road::Gravel) => "G",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(jurisdiction: Jurisdiction, stage: Option<Stage>) -> LogbookLayout {
        LogbookLayout::for_jurisdiction(jurisdiction, stage).unwrap()
    }

    #[test]
    fn test_subtotal_cadence_per_jurisdiction() {
        assert_eq!(layout(Jurisdiction::Vic, None).subtotal_every, 14);
        assert_eq!(layout(Jurisdiction::Sa, None).subtotal_every, 14);
        assert_eq!(layout(Jurisdiction::Nsw, None).subtotal_every, 7);
        assert_eq!(layout(Jurisdiction::Qld, None).subtotal_every, 8);
        assert_eq!(layout(Jurisdiction::Tas, Some(Stage::Second)).subtotal_every, 11);
        assert_eq!(layout(Jurisdiction::Wa, Some(Stage::First)).subtotal_every, 10);
    }

    #[test]
    fn test_subtotal_after_cadence_and_last_row() {
        let nsw = layout(Jurisdiction::Nsw, None);
        assert!(!nsw.subtotal_after(6, false));
        assert!(nsw.subtotal_after(7, false));
        assert!(nsw.subtotal_after(3, true));
        assert!(nsw.subtotal_after(14, false));
    }

    #[test]
    fn test_vic_light_codes() {
        let vic = layout(Jurisdiction::Vic, None);
        assert_eq!(vic.light_code(LightCondition::Day), "D");
        assert_eq!(vic.light_code(LightCondition::Dawn), "K");
        assert_eq!(vic.light_code(LightCondition::Dusk), "K");
        assert_eq!(vic.light_code(LightCondition::Night), "N");
    }

    #[test]
    fn test_nsw_weather_codes() {
        let nsw = layout(Jurisdiction::Nsw, None);
        assert_eq!(nsw.weather_code(Weather::Clear), "F");
        assert_eq!(nsw.weather_code(Weather::Rain), "R");
        assert_eq!(nsw.weather_code(Weather::Snow), "S");
        assert_eq!(nsw.weather_code(Weather::Hail), "I");
        assert_eq!(nsw.weather_code(Weather::Fog), "FG");
    }

    #[test]
    fn test_tas_first_stage_has_no_conditions() {
        let tas = layout(Jurisdiction::Tas, Some(Stage::First));
        assert!(tas.conditions.is_empty());
        assert!(!tas.day_night_columns);
    }

    #[test]
    fn test_staged_jurisdiction_requires_stage() {
        let result = LogbookLayout::for_jurisdiction(Jurisdiction::Wa, None);
        assert!(matches!(
            result,
            Err(EngineError::StageRequired {
                jurisdiction: Jurisdiction::Wa
            })
        ));
    }

    #[test]
    fn test_single_phase_jurisdiction_rejects_stage() {
        let result = LogbookLayout::for_jurisdiction(Jurisdiction::Qld, Some(Stage::Second));
        assert!(matches!(
            result,
            Err(EngineError::StageNotApplicable { .. })
        ));
    }
}
