//! Calculation logic for the logbook engine.
//!
//! This module contains the calculation functions for trip eligibility and
//! logbook progress: solar event times, splitting trips into day and night
//! time, light condition classification, accredited instructor bonus
//! allocation, permit hold duration, task derivation, and folding trips
//! into cumulative statistics.

mod apportionment;
mod bonus;
mod day_windows;
mod hold_duration;
mod light_condition;
mod progress;
mod solar;
mod tasks;

pub use apportionment::{Apportionment, TripApportionmentResult, apportion, apportion_trip};
pub use bonus::{
    BonusAllocationResult, BonusCredit, BonusInput, BonusPool, allocate_bonuses,
    allocate_trip_bonus, first_period,
};
pub use day_windows::{DayWindow, SECONDS_PER_DAY, day_windows};
pub use hold_duration::{HoldProgress, hold_progress, months_between};
pub use light_condition::{LightBands, LightClassification, classify_light};
pub use progress::{
    TripEvaluation, TripFold, build_progress_report, calculate_progress_totals,
    calculate_trip_breakdowns, evaluate_trip, fold_trips, open_bonus_pool,
};
pub use solar::{
    POLAR_SOLAR_FALLBACK, PolarCondition, SolarTimes, SolarTimesResult, Twilight, TwilightBounds,
    twilight_bounds,
};
pub use tasks::{build_tasks, log_hours_complete, safer_drivers_applies};
