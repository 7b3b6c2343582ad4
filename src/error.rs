//! Error types for the logbook calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while apportioning trips,
//! loading jurisdiction rules, and aggregating learner progress.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::calculation::{PolarCondition, Twilight};
use crate::models::{Jurisdiction, Stage};

/// The main error type for the logbook calculation engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use logbook_engine::error::EngineError;
///
/// let error = EngineError::UnknownTimeZone {
///     zone: "Australia/Atlantis".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unknown time zone: Australia/Atlantis");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rule table did not contain an entry for a jurisdiction.
    #[error("No rules configured for jurisdiction {jurisdiction}")]
    JurisdictionNotConfigured {
        /// The jurisdiction that is missing.
        jurisdiction: Jurisdiction,
    },

    /// A rule table failed validation.
    #[error("Invalid rules for {jurisdiction}: {message}")]
    InvalidRuleTable {
        /// The jurisdiction whose rules are invalid.
        jurisdiction: Jurisdiction,
        /// A description of the problem.
        message: String,
    },

    /// An IANA time zone identifier could not be resolved.
    #[error("Unknown time zone: {zone}")]
    UnknownTimeZone {
        /// The identifier that failed to resolve.
        zone: String,
    },

    /// A trip was malformed and rejected at the ingestion boundary.
    #[error("Invalid trip '{trip_id}': {message}")]
    InvalidTrip {
        /// The ID of the invalid trip.
        trip_id: Uuid,
        /// A description of what made the trip invalid.
        message: String,
    },

    /// A trip could not be found in the trip store.
    #[error("Trip not found: {trip_id}")]
    TripNotFound {
        /// The ID that was looked up.
        trip_id: Uuid,
    },

    /// The sun never crosses the requested depression angle on the given date.
    #[error("Indeterminate {twilight} twilight on {date}: {condition}")]
    IndeterminateSolarEvent {
        /// The local calendar date of the computation.
        date: NaiveDate,
        /// The twilight band whose boundary is undefined.
        twilight: Twilight,
        /// Whether the sun stays above or below the angle all day.
        condition: PolarCondition,
    },

    /// A staged jurisdiction was evaluated without a licence stage.
    #[error("Jurisdiction {jurisdiction} requires a licence stage")]
    StageRequired {
        /// The staged jurisdiction.
        jurisdiction: Jurisdiction,
    },

    /// A licence stage was supplied for a jurisdiction without stages.
    #[error("Jurisdiction {jurisdiction} has no licence stage {stage:?}")]
    StageNotApplicable {
        /// The non-staged jurisdiction.
        jurisdiction: Jurisdiction,
        /// The stage that was supplied.
        stage: Stage,
    },

    /// Statistics computed under one jurisdiction were read under another.
    #[error("Statistics were computed for {found} but {expected} is active")]
    JurisdictionMismatch {
        /// The active jurisdiction.
        expected: Jurisdiction,
        /// The jurisdiction the statistics belong to.
        found: Jurisdiction,
    },

    /// Statistics must be recomputed before they can be read.
    #[error("Statistics for {jurisdiction} are stale and must be recomputed")]
    StatisticsStale {
        /// The active jurisdiction.
        jurisdiction: Jurisdiction,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
