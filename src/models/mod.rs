//! Core data models for the logbook engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation_result;
mod conditions;
mod jurisdiction;
mod learner;
mod statistics;
mod task;
mod trip;

pub use calculation_result::{
    AuditStep, AuditTrace, AuditWarning, FoldResult, ProgressReport, ProgressTotals,
    TripBreakdown,
};
pub use conditions::{Conditions, LightCondition, Period, Road, Traffic, Weather};
pub use jurisdiction::{Jurisdiction, Stage};
pub use learner::{Attestation, LearnerProfile, ManualEntries};
pub use statistics::Statistics;
pub use task::{Task, TaskKind, TaskProgress};
pub use trip::{Coordinate, Trip};
