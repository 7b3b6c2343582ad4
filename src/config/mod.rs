//! Jurisdiction rule configuration for the logbook engine.
//!
//! This module provides the jurisdiction rule table, either compiled in or
//! loaded from YAML files: required hours, bonus pools, hold durations,
//! licence stages and the tasks each phase presents.
//!
//! # Example
//!
//! ```no_run
//! use logbook_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/australia").unwrap();
//! println!("Loaded rules: {}", config.ruleset().name);
//! ```

mod loader;
mod table;
mod types;

pub use loader::ConfigLoader;
pub use table::RuleTable;
pub use types::{
    AgeBracket, BonusRule, HoldRule, HoursRequirement, JurisdictionRules, JurisdictionsConfig,
    LicencePlan, Phase, RulesetMetadata, SaferDriversRule, TaskRule,
};
