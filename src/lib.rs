//! Trip Eligibility & Logbook Calculation Engine for Australian learner drivers
//!
//! This crate splits supervised drives into day and night time using solar
//! event times, allocates accredited instructor bonus against each
//! jurisdiction's capped pool, aggregates progress toward licensing
//! requirements, and formats trips into each jurisdiction's logbook layout.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod context;
pub mod error;
pub mod logbook;
pub mod models;
pub mod store;
