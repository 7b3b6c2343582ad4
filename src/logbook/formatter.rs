//! Logbook row and subtotal composition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Jurisdiction, Stage, Trip, TripBreakdown};

use super::layout::{ConditionColumn, LogbookLayout};

/// Formats seconds as hours and minutes, e.g. `2:05`.
///
/// Partial minutes are dropped.
///
/// ```
/// use logbook_engine::logbook::format_duration;
///
/// assert_eq!(format_duration(7200), "2:00");
/// assert_eq!(format_duration(3959), "1:05");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds.max(0) / 60;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Totals carried from row to row.
///
/// The page totals restart after every subtotal row; the cumulative totals
/// cover the whole export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningTotals {
    /// Trip rows emitted so far.
    pub rows: usize,
    /// Daytime seconds since the last subtotal.
    pub page_day_seconds: i64,
    /// Night-time seconds since the last subtotal.
    pub page_night_seconds: i64,
    /// Bonus seconds since the last subtotal.
    pub page_bonus_seconds: i64,
    /// Daytime seconds across the export.
    pub day_seconds: i64,
    /// Night-time seconds across the export.
    pub night_seconds: i64,
    /// Bonus seconds across the export.
    pub bonus_seconds: i64,
}

impl RunningTotals {
    fn add(mut self, breakdown: &TripBreakdown) -> Self {
        let bonus = breakdown.bonus_seconds();
        self.rows += 1;
        self.page_day_seconds += breakdown.day_seconds;
        self.page_night_seconds += breakdown.night_seconds;
        self.page_bonus_seconds += bonus;
        self.day_seconds += breakdown.day_seconds;
        self.night_seconds += breakdown.night_seconds;
        self.bonus_seconds += bonus;
        self
    }

    fn close_page(mut self) -> Self {
        self.page_day_seconds = 0;
        self.page_night_seconds = 0;
        self.page_bonus_seconds = 0;
        self
    }
}

/// One trip as printed in the logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookRow {
    /// 1-based row number.
    pub row_number: usize,
    /// The trip printed on this row.
    pub trip_id: Uuid,
    /// Local start date, `dd/mm/yyyy`.
    pub date: String,
    /// Local start time, `HH:MM`.
    pub start_time: String,
    /// Local end time, `HH:MM`.
    pub end_time: String,
    /// Odometer at the start, whole kilometres.
    pub odometer_start: String,
    /// Odometer at the end, whole kilometres.
    pub odometer_end: String,
    /// Registration of the car driven.
    pub car_registration: String,
    /// Reference to the supervising driver.
    pub supervisor_id: String,
    /// Total trip duration.
    pub duration: String,
    /// Daytime duration, where the layout splits day and night.
    pub day_duration: Option<String>,
    /// Night-time duration, where the layout splits day and night.
    pub night_duration: Option<String>,
    /// Bonus credited, where the layout has a bonus column.
    pub bonus_duration: Option<String>,
    /// Light codes joined with `/`.
    pub light: Option<String>,
    /// Weather codes joined with `/`.
    pub weather: Option<String>,
    /// Traffic codes joined with `/`.
    pub traffic: Option<String>,
    /// Road codes joined with `/`.
    pub road: Option<String>,
}

/// A subtotal row interposed after a page of trip rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtotalRow {
    /// The trip row this subtotal follows.
    pub after_row: usize,
    /// Time driven on this page.
    pub page_total: String,
    /// Daytime on this page, where the layout splits day and night.
    pub page_day: Option<String>,
    /// Night-time on this page, where the layout splits day and night.
    pub page_night: Option<String>,
    /// Bonus on this page, where the layout has a bonus column.
    pub page_bonus: Option<String>,
    /// Time driven so far.
    pub total: String,
    /// Daytime so far, where the layout splits day and night.
    pub day: Option<String>,
    /// Night-time so far, where the layout splits day and night.
    pub night: Option<String>,
    /// Bonus so far, where the layout has a bonus column.
    pub bonus: Option<String>,
}

/// One line of an exported logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogbookLine {
    /// A trip row.
    Trip(LogbookRow),
    /// A subtotal row.
    Subtotal(SubtotalRow),
}

/// An exported logbook, ready for template substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogbookExport {
    /// The jurisdiction whose layout was used.
    pub jurisdiction: Jurisdiction,
    /// The learner stage, for staged jurisdictions.
    pub stage: Option<Stage>,
    /// The stage as printed on the logbook cover, e.g. `L2` or `S1`.
    pub stage_label: Option<String>,
    /// Trip and subtotal lines in print order.
    pub lines: Vec<LogbookLine>,
}

impl LogbookExport {
    /// Returns the trip rows only.
    pub fn rows(&self) -> impl Iterator<Item = &LogbookRow> {
        self.lines.iter().filter_map(|line| match line {
            LogbookLine::Trip(row) => Some(row),
            LogbookLine::Subtotal(_) => None,
        })
    }

    /// Returns the subtotal rows only.
    pub fn subtotals(&self) -> impl Iterator<Item = &SubtotalRow> {
        self.lines.iter().filter_map(|line| match line {
            LogbookLine::Subtotal(subtotal) => Some(subtotal),
            LogbookLine::Trip(_) => None,
        })
    }
}

/// Composes logbook rows for one jurisdiction and stage.
#[derive(Debug, Clone)]
pub struct LogbookFormatter {
    layout: LogbookLayout,
}

impl LogbookFormatter {
    /// Creates a formatter for a jurisdiction and stage.
    pub fn new(jurisdiction: Jurisdiction, stage: Option<Stage>) -> EngineResult<Self> {
        Ok(Self {
            layout: LogbookLayout::for_jurisdiction(jurisdiction, stage)?,
        })
    }

    /// Returns the layout in use.
    pub fn layout(&self) -> &LogbookLayout {
        &self.layout
    }

    /// Formats one trip and advances the running totals.
    ///
    /// Call once per trip in chronological order.
    ///
    /// # Arguments
    ///
    /// * `trip` - The trip to print
    /// * `breakdown` - The trip's breakdown from the aggregator
    /// * `totals` - Totals after the previous row
    pub fn row(
        &self,
        trip: &Trip,
        breakdown: &TripBreakdown,
        totals: RunningTotals,
    ) -> EngineResult<(LogbookRow, RunningTotals)> {
        if breakdown.trip_id != trip.id {
            return Err(EngineError::CalculationError {
                message: format!(
                    "breakdown for trip {} does not belong to trip {}",
                    breakdown.trip_id, trip.id
                ),
            });
        }

        let layout = &self.layout;
        let start = trip.local_start()?;
        let end = trip.local_end()?;
        let split = layout.day_night_columns;

        let column = |kind: ConditionColumn, codes: Vec<&'static str>| {
            layout.conditions.contains(&kind).then(|| join_codes(codes))
        };

        let row = LogbookRow {
            row_number: totals.rows + 1,
            trip_id: trip.id,
            date: start.format("%d/%m/%Y").to_string(),
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            odometer_start: trip.odometer_start.round_dp(0).to_string(),
            odometer_end: trip.odometer_end().round_dp(0).to_string(),
            car_registration: trip.car_registration.clone(),
            supervisor_id: trip.supervisor_id.clone(),
            duration: format_duration(breakdown.elapsed_seconds),
            day_duration: split.then(|| format_duration(breakdown.day_seconds)),
            night_duration: split.then(|| format_duration(breakdown.night_seconds)),
            bonus_duration: layout
                .bonus_column
                .then(|| format_duration(breakdown.bonus_seconds())),
            light: column(
                ConditionColumn::Light,
                breakdown.light.iter().map(|l| layout.light_code(*l)).collect(),
            ),
            weather: column(
                ConditionColumn::Weather,
                trip.conditions.weather.iter().map(|w| layout.weather_code(*w)).collect(),
            ),
            traffic: column(
                ConditionColumn::Traffic,
                trip.conditions.traffic.iter().map(|t| layout.traffic_code(*t)).collect(),
            ),
            road: column(
                ConditionColumn::Road,
                trip.conditions.road.iter().map(|r| layout.road_code(*r)).collect(),
            ),
        };

        Ok((row, totals.add(breakdown)))
    }

    /// Builds the subtotal row for the current totals.
    pub fn subtotal(&self, totals: &RunningTotals) -> SubtotalRow {
        let split = self.layout.day_night_columns;
        let bonus = self.layout.bonus_column;

        SubtotalRow {
            after_row: totals.rows,
            page_total: format_duration(totals.page_day_seconds + totals.page_night_seconds),
            page_day: split.then(|| format_duration(totals.page_day_seconds)),
            page_night: split.then(|| format_duration(totals.page_night_seconds)),
            page_bonus: bonus.then(|| format_duration(totals.page_bonus_seconds)),
            total: format_duration(totals.day_seconds + totals.night_seconds),
            day: split.then(|| format_duration(totals.day_seconds)),
            night: split.then(|| format_duration(totals.night_seconds)),
            bonus: bonus.then(|| format_duration(totals.bonus_seconds)),
        }
    }

    /// Exports every trip with subtotals at the layout's cadence and after
    /// the last row.
    ///
    /// # Returns
    ///
    /// The export, or `CalculationError` if a trip has no breakdown.
    pub fn export(&self, trips: &[Trip], breakdowns: &[TripBreakdown]) -> EngineResult<LogbookExport> {
        let by_trip: HashMap<Uuid, &TripBreakdown> =
            breakdowns.iter().map(|b| (b.trip_id, b)).collect();

        let mut ordered: Vec<&Trip> = trips.iter().collect();
        ordered.sort_by_key(|t| t.start_time);

        let pages = trips.len() / self.layout.subtotal_every.max(1) + 1;
        let mut lines = Vec::with_capacity(trips.len() + pages);
        let mut totals = RunningTotals::default();

        for (index, trip) in ordered.iter().enumerate() {
            let breakdown = by_trip.get(&trip.id).ok_or_else(|| EngineError::CalculationError {
                message: format!("no breakdown for trip {}", trip.id),
            })?;

            let (row, next) = self.row(trip, breakdown, totals)?;
            lines.push(LogbookLine::Trip(row));
            totals = next;

            if self.layout.subtotal_after(totals.rows, index + 1 == ordered.len()) {
                lines.push(LogbookLine::Subtotal(self.subtotal(&totals)));
                totals = totals.close_page();
            }
        }

        Ok(LogbookExport {
            jurisdiction: self.layout.jurisdiction,
            stage: self.layout.stage,
            stage_label: self
                .layout
                .stage
                .map(|stage| stage.label(self.layout.jurisdiction).to_string()),
            lines,
        })
    }
}

fn join_codes(mut codes: Vec<&'static str>) -> String {
    let mut seen = Vec::with_capacity(codes.len());
    codes.retain(|code| {
        if seen.contains(code) {
            false
        } else {
            seen.push(*code);
            true
        }
    });
    codes.join("/")
}
