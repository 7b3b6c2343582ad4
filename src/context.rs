//! Engine context.
//!
//! [`EngineContext`] owns the rule table, the active jurisdiction, the
//! manual baseline entries and the cumulative [`Statistics`]. It is passed
//! explicitly to every fold and read; holding it by `&mut` serializes folds.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{build_progress_report, calculate_trip_breakdowns, fold_trips};
use crate::config::RuleTable;
use crate::error::{EngineError, EngineResult};
use crate::logbook::{LogbookExport, LogbookFormatter};
use crate::models::{
    FoldResult, Jurisdiction, LearnerProfile, ManualEntries, ProgressReport, Stage, Statistics,
    Trip,
};
use crate::store::TripStore;

/// State shared across folds for one learner.
///
/// A new context starts stale, so its first fold is a full recompute.
///
/// # Example
///
/// ```
/// use logbook_engine::config::RuleTable;
/// use logbook_engine::context::EngineContext;
/// use logbook_engine::models::Jurisdiction;
/// use logbook_engine::store::InMemoryTripStore;
///
/// let mut context = EngineContext::new(RuleTable::builtin(), Jurisdiction::Vic);
/// let mut store = InMemoryTripStore::new();
///
/// assert!(context.checked_statistics().is_err());
/// let result = context.fold_pending(&mut store).unwrap();
/// assert!(result.full_recompute);
/// assert_eq!(context.checked_statistics().unwrap().trips_folded, 0);
/// ```
#[derive(Debug, Clone)]
pub struct EngineContext {
    rules: RuleTable,
    jurisdiction: Jurisdiction,
    statistics: Statistics,
    entries: BTreeMap<Jurisdiction, ManualEntries>,
    stale: bool,
    folded: BTreeSet<Uuid>,
}

impl EngineContext {
    /// Creates a context with zeroed statistics, marked stale.
    pub fn new(rules: RuleTable, jurisdiction: Jurisdiction) -> Self {
        Self {
            rules,
            jurisdiction,
            statistics: Statistics::new(jurisdiction),
            entries: BTreeMap::new(),
            stale: true,
            folded: BTreeSet::new(),
        }
    }

    /// Restores a context from previously persisted statistics.
    ///
    /// The statistics' jurisdiction becomes the active one. Trips whose
    /// accumulated flag is set in the store are taken to be included.
    pub fn with_statistics(rules: RuleTable, statistics: Statistics) -> Self {
        Self {
            rules,
            jurisdiction: statistics.jurisdiction,
            statistics,
            entries: BTreeMap::new(),
            stale: false,
            folded: BTreeSet::new(),
        }
    }

    /// Returns the rule table.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Returns the active jurisdiction.
    pub fn jurisdiction(&self) -> Jurisdiction {
        self.jurisdiction
    }

    /// Returns true if statistics must be recomputed before they are read.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Returns the manual entries for a jurisdiction.
    pub fn entries(&self, jurisdiction: Jurisdiction) -> ManualEntries {
        self.entries.get(&jurisdiction).copied().unwrap_or_default()
    }

    /// Replaces the manual entries for a jurisdiction.
    ///
    /// Changing the active jurisdiction's entries marks statistics stale,
    /// since the bonus pool depends on them.
    pub fn set_entries(&mut self, jurisdiction: Jurisdiction, entries: ManualEntries) {
        self.entries.insert(jurisdiction, entries);
        if jurisdiction == self.jurisdiction {
            self.stale = true;
        }
    }

    /// Makes another jurisdiction active.
    ///
    /// Statistics are reset to zero and marked stale; nothing computed under
    /// the previous jurisdiction survives. Switching to the active
    /// jurisdiction is a no-op.
    pub fn switch_jurisdiction(&mut self, jurisdiction: Jurisdiction) -> EngineResult<()> {
        self.rules.rules(jurisdiction)?;
        if jurisdiction == self.jurisdiction {
            return Ok(());
        }

        info!(
            from = %self.jurisdiction,
            to = %jurisdiction,
            discarded_trips = self.statistics.trips_folded,
            "switching jurisdiction, statistics reset"
        );

        self.jurisdiction = jurisdiction;
        self.statistics = Statistics::new(jurisdiction);
        self.folded.clear();
        self.stale = true;
        Ok(())
    }

    /// Marks statistics stale so the next fold recomputes from zero.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Returns the statistics, if they are current for the active jurisdiction.
    pub fn checked_statistics(&self) -> EngineResult<&Statistics> {
        if self.stale {
            return Err(EngineError::StatisticsStale {
                jurisdiction: self.jurisdiction,
            });
        }
        if self.statistics.jurisdiction != self.jurisdiction {
            return Err(EngineError::JurisdictionMismatch {
                expected: self.jurisdiction,
                found: self.statistics.jurisdiction,
            });
        }
        Ok(&self.statistics)
    }

    /// Folds every pending trip in the store into the statistics.
    ///
    /// When statistics are stale the store's accumulated flags are cleared
    /// and every trip is refolded from zero. Each folded trip is then
    /// flagged accumulated in the store. A trip this context has already
    /// folded is never counted again, even if the store lost its flag.
    ///
    /// # Returns
    ///
    /// The fold's breakdowns and audit trace. On error the statistics are
    /// unchanged and, if the store was partly updated, marked stale.
    pub fn fold_pending<S: TripStore>(&mut self, store: &mut S) -> EngineResult<FoldResult> {
        let jurisdiction = self.jurisdiction;
        let rules = self.rules.rules(jurisdiction)?;
        let entries = self.entries.get(&jurisdiction).copied().unwrap_or_default();
        let full_recompute = self.stale;

        if full_recompute {
            store.reset_accumulated();
            self.statistics = Statistics::new(jurisdiction);
            self.folded.clear();
        }

        let mut pending: Vec<Trip> = Vec::new();
        for trip in store.pending_trips() {
            if self.folded.contains(&trip.id) {
                warn!(trip_id = %trip.id, "trip was already folded, skipping");
                store.mark_accumulated(trip.id)?;
                continue;
            }
            pending.push(trip);
        }

        let mut working = self.statistics.clone();
        let fold = fold_trips(&mut working, rules, &entries, &pending)?;

        for breakdown in &fold.breakdowns {
            if let Err(error) = store.mark_accumulated(breakdown.trip_id) {
                self.stale = true;
                return Err(error);
            }
        }

        self.statistics = working;
        self.folded
            .extend(fold.breakdowns.iter().map(|breakdown| breakdown.trip_id));
        self.stale = false;

        info!(
            jurisdiction = %jurisdiction,
            trips_folded = fold.breakdowns.len(),
            full_recompute,
            warnings = fold.audit_trace.warnings.len(),
            duration_us = fold.audit_trace.duration_us,
            "fold completed"
        );

        Ok(FoldResult {
            fold_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            jurisdiction,
            full_recompute,
            breakdowns: fold.breakdowns,
            audit_trace: fold.audit_trace,
        })
    }

    /// Builds the learner's progress report from current statistics.
    ///
    /// Fails with `StatisticsStale` until a fold has run since the last
    /// jurisdiction switch or entry change.
    pub fn progress_report(
        &self,
        profile: &LearnerProfile,
        today: NaiveDate,
    ) -> EngineResult<ProgressReport> {
        let statistics = self.checked_statistics()?;
        let rules = self.rules.rules(self.jurisdiction)?;
        build_progress_report(
            statistics,
            rules,
            &self.entries(self.jurisdiction),
            profile,
            today,
        )
    }

    /// Exports every trip in the store in the active jurisdiction's layout.
    ///
    /// Breakdowns are recomputed from zero for the export, so the result
    /// does not depend on the store's accumulated flags.
    pub fn export_logbook<S: TripStore>(
        &self,
        store: &S,
        stage: Option<Stage>,
    ) -> EngineResult<LogbookExport> {
        let formatter = LogbookFormatter::new(self.jurisdiction, stage)?;
        let rules = self.rules.rules(self.jurisdiction)?;
        let trips = store.trips();
        let fold = calculate_trip_breakdowns(rules, &self.entries(self.jurisdiction), &trips)?;
        formatter.export(&trips, &fold.breakdowns)
    }
}
