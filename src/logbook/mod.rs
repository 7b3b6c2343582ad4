//! Logbook export.
//!
//! Formats folded trips into the rows and subtotal rows of each
//! jurisdiction's printed logbook. Template substitution is left to the
//! caller.

mod formatter;
mod layout;

pub use formatter::{
    LogbookExport, LogbookFormatter, LogbookLine, LogbookRow, RunningTotals, SubtotalRow,
    format_duration,
};
pub use layout::{ConditionColumn, LogbookLayout};
