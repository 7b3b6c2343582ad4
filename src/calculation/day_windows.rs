//! Local calendar-day segmentation for trips.
//!
//! A trip is expressed as a start offset from local midnight plus an elapsed
//! duration. This module splits that span at each local midnight so the
//! apportioner and light classifier can work one calendar day at a time.

use serde::{Deserialize, Serialize};

/// Seconds in one local calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The part of a trip that falls on one local calendar day.
///
/// `start` and `end` are seconds since that day's local midnight, with
/// `0 <= start <= end <= 86400`.
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::DayWindow;
///
/// let window = DayWindow { day_index: 0, start: 3600, end: 7200 };
/// assert_eq!(window.len(), 3600);
/// assert_eq!(window.overlap(0, 5400), 1800);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Days after the trip's start date (0 for the start date).
    pub day_index: i64,
    /// Seconds from local midnight where the window opens.
    pub start: i64,
    /// Seconds from local midnight where the window closes.
    pub end: i64,
}

impl DayWindow {
    /// Returns the window length in seconds.
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    /// Returns true if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Returns the seconds shared with `[from, to]`, never negative.
    pub fn overlap(&self, from: i64, to: i64) -> i64 {
        (self.end.min(to) - self.start.max(from)).max(0)
    }
}

/// Splits a trip into one window per local calendar day it touches.
///
/// The number of midnights crossed is `(start_seconds + elapsed) / 86400`.
/// The first window opens at the trip's start offset, the last closes at its
/// end offset, and every window between covers a full day. Empty windows
/// (a trip ending exactly at midnight) are dropped.
///
/// # Arguments
///
/// * `start_seconds` - Trip start as seconds since local midnight
/// * `elapsed_seconds` - Trip duration in seconds
///
/// # Returns
///
/// Windows in chronological order whose lengths sum to `elapsed_seconds`.
///
/// # Example
///
/// ```
/// use logbook_engine::calculation::day_windows;
///
/// // 22:00 for 4 hours crosses one midnight
/// let windows = day_windows(22 * 3600, 4 * 3600);
/// assert_eq!(windows.len(), 2);
/// assert_eq!((windows[0].start, windows[0].end), (79200, 86400));
/// assert_eq!((windows[1].start, windows[1].end), (0, 7200));
/// ```
pub fn day_windows(start_seconds: i64, elapsed_seconds: i64) -> Vec<DayWindow> {
    if elapsed_seconds <= 0 {
        return Vec::new();
    }

    let end_offset = start_seconds + elapsed_seconds;
    let days = end_offset / SECONDS_PER_DAY;

    (0..=days)
        .map(|day_index| DayWindow {
            day_index,
            start: if day_index == 0 { start_seconds } else { 0 },
            end: if day_index == days {
                end_offset - day_index * SECONDS_PER_DAY
            } else {
                SECONDS_PER_DAY
            },
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_day_trip_has_one_window() {
        let windows = day_windows(8 * 3600, 7200);
        assert_eq!(
            windows,
            vec![DayWindow {
                day_index: 0,
                start: 28800,
                end: 36000
            }]
        );
    }

    #[test]
    fn test_trip_ending_at_midnight_has_no_empty_window() {
        let windows = day_windows(23 * 3600, 3600);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end, SECONDS_PER_DAY);
    }

    #[test]
    fn test_multi_day_trip_has_full_middle_days() {
        // 20:00 for 30 hours ends 02:00 two days later
        let windows = day_windows(20 * 3600, 30 * 3600);
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].start, 0);
        assert_eq!(windows[1].end, SECONDS_PER_DAY);
        assert_eq!(windows[2].day_index, 2);
        assert_eq!(windows[2].end, 2 * 3600);
    }

    #[test]
    fn test_zero_length_span_has_no_windows() {
        assert!(day_windows(3600, 0).is_empty());
    }

    #[test]
    fn test_overlap_is_clamped_at_zero() {
        let window = DayWindow {
            day_index: 0,
            start: 100,
            end: 200,
        };
        assert_eq!(window.overlap(300, 400), 0);
        assert_eq!(window.overlap(150, 120), 0);
        assert_eq!(window.overlap(0, 86400), 100);
    }

    proptest! {
        #[test]
        fn prop_windows_cover_elapsed_exactly(
            start in 0i64..SECONDS_PER_DAY,
            elapsed in 1i64..(5 * SECONDS_PER_DAY),
        ) {
            let windows = day_windows(start, elapsed);
            let total: i64 = windows.iter().map(DayWindow::len).sum();
            prop_assert_eq!(total, elapsed);
            for w in &windows {
                prop_assert!(0 <= w.start && w.start < w.end && w.end <= SECONDS_PER_DAY);
            }
        }
    }
}
