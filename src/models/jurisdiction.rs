//! Jurisdiction and licence stage types.
//!
//! Each Australian state issues learner permits under its own rules. A
//! learner resides in exactly one [`Jurisdiction`] at a time; two of them
//! (TAS and WA) split the learner period into two sequential [`Stage`]s.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An Australian licensing jurisdiction.
///
/// # Example
///
/// ```
/// use logbook_engine::models::Jurisdiction;
///
/// let nsw: Jurisdiction = "nsw".parse().unwrap();
/// assert_eq!(nsw, Jurisdiction::Nsw);
/// assert_eq!(nsw.to_string(), "NSW");
/// assert!(!nsw.is_staged());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    /// Victoria.
    Vic,
    /// New South Wales.
    Nsw,
    /// Queensland.
    Qld,
    /// South Australia.
    Sa,
    /// Tasmania (staged: L1 then L2).
    Tas,
    /// Western Australia (staged: S1 then S2).
    Wa,
}

impl Jurisdiction {
    /// Every jurisdiction, in display order.
    pub const ALL: [Jurisdiction; 6] = [
        Jurisdiction::Vic,
        Jurisdiction::Nsw,
        Jurisdiction::Qld,
        Jurisdiction::Sa,
        Jurisdiction::Tas,
        Jurisdiction::Wa,
    ];

    /// Returns the upper-case state code.
    pub fn code(&self) -> &'static str {
        match self {
            Jurisdiction::Vic => "VIC",
            Jurisdiction::Nsw => "NSW",
            Jurisdiction::Qld => "QLD",
            Jurisdiction::Sa => "SA",
            Jurisdiction::Tas => "TAS",
            Jurisdiction::Wa => "WA",
        }
    }

    /// Returns true if the learner period is split into two stages.
    pub fn is_staged(&self) -> bool {
        matches!(self, Jurisdiction::Tas | Jurisdiction::Wa)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Jurisdiction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Jurisdiction::ALL
            .into_iter()
            .find(|j| j.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown jurisdiction: {}", s))
    }
}

/// A learner stage within a staged jurisdiction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The first stage (TAS L1, WA S1).
    First,
    /// The second stage (TAS L2, WA S2).
    Second,
}

impl Stage {
    /// Returns the stage label used on the jurisdiction's paperwork.
    ///
    /// ```
    /// use logbook_engine::models::{Jurisdiction, Stage};
    ///
    /// assert_eq!(Stage::First.label(Jurisdiction::Tas), "L1");
    /// assert_eq!(Stage::Second.label(Jurisdiction::Wa), "S2");
    /// ```
    pub fn label(&self, jurisdiction: Jurisdiction) -> &'static str {
        match (jurisdiction, self) {
            (Jurisdiction::Wa, Stage::First) => "S1",
            (Jurisdiction::Wa, Stage::Second) => "S2",
            (_, Stage::First) => "L1",
            (_, Stage::Second) => "L2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for jurisdiction in Jurisdiction::ALL {
            let parsed: Jurisdiction = jurisdiction.code().parse().unwrap();
            assert_eq!(parsed, jurisdiction);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_code() {
        assert!("ACT".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn test_only_tas_and_wa_are_staged() {
        let staged: Vec<_> = Jurisdiction::ALL
            .into_iter()
            .filter(Jurisdiction::is_staged)
            .collect();
        assert_eq!(staged, vec![Jurisdiction::Tas, Jurisdiction::Wa]);
    }

    #[test]
    fn test_jurisdiction_serializes_as_upper_case_code() {
        assert_eq!(serde_json::to_string(&Jurisdiction::Qld).unwrap(), "\"QLD\"");
        let sa: Jurisdiction = serde_json::from_str("\"SA\"").unwrap();
        assert_eq!(sa, Jurisdiction::Sa);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Second.label(Jurisdiction::Tas), "L2");
        assert_eq!(Stage::First.label(Jurisdiction::Wa), "S1");
    }
}
