//! Data types for reconstructed bonds and employment histories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::duration::{calculate_date_diff_at, format_duration, sum_durations, sum_durations_with};
use cnis_core::HeuristicConfig;

/// Wire form of the end date of an ongoing bond.
pub const ONGOING_LABEL: &str = "Ativo";

/// A years/months/days span. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Duration {
    pub const ZERO: Duration = Duration {
        years: 0,
        months: 0,
        days: 0,
    };

    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Whole contribution months, ignoring the day remainder.
    pub fn total_months(&self) -> u32 {
        self.years.saturating_mul(12).saturating_add(self.months)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_duration(self))
    }
}

/// End of a bond: a closing date, or still open.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BondEnd {
    /// Closing date as it appeared in the statement (`DD/MM/YYYY`).
    Closed(String),
    Ongoing,
}

impl BondEnd {
    /// The closing date text, if the bond has ended.
    pub fn date(&self) -> Option<&str> {
        match self {
            Self::Closed(date) => Some(date),
            Self::Ongoing => None,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        matches!(self, Self::Ongoing)
    }
}

impl From<String> for BondEnd {
    fn from(value: String) -> Self {
        if value == ONGOING_LABEL {
            Self::Ongoing
        } else {
            Self::Closed(value)
        }
    }
}

impl From<BondEnd> for String {
    fn from(value: BondEnd) -> Self {
        match value {
            BondEnd::Closed(date) => date,
            BondEnd::Ongoing => ONGOING_LABEL.to_string(),
        }
    }
}

impl std::fmt::Display for BondEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed(date) => f.write_str(date),
            Self::Ongoing => f.write_str(ONGOING_LABEL),
        }
    }
}

/// A bond located by the reconstructor, before its duration is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondCandidate {
    pub company_name: String,
    pub start_date: String,
    pub end_date: BondEnd,
}

/// One reconstructed employment period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bond {
    id: String,
    company_name: String,
    start_date: String,
    end_date: BondEnd,
    is_active: bool,
    duration: Duration,
    duration_display: String,
}

impl Bond {
    /// Attach a fresh id and the duration as of `today` to a candidate.
    pub fn from_candidate(candidate: BondCandidate, today: NaiveDate) -> Self {
        let duration =
            calculate_date_diff_at(&candidate.start_date, candidate.end_date.date(), today);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            is_active: candidate.end_date.is_ongoing(),
            duration_display: format_duration(&duration),
            company_name: candidate.company_name,
            start_date: candidate.start_date,
            end_date: candidate.end_date,
            duration,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn end_date(&self) -> &BondEnd {
        &self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn duration_display(&self) -> &str {
        &self.duration_display
    }

    /// Equality on everything but the generated id.
    pub fn same_content(&self, other: &Bond) -> bool {
        self.company_name == other.company_name
            && self.start_date == other.start_date
            && self.end_date == other.end_date
            && self.is_active == other.is_active
            && self.duration == other.duration
    }
}

/// The persisted aggregate: bonds plus their derived total.
///
/// A stored total is never trusted on load; it is recomputed from the bonds
/// with the default 30-day month and 12-month year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredHistory")]
pub struct EmploymentHistory {
    bonds: Vec<Bond>,
    total_duration: Duration,
    last_update_timestamp: String,
    source_label: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHistory {
    bonds: Vec<Bond>,
    last_update_timestamp: String,
    source_label: String,
}

impl From<StoredHistory> for EmploymentHistory {
    fn from(stored: StoredHistory) -> Self {
        let total_duration = sum_durations(stored.bonds.iter().map(Bond::duration));
        Self {
            bonds: stored.bonds,
            total_duration,
            last_update_timestamp: stored.last_update_timestamp,
            source_label: stored.source_label,
        }
    }
}

impl EmploymentHistory {
    /// Build an aggregate, deriving the total from `bonds`.
    pub fn new(bonds: Vec<Bond>, last_update_timestamp: String, config: &HeuristicConfig) -> Self {
        let total_duration = sum_durations_with(
            bonds.iter().map(|b| &b.duration),
            config.days_per_month,
            config.months_per_year,
        );
        Self {
            bonds,
            total_duration,
            last_update_timestamp,
            source_label: config.source_label.clone(),
        }
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn last_update_timestamp(&self) -> &str {
        &self.last_update_timestamp
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }
}
