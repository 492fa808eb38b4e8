//! Canonical reporting periods and the phrase normalizer.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Canonical period keys. Each key has one fixed date-range meaning,
/// see [`Period::date_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "last_quarter")]
    LastQuarter,
    #[serde(rename = "last_month")]
    LastMonth,
    #[serde(rename = "this_month_mtd")]
    ThisMonthToDate,
    #[serde(rename = "last_90_days")]
    Last90Days,
    #[serde(rename = "last_30_days")]
    Last30Days,
    #[serde(rename = "last_7_days")]
    Last7Days,
    #[serde(rename = "year_to_date")]
    YearToDate,
}

/// Phrase table in evaluation order. Later matching rows override earlier ones.
const PHRASES: &[(Period, &[&str])] = &[
    (Period::LastQuarter, &["last quarter", "past quarter", "previous quarter"]),
    (Period::LastMonth, &["last month", "past month", "previous month"]),
    (Period::ThisMonthToDate, &["this month", "current month"]),
    (Period::Last90Days, &["last 90 days", "past 90 days"]),
    (Period::Last30Days, &["last 30 days", "past 30 days"]),
    (Period::Last7Days, &["last 7 days", "past 7 days", "last week", "previous week"]),
    (Period::YearToDate, &["year to date", "ytd", "this year"]),
];

impl Period {
    /// All keys in phrase-table order.
    pub const ALL: [Period; 7] = [
        Period::LastQuarter,
        Period::LastMonth,
        Period::ThisMonthToDate,
        Period::Last90Days,
        Period::Last30Days,
        Period::Last7Days,
        Period::YearToDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastQuarter => "last_quarter",
            Self::LastMonth => "last_month",
            Self::ThisMonthToDate => "this_month_mtd",
            Self::Last90Days => "last_90_days",
            Self::Last30Days => "last_30_days",
            Self::Last7Days => "last_7_days",
            Self::YearToDate => "year_to_date",
        }
    }

    /// Human-readable form used in narratives ("last 90 days").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Natural-language phrasings that map onto this key.
    pub fn phrases(&self) -> &'static [&'static str] {
        PHRASES
            .iter()
            .find(|(period, _)| period == self)
            .map(|(_, phrases)| *phrases)
            .unwrap_or(&[])
    }

    /// Resolves the period mentioned in a lowercased query.
    ///
    /// Rows of the phrase table are tested in order and every matching row
    /// replaces the value so far, so when two periods are mentioned the one
    /// later in [`Period::ALL`] wins. Without any match `default` is kept.
    pub fn normalize(query_lower: &str, default: Period) -> Period {
        PHRASES
            .iter()
            .filter(|(_, phrases)| phrases.iter().any(|p| query_lower.contains(p)))
            .fold(default, |_, (period, _)| {
                trace!("Period phrase matched: {}", period);
                *period
            })
    }

    /// Date bounds relative to `today`: inclusive start, optional exclusive end.
    pub fn date_range(&self, today: NaiveDate) -> DateRange {
        let tomorrow = today.succ_opt().unwrap_or(today);
        let month_start = today - Duration::days(i64::from(today.day0()));

        match self {
            Self::LastQuarter => {
                let quarter_start = months_back(month_start, today.month0() % 3);
                DateRange::bounded(months_back(quarter_start, 3), quarter_start)
            }
            Self::LastMonth => DateRange::bounded(months_back(month_start, 1), month_start),
            Self::ThisMonthToDate => DateRange::bounded(month_start, tomorrow),
            Self::Last90Days => DateRange::open(today - Duration::days(90)),
            Self::Last30Days => DateRange::open(today - Duration::days(30)),
            Self::Last7Days => DateRange::bounded(today - Duration::days(7), tomorrow),
            Self::YearToDate => {
                DateRange::bounded(today - Duration::days(i64::from(today.ordinal0())), tomorrow)
            }
        }
    }

    /// Length of the trailing window used by rolling analyses
    /// (funnel, product failures, revenue anomalies).
    pub fn lookback_days(&self) -> i64 {
        match self {
            Self::Last30Days => 30,
            Self::Last7Days => 7,
            _ => 90,
        }
    }
}

fn months_back(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown period: {}", s))
    }
}

/// A half-open date interval; `end` is `None` when the range runs to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn bounded(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map_or(true, |end| date < end)
    }
}
