//! Intents, slot context and the classification outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassificationError;
use crate::period::Period;

/// Analytical question categories. Exactly one is selected per query, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// "What can you do?"
    GetHelp,
    /// "What is AOV?"
    ExplainTerm,
    /// "How can we improve delivery issues in Cairo?"
    SuggestImprovementForHighFailureCity,
    /// "Compare failure rate between Algeria and Egypt"
    CompareFailureRateGeo,
    /// "Which products have high failure rates after shipping?"
    GetHighFailureProducts,
    /// "Show cancellation reason breakdown"
    GetCancellationReasons,
    /// "Any unusual revenue changes lately?"
    FindRevenueAnomaly,
    /// "Gross profit last 7 days"
    GetGrossProfit,
    /// "Explain the sales funnel"
    ExplainSalesFunnel,
    /// "Revenue last 30 days"
    GetDeliveredRevenue,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetHelp => "get_help",
            Self::ExplainTerm => "explain_term",
            Self::SuggestImprovementForHighFailureCity => "suggest_improvement_for_high_failure_city",
            Self::CompareFailureRateGeo => "compare_failure_rate_geo",
            Self::GetHighFailureProducts => "get_high_failure_products",
            Self::GetCancellationReasons => "get_cancellation_reasons",
            Self::FindRevenueAnomaly => "find_revenue_anomaly",
            Self::GetGrossProfit => "get_gross_profit",
            Self::ExplainSalesFunnel => "explain_sales_funnel",
            Self::GetDeliveredRevenue => "get_delivered_revenue",
        }
    }

    /// Returns a human-readable description of the intent.
    pub fn description(&self) -> &'static str {
        match self {
            Self::GetHelp => "List what the assistant can answer",
            Self::ExplainTerm => "Define a business glossary term",
            Self::SuggestImprovementForHighFailureCity => {
                "Suggest improvements for a city with delivery failures"
            }
            Self::CompareFailureRateGeo => "Compare order failure rates of two countries",
            Self::GetHighFailureProducts => "Find products failing most often after shipping",
            Self::GetCancellationReasons => "Break down cancellation and failure reasons",
            Self::FindRevenueAnomaly => "Find unusual changes in delivered revenue",
            Self::GetGrossProfit => "Report gross profit on delivered orders",
            Self::ExplainSalesFunnel => "Explain order progression through the sales funnel",
            Self::GetDeliveredRevenue => "Report revenue from delivered orders",
        }
    }

    /// Intents answered without touching the data store.
    pub fn is_self_contained(&self) -> bool {
        matches!(self, Self::GetHelp | Self::ExplainTerm)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation granularity for time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGrain {
    Day,
}

impl TimeGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
        }
    }
}

/// Validated slots extracted for an intent.
///
/// Fields serialize in declaration order and absent slots are omitted, so
/// the JSON form is the ordered parameter mapping handed to downstream
/// collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_grain: Option<TimeGrain>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_countries(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.countries = Some([first.into(), second.into()]);
        self
    }

    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn with_time_grain(mut self, grain: TimeGrain) -> Self {
        self.time_grain = Some(grain);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Outcome of classifying one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    /// A rule fired and its slots validated.
    Matched { intent: Intent, context: Context },
    /// A rule recognised the question but could not resolve a required entity.
    Ambiguous { error: ClassificationError },
    /// No rule fired.
    NoMatch { error: ClassificationError },
}

impl Classification {
    pub fn matched(intent: Intent, context: Context) -> Self {
        Self::Matched { intent, context }
    }

    pub fn intent(&self) -> Option<Intent> {
        match self {
            Self::Matched { intent, .. } => Some(*intent),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&Context> {
        match self {
            Self::Matched { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClassificationError> {
        match self {
            Self::Matched { .. } => None,
            Self::Ambiguous { error } | Self::NoMatch { error } => Some(error),
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn into_result(self) -> Result<(Intent, Context), ClassificationError> {
        match self {
            Self::Matched { intent, context } => Ok((intent, context)),
            Self::Ambiguous { error } | Self::NoMatch { error } => Err(error),
        }
    }
}
