//! Typed results of the per-intent queries.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One cancellation or delivery-failure reason with its order count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ReasonCount {
    pub cancellation_reason: String,
    pub reason_count: i64,
}

/// Failure statistics and dominant reasons for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityFailureReport {
    pub city: String,
    pub total_orders: i64,
    pub failed_orders: i64,
    pub failure_rate_percent: f64,
    pub top_cancellation_reasons: Vec<ReasonCount>,
}

/// Order count reaching one funnel stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FunnelStage {
    pub stage: String,
    pub order_count: i64,
}

/// Failure statistics for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryFailureStats {
    pub country: String,
    pub total: i64,
    pub failed: i64,
    pub failure_rate: f64,
}

impl CountryFailureStats {
    pub fn new(country: impl Into<String>, total: i64, failed: i64) -> Self {
        Self {
            country: country.into(),
            total,
            failed,
            failure_rate: failure_rate(failed, total),
        }
    }

    /// Placeholder for a requested country without any orders.
    pub fn empty(country: impl Into<String>) -> Self {
        Self::new(country, 0, 0)
    }

    pub fn has_orders(&self) -> bool {
        self.total > 0
    }
}

/// A product with a notable post-shipping failure rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFailure {
    pub product_name: String,
    pub times_shipped: i64,
    pub times_failed_post_ship: i64,
    pub failure_rate_percent: f64,
}

/// Revenue of one period next to the period before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RevenueChange {
    pub period_str: String,
    pub period_revenue: f64,
    pub prev_period_revenue: f64,
    pub revenue_change: f64,
}

impl RevenueChange {
    pub fn is_increase(&self) -> bool {
        self.revenue_change > 0.0
    }
}

/// Data handed to narrative generation, one shape per intent family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum FetchedData {
    /// Intents answered without data.
    Nothing,
    /// A single money figure (delivered revenue, gross profit).
    Amount(f64),
    CityFailure(CityFailureReport),
    CancellationReasons(Vec<ReasonCount>),
    Funnel(Vec<FunnelStage>),
    /// One entry per requested country, in request order.
    CountryFailure(Vec<CountryFailureStats>),
    HighFailureProducts(Vec<ProductFailure>),
    RevenueChanges(Vec<RevenueChange>),
}

impl FetchedData {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Amount(_) => "amount",
            Self::CityFailure(_) => "city_failure",
            Self::CancellationReasons(_) => "cancellation_reasons",
            Self::Funnel(_) => "funnel",
            Self::CountryFailure(_) => "country_failure",
            Self::HighFailureProducts(_) => "high_failure_products",
            Self::RevenueChanges(_) => "revenue_changes",
        }
    }

    /// Number of records carried; scalars and reports count as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Nothing => 0,
            Self::Amount(_) | Self::CityFailure(_) => 1,
            Self::CancellationReasons(rows) => rows.len(),
            Self::Funnel(rows) => rows.len(),
            Self::CountryFailure(rows) => rows.len(),
            Self::HighFailureProducts(rows) => rows.len(),
            Self::RevenueChanges(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Percentage of `failed` over `total`, rounded to one decimal. Zero when
/// there are no orders.
pub fn failure_rate(failed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round1(failed as f64 * 100.0 / total as f64)
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arranges per-country rows in `requested` order, filling countries the
/// query returned nothing for with zero statistics.
pub fn order_country_stats(
    requested: &[String],
    rows: Vec<CountryFailureStats>,
) -> Vec<CountryFailureStats> {
    requested
        .iter()
        .map(|country| {
            rows.iter()
                .find(|row| &row.country == country)
                .cloned()
                .unwrap_or_else(|| CountryFailureStats::empty(country.clone()))
        })
        .collect()
}
