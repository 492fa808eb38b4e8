//! PostgreSQL implementation of [`DataAccess`].
//!
//! One aggregation per intent against the `orders`, `order_items`,
//! `products` and `addresses` tables. Date windows come from
//! [`Period::date_range`] and are bound as parameters; open-ended windows
//! bind `NULL` for the end.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use insight_core::DatabaseConfig;
use insight_nlp::{Context, DateRange, Intent, Period, TimeGrain};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use crate::error::{DataError, Result};
use crate::model::{
    failure_rate, order_country_stats, round1, CityFailureReport, CountryFailureStats,
    FetchedData, FunnelStage, ProductFailure, ReasonCount, RevenueChange,
};
use crate::DataAccess;

/// Statuses counted as a failed order.
pub const FAILURE_STATUSES: [&str; 4] = [
    "Refused Delivery",
    "Delivery Failed",
    "Cancelled by Customer",
    "Cancelled by Admin",
];

/// Statuses counted as a failure once an order has shipped.
pub const POST_SHIP_FAILURE_STATUSES: [&str; 3] = ["Refused Delivery", "Delivery Failed", "Returned"];

/// Statuses of orders cancelled before shipping.
pub const CANCELLED_STATUSES: [&str; 2] = ["Cancelled by Customer", "Cancelled by Admin"];

/// Reasons listed in a city report.
const CITY_TOP_REASONS: i64 = 3;

/// Rows returned by the anomaly query.
const TOP_REVENUE_CHANGES: i64 = 5;

const DELIVERED_REVENUE_SQL: &str = r#"
    SELECT COALESCE(SUM(order_total), 0)::float8
    FROM public.orders
    WHERE order_status = 'Delivered'
      AND delivered_at >= $1::date
      AND ($2::date IS NULL OR delivered_at < $2::date)
"#;

const GROSS_PROFIT_SQL: &str = r#"
    SELECT COALESCE(SUM((oi.price_per_unit - COALESCE(oi.cost_per_unit, 0)) * oi.quantity), 0)::float8
    FROM public.order_items oi
    JOIN public.orders o ON oi.order_id = o.order_id
    WHERE o.order_status = 'Delivered'
      AND o.delivered_at >= $1::date
      AND ($2::date IS NULL OR o.delivered_at < $2::date)
"#;

const CITY_STATS_SQL: &str = r#"
    SELECT COUNT(DISTINCT o.order_id) AS total_orders,
           COUNT(DISTINCT o.order_id) FILTER (WHERE o.order_status = ANY($2)) AS failed_orders
    FROM public.orders o
    JOIN public.addresses a ON o.shipping_address_id = a.address_id
    WHERE a.city = $1
      AND a.country IS NOT NULL
      AND o.order_date >= $3::date
      AND ($4::date IS NULL OR o.order_date < $4::date)
"#;

const CITY_REASONS_SQL: &str = r#"
    SELECT o.cancellation_reason, COUNT(DISTINCT o.order_id) AS reason_count
    FROM public.orders o
    JOIN public.addresses a ON o.shipping_address_id = a.address_id
    WHERE a.city = $1
      AND o.order_status = ANY($2)
      AND o.cancellation_reason IS NOT NULL
      AND o.order_date >= $3::date
      AND ($4::date IS NULL OR o.order_date < $4::date)
    GROUP BY o.cancellation_reason
    ORDER BY reason_count DESC
    LIMIT $5
"#;

const CANCELLATION_REASONS_SQL: &str = r#"
    SELECT cancellation_reason, COUNT(DISTINCT order_id) AS reason_count
    FROM public.orders
    WHERE order_status = ANY($1)
      AND cancellation_reason IS NOT NULL
      AND order_date >= $2::date
      AND ($3::date IS NULL OR order_date < $3::date)
    GROUP BY cancellation_reason
    ORDER BY reason_count DESC
    LIMIT $4
"#;

const FUNNEL_SQL: &str = r#"
    SELECT '1. Placed' AS stage, COUNT(DISTINCT order_id) AS order_count
    FROM public.orders
    WHERE order_date >= $1::date
    UNION ALL
    SELECT '2. Confirmed/Processing', COUNT(DISTINCT order_id)
    FROM public.orders
    WHERE order_date >= $1::date
      AND order_status <> 'Pending Confirmation'
      AND order_status <> ALL($2)
    UNION ALL
    SELECT '3. Shipped', COUNT(DISTINCT order_id)
    FROM public.orders
    WHERE order_date >= $1::date
      AND shipped_at IS NOT NULL
      AND order_status <> ALL($2)
    UNION ALL
    SELECT '4. Delivered', COUNT(DISTINCT order_id)
    FROM public.orders
    WHERE order_date >= $1::date
      AND order_status = 'Delivered'
    ORDER BY stage ASC
"#;

const COUNTRY_FAILURE_SQL: &str = r#"
    SELECT a.country,
           COUNT(DISTINCT o.order_id) AS total_orders,
           COUNT(DISTINCT o.order_id) FILTER (WHERE o.order_status = ANY($2)) AS failed_orders
    FROM public.orders o
    JOIN public.addresses a ON o.shipping_address_id = a.address_id
    WHERE a.country = ANY($1)
      AND o.order_date >= $3::date
      AND ($4::date IS NULL OR o.order_date < $4::date)
    GROUP BY a.country
"#;

const HIGH_FAILURE_PRODUCTS_SQL: &str = r#"
    WITH product_shipments AS (
        SELECT oi.product_id,
               COUNT(DISTINCT o.order_id) AS times_shipped,
               COUNT(DISTINCT o.order_id) FILTER (WHERE o.order_status = ANY($1)) AS times_failed
        FROM public.order_items oi
        JOIN public.orders o ON oi.order_id = o.order_id
        WHERE o.shipped_at IS NOT NULL
          AND o.order_date >= $2::date
          AND o.order_status <> ALL($3)
        GROUP BY oi.product_id
    )
    SELECT p.product_name,
           ps.times_shipped,
           ps.times_failed,
           (CASE WHEN ps.times_shipped = 0 THEN 0.0
                 ELSE ps.times_failed * 100.0 / ps.times_shipped END)::float8 AS failure_rate
    FROM product_shipments ps
    JOIN public.products p ON ps.product_id = p.product_id
    WHERE ps.times_shipped >= $4
    ORDER BY failure_rate DESC, ps.times_failed DESC
    LIMIT $5
"#;

const REVENUE_CHANGES_SQL: &str = r#"
    WITH period_revenue AS (
        SELECT DATE_TRUNC($1::text, delivered_at) AS period_start,
               SUM(order_total) AS revenue
        FROM public.orders
        WHERE order_status = 'Delivered'
          AND delivered_at >= $2::date
        GROUP BY period_start
    ),
    with_previous AS (
        SELECT period_start,
               revenue,
               LAG(revenue, 1, 0.0) OVER (ORDER BY period_start ASC) AS previous_revenue
        FROM period_revenue
    )
    SELECT TO_CHAR(period_start, 'YYYY-MM-DD') AS period_str,
           revenue::float8 AS period_revenue,
           previous_revenue::float8 AS prev_period_revenue,
           (revenue - previous_revenue)::float8 AS revenue_change
    FROM with_previous
    WHERE revenue IS NOT NULL AND previous_revenue IS NOT NULL
    ORDER BY ABS(revenue - previous_revenue) DESC
    LIMIT $3
"#;

/// [`DataAccess`] over a PostgreSQL connection pool.
#[derive(Clone, Debug)]
pub struct PgDataAccess {
    pool: PgPool,
}

impl PgDataAccess {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool that connects on first use, so the service can start
    /// while the database is still unreachable.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        info!("Configuring database pool for {}", mask_database_url(&config.url));

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_lazy(&config.url)
            .map_err(|e| DataError::connection(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn delivered_revenue(&self, range: DateRange) -> Result<f64> {
        let revenue = sqlx::query_scalar::<_, f64>(DELIVERED_REVENUE_SQL)
            .bind(range.start)
            .bind(range.end)
            .fetch_one(&self.pool)
            .await?;
        Ok(revenue)
    }

    async fn gross_profit(&self, range: DateRange) -> Result<f64> {
        let profit = sqlx::query_scalar::<_, f64>(GROSS_PROFIT_SQL)
            .bind(range.start)
            .bind(range.end)
            .fetch_one(&self.pool)
            .await?;
        Ok(profit)
    }

    async fn city_failure(&self, city: &str, range: DateRange) -> Result<CityFailureReport> {
        let (total_orders, failed_orders) = sqlx::query_as::<_, (i64, i64)>(CITY_STATS_SQL)
            .bind(city)
            .bind(&FAILURE_STATUSES[..])
            .bind(range.start)
            .bind(range.end)
            .fetch_one(&self.pool)
            .await?;

        let top_cancellation_reasons = sqlx::query_as::<_, ReasonCount>(CITY_REASONS_SQL)
            .bind(city)
            .bind(&FAILURE_STATUSES[..])
            .bind(range.start)
            .bind(range.end)
            .bind(CITY_TOP_REASONS)
            .fetch_all(&self.pool)
            .await?;

        Ok(CityFailureReport {
            city: city.to_string(),
            total_orders,
            failed_orders,
            failure_rate_percent: failure_rate(failed_orders, total_orders),
            top_cancellation_reasons,
        })
    }

    async fn cancellation_reasons(&self, range: DateRange, top_n: i64) -> Result<Vec<ReasonCount>> {
        let reasons = sqlx::query_as::<_, ReasonCount>(CANCELLATION_REASONS_SQL)
            .bind(&FAILURE_STATUSES[..])
            .bind(range.start)
            .bind(range.end)
            .bind(top_n)
            .fetch_all(&self.pool)
            .await?;
        Ok(reasons)
    }

    async fn funnel(&self, since: NaiveDate) -> Result<Vec<FunnelStage>> {
        let stages = sqlx::query_as::<_, FunnelStage>(FUNNEL_SQL)
            .bind(since)
            .bind(&CANCELLED_STATUSES[..])
            .fetch_all(&self.pool)
            .await?;
        Ok(stages)
    }

    async fn country_failure(
        &self,
        countries: &[String],
        range: DateRange,
    ) -> Result<Vec<CountryFailureStats>> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(COUNTRY_FAILURE_SQL)
            .bind(countries)
            .bind(&FAILURE_STATUSES[..])
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await?;
        debug!("Country rows: {:?}", rows);

        let stats = rows
            .into_iter()
            .map(|(country, total, failed)| CountryFailureStats::new(country, total, failed))
            .collect();
        Ok(order_country_stats(countries, stats))
    }

    async fn high_failure_products(
        &self,
        since: NaiveDate,
        threshold: i64,
        top_n: i64,
    ) -> Result<Vec<ProductFailure>> {
        let rows = sqlx::query_as::<_, (String, i64, i64, f64)>(HIGH_FAILURE_PRODUCTS_SQL)
            .bind(&POST_SHIP_FAILURE_STATUSES[..])
            .bind(since)
            .bind(&CANCELLED_STATUSES[..])
            .bind(threshold)
            .bind(top_n)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(product_name, times_shipped, times_failed_post_ship, rate)| ProductFailure {
                product_name,
                times_shipped,
                times_failed_post_ship,
                failure_rate_percent: round1(rate),
            })
            .collect())
    }

    async fn revenue_changes(&self, grain: TimeGrain, since: NaiveDate) -> Result<Vec<RevenueChange>> {
        let changes = sqlx::query_as::<_, RevenueChange>(REVENUE_CHANGES_SQL)
            .bind(grain.as_str())
            .bind(since)
            .bind(TOP_REVENUE_CHANGES)
            .fetch_all(&self.pool)
            .await?;
        Ok(changes)
    }
}

#[async_trait]
impl DataAccess for PgDataAccess {
    #[instrument(skip(self, context), fields(intent = %intent))]
    async fn fetch(&self, intent: Intent, context: &Context) -> Result<FetchedData> {
        let today = Utc::now().date_naive();
        let plan = QueryPlan::for_intent(intent, context, today)?;
        debug!("Query plan: {:?}", plan);

        let data = match plan {
            QueryPlan::Nothing => FetchedData::Nothing,
            QueryPlan::DeliveredRevenue(range) => {
                FetchedData::Amount(self.delivered_revenue(range).await?)
            }
            QueryPlan::GrossProfit(range) => FetchedData::Amount(self.gross_profit(range).await?),
            QueryPlan::CityFailure { city, range } => {
                FetchedData::CityFailure(self.city_failure(&city, range).await?)
            }
            QueryPlan::CancellationReasons { range, top_n } => {
                FetchedData::CancellationReasons(self.cancellation_reasons(range, top_n).await?)
            }
            QueryPlan::Funnel { since } => FetchedData::Funnel(self.funnel(since).await?),
            QueryPlan::CountryFailure { countries, range } => {
                FetchedData::CountryFailure(self.country_failure(&countries, range).await?)
            }
            QueryPlan::HighFailureProducts {
                since,
                threshold,
                top_n,
            } => FetchedData::HighFailureProducts(
                self.high_failure_products(since, threshold, top_n).await?,
            ),
            QueryPlan::RevenueChanges { grain, since } => {
                FetchedData::RevenueChanges(self.revenue_changes(grain, since).await?)
            }
        };

        info!(kind = data.kind(), records = data.len(), "Data fetched");
        Ok(data)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Resolved parameters of the query behind one intent.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    Nothing,
    DeliveredRevenue(DateRange),
    GrossProfit(DateRange),
    CityFailure { city: String, range: DateRange },
    CancellationReasons { range: DateRange, top_n: i64 },
    Funnel { since: NaiveDate },
    CountryFailure { countries: Vec<String>, range: DateRange },
    HighFailureProducts { since: NaiveDate, threshold: i64, top_n: i64 },
    RevenueChanges { grain: TimeGrain, since: NaiveDate },
}

impl QueryPlan {
    /// Resolves slots (falling back to per-intent defaults) into concrete
    /// query parameters relative to `today`.
    pub fn for_intent(intent: Intent, context: &Context, today: NaiveDate) -> Result<Self> {
        let period = |default: Period| context.period.unwrap_or(default);
        let since = |default: Period| today - Duration::days(period(default).lookback_days());

        let plan = match intent {
            Intent::GetHelp | Intent::ExplainTerm => Self::Nothing,
            Intent::GetDeliveredRevenue => {
                Self::DeliveredRevenue(period(Period::LastMonth).date_range(today))
            }
            Intent::GetGrossProfit => Self::GrossProfit(period(Period::LastMonth).date_range(today)),
            Intent::SuggestImprovementForHighFailureCity => {
                let city = context
                    .city
                    .clone()
                    .ok_or(DataError::MissingSlot("city"))?;
                Self::CityFailure {
                    city,
                    range: period(Period::Last90Days).date_range(today),
                }
            }
            Intent::GetCancellationReasons => Self::CancellationReasons {
                range: period(Period::Last90Days).date_range(today),
                top_n: positive("top_n", context.top_n, 7)?,
            },
            Intent::ExplainSalesFunnel => Self::Funnel {
                since: since(Period::Last90Days),
            },
            Intent::CompareFailureRateGeo => {
                let countries = context
                    .countries
                    .clone()
                    .ok_or(DataError::MissingSlot("countries"))?;
                Self::CountryFailure {
                    countries: countries.to_vec(),
                    range: period(Period::LastMonth).date_range(today),
                }
            }
            Intent::GetHighFailureProducts => Self::HighFailureProducts {
                since: since(Period::Last90Days),
                threshold: positive("threshold", context.threshold, 5)?,
                top_n: positive("top_n", context.top_n, 5)?,
            },
            Intent::FindRevenueAnomaly => Self::RevenueChanges {
                grain: context.time_grain.unwrap_or(TimeGrain::Day),
                since: since(Period::Last90Days),
            },
        };

        Ok(plan)
    }
}

fn positive(slot: &'static str, value: Option<u32>, default: u32) -> Result<i64> {
    match value.unwrap_or(default) {
        0 => Err(DataError::invalid_slot(slot, "must be a positive integer")),
        n => Ok(i64::from(n)),
    }
}

/// Hides the password of a connection URL for logging.
pub fn mask_database_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:****@{}", scheme, user, host),
        None => url.to_string(),
    }
}
