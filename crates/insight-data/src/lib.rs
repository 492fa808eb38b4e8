//! # Insight Data
//!
//! Retrieves the figures behind a classified question. Each analytical
//! intent maps to one aggregation; the result comes back as a typed
//! [`FetchedData`] variant ready for narrative generation.

pub mod error;
pub mod model;
pub mod postgres;

pub use error::{DataError, Result};
pub use model::{
    CityFailureReport, CountryFailureStats, FetchedData, FunnelStage, ProductFailure,
    ReasonCount, RevenueChange,
};
pub use postgres::{PgDataAccess, QueryPlan};

use async_trait::async_trait;
use insight_nlp::{Context, Intent};

/// Data retrieval for classified queries.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Fetches the data an intent needs, using the validated slots in
    /// `context`. Intents answered without data yield [`FetchedData::Nothing`].
    async fn fetch(&self, intent: Intent, context: &Context) -> Result<FetchedData>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<()>;
}
