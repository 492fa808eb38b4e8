//! # Insight NLP
//!
//! Intent classification and slot extraction for InsightFlow business
//! questions.
//!
//! A query runs through an ordered chain of keyword rules. The first rule
//! that fires yields an [`Intent`] and a validated [`Context`] of slots
//! (period, city, countries, glossary term, ...). A rule that recognises the
//! question but cannot resolve a named entity yields an ambiguity error, and
//! a query no rule understands yields a "not understood" error.
//!
//! ## Example
//!
//! ```rust
//! use insight_nlp::{Intent, NlpEngine, NlpEngineImpl, Period};
//!
//! let engine = NlpEngineImpl::new();
//! let outcome = engine.classify("revenue last 30 days");
//!
//! assert_eq!(outcome.intent(), Some(Intent::GetDeliveredRevenue));
//! assert_eq!(outcome.context().and_then(|c| c.period), Some(Period::Last30Days));
//! ```

pub mod catalog;
pub mod engine;
pub mod entity;
pub mod error;
pub mod intent;
pub mod lexicon;
pub mod period;
pub mod rules;

pub use catalog::{Catalog, CatalogSpec, GlossaryEntry};
pub use engine::NlpEngineImpl;
pub use entity::EntityExtractor;
pub use error::{ClassificationError, EntityKind, NlpError, Result};
pub use intent::{Classification, Context, Intent, TimeGrain};
pub use period::{DateRange, Period};

/// Query classification.
///
/// Classification is synchronous and deterministic: the same query always
/// yields the same outcome and no I/O is performed.
pub trait NlpEngine: Send + Sync {
    /// Classifies a raw user query.
    ///
    /// Never fails: an empty or meaningless query produces
    /// [`Classification::NoMatch`].
    fn classify(&self, query: &str) -> Classification;

    /// The known-value tables the engine validates against.
    fn catalog(&self) -> &Catalog;
}

// Convert to insight_core AppError
impl From<NlpError> for insight_core::AppError {
    fn from(err: NlpError) -> Self {
        insight_core::AppError::configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nlp_engine_basic() {
        let engine = NlpEngineImpl::new();
        let outcome = engine.classify("What is AOV?");
        assert_eq!(outcome.intent(), Some(Intent::ExplainTerm));
    }

    #[test]
    fn test_empty_query_is_not_understood() {
        let engine = NlpEngineImpl::new();
        let outcome = engine.classify("   ");
        assert_eq!(
            outcome.error(),
            Some(&ClassificationError::unrecognized())
        );
    }
}
