//! Classification facade.
//!
//! Normalizes a raw query and runs the rule chain against the catalog.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::intent::Classification;
use crate::rules::{QueryText, RuleMatcher};
use crate::NlpEngine;

/// Rule based implementation of [`NlpEngine`].
///
/// Holds only immutable tables, so one instance can be shared across any
/// number of concurrent callers.
pub struct NlpEngineImpl {
    catalog: Arc<Catalog>,
    matcher: RuleMatcher,
}

impl NlpEngineImpl {
    /// Creates an engine over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(Catalog::builtin()))
    }

    /// Creates an engine over a custom catalog.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        info!(
            "Initializing NLP engine ({} countries, {} cities, {} glossary terms)",
            catalog.countries().len(),
            catalog.cities().len(),
            catalog.glossary().len()
        );
        Self {
            catalog,
            matcher: RuleMatcher::new(),
        }
    }
}

impl Default for NlpEngineImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl NlpEngine for NlpEngineImpl {
    #[instrument(skip(self), fields(query_len = query.len()))]
    fn classify(&self, query: &str) -> Classification {
        debug!("Classifying query");

        let text = QueryText::new(query);
        let outcome = self.matcher.evaluate(&text, &self.catalog);

        match &outcome {
            Classification::Matched { intent, context } => {
                info!("Intent: {}, context: {:?}", intent, context)
            }
            Classification::Ambiguous { error } | Classification::NoMatch { error } => {
                info!("No intent: {}", error)
            }
        }

        outcome
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
