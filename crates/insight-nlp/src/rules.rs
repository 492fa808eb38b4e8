//! The ordered rule chain.
//!
//! Each [`Rule`] is a predicate over the normalized query plus an extraction
//! step. Rules run top to bottom and the first one that fires or rejects
//! ends the chain. The order is semantically significant: specific rules
//! sit before general ones so that overlapping keyword families (a
//! solution request naming a city also contains failure words, a funnel
//! question also contains "sales") resolve deterministically.

use tracing::{debug, trace, warn};

use crate::catalog::Catalog;
use crate::entity::{title_case, EntityExtractor};
use crate::error::{ClassificationError, EntityKind};
use crate::intent::{Classification, Context, Intent, TimeGrain};
use crate::lexicon::{self, contains_any};
use crate::period::Period;

/// A query after trim + lowercase normalization.
///
/// `original` keeps the caller's casing for the regex based extractors.
#[derive(Debug, Clone)]
pub struct QueryText<'a> {
    original: &'a str,
    lowered: String,
}

impl<'a> QueryText<'a> {
    pub fn new(raw: &'a str) -> Self {
        let original = raw.trim();
        Self {
            original,
            lowered: original.to_lowercase(),
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        contains_any(&self.lowered, phrases)
    }

    fn period_or(&self, default: Period) -> Period {
        Period::normalize(&self.lowered, default)
    }

    fn define_lead_in(&self) -> Option<&'static str> {
        lexicon::DEFINE_LEAD_INS.iter().copied().find(|lead_in| {
            self.lowered
                .strip_prefix(lead_in)
                .map_or(false, |rest| rest.starts_with(' '))
        })
    }
}

/// What a rule's extraction step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Fire(Intent, Context),
    Reject(ClassificationError),
    /// The predicate held but extraction did not settle the query;
    /// evaluation continues with the next rule.
    Pass,
}

/// State carried along the chain for one query.
#[derive(Debug, Default)]
pub struct MatchState {
    /// No rule writes this yet; kept so the revenue rule keeps its
    /// "no slots collected so far" guard.
    context: Context,
    /// Subject of a definition request whose term was not in the glossary.
    pub unknown_term: Option<String>,
}

type Predicate = fn(&QueryText<'_>) -> bool;
type Extractor = fn(&QueryText<'_>, &Catalog, &mut MatchState) -> RuleOutcome;

/// One (predicate, extractor) pair of the chain.
pub struct Rule {
    pub name: &'static str,
    predicate: Predicate,
    extract: Extractor,
}

impl Rule {
    pub const fn new(name: &'static str, predicate: Predicate, extract: Extractor) -> Self {
        Self {
            name,
            predicate,
            extract,
        }
    }
}

static STANDARD_RULES: [Rule; 10] = [
    Rule::new("help", is_help_request, help),
    Rule::new("define_term", is_definition_request, define_term),
    Rule::new("city_improvement", is_city_improvement_request, city_improvement),
    Rule::new("geo_failure_compare", is_geo_compare_request, geo_failure_compare),
    Rule::new("high_failure_products", is_high_failure_products_request, high_failure_products),
    Rule::new("cancellation_reasons", is_cancellation_reasons_request, cancellation_reasons),
    Rule::new("revenue_anomaly", is_revenue_anomaly_request, revenue_anomaly),
    Rule::new("gross_profit", is_gross_profit_request, gross_profit),
    Rule::new("sales_funnel", is_sales_funnel_request, sales_funnel),
    Rule::new("delivered_revenue", is_delivered_revenue_request, delivered_revenue),
];

/// Evaluates the rule chain in its fixed order.
pub struct RuleMatcher {
    rules: &'static [Rule],
}

impl RuleMatcher {
    pub fn new() -> Self {
        Self {
            rules: &STANDARD_RULES,
        }
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.name)
    }

    pub fn evaluate(&self, query: &QueryText<'_>, catalog: &Catalog) -> Classification {
        let mut state = MatchState::default();

        for rule in self.rules {
            if !(rule.predicate)(query) {
                continue;
            }
            trace!("Rule predicate held: {}", rule.name);

            match (rule.extract)(query, catalog, &mut state) {
                RuleOutcome::Fire(intent, context) => {
                    debug!(rule = rule.name, intent = %intent, "Rule fired");
                    return Classification::Matched { intent, context };
                }
                RuleOutcome::Reject(error) => {
                    warn!(rule = rule.name, "Rule rejected query: {}", error);
                    return Classification::Ambiguous { error };
                }
                RuleOutcome::Pass => trace!("Rule passed: {}", rule.name),
            }
        }

        warn!("Could not determine intent for query: '{}'", query.original());
        let error = match state.unknown_term {
            Some(term) => ClassificationError::unknown_term(term),
            None => ClassificationError::unrecognized(),
        };
        Classification::NoMatch { error }
    }
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new()
    }
}

// 1. Help

fn is_help_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::HELP)
}

fn help(_: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(Intent::GetHelp, Context::new())
}

// 2. Definition

fn is_definition_request(q: &QueryText<'_>) -> bool {
    q.define_lead_in().is_some()
}

fn define_term(q: &QueryText<'_>, catalog: &Catalog, state: &mut MatchState) -> RuleOutcome {
    let Some(lead_in) = q.define_lead_in() else {
        return RuleOutcome::Pass;
    };

    let extractor = EntityExtractor::new(catalog);
    let subject = extractor.definition_subject(&q.lowered()[lead_in.len()..]);

    match extractor.glossary_term(&subject) {
        Some(term) => RuleOutcome::Fire(Intent::ExplainTerm, Context::new().with_term(term)),
        None => {
            // Unknown terms deliberately continue down the chain.
            debug!("No glossary entry for '{}'", subject);
            if !subject.is_empty() {
                state.unknown_term = Some(subject);
            }
            RuleOutcome::Pass
        }
    }
}

// 3. City improvement suggestion

fn is_city_improvement_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::SOLUTION) && (q.has_any(lexicon::FAILURE) || q.has_any(lexicon::ISSUE))
}

fn city_improvement(q: &QueryText<'_>, catalog: &Catalog, _: &mut MatchState) -> RuleOutcome {
    let extractor = EntityExtractor::new(catalog);

    if let Some(city) = extractor.find_city(q.original()) {
        return RuleOutcome::Fire(
            Intent::SuggestImprovementForHighFailureCity,
            Context::new()
                .with_city(city)
                .with_period(Period::Last90Days),
        );
    }

    if q.has_any(lexicon::CITY) {
        return RuleOutcome::Reject(ClassificationError::ambiguous(
            EntityKind::City,
            "Which city are you asking about for improvement suggestions? \
             Please mention a specific city from our list (e.g., Algiers, Cairo).",
        ));
    }

    RuleOutcome::Pass
}

// 4. Geographic failure-rate comparison

fn is_geo_compare_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::COMPARE)
        && q.has_any(lexicon::FAILURE)
        && lexicon::has_pair_connective(q.lowered())
}

fn geo_failure_compare(q: &QueryText<'_>, catalog: &Catalog, _: &mut MatchState) -> RuleOutcome {
    let extractor = EntityExtractor::new(catalog);

    let Some((first_raw, second_raw)) = extractor.country_pair(q.original()) else {
        if q.has_any(lexicon::GEO) {
            return RuleOutcome::Reject(ClassificationError::ambiguous(
                EntityKind::Countries,
                "Please specify two countries clearly (e.g., '...between Algeria and Egypt').",
            ));
        }
        return RuleOutcome::Pass;
    };

    debug!(
        "Comparison captures: '{}', '{}'",
        title_case(&first_raw),
        title_case(&second_raw)
    );

    match (catalog.country(&first_raw), catalog.country(&second_raw)) {
        (Some(first), Some(second)) if first == second => {
            RuleOutcome::Reject(ClassificationError::ambiguous(
                EntityKind::Countries,
                "Please specify two different countries to compare (e.g., '...between Algeria and Egypt').",
            ))
        }
        (Some(first), Some(second)) => RuleOutcome::Fire(
            Intent::CompareFailureRateGeo,
            Context::new()
                .with_countries(first, second)
                .with_period(q.period_or(Period::LastMonth)),
        ),
        _ => RuleOutcome::Reject(ClassificationError::ambiguous(
            EntityKind::Countries,
            format!(
                "Sorry, I can only compare countries within {}.",
                catalog.country_list()
            ),
        )),
    }
}

// 5. High-failure products

fn is_high_failure_products_request(q: &QueryText<'_>) -> bool {
    (q.has_any(lexicon::PRODUCT) || q.has_any(lexicon::FAILURE))
        && (q.has_any(lexicon::SHIPPING) || q.has_any(lexicon::SEVERITY))
}

fn high_failure_products(q: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(
        Intent::GetHighFailureProducts,
        Context::new()
            .with_period(q.period_or(Period::Last90Days))
            .with_threshold(5)
            .with_top_n(5),
    )
}

// 6. Cancellation reasons

fn is_cancellation_reasons_request(q: &QueryText<'_>) -> bool {
    (q.has_any(lexicon::FAILURE) || q.has_any(lexicon::REASON))
        && (q.has_any(lexicon::REASON) || q.has_any(lexicon::BREAKDOWN))
}

fn cancellation_reasons(q: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(
        Intent::GetCancellationReasons,
        Context::new()
            .with_period(q.period_or(Period::Last90Days))
            .with_top_n(7),
    )
}

// 7. Revenue anomaly

fn is_revenue_anomaly_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::ANOMALY) && q.has_any(lexicon::REVENUE)
}

fn revenue_anomaly(_: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(
        Intent::FindRevenueAnomaly,
        Context::new()
            .with_period(Period::Last90Days)
            .with_time_grain(TimeGrain::Day),
    )
}

// 8. Gross profit

fn is_gross_profit_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::PROFIT)
}

fn gross_profit(q: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(
        Intent::GetGrossProfit,
        Context::new().with_period(q.period_or(Period::LastMonth)),
    )
}

// 9. Sales funnel

fn is_sales_funnel_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::EXPLAIN) && q.has_any(lexicon::FUNNEL)
}

fn sales_funnel(q: &QueryText<'_>, _: &Catalog, _: &mut MatchState) -> RuleOutcome {
    RuleOutcome::Fire(
        Intent::ExplainSalesFunnel,
        Context::new().with_period(q.period_or(Period::Last90Days)),
    )
}

// 10. Delivered revenue (catch-all for revenue mentions)

fn is_delivered_revenue_request(q: &QueryText<'_>) -> bool {
    q.has_any(lexicon::REVENUE)
}

fn delivered_revenue(q: &QueryText<'_>, _: &Catalog, state: &mut MatchState) -> RuleOutcome {
    let is_profit = q.has_any(lexicon::PROFIT);
    let is_anomaly = q.has_any(lexicon::ANOMALY);
    let is_failure_compare = q.has_any(lexicon::COMPARE) && q.has_any(lexicon::FAILURE);

    if !state.context.is_empty() || is_profit || is_anomaly || is_failure_compare {
        return RuleOutcome::Pass;
    }

    RuleOutcome::Fire(
        Intent::GetDeliveredRevenue,
        Context::new().with_period(q.period_or(Period::LastMonth)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(query: &str) -> Classification {
        RuleMatcher::new().evaluate(&QueryText::new(query), &Catalog::builtin())
    }

    fn run_rule(name: &str, query: &str) -> RuleOutcome {
        let rule = STANDARD_RULES.iter().find(|r| r.name == name).unwrap();
        let query = QueryText::new(query);
        assert!((rule.predicate)(&query), "predicate of {} should hold", name);
        (rule.extract)(&query, &Catalog::builtin(), &mut MatchState::default())
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = RuleMatcher::new().rule_names().collect();
        assert_eq!(
            names,
            vec![
                "help",
                "define_term",
                "city_improvement",
                "geo_failure_compare",
                "high_failure_products",
                "cancellation_reasons",
                "revenue_anomaly",
                "gross_profit",
                "sales_funnel",
                "delivered_revenue",
            ]
        );
    }

    #[test]
    fn test_query_text_normalization() {
        let q = QueryText::new("  What IS AOV?  ");
        assert_eq!(q.original(), "What IS AOV?");
        assert_eq!(q.lowered(), "what is aov?");
        assert_eq!(q.define_lead_in(), Some("what is"));
    }

    #[test]
    fn test_lead_in_requires_following_space() {
        assert_eq!(QueryText::new("defined revenue").define_lead_in(), None);
        assert_eq!(QueryText::new("define").define_lead_in(), None);
        assert_eq!(QueryText::new("what's cod").define_lead_in(), Some("what's"));
    }

    #[test]
    fn test_city_rule_passes_without_city_or_city_keyword() {
        assert_eq!(
            run_rule("city_improvement", "how do we fix failed orders"),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_geo_rule_passes_without_captures_or_geo_keyword() {
        assert_eq!(
            run_rule("geo_failure_compare", "compare failure rate, between us and them?"),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_geo_rule_rejects_same_country_twice() {
        let outcome = run_rule(
            "geo_failure_compare",
            "compare failure rate between Egypt and egypt",
        );
        assert!(matches!(
            outcome,
            RuleOutcome::Reject(ClassificationError::AmbiguousEntity {
                entity: EntityKind::Countries,
                ..
            })
        ));
    }

    #[test]
    fn test_revenue_rule_guards() {
        let outcome = run_rule("delivered_revenue", "compare revenue failure rate");
        assert_eq!(outcome, RuleOutcome::Pass);

        let query = QueryText::new("revenue");
        let mut state = MatchState {
            context: Context::new().with_city("Cairo"),
            unknown_term: None,
        };
        assert_eq!(
            delivered_revenue(&query, &Catalog::builtin(), &mut state),
            RuleOutcome::Pass
        );
    }

    #[test]
    fn test_unknown_definition_surfaces_in_fallback() {
        let outcome = run("what is churn?");
        assert_eq!(
            outcome,
            Classification::NoMatch {
                error: ClassificationError::unknown_term("churn"),
            }
        );
    }

    #[test]
    fn test_fallback_is_unrecognized() {
        assert_eq!(
            run("tell me a joke"),
            Classification::NoMatch {
                error: ClassificationError::unrecognized(),
            }
        );
    }
}
