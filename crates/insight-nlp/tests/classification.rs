//! End-to-end classification tests over the built-in catalog.

use insight_nlp::{
    Classification, ClassificationError, Context, EntityKind, Intent, NlpEngine, NlpEngineImpl,
    Period, TimeGrain,
};

fn classify(query: &str) -> Classification {
    NlpEngineImpl::new().classify(query)
}

fn matched(intent: Intent, context: Context) -> Classification {
    Classification::matched(intent, context)
}

fn ambiguous_message(outcome: &Classification) -> &str {
    match outcome {
        Classification::Ambiguous { error } => error.message(),
        other => panic!("expected an ambiguity, got {:?}", other),
    }
}

// ==================== Literal cases ====================

#[test]
fn test_explain_term() {
    assert_eq!(
        classify("what is aov?"),
        matched(Intent::ExplainTerm, Context::new().with_term("aov"))
    );
    assert_eq!(
        classify("Define the Sales Funnel?"),
        matched(Intent::ExplainTerm, Context::new().with_term("sales funnel"))
    );
}

#[test]
fn test_help() {
    assert_eq!(classify("help"), matched(Intent::GetHelp, Context::new()));
    assert_eq!(classify("What can you do?"), matched(Intent::GetHelp, Context::new()));
}

#[test]
fn test_compare_failure_rate_between_countries() {
    assert_eq!(
        classify("Compare failure rate between Algeria and Egypt last quarter"),
        matched(
            Intent::CompareFailureRateGeo,
            Context::new()
                .with_countries("Algeria", "Egypt")
                .with_period(Period::LastQuarter)
        )
    );
}

#[test]
fn test_compare_defaults_to_last_month() {
    assert_eq!(
        classify("compare failure rate between morocco and tunisia"),
        matched(
            Intent::CompareFailureRateGeo,
            Context::new()
                .with_countries("Morocco", "Tunisia")
                .with_period(Period::LastMonth)
        )
    );
}

#[test]
fn test_compare_with_versus() {
    assert_eq!(
        classify("Morocco vs Tunisia for failed orders, compare"),
        matched(
            Intent::CompareFailureRateGeo,
            Context::new()
                .with_countries("Morocco", "Tunisia")
                .with_period(Period::LastMonth)
        )
    );
}

#[test]
fn test_suggest_improvement_for_city() {
    assert_eq!(
        classify("how can we improve delivery issues in Cairo"),
        matched(
            Intent::SuggestImprovementForHighFailureCity,
            Context::new().with_city("Cairo").with_period(Period::Last90Days)
        )
    );
}

#[test]
fn test_city_period_is_not_overridden() {
    let outcome = classify("fix cancellations in Oran last week");
    assert_eq!(
        outcome.context().and_then(|c| c.period),
        Some(Period::Last90Days)
    );
}

#[test]
fn test_unknown_country_names_allowed_list() {
    let outcome = classify("compare failure rate between Spain and Egypt");
    assert_eq!(
        ambiguous_message(&outcome),
        "Sorry, I can only compare countries within Algeria, Morocco, Tunisia, Libya, Egypt."
    );
}

#[test]
fn test_delivered_revenue() {
    assert_eq!(
        classify("revenue last 30 days"),
        matched(
            Intent::GetDeliveredRevenue,
            Context::new().with_period(Period::Last30Days)
        )
    );
    assert_eq!(
        classify("What was delivered revenue last quarter?"),
        matched(
            Intent::GetDeliveredRevenue,
            Context::new().with_period(Period::LastQuarter)
        )
    );
}

// ==================== Remaining intents ====================

#[test]
fn test_high_failure_products() {
    assert_eq!(
        classify("Which products have high failure rates after shipping?"),
        matched(
            Intent::GetHighFailureProducts,
            Context::new()
                .with_period(Period::Last90Days)
                .with_threshold(5)
                .with_top_n(5)
        )
    );
    assert_eq!(
        classify("worst items last 30 days").context().and_then(|c| c.period),
        Some(Period::Last30Days)
    );
}

#[test]
fn test_cancellation_reasons() {
    assert_eq!(
        classify("Show cancellation reason breakdown"),
        matched(
            Intent::GetCancellationReasons,
            Context::new().with_period(Period::Last90Days).with_top_n(7)
        )
    );
    assert_eq!(
        classify("why were orders cancelled last week"),
        matched(
            Intent::GetCancellationReasons,
            Context::new().with_period(Period::Last7Days).with_top_n(7)
        )
    );
}

#[test]
fn test_revenue_anomaly_keeps_fixed_window() {
    let expected = matched(
        Intent::FindRevenueAnomaly,
        Context::new()
            .with_period(Period::Last90Days)
            .with_time_grain(TimeGrain::Day),
    );
    assert_eq!(classify("Any unusual revenue changes lately?"), expected);
    assert_eq!(classify("revenue spike last 7 days"), expected);
}

#[test]
fn test_gross_profit() {
    assert_eq!(
        classify("gross profit last 7 days"),
        matched(Intent::GetGrossProfit, Context::new().with_period(Period::Last7Days))
    );
    assert_eq!(
        classify("profit margin this year"),
        matched(Intent::GetGrossProfit, Context::new().with_period(Period::YearToDate))
    );
}

#[test]
fn test_sales_funnel() {
    assert_eq!(
        classify("Explain the sales funnel"),
        matched(Intent::ExplainSalesFunnel, Context::new().with_period(Period::Last90Days))
    );
    assert_eq!(
        classify("show conversion stages for last 30 days"),
        matched(Intent::ExplainSalesFunnel, Context::new().with_period(Period::Last30Days))
    );
}

// ==================== Ambiguity and fallback ====================

#[test]
fn test_city_keyword_without_known_city() {
    let outcome = classify("suggest a fix for cancellations in our worst city");
    assert!(matches!(
        &outcome,
        Classification::Ambiguous {
            error: ClassificationError::AmbiguousEntity { entity: EntityKind::City, .. }
        }
    ));
    assert!(ambiguous_message(&outcome).contains("specific city"));
}

#[test]
fn test_geo_keyword_without_country_pair() {
    let outcome = classify("compare failure rate between countries and regions?");
    assert_eq!(
        ambiguous_message(&outcome),
        "Please specify two countries clearly (e.g., '...between Algeria and Egypt')."
    );
}

#[test]
fn test_versus_capture_includes_leading_words() {
    // The vs pattern anchors at the start of the word run, so leading words
    // end up in the first capture and fail validation.
    let outcome = classify("compare failure rate algeria vs egypt");
    assert!(ambiguous_message(&outcome).starts_with("Sorry, I can only compare countries"));
}

#[test]
fn test_empty_and_whitespace_queries() {
    for query in ["", "   ", "\t\n"] {
        assert_eq!(
            classify(query),
            Classification::NoMatch {
                error: ClassificationError::unrecognized()
            }
        );
    }
}

#[test]
fn test_unrecognized_message() {
    let outcome = classify("tell me a joke");
    assert_eq!(
        outcome.error().map(|e| e.message()),
        Some("Intent not understood. Try asking 'help'.")
    );
}

// ==================== Priority ordering ====================

#[test]
fn test_named_city_beats_country_comparison() {
    assert_eq!(
        classify("compare failure rate between Algeria and Egypt, any solution for Cairo?"),
        matched(
            Intent::SuggestImprovementForHighFailureCity,
            Context::new().with_city("Cairo").with_period(Period::Last90Days)
        )
    );
}

#[test]
fn test_solution_without_city_falls_through_to_comparison() {
    assert_eq!(
        classify("what solution do you suggest, compare failure rate between Algeria and Egypt"),
        matched(
            Intent::CompareFailureRateGeo,
            Context::new()
                .with_countries("Algeria", "Egypt")
                .with_period(Period::LastMonth)
        )
    );
}

#[test]
fn test_help_substring_collision() {
    // "info" inside "information" is a help keyword.
    assert_eq!(
        classify("give me information on revenue"),
        matched(Intent::GetHelp, Context::new())
    );
}

#[test]
fn test_funnel_beats_revenue_catch_all() {
    // "sales" is a revenue keyword, but the funnel rule comes first.
    assert_eq!(classify("explain sales funnel").intent(), Some(Intent::ExplainSalesFunnel));
}

#[test]
fn test_unknown_definition_falls_through_to_later_rules() {
    // A definitional lead-in with an unknown term is not an error.
    assert_eq!(
        classify("what is revenue last month"),
        matched(Intent::GetDeliveredRevenue, Context::new().with_period(Period::LastMonth))
    );
}

#[test]
fn test_revenue_with_failure_comparison_is_not_revenue() {
    assert!(matches!(
        classify("compare revenue failure rate"),
        Classification::NoMatch { .. }
    ));
}

// ==================== Properties ====================

#[test]
fn test_idempotent() {
    let engine = NlpEngineImpl::new();
    for query in [
        "help",
        "compare failure rate between Spain and Egypt",
        "gross profit ytd",
        "nonsense",
    ] {
        assert_eq!(engine.classify(query), engine.classify(query));
    }
}

#[test]
fn test_entity_matching_is_case_insensitive() {
    let upper = classify("how can we fix cancellations in CAIRO");
    let lower = classify("how can we fix cancellations in cairo");
    assert_eq!(upper, lower);
    assert_eq!(upper.context().and_then(|c| c.city.clone()), Some("Cairo".to_string()));
}

#[test]
fn test_matched_context_json_shape() {
    let outcome = classify("Compare failure rate between Algeria and Egypt last quarter");
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["outcome"], "matched");
    assert_eq!(value["intent"], "compare_failure_rate_geo");
    assert_eq!(
        value["context"],
        serde_json::json!({"countries": ["Algeria", "Egypt"], "period": "last_quarter"})
    );
}
