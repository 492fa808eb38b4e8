//! Answers that need neither data nor a model call.

use insight_nlp::{Catalog, Context, Intent};

/// Capabilities overview returned for help requests.
pub const HELP_TEXT: &str = "I can provide insights on:\n\
*   **Delivered Revenue or Gross Profit:** Ask like 'What was delivered revenue last quarter?', 'gross profit last 7 days'\n\
*   **Sales Funnel:** 'Explain the sales funnel'\n\
*   **Failure Rate Comparison:** 'Compare failure rate between Algeria and Egypt'\n\
*   **Problem Products:** 'Which products have high failure rates after shipping?'\n\
*   **Cancellation Reasons:** 'Show cancellation reason breakdown'\n\
*   **Revenue Anomalies:** 'Any unusual revenue changes lately?'\n\
*   **Solutions for Problem Cities:** 'Improve delivery issues for Cairo'\n\
*   **Definitions:** 'What is AOV?', 'define COD'\n\
\n\
**Tips:** Specify time periods (last month, last 90 days, etc.) for better results.";

/// Definition answer for a glossary term.
pub fn definition_answer(catalog: &Catalog, term: &str) -> String {
    let term = term.trim().to_lowercase();
    match catalog.definition(&term) {
        Some(definition) => format!("Okay, here's the definition for '{}': {}", term, definition),
        None => format!(
            "Sorry, I don't have a specific definition for '{}'. Try asking 'help'.",
            term
        ),
    }
}

/// The canned answer of a self-contained intent, `None` for intents that
/// need data.
pub fn answer(intent: Intent, context: &Context, catalog: &Catalog, query: &str) -> Option<String> {
    match intent {
        Intent::GetHelp => Some(HELP_TEXT.to_string()),
        Intent::ExplainTerm => {
            let term = context.term.as_deref().unwrap_or(query);
            Some(definition_answer(catalog, term))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_answer() {
        let catalog = Catalog::builtin();
        let answer = definition_answer(&catalog, "COD");
        assert_eq!(
            answer,
            "Okay, here's the definition for 'cod': Cash on Delivery - payment method where \
             customers pay in cash upon delivery."
        );
    }

    #[test]
    fn test_unknown_definition() {
        let catalog = Catalog::builtin();
        assert_eq!(
            definition_answer(&catalog, "churn"),
            "Sorry, I don't have a specific definition for 'churn'. Try asking 'help'."
        );
    }

    #[test]
    fn test_answer_only_for_self_contained_intents() {
        let catalog = Catalog::builtin();
        let help = answer(Intent::GetHelp, &Context::new(), &catalog, "help").unwrap();
        assert!(help.starts_with("I can provide insights on:"));
        assert!(help.contains("**Definitions:**"));

        let term = Context::new().with_term("aov");
        let explained = answer(Intent::ExplainTerm, &term, &catalog, "what is aov").unwrap();
        assert!(explained.contains("Average Order Value"));

        assert!(answer(Intent::GetGrossProfit, &Context::new(), &catalog, "profit").is_none());
    }
}
