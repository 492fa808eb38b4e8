//! Keyword and phrase sets used by the rule chain.
//!
//! Matching is plain substring containment against the lowercased, trimmed
//! query. It is not tokenized: `"sales"` matches inside `"sales funnel"` and
//! `"info"` matches inside `"information"`. Rule order in [`crate::rules`]
//! accounts for these collisions, so keep every membership test going
//! through [`contains_any`].

pub const HELP: &[&str] = &["help", "what can you do", "capabilities", "commands", "info", "guide"];

/// Lead-ins that must open a definition request (followed by a space).
pub const DEFINE_LEAD_INS: &[&str] = &["what is", "what's", "define", "meaning of"];

pub const EXPLAIN: &[&str] = &[
    "explain",
    "describe",
    "show me",
    "tell me about",
    "details on",
    "what is",
    "what's",
    "define",
    "meaning of",
    "show",
];

pub const REVENUE: &[&str] = &[
    "revenue",
    "sales",
    "income",
    "takings",
    "money made",
    "value",
    "earnings",
    "amount made",
];

pub const PROFIT: &[&str] = &["profit", "margin", "gross profit", "profitability"];

pub const FUNNEL: &[&str] = &["funnel", "conversion", "pipeline", "stages", "process flow"];

pub const COMPARE: &[&str] = &["compare", "difference", "vs", "versus", "between", "comparison"];

pub const FAILURE: &[&str] = &[
    "failure rate",
    "failed orders",
    "refused",
    "cancelled",
    "cancellation rate",
    "return rate",
    "undelivered",
];

/// Softer problem wording accepted alongside [`FAILURE`] by the city rule.
pub const ISSUE: &[&str] = &["cancellations", "issues"];

pub const REASON: &[&str] = &["reason", "cause", "why", "breakdown"];

/// Wording that asks for a reason breakdown rather than a single figure.
pub const BREAKDOWN: &[&str] = &["breakdown", "summary", "distribution", "cancelled", "failing"];

pub const PRODUCT: &[&str] = &["product", "item", "sku", "merchandise", "goods"];

pub const SHIPPING: &[&str] = &["shipping", "shipped", "delivery", "fulfillment", "post-ship"];

pub const SEVERITY: &[&str] = &["high", "worst", "often"];

pub const GEO: &[&str] = &["country", "countries", "city", "cities", "region", "area", "location"];

pub const CITY: &[&str] = &["city", "cities"];

pub const ANOMALY: &[&str] = &[
    "anomaly",
    "anomalies",
    "unusual",
    "spike",
    "drop",
    "significant change",
    "biggest change",
    "outlier",
];

pub const SOLUTION: &[&str] = &[
    "solution",
    "solve",
    "fix",
    "improve",
    "address",
    "what can we do",
    "suggestion",
    "what to do about",
];

/// True when any phrase occurs as a substring of `haystack`.
///
/// `haystack` is expected to be lowercased already; phrases are lowercase.
pub fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    first_match(haystack, phrases).is_some()
}

/// The first phrase (in list order) occurring in `haystack`.
pub fn first_match<'p>(haystack: &str, phrases: &[&'p str]) -> Option<&'p str> {
    phrases.iter().copied().find(|phrase| haystack.contains(phrase))
}

/// True when the two-entity connective of a comparison is present.
pub fn has_pair_connective(haystack: &str) -> bool {
    (haystack.contains("between") && haystack.contains("and"))
        || haystack.contains("vs")
        || haystack.contains("versus")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_any_is_substring_based() {
        assert!(contains_any("explain the sales funnel", REVENUE));
        assert!(contains_any("more information please", HELP));
        assert!(!contains_any("", HELP));
    }

    #[test]
    fn test_first_match_follows_list_order() {
        assert_eq!(first_match("gross profit margin", PROFIT), Some("profit"));
        assert_eq!(first_match("nothing here", PROFIT), None);
    }

    #[test]
    fn test_matching_borrowed_phrases() {
        let owned = vec!["cash on delivery".to_string(), "cod".to_string()];
        let phrases: Vec<&str> = owned.iter().map(String::as_str).collect();

        assert!(contains_any("what does cod mean", &phrases));
        assert_eq!(first_match("what does cod mean", &phrases), Some("cod"));
        assert!(!contains_any("gross profit", &phrases));
    }

    #[test]
    fn test_pair_connective() {
        assert!(has_pair_connective("between algeria and egypt"));
        assert!(has_pair_connective("algeria vs egypt"));
        assert!(has_pair_connective("algeria versus egypt"));
        assert!(!has_pair_connective("between algeria"));
    }

    #[test]
    fn test_phrases_are_lowercase() {
        let all = [
            HELP, DEFINE_LEAD_INS, EXPLAIN, REVENUE, PROFIT, FUNNEL, COMPARE, FAILURE, ISSUE,
            REASON, BREAKDOWN, PRODUCT, SHIPPING, SEVERITY, GEO, CITY, ANOMALY, SOLUTION,
        ];
        for set in all {
            for phrase in set {
                assert_eq!(*phrase, phrase.to_lowercase());
            }
        }
    }
}
