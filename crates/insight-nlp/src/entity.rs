//! Entity extraction.
//!
//! Pulls slot values out of a query. Extraction never fails: absence is a
//! `None` and the rule chain decides whether that is an error or a
//! fall-through.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::catalog::Catalog;

lazy_static! {
    /// "between X and Y", stopping at end of input or a trailing clause.
    static ref BETWEEN_PAIR: Regex = Regex::new(
        r"(?i)between\s+([\w\s]+?)\s+and\s+([\w\s]+?)(?:$|\s+last|\s+in|\s+for)"
    ).unwrap();

    /// "X vs Y" / "X versus Y", same trailing boundary.
    static ref VERSUS_PAIR: Regex = Regex::new(
        r"(?i)([\w\s]+?)\s+(?:vs|versus)\s+([\w\s]+?)(?:$|\s+last|\s+in|\s+for)"
    ).unwrap();

    static ref LEADING_ARTICLE: Regex = Regex::new(r"(?i)^(an|a|the)\s+").unwrap();
}

/// Title casing: the first letter of every alphabetic run is
/// uppercased and the rest lowercased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

/// Slot extraction against a [`Catalog`].
pub struct EntityExtractor<'a> {
    catalog: &'a Catalog,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// First known city (in catalog order) mentioned as a whole word.
    pub fn find_city(&self, query: &str) -> Option<&'a str> {
        let city = self
            .catalog
            .cities()
            .iter()
            .find(|city| city.is_mentioned_in(query))
            .map(|city| city.name());
        trace!("City extraction: {:?}", city);
        city
    }

    /// Raw two-entity captures, "between/and" first, "vs/versus" second.
    ///
    /// Captures are trimmed but not validated.
    pub fn country_pair(&self, query: &str) -> Option<(String, String)> {
        let pair = capture_pair(&BETWEEN_PAIR, query).or_else(|| capture_pair(&VERSUS_PAIR, query));
        trace!("Pair extraction: {:?}", pair);
        pair
    }

    /// Cleans the text following a definitional lead-in: drops one leading
    /// article and every question mark, lowercases and trims.
    pub fn definition_subject(&self, remainder: &str) -> String {
        let stripped = LEADING_ARTICLE.replace(remainder.trim(), "");
        stripped.trim().to_lowercase().replace('?', "").trim().to_string()
    }

    /// Glossary key for a cleaned subject: exact match first, then the first
    /// glossary term (in glossary order) contained in the subject.
    pub fn glossary_term(&self, subject: &str) -> Option<&'a str> {
        let glossary = self.catalog.glossary();
        glossary
            .iter()
            .find(|entry| entry.term == subject)
            .or_else(|| glossary.iter().find(|entry| subject.contains(entry.term.as_str())))
            .map(|entry| entry.term.as_str())
    }
}

fn capture_pair(pattern: &Regex, query: &str) -> Option<(String, String)> {
    let caps = pattern.captures(query)?;
    let first = caps.get(1)?.as_str().trim();
    let second = caps.get(2)?.as_str().trim();
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}
