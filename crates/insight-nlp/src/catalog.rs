//! Known-value tables: countries, cities and the glossary.
//!
//! A [`Catalog`] is built once at startup and shared read-only. Extraction
//! only ever accepts values from these tables.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::entity::title_case;
use crate::error::{NlpError, Result};

const KNOWN_COUNTRIES: &[&str] = &["Algeria", "Morocco", "Tunisia", "Libya", "Egypt"];

const KNOWN_CITIES_SAMPLE: &[&str] = &[
    "Algiers", "Oran", "Constantine", "Annaba", "Blida", "Setif", "Tlemcen",
    "Rabat", "Casablanca", "Marrakech", "Fes", "Tangier", "Agadir", "Meknes",
    "Tunis", "Sfax", "Sousse", "Kairouan", "Bizerte", "Gabes",
    "Tripoli", "Benghazi", "Misrata", "Tobruk", "Sabha",
    "Cairo", "Alexandria", "Giza", "Shubra El Kheima", "Port Said", "Suez", "Luxor",
];

const GLOSSARY: &[(&str, &str)] = &[
    ("aov", "Average Order Value (AOV) is the average amount of money each customer spends per transaction on successfully delivered orders."),
    ("delivered revenue", "Revenue generated only from orders successfully delivered and paid for."),
    ("gross profit", "Total delivered revenue minus the direct cost of the goods sold (COGS)."),
    ("failure rate", "The percentage of placed orders not successfully delivered (cancelled, refused, failed delivery)."),
    ("sales funnel", "A visualization showing how orders progress through key stages (Placed, Confirmed, Shipped, Delivered), highlighting drop-offs."),
    ("cod", "Cash on Delivery - payment method where customers pay in cash upon delivery."),
    ("kpi", "Key Performance Indicator - a measurable value demonstrating effectiveness."),
    ("revenue anomaly", "A significant spike or drop in revenue compared to recent trends."),
    ("high failure products", "Products with a notably high rate of refusal or delivery failure after shipping."),
    ("cancellation reasons", "The breakdown of stated reasons why orders were cancelled or failed delivery."),
];

lazy_static! {
    static ref BUILTIN: Catalog = Catalog::from_spec(CatalogSpec::default())
        .expect("built-in catalog tables are valid");
}

/// One glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
}

/// Serializable form of the catalog, as found in a YAML override file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub countries: Vec<String>,
    pub cities: Vec<String>,
    pub glossary: Vec<GlossaryEntry>,
}

impl Default for CatalogSpec {
    fn default() -> Self {
        Self {
            countries: KNOWN_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            cities: KNOWN_CITIES_SAMPLE.iter().map(|c| c.to_string()).collect(),
            glossary: GLOSSARY
                .iter()
                .map(|(term, definition)| GlossaryEntry {
                    term: term.to_string(),
                    definition: definition.to_string(),
                })
                .collect(),
        }
    }
}

/// A known city with its whole-word, case-insensitive pattern.
#[derive(Debug, Clone)]
pub struct KnownCity {
    name: String,
    pattern: Regex,
}

impl KnownCity {
    fn new(name: String) -> Result<Self> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&name)))?;
        Ok(Self { name, pattern })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the city occurs as a whole word in `text`.
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Validated, immutable known-value tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    countries: Vec<String>,
    cities: Vec<KnownCity>,
    glossary: Vec<GlossaryEntry>,
}

impl Catalog {
    /// The tables compiled into the binary.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Validates a spec and compiles its city patterns.
    ///
    /// Glossary terms are stored lowercased; order is preserved because the
    /// substring fallback of term lookup takes the first hit.
    pub fn from_spec(spec: CatalogSpec) -> Result<Self> {
        if spec.countries.is_empty() {
            return Err(NlpError::catalog("at least one country is required"));
        }

        let countries = spec
            .countries
            .iter()
            .map(|c| c.trim().to_string())
            .collect::<Vec<_>>();
        if countries.iter().any(|c| c.is_empty()) {
            return Err(NlpError::catalog("country names cannot be empty"));
        }

        let cities = spec
            .cities
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(KnownCity::new)
            .collect::<Result<Vec<_>>>()?;

        let mut glossary: Vec<GlossaryEntry> = Vec::with_capacity(spec.glossary.len());
        for entry in spec.glossary {
            let term = entry.term.trim().to_lowercase();
            if term.is_empty() {
                return Err(NlpError::catalog("glossary terms cannot be empty"));
            }
            if glossary.iter().any(|e| e.term == term) {
                return Err(NlpError::catalog(format!("duplicate glossary term '{}'", term)));
            }
            glossary.push(GlossaryEntry {
                term,
                definition: entry.definition,
            });
        }

        debug!(
            countries = countries.len(),
            cities = cities.len(),
            terms = glossary.len(),
            "Catalog built"
        );

        Ok(Self {
            countries,
            cities,
            glossary,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let spec: CatalogSpec = serde_yaml::from_str(yaml)?;
        Self::from_spec(spec)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn cities(&self) -> &[KnownCity] {
        &self.cities
    }

    pub fn glossary(&self) -> &[GlossaryEntry] {
        &self.glossary
    }

    /// Canonical spelling of a known country, compared on title case.
    pub fn country(&self, candidate: &str) -> Option<&str> {
        let wanted = title_case(candidate.trim());
        self.countries
            .iter()
            .find(|known| title_case(known) == wanted)
            .map(String::as_str)
    }

    /// Definition for an exact (case-insensitive) glossary term.
    pub fn definition(&self, term: &str) -> Option<&str> {
        let term = term.trim().to_lowercase();
        self.glossary
            .iter()
            .find(|e| e.term == term)
            .map(|e| e.definition.as_str())
    }

    /// The allowed countries as a display list, e.g. for error messages.
    pub fn country_list(&self) -> String {
        self.countries.join(", ")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
