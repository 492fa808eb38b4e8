//! Per-intent prompt construction.
//!
//! Fetched data is rendered into a short plain-text summary plus task
//! instructions for the model. Empty results are answered directly without
//! a model call.

use insight_data::{
    CityFailureReport, CountryFailureStats, FetchedData, FunnelStage, ProductFailure,
    ReasonCount, RevenueChange,
};
use insight_nlp::{Context, Intent, Period, TimeGrain};

use crate::error::{NarrativeError, Result};

/// Default persona and business description placed before every prompt.
pub const DEFAULT_PREAMBLE: &str = "You are 'InsightBot', a BI assistant for a COD e-commerce \
business (PC Gaming Accessories, North Africa). Explain data insights clearly and concisely to a \
non-technical manager. Focus on the key takeaway and suggest areas for investigation or general \
types of solutions if applicable based on the data.";

/// What to do with one classified query.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPlan {
    /// Answer with this text, no model call needed.
    Direct(String),
    /// Ask the model.
    Model(DataPrompt),
}

/// Data summary and task for the model.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPrompt {
    pub data_summary: String,
    pub instructions: String,
}

impl DataPrompt {
    fn new(data_summary: String, instructions: String) -> Self {
        Self {
            data_summary,
            instructions,
        }
    }

    /// The full prompt sent to the model.
    pub fn render(&self, preamble: &str, query: &str) -> String {
        format!(
            "{}\n\nUser Query: '{}'\n\nRelevant Data Summary:\n```json\n{}\n```\n\nTask: {}\n\nResponse:",
            preamble, query, self.data_summary, self.instructions
        )
    }

    /// The answer used when the model merely repeats the data back.
    pub fn summary_answer(&self) -> String {
        format!("Data Summary:\n{}", self.data_summary)
    }

    /// Heuristic for a completion that only parrots the summary: it is short
    /// and contains the summary's first line once money formatting is
    /// stripped from both.
    pub fn is_echo(&self, narrative: &str) -> bool {
        let short = narrative.chars().count() < self.instructions.chars().count() + 30;
        let first_line = self.data_summary.trim().lines().next().unwrap_or_default();
        let first_line = strip_money(first_line);
        let flattened = strip_money(&narrative.replace('\n', " "));
        short && !first_line.is_empty() && flattened.contains(&first_line)
    }
}

/// Builds [`PromptPlan`]s for analytical intents.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }

    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn plan(&self, intent: Intent, context: &Context, data: &FetchedData) -> Result<PromptPlan> {
        let period = effective_period(intent, context).label();

        let plan = match (intent, data) {
            (Intent::SuggestImprovementForHighFailureCity, FetchedData::CityFailure(report)) => {
                PromptPlan::Model(city_prompt(report, &period))
            }
            (Intent::GetDeliveredRevenue, FetchedData::Amount(revenue)) => {
                let revenue = format_money(*revenue, 2);
                PromptPlan::Model(DataPrompt::new(
                    format!("Total delivered revenue for {}: {}", period, revenue),
                    format!(
                        "State the total delivered revenue ({}) for {} and briefly comment if this \
                         figure seems high or low in a general e-commerce context, if possible.",
                        revenue, period
                    ),
                ))
            }
            (Intent::GetGrossProfit, FetchedData::Amount(profit)) => {
                let profit = format_money(*profit, 2);
                PromptPlan::Model(DataPrompt::new(
                    format!("Gross profit ({}): {}", period, profit),
                    format!(
                        "State the gross profit ({}) from delivered orders for {}. Briefly explain \
                         what this figure represents for the business.",
                        profit, period
                    ),
                ))
            }
            (Intent::GetCancellationReasons, FetchedData::CancellationReasons(reasons)) => {
                if reasons.is_empty() {
                    PromptPlan::Direct(format!("No failed orders with reasons found ({}).", period))
                } else {
                    PromptPlan::Model(reasons_prompt(reasons, &period))
                }
            }
            (Intent::ExplainSalesFunnel, FetchedData::Funnel(stages)) => match funnel_prompt(stages, &period) {
                Some(prompt) => PromptPlan::Model(prompt),
                None => PromptPlan::Direct("No funnel data found.".to_string()),
            },
            (Intent::CompareFailureRateGeo, FetchedData::CountryFailure(stats)) => {
                match stats.as_slice() {
                    [first, second] => PromptPlan::Model(country_prompt(first, second, &period)),
                    _ => return Err(unexpected(intent, data)),
                }
            }
            (Intent::GetHighFailureProducts, FetchedData::HighFailureProducts(products)) => {
                let threshold = context.threshold.unwrap_or(5);
                if products.is_empty() {
                    PromptPlan::Direct(format!(
                        "Good news! No products shipped {}+ times had high post-shipping failure rates in {}.",
                        threshold, period
                    ))
                } else {
                    PromptPlan::Model(products_prompt(products, threshold, &period))
                }
            }
            (Intent::FindRevenueAnomaly, FetchedData::RevenueChanges(changes)) => {
                let grain = context.time_grain.unwrap_or(TimeGrain::Day).as_str();
                match changes.first() {
                    Some(top) => PromptPlan::Model(anomaly_prompt(changes, top, grain, &period)),
                    None => PromptPlan::Direct(format!(
                        "Analyzed recent revenue but found no major {}-over-{} changes.",
                        grain, grain
                    )),
                }
            }
            _ => return Err(unexpected(intent, data)),
        };

        Ok(plan)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(intent: Intent, data: &FetchedData) -> NarrativeError {
    NarrativeError::UnexpectedData {
        intent,
        kind: data.kind(),
    }
}

/// Period the data was fetched for: the slot if present, else the intent's
/// default window.
pub fn effective_period(intent: Intent, context: &Context) -> Period {
    let default = match intent {
        Intent::GetDeliveredRevenue | Intent::GetGrossProfit | Intent::CompareFailureRateGeo => {
            Period::LastMonth
        }
        _ => Period::Last90Days,
    };
    context.period.unwrap_or(default)
}

fn city_prompt(report: &CityFailureReport, period: &str) -> DataPrompt {
    let city = &report.city;
    let rate = report.failure_rate_percent;
    let reasons = if report.top_cancellation_reasons.is_empty() {
        "No specific top reasons logged for this city in the period.".to_string()
    } else {
        report
            .top_cancellation_reasons
            .iter()
            .map(|r| format!("- {} ({} orders)", r.cancellation_reason, r.reason_count))
            .collect::<Vec<_>>()
            .join("\n")
    };

    DataPrompt::new(
        format!(
            "City: {}\nFailure Rate ({}): {:.1}%\nTotal Placed: {}\nTotal Failed: {}\nTop Reasons in {}:\n{}",
            city, period, rate, report.total_orders, report.failed_orders, city, reasons
        ),
        format!(
            "The city of {city} has a failure rate of {rate:.1}%. Based on its top cancellation \
             reasons (if available), suggest 2-3 general areas the business should investigate OR \
             potential types of solutions to consider to reduce failures in {city}. Be practical \
             and actionable. If specific reasons are common (like 'Address validation failed'), \
             suggest related solutions. If reasons are more generic, suggest broader investigation \
             points."
        ),
    )
}

fn reasons_prompt(reasons: &[ReasonCount], period: &str) -> DataPrompt {
    let lines: Vec<String> = reasons
        .iter()
        .map(|r| format!("- {}: {} orders", r.cancellation_reason, r.reason_count))
        .collect();

    DataPrompt::new(
        format!("Top {} failure reasons ({}):\n{}", reasons.len(), period, lines.join("\n")),
        format!(
            "Summarize the top 2-3 most common failure reasons ({}). For each, briefly suggest \
             what kind of business area this points to (e.g., logistics, product info, customer \
             communication) and what general type of action might address it.",
            period
        ),
    )
}

fn funnel_prompt(stages: &[FunnelStage], period: &str) -> Option<DataPrompt> {
    let placed = stages.first()?.order_count;
    let delivered = stages.last()?.order_count;
    let conversion = if placed > 0 {
        format!("{:.1}%", delivered as f64 * 100.0 / placed as f64)
    } else {
        "N/A".to_string()
    };
    let lines: Vec<String> = stages
        .iter()
        .map(|s| format!("- {}: {} orders", s.stage, s.order_count))
        .collect();

    Some(DataPrompt::new(
        format!("Sales Funnel ({}):\n{}", period, lines.join("\n")),
        format!(
            "Explain this funnel (Placed: {}, Delivered: {}, Period: {}). Highlight overall \
             conversion ({}) & biggest drop-off stage. What does this imply for the business?",
            placed, delivered, period, conversion
        ),
    ))
}

fn country_line(stats: &CountryFailureStats, period: &str) -> String {
    if stats.has_orders() {
        format!(
            "{}: {:.1}% ({}/{}).",
            stats.country, stats.failure_rate, stats.failed, stats.total
        )
    } else {
        format!("No data for {} in {}.", stats.country, period)
    }
}

fn country_prompt(first: &CountryFailureStats, second: &CountryFailureStats, period: &str) -> DataPrompt {
    DataPrompt::new(
        format!(
            "Failure Rate Comparison ({}):\n{}\n{}",
            period,
            country_line(first, period),
            country_line(second, period)
        ),
        format!(
            "Compare failure rates between {} and {} ({}). State which was notably higher, \
             mentioning rates. What might this suggest about operations in those countries?",
            first.country, second.country, period
        ),
    )
}

fn products_prompt(products: &[ProductFailure], threshold: u32, period: &str) -> DataPrompt {
    let lines: Vec<String> = products
        .iter()
        .map(|p| {
            format!(
                "- {}: {:.1}% ({}/{})",
                p.product_name, p.failure_rate_percent, p.times_failed_post_ship, p.times_shipped
            )
        })
        .collect();

    DataPrompt::new(
        format!(
            "Top Products by Post-Ship Failure ({}, shipped >= {}):\n{}",
            period,
            threshold,
            lines.join("\n")
        ),
        format!(
            "Identify products with notable post-shipping failure rates ({}). Summarize, \
             highlighting top 1-2 products/rates. Mention min shipments ({}). What general issues \
             might cause high failure rates for these types of products (e.g. packaging, \
             description, defects)?",
            period, threshold
        ),
    )
}

fn anomaly_prompt(changes: &[RevenueChange], top: &RevenueChange, grain: &str, period: &str) -> DataPrompt {
    let lines: Vec<String> = changes
        .iter()
        .map(|c| {
            format!(
                "- {}: Change {} (Prev: {}, Curr: {})",
                c.period_str,
                format_money(c.revenue_change, 2),
                format_money(c.prev_period_revenue, 2),
                format_money(c.period_revenue, 2)
            )
        })
        .collect();
    let direction = if top.is_increase() { "increase" } else { "decrease" };

    DataPrompt::new(
        format!("Largest {}ly revenue changes ({}):\n{}", grain, period, lines.join("\n")),
        format!(
            "Describe the single biggest {}ly revenue anomaly ({}). Mention date ({}), direction \
             ({}), approx change ({}), and resulting revenue ({}). Suggest 1-2 common business \
             reasons for such a change (e.g., promotions, stock issues, external event).",
            grain,
            period,
            top.period_str,
            direction,
            format_money(top.revenue_change.abs(), 0),
            format_money(top.period_revenue, 0)
        ),
    )
}

fn strip_money(text: &str) -> String {
    text.replace(['$', ','], "")
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.50`.
pub fn format_money(value: f64, decimals: usize) -> String {
    let digits = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match fraction {
        Some(fraction) => format!("${}{}.{}", sign, grouped, fraction),
        None => format!("${}{}", sign, grouped),
    }
}
