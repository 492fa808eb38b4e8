//! Reporting period listing command

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use colored::Colorize;
use insight_nlp::Period;
use serde::Serialize;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct PeriodRow {
    key: &'static str,
    phrases: &'static [&'static str],
    start: NaiveDate,
    end: Option<NaiveDate>,
}

fn rows(today: NaiveDate) -> Vec<PeriodRow> {
    Period::ALL
        .iter()
        .map(|period| {
            let range = period.date_range(today);
            PeriodRow {
                key: period.as_str(),
                phrases: period.phrases(),
                start: range.start,
                end: range.end,
            }
        })
        .collect()
}

pub fn run(format: OutputFormat) -> Result<()> {
    let rows = rows(Utc::now().date_naive());

    if let Some(rendered) = output::format_structured(&rows, format)? {
        println!("{}", rendered);
        return Ok(());
    }

    for row in &rows {
        let end = row
            .end
            .map(|end| end.to_string())
            .unwrap_or_else(|| "open".to_string());
        println!("{} [{} .. {})", row.key.bold(), row.start, end);
        output::dimmed(&format!("  {}", row.phrases.join(", ")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_period_order() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let rows = rows(today);
        assert_eq!(rows.len(), Period::ALL.len());
        assert_eq!(rows[0].key, "last_quarter");
        assert_eq!(rows[0].start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rows[0].end, NaiveDate::from_ymd_opt(2024, 4, 1));
    }
}
