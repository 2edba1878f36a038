use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::io::Read;

/// Calendar quarter a wage row is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QuarterLabel {
    pub year: i32,
    pub quarter: u8,
}

impl QuarterLabel {
    /// Quarters elapsed since year zero, so consecutive quarters differ by one.
    pub(crate) fn ordinal(self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.quarter) - 1
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

#[derive(Debug)]
pub(crate) struct WageRow {
    pub(crate) line: u64,
    pub(crate) quarter: Option<QuarterLabel>,
    pub(crate) raw_quarter: String,
    pub(crate) wages: Option<f64>,
    pub(crate) raw_wages: String,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<WageRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<CsvRow>() {
        let row = record?;
        // Header is line 1.
        let line = rows.len() as u64 + 2;
        let raw_quarter = row.quarter.unwrap_or_default();
        let raw_wages = row.wages.unwrap_or_default();

        rows.push(WageRow {
            line,
            quarter: parse_quarter(&raw_quarter),
            wages: parse_amount(&raw_wages),
            raw_quarter,
            raw_wages,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(
        rename = "Quarter",
        alias = "quarter",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    quarter: Option<String>,
    #[serde(
        rename = "Wages",
        alias = "wages",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    wages: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts `2025Q1`, `2025-Q1`, `2025 Q1` and `Q1 2025`, case-insensitively.
fn parse_quarter(value: &str) -> Option<QuarterLabel> {
    let compact: String = value
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '/')
        .collect::<String>()
        .to_ascii_uppercase();

    let (year, quarter) = if let Some(rest) = compact.strip_prefix('Q') {
        let quarter = rest.get(..1)?;
        (rest.get(1..)?, quarter)
    } else {
        compact.split_once('Q')?
    };

    if year.len() != 4 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let quarter: u8 = quarter.parse().ok()?;
    (1..=4)
        .contains(&quarter)
        .then_some(QuarterLabel { year, quarter })
}

/// Parses `12500`, `12,500.00` or `$12,500.00`.
fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|amount| amount.is_finite())
}

#[cfg(test)]
pub(crate) fn parse_quarter_for_tests(value: &str) -> Option<QuarterLabel> {
    parse_quarter(value)
}

#[cfg(test)]
pub(crate) fn parse_amount_for_tests(value: &str) -> Option<f64> {
    parse_amount(value)
}
