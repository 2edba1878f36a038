//! Quarterly wage history import from `Quarter,Wages` CSV exports.

mod parser;

pub use parser::QuarterLabel;

use crate::workflows::eligibility::monetary::{MonetaryInputs, MAX_QUARTERS};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug)]
pub enum WageHistoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidQuarter { line: u64, value: String },
    InvalidWages { line: u64, value: String },
    DuplicateQuarter { line: u64, quarter: QuarterLabel },
    Empty,
}

impl std::fmt::Display for WageHistoryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WageHistoryImportError::Io(err) => write!(f, "failed to read wage history: {}", err),
            WageHistoryImportError::Csv(err) => write!(f, "invalid wage history CSV: {}", err),
            WageHistoryImportError::InvalidQuarter { line, value } => {
                write!(f, "line {line}: '{value}' is not a quarter like 2025Q1")
            }
            WageHistoryImportError::InvalidWages { line, value } => {
                write!(f, "line {line}: '{value}' is not a non-negative wage amount")
            }
            WageHistoryImportError::DuplicateQuarter { line, quarter } => {
                write!(f, "line {line}: quarter {quarter} appears more than once")
            }
            WageHistoryImportError::Empty => write!(f, "wage history contains no rows"),
        }
    }
}

impl std::error::Error for WageHistoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WageHistoryImportError::Io(err) => Some(err),
            WageHistoryImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WageHistoryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for WageHistoryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuarterlyWage {
    pub quarter: QuarterLabel,
    pub wages: f64,
}

/// Wage rows ordered oldest to newest, one per quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageHistory {
    entries: Vec<QuarterlyWage>,
}

impl WageHistory {
    pub fn entries(&self) -> &[QuarterlyWage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn quarterly_wages(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.wages).collect()
    }

    pub fn total_wages(&self) -> f64 {
        self.entries.iter().map(|entry| entry.wages).sum()
    }

    /// Builds engine inputs from up to the last eight calendar quarters ending
    /// at the newest reported one. Unreported quarters inside that window count
    /// as zero wages; anything older is left out.
    pub fn to_monetary_inputs(&self) -> MonetaryInputs {
        let Some(newest) = self.entries.last() else {
            return MonetaryInputs::with_quarters(0.0, Vec::new());
        };
        let end = newest.quarter.ordinal();
        let window_start = end - (MAX_QUARTERS as i64 - 1);
        let start = self
            .entries
            .iter()
            .map(|entry| entry.quarter.ordinal())
            .find(|ordinal| *ordinal >= window_start)
            .unwrap_or(end);

        let dropped = self
            .entries
            .iter()
            .filter(|entry| entry.quarter.ordinal() < start)
            .count();
        if dropped > 0 {
            debug!(dropped, newest = %newest.quarter, "wage rows outside the accepted window");
        }

        let mut window = vec![0.0; (end - start + 1) as usize];
        for entry in &self.entries {
            let ordinal = entry.quarter.ordinal();
            if ordinal >= start {
                window[(ordinal - start) as usize] = entry.wages;
            }
        }
        MonetaryInputs::with_quarters(window.iter().sum(), window)
    }
}

pub struct WageHistoryImporter;

impl WageHistoryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<WageHistory, WageHistoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<WageHistory, WageHistoryImportError> {
        let mut by_quarter: BTreeMap<QuarterLabel, f64> = BTreeMap::new();

        for row in parser::parse_rows(reader)? {
            let quarter = row
                .quarter
                .ok_or_else(|| WageHistoryImportError::InvalidQuarter {
                    line: row.line,
                    value: row.raw_quarter.clone(),
                })?;
            let wages = row
                .wages
                .filter(|amount| *amount >= 0.0)
                .ok_or_else(|| WageHistoryImportError::InvalidWages {
                    line: row.line,
                    value: row.raw_wages.clone(),
                })?;
            if by_quarter.insert(quarter, wages).is_some() {
                return Err(WageHistoryImportError::DuplicateQuarter {
                    line: row.line,
                    quarter,
                });
            }
        }

        if by_quarter.is_empty() {
            return Err(WageHistoryImportError::Empty);
        }

        Ok(WageHistory {
            entries: by_quarter
                .into_iter()
                .map(|(quarter, wages)| QuarterlyWage { quarter, wages })
                .collect(),
        })
    }
}
