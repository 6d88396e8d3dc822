use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::parse_date_param;
use crate::errors::{Error, Result};
use crate::models::{AccountType, Id, ValueEntry};
use crate::storage::DateRange;

/// Query options for the grid view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridQuery {
    /// Start of the date range, `YYYY-MM-DD` or ISO 8601 datetime.
    pub from: Option<String>,
    /// End of the date range, inclusive.
    pub to: Option<String>,
    /// Include archived accounts (default: false).
    #[serde(default)]
    pub show_archived: bool,
}

impl GridQuery {
    /// Validate and resolve the raw parameters into a date window. Runs
    /// before any storage access.
    pub fn resolve_range(&self) -> Result<DateRange> {
        let from = self.from.as_deref().map(parse_date_param).transpose()?;
        let to = self.to.as_deref().map(parse_date_param).transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(Error::validation(format!(
                    "invalid date range: from ({from}) is after to ({to})"
                )));
            }
        }

        Ok(DateRange { from, to })
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridEntry {
    pub value: f64,
    pub cash_flow: f64,
    pub gain_loss: f64,
}

impl From<&ValueEntry> for GridEntry {
    fn from(entry: &ValueEntry) -> Self {
        Self {
            value: entry.value,
            cash_flow: entry.cash_flow,
            gain_loss: entry.gain_loss,
        }
    }
}

/// One account row: metadata plus its dense, forward-filled cells keyed by
/// axis date. Dates before the account's first entry have no cell.
#[derive(Debug, Clone, Serialize)]
pub struct GridAccount {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub entries: BTreeMap<NaiveDate, GridEntry>,
}

/// Net worth on a single axis date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateSummary {
    pub net_worth: f64,
}

/// Range-level aggregates.
///
/// `net_worth`, `total_assets` and `total_liabilities` read from the last
/// axis date. The cumulative figures sum every forward-filled cell, so a
/// value carried across N dates contributes its flows N times; this matches
/// the grid the user sees rather than the count of genuine edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GridKpi {
    pub net_worth: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub cumulative_cash_flow: f64,
    pub cumulative_gain_loss: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GridSummary {
    pub by_date: BTreeMap<NaiveDate, DateSummary>,
    pub kpi: GridKpi,
}

/// The full grid view: axis dates, account rows, and summaries.
#[derive(Debug, Clone, Serialize)]
pub struct GridData {
    pub dates: Vec<NaiveDate>,
    pub accounts: Vec<GridAccount>,
    pub summary: GridSummary,
}

impl GridData {
    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            accounts: Vec::new(),
            summary: GridSummary::default(),
        }
    }
}
