use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;
use crate::errors::Error;

/// How an account contributes to net worth and how value changes decompose
/// into cash flow vs. gain/loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Bank accounts, cash. Value changes default to cash flow.
    CashAsset,
    /// Brokerage, funds. Value changes default to gain/loss.
    InvestmentAsset,
    /// Loans, credit. Subtracted from net worth; borrowing raises the value
    /// while counting as a cash outflow.
    Liability,
}

impl AccountType {
    pub fn is_liability(self) -> bool {
        matches!(self, Self::Liability)
    }

    /// Sign translating this account's value delta into the shared cash-flow
    /// convention (positive = money in). Liabilities invert: borrowed money
    /// raises the balance but leaves the owner's pocket.
    pub fn cash_flow_multiplier(self) -> f64 {
        if self.is_liability() {
            -1.0
        } else {
            1.0
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CashAsset => "cash_asset",
            Self::InvestmentAsset => "investment_asset",
            Self::Liability => "liability",
        };
        f.write_str(name)
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash_asset" => Ok(Self::CashAsset),
            "investment_asset" => Ok(Self::InvestmentAsset),
            "liability" => Ok(Self::Liability),
            other => Err(Error::validation(format!(
                "unknown account type {other:?}: expected cash_asset, investment_asset or liability"
            ))),
        }
    }
}

/// An individual tracked account (bank account, brokerage, loan, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    /// Set when the account is archived (hidden from default views). Null
    /// means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        account_type: AccountType,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: Id::new(),
            name: name.into(),
            account_type,
            currency: currency.into(),
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}
