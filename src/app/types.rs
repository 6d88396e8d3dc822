use serde::Serialize;

use crate::entries::AddColumnOutcome;
use crate::models::{Account, ValueEntry};

/// JSON output for accounts.
#[derive(Debug, Serialize)]
pub struct AccountOutput {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency: String,
    pub archived: bool,
    pub created_at: String,
}

impl From<&Account> for AccountOutput {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            name: account.name.clone(),
            account_type: account.account_type.to_string(),
            currency: account.currency.clone(),
            archived: account.is_archived(),
            created_at: account.created_at.to_rfc3339(),
        }
    }
}

/// JSON output for a stored value entry.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub id: String,
    pub account_id: String,
    pub date: String,
    pub value: f64,
    pub cash_flow: f64,
    pub gain_loss: f64,
}

impl From<&ValueEntry> for EntryOutput {
    fn from(entry: &ValueEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            account_id: entry.account_id.to_string(),
            date: entry.date.to_string(),
            value: entry.value,
            cash_flow: entry.cash_flow,
            gain_loss: entry.gain_loss,
        }
    }
}

/// JSON output for the add-column bulk operation.
#[derive(Debug, Serialize)]
pub struct ColumnOutput {
    pub date: String,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<ColumnFailureOutput>,
}

#[derive(Debug, Serialize)]
pub struct ColumnFailureOutput {
    pub account_id: String,
    pub account_name: String,
    pub error: String,
}

impl From<&AddColumnOutcome> for ColumnOutput {
    fn from(outcome: &AddColumnOutcome) -> Self {
        Self {
            date: outcome.date.to_string(),
            created: outcome.created,
            skipped: outcome.skipped,
            failed: outcome.failures.len(),
            failures: outcome
                .failures
                .iter()
                .map(|f| ColumnFailureOutput {
                    account_id: f.account_id.to_string(),
                    account_name: f.account_name.clone(),
                    error: f.error.clone(),
                })
                .collect(),
        }
    }
}

/// JSON output for the remove-column bulk operation.
#[derive(Debug, Serialize)]
pub struct RemovedColumnOutput {
    pub date: String,
    pub deleted: usize,
}
