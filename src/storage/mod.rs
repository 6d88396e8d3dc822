mod json_file;
mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Account, Id, ValueEntry};

/// Inclusive date window applied to entry queries. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > to {
                return false;
            }
        }
        true
    }
}

/// Storage trait for persisting accounts and their value entries.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Accounts
    async fn list_accounts(&self, include_archived: bool) -> Result<Vec<Account>>;
    async fn get_account(&self, id: &Id) -> Result<Option<Account>>;
    async fn save_account(&self, account: &Account) -> Result<()>;
    /// Removes the account and all of its value entries. Returns whether the
    /// account existed.
    async fn delete_account(&self, id: &Id) -> Result<bool>;

    // Value entries
    /// All entries for the given accounts within `range`, ordered by date
    /// ascending.
    async fn list_entries(&self, account_ids: &[Id], range: &DateRange)
        -> Result<Vec<ValueEntry>>;
    /// The chronologically nearest entry strictly before `date` for one
    /// account.
    async fn latest_entry_before(
        &self,
        account_id: &Id,
        date: NaiveDate,
    ) -> Result<Option<ValueEntry>>;
    /// Insert or replace the entry keyed by `(account_id, date)`. A replaced
    /// entry keeps its original id.
    async fn upsert_entry(&self, entry: &ValueEntry) -> Result<ValueEntry>;
    /// Delete the entries at `date` for every listed account, returning how
    /// many existed.
    async fn delete_entries_by_date(&self, account_ids: &[Id], date: NaiveDate) -> Result<usize>;
}
