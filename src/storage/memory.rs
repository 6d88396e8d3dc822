//! In-memory storage implementation for tests and ephemeral use.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::models::{Account, Id, ValueEntry};

use super::{DateRange, Storage};

/// In-memory storage. Entries live in a per-account map keyed by date, so
/// upsert and previous-entry lookups mirror the file backend's semantics.
pub struct MemoryStorage {
    accounts: Mutex<HashMap<Id, Account>>,
    entries: Mutex<HashMap<Id, BTreeMap<NaiveDate, ValueEntry>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn list_accounts(&self, include_archived: bool) -> Result<Vec<Account>> {
        let accounts = self.accounts.lock().await;
        let mut result: Vec<Account> = accounts
            .values()
            .filter(|a| include_archived || !a.is_archived())
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable.
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn get_account(&self, id: &Id) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(id).cloned())
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.lock().await;
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn delete_account(&self, id: &Id) -> Result<bool> {
        let mut accounts = self.accounts.lock().await;
        let mut entries = self.entries.lock().await;
        entries.remove(id);
        Ok(accounts.remove(id).is_some())
    }

    async fn list_entries(
        &self,
        account_ids: &[Id],
        range: &DateRange,
    ) -> Result<Vec<ValueEntry>> {
        let entries = self.entries.lock().await;
        let mut result = Vec::new();
        for account_id in account_ids {
            if let Some(by_date) = entries.get(account_id) {
                result.extend(
                    by_date
                        .values()
                        .filter(|e| range.contains(e.date))
                        .cloned(),
                );
            }
        }
        result.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.account_id.cmp(&b.account_id)));
        Ok(result)
    }

    async fn latest_entry_before(
        &self,
        account_id: &Id,
        date: NaiveDate,
    ) -> Result<Option<ValueEntry>> {
        let entries = self.entries.lock().await;
        Ok(entries
            .get(account_id)
            .and_then(|by_date| by_date.range(..date).next_back())
            .map(|(_, entry)| entry.clone()))
    }

    async fn upsert_entry(&self, entry: &ValueEntry) -> Result<ValueEntry> {
        let mut entries = self.entries.lock().await;
        let by_date = entries.entry(entry.account_id.clone()).or_default();

        let mut stored = entry.clone();
        // A replaced entry keeps the id it was first stored under.
        if let Some(existing) = by_date.get(&entry.date) {
            stored.id = existing.id.clone();
        }
        by_date.insert(stored.date, stored.clone());
        Ok(stored)
    }

    async fn delete_entries_by_date(&self, account_ids: &[Id], date: NaiveDate) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let mut deleted = 0;
        for account_id in account_ids {
            if let Some(by_date) = entries.get_mut(account_id) {
                if by_date.remove(&date).is_some() {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }
}
