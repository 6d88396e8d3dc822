use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use assetly::models::{Account, AccountType, Id, ValueEntry};
use assetly::storage::{DateRange, MemoryStorage, Storage};

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

pub async fn seed_account(
    storage: &dyn Storage,
    name: &str,
    account_type: AccountType,
) -> Result<Account> {
    let account = Account::new(name, account_type, "PLN");
    storage.save_account(&account).await?;
    Ok(account)
}

pub async fn seed_entry(
    storage: &dyn Storage,
    account_id: &Id,
    day: &str,
    value: f64,
    cash_flow: f64,
    gain_loss: f64,
) -> Result<ValueEntry> {
    storage
        .upsert_entry(&ValueEntry::new(
            account_id.clone(),
            date(day),
            value,
            cash_flow,
            gain_loss,
        ))
        .await
}

/// Storage wrapper that fails entry writes, for exercising partial-failure
/// and rollback paths. Fails either for selected accounts or for all of them.
pub struct FlakyStorage {
    inner: Arc<MemoryStorage>,
    failing_accounts: Option<HashSet<Id>>,
}

impl FlakyStorage {
    pub fn failing_for(inner: Arc<MemoryStorage>, accounts: impl IntoIterator<Item = Id>) -> Self {
        Self {
            inner,
            failing_accounts: Some(accounts.into_iter().collect()),
        }
    }

    pub fn failing_all(inner: Arc<MemoryStorage>) -> Self {
        Self {
            inner,
            failing_accounts: None,
        }
    }

    fn fails_for(&self, account_id: &Id) -> bool {
        match &self.failing_accounts {
            Some(accounts) => accounts.contains(account_id),
            None => true,
        }
    }
}

#[async_trait::async_trait]
impl Storage for FlakyStorage {
    async fn list_accounts(&self, include_archived: bool) -> Result<Vec<Account>> {
        self.inner.list_accounts(include_archived).await
    }

    async fn get_account(&self, id: &Id) -> Result<Option<Account>> {
        self.inner.get_account(id).await
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        self.inner.save_account(account).await
    }

    async fn delete_account(&self, id: &Id) -> Result<bool> {
        self.inner.delete_account(id).await
    }

    async fn list_entries(
        &self,
        account_ids: &[Id],
        range: &DateRange,
    ) -> Result<Vec<ValueEntry>> {
        self.inner.list_entries(account_ids, range).await
    }

    async fn latest_entry_before(
        &self,
        account_id: &Id,
        before: NaiveDate,
    ) -> Result<Option<ValueEntry>> {
        self.inner.latest_entry_before(account_id, before).await
    }

    async fn upsert_entry(&self, entry: &ValueEntry) -> Result<ValueEntry> {
        if self.fails_for(&entry.account_id) {
            anyhow::bail!("simulated write failure");
        }
        self.inner.upsert_entry(entry).await
    }

    async fn delete_entries_by_date(&self, account_ids: &[Id], day: NaiveDate) -> Result<usize> {
        self.inner.delete_entries_by_date(account_ids, day).await
    }
}
