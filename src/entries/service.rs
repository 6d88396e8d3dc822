use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::errors::{Error, Result};
use crate::models::{Id, ValueEntry};
use crate::storage::Storage;

use super::{reconcile, Scenario};

/// Command for creating or replacing one value entry.
#[derive(Debug, Clone)]
pub struct UpsertValueEntry {
    pub account_id: Id,
    pub date: NaiveDate,
    pub value: f64,
    /// Omit for automatic derivation; `Some(0.0)` counts as reported.
    pub cash_flow: Option<f64>,
    pub gain_loss: Option<f64>,
}

/// Per-account failure while adding a column.
#[derive(Debug, Clone, Serialize)]
pub struct AddColumnFailure {
    pub account_id: Id,
    pub account_name: String,
    pub error: String,
}

/// Result of adding a column: one upsert per active account, attempted
/// independently. Partial success is a valid terminal outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AddColumnOutcome {
    pub date: NaiveDate,
    /// Entries created for accounts that had none on this date.
    pub created: usize,
    /// Accounts skipped because they already had an entry on this date.
    pub skipped: usize,
    pub failures: Vec<AddColumnFailure>,
}

/// Orchestrates value-entry writes: reconciles each reported value against
/// the account's true chronological history before persisting.
pub struct ValueEntryService {
    storage: Arc<dyn Storage>,
}

impl ValueEntryService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create or replace the entry for `(account_id, date)`.
    ///
    /// The previous value is always looked up by date, never trusted from
    /// the caller, so out-of-order edits reconcile against what is actually
    /// stored.
    pub async fn upsert(&self, command: UpsertValueEntry) -> Result<ValueEntry> {
        let account = self
            .storage
            .get_account(&command.account_id)
            .await
            .context("failed to fetch account")?
            .ok_or_else(|| Error::not_found("account not found or access denied"))?;

        let previous_value = self
            .storage
            .latest_entry_before(&command.account_id, command.date)
            .await
            .context("failed to fetch previous value entry")?
            .map(|entry| entry.value)
            .unwrap_or(0.0);

        let scenario = Scenario::from_inputs(command.cash_flow, command.gain_loss);
        let reconciled = reconcile(
            command.value,
            previous_value,
            account.account_type,
            scenario,
        )?;

        let entry = ValueEntry::new(
            command.account_id,
            command.date,
            command.value,
            reconciled.cash_flow,
            reconciled.gain_loss,
        );

        let stored = self
            .storage
            .upsert_entry(&entry)
            .await
            .context("failed to upsert value entry")?;

        debug!(
            account_id = %stored.account_id,
            date = %stored.date,
            value = stored.value,
            "stored value entry"
        );
        Ok(stored)
    }

    /// Delete every entry at `date` across all accounts (the grid's
    /// "remove column"). Returns the number deleted; no accounts is not an
    /// error.
    pub async fn delete_date(&self, date: NaiveDate) -> Result<usize> {
        let accounts = self
            .storage
            .list_accounts(true)
            .await
            .context("failed to fetch accounts")?;

        if accounts.is_empty() {
            return Ok(0);
        }

        let ids: Vec<Id> = accounts.into_iter().map(|a| a.id).collect();
        let deleted = self
            .storage
            .delete_entries_by_date(&ids, date)
            .await
            .context("failed to delete value entries")?;

        debug!(%date, deleted, "removed value column");
        Ok(deleted)
    }

    /// Add a column: give every active account an entry on `date`, carrying
    /// its latest preceding value with zero flows.
    pub async fn add_column(&self, date: NaiveDate) -> Result<AddColumnOutcome> {
        self.add_column_with(date, &SystemClock).await
    }

    pub async fn add_column_with(
        &self,
        date: NaiveDate,
        clock: &dyn Clock,
    ) -> Result<AddColumnOutcome> {
        if date > clock.today() {
            return Err(Error::validation("cannot add a column with a future date"));
        }

        let accounts = self
            .storage
            .list_accounts(false)
            .await
            .context("failed to fetch accounts")?;

        if accounts.is_empty() {
            return Err(Error::validation(
                "no accounts exist; add an account before creating value entries",
            ));
        }

        let mut outcome = AddColumnOutcome {
            date,
            created: 0,
            skipped: 0,
            failures: Vec::new(),
        };

        for account in &accounts {
            let existing = self
                .storage
                .list_entries(
                    std::slice::from_ref(&account.id),
                    &crate::storage::DateRange {
                        from: Some(date),
                        to: Some(date),
                    },
                )
                .await
                .context("failed to fetch value entries")?;
            if !existing.is_empty() {
                outcome.skipped += 1;
                continue;
            }

            let carried_value = match self.storage.latest_entry_before(&account.id, date).await {
                Ok(previous) => previous.map(|entry| entry.value).unwrap_or(0.0),
                Err(err) => {
                    warn!(
                        account_id = %account.id,
                        date = %date,
                        error = %err,
                        "failed to look up previous value while adding column"
                    );
                    outcome.failures.push(AddColumnFailure {
                        account_id: account.id.clone(),
                        account_name: account.name.clone(),
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            // Carrying the value forward with zero flows keeps the entry
            // consistent: value == previous + 0 + 0.
            let command = UpsertValueEntry {
                account_id: account.id.clone(),
                date,
                value: carried_value,
                cash_flow: Some(0.0),
                gain_loss: Some(0.0),
            };

            match self.upsert(command).await {
                Ok(_) => outcome.created += 1,
                Err(err) => {
                    warn!(
                        account_id = %account.id,
                        date = %date,
                        error = %err,
                        "failed to add column entry"
                    );
                    outcome.failures.push(AddColumnFailure {
                        account_id: account.id.clone(),
                        account_name: account.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        let attempted = outcome.created + outcome.failures.len();
        if attempted > 0 && outcome.created == 0 {
            return Err(Error::Internal(anyhow::anyhow!(
                "failed to add column for any account ({} failures)",
                outcome.failures.len()
            )));
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{Account, AccountType};
    use crate::storage::MemoryStorage;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn seed_account(storage: &MemoryStorage, name: &str, kind: AccountType) -> Account {
        let account = Account::new(name, kind, "PLN");
        storage.save_account(&account).await.unwrap();
        account
    }

    fn bare(account_id: &Id, date: &str, value: f64) -> UpsertValueEntry {
        UpsertValueEntry {
            account_id: account_id.clone(),
            date: d(date),
            value,
            cash_flow: None,
            gain_loss: None,
        }
    }

    #[tokio::test]
    async fn upsert_reconciles_against_the_previous_entry() {
        let storage = Arc::new(MemoryStorage::new());
        let account = seed_account(&storage, "XTB", AccountType::InvestmentAsset).await;
        let service = ValueEntryService::new(storage);

        service
            .upsert(bare(&account.id, "2024-01-01", 10000.0))
            .await
            .unwrap();
        let second = service
            .upsert(bare(&account.id, "2024-02-01", 10500.0))
            .await
            .unwrap();

        assert_eq!(second.cash_flow, 0.0);
        assert_eq!(second.gain_loss, 500.0);
    }

    #[tokio::test]
    async fn upsert_rejects_unknown_accounts() {
        let service = ValueEntryService::new(Arc::new(MemoryStorage::new()));
        let err = service
            .upsert(bare(&Id::new(), "2024-01-01", 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn upsert_surfaces_inconsistent_reports_as_validation_errors() {
        let storage = Arc::new(MemoryStorage::new());
        let account = seed_account(&storage, "XTB", AccountType::InvestmentAsset).await;
        let service = ValueEntryService::new(storage);

        service
            .upsert(bare(&account.id, "2024-01-01", 1000.0))
            .await
            .unwrap();

        let err = service
            .upsert(UpsertValueEntry {
                account_id: account.id.clone(),
                date: d("2024-02-01"),
                value: 1700.0,
                cash_flow: Some(500.0),
                gain_loss: Some(300.0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn backdated_entries_reconcile_against_true_history() {
        let storage = Arc::new(MemoryStorage::new());
        let account = seed_account(&storage, "mBank", AccountType::CashAsset).await;
        let service = ValueEntryService::new(storage);

        service
            .upsert(bare(&account.id, "2024-03-01", 1500.0))
            .await
            .unwrap();

        // Insert January afterwards: its previous value is 0, not March.
        let january = service
            .upsert(bare(&account.id, "2024-01-01", 1000.0))
            .await
            .unwrap();
        assert_eq!(january.cash_flow, 1000.0);

        // Re-upserting March now reconciles against January.
        let march = service
            .upsert(bare(&account.id, "2024-03-01", 1500.0))
            .await
            .unwrap();
        assert_eq!(march.cash_flow, 500.0);
    }

    #[tokio::test]
    async fn delete_date_with_no_accounts_returns_zero() {
        let service = ValueEntryService::new(Arc::new(MemoryStorage::new()));
        assert_eq!(service.delete_date(d("2024-01-01")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_date_counts_entries_across_accounts() {
        let storage = Arc::new(MemoryStorage::new());
        let a = seed_account(&storage, "A", AccountType::CashAsset).await;
        let b = seed_account(&storage, "B", AccountType::Liability).await;
        let service = ValueEntryService::new(storage);

        service.upsert(bare(&a.id, "2024-01-01", 100.0)).await.unwrap();
        service.upsert(bare(&b.id, "2024-01-01", 50.0)).await.unwrap();
        service.upsert(bare(&a.id, "2024-02-01", 150.0)).await.unwrap();

        assert_eq!(service.delete_date(d("2024-01-01")).await.unwrap(), 2);
        assert_eq!(service.delete_date(d("2024-01-01")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn add_column_carries_values_forward_with_zero_flows() {
        let storage = Arc::new(MemoryStorage::new());
        let funded = seed_account(&storage, "mBank", AccountType::CashAsset).await;
        let empty = seed_account(&storage, "Fresh", AccountType::CashAsset).await;
        let service = ValueEntryService::new(storage.clone());

        service
            .upsert(bare(&funded.id, "2024-01-01", 1200.0))
            .await
            .unwrap();

        let clock = FixedClock::on_date(d("2024-03-01"));
        let outcome = service
            .add_column_with(d("2024-03-01"), &clock)
            .await
            .unwrap();
        assert_eq!(outcome.created, 2);
        assert!(outcome.failures.is_empty());

        let carried = storage
            .latest_entry_before(&funded.id, d("2024-04-01"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(carried.date, d("2024-03-01"));
        assert_eq!(carried.value, 1200.0);
        assert_eq!(carried.cash_flow, 0.0);
        assert_eq!(carried.gain_loss, 0.0);

        // An account with no history starts the column at zero.
        let fresh = storage
            .latest_entry_before(&empty.id, d("2024-04-01"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.value, 0.0);
    }

    #[tokio::test]
    async fn add_column_rejects_future_dates() {
        let storage = Arc::new(MemoryStorage::new());
        seed_account(&storage, "mBank", AccountType::CashAsset).await;
        let service = ValueEntryService::new(storage);

        let clock = FixedClock::on_date(d("2024-03-01"));
        let err = service
            .add_column_with(d("2024-03-02"), &clock)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn add_column_requires_accounts() {
        let service = ValueEntryService::new(Arc::new(MemoryStorage::new()));
        let clock = FixedClock::on_date(d("2024-03-01"));
        let err = service
            .add_column_with(d("2024-03-01"), &clock)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn add_column_skips_accounts_that_already_have_the_date() {
        let storage = Arc::new(MemoryStorage::new());
        let account = seed_account(&storage, "mBank", AccountType::CashAsset).await;
        let service = ValueEntryService::new(storage);

        service
            .upsert(bare(&account.id, "2024-03-01", 1200.0))
            .await
            .unwrap();

        let clock = FixedClock::on_date(d("2024-03-01"));
        let outcome = service
            .add_column_with(d("2024-03-01"), &clock)
            .await
            .unwrap();
        assert_eq!(outcome.created, 0);
        assert_eq!(outcome.skipped, 1);
        assert!(outcome.failures.is_empty());
    }
}
