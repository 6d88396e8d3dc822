use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::errors::{Error, Result};
use crate::models::{Account, AccountType, Id, ValueEntry};
use crate::storage::Storage;

/// Command for creating an account together with its first value entry.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub name: String,
    pub account_type: AccountType,
    /// Falls back to the configured default currency when omitted.
    pub currency: Option<String>,
    pub initial_value: f64,
    pub date: NaiveDate,
}

/// Partial account update: rename and/or change archival state.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    pub name: Option<String>,
    pub archived: Option<bool>,
}

/// Account lifecycle: creation (with the initial entry), renames, archival,
/// and hard deletion.
pub struct AccountService {
    storage: Arc<dyn Storage>,
    default_currency: String,
}

impl AccountService {
    pub fn new(storage: Arc<dyn Storage>, default_currency: impl Into<String>) -> Self {
        Self {
            storage,
            default_currency: default_currency.into(),
        }
    }

    pub async fn list(&self, include_archived: bool) -> Result<Vec<Account>> {
        let accounts = self
            .storage
            .list_accounts(include_archived)
            .await
            .context("failed to fetch accounts")?;
        Ok(accounts)
    }

    pub async fn get(&self, id: &Id) -> Result<Account> {
        self.storage
            .get_account(id)
            .await
            .context("failed to fetch account")?
            .ok_or_else(|| Error::not_found("account not found or access denied"))
    }

    /// Create an account and its initial value entry.
    ///
    /// The first entry records the full value as cash flow. If the entry
    /// write fails, the freshly created account is removed again so no
    /// account exists without a starting value.
    pub async fn create(&self, command: CreateAccount) -> Result<Account> {
        self.ensure_name_available(&command.name, None).await?;

        let currency = command
            .currency
            .unwrap_or_else(|| self.default_currency.clone());
        let account = Account::new(command.name, command.account_type, currency);

        self.storage
            .save_account(&account)
            .await
            .context("failed to save account")?;

        let initial_entry = ValueEntry::new(
            account.id.clone(),
            command.date,
            command.initial_value,
            command.initial_value,
            0.0,
        );

        if let Err(err) = self.storage.upsert_entry(&initial_entry).await {
            warn!(
                account_id = %account.id,
                error = %err,
                "initial value entry failed; rolling the account back"
            );
            if let Err(rollback_err) = self.storage.delete_account(&account.id).await {
                warn!(
                    account_id = %account.id,
                    error = %rollback_err,
                    "rollback of partially created account failed"
                );
            }
            return Err(Error::Internal(
                err.context("failed to create initial value entry"),
            ));
        }

        debug!(account_id = %account.id, name = %account.name, "created account");
        Ok(account)
    }

    pub async fn update(&self, id: &Id, command: UpdateAccount) -> Result<Account> {
        let mut account = self.get(id).await?;

        if let Some(name) = command.name {
            if !name.eq_ignore_ascii_case(&account.name) {
                self.ensure_name_available(&name, Some(id)).await?;
            }
            account.name = name;
        }

        match command.archived {
            Some(true) if !account.is_archived() => account.archived_at = Some(Utc::now()),
            Some(false) => account.archived_at = None,
            _ => {}
        }

        self.storage
            .save_account(&account)
            .await
            .context("failed to save account")?;
        Ok(account)
    }

    /// Hard delete: removes the account and, through storage, all of its
    /// value entries.
    pub async fn remove(&self, id: &Id) -> Result<()> {
        let existed = self
            .storage
            .delete_account(id)
            .await
            .context("failed to delete account")?;
        if !existed {
            return Err(Error::not_found("account not found or access denied"));
        }
        debug!(account_id = %id, "deleted account");
        Ok(())
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<&Id>) -> Result<()> {
        let accounts = self
            .storage
            .list_accounts(true)
            .await
            .context("failed to fetch accounts")?;

        let taken = accounts.iter().any(|account| {
            account.name.eq_ignore_ascii_case(name) && Some(&account.id) != exclude
        });
        if taken {
            return Err(Error::conflict("an account with this name already exists"));
        }
        Ok(())
    }
}
