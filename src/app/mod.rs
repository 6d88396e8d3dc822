//! CLI-facing operations. Each function wires the service layer to simple
//! string/number inputs and serializable outputs.

mod types;

pub use types::{
    AccountOutput, ColumnFailureOutput, ColumnOutput, EntryOutput, RemovedColumnOutput,
};

use std::sync::Arc;

use crate::accounts::{AccountService, CreateAccount, UpdateAccount};
use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::dates::parse_date_param;
use crate::entries::{UpsertValueEntry, ValueEntryService};
use crate::errors::{Error, Result};
use crate::grid::{GridData, GridQuery, GridService};
use crate::models::{AccountType, Id};
use crate::storage::Storage;

pub async fn list_accounts(
    storage: &Arc<dyn Storage>,
    config: &ResolvedConfig,
    include_archived: bool,
) -> Result<Vec<AccountOutput>> {
    let service = AccountService::new(storage.clone(), config.default_currency.clone());
    let accounts = service.list(include_archived).await?;
    Ok(accounts.iter().map(AccountOutput::from).collect())
}

#[allow(clippy::too_many_arguments)]
pub async fn add_account(
    storage: &Arc<dyn Storage>,
    config: &ResolvedConfig,
    name: &str,
    account_type: AccountType,
    currency: Option<String>,
    initial_value: f64,
    date: Option<&str>,
    clock: &dyn Clock,
) -> Result<AccountOutput> {
    let date = match date {
        Some(raw) => parse_date_param(raw)?,
        None => clock.today(),
    };

    let service = AccountService::new(storage.clone(), config.default_currency.clone());
    let account = service
        .create(CreateAccount {
            name: name.to_string(),
            account_type,
            currency,
            initial_value,
            date,
        })
        .await?;
    Ok(AccountOutput::from(&account))
}

pub async fn rename_account(
    storage: &Arc<dyn Storage>,
    config: &ResolvedConfig,
    id: &str,
    name: &str,
) -> Result<AccountOutput> {
    let service = AccountService::new(storage.clone(), config.default_currency.clone());
    let account = service
        .update(
            &parse_id(id)?,
            UpdateAccount {
                name: Some(name.to_string()),
                archived: None,
            },
        )
        .await?;
    Ok(AccountOutput::from(&account))
}

pub async fn set_account_archived(
    storage: &Arc<dyn Storage>,
    config: &ResolvedConfig,
    id: &str,
    archived: bool,
) -> Result<AccountOutput> {
    let service = AccountService::new(storage.clone(), config.default_currency.clone());
    let account = service
        .update(
            &parse_id(id)?,
            UpdateAccount {
                name: None,
                archived: Some(archived),
            },
        )
        .await?;
    Ok(AccountOutput::from(&account))
}

pub async fn remove_account(
    storage: &Arc<dyn Storage>,
    config: &ResolvedConfig,
    id: &str,
) -> Result<()> {
    let service = AccountService::new(storage.clone(), config.default_currency.clone());
    service.remove(&parse_id(id)?).await
}

pub async fn grid_data(
    storage: &Arc<dyn Storage>,
    from: Option<String>,
    to: Option<String>,
    show_archived: bool,
) -> Result<GridData> {
    let service = GridService::new(storage.clone());
    service
        .grid_data(&GridQuery {
            from,
            to,
            show_archived,
        })
        .await
}

pub async fn set_value(
    storage: &Arc<dyn Storage>,
    account_id: &str,
    date: &str,
    value: f64,
    cash_flow: Option<f64>,
    gain_loss: Option<f64>,
) -> Result<EntryOutput> {
    let service = ValueEntryService::new(storage.clone());
    let entry = service
        .upsert(UpsertValueEntry {
            account_id: parse_id(account_id)?,
            date: parse_date_param(date)?,
            value,
            cash_flow,
            gain_loss,
        })
        .await?;
    Ok(EntryOutput::from(&entry))
}

pub async fn add_column(
    storage: &Arc<dyn Storage>,
    date: &str,
    clock: &dyn Clock,
) -> Result<ColumnOutput> {
    let service = ValueEntryService::new(storage.clone());
    let outcome = service
        .add_column_with(parse_date_param(date)?, clock)
        .await?;
    Ok(ColumnOutput::from(&outcome))
}

pub async fn remove_column(
    storage: &Arc<dyn Storage>,
    date: &str,
) -> Result<RemovedColumnOutput> {
    let service = ValueEntryService::new(storage.clone());
    let date = parse_date_param(date)?;
    let deleted = service.delete_date(date).await?;
    Ok(RemovedColumnOutput {
        date: date.to_string(),
        deleted,
    })
}

fn parse_id(raw: &str) -> Result<Id> {
    Id::from_string_checked(raw).map_err(|err| Error::validation(err.to_string()))
}
