mod support;

use std::sync::Arc;

use anyhow::Result;

use assetly::accounts::{AccountService, CreateAccount, UpdateAccount};
use assetly::errors::Error;
use assetly::models::AccountType;
use assetly::storage::{MemoryStorage, Storage};

use support::{date, FlakyStorage};

fn create_command(name: &str) -> CreateAccount {
    CreateAccount {
        name: name.to_string(),
        account_type: AccountType::CashAsset,
        currency: None,
        initial_value: 1000.0,
        date: date("2024-01-01"),
    }
}

#[tokio::test]
async fn failed_initial_entry_rolls_the_account_back() -> Result<()> {
    let memory = Arc::new(MemoryStorage::new());
    let flaky = Arc::new(FlakyStorage::failing_all(memory.clone()));
    let service = AccountService::new(flaky, "PLN");

    let err = service.create(create_command("mBank")).await.unwrap_err();
    assert!(matches!(err, Error::Internal(_)));

    // No half-created account survives.
    assert!(memory.list_accounts(true).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn account_names_stay_reserved_until_hard_deletion() -> Result<()> {
    // Archival keeps the account (and its name) around, so the conflict
    // still applies; only hard deletion frees the name.
    let storage = Arc::new(MemoryStorage::new());
    let service = AccountService::new(storage, "PLN");

    let account = service.create(create_command("mBank")).await?;
    service
        .update(
            &account.id,
            UpdateAccount {
                name: None,
                archived: Some(true),
            },
        )
        .await?;

    let err = service.create(create_command("mBank")).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    service.remove(&account.id).await?;
    let recreated = service.create(create_command("mBank")).await?;
    assert_eq!(recreated.name, "mBank");
    Ok(())
}
