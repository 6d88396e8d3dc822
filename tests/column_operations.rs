mod support;

use std::sync::Arc;

use anyhow::Result;

use assetly::clock::FixedClock;
use assetly::entries::ValueEntryService;
use assetly::errors::Error;
use assetly::models::AccountType;
use assetly::storage::{DateRange, MemoryStorage, Storage};

use support::{date, seed_account, seed_entry, FlakyStorage};

#[tokio::test]
async fn add_column_copies_values_and_remove_column_deletes_them() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let a = seed_account(storage.as_ref(), "A", AccountType::CashAsset).await?;
    let b = seed_account(storage.as_ref(), "B", AccountType::InvestmentAsset).await?;
    seed_entry(storage.as_ref(), &a.id, "2024-01-01", 1000.0, 1000.0, 0.0).await?;
    seed_entry(storage.as_ref(), &b.id, "2024-01-01", 5000.0, 5000.0, 0.0).await?;

    let service = ValueEntryService::new(storage.clone());
    let clock = FixedClock::on_date(date("2024-02-01"));

    let outcome = service.add_column_with(date("2024-02-01"), &clock).await?;
    assert_eq!(outcome.created, 2);
    assert_eq!(outcome.skipped, 0);
    assert!(outcome.failures.is_empty());

    let entries = storage
        .list_entries(&[a.id.clone(), b.id.clone()], &DateRange::default())
        .await?;
    assert_eq!(entries.len(), 4);

    let deleted = service.delete_date(date("2024-02-01")).await?;
    assert_eq!(deleted, 2);

    let remaining = storage
        .list_entries(&[a.id, b.id], &DateRange::default())
        .await?;
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().all(|e| e.date == date("2024-01-01")));

    Ok(())
}

#[tokio::test]
async fn add_column_reports_partial_failure_per_account() -> Result<()> {
    let memory = Arc::new(MemoryStorage::new());
    let healthy = seed_account(memory.as_ref(), "Healthy", AccountType::CashAsset).await?;
    let broken = seed_account(memory.as_ref(), "Broken", AccountType::CashAsset).await?;
    seed_entry(memory.as_ref(), &healthy.id, "2024-01-01", 100.0, 100.0, 0.0).await?;
    seed_entry(memory.as_ref(), &broken.id, "2024-01-01", 200.0, 200.0, 0.0).await?;

    let flaky = Arc::new(FlakyStorage::failing_for(
        memory.clone(),
        [broken.id.clone()],
    ));
    let service = ValueEntryService::new(flaky);
    let clock = FixedClock::on_date(date("2024-02-01"));

    let outcome = service.add_column_with(date("2024-02-01"), &clock).await?;
    assert_eq!(outcome.created, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].account_name, "Broken");

    // The successful account kept its new entry; the failing one did not.
    let healthy_entries = memory
        .list_entries(&[healthy.id], &DateRange::default())
        .await?;
    assert_eq!(healthy_entries.len(), 2);
    let broken_entries = memory
        .list_entries(&[broken.id], &DateRange::default())
        .await?;
    assert_eq!(broken_entries.len(), 1);

    Ok(())
}

#[tokio::test]
async fn add_column_errors_only_when_every_account_fails() -> Result<()> {
    let memory = Arc::new(MemoryStorage::new());
    let a = seed_account(memory.as_ref(), "A", AccountType::CashAsset).await?;
    let b = seed_account(memory.as_ref(), "B", AccountType::CashAsset).await?;

    let flaky = Arc::new(FlakyStorage::failing_for(
        memory.clone(),
        [a.id.clone(), b.id.clone()],
    ));
    let service = ValueEntryService::new(flaky);
    let clock = FixedClock::on_date(date("2024-02-01"));

    let err = service
        .add_column_with(date("2024-02-01"), &clock)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Internal(_)));

    Ok(())
}

#[tokio::test]
async fn column_on_an_already_full_date_is_a_no_op() -> Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let account = seed_account(storage.as_ref(), "A", AccountType::CashAsset).await?;
    seed_entry(storage.as_ref(), &account.id, "2024-01-01", 100.0, 100.0, 0.0).await?;

    let service = ValueEntryService::new(storage.clone());
    let clock = FixedClock::on_date(date("2024-01-01"));

    let outcome = service.add_column_with(date("2024-01-01"), &clock).await?;
    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped, 1);

    let entries = storage
        .list_entries(&[account.id], &DateRange::default())
        .await?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value, 100.0);

    Ok(())
}

#[tokio::test]
async fn remove_column_without_accounts_deletes_nothing() -> Result<()> {
    let service = ValueEntryService::new(Arc::new(MemoryStorage::new()));
    assert_eq!(service.delete_date(date("2024-01-01")).await?, 0);
    Ok(())
}
