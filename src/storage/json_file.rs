use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::models::{Account, Id, ValueEntry};

use super::{DateRange, Storage};

/// JSON file-based storage implementation.
///
/// Directory structure:
/// ```text
/// data/
///   accounts/
///     {id}/
///       account.json
///       entries.jsonl
/// ```
///
/// `entries.jsonl` is append-only on upsert: the reader deduplicates by date
/// with last-write-wins, so replacing a day's value is a cheap append.
/// Deletions rewrite the file.
pub struct JsonFileStorage {
    base_path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn accounts_dir(&self) -> PathBuf {
        self.base_path.join("accounts")
    }

    fn account_dir(&self, id: &Id) -> PathBuf {
        self.accounts_dir().join(id.to_string())
    }

    fn account_file(&self, id: &Id) -> PathBuf {
        self.account_dir(id).join("account.json")
    }

    fn entries_file(&self, account_id: &Id) -> PathBuf {
        self.account_dir(account_id).join("entries.jsonl")
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create directory")?;
        }
        Ok(())
    }

    async fn read_json<T: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &Path,
    ) -> Result<Option<T>> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let value = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("Failed to read file"),
        }
    }

    async fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir(path).await?;
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        fs::write(path, content)
            .await
            .context("Failed to write file")?;
        Ok(())
    }

    async fn read_jsonl<T: for<'de> serde::Deserialize<'de>>(&self, path: &Path) -> Result<Vec<T>> {
        let file = match fs::File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("Failed to open file"),
        };

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut items = Vec::new();

        while let Some(line) = lines.next_line().await.context("Failed to read line")? {
            if line.trim().is_empty() {
                continue;
            }
            let item: T = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse JSONL line: {}", line))?;
            items.push(item);
        }

        Ok(items)
    }

    async fn append_jsonl<T: serde::Serialize>(&self, path: &Path, item: &T) -> Result<()> {
        self.ensure_dir(path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .context("Failed to open file for append")?;

        let line = serde_json::to_string(item).context("Failed to serialize item")?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;

        Ok(())
    }

    async fn write_jsonl<T: serde::Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        self.ensure_dir(path).await?;

        let mut content = String::new();
        for item in items {
            content.push_str(&serde_json::to_string(item).context("Failed to serialize item")?);
            content.push('\n');
        }
        fs::write(path, content)
            .await
            .context("Failed to write file")?;
        Ok(())
    }

    async fn list_dirs(&self, path: &Path) -> Result<Vec<Id>> {
        let mut ids = Vec::new();

        let mut entries = match fs::read_dir(path).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e).context("Failed to read directory"),
        };

        while let Some(entry) = entries.next_entry().await.context("Failed to read entry")? {
            if let Ok(file_type) = entry.file_type().await {
                if file_type.is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        if !name.is_empty() {
                            ids.push(Id::from(name));
                        }
                    }
                }
            }
        }

        Ok(ids)
    }

    /// Entries for one account, deduplicated by date (last write wins),
    /// ordered by date ascending.
    async fn account_entries(&self, account_id: &Id) -> Result<BTreeMap<NaiveDate, ValueEntry>> {
        let raw: Vec<ValueEntry> = self.read_jsonl(&self.entries_file(account_id)).await?;

        let mut by_date: BTreeMap<NaiveDate, ValueEntry> = BTreeMap::new();
        for entry in raw {
            // Later lines replace earlier ones but keep the first line's id,
            // so an entry's identity is stable across upserts.
            match by_date.get(&entry.date) {
                Some(existing) => {
                    let mut replacement = entry;
                    replacement.id = existing.id.clone();
                    by_date.insert(replacement.date, replacement);
                }
                None => {
                    by_date.insert(entry.date, entry);
                }
            }
        }

        Ok(by_date)
    }
}

#[async_trait::async_trait]
impl Storage for JsonFileStorage {
    async fn list_accounts(&self, include_archived: bool) -> Result<Vec<Account>> {
        let ids = self.list_dirs(&self.accounts_dir()).await?;
        let mut accounts = Vec::new();

        for id in ids {
            if let Some(account) = self.get_account(&id).await? {
                if include_archived || !account.is_archived() {
                    accounts.push(account);
                }
            }
        }

        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn get_account(&self, id: &Id) -> Result<Option<Account>> {
        if !Id::is_path_safe(id.as_str()) {
            return Ok(None);
        }
        self.read_json(&self.account_file(id)).await
    }

    async fn save_account(&self, account: &Account) -> Result<()> {
        self.write_json(&self.account_file(&account.id), account)
            .await
    }

    async fn delete_account(&self, id: &Id) -> Result<bool> {
        if self.get_account(id).await?.is_none() {
            return Ok(false);
        }
        fs::remove_dir_all(self.account_dir(id))
            .await
            .context("Failed to remove account directory")?;
        Ok(true)
    }

    async fn list_entries(
        &self,
        account_ids: &[Id],
        range: &DateRange,
    ) -> Result<Vec<ValueEntry>> {
        let mut result = Vec::new();
        for account_id in account_ids {
            let by_date = self.account_entries(account_id).await?;
            result.extend(by_date.into_values().filter(|e| range.contains(e.date)));
        }
        result.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.account_id.cmp(&b.account_id)));
        Ok(result)
    }

    async fn latest_entry_before(
        &self,
        account_id: &Id,
        date: NaiveDate,
    ) -> Result<Option<ValueEntry>> {
        let by_date = self.account_entries(account_id).await?;
        Ok(by_date
            .range(..date)
            .next_back()
            .map(|(_, entry)| entry.clone()))
    }

    async fn upsert_entry(&self, entry: &ValueEntry) -> Result<ValueEntry> {
        let existing = self.account_entries(&entry.account_id).await?;

        let mut stored = entry.clone();
        if let Some(previous) = existing.get(&entry.date) {
            stored.id = previous.id.clone();
        }

        self.append_jsonl(&self.entries_file(&entry.account_id), &stored)
            .await?;
        Ok(stored)
    }

    async fn delete_entries_by_date(&self, account_ids: &[Id], date: NaiveDate) -> Result<usize> {
        let mut deleted = 0;
        for account_id in account_ids {
            let mut by_date = self.account_entries(account_id).await?;
            if by_date.remove(&date).is_some() {
                let remaining: Vec<ValueEntry> = by_date.into_values().collect();
                self.write_jsonl(&self.entries_file(account_id), &remaining)
                    .await?;
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
