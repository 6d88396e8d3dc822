use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::debug;

use crate::errors::Result;
use crate::models::Id;
use crate::storage::Storage;

use super::{
    project_dense, DateSummary, GridAccount, GridData, GridEntry, GridKpi, GridQuery, GridSummary,
};

/// Aggregates accounts and value entries into the grid view: the shared date
/// axis, dense per-account rows, per-date net worth, and range KPIs.
pub struct GridService {
    storage: Arc<dyn Storage>,
}

impl GridService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn grid_data(&self, query: &GridQuery) -> Result<GridData> {
        let range = query.resolve_range()?;

        let accounts = self
            .storage
            .list_accounts(query.show_archived)
            .await
            .context("failed to fetch accounts")?;

        if accounts.is_empty() {
            return Ok(GridData::empty());
        }

        let ids: Vec<Id> = accounts.iter().map(|a| a.id.clone()).collect();
        let entries = self
            .storage
            .list_entries(&ids, &range)
            .await
            .context("failed to fetch value entries")?;

        let axis: Vec<NaiveDate> = entries
            .iter()
            .map(|e| e.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut sparse: HashMap<Id, BTreeMap<NaiveDate, GridEntry>> = HashMap::new();
        for entry in &entries {
            sparse
                .entry(entry.account_id.clone())
                .or_default()
                .insert(entry.date, GridEntry::from(entry));
        }

        let empty = BTreeMap::new();
        let grid_accounts: Vec<GridAccount> = accounts
            .into_iter()
            .map(|account| {
                let account_entries = sparse.get(&account.id).unwrap_or(&empty);
                GridAccount {
                    entries: project_dense(account_entries, &axis),
                    id: account.id,
                    name: account.name,
                    account_type: account.account_type,
                }
            })
            .collect();

        let summary = summarize(&axis, &grid_accounts);

        debug!(
            accounts = grid_accounts.len(),
            dates = axis.len(),
            "built grid data"
        );

        Ok(GridData {
            dates: axis,
            accounts: grid_accounts,
            summary,
        })
    }
}

fn summarize(axis: &[NaiveDate], accounts: &[GridAccount]) -> GridSummary {
    let mut by_date = BTreeMap::new();

    for &date in axis {
        let mut net_worth = 0.0;
        for account in accounts {
            if let Some(cell) = account.entries.get(&date) {
                if account.account_type.is_liability() {
                    net_worth -= cell.value;
                } else {
                    net_worth += cell.value;
                }
            }
        }
        by_date.insert(date, DateSummary { net_worth });
    }

    let mut kpi = GridKpi::default();

    if let Some(&last_date) = axis.last() {
        for account in accounts {
            if let Some(cell) = account.entries.get(&last_date) {
                if account.account_type.is_liability() {
                    kpi.total_liabilities += cell.value;
                } else {
                    kpi.total_assets += cell.value;
                }
            }
        }
        kpi.net_worth = kpi.total_assets - kpi.total_liabilities;
    }

    // Cumulative flows sum every cell of the dense grid, forward-filled
    // duplicates included.
    for account in accounts {
        for cell in account.entries.values() {
            kpi.cumulative_cash_flow += cell.cash_flow;
            kpi.cumulative_gain_loss += cell.gain_loss;
        }
    }

    GridSummary { by_date, kpi }
}
