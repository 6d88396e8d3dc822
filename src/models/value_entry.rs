use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Id;

/// One reported balance for an account on a calendar day.
///
/// `(account_id, date)` is the logical key; writing the same pair again
/// replaces the stored values (upsert). `value` is the total balance;
/// `cash_flow` and `gain_loss` decompose the change since the previous
/// entry for the same account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub id: Id,
    pub account_id: Id,
    pub date: NaiveDate,
    pub value: f64,
    /// Net external money movement. Positive = money in. For liabilities the
    /// sign follows the owner's pocket, not the account balance.
    pub cash_flow: f64,
    /// Appreciation or depreciation independent of external movement.
    pub gain_loss: f64,
}

impl ValueEntry {
    pub fn new(account_id: Id, date: NaiveDate, value: f64, cash_flow: f64, gain_loss: f64) -> Self {
        Self {
            id: Id::new(),
            account_id,
            date,
            value,
            cash_flow,
            gain_loss,
        }
    }
}
