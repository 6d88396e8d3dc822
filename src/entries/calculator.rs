//! Reconciliation of a reported account value into its cash-flow and
//! gain/loss components.

use crate::errors::{Error, Result};
use crate::models::AccountType;

/// Absolute tolerance for the consistency check when the caller reports the
/// full decomposition themselves.
pub const CONSISTENCY_TOLERANCE: f64 = 0.0001;

/// Which parts of the decomposition the caller reported alongside the value.
///
/// A reported `0` counts as reported; only absent/null inputs leave a
/// component to be derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scenario {
    /// Both components reported: verify they add up, change nothing.
    Reported { cash_flow: f64, gain_loss: f64 },
    /// Only cash flow reported: derive the gain/loss remainder.
    CashFlowOnly { cash_flow: f64 },
    /// Only gain/loss reported: derive the cash-flow remainder.
    GainLossOnly { gain_loss: f64 },
    /// Value alone: attribute the whole delta by account type.
    ValueOnly,
}

impl Scenario {
    pub fn from_inputs(cash_flow: Option<f64>, gain_loss: Option<f64>) -> Self {
        match (cash_flow, gain_loss) {
            (Some(cash_flow), Some(gain_loss)) => Self::Reported {
                cash_flow,
                gain_loss,
            },
            (Some(cash_flow), None) => Self::CashFlowOnly { cash_flow },
            (None, Some(gain_loss)) => Self::GainLossOnly { gain_loss },
            (None, None) => Self::ValueOnly,
        }
    }
}

/// A fully determined decomposition satisfying
/// `value == previous_value + cash_flow * multiplier + gain_loss`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciled {
    pub cash_flow: f64,
    pub gain_loss: f64,
}

/// Resolve `cash_flow` and `gain_loss` for a newly reported `value`.
///
/// `previous_value` is the value of the chronologically nearest earlier entry
/// for the same account (0 when the entry is the account's first). The
/// account type fixes the cash-flow sign convention and, when nothing was
/// reported, decides whether the delta reads as a deposit or as market
/// movement.
pub fn reconcile(
    value: f64,
    previous_value: f64,
    account_type: AccountType,
    scenario: Scenario,
) -> Result<Reconciled> {
    let multiplier = account_type.cash_flow_multiplier();

    match scenario {
        Scenario::Reported {
            cash_flow,
            gain_loss,
        } => {
            let expected = previous_value + cash_flow * multiplier + gain_loss;
            if (expected - value).abs() > CONSISTENCY_TOLERANCE {
                return Err(Error::validation(
                    "inconsistent data: previous value + cash flow + gain/loss does not equal new value",
                ));
            }
            Ok(Reconciled {
                cash_flow,
                gain_loss,
            })
        }
        Scenario::CashFlowOnly { cash_flow } => Ok(Reconciled {
            cash_flow,
            gain_loss: value - previous_value - cash_flow * multiplier,
        }),
        // The multiplier is its own inverse (±1), so it converts the raw
        // delta back into the shared sign convention.
        Scenario::GainLossOnly { gain_loss } => Ok(Reconciled {
            cash_flow: (value - previous_value - gain_loss) * multiplier,
            gain_loss,
        }),
        Scenario::ValueOnly => match account_type {
            AccountType::CashAsset | AccountType::Liability => Ok(Reconciled {
                cash_flow: (value - previous_value) * multiplier,
                gain_loss: 0.0,
            }),
            AccountType::InvestmentAsset => Ok(Reconciled {
                cash_flow: 0.0,
                gain_loss: value - previous_value,
            }),
        },
    }
}
