mod calculator;
mod service;

pub use calculator::{reconcile, Reconciled, Scenario, CONSISTENCY_TOLERANCE};
pub use service::{
    AddColumnFailure, AddColumnOutcome, UpsertValueEntry, ValueEntryService,
};
