mod forward_fill;
mod models;
mod service;

pub use forward_fill::project_dense;
pub use models::{
    DateSummary, GridAccount, GridData, GridEntry, GridKpi, GridQuery, GridSummary,
};
pub use service::GridService;
