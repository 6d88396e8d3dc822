mod account;
mod id;
mod value_entry;

pub use account::{Account, AccountType};
pub use id::{Id, IdError};
pub use value_entry::ValueEntry;
