mod service;

pub use service::{AccountService, CreateAccount, UpdateAccount};
