//! SQLite implementations of storage interfaces.

mod confirmation_store;

pub use confirmation_store::SqliteConfirmationStore;
