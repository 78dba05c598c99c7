pub mod entry;
pub mod ledger;
pub mod transaction;

pub use entry::LedgerEntry;
pub use ledger::{ChainVerification, Ledger};
pub use transaction::Transaction;
