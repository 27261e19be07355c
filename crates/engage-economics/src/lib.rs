pub mod storage;
pub mod wallet;

pub use storage::{LedgerEntry, LedgerReason, LedgerStorage, MemoryLedger};
pub use wallet::{BatchReceipt, WalletCredit, WalletManager};

pub use engage_types::{Honors, Usd, HONORS_PER_USD};
