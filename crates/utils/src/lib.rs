pub mod store;
pub mod trades;

// Re-export commonly used items
pub use crate::store::{
    initial_balance, load_trades, save_trades, set_initial_balance, JsonFileStore, KeyValueStore,
    MemoryStore, DEFAULT_INITIAL_BALANCE, INITIAL_BALANCE_KEY, TRADES_KEY,
};
pub use crate::trades::{
    merge_trades_with_deduplication, sort_trades_by_date, trade_signature, MergeStats,
};
