pub mod database;
pub mod history;

pub use database::{Database, PoolConfig};
pub use history::HistoryStore;
