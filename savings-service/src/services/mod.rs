pub mod database;
pub mod filter;
pub mod metrics;
pub mod store;

pub use database::MongoSavingsStore;
pub use filter::{DateFilter, SavingFilter};
pub use metrics::{get_metrics, init_metrics, record_operation};
pub use store::{InMemorySavingsStore, SavingsStore};
