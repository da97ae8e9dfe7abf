pub mod database;
pub mod metrics;
pub mod numbering;
pub mod query;
pub mod summary;
pub mod tax;

pub use database::Database;
