pub mod database;
pub mod metrics;
pub mod prompts;
pub mod providers;

pub use database::{LibrarianDb, UpsertStats};
