pub mod analyze;
pub mod chunks;
pub mod crawl;
pub mod cutter;
pub mod health;
pub mod mads;
