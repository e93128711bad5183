pub mod config;
pub mod scraping;
pub mod sheets;
pub mod snapshot;
