pub mod scrape;
pub mod service;
pub mod settings;
pub mod sync_routine;
pub mod upload;

#[cfg(test)]
pub(crate) mod fakes;
