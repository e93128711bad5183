pub mod fantoccini_log_viewer;
pub mod fantoccini_scraper_driver;
pub mod scraper_driver;
