pub mod report;
pub mod scrape;
pub mod store;
