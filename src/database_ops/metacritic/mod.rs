pub mod cache;
pub mod parse;
pub mod pipeline;
pub mod provider;

pub use cache::{JsonFileCache, MemoryCache, PageCache};
pub use pipeline::{scrape_platform, ScrapeSummary};
pub use provider::MetacriticClient;
