use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::database_ops::db::Db;
use crate::database_ops::metacritic::{scrape_platform, JsonFileCache, MetacriticClient};
use crate::normalization::Platform;

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub db_path: PathBuf,
    pub cache_dir: PathBuf,
    pub platform: Platform,
}

impl ScrapeConfig {
    /// One page cache file per platform.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir
            .join(format!("cache_{}.json", self.platform.code()))
    }
}

pub async fn run(cfg: ScrapeConfig) -> Result<()> {
    let client = MetacriticClient::from_env()?;
    let mut cache = JsonFileCache::load(cfg.cache_path());
    let db = Db::connect(&cfg.db_path, 1).await?;

    println!("Fetching data for {}", cfg.platform);
    let summary = scrape_platform(&db, &client, &mut cache, cfg.platform).await?;
    info!(
        platform = %summary.platform,
        pages = summary.pages,
        games = summary.games,
        new_companies = summary.new_companies,
        cached_pages = cache.len(),
        "scrape finished"
    );
    println!(
        "Stored {} games and {} new companies for {}",
        summary.written.games, summary.written.companies, summary.platform
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_file_is_named_after_platform_code() {
        let cfg = ScrapeConfig {
            db_path: PathBuf::from("cache/db.sqlite"),
            cache_dir: PathBuf::from("cache"),
            platform: Platform::XboxSeriesX,
        };
        assert_eq!(
            cfg.cache_path(),
            PathBuf::from("cache").join("cache_xbox-series-x.json")
        );
    }
}
