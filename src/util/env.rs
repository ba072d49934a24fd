//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Once;
use std::time::Duration;
use tracing::info;

static INIT: Once = Once::new();

pub const DEFAULT_DB_PATH: &str = "cache/db.sqlite";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_BASE_URL: &str = "https://www.metacritic.com";
pub const DEFAULT_SCRAPE_DELAY_MS: u64 = 250;

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Common bootstrap for CLI binaries: load the env and log where the store lives.
pub fn bootstrap_cli(bin_name: &str) {
    init_env();
    info!(
        target = "bootstrap",
        bin = bin_name,
        db_path = %db_path().display(),
        cache_dir = %cache_dir().display(),
        "configuration resolved"
    );
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

/// SQLite store location (`MC_DB_PATH`).
pub fn db_path() -> PathBuf {
    env_opt("MC_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
}

/// Directory holding the per-platform page caches (`MC_CACHE_DIR`).
pub fn cache_dir() -> PathBuf {
    env_opt("MC_CACHE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
}

/// Site root used to build listing URLs and resolve relative links (`MC_BASE_URL`).
pub fn base_url() -> String {
    env_opt("MC_BASE_URL")
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Pause before every uncached page request (`SCRAPE_DELAY_MS`).
pub fn scrape_delay() -> Duration {
    Duration::from_millis(env_parse("SCRAPE_DELAY_MS", DEFAULT_SCRAPE_DELAY_MS))
}

/// Per-request HTTP timeout in seconds (`SCRAPE_TIMEOUT_SECS`); the client falls back to 30.
pub fn scrape_timeout_secs() -> Option<u64> {
    env_opt("SCRAPE_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok())
}
