use anyhow::Result;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

use crate::database_ops::db::{drop_store, Db, PlatformCount};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

/// Human-readable summary of what the store holds.
pub fn format_status(counts: &[PlatformCount]) -> String {
    let mut out = String::new();
    if counts.is_empty() {
        writeln!(out, "No games cached yet").ok();
        return out;
    }
    let total: i64 = counts.iter().map(|c| c.games).sum();
    for c in counts {
        writeln!(out, "{:<16} {:>6}", c.platform, c.games).ok();
    }
    writeln!(out, "{:<16} {:>6}", "total", total).ok();
    out
}

/// Print cached platforms with their game counts.
pub async fn status(cfg: &StoreConfig) -> Result<()> {
    if !cfg.db_path.is_file() {
        println!("Database not found");
        return Ok(());
    }
    let db = Db::connect(&cfg.db_path, 1).await?;
    let counts = db.platform_summary().await?;
    print!("{}", format_status(&counts));
    Ok(())
}

pub fn delete(cfg: &StoreConfig) -> Result<()> {
    if drop_store(&cfg.db_path)? {
        println!("Deleted the database");
    } else {
        info!(path = %cfg.db_path.display(), "nothing to delete");
        println!("Database not found");
    }
    Ok(())
}
