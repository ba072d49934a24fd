use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use metacritic_report::cli::report::{self, ReportConfig};
use metacritic_report::cli::scrape::{self, ScrapeConfig};
use metacritic_report::cli::store::{self, StoreConfig};
use metacritic_report::logging::init_tracing;
use metacritic_report::normalization::Platform;
use metacritic_report::query::{RawOptions, View};
use metacritic_report::util::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mcr", version, about = "Scrape review scores and report on games and companies")]
struct Cli {
    /// SQLite store (defaults to MC_DB_PATH or cache/db.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Show cached platforms and game counts
    Status,
    /// Scrape one platform and add its games to the store
    Add {
        /// ps4|ps5|switch|xboxone|xbox-series-x
        platform: String,
        /// Page cache directory (defaults to MC_CACHE_DIR or cache)
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },
    /// Delete the store file
    Delete {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
    /// Rank games
    Games {
        #[command(flatten)]
        options: RawOptions,
        /// Chart output file for --bar / --linechart
        #[arg(long, default_value = "chart.html")]
        chart_out: PathBuf,
    },
    /// Rank companies by the games they developed
    Companies {
        #[command(flatten)]
        options: RawOptions,
        /// Chart output file for --bar / --linechart
        #[arg(long, default_value = "chart.html")]
        chart_out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn")?;
    env::bootstrap_cli("mcr");

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(env::db_path);

    match cli.command {
        Commands::Status => store::status(&StoreConfig { db_path }).await?,
        Commands::Add {
            platform,
            cache_dir,
        } => {
            let Some(platform) = Platform::from_code(&platform) else {
                bail!(
                    "unsupported platform {platform:?}; expected one of {}",
                    Platform::codes().join(", ")
                );
            };
            scrape::run(ScrapeConfig {
                db_path: db_path.clone(),
                cache_dir: cache_dir.unwrap_or_else(env::cache_dir),
                platform,
            })
            .await?;
            store::status(&StoreConfig { db_path }).await?;
        }
        Commands::Delete { yes } => {
            if !yes {
                bail!("refusing to delete the database without --yes");
            }
            store::delete(&StoreConfig { db_path })?;
        }
        Commands::Games { options, chart_out } => {
            report::run(ReportConfig {
                db_path,
                view: View::Games,
                options,
                chart_out,
            })
            .await?
        }
        Commands::Companies { options, chart_out } => {
            report::run(ReportConfig {
                db_path,
                view: View::Companies,
                options,
                chart_out,
            })
            .await?
        }
    }

    Ok(())
}
