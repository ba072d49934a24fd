use anyhow::{bail, Context, Result};
use itertools::Itertools;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    FromRow, QueryBuilder, Row, Sqlite, SqlitePool,
};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct Db {
    pub pool: SqlitePool,
}

/// Review total paired with the share of positive reviews; one never exists
/// without the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewStats {
    pub total: i64,
    pub positive: f64,
}

impl ReviewStats {
    /// Built from per-bucket review counts, positive bucket first. `None` when
    /// there are no buckets or no reviews at all.
    pub fn from_counts(counts: &[i64]) -> Option<Self> {
        let first = *counts.first()?;
        let total: i64 = counts.iter().sum();
        if total <= 0 {
            return None;
        }
        Some(Self {
            total,
            positive: first as f64 / total as f64,
        })
    }
}

/// One scraped game, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub name: String,
    /// ISO `YYYY-MM-DD`.
    pub launch_date: String,
    /// Platform label as printed on the site.
    pub platform: String,
    pub meta_score: Option<f64>,
    pub user_score: Option<f64>,
    pub developers: Vec<String>,
    pub online_players: Option<i64>,
    pub rating: Option<String>,
    pub critic_reviews: Option<ReviewStats>,
    pub user_reviews: Option<ReviewStats>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub name: String,
    pub url: String,
    pub review_total: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCount {
    pub platform: String,
    pub games: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub companies: usize,
    pub games: usize,
    pub genres: usize,
    pub links: usize,
}

const CREATE_TABLES: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS "Games" (
        "Id"            INTEGER NOT NULL UNIQUE,
        "GameName"      TEXT NOT NULL,
        "LaunchDate"    TEXT,
        "Platform"      TEXT,
        "MetaScore"     REAL,
        "UserScore"     REAL,
        "Developer"     TEXT,
        "NumOfPlayers"  INTEGER,
        "Ratings"       TEXT,
        "CriticTotal"   INTEGER,
        "CriticPositive" REAL,
        "UserTotal"     INTEGER,
        "UserPositive"  REAL,
        "Genres"        TEXT,
        PRIMARY KEY("Id" AUTOINCREMENT)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Genres" (
        "GameId"    INTEGER NOT NULL,
        "Genre"     TEXT NOT NULL,
        FOREIGN KEY("GameId") REFERENCES "Games"("Id")
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Companies" (
        "CompanyId"     INTEGER NOT NULL UNIQUE,
        "CompanyName"   TEXT NOT NULL UNIQUE,
        "URL"           TEXT,
        "TotalGames"    INTEGER,
        PRIMARY KEY("CompanyId" AUTOINCREMENT)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "Game2Company" (
        "GameId"    INTEGER NOT NULL,
        "CompanyId" INTEGER NOT NULL,
        FOREIGN KEY("GameId") REFERENCES "Games"("Id"),
        FOREIGN KEY("CompanyId") REFERENCES "Companies"("CompanyId")
    )
    "#,
];

/// SQLite reports a missing table as a generic error; match on the message.
pub fn is_missing_table_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("no such table"),
        _ => false,
    }
}

impl Db {
    /// Open (creating if needed) the store file at `path`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn connect(path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        info!("connected to db");
        Ok(Self { pool })
    }

    /// Private in-memory store; a single never-recycled connection keeps the
    /// data alive for the lifetime of the pool.
    pub async fn connect_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Execute an assembled read query and decode each row in SELECT order.
    pub async fn run_query<T>(&self, mut qb: QueryBuilder<'_, Sqlite>) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        debug!(sql = qb.sql(), "run_query");
        qb.build_query_as::<T>().fetch_all(&self.pool).await
    }

    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    #[instrument(skip(self))]
    pub async fn create_tables(&self) -> Result<()> {
        for stmt in CREATE_TABLES {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Company name to identity; empty when the schema does not exist yet.
    #[instrument(skip(self))]
    pub async fn existing_companies(&self) -> Result<HashMap<String, i64>> {
        match sqlx::query("SELECT CompanyId, CompanyName FROM Companies")
            .fetch_all(&self.pool)
            .await
        {
            Ok(rows) => Ok(rows
                .iter()
                .map(|r| (r.get::<String, _>("CompanyName"), r.get::<i64, _>("CompanyId")))
                .collect()),
            Err(e) if is_missing_table_error(&e) => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Game counts per stored platform label; empty when nothing was written yet.
    #[instrument(skip(self))]
    pub async fn platform_summary(&self) -> Result<Vec<PlatformCount>> {
        match sqlx::query(
            "SELECT Platform, COUNT(*) AS GameCount FROM Games GROUP BY Platform ORDER BY Platform",
        )
        .fetch_all(&self.pool)
        .await
        {
            Ok(rows) => Ok(rows
                .iter()
                .map(|r| PlatformCount {
                    platform: r
                        .get::<Option<String>, _>("Platform")
                        .unwrap_or_default(),
                    games: r.get("GameCount"),
                })
                .collect()),
            Err(e) if is_missing_table_error(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write new companies and games in one transaction.
    ///
    /// Companies are inserted first; every developer named on a game must then
    /// resolve to a stored company or the whole batch is rolled back.
    #[instrument(skip(self, companies, games), fields(companies = companies.len(), games = games.len()))]
    pub async fn write_records(
        &self,
        companies: &[CompanyRecord],
        games: &[GameRecord],
    ) -> Result<WriteSummary> {
        let mut tx = self.pool.begin().await?;
        let mut summary = WriteSummary::default();

        for c in companies {
            sqlx::query("INSERT INTO Companies (CompanyName, URL, TotalGames) VALUES (?, ?, ?)")
                .bind(&c.name)
                .bind(&c.url)
                .bind(c.review_total)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("insert company {}", c.name))?;
            summary.companies += 1;
        }

        let company_ids: HashMap<String, i64> =
            sqlx::query("SELECT CompanyId, CompanyName FROM Companies")
                .fetch_all(&mut *tx)
                .await?
                .iter()
                .map(|r| (r.get::<String, _>("CompanyName"), r.get::<i64, _>("CompanyId")))
                .collect();

        for g in games {
            let dev_ids = g
                .developers
                .iter()
                .map(|dev| match company_ids.get(dev) {
                    Some(id) => Ok(*id),
                    None => bail!("game {:?} names unknown developer {:?}", g.name, dev),
                })
                .collect::<Result<Vec<i64>>>()?;

            let game_id = sqlx::query(
                "INSERT INTO Games (GameName, LaunchDate, Platform, MetaScore, UserScore, Developer, \
                 NumOfPlayers, Ratings, CriticTotal, CriticPositive, UserTotal, UserPositive, Genres) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&g.name)
            .bind(&g.launch_date)
            .bind(&g.platform)
            .bind(g.meta_score)
            .bind(g.user_score)
            .bind(g.developers.iter().join(", "))
            .bind(g.online_players)
            .bind(g.rating.as_deref())
            .bind(g.critic_reviews.map(|r| r.total))
            .bind(g.critic_reviews.map(|r| r.positive))
            .bind(g.user_reviews.map(|r| r.total))
            .bind(g.user_reviews.map(|r| r.positive))
            .bind(g.genres.iter().join(", "))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert game {}", g.name))?
            .last_insert_rowid();
            summary.games += 1;

            if !g.genres.is_empty() {
                let mut qb: QueryBuilder<'_, Sqlite> =
                    QueryBuilder::new("INSERT INTO Genres (GameId, Genre) ");
                qb.push_values(&g.genres, |mut b, genre| {
                    b.push_bind(game_id).push_bind(genre.as_str());
                });
                qb.build().execute(&mut *tx).await?;
                summary.genres += g.genres.len();
            }

            if !dev_ids.is_empty() {
                let mut qb: QueryBuilder<'_, Sqlite> =
                    QueryBuilder::new("INSERT INTO Game2Company (GameId, CompanyId) ");
                qb.push_values(&dev_ids, |mut b, company_id| {
                    b.push_bind(game_id).push_bind(*company_id);
                });
                qb.build().execute(&mut *tx).await?;
                summary.links += dev_ids.len();
            }
        }

        tx.commit().await?;
        info!(
            companies = summary.companies,
            games = summary.games,
            genres = summary.genres,
            links = summary.links,
            "records written"
        );
        Ok(summary)
    }
}

/// Delete the store file. Returns whether anything was removed.
pub fn drop_store(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    std::fs::remove_file(path).with_context(|| format!("failed to delete {}", path.display()))?;
    info!(path = %path.display(), "store deleted");
    Ok(true)
}
