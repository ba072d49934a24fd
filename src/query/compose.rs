//! Query composers: one read-only round trip per call.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, instrument};

use crate::database_ops::db::Db;

use super::error::QueryError;
use super::filters::{company_game_predicate, game_predicate};
use super::options::{validate, ChartMode, RawOptions, ReportOptions, SortKey, View};
use super::rows::{CompanyRow, GameRow, MonthlyCount};

const GAME_FIELDS: &str = "SELECT GameName, Platform, MetaScore, UserScore, Developer, \
     NumOfPlayers, Ratings, Genres, LaunchDate FROM Games";

fn game_sort_column(sort_by: SortKey) -> &'static str {
    match sort_by {
        SortKey::User => "UserScore",
        SortKey::Meta | SortKey::Count => "MetaScore",
    }
}

fn company_sort_column(sort_by: SortKey) -> &'static str {
    match sort_by {
        SortKey::Meta => "AvgMeta",
        SortKey::User => "AvgUser",
        SortKey::Count => "GameCount",
    }
}

/// Build the games-view statement without executing it.
pub fn games_query(opts: &ReportOptions) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(GAME_FIELDS);
    game_predicate(opts).push_where(&mut qb);
    qb.push(" ORDER BY ")
        .push(game_sort_column(opts.sort_by))
        .push(" ")
        .push(opts.order.sql())
        .push(" LIMIT ")
        .push_bind(opts.limit);
    qb
}

/// Build the companies-view statement: filter games, aggregate per company,
/// then threshold, sort and limit the aggregates.
pub fn companies_query(opts: &ReportOptions) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT CompanyName, GameCount, ROUND(AvgMeta, 1) AS AverageMetaScore, \
         ROUND(AvgUser, 1) AS AverageUserScore FROM (\
         SELECT Companies.CompanyName AS CompanyName, COUNT(*) AS GameCount, \
         AVG(Games.MetaScore) AS AvgMeta, AVG(Games.UserScore) AS AvgUser \
         FROM Game2Company JOIN (SELECT * FROM Games",
    );
    company_game_predicate(opts).push_where(&mut qb);
    qb.push(
        ") AS Games ON Game2Company.GameId = Games.Id \
         JOIN Companies ON Game2Company.CompanyId = Companies.CompanyId \
         GROUP BY Game2Company.CompanyId) WHERE GameCount >= ",
    )
    .push_bind(opts.record)
    .push(" ORDER BY ")
    .push(company_sort_column(opts.sort_by))
    .push(" ")
    .push(opts.order.sql())
    .push(" LIMIT ")
    .push_bind(opts.limit);
    qb
}

/// Build the monthly time-series statement; sort and limit do not apply.
pub fn monthly_query(opts: &ReportOptions) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(
        "SELECT COALESCE(SUBSTR(LaunchDate, 1, 7), 'unknown') AS Month, COUNT(*) AS GameCount \
         FROM Games",
    );
    game_predicate(opts).push_where(&mut qb);
    qb.push(" GROUP BY Month ORDER BY Month ASC");
    qb
}

#[instrument(skip_all, fields(sort = ?opts.sort_by, limit = opts.limit))]
pub async fn query_games(db: &Db, opts: &ReportOptions) -> Result<Vec<GameRow>, QueryError> {
    let rows = db.run_query(games_query(opts)).await?;
    debug!(rows = rows.len(), "games query finished");
    Ok(rows)
}

#[instrument(skip_all, fields(sort = ?opts.sort_by, limit = opts.limit))]
pub async fn query_companies(
    db: &Db,
    opts: &ReportOptions,
) -> Result<Vec<CompanyRow>, QueryError> {
    let rows = db.run_query(companies_query(opts)).await?;
    debug!(rows = rows.len(), "companies query finished");
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn query_monthly(db: &Db, opts: &ReportOptions) -> Result<Vec<MonthlyCount>, QueryError> {
    let rows = db.run_query(monthly_query(opts)).await?;
    debug!(buckets = rows.len(), "monthly query finished");
    Ok(rows)
}

/// Rows produced for one validated option set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum Report {
    Games(Vec<GameRow>),
    Companies(Vec<CompanyRow>),
    Monthly(Vec<MonthlyCount>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::Games(rows) => rows.len(),
            Report::Companies(rows) => rows.len(),
            Report::Monthly(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Route a validated option set to its composer. A line chart request
/// always yields the monthly series, whatever the view.
pub async fn build_report(db: &Db, opts: &ReportOptions) -> Result<Report, QueryError> {
    if opts.chart == ChartMode::Line {
        return Ok(Report::Monthly(query_monthly(db, opts).await?));
    }
    match opts.view {
        View::Games => Ok(Report::Games(query_games(db, opts).await?)),
        View::Companies => Ok(Report::Companies(query_companies(db, opts).await?)),
    }
}

/// Validate then run; invalid options never reach the store.
pub async fn run_report(
    db: &Db,
    view: View,
    raw: &RawOptions,
) -> Result<(ReportOptions, Report), QueryError> {
    let opts = validate(view, raw)?;
    let report = build_report(db, &opts).await?;
    Ok((opts, report))
}
