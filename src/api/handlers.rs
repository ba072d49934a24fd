// HTTP request handlers for API endpoints

use crate::api::models::*;
use crate::database_ops::db::Db;
use crate::normalization::Platform;
use crate::present::ChartSeries;
use crate::query::compose::{query_companies, query_games, query_monthly};
use crate::query::{validate, ChartMode, QueryError, ReportOptions, View};
use actix_web::{web, HttpResponse, Result};
use std::time::Instant;

/// Shared state handed to every handler.
pub struct AppState {
    pub db: Db,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            started_at: Instant::now(),
        }
    }
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let db_status = if state.db.ping().await {
        "connected"
    } else {
        "disconnected"
    };

    let response = ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        database: db_status.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    });

    Ok(HttpResponse::Ok().json(response))
}

pub async fn games_report(
    query: web::Query<ReportQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(report(&state.db, View::Games, &query).await)
}

pub async fn companies_report(
    query: web::Query<ReportQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(report(&state.db, View::Companies, &query).await)
}

/// Cached platforms with their game counts
pub async fn list_platforms(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.db.platform_summary().await {
        Ok(counts) => {
            let entries: Vec<PlatformEntry> = counts
                .into_iter()
                .map(|c| PlatformEntry {
                    code: Platform::from_label(&c.platform),
                    platform: c.platform,
                    games: c.games,
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(entries)))
        }
        Err(e) => {
            tracing::error!(error = %e, "platform summary failed");
            Ok(HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error(format!("{e:#}"))))
        }
    }
}

async fn report(db: &Db, view: View, query: &ReportQuery) -> HttpResponse {
    let opts = match validate(view, &query.to_raw_options()) {
        Ok(opts) => opts,
        Err(e) => {
            tracing::info!(view = ?view, error = %e, "rejected report request");
            return HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()));
        }
    };

    match build_payload(db, &opts).await {
        Ok(payload) => HttpResponse::Ok().json(ApiResponse::success(payload)),
        Err(QueryError::InvalidOption(e)) => {
            HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()))
        }
        Err(e @ QueryError::Execution(_)) => {
            tracing::error!(view = ?view, error = %e, "report query failed");
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error(e.to_string()))
        }
    }
}

/// Table rows always come from the view's query; a line chart adds the
/// monthly series on top.
async fn build_payload(db: &Db, opts: &ReportOptions) -> Result<ReportPayload, QueryError> {
    let (rows, bar) = match opts.view {
        View::Games => {
            let rows = query_games(db, opts).await?;
            let bar = (opts.chart == ChartMode::Bar)
                .then(|| ChartSeries::bar(opts.view, opts.sort_by, &rows));
            (ReportRows::Games(rows), bar)
        }
        View::Companies => {
            let rows = query_companies(db, opts).await?;
            let bar = (opts.chart == ChartMode::Bar)
                .then(|| ChartSeries::bar(opts.view, opts.sort_by, &rows));
            (ReportRows::Companies(rows), bar)
        }
    };

    let chart = match opts.chart {
        ChartMode::None => None,
        ChartMode::Bar => bar.map(|series| series.to_vega_lite()),
        ChartMode::Line => {
            let months = query_monthly(db, opts).await?;
            Some(ChartSeries::monthly(&months).to_vega_lite())
        }
    };

    Ok(ReportPayload { rows, chart })
}
