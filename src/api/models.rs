// API request/response models (DTOs)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalization::Platform;
use crate::query::{CompanyRow, GameRow, RawOptions};

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(Meta::now()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            meta: Some(Meta::now()),
        }
    }
}

/// Metadata included in all API responses
#[derive(Debug, Serialize, Deserialize)]
pub struct Meta {
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
    pub version: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
}

/// Earliest launch date assumed when the form leaves the start date empty.
pub const DEFAULT_START_DATE: &str = "2000-01-01";

/// Report filters as submitted by the search forms.
///
/// Every field is text; option validation reports malformed values in its
/// usual order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    pub platform: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub mode: Option<String>,
    /// Comma-separated content ratings.
    pub ratings: Option<String>,
    pub record: Option<String>,
    pub sortby: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    /// `none`, `bar` or `line`.
    pub plots: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ReportQuery {
    /// Map form fields onto command-line style options. The date filter is
    /// always present: an empty start date becomes [`DEFAULT_START_DATE`] and
    /// an empty end date leaves the range open-ended.
    pub fn to_raw_options(&self) -> RawOptions {
        let defaults = RawOptions::default();

        let mut dates = vec![non_empty(&self.start_date)
            .unwrap_or(DEFAULT_START_DATE)
            .to_string()];
        if let Some(end) = non_empty(&self.end_date) {
            dates.push(end.to_string());
        }

        let ratings: Vec<String> = non_empty(&self.ratings)
            .map(|r| {
                r.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let plots = non_empty(&self.plots).unwrap_or("none");

        RawOptions {
            platform: non_empty(&self.platform)
                .map(String::from)
                .unwrap_or(defaults.platform),
            launch_date: Some(dates),
            mode: non_empty(&self.mode).map(String::from).unwrap_or(defaults.mode),
            ratings: (!ratings.is_empty()).then_some(ratings),
            record: non_empty(&self.record)
                .map(String::from)
                .unwrap_or(defaults.record),
            sort_by: non_empty(&self.sortby)
                .map(String::from)
                .unwrap_or(defaults.sort_by),
            order: non_empty(&self.order).map(String::from).unwrap_or(defaults.order),
            limit: non_empty(&self.limit)
                .map(String::from)
                .unwrap_or(defaults.limit),
            bar: plots == "bar",
            line_chart: plots == "line",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportRows {
    Games(Vec<GameRow>),
    Companies(Vec<CompanyRow>),
}

/// Rows of a report plus the Vega-Lite spec of the requested chart.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub rows: ReportRows,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    /// Label as stored.
    pub platform: String,
    /// Command-line code, when the label is a known platform.
    pub code: Option<Platform>,
    pub games: i64,
}
