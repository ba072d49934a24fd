use serde::Serialize;
use sqlx::FromRow;

/// One row of the games view, in SELECT order.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GameRow {
    #[sqlx(rename = "GameName")]
    pub name: String,
    #[sqlx(rename = "Platform")]
    pub platform: String,
    #[sqlx(rename = "MetaScore")]
    pub meta_score: Option<f64>,
    #[sqlx(rename = "UserScore")]
    pub user_score: Option<f64>,
    #[sqlx(rename = "Developer")]
    pub developers: Option<String>,
    #[sqlx(rename = "NumOfPlayers")]
    pub online_players: Option<i64>,
    #[sqlx(rename = "Ratings")]
    pub rating: Option<String>,
    #[sqlx(rename = "Genres")]
    pub genres: Option<String>,
    #[sqlx(rename = "LaunchDate")]
    pub launch_date: Option<String>,
}

/// One company summarized over the games that passed the row filters.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CompanyRow {
    #[sqlx(rename = "CompanyName")]
    pub name: String,
    #[sqlx(rename = "GameCount")]
    pub game_count: i64,
    /// Rounded to one decimal.
    #[sqlx(rename = "AverageMetaScore")]
    pub avg_meta_score: Option<f64>,
    /// Rounded to one decimal.
    #[sqlx(rename = "AverageUserScore")]
    pub avg_user_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    #[sqlx(rename = "Month")]
    pub month: String,
    #[sqlx(rename = "GameCount")]
    pub games: i64,
}
