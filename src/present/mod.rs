//! Presentation adapters: text tables and chart artifacts built from report rows.

pub mod chart;
pub mod table;

use crate::query::{CompanyRow, GameRow};

pub use chart::ChartSeries;
pub use table::{render_table, TableOptions};

/// A single rendered cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(Option<String>),
    Int(Option<i64>),
    Score(Option<f64>),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => v.map(|i| i as f64),
            Cell::Score(v) => *v,
            Cell::Text(_) => None,
        }
    }

    /// Display text; scores get one decimal, absent values a dash.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(Some(s)) => s.clone(),
            Cell::Int(Some(i)) => i.to_string(),
            Cell::Score(Some(f)) => format!("{f:.1}"),
            Cell::Text(None) | Cell::Int(None) | Cell::Score(None) => "-".to_string(),
        }
    }
}

/// A report row with a fixed column layout.
pub trait ReportRow {
    const HEADERS: &'static [&'static str];

    /// Cells in `HEADERS` order.
    fn cells(&self) -> Vec<Cell>;

    /// Category label used on a bar chart's x axis.
    fn label(&self) -> String;
}

impl ReportRow for GameRow {
    const HEADERS: &'static [&'static str] = &[
        "GameName",
        "Platform",
        "MetaScore",
        "UserScore",
        "Developer",
        "NumOfOnlinePlayers",
        "Ratings",
        "Genres",
        "LaunchDate",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(Some(self.name.clone())),
            Cell::Text(Some(self.platform.clone())),
            Cell::Score(self.meta_score),
            Cell::Score(self.user_score),
            Cell::Text(self.developers.clone()),
            Cell::Int(self.online_players),
            Cell::Text(self.rating.clone()),
            Cell::Text(self.genres.clone()),
            Cell::Text(self.launch_date.clone()),
        ]
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.platform)
    }
}

impl ReportRow for CompanyRow {
    const HEADERS: &'static [&'static str] = &[
        "CompanyName",
        "GameCount",
        "AverageMetaScore",
        "AverageUserScore",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(Some(self.name.clone())),
            Cell::Int(Some(self.game_count)),
            Cell::Score(self.avg_meta_score),
            Cell::Score(self.avg_user_score),
        ]
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_follow_header_order() {
        let row = GameRow {
            name: "Astro Bot".into(),
            platform: "PlayStation 5".into(),
            meta_score: Some(94.0),
            user_score: None,
            developers: Some("Team Asobi".into()),
            online_players: Some(0),
            rating: None,
            genres: Some("Platformer".into()),
            launch_date: Some("2024-09-06".into()),
        };
        let cells = row.cells();
        assert_eq!(cells.len(), GameRow::HEADERS.len());
        let shown: Vec<String> = cells.iter().map(Cell::display).collect();
        assert_eq!(
            shown,
            vec![
                "Astro Bot",
                "PlayStation 5",
                "94.0",
                "-",
                "Team Asobi",
                "0",
                "-",
                "Platformer",
                "2024-09-06"
            ]
        );
        assert_eq!(row.label(), "Astro Bot (PlayStation 5)");
    }

    #[test]
    fn company_cells_have_four_columns() {
        let row = CompanyRow {
            name: "Nintendo".into(),
            game_count: 12,
            avg_meta_score: Some(85.26),
            avg_user_score: Some(8.0),
        };
        assert_eq!(CompanyRow::HEADERS.len(), 4);
        assert_eq!(row.cells()[1].as_number(), Some(12.0));
        assert_eq!(row.cells()[2].display(), "85.3");
    }
}
