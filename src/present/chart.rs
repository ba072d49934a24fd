//! Chart series extraction and Vega-Lite artifacts.

use serde::Serialize;
use serde_json::{json, Value};

use crate::query::{MonthlyCount, SortKey, View};

use super::ReportRow;

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const VEGA_SCRIPTS: [&str; 3] = [
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// An x/y series plus axis titles; everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub x_title: String,
    pub y_title: String,
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
}

/// Column plotted for a sort key: games use the score columns (2 meta,
/// 3 user); companies use 1 for count, 2 for meta, 3 for user.
pub fn y_column(view: View, sort_by: SortKey) -> usize {
    match (view, sort_by) {
        (_, SortKey::User) => 3,
        (View::Games, _) | (View::Companies, SortKey::Meta) => 2,
        (View::Companies, SortKey::Count) => 1,
    }
}

fn y_title(sort_by: SortKey) -> &'static str {
    match sort_by {
        SortKey::User => "UserScore",
        SortKey::Meta => "MetaScore",
        SortKey::Count => "GameCount",
    }
}

fn view_title(view: View) -> &'static str {
    match view {
        View::Games => "games",
        View::Companies => "companies",
    }
}

impl ChartSeries {
    pub fn bar<R: ReportRow>(view: View, sort_by: SortKey, rows: &[R]) -> Self {
        let column = y_column(view, sort_by);
        Self {
            kind: ChartKind::Bar,
            x_title: view_title(view).to_string(),
            y_title: y_title(sort_by).to_string(),
            x: rows.iter().map(ReportRow::label).collect(),
            y: rows
                .iter()
                .map(|row| row.cells().get(column).and_then(|c| c.as_number()))
                .collect(),
        }
    }

    pub fn monthly(rows: &[MonthlyCount]) -> Self {
        Self {
            kind: ChartKind::Line,
            x_title: "Time".to_string(),
            y_title: "GameCount".to_string(),
            x: rows.iter().map(|r| r.month.clone()).collect(),
            y: rows.iter().map(|r| Some(r.games as f64)).collect(),
        }
    }

    pub fn to_vega_lite(&self) -> Value {
        let values: Vec<Value> = self
            .x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| json!({ "x": x, "y": y }))
            .collect();
        let mark = match self.kind {
            ChartKind::Bar => json!("bar"),
            ChartKind::Line => json!({ "type": "line", "point": true }),
        };
        let x_type = match self.kind {
            ChartKind::Bar => "nominal",
            ChartKind::Line => "ordinal",
        };
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "width": "container",
            "mark": mark,
            "data": { "values": values },
            "encoding": {
                "x": { "field": "x", "type": x_type, "title": self.x_title, "sort": null },
                "y": { "field": "y", "type": "quantitative", "title": self.y_title },
            },
        })
    }

    /// Embeddable fragment: a target `<div>` plus the scripts that render into it.
    pub fn to_html(&self, div_id: &str) -> String {
        let scripts: String = VEGA_SCRIPTS
            .iter()
            .map(|src| format!("<script src=\"{src}\"></script>\n"))
            .collect();
        format!(
            "<div id=\"{div_id}\" style=\"width:100%\"></div>\n{scripts}<script>vegaEmbed(\"#{div_id}\", {spec});</script>\n",
            spec = self.to_vega_lite().to_string().replace("</", "<\\/")
        )
    }

    /// Standalone page wrapping [`Self::to_html`].
    pub fn to_html_page(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}</body>\n</html>\n",
            escape_html(title),
            self.to_html("chart")
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CompanyRow, GameRow};

    fn game(name: &str, meta: f64, user: Option<f64>) -> GameRow {
        GameRow {
            name: name.into(),
            platform: "Switch".into(),
            meta_score: Some(meta),
            user_score: user,
            developers: None,
            online_players: None,
            rating: None,
            genres: None,
            launch_date: None,
        }
    }

    #[test]
    fn column_mapping_per_view() {
        assert_eq!(y_column(View::Games, SortKey::Meta), 2);
        assert_eq!(y_column(View::Games, SortKey::User), 3);
        assert_eq!(y_column(View::Companies, SortKey::Count), 1);
        assert_eq!(y_column(View::Companies, SortKey::Meta), 2);
        assert_eq!(y_column(View::Companies, SortKey::User), 3);
    }

    #[test]
    fn games_bar_uses_name_and_platform_labels() {
        let rows = [game("Metroid Dread", 88.0, Some(8.7)), game("Bayonetta 3", 86.0, None)];
        let meta = ChartSeries::bar(View::Games, SortKey::Meta, &rows);
        assert_eq!(meta.x, vec!["Metroid Dread (Switch)", "Bayonetta 3 (Switch)"]);
        assert_eq!(meta.y, vec![Some(88.0), Some(86.0)]);
        assert_eq!(meta.x_title, "games");
        assert_eq!(meta.y_title, "MetaScore");

        let user = ChartSeries::bar(View::Games, SortKey::User, &rows);
        assert_eq!(user.y, vec![Some(8.7), None]);
        assert_eq!(user.y_title, "UserScore");
    }

    #[test]
    fn companies_bar_plots_game_count_for_count_sort() {
        let rows = [CompanyRow {
            name: "Sega".into(),
            game_count: 7,
            avg_meta_score: Some(75.0),
            avg_user_score: Some(7.1),
        }];
        let series = ChartSeries::bar(View::Companies, SortKey::Count, &rows);
        assert_eq!(series.x, vec!["Sega"]);
        assert_eq!(series.y, vec![Some(7.0)]);
        assert_eq!(series.y_title, "GameCount");
    }

    #[test]
    fn monthly_series_renders_as_line_spec() {
        let series = ChartSeries::monthly(&[
            MonthlyCount {
                month: "2021-03".into(),
                games: 2,
            },
            MonthlyCount {
                month: "2021-04".into(),
                games: 1,
            },
        ]);
        let spec = series.to_vega_lite();
        assert_eq!(spec["mark"]["type"], "line");
        assert_eq!(spec["encoding"]["x"]["title"], "Time");
        assert_eq!(spec["encoding"]["y"]["title"], "GameCount");
        assert_eq!(spec["data"]["values"][1], json!({ "x": "2021-04", "y": 1.0 }));

        let html = series.to_html("monthly");
        assert!(html.starts_with("<div id=\"monthly\""));
        assert!(html.contains("vegaEmbed(\"#monthly\""));
        assert!(series.to_html_page("Games per month").contains("<title>Games per month</title>"));
    }

    #[test]
    fn scraped_names_cannot_close_the_script_block() {
        let rows = vec![game("</script><b>x</b>", 90.0, None)];
        let series = ChartSeries::bar(View::Games, SortKey::Meta, &rows);
        let page = series.to_html_page("Top <Games> & more");
        assert_eq!(page.matches("</script>").count(), VEGA_SCRIPTS.len() + 1);
        assert!(page.contains("<\\/script><b>x<\\/b>"));
        assert!(page.contains("<title>Top &lt;Games&gt; &amp; more</title>"));
    }
}
