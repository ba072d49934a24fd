use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::database_ops::db::Db;
use crate::present::{render_table, ChartSeries, TableOptions};
use crate::query::{build_report, validate, ChartMode, RawOptions, Report, ReportOptions, View};

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub db_path: PathBuf,
    pub view: View,
    pub options: RawOptions,
    /// Where bar and line charts are written.
    pub chart_out: PathBuf,
}

/// What a report turns into on the terminal and on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub table: Option<String>,
    pub chart: Option<ChartSeries>,
}

pub fn render(opts: &ReportOptions, report: &Report) -> Rendered {
    match report {
        Report::Games(rows) => Rendered {
            table: Some(render_table(rows, TableOptions::default())),
            chart: (opts.chart == ChartMode::Bar)
                .then(|| ChartSeries::bar(opts.view, opts.sort_by, rows)),
        },
        Report::Companies(rows) => Rendered {
            table: Some(render_table(rows, TableOptions::default())),
            chart: (opts.chart == ChartMode::Bar)
                .then(|| ChartSeries::bar(opts.view, opts.sort_by, rows)),
        },
        Report::Monthly(rows) => Rendered {
            table: None,
            chart: Some(ChartSeries::monthly(rows)),
        },
    }
}

fn chart_title(opts: &ReportOptions) -> String {
    match (opts.chart, opts.view) {
        (ChartMode::Line, _) => "Games per month".to_string(),
        (_, View::Games) => "Games".to_string(),
        (_, View::Companies) => "Companies".to_string(),
    }
}

/// Validate, query, print the table and write any requested chart.
pub async fn run(cfg: ReportConfig) -> Result<()> {
    let opts = validate(cfg.view, &cfg.options)?;
    if !cfg.db_path.is_file() {
        bail!("Database not found at {}", cfg.db_path.display());
    }
    let db = Db::connect(&cfg.db_path, 1).await?;
    let report = build_report(&db, &opts).await?;
    info!(view = ?opts.view, rows = report.len(), "report ready");

    let rendered = render(&opts, &report);
    if let Some(table) = rendered.table {
        println!("{table}");
    }
    if let Some(chart) = rendered.chart {
        std::fs::write(&cfg.chart_out, chart.to_html_page(&chart_title(&opts)))
            .with_context(|| format!("failed to write {}", cfg.chart_out.display()))?;
        println!("Chart written to {}", cfg.chart_out.display());
    }
    Ok(())
}
