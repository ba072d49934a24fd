use super::{Cell, ReportRow};

#[derive(Clone, Copy, Debug, Default)]
pub struct TableOptions {
    /// Shrink the widest columns until the table fits.
    pub max_width: Option<usize>,
}

const MIN_WIDTH: usize = 4;

/// Render rows as an aligned text table with the row type's headers.
#[must_use]
pub fn render_table<R: ReportRow>(rows: &[R], options: TableOptions) -> String {
    let headers = R::HEADERS;
    let cells: Vec<Vec<Cell>> = rows.iter().map(ReportRow::cells).collect();
    let text: Vec<Vec<String>> = cells
        .iter()
        .map(|row| row.iter().map(Cell::display).collect())
        .collect();

    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            text.iter()
                .filter_map(|row| row.get(index))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();
    fit_widths(&mut widths, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate_text(header, *width), *width, false))
        .collect::<Vec<_>>()
        .join(" | ");
    let divider = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    for (row_cells, row_text) in cells.iter().zip(&text) {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row_text.get(index).map(String::as_str).unwrap_or("-");
                let numeric = row_cells
                    .get(index)
                    .is_some_and(|c| !matches!(c, Cell::Text(_)));
                pad(&truncate_text(value, *width), *width, numeric)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(line);
    }
    lines.join("\n")
}

fn fit_widths(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 3;
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let candidate = widths
            .iter()
            .enumerate()
            .filter(|(_, width)| **width > MIN_WIDTH)
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);
        let Some(idx) = candidate else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}
