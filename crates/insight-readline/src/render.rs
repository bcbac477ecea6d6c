//! Plain-text rendering of resolved charts.

use std::fmt::Write;

use insight_core::chart::ChartSeries;
use insight_core::query::{ResolvedChart, SessionSnapshot};

const CATEGORY_HEADER: &str = "Category";

/// Renders a chart as a table: one row per category, one column per series.
pub fn render_table(series: &ChartSeries) -> String {
    let mut header = vec![CATEGORY_HEADER.to_string()];
    header.extend(series.series_names().map(str::to_string));

    let rows: Vec<Vec<String>> = series
        .groups
        .iter()
        .map(|group| {
            let mut row = vec![group.label.clone()];
            row.extend(group.values.iter().map(|entry| format_value(entry.value)));
            row
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            std::iter::once(&header)
                .chain(rows.iter())
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

/// Title line, metadata line, then the table.
pub fn render_chart(chart: &ResolvedChart) -> String {
    let resolved_at = chart
        .resolved_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S");
    format!(
        "{}\n[{}] \"{}\" resolved at {}\n{}",
        chart.series.title,
        chart.series.kind,
        chart.source_query,
        resolved_at,
        render_table(&chart.series)
    )
}

pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "state:      {}", snapshot.state);
    let _ = writeln!(out, "draft:      {}", display_or_dash(&snapshot.input_text));
    let _ = writeln!(out, "submission: #{}", snapshot.sequence);
    let _ = writeln!(out, "history:    {} queries", snapshot.history.len());
    if let Some(chart) = &snapshot.chart {
        let _ = writeln!(out, "chart:      {}", chart.series.title);
    }
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "error:      {}", error);
    }
    out
}

/// Numbered list, 1-based, matching `/pick` and `/use` positions.
pub fn render_numbered<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}. {}\n", i + 1, item.as_ref()))
        .collect()
}

fn format_value(value: f64) -> String {
    format!("{value}")
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}
