//! Plain-text rendering of list views

use ledgerdesk_core::{EntityConfig, ListView, Record, RequestStatus};
use ledgerdesk_utils::{format_number, truncate};

/// Widest a single column may grow
const MAX_COLUMN_WIDTH: usize = 32;

/// Column table of the view's rows
pub fn render_table(entity: &EntityConfig, rows: &[Record]) -> String {
    let columns = entity.display_columns(rows.first());
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| truncate(&row.text(c).replace('\n', " "), MAX_COLUMN_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(&columns, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        lines.push(render_line(row, &widths));
    }
    lines.join("\n")
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let cell = truncate(cell, *width);
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Status line under the table
pub fn render_footer(view: &ListView) -> String {
    match &view.status {
        RequestStatus::Error { message, .. } => format!("Error: {}", message),
        RequestStatus::Loading => "Loading...".to_string(),
        _ if view.filtered_count == 0 && view.query.is_empty() => "No records.".to_string(),
        _ if view.filtered_count == 0 => format!("No records match '{}'.", view.query),
        _ => {
            let mut footer = format!(
                "Page {} of {} ({} rows",
                view.current_page,
                view.total_pages,
                format_number(view.filtered_count)
            );
            if let Some(total) = view.server_total {
                footer.push_str(&format!(", {} on server", format_number(total)));
            }
            footer.push(')');
            footer
        }
    }
}
