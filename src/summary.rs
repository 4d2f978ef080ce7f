//! The video table printed after `list` and `process`.

use crate::catalog::Catalog;
use crate::cutlist::{has_cutlists, CutlistSource};
use console::style;
use futures::future::join_all;
use gool_common::{ItemResult, VideoStatus};

const KEY_WIDTH: usize = 60;
const STATUS_WIDTH: usize = 6;
const CL_WIDTH: usize = 2;
const RESULT_WIDTH: usize = 8;

/// One line of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub key: String,
    pub status: VideoStatus,
    pub has_cutlists: bool,
    pub result: ItemResult,
}

/// Build the rows, asking the cutlist server about every video concurrently.
pub async fn collect_rows(catalog: &Catalog, source: &dyn CutlistSource) -> Vec<SummaryRow> {
    let lookups = catalog.items().map(|item| async move {
        SummaryRow {
            key: item.key.clone(),
            status: item.status,
            has_cutlists: has_cutlists(source, item).await,
            result: item.result.clone(),
        }
    });
    join_all(lookups).await
}

/// Render the table. Rows are printed in key order.
pub fn render(rows: &[SummaryRow]) -> String {
    if rows.is_empty() {
        return "\nNo videos found\n".to_string();
    }

    let mut rows: Vec<&SummaryRow> = rows.iter().collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    let mut out = String::new();
    let header = format!(
        "{:<KEY_WIDTH$} {:<STATUS_WIDTH$} {:<CL_WIDTH$} {:<RESULT_WIDTH$}",
        "Video", "Status", "CL", "Result"
    );
    out.push_str(&format!("\n{}\n", style(header).bold()));
    out.push_str(&"-".repeat(KEY_WIDTH + STATUS_WIDTH + CL_WIDTH + RESULT_WIDTH + 3));
    out.push('\n');

    for row in rows {
        let cl = if row.has_cutlists {
            style("++").green().bold()
        } else {
            style("--").red().bold()
        };
        let result = match &row.result {
            ItemResult::Ok => style(format!("{:<RESULT_WIDTH$}", "OK")).green().bold(),
            ItemResult::Error(_) => style(format!("{:<RESULT_WIDTH$}", "ERROR")).red().bold(),
            ItemResult::None => style(" ".repeat(RESULT_WIDTH)),
        };
        out.push_str(&format!(
            "{:<KEY_WIDTH$} {:<STATUS_WIDTH$} {} {}\n",
            truncate(&row.key, KEY_WIDTH),
            row.status.label(),
            cl,
            result
        ));
    }

    out
}

/// Reasons of failed videos, one per line.
pub fn render_failures(catalog: &Catalog) -> String {
    let mut out = String::new();
    for item in catalog.items() {
        if let ItemResult::Error(reason) = &item.result {
            out.push_str(&format!("{}: {}\n", truncate(&item.key, KEY_WIDTH), reason));
        }
    }
    out
}

fn truncate(key: &str, width: usize) -> String {
    if key.chars().count() <= width {
        return key.to_string();
    }
    let head: String = key.chars().take(width - 3).collect();
    format!("{head}...")
}
