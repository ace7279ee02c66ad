//! Table formatting utilities for CLI list commands
//!
//! Rows are built once from typed [`CellValue`]s and rendered as aligned
//! TSV for terminals, RFC 4180 CSV, Markdown (via `tabled`) or bare IDs.

use chrono::{DateTime, Utc};
use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record key (ICAO address, login name...), cyan colored
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Numeric value, right aligned
    Number(i64),
    /// Timestamp shown to the second
    DateTime(DateTime<Utc>),
    /// Yes/no flag; `yes` is highlighted
    Flag(bool),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    pub fn opt_text(value: Option<&str>) -> Self {
        match value {
            Some(s) if !s.is_empty() => CellValue::Text(s.to_string()),
            _ => CellValue::Empty,
        }
    }

    pub fn opt_number(value: Option<i64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Number)
    }

    /// Format for TSV output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                let truncated = truncate_str(s, width.saturating_sub(2));
                format!("{:<width$}", truncated, width = width)
            }
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::DateTime(dt) => {
                format!("{:<width$}", dt.format("%Y-%m-%d %H:%M:%S"), width = width)
            }
            CellValue::Flag(true) => format!("{:<width$}", style("yes").yellow(), width = width),
            CellValue::Flag(false) => format!("{:<width$}", style("no").dim(), width = width),
            CellValue::Empty => format!("{:<width$}", "-", width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => escape_csv(s),
            CellValue::Empty => String::new(),
            other => other.raw(),
        }
    }

    /// Format for Markdown output (escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            CellValue::Flag(b) => if *b { "yes" } else { "no" }.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.chars().count(),
            CellValue::Number(n) => n.to_string().len(),
            CellValue::DateTime(_) => 19, // "YYYY-MM-DD HH:MM:SS"
            CellValue::Flag(_) => 3,
            CellValue::Empty => 1,
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Hide the "N found" line (for `--quiet`)
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            _ => self.render_tsv(rows),
        }
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width())
                    .max()
                    .unwrap_or(0);
                // +2 leaves room for the truncation marker
                col.header
                    .len()
                    .max(max_content.saturating_add(2))
                    .min(col.width)
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| {
                    row.get(col.key)
                        .unwrap_or(&CellValue::Empty)
                        .format_tsv(*w)
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found.\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = String::new();
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        out.push_str(&headers.join(","));
        out.push('\n');

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(|v| v.format_csv())
                        .unwrap_or_default()
                })
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(|v| v.format_md())
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("icao", "ICAO", 8),
        ColumnDef::new("owner", "OWNER", 12),
        ColumnDef::new("alt", "ALT", 8),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("400A0B")
                .cell("icao", CellValue::Id("400A0B".into()))
                .cell("owner", CellValue::Text("British Airways".into()))
                .cell("alt", CellValue::Number(35000)),
            TableRow::new("3C6444")
                .cell("icao", CellValue::Id("3C6444".into()))
                .cell("owner", CellValue::Text("100% Flying, Inc".into())),
        ]
    }

    #[test]
    fn test_csv_escapes_and_blanks_missing_cells() {
        let out = TableFormatter::new(COLUMNS, "flight").render(&rows(), OutputFormat::Csv);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "icao,owner,alt");
        assert_eq!(lines[1], "400A0B,British Airways,35000");
        assert_eq!(lines[2], "3C6444,\"100% Flying, Inc\",");
    }

    #[test]
    fn test_md_uses_headers_and_placeholders() {
        let out = TableFormatter::new(COLUMNS, "flight").render(&rows(), OutputFormat::Md);
        assert!(out.contains("ICAO"));
        assert!(out.contains("| 3C6444"));
        assert!(out.contains("-"));
    }

    #[test]
    fn test_id_format_lists_ids() {
        let out = TableFormatter::new(COLUMNS, "flight").render(&rows(), OutputFormat::Id);
        assert_eq!(out, "400A0B\n3C6444\n");
    }

    #[test]
    fn test_tsv_truncates_to_column_width() {
        console::set_colors_enabled(false);
        let out = TableFormatter::new(COLUMNS, "flight")
            .without_summary()
            .render(&rows(), OutputFormat::Tsv);
        assert!(out.contains("British..."));
        assert!(!out.contains("found"));
    }
}
