//! Output formatting for query results.

use super::QueryResult;
use std::io::Write;

/// Longest cell printed in table format before truncation
const MAX_CELL_WIDTH: usize = 50;

/// Output format for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Box-drawn table (default)
    #[default]
    Table,
    /// JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
    Csv,
    Tsv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "jsonlines" | "ndjson" => Ok(OutputFormat::JsonLines),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!(
                "Unknown format: {}. Valid: table, json, jsonl, csv, tsv",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::JsonLines => "jsonl",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        };
        f.write_str(name)
    }
}

impl OutputFormat {
    /// Guess the format from an output file extension
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(OutputFormat::Json),
            "jsonl" | "ndjson" => Some(OutputFormat::JsonLines),
            "csv" => Some(OutputFormat::Csv),
            "tsv" => Some(OutputFormat::Tsv),
            _ => None,
        }
    }
}

/// Formatter for query results
pub struct QueryResultFormatter;

impl QueryResultFormatter {
    pub fn format(result: &QueryResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(result),
            OutputFormat::Json => Self::format_json(result),
            OutputFormat::JsonLines => Self::format_jsonl(result),
            OutputFormat::Csv => Self::format_delimited(result, ','),
            OutputFormat::Tsv => Self::format_delimited(result, '\t'),
        }
    }

    pub fn write<W: Write>(
        result: &QueryResult,
        format: OutputFormat,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writer.write_all(Self::format(result, format).as_bytes())
    }

    fn format_table(result: &QueryResult) -> String {
        if result.columns.is_empty() {
            return String::new();
        }

        let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
        for row in &result.rows {
            for (width, val) in widths.iter_mut().zip(row) {
                *width = (*width).max(val.chars().count());
            }
        }
        for width in widths.iter_mut() {
            *width = (*width).min(MAX_CELL_WIDTH);
        }

        let border = |left: char, mid: char, right: char| {
            let mut line = String::new();
            line.push(left);
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            line.push_str(&segments.join(&mid.to_string()));
            line.push(right);
            line.push('\n');
            line
        };
        let cells = |values: &[String]| {
            let mut line = String::from("│");
            for (val, width) in values.iter().zip(&widths) {
                let cell = truncate(val, *width);
                let pad = width.saturating_sub(cell.chars().count());
                line.push(' ');
                line.push_str(&cell);
                line.push_str(&" ".repeat(pad));
                line.push_str(" │");
            }
            line.push('\n');
            line
        };

        let mut output = border('┌', '┬', '┐');
        output.push_str(&cells(&result.columns[..]));
        output.push_str(&border('├', '┼', '┤'));
        for row in &result.rows {
            output.push_str(&cells(&row[..]));
        }
        output.push_str(&border('└', '┴', '┘'));

        let n = result.rows.len();
        output.push_str(&format!("{} row{}\n", n, if n == 1 { "" } else { "s" }));
        output
    }

    fn json_rows(result: &QueryResult) -> Vec<serde_json::Value> {
        result
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = result
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, val)| (col.clone(), json_value(val)))
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect()
    }

    fn format_json(result: &QueryResult) -> String {
        let mut out = serde_json::to_string_pretty(&Self::json_rows(result))
            .unwrap_or_else(|_| "[]".to_string());
        out.push('\n');
        out
    }

    fn format_jsonl(result: &QueryResult) -> String {
        Self::json_rows(result)
            .iter()
            .map(|obj| format!("{}\n", obj))
            .collect()
    }

    fn format_delimited(result: &QueryResult, sep: char) -> String {
        let escape = |val: &str| -> String {
            if sep == ',' && (val.contains(',') || val.contains('"') || val.contains('\n')) {
                format!("\"{}\"", val.replace('"', "\"\""))
            } else if sep == '\t' {
                val.replace('\t', " ").replace('\n', " ")
            } else {
                val.to_string()
            }
        };

        let mut output = String::new();
        let mut push_line = |values: &[String]| {
            let line: Vec<String> = values.iter().map(|v| escape(v.as_str())).collect();
            output.push_str(&line.join(&sep.to_string()));
            output.push('\n');
        };

        push_line(&result.columns[..]);
        for row in &result.rows {
            push_line(&row[..]);
        }
        output
    }
}

/// Numbers, booleans and NULL keep their JSON types; everything else is a string
fn json_value(val: &str) -> serde_json::Value {
    match val {
        "NULL" => serde_json::Value::Null,
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = val.parse::<i64>() {
                serde_json::Value::from(n)
            } else if let Some(n) = val
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(serde_json::Number::from_f64)
            {
                serde_json::Value::Number(n)
            } else {
                serde_json::Value::String(val.to_string())
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
