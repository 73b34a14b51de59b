//! Shared utilities for CLI commands

use tabled::{Table, settings::Style};

use super::error::{CliError, CliResult};

/// Output format accepted by every listing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Parse a `--format` value.
pub fn parse_format(format: &str) -> CliResult<OutputFormat> {
    match format {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => Err(CliError::InvalidFormat {
            format: other.to_string(),
        }),
    }
}

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a list of IDs for display
pub fn format_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined.join(", ")
    }
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
