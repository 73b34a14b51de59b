//! Data directory commands: init, check, status and rewrite.

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{OutputFormat, apply_table_style, parse_format};
use crate::sync::{ImportReport, ImportSummary, TransferManager, TransferStatus};
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Count")]
    count: usize,
}

fn count_table(summary: &ImportSummary) -> String {
    let rows = vec![
        CountRow { item: "Staff".to_string(), count: summary.staff },
        CountRow { item: "Students".to_string(), count: summary.students },
        CountRow { item: "Committee members".to_string(), count: summary.committee_members },
        CountRow { item: "Camps".to_string(), count: summary.camps },
        CountRow { item: "Enquiries".to_string(), count: summary.enquiries },
        CountRow { item: "Suggestions".to_string(), count: summary.suggestions },
    ];
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}

/// Create the data directory and any missing data files.
pub fn init(manager: &TransferManager) -> CliResult<String> {
    let created = manager.init()?;

    let mut output = format!("✓ Data directory ready: {}\n", manager.data_dir().display());
    if created.is_empty() {
        output.push_str("All data files already present.\n");
    } else {
        output.push_str(&format!("Created: {}\n", created.join(", ")));
    }
    Ok(output)
}

/// Serializable view of an import report.
#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    clean: bool,
    summary: &'a ImportSummary,
    missing_files: &'a [String],
    unreadable_files: Vec<String>,
    format_errors: Vec<String>,
    violations: Vec<String>,
}

impl<'a> From<&'a ImportReport> for CheckReport<'a> {
    fn from(report: &'a ImportReport) -> Self {
        Self {
            clean: report.is_clean(),
            summary: &report.summary,
            missing_files: &report.missing_files,
            unreadable_files: report
                .unreadable_files
                .iter()
                .map(|u| format!("{}: {}", u.file, u.error))
                .collect(),
            format_errors: report.format_errors.iter().map(|e| e.to_string()).collect(),
            violations: report.violations().iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Load the data directory and report every problem found, without
/// changing anything.
pub fn check(manager: &TransferManager, format: &str) -> CliResult<String> {
    let format = parse_format(format)?;
    let report = manager.load()?;
    let view = CheckReport::from(&report);

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&view)?);
    }

    let mut output = count_table(&report.summary);
    output.push('\n');

    let sections = [
        ("Missing files", view.missing_files.to_vec()),
        ("Unreadable files", view.unreadable_files),
        ("Format errors", view.format_errors),
        ("Integrity violations", view.violations),
    ];
    for (title, lines) in sections {
        if lines.is_empty() {
            continue;
        }
        output.push_str(&format!("\n{} ({}):\n", title, lines.len()));
        for line in lines {
            output.push_str(&format!("  - {}\n", line));
        }
    }

    if view.clean {
        output.push_str("\n✓ No problems found\n");
    }
    Ok(output)
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Present")]
    present: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Bad rows")]
    format_errors: usize,
}

/// Per-file record counts.
pub fn status(manager: &TransferManager, format: &str) -> CliResult<String> {
    let format = parse_format(format)?;
    let status: TransferStatus = manager.status()?;

    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&status)?);
    }

    if !status.initialized {
        return Ok(format!(
            "Data directory not initialized: {}\nRun `cams init` to create it.",
            status.data_dir.display()
        ));
    }

    let rows: Vec<FileRow> = status
        .files
        .iter()
        .map(|f| FileRow {
            file: f.file.clone(),
            present: if f.present { "yes" } else { "no" }.to_string(),
            records: f.records,
            format_errors: f.format_errors,
        })
        .collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);

    Ok(format!(
        "Data directory: {}\n\n{}\n\nTotal records: {}",
        status.data_dir.display(),
        table,
        status.total_records()
    ))
}

/// Load and save the data directory, normalizing every file.
///
/// Malformed rows are dropped. Unreadable files abort the rewrite, since
/// saving would replace them with empty ones. Integrity violations abort unless
/// `acknowledge` is set, in which case dangling references are pruned
/// before saving.
pub fn rewrite(manager: &TransferManager, acknowledge: bool) -> CliResult<String> {
    let mut report = manager.load()?;
    // Malformed rows are dropped on purpose; unreadable files would be blanked.
    if !report.unreadable_files.is_empty() {
        return Err(CliError::UnsafeSave {
            unreadable: report.unreadable_files.len(),
            malformed: 0,
        });
    }

    let violations = report.violations().len();
    if violations > 0 && !acknowledge {
        return Err(CliError::IntegrityUnresolved { count: violations });
    }

    let mut output = String::new();
    if violations > 0 {
        let pruned = report.repositories.acknowledge_violations()?;
        output.push_str(&format!("Acknowledged {} violation(s)\n", pruned.len()));
    }
    if !report.format_errors.is_empty() {
        output.push_str(&format!(
            "Dropped {} malformed row(s)\n",
            report.format_errors.len()
        ));
    }

    let summary = manager.save(&mut report.repositories)?;
    output.push_str(&format!(
        "✓ Wrote {} record(s) to {}\n",
        summary.total(),
        manager.data_dir().display()
    ));
    Ok(output)
}
