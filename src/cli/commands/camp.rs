//! Camp commands: list, roster and delete.

use crate::cli::error::{CliError, CliResult};
use crate::cli::utils::{
    OutputFormat, apply_table_style, format_list, parse_format, truncate_with_ellipsis,
};
use crate::db::{Camp, Repository};
use crate::service::{self, RosterEntry, RosterFilter};
use crate::sync::TransferManager;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Serialize)]
struct CampSummary<'a> {
    name: &'a str,
    start_date: String,
    end_date: String,
    registration_closing: String,
    faculty: &'a str,
    location: &'a str,
    staff_in_charge: &'a str,
    capacity: u32,
    attendees: usize,
    committee_members: usize,
    visible: bool,
}

impl<'a> From<&'a Camp> for CampSummary<'a> {
    fn from(camp: &'a Camp) -> Self {
        Self {
            name: &camp.name,
            start_date: camp.start_date.to_string(),
            end_date: camp.end_date.to_string(),
            registration_closing: camp.registration_closing.to_string(),
            faculty: &camp.faculty,
            location: &camp.location,
            staff_in_charge: &camp.staff_in_charge,
            capacity: camp.capacity,
            attendees: camp.attendees.len(),
            committee_members: camp.committee_members.len(),
            visible: camp.visible,
        }
    }
}

#[derive(Tabled)]
pub(crate) struct CampDisplay {
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Dates")]
    pub(crate) dates: String,
    #[tabled(rename = "Faculty")]
    pub(crate) faculty: String,
    #[tabled(rename = "Staff")]
    pub(crate) staff: String,
    #[tabled(rename = "Filled")]
    pub(crate) filled: String,
    #[tabled(rename = "Committee")]
    pub(crate) committee: String,
    #[tabled(rename = "Visible")]
    pub(crate) visible: String,
}

impl From<&Camp> for CampDisplay {
    fn from(camp: &Camp) -> Self {
        Self {
            name: truncate_with_ellipsis(&camp.name, 30),
            dates: format!("{} to {}", camp.start_date, camp.end_date),
            faculty: camp.faculty.clone(),
            staff: camp.staff_in_charge.clone(),
            filled: format!("{}/{}", camp.attendees.len(), camp.capacity),
            committee: format_list(&camp.committee_members),
            visible: if camp.visible { "yes" } else { "no" }.to_string(),
        }
    }
}

/// List every camp in the data directory.
pub fn list_camps(manager: &TransferManager, format: &str) -> CliResult<String> {
    let format = parse_format(format)?;
    let report = manager.load()?;
    let camps = report.repositories.camps.list();

    match format {
        OutputFormat::Json => {
            let summaries: Vec<CampSummary> = camps.into_iter().map(CampSummary::from).collect();
            Ok(serde_json::to_string_pretty(&summaries)?)
        }
        OutputFormat::Table => {
            if camps.is_empty() {
                return Ok("No camps found.".to_string());
            }
            let rows: Vec<CampDisplay> = camps.into_iter().map(CampDisplay::from).collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

#[derive(Tabled)]
pub(crate) struct RosterDisplay {
    #[tabled(rename = "User")]
    pub(crate) user_id: String,
    #[tabled(rename = "Name")]
    pub(crate) name: String,
    #[tabled(rename = "Faculty")]
    pub(crate) faculty: String,
    #[tabled(rename = "Role")]
    pub(crate) role: String,
    #[tabled(rename = "Points")]
    pub(crate) points: String,
}

impl From<&RosterEntry> for RosterDisplay {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            user_id: entry.user_id.clone(),
            name: truncate_with_ellipsis(&entry.name, 30),
            faculty: entry.faculty.clone(),
            role: entry.role.to_string(),
            points: entry
                .points
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Parse a `--filter` value.
pub fn parse_filter(filter: &str) -> CliResult<RosterFilter> {
    match filter {
        "all" => Ok(RosterFilter::All),
        "attendees" => Ok(RosterFilter::Attendees),
        "committee" => Ok(RosterFilter::Committee),
        other => Err(CliError::InvalidFilter {
            filter: other.to_string(),
        }),
    }
}

/// List the members of one camp.
pub fn camp_roster(
    manager: &TransferManager,
    camp: &str,
    filter: &str,
    format: &str,
) -> CliResult<String> {
    let filter = parse_filter(filter)?;
    let format = parse_format(format)?;
    let report = manager.load()?;
    let roster = service::camp_roster(&report.repositories, camp, filter)?;

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&roster)?),
        OutputFormat::Table => {
            if roster.is_empty() {
                return Ok(format!("No members in '{}'.", camp));
            }
            let rows: Vec<RosterDisplay> = roster.iter().map(RosterDisplay::from).collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

/// Delete a camp on behalf of its staff in charge and save the result.
pub fn delete_camp(manager: &TransferManager, staff: &str, camp: &str) -> CliResult<String> {
    let mut report = manager.load()?;
    if !report.unreadable_files.is_empty() || !report.format_errors.is_empty() {
        return Err(CliError::UnsafeSave {
            unreadable: report.unreadable_files.len(),
            malformed: report.format_errors.len(),
        });
    }
    if let Some(err) = report.repositories.integrity_error() {
        return Err(CliError::IntegrityUnresolved {
            count: err.violations.len(),
        });
    }

    let deleted = service::delete_camp(&mut report.repositories, staff, camp)?;
    manager.save(&mut report.repositories)?;

    Ok(format!(
        "✓ Deleted camp '{}' ({} attendee(s), {} committee member(s) released)",
        deleted.name,
        deleted.attendees.len(),
        deleted.committee_members.len()
    ))
}
