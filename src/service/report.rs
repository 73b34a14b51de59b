//! Camp rosters for reporting.

use serde::Serialize;

use crate::db::{DbResult, Repository, Stores};

/// Which camp members a roster lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterFilter {
    #[default]
    All,
    Attendees,
    Committee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterRole {
    Attendee,
    CommitteeMember,
}

impl std::fmt::Display for RosterRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterRole::Attendee => write!(f, "attendee"),
            RosterRole::CommitteeMember => write!(f, "committee member"),
        }
    }
}

/// One member of a camp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub user_id: String,
    pub name: String,
    pub faculty: String,
    pub role: RosterRole,
    /// Committee points; absent for attendees.
    pub points: Option<u32>,
}

/// List a camp's members, attendees first, each group ordered by user ID.
/// Members whose user record is missing are skipped.
pub fn camp_roster(stores: &Stores, camp: &str, filter: RosterFilter) -> DbResult<Vec<RosterEntry>> {
    let camp = stores.camps.get(camp)?;
    let mut roster = Vec::new();

    if filter != RosterFilter::Committee {
        for user in camp.attendees.iter().filter_map(|id| stores.users.get(id.as_str()).ok()) {
            roster.push(RosterEntry {
                user_id: user.id.clone(),
                name: user.name.clone(),
                faculty: user.faculty.clone(),
                role: RosterRole::Attendee,
                points: None,
            });
        }
    }

    if filter != RosterFilter::Attendees {
        for user in camp
            .committee_members
            .iter()
            .filter_map(|id| stores.users.get(id.as_str()).ok())
        {
            roster.push(RosterEntry {
                user_id: user.id.clone(),
                name: user.name.clone(),
                faculty: user.faculty.clone(),
                role: RosterRole::CommitteeMember,
                points: user.committee().map(|c| c.points),
            });
        }
    }

    Ok(roster)
}
