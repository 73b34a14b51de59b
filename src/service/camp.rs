//! Camp lifecycle and registration.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{info, instrument};

use crate::codec::{KEY_RESERVED, SCALAR_RESERVED};
use crate::db::{Camp, DbError, DbResult, Repositories, Repository};

use super::{require_staff_in_charge, require_student, require_value};

/// Committee places per camp. Committee members do not use attendee
/// capacity.
pub const COMMITTEE_SLOTS: usize = 10;

/// Details of a camp to create. The staff in charge is the creator.
#[derive(Debug, Clone)]
pub struct NewCamp {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_closing: NaiveDate,
    pub location: String,
    pub faculty: String,
    pub capacity: u32,
    pub visible: bool,
}

/// Changes to an existing camp. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct CampChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub registration_closing: Option<NaiveDate>,
    pub location: Option<String>,
    pub faculty: Option<String>,
    pub capacity: Option<u32>,
}

impl CampChanges {
    fn apply_to(self, camp: &mut Camp) {
        if let Some(name) = self.name {
            camp.name = name;
        }
        if let Some(description) = self.description {
            camp.description = description;
        }
        if let Some(start_date) = self.start_date {
            camp.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            camp.end_date = end_date;
        }
        if let Some(closing) = self.registration_closing {
            camp.registration_closing = closing;
        }
        if let Some(location) = self.location {
            camp.location = location;
        }
        if let Some(faculty) = self.faculty {
            camp.faculty = faculty;
        }
        if let Some(capacity) = self.capacity {
            camp.capacity = capacity;
        }
    }
}

/// Rules every camp's own details must satisfy.
fn validate_details(camp: &Camp) -> DbResult<()> {
    require_value("Name", &camp.name, KEY_RESERVED)?;
    require_value("Description", &camp.description, SCALAR_RESERVED)?;
    require_value("Location", &camp.location, SCALAR_RESERVED)?;
    require_value("Faculty", &camp.faculty, SCALAR_RESERVED)?;
    if camp.end_date < camp.start_date {
        return Err(DbError::validation("end date is before start date"));
    }
    if camp.registration_closing > camp.start_date {
        return Err(DbError::validation(
            "registration must close on or before the start date",
        ));
    }
    if camp.capacity == 0 {
        return Err(DbError::validation("capacity must be at least 1"));
    }
    Ok(())
}

/// Create a camp owned by `staff_id`.
#[instrument(skip(repos, new), fields(camp = %new.name))]
pub fn create_camp(repos: &mut Repositories, staff_id: &str, new: NewCamp) -> DbResult<()> {
    let stores = repos.write()?;

    let staff = stores.users.get(staff_id)?;
    if staff.staff().is_none() {
        return Err(DbError::validation(format!(
            "'{}' is not a staff member",
            staff_id
        )));
    }
    let camp = Camp {
        name: new.name,
        description: new.description,
        start_date: new.start_date,
        end_date: new.end_date,
        registration_closing: new.registration_closing,
        location: new.location,
        faculty: new.faculty,
        staff_in_charge: staff_id.to_string(),
        capacity: new.capacity,
        attendees: BTreeSet::new(),
        committee_members: BTreeSet::new(),
        visible: new.visible,
        suggestions: BTreeSet::new(),
        enquiries: BTreeSet::new(),
    };
    validate_details(&camp)?;
    if stores.camps.contains(camp.name.as_str()) {
        return Err(DbError::AlreadyExists {
            entity_type: "Camp".to_string(),
            id: camp.name,
        });
    }

    let name = camp.name.clone();
    stores.camps.insert(camp)?;
    if let Some(profile) = stores.users.get_mut(staff_id)?.staff_mut() {
        profile.created_camps.push(name);
    }

    info!(staff = staff_id, "Created camp");
    Ok(())
}

/// Edit a camp on behalf of its staff in charge.
///
/// The edited camp must still hold its current attendees and members: the
/// capacity cannot drop below the attendee count, the faculty must still
/// admit every member, and new dates must not clash with a member's other
/// camps. A new name is carried through every reference to the camp.
#[instrument(skip(repos, changes))]
pub fn edit_camp(
    repos: &mut Repositories,
    staff_id: &str,
    camp: &str,
    changes: CampChanges,
) -> DbResult<Camp> {
    let stores = repos.write()?;
    let mut edited = require_staff_in_charge(stores, staff_id, camp)?.clone();
    changes.apply_to(&mut edited);
    validate_details(&edited)?;

    if (edited.attendees.len() as u64) > u64::from(edited.capacity) {
        return Err(DbError::validation(format!(
            "capacity {} is below the {} registered attendee(s)",
            edited.capacity,
            edited.attendees.len()
        )));
    }
    let renamed = edited.name != camp;
    if renamed && stores.camps.contains(edited.name.as_str()) {
        return Err(DbError::AlreadyExists {
            entity_type: "Camp".to_string(),
            id: edited.name,
        });
    }
    for member in edited.attendees.iter().chain(edited.committee_members.iter()) {
        let user = stores.users.get(member.as_str())?;
        if !edited.is_open_to(&user.faculty) {
            return Err(DbError::validation(format!(
                "'{}' from {} would no longer be admitted to '{}'",
                member, user.faculty, camp
            )));
        }
        let registered = user.student().map(|s| s.registered_camps.as_slice()).unwrap_or_default();
        for other in registered.iter().filter(|c| c.as_str() != camp) {
            if let Ok(other) = stores.camps.get(other.as_str()) {
                if other.overlaps(&edited) {
                    return Err(DbError::validation(format!(
                        "new dates clash with '{}' for '{}'",
                        other.name, member
                    )));
                }
            }
        }
    }

    if renamed {
        stores.rename_camp(camp, &edited.name)?;
    }
    stores.camps.put(edited.clone())?;

    info!(camp = %edited.name, "Edited camp");
    Ok(edited)
}

/// Flip whether students can see the camp. Returns the new visibility.
#[instrument(skip(repos))]
pub fn toggle_visibility(repos: &mut Repositories, staff_id: &str, camp: &str) -> DbResult<bool> {
    let stores = repos.write()?;
    require_staff_in_charge(stores, staff_id, camp)?;

    let camp = stores.camps.get_mut(camp)?;
    camp.visible = !camp.visible;
    info!(visible = camp.visible, "Toggled camp visibility");
    Ok(camp.visible)
}

/// Check the rules shared by attendee and committee registration.
fn check_joinable(
    repos: &Repositories,
    user_id: &str,
    camp_name: &str,
    today: NaiveDate,
) -> DbResult<()> {
    let user = require_student(repos, user_id)?;
    let camp = repos.camps.get(camp_name)?;

    if !camp.visible {
        return Err(DbError::validation(format!(
            "camp '{}' is not open for registration",
            camp_name
        )));
    }
    if !camp.is_open_to(&user.faculty) {
        return Err(DbError::validation(format!(
            "camp '{}' is only open to {}",
            camp_name, camp.faculty
        )));
    }
    if today > camp.registration_closing {
        return Err(DbError::validation(format!(
            "registration for '{}' closed on {}",
            camp_name, camp.registration_closing
        )));
    }
    if camp.is_member(user_id) {
        return Err(DbError::validation(format!(
            "'{}' is already registered for '{}'",
            user_id, camp_name
        )));
    }

    let registered = user.student().map(|s| s.registered_camps.as_slice()).unwrap_or_default();
    for other in registered {
        if let Ok(other) = repos.camps.get(other.as_str()) {
            if other.overlaps(camp) {
                return Err(DbError::validation(format!(
                    "'{}' clashes with '{}'",
                    camp_name, other.name
                )));
            }
        }
    }
    Ok(())
}

/// Register a student as attendee of a camp.
#[instrument(skip(repos))]
pub fn register_attendee(
    repos: &mut Repositories,
    student_id: &str,
    camp: &str,
    today: NaiveDate,
) -> DbResult<()> {
    check_joinable(repos, student_id, camp, today)?;
    if !repos.camps.get(camp)?.has_vacancy() {
        return Err(DbError::validation(format!("camp '{}' is full", camp)));
    }

    let stores = repos.write()?;
    stores
        .camps
        .get_mut(camp)?
        .attendees
        .insert(student_id.to_string());
    if let Some(student) = stores.users.get_mut(student_id)?.student_mut() {
        student.registered_camps.push(camp.to_string());
    }

    info!("Registered attendee");
    Ok(())
}

/// Withdraw an attendee. Committee members cannot withdraw.
#[instrument(skip(repos))]
pub fn withdraw_attendee(repos: &mut Repositories, student_id: &str, camp: &str) -> DbResult<()> {
    let stores = repos.write()?;
    let entry = stores.camps.get(camp)?;
    if entry.committee_members.contains(student_id) {
        return Err(DbError::validation(format!(
            "committee member '{}' cannot withdraw from '{}'",
            student_id, camp
        )));
    }
    if !entry.attendees.contains(student_id) {
        return Err(DbError::validation(format!(
            "'{}' is not an attendee of '{}'",
            student_id, camp
        )));
    }

    stores.camps.get_mut(camp)?.attendees.remove(student_id);
    if let Some(student) = stores.users.get_mut(student_id)?.student_mut() {
        student.registered_camps.retain(|c| c != camp);
    }

    info!("Withdrew attendee");
    Ok(())
}

/// Make a plain student a committee member of a camp.
///
/// A student can sit on one committee only.
#[instrument(skip(repos))]
pub fn join_as_committee(
    repos: &mut Repositories,
    student_id: &str,
    camp: &str,
    today: NaiveDate,
) -> DbResult<()> {
    if let Some(committee) = repos.users.get(student_id)?.committee() {
        return Err(DbError::validation(format!(
            "'{}' already sits on the committee of '{}'",
            student_id, committee.facilitating_camp
        )));
    }
    check_joinable(repos, student_id, camp, today)?;
    if repos.camps.get(camp)?.committee_members.len() >= COMMITTEE_SLOTS {
        return Err(DbError::validation(format!(
            "committee of '{}' is full",
            camp
        )));
    }

    let stores = repos.write()?;
    stores.users.get_mut(student_id)?.promote_to_committee(camp);
    stores
        .camps
        .get_mut(camp)?
        .committee_members
        .insert(student_id.to_string());

    info!("Joined camp committee");
    Ok(())
}

/// Delete a camp and everything that belongs to it.
#[instrument(skip(repos))]
pub fn delete_camp(repos: &mut Repositories, staff_id: &str, camp: &str) -> DbResult<Camp> {
    require_staff_in_charge(repos.write()?, staff_id, camp)?;
    repos.delete_camp(camp)
}
