//! Cross-reference resolution.
//!
//! Runs over fully loaded stores, checks every stored ID against its target
//! store and every two-sided relationship for agreement. All violations are
//! collected; nothing stops at the first one.

use std::collections::BTreeSet;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Camp, Enquiry, EnquiryId, Role, Suggestion, SuggestionId, User};
use super::repository::{Repository, Stores};
use super::store::Entity;
use super::DbResult;

/// A single broken rule in the loaded data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("{entity_type} '{id}' field {field} references missing {target_type} '{target}'")]
    Dangling {
        entity_type: String,
        id: String,
        field: String,
        target_type: String,
        target: String,
    },

    #[error("Camp '{camp}' has {attendees} attendees but capacity {capacity}")]
    CapacityExceeded {
        camp: String,
        attendees: usize,
        capacity: u32,
    },

    #[error("CommitteeMember '{user}' facilitates '{camp}' without being registered for it")]
    FacilitatingCampNotRegistered { user: String, camp: String },

    #[error("{entity_type} '{id}' field {field} lists '{target}', but {reason}")]
    MembershipMismatch {
        entity_type: String,
        id: String,
        field: String,
        target: String,
        reason: String,
    },

    #[error("{entity_type} '{id}' field {field} lists '{target}', but {reason}")]
    BackReferenceMismatch {
        entity_type: String,
        id: String,
        field: String,
        target: String,
        reason: String,
    },
}

impl Violation {
    fn dangling<S: Entity, T: Entity>(
        id: impl ToString,
        field: &str,
        target: impl ToString,
    ) -> Self {
        Violation::Dangling {
            entity_type: S::ENTITY_TYPE.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            target_type: T::ENTITY_TYPE.to_string(),
            target: target.to_string(),
        }
    }

    fn membership<S: Entity>(
        id: impl ToString,
        field: &str,
        target: impl ToString,
        reason: &str,
    ) -> Self {
        Violation::MembershipMismatch {
            entity_type: S::ENTITY_TYPE.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    fn back_reference<S: Entity>(
        id: impl ToString,
        field: &str,
        target: impl ToString,
        reason: &str,
    ) -> Self {
        Violation::BackReferenceMismatch {
            entity_type: S::ENTITY_TYPE.to_string(),
            id: id.to_string(),
            field: field.to_string(),
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Every violation found after import, reported together.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("{} referential integrity violation(s):{}", .violations.len(), list(.violations))]
#[diagnostic(
    code(cams::db::referential_integrity),
    help("Fix the data files, or acknowledge the violations to prune dangling references")
)]
pub struct ReferentialIntegrityError {
    pub violations: Vec<Violation>,
}

fn list(violations: &[Violation]) -> String {
    violations.iter().map(|v| format!("\n  - {}", v)).collect()
}

/// Check every reference and relationship in the stores.
pub fn resolve(stores: &Stores) -> Vec<Violation> {
    let mut violations = Vec::new();

    for user in stores.users.iter() {
        check_user(stores, user, &mut violations);
    }
    for camp in stores.camps.iter() {
        check_camp(stores, camp, &mut violations);
    }
    for enquiry in stores.enquiries.iter() {
        check_enquiry(stores, enquiry, &mut violations);
    }
    for suggestion in stores.suggestions.iter() {
        check_suggestion(stores, suggestion, &mut violations);
    }

    if violations.is_empty() {
        debug!("All references resolved");
    } else {
        warn!(count = violations.len(), "Integrity violations found");
    }
    violations
}

fn check_user(stores: &Stores, user: &User, out: &mut Vec<Violation>) {
    if let Some(student) = user.student() {
        for name in &student.registered_camps {
            match stores.camps.get(name.as_str()) {
                Err(_) => out.push(Violation::dangling::<User, Camp>(
                    &user.id,
                    "RegisteredCamps",
                    name,
                )),
                Ok(camp) if !camp.is_member(&user.id) => out.push(Violation::membership::<User>(
                    &user.id,
                    "RegisteredCamps",
                    name,
                    "the camp does not list the user as attendee or committee member",
                )),
                Ok(_) => {}
            }
        }

        for (name, ids) in &student.enquiries {
            if !stores.camps.contains(name.as_str()) {
                out.push(Violation::dangling::<User, Camp>(&user.id, "Enquiries", name));
            }
            for id in ids {
                match stores.enquiries.get(id) {
                    Err(_) => out.push(Violation::dangling::<User, Enquiry>(
                        &user.id,
                        "Enquiries",
                        id,
                    )),
                    Ok(enquiry) if enquiry.camp != *name || enquiry.enquirer != user.id => {
                        out.push(Violation::back_reference::<User>(
                            &user.id,
                            "Enquiries",
                            id,
                            "the enquiry belongs to a different camp or enquirer",
                        ))
                    }
                    Ok(_) => {}
                }
            }
        }
    }

    match &user.role {
        Role::Student(_) => {}
        Role::CommitteeMember(student, committee) => {
            let camp_name = &committee.facilitating_camp;
            match stores.camps.get(camp_name.as_str()) {
                Err(_) => out.push(Violation::dangling::<User, Camp>(
                    &user.id,
                    "FacilitatingCamp",
                    camp_name,
                )),
                Ok(camp) if !camp.committee_members.contains(&user.id) => {
                    out.push(Violation::membership::<User>(
                        &user.id,
                        "FacilitatingCamp",
                        camp_name,
                        "the camp does not list the user as committee member",
                    ))
                }
                Ok(_) => {}
            }
            if !student.is_registered(camp_name) {
                out.push(Violation::FacilitatingCampNotRegistered {
                    user: user.id.clone(),
                    camp: camp_name.clone(),
                });
            }
            for id in &committee.suggestions {
                match stores.suggestions.get(id) {
                    Err(_) => out.push(Violation::dangling::<User, Suggestion>(
                        &user.id,
                        "Suggestions",
                        id,
                    )),
                    Ok(suggestion) if suggestion.author != user.id => {
                        out.push(Violation::back_reference::<User>(
                            &user.id,
                            "Suggestions",
                            id,
                            "the suggestion has a different author",
                        ))
                    }
                    Ok(_) => {}
                }
            }
        }
        Role::Staff(staff) => {
            for name in &staff.created_camps {
                match stores.camps.get(name.as_str()) {
                    Err(_) => out.push(Violation::dangling::<User, Camp>(
                        &user.id,
                        "CreatedCamps",
                        name,
                    )),
                    Ok(camp) if camp.staff_in_charge != user.id => {
                        out.push(Violation::membership::<User>(
                            &user.id,
                            "CreatedCamps",
                            name,
                            "another staff member is in charge of the camp",
                        ))
                    }
                    Ok(_) => {}
                }
            }
        }
    }
}

fn check_camp(stores: &Stores, camp: &Camp, out: &mut Vec<Violation>) {
    let name = &camp.name;

    match stores.users.get(camp.staff_in_charge.as_str()) {
        Err(_) => out.push(Violation::dangling::<Camp, User>(
            name,
            "StaffInCharge",
            &camp.staff_in_charge,
        )),
        Ok(user) => match user.staff() {
            None => out.push(Violation::membership::<Camp>(
                name,
                "StaffInCharge",
                &camp.staff_in_charge,
                "the user is not a staff member",
            )),
            Some(staff) if !staff.created_camps.contains(name) => {
                out.push(Violation::membership::<Camp>(
                    name,
                    "StaffInCharge",
                    &camp.staff_in_charge,
                    "the staff member does not list the camp as created",
                ))
            }
            Some(_) => {}
        },
    }

    if camp.attendees.len() as u64 > u64::from(camp.capacity) {
        out.push(Violation::CapacityExceeded {
            camp: name.clone(),
            attendees: camp.attendees.len(),
            capacity: camp.capacity,
        });
    }

    for id in &camp.attendees {
        match stores.users.get(id.as_str()) {
            Err(_) => out.push(Violation::dangling::<Camp, User>(name, "Attendees", id)),
            Ok(user) => match user.student() {
                None => out.push(Violation::membership::<Camp>(
                    name,
                    "Attendees",
                    id,
                    "the user is not a student",
                )),
                Some(student) if !student.is_registered(name) => {
                    out.push(Violation::membership::<Camp>(
                        name,
                        "Attendees",
                        id,
                        "the student is not registered for the camp",
                    ))
                }
                Some(_) => {}
            },
        }
    }

    for id in &camp.committee_members {
        match stores.users.get(id.as_str()) {
            Err(_) => out.push(Violation::dangling::<Camp, User>(
                name,
                "CommitteeMembers",
                id,
            )),
            Ok(user) => {
                let facilitates = user
                    .committee()
                    .is_some_and(|c| c.facilitating_camp == *name);
                if !facilitates {
                    out.push(Violation::membership::<Camp>(
                        name,
                        "CommitteeMembers",
                        id,
                        "the user is not a committee member of the camp",
                    ));
                }
            }
        }
    }

    for id in &camp.suggestions {
        match stores.suggestions.get(id) {
            Err(_) => out.push(Violation::dangling::<Camp, Suggestion>(
                name,
                "Suggestions",
                id,
            )),
            Ok(suggestion) if suggestion.camp != *name => out.push(Violation::back_reference::<Camp>(
                name,
                "Suggestions",
                id,
                "the suggestion belongs to another camp",
            )),
            Ok(_) => {}
        }
    }

    for id in &camp.enquiries {
        match stores.enquiries.get(id) {
            Err(_) => out.push(Violation::dangling::<Camp, Enquiry>(name, "Enquiries", id)),
            Ok(enquiry) if enquiry.camp != *name => out.push(Violation::back_reference::<Camp>(
                name,
                "Enquiries",
                id,
                "the enquiry belongs to another camp",
            )),
            Ok(_) => {}
        }
    }
}

fn check_enquiry(stores: &Stores, enquiry: &Enquiry, out: &mut Vec<Violation>) {
    let id = enquiry.id;

    match stores.camps.get(enquiry.camp.as_str()) {
        Err(_) => out.push(Violation::dangling::<Enquiry, Camp>(id, "Camp", &enquiry.camp)),
        Ok(camp) if !camp.enquiries.contains(&id) => out.push(Violation::back_reference::<Enquiry>(
            id,
            "Camp",
            &enquiry.camp,
            "the camp does not list the enquiry",
        )),
        Ok(_) => {}
    }

    match stores.users.get(enquiry.enquirer.as_str()) {
        Err(_) => out.push(Violation::dangling::<Enquiry, User>(
            id,
            "Enquirer",
            &enquiry.enquirer,
        )),
        Ok(user) => {
            let listed = user
                .student()
                .and_then(|s| s.enquiries.get(&enquiry.camp))
                .is_some_and(|ids| ids.contains(&id));
            if !listed {
                out.push(Violation::back_reference::<Enquiry>(
                    id,
                    "Enquirer",
                    &enquiry.enquirer,
                    "the user does not list the enquiry",
                ));
            }
        }
    }

    if let Some(replier) = &enquiry.replier {
        if !stores.users.contains(replier.as_str()) {
            out.push(Violation::dangling::<Enquiry, User>(id, "Replier", replier));
        }
    }
}

fn check_suggestion(stores: &Stores, suggestion: &Suggestion, out: &mut Vec<Violation>) {
    let id = suggestion.id;

    match stores.camps.get(suggestion.camp.as_str()) {
        Err(_) => out.push(Violation::dangling::<Suggestion, Camp>(
            id,
            "Camp",
            &suggestion.camp,
        )),
        Ok(camp) if !camp.suggestions.contains(&id) => {
            out.push(Violation::back_reference::<Suggestion>(
                id,
                "Camp",
                &suggestion.camp,
                "the camp does not list the suggestion",
            ))
        }
        Ok(_) => {}
    }

    match stores.users.get(suggestion.author.as_str()) {
        Err(_) => out.push(Violation::dangling::<Suggestion, User>(
            id,
            "Author",
            &suggestion.author,
        )),
        Ok(user) => {
            let listed = user
                .committee()
                .is_some_and(|c| c.suggestions.contains(&id));
            if !listed {
                out.push(Violation::back_reference::<Suggestion>(
                    id,
                    "Author",
                    &suggestion.author,
                    "the user does not list the suggestion",
                ));
            }
        }
    }
}

/// Remove references whose target does not exist.
///
/// Enquiries and suggestions whose camp or author is missing are dropped;
/// committee members whose facilitating camp is missing are demoted. A
/// camp's staff-in-charge is a required scalar and is left as is.
pub fn prune_dangling(stores: &mut Stores) -> DbResult<usize> {
    let users: BTreeSet<String> = stores.users.keys().cloned().collect();
    let camps: BTreeSet<String> = stores.camps.keys().cloned().collect();

    let orphan_enquiries: Vec<EnquiryId> = stores
        .enquiries
        .iter()
        .filter(|e| !camps.contains(&e.camp) || !users.contains(&e.enquirer))
        .map(|e| e.id)
        .collect();
    let orphan_suggestions: Vec<SuggestionId> = stores
        .suggestions
        .iter()
        .filter(|s| !camps.contains(&s.camp) || !users.contains(&s.author))
        .map(|s| s.id)
        .collect();
    for id in &orphan_enquiries {
        stores.enquiries.delete(id)?;
    }
    for id in &orphan_suggestions {
        stores.suggestions.delete(id)?;
    }

    let enquiries: BTreeSet<EnquiryId> = stores.enquiries.keys().copied().collect();
    let suggestions: BTreeSet<SuggestionId> = stores.suggestions.keys().copied().collect();

    let mut pruned = orphan_enquiries.len() + orphan_suggestions.len();

    pruned += stores.enquiries.update_all(|enquiry| {
        let dangling = enquiry
            .replier
            .as_ref()
            .is_some_and(|r| !users.contains(r));
        if dangling {
            enquiry.replier = None;
        }
        dangling
    })?;

    pruned += stores.users.update_all(|user| {
        let before = user.clone();
        if let Some(student) = user.student_mut() {
            student.registered_camps.retain(|c| camps.contains(c));
            student.enquiries.retain(|c, _| camps.contains(c));
            for ids in student.enquiries.values_mut() {
                ids.retain(|id| enquiries.contains(id));
            }
            student.enquiries.retain(|_, ids| !ids.is_empty());
        }
        if let Some(committee) = user.committee_mut() {
            committee.suggestions.retain(|id| suggestions.contains(id));
        }
        if let Some(staff) = user.staff_mut() {
            staff.created_camps.retain(|c| camps.contains(c));
        }
        let orphaned_committee = user
            .committee()
            .is_some_and(|c| !camps.contains(&c.facilitating_camp));
        if orphaned_committee {
            user.demote_to_student();
        }
        *user != before
    })?;

    pruned += stores.camps.update_all(|camp| {
        let before = camp.clone();
        camp.attendees.retain(|u| users.contains(u));
        camp.committee_members.retain(|u| users.contains(u));
        camp.suggestions.retain(|id| suggestions.contains(id));
        camp.enquiries.retain(|id| enquiries.contains(id));
        *camp != before
    })?;

    debug!(pruned, "Pruned dangling references");
    Ok(pruned)
}
