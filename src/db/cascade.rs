//! Cascading deletes and camp renames.
//!
//! Deleting an entity removes its ID from every collection that could hold
//! it, so no reference is left dangling. Renaming a camp rewrites every
//! reference to the old name.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::models::{Camp, Enquiry, EnquiryId, Role, Suggestion, SuggestionId, User};
use super::repository::{Repository, Stores};
use super::{DbError, DbResult};

impl Stores {
    /// Delete a camp with its enquiries and suggestions.
    ///
    /// Committee members facilitating the camp are demoted to students.
    pub fn delete_camp(&mut self, name: &str) -> DbResult<Camp> {
        let camp = self.camps.delete(name)?;

        let enquiry_ids: BTreeSet<EnquiryId> = self
            .enquiries
            .iter()
            .filter(|e| e.camp == name)
            .map(|e| e.id)
            .chain(camp.enquiries.iter().copied())
            .collect();
        let suggestion_ids: BTreeSet<SuggestionId> = self
            .suggestions
            .iter()
            .filter(|s| s.camp == name)
            .map(|s| s.id)
            .chain(camp.suggestions.iter().copied())
            .collect();

        self.remove_enquiries(&enquiry_ids)?;
        self.remove_suggestions(&suggestion_ids)?;

        let touched = self.users.update_all(|user| {
            let mut changed = false;
            let mut demote = false;
            match &mut user.role {
                Role::Student(student) => {
                    changed |= forget_camp(&mut student.registered_camps, name);
                    changed |= student.enquiries.remove(name).is_some();
                }
                Role::CommitteeMember(student, committee) => {
                    changed |= forget_camp(&mut student.registered_camps, name);
                    changed |= student.enquiries.remove(name).is_some();
                    let before = committee.suggestions.len();
                    committee
                        .suggestions
                        .retain(|id| !suggestion_ids.contains(id));
                    changed |= committee.suggestions.len() != before;
                    demote = committee.facilitating_camp == name;
                }
                Role::Staff(staff) => {
                    changed |= forget_camp(&mut staff.created_camps, name);
                }
            }
            if demote {
                user.demote_to_student();
                changed = true;
            }
            changed
        })?;

        info!(
            camp = name,
            enquiries = enquiry_ids.len(),
            suggestions = suggestion_ids.len(),
            users = touched,
            "Deleted camp"
        );
        Ok(camp)
    }

    /// Give a camp a new name. The camp name is its ID, so every enquiry,
    /// suggestion and user that refers to it is rewritten too.
    pub fn rename_camp(&mut self, old: &str, new: &str) -> DbResult<()> {
        if old == new {
            return Ok(());
        }
        if self.camps.contains(new) {
            return Err(DbError::AlreadyExists {
                entity_type: "Camp".to_string(),
                id: new.to_string(),
            });
        }

        let mut camp = self.camps.delete(old)?;
        camp.name = new.to_string();
        self.camps.insert(camp)?;

        let enquiries = self
            .enquiries
            .update_all(|enquiry| rename(&mut enquiry.camp, old, new))?;
        let suggestions = self
            .suggestions
            .update_all(|suggestion| rename(&mut suggestion.camp, old, new))?;
        let users = self.users.update_all(|user| {
            let mut changed = false;
            if let Some(student) = user.student_mut() {
                for registered in &mut student.registered_camps {
                    changed |= rename(registered, old, new);
                }
                if let Some(ids) = student.enquiries.remove(old) {
                    student.enquiries.entry(new.to_string()).or_default().extend(ids);
                    changed = true;
                }
            }
            if let Some(committee) = user.committee_mut() {
                changed |= rename(&mut committee.facilitating_camp, old, new);
            }
            if let Some(staff) = user.staff_mut() {
                for created in &mut staff.created_camps {
                    changed |= rename(created, old, new);
                }
            }
            changed
        })?;

        info!(
            camp = old,
            renamed_to = new,
            enquiries,
            suggestions,
            users,
            "Renamed camp"
        );
        Ok(())
    }

    /// Delete a user, removing them from every camp.
    ///
    /// Staff members still in charge of a camp cannot be deleted.
    pub fn delete_user(&mut self, id: &str) -> DbResult<User> {
        let user = self.users.get(id)?;
        if user.staff().is_some() {
            let owned: Vec<&str> = self
                .camps
                .iter()
                .filter(|c| c.staff_in_charge == id)
                .map(|c| c.name.as_str())
                .collect();
            if !owned.is_empty() {
                return Err(DbError::constraint(format!(
                    "staff member '{}' is in charge of: {}",
                    id,
                    owned.join(", ")
                )));
            }
        }

        let user = self.users.delete(id)?;

        let enquiry_ids: BTreeSet<EnquiryId> = self
            .enquiries
            .iter()
            .filter(|e| e.enquirer == id)
            .map(|e| e.id)
            .collect();
        let suggestion_ids: BTreeSet<SuggestionId> = self
            .suggestions
            .iter()
            .filter(|s| s.author == id)
            .map(|s| s.id)
            .collect();
        self.remove_enquiries(&enquiry_ids)?;
        self.remove_suggestions(&suggestion_ids)?;

        self.camps.update_all(|camp| {
            let before = (
                camp.attendees.len(),
                camp.committee_members.len(),
                camp.enquiries.len(),
                camp.suggestions.len(),
            );
            camp.attendees.remove(id);
            camp.committee_members.remove(id);
            camp.enquiries.retain(|e| !enquiry_ids.contains(e));
            camp.suggestions.retain(|s| !suggestion_ids.contains(s));
            before
                != (
                    camp.attendees.len(),
                    camp.committee_members.len(),
                    camp.enquiries.len(),
                    camp.suggestions.len(),
                )
        })?;

        self.enquiries.update_all(|enquiry| {
            if enquiry.replier.as_deref() == Some(id) {
                enquiry.replier = None;
                true
            } else {
                false
            }
        })?;

        info!(
            user = id,
            role = %user.role_kind(),
            enquiries = enquiry_ids.len(),
            suggestions = suggestion_ids.len(),
            "Deleted user"
        );
        Ok(user)
    }

    pub fn delete_enquiry(&mut self, id: EnquiryId) -> DbResult<Enquiry> {
        let enquiry = self.enquiries.delete(&id)?;
        self.camps.update_all(|camp| camp.enquiries.remove(&id))?;
        self.users.update_all(|user| match user.student_mut() {
            Some(student) => {
                let before = student.enquiries.clone();
                student.forget_enquiry(id);
                before != student.enquiries
            }
            None => false,
        })?;
        debug!(enquiry = id, camp = %enquiry.camp, "Deleted enquiry");
        Ok(enquiry)
    }

    pub fn delete_suggestion(&mut self, id: SuggestionId) -> DbResult<Suggestion> {
        let suggestion = self.suggestions.delete(&id)?;
        self.camps.update_all(|camp| camp.suggestions.remove(&id))?;
        self.users.update_all(|user| match user.committee_mut() {
            Some(committee) => {
                let before = committee.suggestions.len();
                committee.suggestions.retain(|s| *s != id);
                committee.suggestions.len() != before
            }
            None => false,
        })?;
        debug!(suggestion = id, camp = %suggestion.camp, "Deleted suggestion");
        Ok(suggestion)
    }

    /// Drop enquiries and every reference to them.
    fn remove_enquiries(&mut self, ids: &BTreeSet<EnquiryId>) -> DbResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        for id in ids {
            if self.enquiries.contains(id) {
                self.enquiries.delete(id)?;
            }
        }
        self.camps.update_all(|camp| {
            let before = camp.enquiries.len();
            camp.enquiries.retain(|e| !ids.contains(e));
            camp.enquiries.len() != before
        })?;
        self.users.update_all(|user| match user.student_mut() {
            Some(student) => {
                let before = student.enquiries.clone();
                for id in ids {
                    student.forget_enquiry(*id);
                }
                before != student.enquiries
            }
            None => false,
        })?;
        Ok(())
    }

    /// Drop suggestions and every reference to them.
    fn remove_suggestions(&mut self, ids: &BTreeSet<SuggestionId>) -> DbResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        for id in ids {
            if self.suggestions.contains(id) {
                self.suggestions.delete(id)?;
            }
        }
        self.camps.update_all(|camp| {
            let before = camp.suggestions.len();
            camp.suggestions.retain(|s| !ids.contains(s));
            camp.suggestions.len() != before
        })?;
        self.users.update_all(|user| match user.committee_mut() {
            Some(committee) => {
                let before = committee.suggestions.len();
                committee.suggestions.retain(|s| !ids.contains(s));
                committee.suggestions.len() != before
            }
            None => false,
        })?;
        Ok(())
    }
}

fn forget_camp(camps: &mut Vec<String>, name: &str) -> bool {
    let before = camps.len();
    camps.retain(|c| c != name);
    camps.len() != before
}

fn rename(value: &mut String, old: &str, new: &str) -> bool {
    if *value == old {
        *value = new.to_string();
        true
    } else {
        false
    }
}
