//! Domain operations over the repositories.
//!
//! Every operation checks its preconditions before touching any store, so a
//! refused operation leaves the data unchanged. All of them go through
//! [`Repositories::write`] and are therefore blocked while integrity
//! violations are unacknowledged.
//!
//! [`Repositories::write`]: crate::db::Repositories::write

mod camp;
mod enquiry;
mod report;
mod suggestion;

#[cfg(test)]
mod report_test;

pub use camp::{
    COMMITTEE_SLOTS, CampChanges, NewCamp, create_camp, delete_camp, edit_camp,
    join_as_committee, register_attendee, toggle_visibility, withdraw_attendee,
};
pub use enquiry::{delete_enquiry, edit_enquiry, reply_enquiry, submit_enquiry};
pub use report::{RosterEntry, RosterFilter, RosterRole, camp_roster};
pub use suggestion::{delete_suggestion, edit_suggestion, review_suggestion, submit_suggestion};

use crate::codec::check_value;
use crate::db::{Camp, DbError, DbResult, Repository, Stores, User};

/// Reject empty values and values the data files cannot hold.
fn require_value(field: &str, value: &str, reserved: &[char]) -> DbResult<()> {
    if value.trim().is_empty() {
        return Err(DbError::validation(format!("{} must not be empty", field)));
    }
    check_value(value, reserved).map_err(|e| DbError::validation(format!("{}: {}", field, e)))
}

fn require_staff_in_charge<'s>(stores: &'s Stores, staff_id: &str, camp: &str) -> DbResult<&'s Camp> {
    let camp = stores.camps.get(camp)?;
    if camp.staff_in_charge != staff_id {
        return Err(DbError::validation(format!(
            "'{}' is not the staff in charge of '{}'",
            staff_id, camp.name
        )));
    }
    Ok(camp)
}

fn require_student<'s>(stores: &'s Stores, user_id: &str) -> DbResult<&'s User> {
    let user = stores.users.get(user_id)?;
    if user.student().is_none() {
        return Err(DbError::validation(format!(
            "'{}' is a {} and cannot take part in camps",
            user_id,
            user.role_kind()
        )));
    }
    Ok(user)
}
