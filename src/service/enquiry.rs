//! Enquiries: students ask, staff and committee answer.

use tracing::{info, instrument};

use crate::codec::SCALAR_RESERVED;
use crate::db::{DbError, DbResult, Enquiry, EnquiryId, Repositories, Repository};

use super::{require_student, require_value};

/// Ask a question about a camp. Returns the new enquiry's ID.
#[instrument(skip(repos, text))]
pub fn submit_enquiry(
    repos: &mut Repositories,
    student_id: &str,
    camp: &str,
    text: &str,
) -> DbResult<EnquiryId> {
    require_value("Enquiry", text, SCALAR_RESERVED)?;
    let stores = repos.write()?;
    let user = require_student(stores, student_id)?;
    let entry = stores.camps.get(camp)?;
    if !entry.visible || !entry.is_open_to(&user.faculty) {
        return Err(DbError::validation(format!(
            "camp '{}' is not visible to '{}'",
            camp, student_id
        )));
    }
    if entry.committee_members.contains(student_id) {
        return Err(DbError::validation(format!(
            "committee member '{}' cannot enquire about their own camp",
            student_id
        )));
    }

    let id = stores.next_enquiry_id()?;
    stores.enquiries.insert(Enquiry {
        id,
        camp: camp.to_string(),
        text: text.to_string(),
        enquirer: student_id.to_string(),
        replier: None,
        reply: None,
    })?;
    stores.camps.get_mut(camp)?.enquiries.insert(id);
    if let Some(student) = stores.users.get_mut(student_id)?.student_mut() {
        student
            .enquiries
            .entry(camp.to_string())
            .or_default()
            .push(id);
    }

    info!(enquiry = id, "Submitted enquiry");
    Ok(id)
}

/// Look up an enquiry the student may still change.
fn open_enquiry<'r>(
    repos: &'r Repositories,
    student_id: &str,
    id: EnquiryId,
) -> DbResult<&'r Enquiry> {
    let enquiry = repos.enquiries.get(&id)?;
    if enquiry.enquirer != student_id {
        return Err(DbError::validation(format!(
            "enquiry {} belongs to '{}'",
            id, enquiry.enquirer
        )));
    }
    if enquiry.is_answered() {
        return Err(DbError::validation(format!(
            "enquiry {} has been answered",
            id
        )));
    }
    Ok(enquiry)
}

/// Change the text of an unanswered enquiry.
#[instrument(skip(repos, text))]
pub fn edit_enquiry(
    repos: &mut Repositories,
    student_id: &str,
    id: EnquiryId,
    text: &str,
) -> DbResult<()> {
    require_value("Enquiry", text, SCALAR_RESERVED)?;
    open_enquiry(repos, student_id, id)?;

    repos.write()?.enquiries.get_mut(&id)?.text = text.to_string();
    info!("Edited enquiry");
    Ok(())
}

/// Answer an enquiry as the camp's staff in charge or one of its committee
/// members. A committee member earns a point per reply.
#[instrument(skip(repos, reply))]
pub fn reply_enquiry(
    repos: &mut Repositories,
    replier_id: &str,
    id: EnquiryId,
    reply: &str,
) -> DbResult<()> {
    require_value("Reply", reply, SCALAR_RESERVED)?;
    let stores = repos.write()?;
    let enquiry = stores.enquiries.get(&id)?;
    if enquiry.is_answered() {
        return Err(DbError::validation(format!(
            "enquiry {} has already been answered",
            id
        )));
    }
    let camp = stores.camps.get(enquiry.camp.as_str())?;
    let is_staff = camp.staff_in_charge == replier_id;
    let is_committee = camp.committee_members.contains(replier_id);
    if !is_staff && !is_committee {
        return Err(DbError::validation(format!(
            "'{}' cannot reply to enquiries about '{}'",
            replier_id, camp.name
        )));
    }

    let enquiry = stores.enquiries.get_mut(&id)?;
    enquiry.replier = Some(replier_id.to_string());
    enquiry.reply = Some(reply.to_string());
    if is_committee {
        if let Some(committee) = stores.users.get_mut(replier_id)?.committee_mut() {
            committee.award_point();
        }
    }

    info!("Replied to enquiry");
    Ok(())
}

/// Withdraw an unanswered enquiry.
#[instrument(skip(repos))]
pub fn delete_enquiry(
    repos: &mut Repositories,
    student_id: &str,
    id: EnquiryId,
) -> DbResult<Enquiry> {
    open_enquiry(repos, student_id, id)?;
    repos.delete_enquiry(id)
}
