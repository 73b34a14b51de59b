//! Suggestions: committee members propose, the staff in charge reviews.

use tracing::{info, instrument};

use crate::codec::SCALAR_RESERVED;
use crate::db::{
    DbError, DbResult, Repositories, Repository, Suggestion, SuggestionId, SuggestionStatus,
};

use super::{require_staff_in_charge, require_value};

/// Propose a change to the camp the author facilitates. The author earns
/// a point. Returns the new suggestion's ID.
#[instrument(skip(repos, text))]
pub fn submit_suggestion(
    repos: &mut Repositories,
    author_id: &str,
    camp: &str,
    text: &str,
) -> DbResult<SuggestionId> {
    require_value("Suggestion", text, SCALAR_RESERVED)?;
    let stores = repos.write()?;
    let facilitates = stores
        .users
        .get(author_id)?
        .committee()
        .is_some_and(|c| c.facilitating_camp == camp);
    if !facilitates {
        return Err(DbError::validation(format!(
            "'{}' is not on the committee of '{}'",
            author_id, camp
        )));
    }
    stores.camps.get(camp)?;

    let id = stores.next_suggestion_id()?;
    stores.suggestions.insert(Suggestion {
        id,
        camp: camp.to_string(),
        author: author_id.to_string(),
        text: text.to_string(),
        status: SuggestionStatus::Pending,
    })?;
    stores.camps.get_mut(camp)?.suggestions.insert(id);
    if let Some(committee) = stores.users.get_mut(author_id)?.committee_mut() {
        committee.suggestions.push(id);
        committee.award_point();
    }

    info!(suggestion = id, "Submitted suggestion");
    Ok(id)
}

/// Look up a suggestion its author may still change.
fn pending_suggestion<'r>(
    repos: &'r Repositories,
    author_id: &str,
    id: SuggestionId,
) -> DbResult<&'r Suggestion> {
    let suggestion = repos.suggestions.get(&id)?;
    if suggestion.author != author_id {
        return Err(DbError::validation(format!(
            "suggestion {} belongs to '{}'",
            id, suggestion.author
        )));
    }
    if suggestion.status != SuggestionStatus::Pending {
        return Err(DbError::validation(format!(
            "suggestion {} has been {} and can no longer change",
            id, suggestion.status
        )));
    }
    Ok(suggestion)
}

/// Change the text of a pending suggestion.
#[instrument(skip(repos, text))]
pub fn edit_suggestion(
    repos: &mut Repositories,
    author_id: &str,
    id: SuggestionId,
    text: &str,
) -> DbResult<()> {
    require_value("Suggestion", text, SCALAR_RESERVED)?;
    pending_suggestion(repos, author_id, id)?;

    repos.write()?.suggestions.get_mut(&id)?.text = text.to_string();
    info!("Edited suggestion");
    Ok(())
}

/// Approve or reject a pending suggestion. Approval earns the author a
/// point.
#[instrument(skip(repos))]
pub fn review_suggestion(
    repos: &mut Repositories,
    staff_id: &str,
    id: SuggestionId,
    decision: SuggestionStatus,
) -> DbResult<()> {
    let stores = repos.write()?;
    let suggestion = stores.suggestions.get(&id)?;
    require_staff_in_charge(stores, staff_id, &suggestion.camp)?;
    if !suggestion.status.can_transition_to(decision) {
        return Err(DbError::validation(format!(
            "suggestion {} cannot move from {} to {}",
            id, suggestion.status, decision
        )));
    }
    let author = suggestion.author.clone();

    stores.suggestions.get_mut(&id)?.status = decision;
    if decision == SuggestionStatus::Approved {
        if let Some(committee) = stores.users.get_mut(author.as_str())?.committee_mut() {
            committee.award_point();
        }
    }

    info!(status = %decision, "Reviewed suggestion");
    Ok(())
}

/// Withdraw a pending suggestion.
#[instrument(skip(repos))]
pub fn delete_suggestion(
    repos: &mut Repositories,
    author_id: &str,
    id: SuggestionId,
) -> DbResult<Suggestion> {
    pending_suggestion(repos, author_id, id)?;
    repos.delete_suggestion(id)
}
