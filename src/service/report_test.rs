//! Tests for camp rosters.

use crate::db::fixtures::sample_repositories;
use crate::db::DbError;
use crate::service::*;

#[test]
fn full_roster_lists_attendees_then_committee() {
    let repos = sample_repositories();

    let roster = camp_roster(&repos, "Orientation", RosterFilter::All).unwrap();

    let ids: Vec<&str> = roster.iter().map(|e| e.user_id.as_str()).collect();
    assert_eq!(ids, vec!["S1", "LEE"]);
    assert_eq!(roster[0].role, RosterRole::Attendee);
    assert_eq!(roster[0].points, None);
    assert_eq!(roster[1].role, RosterRole::CommitteeMember);
    assert_eq!(roster[1].points, Some(1));
}

#[test]
fn filtered_rosters() {
    let repos = sample_repositories();

    let attendees = camp_roster(&repos, "Orientation", RosterFilter::Attendees).unwrap();
    let committee = camp_roster(&repos, "Orientation", RosterFilter::Committee).unwrap();

    assert_eq!(attendees.len(), 1);
    assert_eq!(committee.len(), 1);
    assert_eq!(committee[0].name, "Student LEE");
}

#[test]
fn roster_of_unknown_camp_is_not_found() {
    let repos = sample_repositories();
    assert!(matches!(
        camp_roster(&repos, "Nope", RosterFilter::All),
        Err(DbError::NotFound { .. })
    ));
}
