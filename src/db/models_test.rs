//! Tests for domain models.

use crate::db::fixtures::{camp, date, student};
use crate::db::models::*;

#[test]
fn suggestion_status_deserializes_from_lowercase() {
    let approved: SuggestionStatus = serde_json::from_str("\"approved\"").unwrap();
    assert_eq!(approved, SuggestionStatus::Approved);

    let pending: SuggestionStatus = "pending".parse().unwrap();
    assert_eq!(pending, SuggestionStatus::Pending);
}

#[test]
fn suggestion_status_rejects_unknown_value() {
    let err = "maybe".parse::<SuggestionStatus>().unwrap_err();
    assert_eq!(err, "Invalid suggestion status: maybe");
}

#[test]
fn suggestion_status_only_leaves_pending() {
    use SuggestionStatus::*;

    assert!(Pending.can_transition_to(Approved));
    assert!(Pending.can_transition_to(Rejected));
    assert!(!Pending.can_transition_to(Pending));
    assert!(!Approved.can_transition_to(Rejected));
    assert!(!Rejected.can_transition_to(Approved));
}

#[test]
fn promote_adds_facilitating_camp_to_registrations() {
    let mut user = student("LEE", "EEE");

    assert!(user.promote_to_committee("Orientation"));

    assert_eq!(user.role_kind(), RoleKind::CommitteeMember);
    assert!(user.student().unwrap().is_registered("Orientation"));
    assert_eq!(user.committee().unwrap().facilitating_camp, "Orientation");
    assert_eq!(user.committee().unwrap().points, 0);
}

#[test]
fn promote_is_refused_for_committee_member() {
    let mut user = student("LEE", "EEE");
    user.promote_to_committee("Orientation");

    assert!(!user.promote_to_committee("Hackathon"));
    assert_eq!(user.committee().unwrap().facilitating_camp, "Orientation");
}

#[test]
fn demote_keeps_registrations() {
    let mut user = student("LEE", "EEE");
    user.promote_to_committee("Orientation");

    user.demote_to_student();

    assert_eq!(user.role_kind(), RoleKind::Student);
    assert!(user.student().unwrap().is_registered("Orientation"));
}

#[test]
fn forget_enquiry_drops_empty_camp_entries() {
    let mut profile = StudentProfile::default();
    profile.enquiries.insert("A".to_string(), vec![1, 2]);
    profile.enquiries.insert("B".to_string(), vec![3]);

    profile.forget_enquiry(3);
    profile.forget_enquiry(1);

    assert_eq!(profile.enquiries.len(), 1);
    assert_eq!(profile.enquiries["A"], vec![2]);
}

#[test]
fn award_point_saturates() {
    let mut profile = CommitteeProfile {
        facilitating_camp: "A".to_string(),
        suggestions: Vec::new(),
        points: u32::MAX,
    };
    profile.award_point();
    assert_eq!(profile.points, u32::MAX);
}

#[test]
fn open_faculty_camp_accepts_everyone() {
    let mut c = camp("Orientation", "HUKUMAR");
    assert!(c.is_open_to("EEE"));

    c.faculty = "SCSE".to_string();
    assert!(c.is_open_to("SCSE"));
    assert!(!c.is_open_to("EEE"));
}

#[test]
fn capacity_ignores_committee_members() {
    let mut c = camp("Orientation", "HUKUMAR");
    c.capacity = 1;
    c.committee_members.insert("LEE".to_string());
    assert!(c.has_vacancy());

    c.attendees.insert("S1".to_string());
    assert!(!c.has_vacancy());
}

#[test]
fn camps_sharing_a_day_overlap() {
    let a = camp("A", "HUKUMAR");
    let mut b = camp("B", "HUKUMAR");
    b.start_date = date("2024-08-03");
    b.end_date = date("2024-08-05");
    assert!(a.overlaps(&b));

    b.start_date = date("2024-08-04");
    assert!(!a.overlaps(&b));
}

#[test]
fn role_serializes_with_snake_case_tag() {
    let user = student("S1", "SCSE");
    let json = serde_json::to_value(&user).unwrap();
    assert!(json["role"]["student"].is_object());
}
