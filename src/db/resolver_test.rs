//! Tests for cross-reference resolution.

use crate::db::fixtures::{sample_repositories, sample_stores, student};
use crate::db::{DbError, Repositories, Repository, Stores, Violation, resolve};

/// Rebuild stores through the loading path after `edit`, so the edit
/// bypasses runtime checks the same way a hand-edited file would.
fn reload(edit: impl FnOnce(&mut Stores)) -> Stores {
    let mut stores = sample_stores();
    edit(&mut stores);
    stores
}

#[test]
fn consistent_dataset_has_no_violations() {
    assert!(resolve(&sample_stores()).is_empty());
}

#[test]
fn unknown_registered_camp_names_student_and_camp() {
    let stores = reload(|s| {
        s.users
            .get_mut("S2")
            .unwrap()
            .student_mut()
            .unwrap()
            .registered_camps
            .push("CAMP99".to_string());
    });

    let violations = resolve(&stores);

    assert_eq!(
        violations,
        vec![Violation::Dangling {
            entity_type: "User".to_string(),
            id: "S2".to_string(),
            field: "RegisteredCamps".to_string(),
            target_type: "Camp".to_string(),
            target: "CAMP99".to_string(),
        }]
    );
    let message = violations[0].to_string();
    assert!(message.contains("S2"));
    assert!(message.contains("CAMP99"));
}

#[test]
fn all_violations_are_collected() {
    let stores = reload(|s| {
        let camp = s.camps.get_mut("Orientation").unwrap();
        camp.attendees.insert("GHOST".to_string());
        camp.enquiries.insert(42);
        s.enquiries.get_mut(&1).unwrap().replier = Some("NOBODY".to_string());
    });

    let violations = resolve(&stores);

    assert_eq!(violations.len(), 3);
    let targets: Vec<String> = violations
        .iter()
        .filter_map(|v| match v {
            Violation::Dangling { target, .. } => Some(target.clone()),
            _ => None,
        })
        .collect();
    assert!(targets.contains(&"GHOST".to_string()));
    assert!(targets.contains(&"42".to_string()));
    assert!(targets.contains(&"NOBODY".to_string()));
}

#[test]
fn over_capacity_camp_is_reported() {
    let stores = reload(|s| {
        s.camps.get_mut("Orientation").unwrap().capacity = 0;
    });

    assert_eq!(
        resolve(&stores),
        vec![Violation::CapacityExceeded {
            camp: "Orientation".to_string(),
            attendees: 1,
            capacity: 0,
        }]
    );
}

#[test]
fn facilitating_camp_must_be_registered() {
    let stores = reload(|s| {
        s.users
            .get_mut("LEE")
            .unwrap()
            .student_mut()
            .unwrap()
            .registered_camps
            .clear();
    });

    let violations = resolve(&stores);

    assert!(violations.contains(&Violation::FacilitatingCampNotRegistered {
        user: "LEE".to_string(),
        camp: "Orientation".to_string(),
    }));
}

#[test]
fn one_sided_membership_is_a_mismatch() {
    let stores = reload(|s| {
        s.camps
            .get_mut("Orientation")
            .unwrap()
            .attendees
            .insert("S2".to_string());
    });

    let violations = resolve(&stores);

    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        Violation::MembershipMismatch { entity_type, id, field, target, .. }
            if entity_type == "Camp" && id == "Orientation" && field == "Attendees" && target == "S2"
    ));
}

#[test]
fn staff_in_charge_must_be_staff() {
    let stores = reload(|s| {
        s.camps.get_mut("Orientation").unwrap().staff_in_charge = "S2".to_string();
    });

    let violations = resolve(&stores);

    assert!(violations.iter().any(|v| matches!(
        v,
        Violation::MembershipMismatch { field, reason, .. }
            if field == "StaffInCharge" && reason.contains("not a staff member")
    )));
}

#[test]
fn repositories_block_writes_until_acknowledged() {
    let stores = reload(|s| {
        s.camps
            .get_mut("Orientation")
            .unwrap()
            .attendees
            .insert("GHOST".to_string());
    });
    let mut repos = Repositories::from_loaded(stores);

    let err = repos.insert_user(student("S9", "SCSE")).unwrap_err();
    assert_eq!(err, DbError::IntegrityUnresolved { count: 1 });
    assert!(repos.integrity_error().unwrap().to_string().contains("GHOST"));

    let acknowledged = repos.acknowledge_violations().unwrap();
    assert_eq!(acknowledged.len(), 1);
    assert!(repos.check().is_empty());
    assert!(!repos.camps.get("Orientation").unwrap().attendees.contains("GHOST"));

    repos.insert_user(student("S9", "SCSE")).unwrap();
}

#[test]
fn pruning_drops_orphaned_enquiries_and_demotes_committee() {
    let stores = reload(|s| {
        s.camps.delete("Orientation").unwrap();
    });
    let mut repos = Repositories::from_loaded(stores);
    assert!(!repos.violations().is_empty());

    repos.acknowledge_violations().unwrap();

    assert!(repos.enquiries.is_empty());
    assert!(repos.suggestions.is_empty());
    let lee = repos.users.get("LEE").unwrap();
    assert!(lee.committee().is_none());
    assert!(lee.student().unwrap().registered_camps.is_empty());
    assert!(repos.users.get("S1").unwrap().student().unwrap().enquiries.is_empty());
    assert!(repos.users.get("HUKUMAR").unwrap().staff().unwrap().created_camps.is_empty());
    assert!(repos.check().is_empty());
}

#[test]
fn integrity_error_lists_every_violation() {
    let stores = reload(|s| {
        let camp = s.camps.get_mut("Orientation").unwrap();
        camp.attendees.insert("GHOST".to_string());
        camp.committee_members.insert("PHANTOM".to_string());
    });
    let repos = Repositories::from_loaded(stores);

    let message = repos.integrity_error().unwrap().to_string();

    assert!(message.starts_with("2 referential integrity violation(s):"));
    assert!(message.contains("GHOST"));
    assert!(message.contains("PHANTOM"));
}

#[test]
fn clean_repositories_have_no_integrity_error() {
    assert!(sample_repositories().integrity_error().is_none());
}
