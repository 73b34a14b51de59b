//! Shared test data: a small, fully consistent dataset.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::models::*;
use super::repository::{Repositories, Stores};

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) fn student(id: &str, faculty: &str) -> User {
    User {
        id: id.to_string(),
        password: "password".to_string(),
        name: format!("Student {}", id),
        faculty: faculty.to_string(),
        email_domain: "e.ntu.edu.sg".to_string(),
        role: Role::Student(StudentProfile::default()),
    }
}

pub(crate) fn staff(id: &str, camps: &[&str]) -> User {
    User {
        id: id.to_string(),
        password: "password".to_string(),
        name: format!("Staff {}", id),
        faculty: "SCSE".to_string(),
        email_domain: "ntu.edu.sg".to_string(),
        role: Role::Staff(StaffProfile {
            created_camps: camps.iter().map(|c| c.to_string()).collect(),
        }),
    }
}

pub(crate) fn camp(name: &str, staff_in_charge: &str) -> Camp {
    Camp {
        name: name.to_string(),
        description: format!("{} camp", name),
        start_date: date("2024-08-01"),
        end_date: date("2024-08-03"),
        registration_closing: date("2024-07-20"),
        location: "North Spine".to_string(),
        faculty: OPEN_FACULTY.to_string(),
        staff_in_charge: staff_in_charge.to_string(),
        capacity: 2,
        attendees: BTreeSet::new(),
        committee_members: BTreeSet::new(),
        visible: true,
        suggestions: BTreeSet::new(),
        enquiries: BTreeSet::new(),
    }
}

/// Staff HUKUMAR runs "Orientation"; S1 attends it and asked enquiry 1;
/// LEE facilitates it and wrote suggestion 1; S2 is unregistered.
pub(crate) fn sample_stores() -> Stores {
    let mut orientation = camp("Orientation", "HUKUMAR");
    orientation.attendees.insert("S1".to_string());
    orientation.committee_members.insert("LEE".to_string());
    orientation.enquiries.insert(1);
    orientation.suggestions.insert(1);

    let mut s1 = student("S1", "SCSE");
    if let Some(profile) = s1.student_mut() {
        profile.registered_camps.push("Orientation".to_string());
        profile.enquiries = BTreeMap::from([("Orientation".to_string(), vec![1])]);
    }

    let mut lee = student("LEE", "EEE");
    lee.promote_to_committee("Orientation");
    if let Some(committee) = lee.committee_mut() {
        committee.suggestions.push(1);
        committee.points = 1;
    }

    let mut stores = Stores::default();
    stores.begin_load();
    stores
        .users
        .load(staff("HUKUMAR", &["Orientation"]))
        .unwrap();
    stores.users.load(s1).unwrap();
    stores.users.load(student("S2", "EEE")).unwrap();
    stores.users.load(lee).unwrap();
    stores.camps.load(orientation).unwrap();
    stores
        .enquiries
        .load(Enquiry {
            id: 1,
            camp: "Orientation".to_string(),
            text: "Is lunch provided?".to_string(),
            enquirer: "S1".to_string(),
            replier: None,
            reply: None,
        })
        .unwrap();
    stores
        .suggestions
        .load(Suggestion {
            id: 1,
            camp: "Orientation".to_string(),
            author: "LEE".to_string(),
            text: "Add a campfire night".to_string(),
            status: SuggestionStatus::Pending,
        })
        .unwrap();
    stores.finish_load();
    stores
}

pub(crate) fn sample_repositories() -> Repositories {
    let repos = Repositories::from_loaded(sample_stores());
    assert!(repos.violations().is_empty(), "{:?}", repos.violations());
    repos
}
