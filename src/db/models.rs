//! Domain models for the CAMs dataset.
//!
//! These models are storage-agnostic. Cross references are plain IDs that
//! are looked up in the owning store; nothing here holds a reference to
//! another entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// User IDs are the local part of the user's e-mail address.
pub type UserId = String;

/// Camps are identified by their name.
pub type CampId = String;

pub type EnquiryId = u32;

pub type SuggestionId = u32;

/// Faculty scope that opens a camp to every student.
pub const OPEN_FACULTY: &str = "NTU";

/// A user of the system. The role decides which payload is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub password: String,
    pub name: String,
    pub faculty: String,
    /// Domain half of the stored e-mail, kept so exports reproduce imports.
    pub email_domain: String,
    pub role: Role,
}

impl User {
    pub fn role_kind(&self) -> RoleKind {
        match self.role {
            Role::Student(_) => RoleKind::Student,
            Role::CommitteeMember(_, _) => RoleKind::CommitteeMember,
            Role::Staff(_) => RoleKind::Staff,
        }
    }

    /// Registration data for students and committee members.
    pub fn student(&self) -> Option<&StudentProfile> {
        match &self.role {
            Role::Student(student) | Role::CommitteeMember(student, _) => Some(student),
            Role::Staff(_) => None,
        }
    }

    pub fn student_mut(&mut self) -> Option<&mut StudentProfile> {
        match &mut self.role {
            Role::Student(student) | Role::CommitteeMember(student, _) => Some(student),
            Role::Staff(_) => None,
        }
    }

    pub fn committee(&self) -> Option<&CommitteeProfile> {
        match &self.role {
            Role::CommitteeMember(_, committee) => Some(committee),
            _ => None,
        }
    }

    pub fn committee_mut(&mut self) -> Option<&mut CommitteeProfile> {
        match &mut self.role {
            Role::CommitteeMember(_, committee) => Some(committee),
            _ => None,
        }
    }

    pub fn staff(&self) -> Option<&StaffProfile> {
        match &self.role {
            Role::Staff(staff) => Some(staff),
            _ => None,
        }
    }

    pub fn staff_mut(&mut self) -> Option<&mut StaffProfile> {
        match &mut self.role {
            Role::Staff(staff) => Some(staff),
            _ => None,
        }
    }

    /// Promote a plain student to committee member of `camp`.
    ///
    /// The facilitating camp is inserted into the registered camps so the
    /// record satisfies the facilitating-camp policy from the start.
    /// Returns false when the user is not a plain student.
    pub fn promote_to_committee(&mut self, camp: &str) -> bool {
        let Role::Student(student) = &self.role else {
            return false;
        };
        let mut student = student.clone();
        if !student.registered_camps.iter().any(|c| c == camp) {
            student.registered_camps.push(camp.to_string());
        }
        self.role = Role::CommitteeMember(
            student,
            CommitteeProfile {
                facilitating_camp: camp.to_string(),
                suggestions: Vec::new(),
                points: 0,
            },
        );
        true
    }

    /// Drop the committee payload, keeping the registration data.
    pub fn demote_to_student(&mut self) {
        if let Role::CommitteeMember(student, _) = &self.role {
            self.role = Role::Student(student.clone());
        }
    }
}

/// Role-specific payload of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student(StudentProfile),
    CommitteeMember(StudentProfile, CommitteeProfile),
    Staff(StaffProfile),
}

/// Role tag without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Student,
    CommitteeMember,
    Staff,
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoleKind::Student => "student",
            RoleKind::CommitteeMember => "committee_member",
            RoleKind::Staff => "staff",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Camps joined as attendee or committee member, in registration order.
    pub registered_camps: Vec<CampId>,
    /// Enquiry IDs grouped by the camp they were asked about.
    pub enquiries: BTreeMap<CampId, Vec<EnquiryId>>,
}

impl StudentProfile {
    pub fn is_registered(&self, camp: &str) -> bool {
        self.registered_camps.iter().any(|c| c == camp)
    }

    /// Remove an enquiry ID from whichever camp entry holds it, dropping
    /// entries that become empty.
    pub(crate) fn forget_enquiry(&mut self, id: EnquiryId) {
        for ids in self.enquiries.values_mut() {
            ids.retain(|e| *e != id);
        }
        self.enquiries.retain(|_, ids| !ids.is_empty());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeProfile {
    pub facilitating_camp: CampId,
    pub suggestions: Vec<SuggestionId>,
    pub points: u32,
}

impl CommitteeProfile {
    pub fn award_point(&mut self) {
        self.points = self.points.saturating_add(1);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub created_camps: Vec<CampId>,
}

/// A camp organised by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camp {
    pub name: CampId,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_closing: NaiveDate,
    pub location: String,
    /// Faculty the camp is open to, or [`OPEN_FACULTY`].
    pub faculty: String,
    pub staff_in_charge: UserId,
    /// Maximum number of attendees. Committee members do not count.
    pub capacity: u32,
    pub attendees: BTreeSet<UserId>,
    pub committee_members: BTreeSet<UserId>,
    pub visible: bool,
    pub suggestions: BTreeSet<SuggestionId>,
    pub enquiries: BTreeSet<EnquiryId>,
}

impl Camp {
    pub fn is_open_to(&self, faculty: &str) -> bool {
        self.faculty == OPEN_FACULTY || self.faculty == faculty
    }

    pub fn has_vacancy(&self) -> bool {
        (self.attendees.len() as u64) < u64::from(self.capacity)
    }

    pub fn overlaps(&self, other: &Camp) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    pub fn is_member(&self, user: &str) -> bool {
        self.attendees.contains(user) || self.committee_members.contains(user)
    }
}

/// A question a student asked about a camp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enquiry {
    pub id: EnquiryId,
    pub camp: CampId,
    pub text: String,
    pub enquirer: UserId,
    pub replier: Option<UserId>,
    pub reply: Option<String>,
}

impl Enquiry {
    pub fn is_answered(&self) -> bool {
        self.reply.is_some()
    }
}

/// A committee member's proposal for changing a camp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: SuggestionId,
    pub camp: CampId,
    pub author: UserId,
    pub text: String,
    pub status: SuggestionStatus,
}

/// Review state of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SuggestionStatus {
    /// Only pending suggestions move, and only to a final state.
    pub fn can_transition_to(self, next: SuggestionStatus) -> bool {
        self == SuggestionStatus::Pending && next != SuggestionStatus::Pending
    }
}

impl std::fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionStatus::Pending => write!(f, "pending"),
            SuggestionStatus::Approved => write!(f, "approved"),
            SuggestionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SuggestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SuggestionStatus::Pending),
            "approved" => Ok(SuggestionStatus::Approved),
            "rejected" => Ok(SuggestionStatus::Rejected),
            _ => Err(format!("Invalid suggestion status: {}", s)),
        }
    }
}
