//! Column layouts for every data file.

use super::error::{EncodeError, FormatError};
use super::record::{Row, RowWriter, Schema};
use crate::db::{
    Camp, CommitteeProfile, Enquiry, Role, RoleKind, StaffProfile, StudentProfile, Suggestion,
    User,
};

pub struct StudentSchema;

pub struct CommitteeSchema;

pub struct StaffSchema;

pub struct CampSchema;

pub struct EnquirySchema;

pub struct SuggestionSchema;

const STUDENT_COLUMNS: &[&str] = &[
    "Name",
    "Email",
    "Faculty",
    "Password",
    "RegisteredCamps",
    "Enquiries",
];

const COMMITTEE_COLUMNS: &[&str] = &[
    "Name",
    "Email",
    "Faculty",
    "Password",
    "RegisteredCamps",
    "Enquiries",
    "FacilitatingCamp",
    "Suggestions",
    "Points",
];

/// Name, e-mail, faculty and password, shared by every user file.
fn decode_account(row: &Row<'_>, role: Role) -> Result<User, FormatError> {
    let (id, email_domain) = row.email(1)?;
    Ok(User {
        id,
        password: row.text(3),
        name: row.text(0),
        faculty: row.text(2),
        email_domain,
        role,
    })
}

fn encode_account(writer: RowWriter, user: &User) -> Result<RowWriter, EncodeError> {
    writer
        .text("Name", &user.name)?
        .email("Email", &user.id, &user.email_domain)?
        .text("Faculty", &user.faculty)?
        .text("Password", &user.password)
}

fn decode_student_profile(row: &Row<'_>) -> Result<StudentProfile, FormatError> {
    Ok(StudentProfile {
        registered_camps: row.list(4),
        enquiries: row.map(5)?,
    })
}

fn encode_student_profile(
    writer: RowWriter,
    student: &StudentProfile,
) -> Result<RowWriter, EncodeError> {
    writer
        .list("RegisteredCamps", &student.registered_camps)?
        .map("Enquiries", &student.enquiries)
}

fn role_mismatch(user: &User, expected: RoleKind) -> EncodeError {
    EncodeError::RoleMismatch {
        entity: "User".to_string(),
        id: user.id.clone(),
        expected: expected.to_string(),
        actual: user.role_kind().to_string(),
    }
}

impl Schema for StudentSchema {
    type Entity = User;

    const FILE_NAME: &'static str = "student.csv";
    const KEY_COLUMN: &'static str = "Email";
    const COLUMNS: &'static [&'static str] = STUDENT_COLUMNS;

    fn decode(row: &Row<'_>) -> Result<User, FormatError> {
        let student = decode_student_profile(row)?;
        decode_account(row, Role::Student(student))
    }

    fn encode(user: &User) -> Result<String, EncodeError> {
        let Role::Student(student) = &user.role else {
            return Err(role_mismatch(user, RoleKind::Student));
        };
        let writer = encode_account(RowWriter::new("Student", &user.id), user)?;
        Ok(encode_student_profile(writer, student)?.finish())
    }
}

impl Schema for CommitteeSchema {
    type Entity = User;

    const FILE_NAME: &'static str = "committee.csv";
    const KEY_COLUMN: &'static str = "Email";
    const COLUMNS: &'static [&'static str] = COMMITTEE_COLUMNS;

    fn decode(row: &Row<'_>) -> Result<User, FormatError> {
        let student = decode_student_profile(row)?;
        let committee = CommitteeProfile {
            facilitating_camp: row.text(6),
            suggestions: row.ids(7)?,
            points: row.uint(8)?,
        };
        decode_account(row, Role::CommitteeMember(student, committee))
    }

    fn encode(user: &User) -> Result<String, EncodeError> {
        let Role::CommitteeMember(student, committee) = &user.role else {
            return Err(role_mismatch(user, RoleKind::CommitteeMember));
        };
        let writer = encode_account(RowWriter::new("CommitteeMember", &user.id), user)?;
        Ok(encode_student_profile(writer, student)?
            .key("FacilitatingCamp", &committee.facilitating_camp)?
            .ids(&committee.suggestions)
            .display(committee.points)
            .finish())
    }
}

impl Schema for StaffSchema {
    type Entity = User;

    const FILE_NAME: &'static str = "staff.csv";
    const KEY_COLUMN: &'static str = "Email";
    const COLUMNS: &'static [&'static str] =
        &["Name", "Email", "Faculty", "Password", "CreatedCamps"];

    fn decode(row: &Row<'_>) -> Result<User, FormatError> {
        let staff = StaffProfile {
            created_camps: row.list(4),
        };
        decode_account(row, Role::Staff(staff))
    }

    fn encode(user: &User) -> Result<String, EncodeError> {
        let Role::Staff(staff) = &user.role else {
            return Err(role_mismatch(user, RoleKind::Staff));
        };
        Ok(encode_account(RowWriter::new("Staff", &user.id), user)?
            .list("CreatedCamps", &staff.created_camps)?
            .finish())
    }
}

impl Schema for CampSchema {
    type Entity = Camp;

    const FILE_NAME: &'static str = "camp.csv";
    const KEY_COLUMN: &'static str = "Name";
    const COLUMNS: &'static [&'static str] = &[
        "Name",
        "Description",
        "StartDate",
        "EndDate",
        "RegistrationClosingDate",
        "Location",
        "Faculty",
        "StaffInCharge",
        "Capacity",
        "Attendees",
        "CommitteeMembers",
        "Visible",
        "Suggestions",
        "Enquiries",
    ];

    fn decode(row: &Row<'_>) -> Result<Camp, FormatError> {
        Ok(Camp {
            name: row.text(0),
            description: row.text(1),
            start_date: row.date(2)?,
            end_date: row.date(3)?,
            registration_closing: row.date(4)?,
            location: row.text(5),
            faculty: row.text(6),
            staff_in_charge: row.text(7),
            capacity: row.uint(8)?,
            attendees: row.set(9),
            committee_members: row.set(10),
            visible: row.flag(11)?,
            suggestions: row.id_set(12)?,
            enquiries: row.id_set(13)?,
        })
    }

    fn encode(camp: &Camp) -> Result<String, EncodeError> {
        Ok(RowWriter::new("Camp", &camp.name)
            .key("Name", &camp.name)?
            .text("Description", &camp.description)?
            .date(camp.start_date)
            .date(camp.end_date)
            .date(camp.registration_closing)
            .text("Location", &camp.location)?
            .text("Faculty", &camp.faculty)?
            .key("StaffInCharge", &camp.staff_in_charge)?
            .display(camp.capacity)
            .set("Attendees", &camp.attendees)?
            .set("CommitteeMembers", &camp.committee_members)?
            .display(camp.visible)
            .ids(&camp.suggestions)
            .ids(&camp.enquiries)
            .finish())
    }
}

impl Schema for EnquirySchema {
    type Entity = Enquiry;

    const FILE_NAME: &'static str = "enquiry.csv";
    const KEY_COLUMN: &'static str = "ID";
    const COLUMNS: &'static [&'static str] =
        &["ID", "Camp", "Enquiry", "Enquirer", "Replier", "Reply"];

    fn decode(row: &Row<'_>) -> Result<Enquiry, FormatError> {
        Ok(Enquiry {
            id: row.uint(0)?,
            camp: row.text(1),
            text: row.text(2),
            enquirer: row.text(3),
            replier: row.optional(4),
            reply: row.optional(5),
        })
    }

    fn encode(enquiry: &Enquiry) -> Result<String, EncodeError> {
        Ok(RowWriter::new("Enquiry", enquiry.id)
            .display(enquiry.id)
            .key("Camp", &enquiry.camp)?
            .text("Enquiry", &enquiry.text)?
            .key("Enquirer", &enquiry.enquirer)?
            .optional("Replier", enquiry.replier.as_deref())?
            .optional("Reply", enquiry.reply.as_deref())?
            .finish())
    }
}

impl Schema for SuggestionSchema {
    type Entity = Suggestion;

    const FILE_NAME: &'static str = "suggestion.csv";
    const KEY_COLUMN: &'static str = "ID";
    const COLUMNS: &'static [&'static str] = &["ID", "Camp", "Author", "Suggestion", "Status"];

    fn decode(row: &Row<'_>) -> Result<Suggestion, FormatError> {
        Ok(Suggestion {
            id: row.uint(0)?,
            camp: row.text(1),
            author: row.text(2),
            text: row.text(3),
            status: row.status(4)?,
        })
    }

    fn encode(suggestion: &Suggestion) -> Result<String, EncodeError> {
        Ok(RowWriter::new("Suggestion", suggestion.id)
            .display(suggestion.id)
            .key("Camp", &suggestion.camp)?
            .key("Author", &suggestion.author)?
            .text("Suggestion", &suggestion.text)?
            .display(suggestion.status)
            .finish())
    }
}
