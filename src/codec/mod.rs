//! Delimited text codec for the CAMs data files.
//!
//! Each data file holds one header line followed by one record per line.
//! Nested collections are flattened into a single column using three
//! delimiter tiers:
//!
//! | Tier | Delimiter | Example |
//! |------|-----------|---------|
//! | field | `,` | `Alice,alice@e.ntu.edu.sg,SCSE,...` |
//! | list item | `\|` | `Camp A\|Camp B` |
//! | map entry / key-value | `*` / `=` | `Camp A=1\|2*Camp B=3` |
//!
//! `#NULL!` stands for an empty collection or an absent optional value.
//! Delimiters are never escaped: values containing them are rejected when
//! encoding.

mod error;
mod fields;
mod record;
mod schema;

#[cfg(test)]
mod fields_test;

pub use error::{EncodeError, FieldError, FormatError, FormatErrorKind, ValueError};
pub use fields::{
    check_user_id, check_value, decode_bool, decode_date, decode_email, decode_id_list, decode_list, decode_map,
    decode_optional, decode_uint, encode_date, encode_id_list, encode_list, encode_map,
    encode_optional,
};
pub(crate) use fields::{KEY_RESERVED, SCALAR_RESERVED};
pub use record::{Decoded, Row, RowWriter, Schema, decode_records, encode_records, header};
pub use schema::{
    CampSchema, CommitteeSchema, EnquirySchema, StaffSchema, StudentSchema, SuggestionSchema,
};

pub const FIELD_SEP: char = ',';
pub const LIST_SEP: char = '|';
pub const ENTRY_SEP: char = '*';
pub const KEY_VALUE_SEP: char = '=';

/// Sentinel for an empty collection. Never a legal data value.
pub const EMPTY: &str = "#NULL!";
