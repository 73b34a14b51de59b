//! Field-level encoding for nested collections.
//!
//! Lists join items with `|`. Maps join entries with `*` and split each
//! entry into key and value with `=`, the value being an integer list.
//! An empty collection is written as the sentinel.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;

use super::error::{FieldError, ValueError};
use super::{EMPTY, ENTRY_SEP, FIELD_SEP, KEY_VALUE_SEP, LIST_SEP};

/// Characters that may not appear in a plain column.
pub(crate) const SCALAR_RESERVED: &[char] = &[FIELD_SEP, '\n', '\r'];

/// Characters that may not appear in a list item.
pub(crate) const ITEM_RESERVED: &[char] = &[FIELD_SEP, LIST_SEP, '\n', '\r'];

/// Characters that may not appear in a map key.
pub(crate) const KEY_RESERVED: &[char] = &[FIELD_SEP, LIST_SEP, ENTRY_SEP, KEY_VALUE_SEP, '\n', '\r'];

/// Characters that may not appear in a user ID. The ID is the local part of
/// the stored e-mail, so `@` would move the split point.
pub(crate) const USER_ID_RESERVED: &[char] = &[FIELD_SEP, LIST_SEP, '@', '\n', '\r'];

/// Reject values that would change meaning once written.
pub fn check_value(value: &str, reserved: &[char]) -> Result<(), ValueError> {
    if value == EMPTY {
        return Err(ValueError::Sentinel);
    }
    match value.chars().find(|c| reserved.contains(c)) {
        Some(delimiter) => Err(ValueError::Delimiter {
            value: value.to_string(),
            delimiter,
        }),
        None => Ok(()),
    }
}

pub fn encode_list<S: AsRef<str>>(items: &[S]) -> Result<String, ValueError> {
    if items.is_empty() {
        return Ok(EMPTY.to_string());
    }
    for item in items {
        check_value(item.as_ref(), ITEM_RESERVED)?;
    }
    let parts: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    Ok(parts.join(&LIST_SEP.to_string()))
}

pub fn decode_list(field: &str) -> Vec<String> {
    if field == EMPTY {
        return Vec::new();
    }
    field.split(LIST_SEP).map(str::to_string).collect()
}

pub fn encode_id_list(ids: &[u32]) -> String {
    if ids.is_empty() {
        return EMPTY.to_string();
    }
    join_ids(ids)
}

pub fn decode_id_list(field: &str) -> Result<Vec<u32>, FieldError> {
    if field == EMPTY {
        return Ok(Vec::new());
    }
    split_ids(field)
}

/// Encode a mapping from string to integer list, e.g. `A=1|2*B=3`.
pub fn encode_map(map: &BTreeMap<String, Vec<u32>>) -> Result<String, ValueError> {
    if map.is_empty() {
        return Ok(EMPTY.to_string());
    }
    let mut entries = Vec::with_capacity(map.len());
    for (key, ids) in map {
        check_value(key, KEY_RESERVED)?;
        entries.push(format!("{}{}{}", key, KEY_VALUE_SEP, join_ids(ids)));
    }
    Ok(entries.join(&ENTRY_SEP.to_string()))
}

pub fn decode_map(field: &str) -> Result<BTreeMap<String, Vec<u32>>, FieldError> {
    let mut map: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    if field == EMPTY {
        return Ok(map);
    }
    for entry in field.split(ENTRY_SEP) {
        let (key, value) = entry
            .split_once(KEY_VALUE_SEP)
            .ok_or_else(|| FieldError::MalformedMapEntry(entry.to_string()))?;
        let ids = if value.is_empty() {
            Vec::new()
        } else {
            split_ids(value)?
        };
        map.entry(key.to_string()).or_default().extend(ids);
    }
    Ok(map)
}

/// Absent values share the empty-collection sentinel.
pub fn encode_optional(value: Option<&str>) -> Result<String, ValueError> {
    match value {
        Some(v) => {
            check_value(v, SCALAR_RESERVED)?;
            Ok(v.to_string())
        }
        None => Ok(EMPTY.to_string()),
    }
}

pub fn decode_optional(field: &str) -> Option<String> {
    (field != EMPTY).then(|| field.to_string())
}

pub fn decode_uint(field: &str) -> Result<u32, FieldError> {
    u32::from_str(field).map_err(|_| FieldError::InvalidInteger(field.to_string()))
}

pub fn decode_date(field: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(field, "%Y-%m-%d")
        .map_err(|_| FieldError::InvalidDate(field.to_string()))
}

pub fn encode_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn decode_bool(field: &str) -> Result<bool, FieldError> {
    match field {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(FieldError::InvalidBool(field.to_string())),
    }
}

/// Reject user IDs that would not survive the e-mail column.
pub fn check_user_id(id: &str) -> Result<(), ValueError> {
    if id.is_empty() {
        return Err(ValueError::Empty);
    }
    check_value(id, USER_ID_RESERVED)
}

/// Split `user@domain` into its two halves.
pub fn decode_email(field: &str) -> Result<(String, String), FieldError> {
    match field.split_once('@') {
        Some((id, domain)) if !id.is_empty() => Ok((id.to_string(), domain.to_string())),
        _ => Err(FieldError::InvalidEmail(field.to_string())),
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(&LIST_SEP.to_string())
}

fn split_ids(field: &str) -> Result<Vec<u32>, FieldError> {
    field.split(LIST_SEP).map(decode_uint).collect()
}
