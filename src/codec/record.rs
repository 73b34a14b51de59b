//! Record-level encoding: one entity per delimited line.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::error::{EncodeError, FieldError, FormatError, FormatErrorKind, ValueError};
use super::fields::{self, ITEM_RESERVED, SCALAR_RESERVED};
use super::FIELD_SEP;
use crate::db::SuggestionStatus;

/// Fixed positional layout of one data file.
pub trait Schema {
    type Entity;

    /// File name inside the data directory.
    const FILE_NAME: &'static str;

    /// Column holding the record's ID.
    const KEY_COLUMN: &'static str;

    /// Column names, in file order. Also written as the header line.
    const COLUMNS: &'static [&'static str];

    fn decode(row: &Row<'_>) -> Result<Self::Entity, FormatError>;

    fn encode(entity: &Self::Entity) -> Result<String, EncodeError>;
}

/// Header line for a schema.
pub fn header<S: Schema>() -> String {
    S::COLUMNS.join(&FIELD_SEP.to_string())
}

/// Outcome of decoding a whole file: good rows plus every bad one.
#[derive(Debug)]
pub struct Decoded<T> {
    /// Successfully decoded entities with their row numbers.
    pub records: Vec<(usize, T)>,
    pub errors: Vec<FormatError>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// Decode file content. The first line is a header and is not parsed;
/// blank lines are skipped but still counted.
pub fn decode_records<S: Schema>(content: &str) -> Decoded<S::Entity> {
    let mut decoded = Decoded::default();

    for (index, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let result = Row::parse(S::FILE_NAME, index, line, S::COLUMNS).and_then(|row| S::decode(&row));
        match result {
            Ok(entity) => decoded.records.push((index, entity)),
            Err(e) => decoded.errors.push(e),
        }
    }

    decoded
}

/// Encode entities as file content, header first, one record per line.
pub fn encode_records<'a, S, I>(entities: I) -> Result<String, EncodeError>
where
    S: Schema,
    S::Entity: 'a,
    I: IntoIterator<Item = &'a S::Entity>,
{
    let mut out = header::<S>();
    out.push('\n');
    for entity in entities {
        out.push_str(&S::encode(entity)?);
        out.push('\n');
    }
    Ok(out)
}

/// One split data line, with enough context to report errors.
pub struct Row<'a> {
    file: &'a str,
    number: usize,
    names: &'static [&'static str],
    columns: Vec<&'a str>,
}

impl<'a> Row<'a> {
    pub fn parse(
        file: &'a str,
        number: usize,
        line: &'a str,
        names: &'static [&'static str],
    ) -> Result<Self, FormatError> {
        let columns: Vec<&str> = line.split(FIELD_SEP).collect();
        if columns.len() != names.len() {
            // Name the first missing column, or the last expected one when
            // there are extras.
            let field = names
                .get(columns.len())
                .or(names.last())
                .copied()
                .unwrap_or_default();
            return Err(FormatError {
                file: file.to_string(),
                row: number,
                field: field.to_string(),
                kind: FormatErrorKind::ColumnCount {
                    expected: names.len(),
                    found: columns.len(),
                },
            });
        }
        Ok(Self {
            file,
            number,
            names,
            columns,
        })
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn text(&self, index: usize) -> String {
        self.columns[index].to_string()
    }

    pub fn uint(&self, index: usize) -> Result<u32, FormatError> {
        self.field(index, fields::decode_uint)
    }

    pub fn date(&self, index: usize) -> Result<NaiveDate, FormatError> {
        self.field(index, fields::decode_date)
    }

    pub fn flag(&self, index: usize) -> Result<bool, FormatError> {
        self.field(index, fields::decode_bool)
    }

    pub fn status(&self, index: usize) -> Result<SuggestionStatus, FormatError> {
        self.field(index, |s| {
            s.parse()
                .map_err(|_| FieldError::InvalidStatus(s.to_string()))
        })
    }

    pub fn email(&self, index: usize) -> Result<(String, String), FormatError> {
        self.field(index, fields::decode_email)
    }

    pub fn list(&self, index: usize) -> Vec<String> {
        fields::decode_list(self.columns[index])
    }

    pub fn set(&self, index: usize) -> BTreeSet<String> {
        self.list(index).into_iter().collect()
    }

    pub fn ids(&self, index: usize) -> Result<Vec<u32>, FormatError> {
        self.field(index, fields::decode_id_list)
    }

    pub fn id_set(&self, index: usize) -> Result<BTreeSet<u32>, FormatError> {
        Ok(self.ids(index)?.into_iter().collect())
    }

    pub fn map(&self, index: usize) -> Result<BTreeMap<String, Vec<u32>>, FormatError> {
        self.field(index, fields::decode_map)
    }

    pub fn optional(&self, index: usize) -> Option<String> {
        fields::decode_optional(self.columns[index])
    }

    fn field<T>(
        &self,
        index: usize,
        parse: impl FnOnce(&str) -> Result<T, FieldError>,
    ) -> Result<T, FormatError> {
        parse(self.columns[index]).map_err(|e| FormatError {
            file: self.file.to_string(),
            row: self.number,
            field: self.names[index].to_string(),
            kind: e.into(),
        })
    }
}

/// Builds one record, validating each raw value as it is appended.
pub struct RowWriter {
    entity: &'static str,
    id: String,
    columns: Vec<String>,
}

impl RowWriter {
    pub fn new(entity: &'static str, id: impl ToString) -> Self {
        Self {
            entity,
            id: id.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn text(self, field: &str, value: &str) -> Result<Self, EncodeError> {
        let checked = fields::check_value(value, SCALAR_RESERVED).map(|_| value.to_string());
        self.push(field, checked)
    }

    pub fn display(mut self, value: impl ToString) -> Self {
        self.columns.push(value.to_string());
        self
    }

    pub fn date(self, value: NaiveDate) -> Self {
        self.display(fields::encode_date(value))
    }

    pub fn list<S: AsRef<str>>(self, field: &str, items: &[S]) -> Result<Self, EncodeError> {
        let encoded = fields::encode_list(items);
        self.push(field, encoded)
    }

    pub fn set<'s>(
        self,
        field: &str,
        items: impl IntoIterator<Item = &'s String>,
    ) -> Result<Self, EncodeError> {
        let items: Vec<&str> = items.into_iter().map(String::as_str).collect();
        self.list(field, &items)
    }

    pub fn ids<'i>(self, items: impl IntoIterator<Item = &'i u32>) -> Self {
        let ids: Vec<u32> = items.into_iter().copied().collect();
        self.display(fields::encode_id_list(&ids))
    }

    pub fn map(self, field: &str, map: &BTreeMap<String, Vec<u32>>) -> Result<Self, EncodeError> {
        let encoded = fields::encode_map(map);
        self.push(field, encoded)
    }

    pub fn optional(self, field: &str, value: Option<&str>) -> Result<Self, EncodeError> {
        let encoded = fields::encode_optional(value);
        self.push(field, encoded)
    }

    /// Camp IDs and user IDs end up as list items elsewhere, so they are
    /// held to the stricter item rules even in their own column.
    pub fn key(self, field: &str, value: &str) -> Result<Self, EncodeError> {
        let checked = fields::check_value(value, ITEM_RESERVED).map(|_| value.to_string());
        self.push(field, checked)
    }

    /// Write `id@domain`, refusing IDs the decoder would split differently.
    pub fn email(self, field: &str, id: &str, domain: &str) -> Result<Self, EncodeError> {
        let checked = fields::check_user_id(id)
            .and_then(|_| fields::check_value(domain, SCALAR_RESERVED))
            .map(|_| format!("{}@{}", id, domain));
        self.push(field, checked)
    }

    pub fn finish(self) -> String {
        self.columns.join(&FIELD_SEP.to_string())
    }

    fn push(mut self, field: &str, value: Result<String, ValueError>) -> Result<Self, EncodeError> {
        match value {
            Ok(v) => {
                self.columns.push(v);
                Ok(self)
            }
            Err(source) => Err(EncodeError::ReservedValue {
                entity: self.entity.to_string(),
                id: self.id,
                field: field.to_string(),
                source,
            }),
        }
    }
}
