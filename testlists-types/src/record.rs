use crate::notes::{Notes, NotesParseError};
use serde::{Deserialize, Serialize};

/// Canonical header every list file must start with.
pub const LIST_HEADER: [&str; 6] = [
    "url",
    "category_code",
    "category_description",
    "date_added",
    "source",
    "notes",
];

/// Number of columns in a list row.
pub const LIST_COLUMNS: usize = LIST_HEADER.len();

/// One data row of a list file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRecord {
    pub url: String,
    pub category_code: String,
    pub category_description: String,
    pub date_added: String,
    pub source: String,
    /// Raw notes column; see [`ListRecord::notes`] for the parsed view.
    pub notes: String,
}

impl ListRecord {
    /// Build a record from exactly six fields, in header order.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        let [url, code, desc, date, source, notes] = fields else {
            return None;
        };
        Some(Self {
            url: url.as_ref().to_string(),
            category_code: code.as_ref().to_string(),
            category_description: desc.as_ref().to_string(),
            date_added: date.as_ref().to_string(),
            source: source.as_ref().to_string(),
            notes: notes.as_ref().to_string(),
        })
    }

    pub fn to_fields(&self) -> [&str; LIST_COLUMNS] {
        [
            &self.url,
            &self.category_code,
            &self.category_description,
            &self.date_added,
            &self.source,
            &self.notes,
        ]
    }

    pub fn notes(&self) -> Result<Notes, NotesParseError> {
        Notes::parse(&self.notes)
    }
}

/// True if `fields` is exactly the canonical header.
pub fn is_canonical_header<S: AsRef<str>>(fields: &[S]) -> bool {
    fields.len() == LIST_COLUMNS
        && fields
            .iter()
            .zip(LIST_HEADER.iter())
            .all(|(got, want)| got.as_ref() == *want)
}
