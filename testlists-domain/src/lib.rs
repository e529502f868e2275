//! Domain logic: decide what is wrong with a list file and what the repaired
//! rows look like.
//!
//! This crate owns *what* is a defect and *which* rows survive a repair. It
//! does not read or write files; that is `testlists-core` and
//! `testlists-edit`.

mod processor;
mod validators;

pub use processor::{ProcessContext, ProcessedList, RepairOptions, RowProcessor};
pub use validators::{
    FORBIDDEN_CHARS, NotesVerdict, check_date, check_notes, check_url, has_forbidden_chars,
    insert_root_path, notes_have_forbidden_chars,
};
