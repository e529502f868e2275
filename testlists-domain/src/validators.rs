//! Pure per-field checks.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use testlists_types::defect::{NotesIssue, UrlIssue};
use testlists_types::notes::{Notes, NotesParseError};

/// Characters never allowed in url, notes, or source columns.
pub const FORBIDDEN_CHARS: [char; 4] = ['\r', '\n', '\t', '\\'];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Absolute http(s) url on a dotted hostname or IPv4 address, optional
    // port, then nothing, a bare `/`, or a `/`/`?` followed by non-space.
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\Ahttps?://",
            r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)",
            r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
            r"(?::\d+)?",
            r"(?:/?|[/?]\S+)\n?\z",
        ))
        .expect("valid url regex")
    })
}

pub fn has_forbidden_chars(s: &str) -> bool {
    s.contains(FORBIDDEN_CHARS)
}

/// Forbidden-character check for the notes column.
///
/// Structured notes are judged on their decoded strings, so JSON escapes
/// such as `\u00e8` or `\"` are allowed while raw line breaks and tabs are not.
pub fn notes_have_forbidden_chars(raw: &str) -> bool {
    match Notes::parse(raw) {
        Ok(notes @ Notes::Structured(_)) => {
            raw.contains(['\r', '\n', '\t'])
                || notes.strings().into_iter().any(has_forbidden_chars)
        }
        _ => has_forbidden_chars(raw),
    }
}

/// Classify a url. Checks run in priority order and the first hit wins.
pub fn check_url(url: &str) -> Option<UrlIssue> {
    if !url_regex().is_match(url) {
        Some(UrlIssue::PatternMismatch)
    } else if has_forbidden_chars(url) {
        Some(UrlIssue::ForbiddenCharacters)
    } else if url != url.trim() {
        Some(UrlIssue::StrayWhitespace)
    } else if path_start(url).is_none() {
        Some(UrlIssue::MissingPath)
    } else {
        None
    }
}

/// Byte offset where the authority ends, and whether a `/` path follows.
fn authority_end(url: &str) -> Option<(usize, bool)> {
    let start = url.find("://")? + 3;
    let rest = &url[start..];
    match rest.find(['/', '?', '#']) {
        Some(i) => Some((start + i, rest[i..].starts_with('/'))),
        None => Some((url.len(), false)),
    }
}

fn path_start(url: &str) -> Option<usize> {
    match authority_end(url) {
        Some((at, true)) => Some(at),
        Some((_, false)) => None,
        // Not an authority-style url; nothing to repair.
        None => Some(0),
    }
}

/// Give a url with an empty path the root path `/`, placed right after the
/// authority so any query or fragment stays intact.
pub fn insert_root_path(url: &str) -> String {
    match authority_end(url) {
        Some((at, false)) => {
            let mut fixed = String::with_capacity(url.len() + 1);
            fixed.push_str(&url[..at]);
            fixed.push('/');
            fixed.push_str(&url[at..]);
            fixed
        }
        _ => url.to_string(),
    }
}

/// `YYYY-MM-DD` that survives a parse/format round trip unchanged.
pub fn check_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|d| d.format(DATE_FORMAT).to_string() == s)
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesVerdict {
    /// Keep the column as is.
    Valid,
    /// Replace the column with this structured form.
    Normalized(String),
    Invalid { issue: NotesIssue, detail: String },
}

pub fn check_notes(raw: &str, fix_notes: bool) -> NotesVerdict {
    match Notes::parse(raw) {
        Ok(Notes::PlainText(text)) if fix_notes => {
            NotesVerdict::Normalized(Notes::structured_from_text(&text).to_field())
        }
        Ok(_) => NotesVerdict::Valid,
        Err(err) => {
            let issue = match err {
                NotesParseError::Malformed { .. } => NotesIssue::MalformedStructure,
                NotesParseError::UnknownKey { .. } => NotesIssue::UnknownKey,
            };
            NotesVerdict::Invalid {
                issue,
                detail: err.to_string(),
            }
        }
    }
}
