//! The notes column: either free text or a JSON object with known keys.

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;
use thiserror::Error;

/// Keys allowed inside structured notes.
pub const RECOGNIZED_NOTES_KEYS: &[&str] = &["notes"];

/// Key used when free text is promoted to structured notes.
pub const NOTES_TEXT_KEY: &str = "notes";

#[derive(Debug, Clone, PartialEq)]
pub enum Notes {
    PlainText(String),
    Structured(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotesParseError {
    #[error("malformed notes object: {message}")]
    Malformed { message: String },

    #[error("invalid notes key {key}")]
    UnknownKey { key: String },
}

impl Notes {
    /// Parse a raw notes column.
    ///
    /// Text starting with `{` must be a JSON object whose keys are all in
    /// [`RECOGNIZED_NOTES_KEYS`]. Anything else is free text.
    pub fn parse(raw: &str) -> Result<Self, NotesParseError> {
        if !raw.starts_with('{') {
            return Ok(Notes::PlainText(raw.to_string()));
        }

        let map: Map<String, Value> =
            serde_json::from_str(raw).map_err(|e| NotesParseError::Malformed {
                message: e.to_string(),
            })?;

        if let Some(key) = map
            .keys()
            .find(|k| !RECOGNIZED_NOTES_KEYS.contains(&k.as_str()))
        {
            return Err(NotesParseError::UnknownKey { key: key.clone() });
        }

        Ok(Notes::Structured(map))
    }

    /// Promote free text to a single-key structured object.
    pub fn structured_from_text(text: &str) -> Self {
        let mut map = Map::new();
        map.insert(NOTES_TEXT_KEY.to_string(), Value::String(text.to_string()));
        Notes::Structured(map)
    }

    /// Render back to the column representation.
    ///
    /// Structured notes use `{"key": value}` spacing and ASCII-only escapes,
    /// matching the form already present in published lists.
    pub fn to_field(&self) -> String {
        match self {
            Notes::PlainText(text) => text.clone(),
            Notes::Structured(map) => {
                let mut ser = serde_json::Serializer::with_formatter(Vec::new(), ListJsonFormatter);
                map.serialize(&mut ser).expect("string-keyed map serializes into a Vec");
                String::from_utf8(ser.into_inner()).expect("formatter emits ascii")
            }
        }
    }

    /// Every string carried by these notes, with JSON escapes decoded.
    pub fn strings(&self) -> Vec<&str> {
        fn collect<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
            match value {
                Value::String(s) => out.push(s),
                Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
                Value::Object(map) => map.values().for_each(|v| collect(v, out)),
                _ => {}
            }
        }

        match self {
            Notes::PlainText(text) => vec![text.as_str()],
            Notes::Structured(map) => {
                let mut out = Vec::new();
                map.values().for_each(|v| collect(v, &mut out));
                out
            }
        }
    }

    /// The free text carried by these notes, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Notes::PlainText(text) => Some(text),
            Notes::Structured(map) => map.get(NOTES_TEXT_KEY).and_then(Value::as_str),
        }
    }
}

/// `", "` / `": "` separators with non-ASCII escaped as `\uXXXX`.
struct ListJsonFormatter;

impl Formatter for ListJsonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    writer.write_all(format!("\\u{:04x}", unit).as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_not_parsed() {
        assert_eq!(
            Notes::parse("hello").unwrap(),
            Notes::PlainText("hello".to_string())
        );
        assert_eq!(Notes::parse("").unwrap(), Notes::PlainText(String::new()));
    }

    #[test]
    fn structured_with_known_key_parses() {
        let notes = Notes::parse(r#"{"notes": "blocked in 2019"}"#).unwrap();
        assert_eq!(notes.text(), Some("blocked in 2019"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Notes::parse(r#"{"notes": "x", "extra": 1}"#).unwrap_err();
        assert_eq!(
            err,
            NotesParseError::UnknownKey {
                key: "extra".to_string()
            }
        );
        assert_eq!(err.to_string(), "invalid notes key extra");
    }

    #[test]
    fn broken_json_is_malformed() {
        assert!(matches!(
            Notes::parse("{not json"),
            Err(NotesParseError::Malformed { .. })
        ));
        assert!(matches!(
            Notes::parse(r#"{"notes": "x"} trailing"#),
            Err(NotesParseError::Malformed { .. })
        ));
    }

    #[test]
    fn promoted_text_renders_with_spacing() {
        let notes = Notes::structured_from_text("hello");
        assert_eq!(notes.to_field(), r#"{"notes": "hello"}"#);
    }

    #[test]
    fn promoted_text_escapes_non_ascii_and_controls() {
        let notes = Notes::structured_from_text("caf\u{e9}\n\u{1F600}");
        assert_eq!(
            notes.to_field(),
            r#"{"notes": "caf\u00e9\n\ud83d\ude00"}"#
        );
        let reparsed = Notes::parse(&notes.to_field()).unwrap();
        assert_eq!(reparsed.text(), Some("caf\u{e9}\n\u{1F600}"));
    }

    #[test]
    fn structured_values_render_in_full() {
        let notes = Notes::parse(r#"{"notes":["a",1,null,{"notes":"\u00e8"}]}"#).unwrap();
        assert_eq!(
            notes.to_field(),
            r#"{"notes": ["a", 1, null, {"notes": "\u00e8"}]}"#
        );
    }

    #[test]
    fn strings_are_decoded_leaves() {
        let notes = Notes::parse(r#"{"notes": ["a\\b", {"notes": "caf\u00e9"}, 3]}"#).unwrap();
        assert_eq!(notes.strings(), vec!["a\\b", "caf\u{e9}"]);
        assert_eq!(Notes::PlainText("x".into()).strings(), vec!["x"]);
    }
}
