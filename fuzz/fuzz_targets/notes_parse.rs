#![no_main]

//! Fuzz target for the notes column: parse, promote, re-parse.

use libfuzzer_sys::fuzz_target;
use testlists_domain::{NotesVerdict, check_notes};
use testlists_types::notes::Notes;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    let _ = Notes::parse(raw);

    if let NotesVerdict::Normalized(field) = check_notes(raw, true) {
        let reparsed = Notes::parse(&field).expect("promoted notes must parse");
        assert_eq!(reparsed.text(), Some(raw));
        assert!(field.is_ascii());
    }
});
