#![no_main]

//! Fuzz target for url classification and root-path repair.

use libfuzzer_sys::fuzz_target;
use testlists_domain::{check_url, insert_root_path};
use testlists_types::defect::UrlIssue;

fuzz_target!(|data: &[u8]| {
    let Ok(url) = std::str::from_utf8(data) else {
        return;
    };

    if check_url(url) == Some(UrlIssue::MissingPath) {
        // A repaired url must never still be missing its path.
        let fixed = insert_root_path(url);
        assert_ne!(check_url(&fixed), Some(UrlIssue::MissingPath), "{fixed:?}");
    }
});
