#![no_main]

//! Fuzz target for report JSON parsing.

use libfuzzer_sys::fuzz_target;
use testlists_types::defect::Defect;
use testlists_types::report::LintReport;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let _ = serde_json::from_str::<Defect>(s);

    if let Ok(report) = serde_json::from_str::<LintReport>(s) {
        let json = serde_json::to_string(&report).expect("serialize parsed report");
        let _ = serde_json::from_str::<LintReport>(&json).expect("reparse report");
    }
});
