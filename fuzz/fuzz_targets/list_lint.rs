#![no_main]

//! Fuzz target for whole-file linting and repair.
//!
//! Repaired output must render and lint again without panicking, and a
//! second repair pass must not change it.

use camino::Utf8Path;
use libfuzzer_sys::fuzz_target;
use testlists_core::pipeline::lint_contents;
use testlists_domain::{ProcessContext, RepairOptions};
use testlists_edit::render_list;
use testlists_inputs::{CategoryTable, GlobalIndex};

#[derive(Debug, arbitrary::Arbitrary)]
struct LintInput {
    contents: String,
    fix_duplicates: bool,
    fix_slash: bool,
    fix_notes: bool,
}

fuzz_target!(|input: LintInput| {
    let categories = CategoryTable::from_pairs([("NEWS", "News Media"), ("GMB", "Gambling")]);
    let global = GlobalIndex::from_urls(["http://global.example/"]);
    let repair = RepairOptions {
        fix_duplicates: input.fix_duplicates,
        fix_slash: input.fix_slash,
        fix_notes: input.fix_notes,
    };
    let ctx = ProcessContext::new(&categories, &global, repair);
    let path = Utf8Path::new("lists/fuzz.csv");

    let Ok(first) = lint_contents(path, &input.contents, ctx) else {
        return;
    };
    let Ok(rendered) = render_list(&first.rows) else {
        return;
    };

    let second = lint_contents(path, &rendered, ctx).expect("rendered output must parse");
    let rerendered = render_list(&second.rows).expect("re-render");
    assert_eq!(rendered, rerendered);
});
