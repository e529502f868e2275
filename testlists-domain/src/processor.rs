use crate::validators::{
    NotesVerdict, check_date, check_notes, check_url, has_forbidden_chars, insert_root_path,
    notes_have_forbidden_chars,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use testlists_inputs::{CategoryTable, GlobalIndex};
use testlists_types::defect::{Defect, DefectKind, NotesIssue, UrlIssue};
use testlists_types::files::GLOBAL_FILE;
use testlists_types::record::ListRecord;
use tracing::debug;

/// Which in-place repairs are enabled for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairOptions {
    pub fix_duplicates: bool,
    pub fix_slash: bool,
    pub fix_notes: bool,
}

impl RepairOptions {
    pub fn any(&self) -> bool {
        self.fix_duplicates || self.fix_slash || self.fix_notes
    }

    /// Names of the enabled repairs, for reports.
    pub fn labels(&self) -> Vec<String> {
        [
            (self.fix_duplicates, "duplicates"),
            (self.fix_slash, "slash"),
            (self.fix_notes, "notes"),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| name.to_string())
        .collect()
    }
}

/// Read-only inputs shared by every file of a run.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pub categories: &'a CategoryTable,
    pub global: &'a GlobalIndex,
    /// File name of the aggregate list, which is exempt from the global
    /// duplicate check.
    pub global_file_name: &'a str,
    pub repair: RepairOptions,
}

impl<'a> ProcessContext<'a> {
    pub fn new(
        categories: &'a CategoryTable,
        global: &'a GlobalIndex,
        repair: RepairOptions,
    ) -> Self {
        Self {
            categories,
            global,
            global_file_name: GLOBAL_FILE,
            repair,
        }
    }
}

/// Everything learned from one list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedList {
    pub path: Utf8PathBuf,
    /// Data rows read, excluding the header.
    pub rows_read: u64,
    pub defects: Vec<Defect>,
    /// Surviving, possibly repaired, rows in input order.
    pub rows: Vec<ListRecord>,
}

/// Sequential linter for a single list file.
///
/// Rows must be fed in file order: duplicate detection depends on the rows
/// already accepted.
pub struct RowProcessor<'a> {
    ctx: ProcessContext<'a>,
    path: Utf8PathBuf,
    is_global: bool,
    seen: HashSet<String>,
    defects: Vec<Defect>,
    rows: Vec<ListRecord>,
    rows_read: u64,
}

impl<'a> RowProcessor<'a> {
    pub fn new(path: &Utf8Path, ctx: ProcessContext<'a>) -> Self {
        let is_global = path.file_name() == Some(ctx.global_file_name);
        Self {
            ctx,
            path: path.to_path_buf(),
            is_global,
            seen: HashSet::new(),
            defects: Vec::new(),
            rows: Vec::new(),
            rows_read: 0,
        }
    }

    /// Record that the first line is not the canonical header.
    pub fn invalid_header(&mut self, line: u64) {
        self.push(Defect::new(DefectKind::InvalidHeader, self.path.clone(), line));
    }

    pub fn process_row<S: AsRef<str>>(&mut self, line: u64, fields: &[S]) {
        self.rows_read += 1;
        let repair = self.ctx.repair;

        let Some(mut record) = ListRecord::from_fields(fields) else {
            self.push(Defect::new(DefectKind::InvalidColumnNumber, self.path.clone(), line));
            return;
        };
        let original_notes = record.notes.clone();

        if let Some(reason) = check_url(&record.url) {
            self.push(
                self.defect(DefectKind::InvalidUrl { reason }, line)
                    .with_value(record.url.clone())
                    .with_detail(reason.describe()),
            );
            if reason == UrlIssue::MissingPath && repair.fix_slash {
                record.url = insert_root_path(&record.url);
            }
        }

        match check_notes(&record.notes, repair.fix_notes) {
            NotesVerdict::Valid => {}
            NotesVerdict::Normalized(notes) => record.notes = notes,
            NotesVerdict::Invalid { issue, detail } => self.push(
                self.defect(DefectKind::InvalidNotes { reason: issue }, line)
                    .with_value(record.notes.clone())
                    .with_detail(detail),
            ),
        }

        if !self.is_global && self.ctx.global.contains(&record.url) {
            self.push(
                self.defect(DefectKind::DuplicateUrlWithGlobalList, line)
                    .with_value(record.url.clone()),
            );
            if repair.fix_duplicates {
                debug!(path = %self.path, line, url = %record.url, "dropping url already in global list");
                return;
            }
        }

        match self.ctx.categories.description(&record.category_code) {
            None => self.push(
                self.defect(DefectKind::InvalidCategoryCode, line)
                    .with_value(record.category_code.clone()),
            ),
            Some(expected) if expected != record.category_description => {
                let detail = format!("expected \"{expected}\"");
                self.push(
                    self.defect(DefectKind::InvalidCategoryDesc, line)
                        .with_value(record.category_description.clone())
                        .with_detail(detail),
                );
            }
            Some(_) => {}
        }

        if self.seen.contains(&record.url) {
            if !repair.fix_duplicates {
                self.push(
                    self.defect(DefectKind::DuplicateUrl, line)
                        .with_value(record.url.clone()),
                );
            }
            debug!(path = %self.path, line, url = %record.url, "dropping repeated url");
            return;
        }

        if !check_date(&record.date_added) {
            self.push(
                self.defect(DefectKind::InvalidDate, line)
                    .with_value(record.date_added.clone()),
            );
        }
        if notes_have_forbidden_chars(&original_notes) {
            self.push(
                self.defect(
                    DefectKind::InvalidNotes {
                        reason: NotesIssue::ForbiddenCharacters,
                    },
                    line,
                )
                .with_value(original_notes),
            );
        }
        if has_forbidden_chars(&record.source) {
            self.push(
                self.defect(DefectKind::InvalidSource, line)
                    .with_value(record.source.clone()),
            );
        }

        self.seen.insert(record.url.clone());
        self.rows.push(record);
    }

    pub fn finish(self) -> ProcessedList {
        ProcessedList {
            path: self.path,
            rows_read: self.rows_read,
            defects: self.defects,
            rows: self.rows,
        }
    }

    fn defect(&self, kind: DefectKind, line: u64) -> Defect {
        Defect::new(kind, self.path.clone(), line)
    }

    fn push(&mut self, defect: Defect) {
        debug!(path = %defect.path, line = defect.line, kind = defect.kind.code(), "defect");
        self.defects.push(defect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn categories() -> CategoryTable {
        CategoryTable::from_pairs([("GMB", "Gambling"), ("NEWS", "News Media")])
    }

    fn run(
        path: &str,
        global: &GlobalIndex,
        repair: RepairOptions,
        rows: &[&[&str]],
    ) -> ProcessedList {
        let cats = categories();
        let ctx = ProcessContext::new(&cats, global, repair);
        let mut p = RowProcessor::new(Utf8Path::new(path), ctx);
        for (i, row) in rows.iter().enumerate() {
            p.process_row(i as u64 + 2, *row);
        }
        p.finish()
    }

    fn kinds(list: &ProcessedList) -> Vec<&'static str> {
        list.defects.iter().map(|d| d.kind.code()).collect()
    }

    #[test]
    fn clean_row_has_no_defects() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions::default(),
            &[&["http://example.com/", "GMB", "Gambling", "2020-01-01", "Src", "hello"]],
        );
        assert!(out.defects.is_empty());
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows_read, 1);
    }

    #[test]
    fn wrong_column_count_drops_row() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions {
                fix_duplicates: true,
                ..Default::default()
            },
            &[&["http://example.com/", "GMB", "Gambling", "2020-01-01", "Src"]],
        );
        assert_eq!(kinds(&out), vec!["invalid_column_number"]);
        assert!(out.rows.is_empty());
        assert_eq!(out.defects[0].value, None);
    }

    #[test]
    fn unknown_code_skips_description_check() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions::default(),
            &[&["http://example.com/", "XXX", "Whatever", "2020-01-01", "", ""]],
        );
        assert_eq!(kinds(&out), vec!["invalid_category_code"]);
        assert_eq!(out.defects[0].value.as_deref(), Some("XXX"));
    }

    #[test]
    fn global_duplicates_are_reported_outside_global_file() {
        let global = GlobalIndex::from_urls(["http://example.com/"]);
        let row: &[&str] = &["http://example.com/", "GMB", "Gambling", "2020-01-01", "", ""];

        let local = run("lists/it.csv", &global, RepairOptions::default(), &[row]);
        assert_eq!(kinds(&local), vec!["duplicate_url_with_global_list"]);
        assert_eq!(local.rows.len(), 1);

        let own = run("lists/global.csv", &global, RepairOptions::default(), &[row]);
        assert!(own.defects.is_empty());
    }

    #[test]
    fn global_duplicate_with_fix_is_dropped_before_other_checks() {
        let global = GlobalIndex::from_urls(["http://example.com/"]);
        let out = run(
            "lists/it.csv",
            &global,
            RepairOptions {
                fix_duplicates: true,
                ..Default::default()
            },
            &[
                &["http://example.com/", "BAD", "Gambling", "nope", "", ""],
                &["http://example.com/", "GMB", "Gambling", "2020-01-01", "", ""],
            ],
        );
        assert_eq!(
            kinds(&out),
            vec!["duplicate_url_with_global_list", "duplicate_url_with_global_list"]
        );
        assert!(out.rows.is_empty());
    }

    #[test]
    fn slash_fix_rewrites_url_and_keeps_defect() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions {
                fix_slash: true,
                ..Default::default()
            },
            &[&["http://example.com", "GMB", "Gambling", "2020-01-01", "", ""]],
        );
        assert_eq!(kinds(&out), vec!["invalid_url"]);
        assert_eq!(out.defects[0].detail.as_deref(), Some("No trailing slash"));
        assert_eq!(out.rows[0].url, "http://example.com/");
    }

    #[test]
    fn slash_fix_makes_repaired_urls_collide() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions {
                fix_slash: true,
                fix_duplicates: true,
                ..Default::default()
            },
            &[
                &["http://example.com/", "GMB", "Gambling", "2020-01-01", "", ""],
                &["http://example.com", "GMB", "Gambling", "2020-01-01", "", ""],
            ],
        );
        assert_eq!(out.rows.len(), 1);
        assert_eq!(kinds(&out), vec!["invalid_url"]);
    }

    #[test]
    fn notes_and_source_forbidden_chars() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions::default(),
            &[&["http://example.com/", "GMB", "Gambling", "2020-01-01", "a\\b", "x\ty"]],
        );
        assert_eq!(kinds(&out), vec!["invalid_notes", "invalid_source"]);
        assert_eq!(
            out.defects[0].kind,
            DefectKind::InvalidNotes {
                reason: NotesIssue::ForbiddenCharacters
            }
        );
        // Defective rows still survive; only duplicates and short rows drop.
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn notes_fix_rewrites_plain_text_only() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions {
                fix_notes: true,
                ..Default::default()
            },
            &[
                &["http://a.com/", "GMB", "Gambling", "2020-01-01", "", "plain"],
                &["http://b.com/", "GMB", "Gambling", "2020-01-01", "", r#"{"notes":"kept"}"#],
                &["http://c.com/", "GMB", "Gambling", "2020-01-01", "", r#"{"bad": 1}"#],
            ],
        );
        assert_eq!(out.rows[0].notes, r#"{"notes": "plain"}"#);
        assert_eq!(out.rows[1].notes, r#"{"notes":"kept"}"#);
        assert_eq!(out.rows[2].notes, r#"{"bad": 1}"#);
        assert_eq!(kinds(&out), vec!["invalid_notes"]);
        assert_eq!(out.defects[0].line, 4);
    }

    #[test]
    fn bad_dates_are_reported_on_their_line() {
        let out = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions::default(),
            &[
                &["http://a.com/", "GMB", "Gambling", "2020-01-01", "", ""],
                &["http://b.com/", "GMB", "Gambling", "2020-13-40", "", ""],
                &["http://c.com/", "GMB", "Gambling", "2020-1-1", "", ""],
            ],
        );
        assert_eq!(kinds(&out), vec!["invalid_date", "invalid_date"]);
        assert_eq!(out.defects[0].line, 3);
        assert_eq!(out.defects[0].value.as_deref(), Some("2020-13-40"));
        assert_eq!(out.defects[1].line, 4);
        assert_eq!(out.defects[1].value.as_deref(), Some("2020-1-1"));
        assert_eq!(out.rows.len(), 3);
    }

    #[test]
    fn promoted_non_ascii_notes_lint_clean_afterwards() {
        let row: &[&str] = &[
            "http://example.com/",
            "GMB",
            "Gambling",
            "2020-01-01",
            "Src",
            "Scommesse caff\u{e8} \"live\"",
        ];
        let fixed = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions {
                fix_notes: true,
                ..Default::default()
            },
            &[row],
        );
        assert!(fixed.defects.is_empty());
        assert_eq!(
            fixed.rows[0].notes,
            r#"{"notes": "Scommesse caff\u00e8 \"live\""}"#
        );

        let fields = fixed.rows[0].to_fields();
        let again = run(
            "lists/it.csv",
            &GlobalIndex::default(),
            RepairOptions::default(),
            &[&fields[..]],
        );
        assert!(again.defects.is_empty(), "{:?}", again.defects);
    }

    #[test]
    fn header_defect_is_recorded() {
        let cats = categories();
        let global = GlobalIndex::default();
        let mut p = RowProcessor::new(
            Utf8Path::new("lists/it.csv"),
            ProcessContext::new(&cats, &global, RepairOptions::default()),
        );
        p.invalid_header(1);
        let out = p.finish();
        assert_eq!(kinds(&out), vec!["invalid_header"]);
        assert_eq!(out.rows_read, 0);
    }

    #[test]
    fn repair_labels() {
        let all = RepairOptions {
            fix_duplicates: true,
            fix_slash: true,
            fix_notes: true,
        };
        assert!(all.any());
        assert_eq!(all.labels(), vec!["duplicates", "slash", "notes"]);
        assert!(!RepairOptions::default().any());
        assert!(RepairOptions::default().labels().is_empty());
    }
}
