//! Rendering helpers for human-readable lint output.

use testlists_types::defect::Defect;
use testlists_types::report::{FileSummary, LintReport, VerdictStatus};

/// The block printed after each file is processed.
pub fn render_file_summary(summary: &FileSummary) -> String {
    let mut out = format!(
        "* {}\n  {} URLs\n  {} Errors\n",
        summary.path, summary.rows, summary.defects
    );
    if summary.rewritten {
        out.push_str("  rewritten\n");
    }
    out
}

/// One defect line: `path (line N): Name "value" (detail)`.
pub fn render_defect(defect: &Defect) -> String {
    let mut out = format!(
        "{} (line {}): {}",
        defect.path,
        defect.line,
        defect.kind.name()
    );
    if let Some(value) = &defect.value {
        out.push_str(&format!(" \"{}\"", value));
    }
    if let Some(detail) = &defect.detail {
        out.push_str(&format!(" ({})", detail));
    }
    out
}

/// Totals, then every defect and failure in report order.
pub fn render_totals(report: &LintReport) -> String {
    let counts = &report.verdict.counts;
    let mut out = String::new();
    out.push_str("----------\n");
    out.push_str(&format!(
        "Analyzed {} URLs in {} countries\n",
        counts.rows, counts.files
    ));

    for failure in &report.failures {
        out.push_str(&format!("{}: could not be processed: {}\n", failure.path, failure.reason));
    }

    if report.verdict.status == VerdictStatus::Pass {
        out.push_str("ALL OK\n");
        return out;
    }

    out.push_str(&format!("{} errors present\n", counts.defects));
    for defect in &report.defects {
        out.push_str(&render_defect(defect));
        out.push('\n');
    }
    out
}

pub fn render_report_md(report: &LintReport) -> String {
    let counts = &report.verdict.counts;
    let mut out = String::new();
    out.push_str("# test list lint\n\n");
    out.push_str(&format!("- Status: `{}`\n", status_label(report.verdict.status)));
    out.push_str(&format!("- Files: {}\n", counts.files));
    out.push_str(&format!("- URLs: {}\n", counts.rows));
    out.push_str(&format!("- Defects: {}\n", counts.defects));
    if counts.failures > 0 {
        out.push_str(&format!("- Unreadable files: {}\n", counts.failures));
    }
    if !report.run.fixes.is_empty() {
        out.push_str(&format!("- Fixes: {}\n", report.run.fixes.join(", ")));
    }
    if report.run.dry_run {
        out.push_str("- Dry run: nothing was written\n");
    }
    out.push('\n');

    out.push_str("## Files\n\n");
    if report.files.is_empty() {
        out.push_str("_No list files found._\n\n");
    } else {
        out.push_str("| File | URLs | Defects | Rewritten |\n");
        out.push_str("|---|---:|---:|---|\n");
        for f in &report.files {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                f.path,
                f.rows,
                f.defects,
                if f.rewritten { "yes" } else { "no" }
            ));
        }
        out.push('\n');
    }

    if !report.failures.is_empty() {
        out.push_str("## Unreadable files\n\n");
        for failure in &report.failures {
            out.push_str(&format!("- `{}`: {}\n", failure.path, failure.reason));
        }
        out.push('\n');
    }

    out.push_str("## Defects\n\n");
    if report.defects.is_empty() {
        out.push_str("_No defects._\n");
        return out;
    }
    for d in &report.defects {
        out.push_str(&format!("- `{}:{}` **{}**", d.path, d.line, d.kind.name()));
        if let Some(value) = &d.value {
            out.push_str(&format!(" `{}`", value.replace('`', "'")));
        }
        if let Some(detail) = &d.detail {
            out.push_str(&format!(" ({})", detail));
        }
        out.push('\n');
    }
    out
}

fn status_label(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Pass => "pass",
        VerdictStatus::Fail => "fail",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use testlists_types::defect::{DefectKind, UrlIssue};
    use testlists_types::report::{Counts, FileFailure, RunInfo, ToolInfo, Verdict};
    use testlists_types::schema;

    fn report(defects: Vec<Defect>, failures: Vec<FileFailure>) -> LintReport {
        let status = if defects.is_empty() && failures.is_empty() {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };
        LintReport {
            schema: schema::TESTLISTS_REPORT_V1.to_string(),
            tool: ToolInfo {
                name: "testlists".to_string(),
                version: None,
            },
            run: RunInfo {
                started_at: Utc::now(),
                ended_at: None,
                fixes: vec!["slash".to_string()],
                dry_run: false,
            },
            verdict: Verdict {
                status,
                counts: Counts {
                    files: 2,
                    rows: 5,
                    defects: defects.len() as u64,
                    failures: failures.len() as u64,
                },
            },
            files: vec![FileSummary {
                path: "lists/it.csv".into(),
                rows: 5,
                defects: defects.len() as u64,
                rewritten: true,
            }],
            defects,
            failures,
        }
    }

    #[test]
    fn defect_line_with_value_and_detail() {
        let d = Defect::new(
            DefectKind::InvalidUrl {
                reason: UrlIssue::MissingPath,
            },
            "lists/it.csv",
            4,
        )
        .with_value("http://example.com")
        .with_detail("No trailing slash");
        assert_eq!(
            render_defect(&d),
            "lists/it.csv (line 4): Invalid URL \"http://example.com\" (No trailing slash)"
        );
    }

    #[test]
    fn defect_line_without_value() {
        let d = Defect::new(DefectKind::InvalidColumnNumber, "lists/it.csv", 9);
        assert_eq!(render_defect(&d), "lists/it.csv (line 9): Invalid Column Number");
    }

    #[test]
    fn summary_block() {
        let s = FileSummary {
            path: "lists/it.csv".into(),
            rows: 12,
            defects: 0,
            rewritten: false,
        };
        assert_eq!(render_file_summary(&s), "* lists/it.csv\n  12 URLs\n  0 Errors\n");
    }

    #[test]
    fn totals_all_ok() {
        let out = render_totals(&report(vec![], vec![]));
        assert_eq!(out, "----------\nAnalyzed 5 URLs in 2 countries\nALL OK\n");
    }

    #[test]
    fn totals_list_defects() {
        let out = render_totals(&report(
            vec![Defect::new(DefectKind::DuplicateUrl, "lists/it.csv", 3).with_value("http://a.com/")],
            vec![],
        ));
        assert!(out.contains("1 errors present\n"));
        assert!(out.ends_with("lists/it.csv (line 3): Duplicate URL \"http://a.com/\"\n"));
    }

    #[test]
    fn markdown_mentions_failures_and_fixes() {
        let md = render_report_md(&report(
            vec![],
            vec![FileFailure {
                path: "lists/bad.csv".into(),
                reason: "invalid utf-8".to_string(),
            }],
        ));
        assert!(md.contains("- Status: `fail`"));
        assert!(md.contains("- Fixes: slash"));
        assert!(md.contains("## Unreadable files"));
        assert!(md.contains("| `lists/it.csv` | 5 | 0 | yes |"));
        assert!(md.contains("_No defects._"));
    }
}
