//! The lint pipeline, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: all filesystem operations are
//! performed through the port traits.

use crate::ports::{InputSource, ListStore, WritePort};
use crate::settings::LintSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use testlists_domain::{ProcessContext, ProcessedList, RowProcessor};
use testlists_edit::{preview_patch, render_list, sha256_hex};
use testlists_inputs::list_reader_builder;
use testlists_render::render_report_md;
use testlists_types::defect::Defect;
use testlists_types::record::is_canonical_header;
use testlists_types::report::{
    Counts, FileFailure, FileSummary, LintReport, RunInfo, ToolInfo, Verdict, VerdictStatus,
};
use testlists_types::schema::TESTLISTS_REPORT_V1;
use tracing::{debug, info, warn};

/// Fatal errors. Exit code 2; per-file problems never end up here.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("inputs: {0:#}")]
    Inputs(anyhow::Error),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// What happened to a single list file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub summary: FileSummary,
    pub defects: Vec<Defect>,
    /// Unified diff of the rewrite, computed in dry-run mode only.
    pub patch: Option<String>,
    pub failure: Option<FileFailure>,
}

/// Outcome of `run_lint`.
#[derive(Debug, Clone)]
pub struct LintOutcome {
    pub report: LintReport,
    /// Per-file outcomes in processing order. Unreadable files have no entry
    /// here; they appear in `report.failures`.
    pub files: Vec<FileOutcome>,
}

impl LintOutcome {
    pub fn is_clean(&self) -> bool {
        self.report.verdict.status == VerdictStatus::Pass
    }

    /// 0 when clean, 1 when any defect or file failure was recorded.
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() { 0 } else { 1 }
    }
}

/// Validate one list file's text. The first record must be the canonical
/// header; every following record is a data row. Empty lines count as
/// rows with no columns.
pub fn lint_contents(
    path: &Utf8Path,
    contents: &str,
    ctx: ProcessContext<'_>,
) -> anyhow::Result<ProcessedList> {
    let mut processor = RowProcessor::new(path, ctx);
    let mut reader = list_reader_builder().from_reader(contents.as_bytes());
    let mut records = reader.records();
    let mut lines = LineTracker::new(contents);
    let mut header_seen = false;

    loop {
        let from = records.reader().position().byte() as usize;
        let next = records.next();
        let (start, blank_lines) = lines.skip_line_breaks(from);
        for line in blank_lines {
            processor.process_row::<&str>(line, &[]);
        }

        let Some(record) = next else { break };
        let record = record.with_context(|| format!("parse {}", path))?;
        let line = lines.line_at(start);
        let fields: Vec<&str> = record.iter().collect();

        if header_seen {
            processor.process_row(line, &fields);
        } else {
            header_seen = true;
            if !is_canonical_header(&fields) {
                processor.invalid_header(line);
            }
        }
    }

    if !header_seen {
        processor.invalid_header(1);
    }

    Ok(processor.finish())
}

/// Physical line numbers for a list file.
///
/// The CSV reader drops empty lines and starts each record's position where
/// the previous record ended, so lines are recounted from byte offsets.
/// Offsets passed in must never go backwards.
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineTracker<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: usize) -> u64 {
        let byte = byte.min(self.bytes.len());
        if byte > self.offset {
            let breaks = self.bytes[self.offset..byte].iter().filter(|&&b| b == b'\n');
            self.line += breaks.count() as u64;
            self.offset = byte;
        }
        self.line
    }

    /// Skip the line breaks starting at `from`. Returns where the next record
    /// starts and the line numbers of the empty lines passed over.
    fn skip_line_breaks(&mut self, from: usize) -> (usize, Vec<u64>) {
        let mut pos = from.min(self.bytes.len());
        let mut blank_lines = Vec::new();
        while let Some(&(byte @ (b'\r' | b'\n'))) = self.bytes.get(pos) {
            if byte == b'\n' {
                let line_start = self.bytes[..pos]
                    .iter()
                    .rposition(|&b| b == b'\n')
                    .map_or(0, |i| i + 1);
                if matches!(&self.bytes[line_start..pos], b"" | b"\r") {
                    blank_lines.push(self.line_at(pos));
                }
            }
            pos += 1;
        }
        (pos, blank_lines)
    }
}

/// Run the lint pipeline over every list file the store yields.
///
/// The caller is responsible for printing and for writing artifacts (via
/// `WritePort` or the `write_report_artifacts` helper).
pub fn run_lint(
    settings: &LintSettings,
    inputs: &dyn InputSource,
    store: &dyn ListStore,
    tool: ToolInfo,
) -> Result<LintOutcome, ToolError> {
    let started_at = Utc::now();

    let categories = inputs.load_categories().map_err(ToolError::Inputs)?;
    let global = inputs.load_global_index().map_err(ToolError::Inputs)?;
    debug!(
        categories = categories.len(),
        global_urls = global.len(),
        "loaded run inputs"
    );

    let mut ctx = ProcessContext::new(&categories, &global, settings.repair);
    ctx.global_file_name = &settings.global_file;

    let paths = store.list_files()?;
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();

    for path in &paths {
        match lint_file(settings, store, path, ctx) {
            Ok(outcome) => {
                if let Some(failure) = &outcome.failure {
                    failures.push(failure.clone());
                }
                files.push(outcome);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(path = %path, error = %reason, "skipping unreadable list file");
                failures.push(FileFailure {
                    path: path.clone(),
                    reason,
                });
            }
        }
    }

    let report = build_report(settings, tool, started_at, &files, failures);
    Ok(LintOutcome { report, files })
}

/// Lint, then rewrite if asked. `Err` means the file could not be read or
/// parsed; a failed write is recorded on the outcome instead, since its
/// defects are still valid.
fn lint_file(
    settings: &LintSettings,
    store: &dyn ListStore,
    path: &Utf8Path,
    ctx: ProcessContext<'_>,
) -> anyhow::Result<FileOutcome> {
    let bytes = store.read(path)?;
    let before_sha = sha256_hex(&bytes);
    let before =
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", path))?;

    let processed = lint_contents(path, &before, ctx)?;
    info!(
        path = %path,
        rows = processed.rows_read,
        defects = processed.defects.len(),
        "linted list file"
    );

    let mut outcome = FileOutcome {
        summary: FileSummary {
            path: path.to_path_buf(),
            rows: processed.rows_read,
            defects: processed.defects.len() as u64,
            rewritten: false,
        },
        defects: processed.defects,
        patch: None,
        failure: None,
    };

    if !settings.rewrite_requested() {
        return Ok(outcome);
    }

    let after = render_list(&processed.rows).context("render repaired list")?;
    if settings.dry_run {
        if after != before {
            outcome.patch = Some(preview_patch(path, &before, &after));
        }
        return Ok(outcome);
    }
    if after == before {
        debug!(path = %path, "rewrite is identical; leaving file alone");
        return Ok(outcome);
    }

    let expected = settings.verify_unchanged.then_some(before_sha.as_str());
    match store.replace(path, &after, expected) {
        Ok(()) => outcome.summary.rewritten = true,
        Err(err) => {
            warn!(path = %path, error = %err, "rewrite failed");
            outcome.failure = Some(FileFailure {
                path: path.to_path_buf(),
                reason: format!("rewrite failed: {err}"),
            });
        }
    }
    Ok(outcome)
}

fn build_report(
    settings: &LintSettings,
    tool: ToolInfo,
    started_at: chrono::DateTime<Utc>,
    files: &[FileOutcome],
    failures: Vec<FileFailure>,
) -> LintReport {
    let defects: Vec<Defect> = files.iter().flat_map(|f| f.defects.clone()).collect();

    let counts = Counts {
        files: files.len() as u64,
        rows: files.iter().map(|f| f.summary.rows).sum(),
        defects: defects.len() as u64,
        failures: failures.len() as u64,
    };
    let status = if counts.defects == 0 && counts.failures == 0 {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail
    };

    let mut fixes = settings.repair.labels();
    if settings.force_update {
        fixes.push("force_update".to_string());
    }

    LintReport {
        schema: TESTLISTS_REPORT_V1.to_string(),
        tool,
        run: RunInfo {
            started_at,
            ended_at: Some(Utc::now()),
            fixes,
            dry_run: settings.dry_run,
        },
        verdict: Verdict { status, counts },
        files: files.iter().map(|f| f.summary.clone()).collect(),
        defects,
        failures,
    }
}

/// Write the JSON report and/or its markdown rendition.
pub fn write_report_artifacts(
    report: &LintReport,
    json_path: Option<&Utf8Path>,
    md_path: Option<&Utf8Path>,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    if let Some(path) = json_path {
        let mut json = serde_json::to_string_pretty(report).context("serialize report")?;
        json.push('\n');
        writer.write_file(path, json.as_bytes())?;
    }
    if let Some(path) = md_path {
        writer.write_file(path, render_report_md(report).as_bytes())?;
    }
    Ok(())
}
