//! Write engine for list files.
//!
//! Responsibilities:
//! - Serialize rows in the list dialect (single-quote quoting, `\n` lines).
//! - Replace a file atomically: stage a sibling, verify the original is
//!   unchanged, then rename over it.
//! - Produce a unified diff preview for dry runs.

mod error;

pub use error::{EditError, EditResult, PreconditionError};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::io::Write;
use testlists_types::record::{LIST_HEADER, ListRecord};
use tracing::{debug, warn};

/// Suffix of the staged sibling written before the rename.
pub const STAGING_SUFFIX: &str = ".fixed";

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Serialize the canonical header followed by `rows`.
pub fn render_list(rows: &[ListRecord]) -> EditResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .quote(b'\'')
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(LIST_HEADER)
        .context("write list header")?;
    for row in rows {
        writer
            .write_record(row.to_fields())
            .with_context(|| format!("write row for {}", row.url))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush list writer: {}", e.error()))?;
    let out = String::from_utf8(bytes).context("list output is not utf-8")?;
    Ok(out)
}

/// Sibling path used for staging `path`.
pub fn staging_path(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{path}{STAGING_SUFFIX}"))
}

/// New contents written next to the target but not yet swapped in.
///
/// Dropping an uncommitted staged write removes the sibling; the target is
/// never touched before [`StagedWrite::commit`].
#[derive(Debug)]
pub struct StagedWrite {
    target: Utf8PathBuf,
    staged: Utf8PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn target(&self) -> &Utf8Path {
        &self.target
    }

    pub fn staged_path(&self) -> &Utf8Path {
        &self.staged
    }

    /// Rename the staged file over the target.
    ///
    /// With `expected_sha256`, the target must still hash to that value.
    pub fn commit(mut self, expected_sha256: Option<&str>) -> EditResult<()> {
        if let Some(expected) = expected_sha256 {
            check_unchanged(&self.target, expected)?;
        }
        fs::rename(&self.staged, &self.target)
            .with_context(|| format!("replace {}", self.target))?;
        self.committed = true;
        debug!(path = %self.target, "replaced list file");
        Ok(())
    }

    /// Discard the staged file.
    pub fn abort(self) {}
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.staged) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.staged, error = %e, "could not remove staged file");
            }
        }
    }
}

/// Write `contents` to the staging sibling of `target` and flush it to disk.
pub fn stage_write(target: &Utf8Path, contents: &str) -> EditResult<StagedWrite> {
    let staged = staging_path(target);
    let guard = StagedWrite {
        target: target.to_path_buf(),
        staged: staged.clone(),
        committed: false,
    };

    let mut file = fs::File::create(staged.as_std_path())
        .with_context(|| format!("create {}", staged))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", staged))?;
    file.sync_all().with_context(|| format!("sync {}", staged))?;

    Ok(guard)
}

/// Stage and commit in one step.
pub fn write_atomic(
    target: &Utf8Path,
    contents: &str,
    expected_sha256: Option<&str>,
) -> EditResult<()> {
    stage_write(target, contents)?.commit(expected_sha256)
}

fn check_unchanged(path: &Utf8Path, expected: &str) -> EditResult<()> {
    let bytes = match fs::read(path.as_std_path()) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PreconditionError::Missing {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(e) => return Err(anyhow::Error::from(e).into()),
    };

    let actual = sha256_hex(&bytes);
    if actual != expected {
        return Err(PreconditionError::ContentChanged {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        }
        .into());
    }
    Ok(())
}

/// Unified diff of one file's rewrite; empty when nothing changes.
pub fn preview_patch(path: &Utf8Path, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

    let patch = diffy::create_patch(before, after);
    let formatter = PatchFormatter::new();
    let body = formatter.fmt_patch(&patch).to_string();
    // Skip diffy's own `--- original` / `+++ modified` header lines.
    for line in body.lines().skip_while(|l| l.starts_with("---") || l.starts_with("+++")) {
        out.push_str(line);
        out.push('\n');
    }
    out
}
