//! Port traits abstracting all I/O away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use testlists_edit::EditResult;
use testlists_inputs::{CategoryTable, GlobalIndex};

/// Run-wide read-only inputs.
pub trait InputSource {
    fn load_categories(&self) -> anyhow::Result<CategoryTable>;
    fn load_global_index(&self) -> anyhow::Result<GlobalIndex>;
}

/// The list files under validation.
pub trait ListStore {
    /// Candidate list files in processing order.
    fn list_files(&self) -> anyhow::Result<Vec<Utf8PathBuf>>;

    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>>;

    /// Replace a file's contents without exposing a partial write. With
    /// `expected_sha256`, the current contents must still hash to it.
    fn replace(
        &self,
        path: &Utf8Path,
        contents: &str,
        expected_sha256: Option<&str>,
    ) -> EditResult<()>;
}

/// File-system write operations for report artifacts.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}
