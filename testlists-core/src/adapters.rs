//! Default filesystem-backed and in-memory port implementations.

use crate::ports::{InputSource, ListStore, WritePort};
use crate::settings::LintSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use std::sync::Mutex;
use testlists_edit::{EditResult, PreconditionError, sha256_hex, write_atomic};
use testlists_inputs::{
    CategoryTable, DiscoverOptions, GlobalIndex, LegendLayout, discover_list_files,
    load_category_table, load_global_index,
};

/// Loads the legend and global list from disk.
#[derive(Debug, Clone)]
pub struct FsInputSource {
    pub legend: Utf8PathBuf,
    pub legend_layout: LegendLayout,
    pub global: Utf8PathBuf,
}

impl FsInputSource {
    pub fn from_settings(settings: &LintSettings) -> Self {
        Self {
            legend: settings.legend_path(),
            legend_layout: settings.legend_layout,
            global: settings.global_path(),
        }
    }
}

impl InputSource for FsInputSource {
    fn load_categories(&self) -> anyhow::Result<CategoryTable> {
        load_category_table(&self.legend, self.legend_layout)
            .with_context(|| format!("load category legend {}", self.legend))
    }

    fn load_global_index(&self) -> anyhow::Result<GlobalIndex> {
        load_global_index(&self.global)
            .with_context(|| format!("load global list {}", self.global))
    }
}

/// List files in a directory, replaced through the atomic writer.
#[derive(Debug, Clone)]
pub struct FsListStore {
    pub dir: Utf8PathBuf,
    pub discover: DiscoverOptions,
}

impl FsListStore {
    pub fn new(dir: Utf8PathBuf, discover: DiscoverOptions) -> Self {
        Self { dir, discover }
    }

    pub fn from_settings(settings: &LintSettings) -> Self {
        Self::new(settings.lists_dir.clone(), settings.discover.clone())
    }
}

impl ListStore for FsListStore {
    fn list_files(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        discover_list_files(&self.dir, &self.discover)
            .with_context(|| format!("discover list files in {}", self.dir))
    }

    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
        fs::read(path.as_std_path()).with_context(|| format!("read {}", path))
    }

    fn replace(
        &self,
        path: &Utf8Path,
        contents: &str,
        expected_sha256: Option<&str>,
    ) -> EditResult<()> {
        write_atomic(path, contents, expected_sha256)
    }
}

/// Fixed inputs for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInputSource {
    pub categories: CategoryTable,
    pub global: GlobalIndex,
}

impl InputSource for InMemoryInputSource {
    fn load_categories(&self) -> anyhow::Result<CategoryTable> {
        Ok(self.categories.clone())
    }

    fn load_global_index(&self) -> anyhow::Result<GlobalIndex> {
        Ok(self.global.clone())
    }
}

/// In-memory list files keyed by path, listed in path order.
#[derive(Debug, Default)]
pub struct InMemoryListStore {
    files: Mutex<BTreeMap<Utf8PathBuf, Vec<u8>>>,
}

impl InMemoryListStore {
    pub fn new<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<Utf8PathBuf>,
        C: Into<Vec<u8>>,
    {
        Self {
            files: Mutex::new(
                files
                    .into_iter()
                    .map(|(p, c)| (p.into(), c.into()))
                    .collect(),
            ),
        }
    }

    /// Current contents of `path`, if present and valid UTF-8.
    pub fn get(&self, path: &str) -> Option<String> {
        let files = self.files.lock().ok()?;
        files
            .get(Utf8Path::new(path))
            .and_then(|b| String::from_utf8(b.clone()).ok())
    }
}

impl ListStore for InMemoryListStore {
    fn list_files(&self) -> anyhow::Result<Vec<Utf8PathBuf>> {
        let files = self
            .files
            .lock()
            .map_err(|_| anyhow::anyhow!("list store lock poisoned"))?;
        Ok(files.keys().cloned().collect())
    }

    fn read(&self, path: &Utf8Path) -> anyhow::Result<Vec<u8>> {
        let files = self
            .files
            .lock()
            .map_err(|_| anyhow::anyhow!("list store lock poisoned"))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path))
    }

    fn replace(
        &self,
        path: &Utf8Path,
        contents: &str,
        expected_sha256: Option<&str>,
    ) -> EditResult<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| anyhow::anyhow!("list store lock poisoned"))?;
        let Some(current) = files.get(path) else {
            return Err(PreconditionError::Missing {
                path: path.to_path_buf(),
            }
            .into());
        };
        if let Some(expected) = expected_sha256 {
            let actual = sha256_hex(current);
            if actual != expected {
                return Err(PreconditionError::ContentChanged {
                    path: path.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                }
                .into());
            }
        }
        files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent.as_std_path())
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path.as_std_path(), contents).with_context(|| format!("write {}", path))
    }
}
