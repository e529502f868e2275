use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use testlists_types::record::LIST_COLUMNS;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error in {path}: {message}")]
    Csv { path: Utf8PathBuf, message: String },

    #[error("{path} (line {line}): expected at least 2 columns, found {found}")]
    MissingColumns {
        path: Utf8PathBuf,
        line: u64,
        found: usize,
    },
}

/// Column order of the legend file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendLayout {
    /// `description,code,...` (current legend).
    #[default]
    DescriptionCode,
    /// `code,description,...` (legacy legend).
    CodeDescription,
}

impl LegendLayout {
    fn split<'a>(self, first: &'a str, second: &'a str) -> (&'a str, &'a str) {
        match self {
            LegendLayout::DescriptionCode => (second, first),
            LegendLayout::CodeDescription => (first, second),
        }
    }
}

/// Category code to canonical description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTable {
    codes: BTreeMap<String, String>,
}

impl CategoryTable {
    pub fn from_pairs<I, C, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, D)>,
        C: Into<String>,
        D: Into<String>,
    {
        Self {
            codes: pairs
                .into_iter()
                .map(|(c, d)| (c.into(), d.into()))
                .collect(),
        }
    }

    pub fn description(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries sorted by code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.codes.iter().map(|(c, d)| (c.as_str(), d.as_str()))
    }
}

/// Urls already present in the global list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalIndex {
    urls: HashSet<String>,
}

impl GlobalIndex {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// CSV dialect of list files: comma separated, single-quote quoting,
/// rows of any width.
pub fn list_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b',')
        .quote(b'\'')
        .has_headers(false)
        .flexible(true);
    builder
}

/// Load the legend. The header row is skipped; columns past the first two
/// are ignored.
pub fn load_category_table(
    path: &Utf8Path,
    layout: LegendLayout,
) -> Result<CategoryTable, InputLoadError> {
    let file = fs::File::open(path.as_std_path())?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut codes = BTreeMap::new();
    for result in reader.records() {
        let record = result.map_err(|e| InputLoadError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let (Some(first), Some(second)) = (record.get(0), record.get(1)) else {
            return Err(InputLoadError::MissingColumns {
                path: path.to_path_buf(),
                line,
                found: record.len(),
            });
        };
        let (code, desc) = layout.split(first, second);
        codes.insert(code.to_string(), desc.to_string());
    }

    debug!(path = %path, codes = codes.len(), "loaded category legend");
    Ok(CategoryTable { codes })
}

/// Load the global list's urls. Only six-column rows after the header count.
pub fn load_global_index(path: &Utf8Path) -> Result<GlobalIndex, InputLoadError> {
    let file = fs::File::open(path.as_std_path())?;
    let index = read_global_index(file, path)?;
    debug!(path = %path, urls = index.len(), "loaded global index");
    Ok(index)
}

fn read_global_index<R: Read>(input: R, path: &Utf8Path) -> Result<GlobalIndex, InputLoadError> {
    let mut reader = list_reader_builder().from_reader(input);
    let mut urls = HashSet::new();

    for (idx, result) in reader.byte_records().enumerate() {
        let record = result.map_err(|e| InputLoadError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if idx == 0 || record.len() != LIST_COLUMNS {
            continue;
        }
        match std::str::from_utf8(&record[0]) {
            Ok(url) => {
                urls.insert(url.to_string());
            }
            Err(_) => debug!(path = %path, row = idx, "skipping non-utf8 global row"),
        }
    }

    Ok(GlobalIndex { urls })
}
