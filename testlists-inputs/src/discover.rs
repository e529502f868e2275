use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use glob::glob;
use testlists_types::files::{LEGEND_PREFIX, LIST_EXTENSION};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// File names starting with this are legends and are skipped.
    pub skip_prefix: String,
    /// Required file extension, without the dot.
    pub extension: String,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            skip_prefix: LEGEND_PREFIX.to_string(),
            extension: LIST_EXTENSION.to_string(),
        }
    }
}

/// List files directly under `dir`, sorted by path.
pub fn discover_list_files(
    dir: &Utf8Path,
    opts: &DiscoverOptions,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let pattern = dir.join("*");
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning for list files");

    let mut out = Vec::new();
    for entry in glob(pattern_str).with_context(|| format!("glob {}", pattern_str))? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
            debug!("skipping non-utf8 path");
            continue;
        };

        let Some(name) = path.file_name() else {
            continue;
        };
        if name.starts_with(&opts.skip_prefix) {
            debug!(path = %path, "skipping legend file");
            continue;
        }
        if path.extension() != Some(opts.extension.as_str()) || !path.is_file() {
            continue;
        }
        out.push(path);
    }

    // Deterministic order matters.
    out.sort();
    Ok(out)
}
