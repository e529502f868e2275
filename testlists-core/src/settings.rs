//! Clap-free settings for the lint pipeline.

use camino::Utf8PathBuf;
use testlists_domain::RepairOptions;
use testlists_inputs::{DiscoverOptions, LegendLayout};
use testlists_types::files::{GLOBAL_FILE, LEGEND_FILE};

#[derive(Debug, Clone)]
pub struct LintSettings {
    pub lists_dir: Utf8PathBuf,

    // Inputs
    pub legend_file: String,
    pub legend_layout: LegendLayout,
    pub global_file: String,
    pub discover: DiscoverOptions,

    // Repairs
    pub repair: RepairOptions,
    /// Rewrite every file even when no repair is enabled.
    pub force_update: bool,
    /// Compute rewrites and diffs but leave files alone.
    pub dry_run: bool,
    /// Refuse to replace a file whose bytes changed since it was read.
    pub verify_unchanged: bool,
}

impl Default for LintSettings {
    fn default() -> Self {
        Self {
            lists_dir: Utf8PathBuf::from("lists"),
            legend_file: LEGEND_FILE.to_string(),
            legend_layout: LegendLayout::default(),
            global_file: GLOBAL_FILE.to_string(),
            discover: DiscoverOptions::default(),
            repair: RepairOptions::default(),
            force_update: false,
            dry_run: false,
            verify_unchanged: true,
        }
    }
}

impl LintSettings {
    pub fn new(lists_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            lists_dir: lists_dir.into(),
            ..Self::default()
        }
    }

    pub fn legend_path(&self) -> Utf8PathBuf {
        self.lists_dir.join(&self.legend_file)
    }

    pub fn global_path(&self) -> Utf8PathBuf {
        self.lists_dir.join(&self.global_file)
    }

    /// True when files go through the writer at all.
    pub fn rewrite_requested(&self) -> bool {
        self.repair.any() || self.force_update
    }
}
