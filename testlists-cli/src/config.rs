//! Configuration file loading for testlists.
//!
//! Discovers and loads `testlists.toml` from the lists directory.
//! Fix switches from the CLI can only turn repairs on.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use testlists_core::LegendLayout;
use testlists_core::settings::LintSettings;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "testlists.toml";

/// Top-level configuration from testlists.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestlistsConfig {
    /// Where the run inputs live and which files are lists.
    pub files: FilesConfig,

    /// Repairs enabled by default.
    pub fix: FixConfig,
}

/// Files section of the config. Unset keys keep the built-in names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesConfig {
    /// Legend file name, relative to the lists directory.
    pub legend: Option<String>,

    /// Column order of the legend.
    pub legend_layout: Option<LegendLayout>,

    /// Aggregate list file name.
    pub global: Option<String>,

    /// File name prefix marking legend files.
    pub skip_prefix: Option<String>,

    /// List file extension, without the dot.
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixConfig {
    pub duplicates: bool,
    pub slash: bool,
    pub notes: bool,
}

/// Repair switches given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliFixes {
    pub duplicates: bool,
    pub slash: bool,
    pub notes: bool,
}

/// Discover `testlists.toml` in the lists directory.
pub fn discover_config(lists_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = lists_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<TestlistsConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<TestlistsConfig> {
    let config: TestlistsConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config, else the discovered one, else defaults.
pub fn load_or_default(
    lists_dir: &Utf8Path,
    explicit: Option<&Utf8Path>,
) -> anyhow::Result<TestlistsConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(lists_dir) {
        Some(path) => load_config(&path),
        None => Ok(TestlistsConfig::default()),
    }
}

/// Builder for merging the config file with CLI arguments.
pub struct ConfigMerger {
    config: TestlistsConfig,
}

impl ConfigMerger {
    pub fn new(config: TestlistsConfig) -> Self {
        Self { config }
    }

    /// Settings for a lint run over `lists_dir`.
    pub fn merge_lint_args(self, lists_dir: Utf8PathBuf, cli: CliFixes) -> LintSettings {
        let mut settings = LintSettings::new(lists_dir);
        let files = self.config.files;

        if let Some(legend) = files.legend {
            settings.legend_file = legend;
        }
        if let Some(layout) = files.legend_layout {
            settings.legend_layout = layout;
        }
        if let Some(global) = files.global {
            settings.global_file = global;
        }
        if let Some(prefix) = files.skip_prefix {
            settings.discover.skip_prefix = prefix;
        }
        if let Some(ext) = files.extension {
            settings.discover.extension = ext.trim_start_matches('.').to_string();
        }

        let fix = self.config.fix;
        settings.repair.fix_duplicates = cli.duplicates || fix.duplicates;
        settings.repair.fix_slash = cli.slash || fix.slash;
        settings.repair.fix_notes = cli.notes || fix.notes;
        settings
    }
}
