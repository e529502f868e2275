mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliFixes, ConfigMerger};
use std::process::ExitCode;
use testlists_core::adapters::{FsInputSource, FsListStore, FsWritePort};
use testlists_core::pipeline::{run_lint, write_report_artifacts};
use testlists_core::ports::InputSource;
use testlists_render::{render_file_summary, render_totals};
use testlists_types::report::ToolInfo;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "testlists",
    version,
    about = "Validate and repair categorized URL test lists."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lint every list file in a directory, optionally repairing it in place.
    Lint(LintArgs),
    /// Print the category legend as loaded.
    Categories(CategoriesArgs),
}

#[derive(Debug, Parser)]
struct LintArgs {
    /// Directory holding the list files, the legend and the global list.
    lists_path: Utf8PathBuf,

    /// Drop repeated URLs and URLs already in the global list.
    #[arg(long, default_value_t = false)]
    fix_duplicates: bool,

    /// Append the root path `/` to URLs that have none.
    #[arg(long, default_value_t = false)]
    fix_slash: bool,

    /// Wrap free-text notes as `{"notes": "..."}`.
    #[arg(long, default_value_t = false)]
    fix_notes: bool,

    /// Rewrite every list file even when no repair applies.
    #[arg(long, default_value_t = false)]
    force_update: bool,

    /// Print the rewrites as a diff instead of writing them.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Write a JSON report to this path.
    #[arg(long)]
    report: Option<Utf8PathBuf>,

    /// Write a markdown report to this path.
    #[arg(long)]
    report_md: Option<Utf8PathBuf>,

    /// Config file (default: <lists_path>/testlists.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CategoriesArgs {
    /// Directory holding the legend file.
    lists_path: Utf8PathBuf,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Config file (default: <lists_path>/testlists.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Lint(args) => cmd_lint(args),
        Command::Categories(args) => cmd_categories(args).map(|()| 0),
    }
}

fn cmd_lint(args: LintArgs) -> anyhow::Result<u8> {
    let file_config = config::load_or_default(&args.lists_path, args.config.as_deref())
        .context("load testlists.toml config")?;
    let fixes = CliFixes {
        duplicates: args.fix_duplicates,
        slash: args.fix_slash,
        notes: args.fix_notes,
    };
    let mut settings = ConfigMerger::new(file_config).merge_lint_args(args.lists_path, fixes);
    settings.force_update = args.force_update;
    settings.dry_run = args.dry_run;

    debug!(
        "merged config: repair={:?}, force_update={}, dry_run={}",
        settings.repair, settings.force_update, settings.dry_run
    );

    let inputs = FsInputSource::from_settings(&settings);
    let store = FsListStore::from_settings(&settings);
    let outcome = run_lint(&settings, &inputs, &store, tool_info())?;

    for file in &outcome.files {
        print!("{}", render_file_summary(&file.summary));
        if let Some(patch) = &file.patch {
            print!("{}", patch);
        }
    }
    print!("{}", render_totals(&outcome.report));

    write_report_artifacts(
        &outcome.report,
        args.report.as_deref(),
        args.report_md.as_deref(),
        &FsWritePort,
    )?;

    Ok(outcome.exit_code())
}

fn cmd_categories(args: CategoriesArgs) -> anyhow::Result<()> {
    let file_config = config::load_or_default(&args.lists_path, args.config.as_deref())
        .context("load testlists.toml config")?;
    let settings =
        ConfigMerger::new(file_config).merge_lint_args(args.lists_path, CliFixes::default());
    let categories = FsInputSource::from_settings(&settings).load_categories()?;

    match args.format {
        OutputFormat::Text => {
            println!("  {:<10} DESCRIPTION", "CODE");
            println!("  {:<10} -----------", "----");
            for (code, description) in categories.iter() {
                println!("  {:<10} {}", code, description);
            }
        }
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = categories
                .iter()
                .map(|(code, description)| (code.to_string(), description.into()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "testlists".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
