//! Embeddable core library for the test list linter.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking
//! into other tools.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`InputSource`](ports::InputSource): load the legend and global index
//! - [`ListStore`](ports::ListStore): enumerate, read, and replace list files
//! - [`WritePort`](ports::WritePort): write report artifacts
//!
//! The [`adapters`] module provides filesystem-backed and in-memory
//! implementations.
//!
//! # Entry points
//!
//! - [`run_lint`](pipeline::run_lint): validate (and optionally repair) every list file
//! - [`lint_contents`](pipeline::lint_contents): validate one file's text

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-exports so embedders don't need the leaf crates directly.
pub use testlists_domain::{ProcessedList, RepairOptions};
pub use testlists_inputs::{CategoryTable, GlobalIndex, LegendLayout};
