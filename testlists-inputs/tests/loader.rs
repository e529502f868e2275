//! Loader tests against real files on disk.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use testlists_inputs::{
    DiscoverOptions, InputLoadError, LegendLayout, discover_list_files, load_category_table,
    load_global_index,
};

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    (td, root)
}

const LEGEND: &str = "category_description,category_code,old_codes,notes\n\
                      Gambling,GMB,GMB CASINO,\n\
                      \"News Media, Online\",NEWS,NEWS,\n";

#[test]
fn legend_maps_code_to_description() {
    let (_td, root) = temp_root();
    let path = root.join("00-LEGEND-new_category_codes.csv");
    fs::write(&path, LEGEND).unwrap();

    let table = load_category_table(&path, LegendLayout::DescriptionCode).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.description("GMB"), Some("Gambling"));
    assert_eq!(table.description("NEWS"), Some("News Media, Online"));
    assert_eq!(table.description("Gambling"), None);
}

#[test]
fn legacy_legend_reads_code_first() {
    let (_td, root) = temp_root();
    let path = root.join("00-LEGEND-category_codes.csv");
    fs::write(&path, "code,description\nGMB,Gambling\n").unwrap();

    let table = load_category_table(&path, LegendLayout::CodeDescription).unwrap();
    assert_eq!(
        table.iter().collect::<Vec<_>>(),
        vec![("GMB", "Gambling")]
    );
}

#[test]
fn legend_row_with_one_column_fails() {
    let (_td, root) = temp_root();
    let path = root.join("legend.csv");
    fs::write(&path, "category_description,category_code\nGambling,GMB\nOrphan\n").unwrap();

    let err = load_category_table(&path, LegendLayout::DescriptionCode).unwrap_err();
    match err {
        InputLoadError::MissingColumns { line, found, .. } => {
            assert_eq!(line, 3);
            assert_eq!(found, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_legend_is_io_error() {
    let (_td, root) = temp_root();
    let err = load_category_table(&root.join("nope.csv"), LegendLayout::default()).unwrap_err();
    assert!(matches!(err, InputLoadError::Io(_)));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn global_index_reads_first_column() {
    let (_td, root) = temp_root();
    let path = root.join("global.csv");
    fs::write(
        &path,
        "url,category_code,category_description,date_added,source,notes\n\
         http://example.com/,GMB,Gambling,2020-01-01,,\n\
         http://broken.com/,GMB\n",
    )
    .unwrap();

    let index = load_global_index(&path).unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.contains("http://example.com/"));
    assert!(!index.contains("http://broken.com/"));
}

#[test]
fn discovery_skips_legends_and_other_extensions() {
    let (_td, root) = temp_root();
    for name in [
        "it.csv",
        "00-LEGEND-new_category_codes.csv",
        "global.csv",
        "README.md",
        "ar.csv",
    ] {
        fs::write(root.join(name), "").unwrap();
    }
    fs::create_dir_all(root.join("nested.csv")).unwrap();

    let files = discover_list_files(&root, &DiscoverOptions::default()).unwrap();
    let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
    assert_eq!(names, vec!["ar.csv", "global.csv", "it.csv"]);
}

#[test]
fn discovery_of_missing_dir_is_empty() {
    let (_td, root) = temp_root();
    let files = discover_list_files(&root.join("missing"), &DiscoverOptions::default()).unwrap();
    assert!(files.is_empty());
}
