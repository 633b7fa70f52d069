/*!
 * Tests for file utility functions
 */

use std::path::Path;
use anyhow::Result;
use fcptitles::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that dir_exists distinguishes directories from files
#[test]
fn test_dir_exists_withFileAndDir_shouldOnlyMatchDir() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "a.txt", "x")?;

    assert!(FileManager::dir_exists(temp_dir.path()));
    assert!(!FileManager::dir_exists(&file));

    Ok(())
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let input_file = Path::new("/tmp/input/Project.fcpxml");
    let output_dir = Path::new("/tmp/output");

    let output_path = FileManager::generate_output_path(input_file, output_dir, "csv");

    assert_eq!(output_path, Path::new("/tmp/output/Project.titles.csv"));
}

#[test]
fn test_generate_output_path_withBundle_shouldUseBundleStem() {
    let output_path = FileManager::generate_output_path("Export.fcpxmld", "/out", "json");

    assert_eq!(output_path, Path::new("/out/Export.titles.json"));
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("test_subdir/deeper");

    FileManager::ensure_dir(&test_subdir)?;

    assert!(test_subdir.is_dir());

    Ok(())
}

#[test]
fn test_write_bytes_andReadBack_shouldMatch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("sub/out.csv");

    FileManager::write_bytes(&path, "a,b\r\n".as_bytes())?;

    assert_eq!(FileManager::read_to_string(&path)?, "a,b\r\n");

    Ok(())
}

#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("missing_file_12345.txt").is_err());
}

/// Bundles are listed once and never descended into
#[test]
fn test_find_project_files_withMixedTree_shouldListProjectsAndBundles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "b/Second.fcpxml", "<x/>")?;
    common::create_test_file(root, "A.fcpxml", "<x/>")?;
    common::create_test_file(root, "Export.fcpxmld/Info.fcpxml", "<x/>")?;
    common::create_test_file(root, "Upload.fcpbundle", "zip bytes")?;
    common::create_test_file(root, "notes.txt", "ignore")?;

    let found = FileManager::find_project_files(root)?;

    let names: Vec<String> = found
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["A.fcpxml", "Export.fcpxmld", "Upload.fcpbundle", "b/Second.fcpxml"]);

    Ok(())
}
