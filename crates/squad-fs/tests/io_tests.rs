use squad_fs::io;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a/b/test.txt");

    io::write_atomic(&path, b"hello world").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");

    io::write_atomic(&path, b"content").unwrap();

    let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_read_text_nonexistent_file() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text(temp.path().join("missing.txt"));
    assert!(result.unwrap_err().is_not_found());
}

#[test]
fn test_copy_file_creates_parent() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src.md");
    fs::write(&source, "body").unwrap();
    let dest = temp.path().join("deep/nested/dest.md");

    io::copy_file(&source, &dest).unwrap();

    assert_eq!(fs::read_to_string(dest).unwrap(), "body");
}

#[test]
fn test_remove_dir_all_missing_is_ok() {
    let temp = TempDir::new().unwrap();
    io::remove_dir_all(temp.path().join("never-created")).unwrap();
}
