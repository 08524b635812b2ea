//! Recursive file listing

use std::fs;
use std::path::Path;

use crate::{Error, NormalizedPath, Result};

/// Directory names never descended into.
pub const IGNORED_DIRS: &[&str] = &[".git", "node_modules"];

/// List every file below `root`, relative to `root`, sorted.
///
/// A missing `root` yields an empty list.
pub fn list_files(root: &Path) -> Result<Vec<NormalizedPath>> {
    let mut files = Vec::new();
    if root.is_dir() {
        collect(root, &NormalizedPath::new(""), &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn collect(dir: &Path, prefix: &NormalizedPath, out: &mut Vec<NormalizedPath>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        let relative = prefix.join(&name);

        if file_type.is_dir() {
            if IGNORED_DIRS.contains(&name.as_str()) {
                continue;
            }
            collect(&entry.path(), &relative, out)?;
        } else {
            out.push(relative);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_nested_files_relative_and_sorted() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("b/c")).unwrap();
        fs::write(temp.path().join("b/c/deep.md"), "x").unwrap();
        fs::write(temp.path().join("a.md"), "x").unwrap();

        let files = list_files(temp.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, vec!["a.md", "b/c/deep.md"]);
    }

    #[test]
    fn skips_git_and_node_modules() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::create_dir_all(temp.path().join("node_modules/pkg")).unwrap();
        fs::write(temp.path().join(".git/HEAD"), "ref").unwrap();
        fs::write(temp.path().join("node_modules/pkg/index.js"), "").unwrap();

        assert!(list_files(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        assert!(list_files(&temp.path().join("nope")).unwrap().is_empty());
    }
}
