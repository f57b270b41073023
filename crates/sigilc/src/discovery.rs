//! Recursive `.sig` file harvesting for the `test` subcommand, which
//! (unlike the driver's import-graph discovery) needs every test file
//! under a directory regardless of whether anything imports it.

use std::path::{Path, PathBuf};

/// Discovers every `.sig` file under `dir`, returned relative to `dir`
/// and sorted alphabetically for deterministic test ordering. Hidden
/// directories and files are skipped.
pub fn discover_sig_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if dir.is_dir() {
        discover_recursive(dir, dir, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn discover_recursive(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        if path.is_dir() {
            discover_recursive(root, &path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("sig") {
            files.push(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_sig_files_recursively_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.sig"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/b.sig"), "").unwrap();
        std::fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        std::fs::write(dir.path().join(".hidden/c.sig"), "").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "").unwrap();

        let files = discover_sig_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| p.to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["a.sig", "nested/b.sig"]);
    }

    #[test]
    fn missing_directory_yields_no_files() {
        let files = discover_sig_files(Path::new("/nonexistent/sigil/tests")).unwrap();
        assert!(files.is_empty());
    }
}
