//! File discovery and IO for the CLI.

use anyhow::{Context, Result};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileHandler {
    exclude: Vec<Pattern>,
}

impl FileHandler {
    pub fn new(exclude_patterns: &[String]) -> Result<Self> {
        let exclude = exclude_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {p}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { exclude })
    }

    pub fn find_go_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if self.is_go_file(path) && !self.is_excluded(path) {
                    files.push(path.clone());
                }
            } else if path.is_dir() {
                self.find_go_files_in_dir(path, &mut files)?;
            } else {
                // Treat as a glob pattern.
                let pattern = path.to_str().context("Invalid path")?;
                for entry in glob::glob(pattern).context("Failed to read glob pattern")? {
                    let file = entry.context("Failed to process glob entry")?;
                    if self.is_go_file(&file) && !self.is_excluded(&file) {
                        files.push(file);
                    }
                }
            }
        }

        Ok(files)
    }

    fn find_go_files_in_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir).context("Failed to read directory")? {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_dir() {
                // Skip vendored code, test fixtures and hidden directories.
                if let Some(name) = path.file_name() {
                    let name = name.to_string_lossy();
                    if name != "vendor" && name != "testdata" && !name.starts_with('.') {
                        self.find_go_files_in_dir(&path, files)?;
                    }
                }
            } else if self.is_go_file(&path) && !self.is_excluded(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn is_go_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "go")
            .unwrap_or(false)
    }

    /// A pattern excludes a file when it matches either the whole path or
    /// just the file name.
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            if pattern.matches_path(path) {
                return true;
            }
            path.file_name()
                .map(|name| pattern.matches(&name.to_string_lossy()))
                .unwrap_or(false)
        })
    }

    pub fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    pub fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn handler() -> FileHandler {
        FileHandler::new(&[]).unwrap()
    }

    #[test]
    fn test_is_go_file() {
        let h = handler();
        assert!(h.is_go_file(Path::new("main.go")));
        assert!(h.is_go_file(Path::new("a/b/server_test.go")));
        assert!(!h.is_go_file(Path::new("main.rs")));
        assert!(!h.is_go_file(Path::new("Makefile")));
    }

    #[test]
    fn test_find_go_files_in_directory() {
        let temp = TempDir::new().unwrap();
        let go_file = temp.path().join("a.go");
        let other = temp.path().join("b.txt");
        fs::write(&go_file, "package a\n").unwrap();
        fs::write(&other, "not go").unwrap();

        let mut files = handler().find_go_files(&[temp.path().to_path_buf()]).unwrap();
        files.sort();
        assert_eq!(files, vec![go_file]);
    }

    #[test]
    fn test_vendor_and_hidden_dirs_skipped() {
        let temp = TempDir::new().unwrap();
        for dir in ["vendor", "testdata", ".git"] {
            let sub = temp.path().join(dir);
            fs::create_dir(&sub).unwrap();
            fs::write(sub.join("skip.go"), "package skip\n").unwrap();
        }
        let keep = temp.path().join("keep.go");
        fs::write(&keep, "package keep\n").unwrap();

        let files = handler().find_go_files(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![keep]);
    }

    #[test]
    fn test_exclude_patterns() {
        let temp = TempDir::new().unwrap();
        let gen = temp.path().join("zz_generated.go");
        let keep = temp.path().join("keep.go");
        fs::write(&gen, "package a\n").unwrap();
        fs::write(&keep, "package a\n").unwrap();

        let h = FileHandler::new(&["zz_*.go".to_string()]).unwrap();
        let files = h.find_go_files(&[temp.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![keep]);
    }

    #[test]
    fn test_invalid_exclude_pattern_errors() {
        assert!(FileHandler::new(&["[".to_string()]).is_err());
    }
}
