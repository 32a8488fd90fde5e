//! Local source tree walking for the offline extraction pipeline.

use std::path::Path;
use walkdir::WalkDir;

/// A source file picked up by the walker.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub relative_path: String,
    pub content: String,
}

/// Walk a directory tree and return every file the snippet extractor
/// understands, skipping hidden/vendored directories and files over 1MB.
pub fn walk_source_files(root: &Path) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_hidden_or_ignored(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();

        if !crate::extract::is_supported(&path.to_string_lossy()) {
            continue;
        }

        if let Ok(meta) = std::fs::metadata(path) {
            if meta.len() > 1_048_576 {
                continue;
            }
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        match std::fs::read_to_string(path) {
            Ok(content) => files.push(SourceFile {
                relative_path: relative,
                content,
            }),
            Err(_) => {
                // Skip files that can't be read as UTF-8
                continue;
            }
        }
    }

    files
}

fn is_hidden_or_ignored(entry: &walkdir::DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    // Skip common non-code directories
    matches!(
        name.as_ref(),
        "node_modules" | "target" | "dist" | "build" | "__pycache__" | "vendor" | "venv" | "env"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_picks_up_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.py"), "def f(): pass\n").unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not code\n").unwrap();

        let files = walk_source_files(dir.path());
        let mut paths: Vec<&str> = files.iter().map(|f| f.relative_path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["app.py", "main.rs"]);
    }

    #[test]
    fn test_walk_skips_hidden_and_vendored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/lib")).unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("node_modules/lib/x.js"), "var x = 1;\n").unwrap();
        std::fs::write(dir.path().join(".git/hook.py"), "def h(): pass\n").unwrap();
        std::fs::write(dir.path().join("keep.py"), "def keep(): pass\n").unwrap();

        let files = walk_source_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "keep.py");
    }

    #[test]
    fn test_walk_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.py"), "#".repeat(2 * 1_048_576)).unwrap();
        std::fs::write(dir.path().join("small.py"), "def s(): pass\n").unwrap();

        let files = walk_source_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "small.py");
    }
}
