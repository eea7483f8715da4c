//! Shared file collection utilities for CLI commands.

use std::path::{Path, PathBuf};

/// Collect all .siv source files from the given paths (files or directories).
pub fn collect_siv_files(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            collect_siv_in_dir(path, &mut files)?;
        } else {
            anyhow::bail!("no such file or directory: {}", path_str);
        }
    }

    Ok(files)
}

/// Recursively collect .siv files in a directory.
fn collect_siv_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            // Skip hidden and build output directories
            if name_str.starts_with('.') || name_str == "target" || name_str == "dist" {
                continue;
            }
            collect_siv_in_dir(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("siv") {
            files.push(path);
        }
    }
    Ok(())
}
