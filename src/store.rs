use ignore::WalkBuilder;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

const RECORD_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub fn collect_record_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false)
        .require_git(false)
        .add_custom_ignore_filename(".modelqignore")
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_record_file(path) {
            files.push(path.to_path_buf());
        }
    }

    files
}

fn is_record_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| RECORD_EXTENSIONS.contains(&ext))
}

/// Drops every entry of `files` that names the same file as `excluded`,
/// however the two paths are spelled.
pub fn exclude_file(files: Vec<PathBuf>, excluded: &Path) -> Vec<PathBuf> {
    let target = fs::canonicalize(excluded).ok();
    files
        .into_iter()
        .filter(|path| match (&target, fs::canonicalize(path)) {
            (Some(target), Ok(path)) => target != &path,
            _ => path != excluded,
        })
        .collect()
}

pub fn read_paths_from_stdin() -> Vec<PathBuf> {
    let stdin = io::stdin();
    stdin
        .lock()
        .lines()
        .map_while(Result::ok)
        .filter(|line| !line.trim().is_empty())
        .map(PathBuf::from)
        .collect()
}
