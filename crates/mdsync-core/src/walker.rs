//! Document discovery.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::report::Reporter;

/// Always skipped, regardless of configured exclusions.
const DEPENDENCY_DIR: &str = "node_modules";

/// Collect files under `root` whose root-relative path matches
/// `pattern`, in deterministic order.
///
/// Directories named in `excludes` (and dependency directories) are
/// pruned. Unreadable directories are reported and skipped.
pub(crate) fn find_documents(
    root: &Path,
    pattern: &Regex,
    excludes: &[String],
    reporter: &dyn Reporter,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    walk(root, root, pattern, excludes, reporter, &mut found);
    found
}

fn walk(
    root: &Path,
    dir: &Path,
    pattern: &Regex,
    excludes: &[String],
    reporter: &dyn Reporter,
    found: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            reporter.error(dir, &format!("cannot read directory: {err}"));
            return;
        }
    };

    let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        if path.is_dir() {
            let skip = name == DEPENDENCY_DIR || excludes.iter().any(|e| name == e.as_str());
            if skip {
                reporter.debug(&format!("skipping directory {}", path.display()));
            } else {
                walk(root, &path, pattern, excludes, reporter, found);
            }
        } else {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            if pattern.is_match(&relative.to_string_lossy()) {
                found.push(path);
            }
        }
    }
}
