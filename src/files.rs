//! Source file discovery.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decides which directories and files are skipped while walking an input.
#[derive(Debug, Clone)]
pub struct FileFilter {
    excluded_dirs: Vec<String>,
    excluded_paths: GlobSet,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            excluded_dirs: vec![".git".to_string(), "node_modules".to_string()],
            excluded_paths: GlobSet::empty(),
        }
    }
}

impl FileFilter {
    /// Build a filter from directory names and glob patterns.
    pub fn new(excluded_dirs: &[String], excluded_paths: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in excluded_paths {
            let glob = Glob::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
            builder.add(glob);
        }
        Ok(Self {
            excluded_dirs: excluded_dirs.to_vec(),
            excluded_paths: builder.build()?,
        })
    }

    /// A filter that skips nothing.
    pub fn none() -> Self {
        Self {
            excluded_dirs: Vec::new(),
            excluded_paths: GlobSet::empty(),
        }
    }

    fn skips_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Check a path (relative to the walk root) against the glob exclusions.
    pub fn skips_path(&self, relative: &Path) -> bool {
        !self.excluded_paths.is_empty() && self.excluded_paths.is_match(relative)
    }
}

/// Recursively collect files under `root` whose lowercased extension is one of
/// `extensions`. Results are sorted for deterministic output.
pub fn collect_files(
    root: &Path,
    extensions: &[&str],
    filter: &FileFilter,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in walk(root, filter)? {
        let ext = crate::language::extension_of(&path).unwrap_or_default();
        if extensions.contains(&ext.as_str()) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Recursively list every file under `root` that the filter keeps.
///
/// Entries below `root` that cannot be read are logged and skipped; only an
/// unreadable `root` is an error.
pub fn walk(root: &Path, filter: &FileFilter) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() > 0 && e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                return !filter.skips_dir(&name);
            }
            true
        })
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if filter.skips_path(relative) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_collect_by_extension() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.py");
        touch(temp.path(), "pkg/b.py");
        touch(temp.path(), "pkg/c.js");
        touch(temp.path(), "README.md");

        let files = collect_files(temp.path(), &["py"], &FileFilter::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "py"));
    }

    #[test]
    fn test_uppercase_extension_matches() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Main.JAVA");

        let files = collect_files(temp.path(), &["java"], &FileFilter::none()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_excluded_dirs_are_skipped() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "app.js");
        touch(temp.path(), "node_modules/lib/index.js");
        touch(temp.path(), ".git/hooks/x.js");

        let files = collect_files(temp.path(), &["js"], &FileFilter::default()).unwrap();
        assert_eq!(files, vec![temp.path().join("app.js")]);

        let all = collect_files(temp.path(), &["js"], &FileFilter::none()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_excluded_path_globs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/main.py");
        touch(temp.path(), "src/generated/models.py");

        let filter = FileFilter::new(&[], &["**/generated/**".to_string()]).unwrap();
        let files = collect_files(temp.path(), &["py"], &filter).unwrap();
        assert_eq!(files, vec![temp.path().join("src/main.py")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(walk(&temp.path().join("gone"), &FileFilter::none()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdir_does_not_abort_walk() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a/app.py");
        touch(temp.path(), "locked/hidden.py");
        touch(temp.path(), "z/last.py");
        let locked = temp.path().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let result = collect_files(temp.path(), &["py"], &FileFilter::none());
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        // root can still read the locked directory, so it may or may not be listed
        let files = result.unwrap();
        assert!(files.contains(&temp.path().join("a/app.py")));
        assert!(files.contains(&temp.path().join("z/last.py")));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        assert!(FileFilter::new(&[], &["[".to_string()]).is_err());
    }
}
