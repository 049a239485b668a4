//! Scoped input workspaces.
//!
//! Every run gets its own temporary directory, removed when the
//! [`Workspace`] is dropped. Local inputs are prepared into it: a directory
//! is analyzed in place, a single source file is copied in, and a `.zip`
//! archive is extracted into `extracted/`.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use zip::ZipArchive;

/// Errors that can occur while preparing an input.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("upload too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("invalid zip archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),
    #[error("archive entry {0:?} escapes the extraction directory")]
    UnsafeEntry(String),
    #[error("unsupported input: {}", .0.display())]
    Unsupported(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A temporary directory owned by one run.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new().prefix("lintreport-").tempdir()?;
        log::debug!("workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Where to analyze a prepared input, and the workspace holding it (if any).
#[derive(Debug)]
pub struct PreparedInput {
    pub root: PathBuf,
    /// Report title: the input's file name.
    pub title: String,
    /// Kept alive for as long as `root` is in use.
    pub workspace: Option<Workspace>,
}

/// Prepare a local input for analysis.
///
/// `max_bytes` bounds the size of a single uploaded file or archive.
pub fn prepare(input: &Path, max_bytes: u64) -> Result<PreparedInput, WorkspaceError> {
    let metadata =
        fs::metadata(input).map_err(|_| WorkspaceError::NotFound(input.to_path_buf()))?;
    let title = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    if metadata.is_dir() {
        return Ok(PreparedInput {
            root: input.to_path_buf(),
            title,
            workspace: None,
        });
    }

    if !metadata.is_file() {
        return Err(WorkspaceError::Unsupported(input.to_path_buf()));
    }
    if metadata.len() > max_bytes {
        return Err(WorkspaceError::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let workspace = Workspace::new()?;
    let is_zip = crate::language::extension_of(input).as_deref() == Some("zip");

    let root = if is_zip {
        let dest = workspace.path().join("extracted");
        extract_zip(input, &dest)?;
        dest
    } else {
        fs::copy(input, workspace.path().join(&title))?;
        workspace.path().to_path_buf()
    };

    Ok(PreparedInput {
        root,
        title,
        workspace: Some(workspace),
    })
}

/// Extract every entry of `archive` under `dest`.
///
/// Entries whose path would land outside `dest` abort the extraction.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, WorkspaceError> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    fs::create_dir_all(dest)?;
    let mut files = 0;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| WorkspaceError::UnsafeEntry(entry.name().to_string()))?;
        let out = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&out)?;
        io::copy(&mut entry, &mut file)?;
        files += 1;
    }

    log::info!("extracted {} file(s) from {}", files, archive.display());
    Ok(files)
}

/// Join a repository-relative path onto `base`, refusing absolute paths and
/// parent-directory components.
pub fn safe_join(base: &Path, relative: &str) -> Option<PathBuf> {
    let rel = Path::new(relative);
    let mut out = base.to_path_buf();
    let mut pushed = false;

    for component in rel.components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }

    pushed.then_some(out)
}
