use crate::error::{FileRole, JptError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Read a whole source file, classifying caller mistakes as input errors
pub fn read_source(path: &Path, role: FileRole) -> Result<Vec<u8>> {
    if path.as_os_str().is_empty() {
        return Err(JptError::input(role, path, "the filename was not specified"));
    }
    if path.is_dir() {
        return Err(JptError::input(role, path, "the path is a directory"));
    }

    let data = fs::read(path).map_err(|e| classify(role, path, e))?;
    debug!(%role, path = %path.display(), bytes = data.len(), "read source");
    Ok(data)
}

/// Write `bytes` to `path` so readers see either the old file or the complete new one
pub fn write_atomic(path: &Path, role: FileRole, bytes: &[u8]) -> Result<()> {
    StagedFile::stage(path, role, bytes)?.commit()?;
    Ok(())
}

/// Fully written contents waiting in a temporary file beside their destination.
/// Dropping it without committing removes the temporary file.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
    role: FileRole,
}

impl StagedFile {
    pub fn stage(path: &Path, role: FileRole, bytes: &[u8]) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(JptError::input(role, path, "the filename was not specified"));
        }
        if path.is_dir() {
            return Err(JptError::input(role, path, "the path is a directory"));
        }
        let dir = parent_dir(path);
        if !dir.is_dir() {
            return Err(JptError::input(
                role,
                path,
                "the destination directory does not exist",
            ));
        }

        let mut temp = tempfile::Builder::new()
            .prefix(".jpt-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| classify(role, path, e))?;
        temp.write_all(bytes)
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| JptError::io(role, path, e))?;
        if let Some(perms) = target_permissions(path) {
            temp.as_file()
                .set_permissions(perms)
                .map_err(|e| JptError::io(role, path, e))?;
        }

        debug!(
            %role,
            target = %path.display(),
            temp = %temp.path().display(),
            bytes = bytes.len(),
            "staged output"
        );
        Ok(Self {
            temp,
            target: path.to_path_buf(),
            role,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the staged file over its destination
    pub fn commit(self) -> Result<PathBuf> {
        let Self { temp, target, role } = self;
        temp.persist(&target)
            .map_err(|e| classify(role, &target, e.error))?;
        debug!(%role, target = %target.display(), "committed output");
        Ok(target)
    }
}

/// Absolute form of `path` with `.`/`..` and symlinked directories resolved.
/// Falls back to the path as given when its directory does not exist.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    match (fs::canonicalize(parent_dir(path)), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

/// Whether two spellings name the same file on disk
pub fn same_path(a: &Path, b: &Path) -> bool {
    a == b || resolve_path(a) == resolve_path(b)
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Keep the mode of a file being replaced; new files get the usual 0644
fn target_permissions(path: &Path) -> Option<fs::Permissions> {
    match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

fn classify(role: FileRole, path: &Path, err: io::Error) -> JptError {
    match err.kind() {
        io::ErrorKind::NotFound => JptError::input(role, path, "the file does not exist"),
        io::ErrorKind::PermissionDenied => JptError::input(role, path, "permission denied"),
        _ => JptError::io(role, path, err),
    }
}
