use crate::takeout_core::error::{Result, TakeoutError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Where archived files go.
///
/// The archive root is a sibling of the working root named after the archive
/// folder, and mirrors the working root's directory structure:
///
/// ```text
/// /exports/Takeout/Album/photo.jpg  ->  /exports/Archive/Album/photo.jpg
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    working_root: PathBuf,
    archive_root: PathBuf,
    folder_name: String,
}

impl ArchiveLayout {
    /// Lay out the archive next to `working_root`. The working root must have
    /// a parent directory to host the archive.
    pub fn new(working_root: &Path, folder_name: &str) -> Result<Self> {
        let parent = working_root
            .parent()
            .ok_or_else(|| TakeoutError::InvalidTarget(working_root.to_path_buf()))?;

        Ok(Self {
            working_root: working_root.to_path_buf(),
            archive_root: parent.join(folder_name),
            folder_name: folder_name.to_string(),
        })
    }

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }

    /// True when the archive folder name appears as a segment of `file`.
    /// Segments above the directory hosting the archive are not considered.
    pub fn is_archived(&self, file: &Path) -> bool {
        let scoped = self
            .archive_root
            .parent()
            .and_then(|host| file.strip_prefix(host).ok())
            .unwrap_or(file);

        scoped
            .components()
            .any(|c| c.as_os_str() == OsStr::new(&self.folder_name))
    }

    /// Compute the archive directory for `file`.
    ///
    /// A file that already sits in an archive tree resolves to its current
    /// parent, so relocating it again is a no-op.
    pub fn archive_dir(&self, file: &Path) -> Result<PathBuf> {
        let parent = file.parent().unwrap_or_else(|| Path::new(""));

        if self.is_archived(file) {
            return Ok(parent.to_path_buf());
        }

        let relative = parent
            .strip_prefix(&self.working_root)
            .map_err(|_| TakeoutError::OutsideWorkingRoot {
                path: file.to_path_buf(),
                root: self.working_root.clone(),
            })?;

        Ok(self.archive_root.join(relative))
    }
}

/// Check whether `dir` is a bulk export folder, i.e. its name contains `marker`
/// (Takeout names these "Photos from 2020" and so on).
///
/// Only the folder's own name counts: a subfolder nested under a bulk folder,
/// such as `Photos from 2020/Sub`, is treated as curated.
pub fn is_bulk_folder(dir: &Path, marker: &str) -> bool {
    if marker.is_empty() {
        return false;
    }
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.contains(marker))
        .unwrap_or(false)
}
