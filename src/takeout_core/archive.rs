use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::paths::ArchiveLayout;
use std::fs;
use std::path::Path;

/// Move `file` into its archive directory for later manual deletion.
///
/// Returns `true` when the file was moved and `false` when it already sits
/// at its archive destination, in which case nothing on disk is touched.
/// An existing file at the destination is never overwritten.
pub fn archive_file(file: &Path, layout: &ArchiveLayout) -> Result<bool> {
    let output_dir = layout.archive_dir(file)?;

    if file.parent() == Some(output_dir.as_path()) {
        log::debug!("{} already archived", file.display());
        return Ok(false);
    }

    let Some(name) = file.file_name() else {
        return Err(TakeoutError::OutsideWorkingRoot {
            path: file.to_path_buf(),
            root: layout.working_root().to_path_buf(),
        });
    };

    fs::create_dir_all(&output_dir)?;

    let destination = output_dir.join(name);
    if destination.exists() {
        return Err(TakeoutError::ArchiveCollision {
            file: file.to_path_buf(),
            destination,
        });
    }

    fs::rename(file, &destination)?;
    log::debug!("{} archived to {}", file.display(), destination.display());
    Ok(true)
}
