use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::media::{MediaKind, classify};
use crate::takeout_core::settings::RunConfig;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Files found under the target directory, tagged with what to do with them.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<(PathBuf, MediaKind)>,
}

impl Catalog {
    /// Walk the target directory recursively. Entries come back sorted by path.
    pub fn scan(config: &RunConfig) -> Result<Self> {
        let root = config.target_dir();
        let mut entries = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(TakeoutError::Walkdir(e)),
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            if let Some(kind) = classify(&path, &config.update_extensions, &config.archive_extensions) {
                entries.push((path, kind));
            }
        }

        log::debug!("Cataloged {} files under {}", entries.len(), root.display());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files whose capture time gets synchronized.
    pub fn files_to_update(&self) -> Vec<PathBuf> {
        self.of_kind(MediaKind::Update)
    }

    /// Files that are only archived.
    pub fn files_to_archive(&self) -> Vec<PathBuf> {
        self.of_kind(MediaKind::ArchiveOnly)
    }

    fn of_kind(&self, kind: MediaKind) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(_, k)| *k == kind)
            .map(|(p, _)| p.clone())
            .collect()
    }
}
