use crate::takeout_core::error::{Result, TakeoutError};
use crate::takeout_core::exif::{CaptureTime, TagStore};
use crate::takeout_core::settings::RunConfig;
use crate::takeout_core::sidecar::{locate_sidecar, read_photo_taken_time};
use filetime::FileTime;
use std::path::{Path, PathBuf};

/// Result of synchronizing one media file with its sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No sidecar exists; nothing was touched.
    NoSidecar,
    /// Filesystem times were applied but embedded tags were left as they were,
    /// either because they already matched or because the type has none.
    Unchanged { sidecar: PathBuf },
    /// Embedded tags were rewritten.
    Updated { sidecar: PathBuf },
}

impl SyncOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated { .. })
    }

    pub fn sidecar(&self) -> Option<&Path> {
        match self {
            SyncOutcome::NoSidecar => None,
            SyncOutcome::Unchanged { sidecar } | SyncOutcome::Updated { sidecar } => Some(sidecar),
        }
    }
}

/// Brings media files in line with the capture time recorded in their sidecars.
pub struct Synchronizer<'a, T: TagStore> {
    config: &'a RunConfig,
    tags: T,
}

impl<'a, T: TagStore> Synchronizer<'a, T> {
    pub fn new(config: &'a RunConfig, tags: T) -> Self {
        Self { config, tags }
    }

    pub fn tags(&self) -> &T {
        &self.tags
    }

    /// Synchronize `media` with its sidecar.
    ///
    /// Taggable images get their three date tags rewritten unless they already
    /// fall on the sidecar's day. Every file with a sidecar gets its access and
    /// modification times set to the sidecar's timestamp.
    pub fn synchronize(&mut self, media: &Path) -> Result<SyncOutcome> {
        let Some(sidecar) = locate_sidecar(media, &self.config.layout)? else {
            log::debug!("No JSON for {}, skip update", media.display());
            return Ok(SyncOutcome::NoSidecar);
        };

        let seconds = read_photo_taken_time(&sidecar)?;
        let taken = CaptureTime::from_unix_in(seconds, self.config.zone)
            .map_err(|e| TakeoutError::metadata(&sidecar, e))?;
        let value = taken.to_exif_string()?;
        log::debug!("JSON datetime for {}: {} ({})", media.display(), seconds, value);

        let updated = if self.config.taggable_extensions.matches(media) {
            self.sync_tags(media, &taken, &value)?
        } else {
            false
        };

        let time = FileTime::from_unix_time(taken.unix_timestamp(), 0);
        filetime::set_file_times(media, time, time)?;

        Ok(if updated {
            SyncOutcome::Updated { sidecar }
        } else {
            SyncOutcome::Unchanged { sidecar }
        })
    }

    fn sync_tags(&mut self, media: &Path, taken: &CaptureTime, value: &str) -> Result<bool> {
        let tags = self.tags.read_tags(media)?;
        log::debug!("Embedded tags of {}: {:?}", media.display(), tags);

        if tags.all_on_day(taken.date()) {
            log::debug!("Tags of {} already match, skip update", media.display());
            return Ok(false);
        }

        self.tags.write_tags(media, value)?;
        log::debug!("Wrote {} into {}", value, media.display());
        Ok(true)
    }
}
